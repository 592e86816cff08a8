use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::RecorderError;
use crate::events::PlayerEvent;
use crate::recorder::Segmenter;

use super::startup::Threads;

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Dispatch player events to the segmenter, one at a time and in arrival
/// order, until shutdown is requested or a watched thread stops.
///
/// Returns `Ok(())` on a requested shutdown, even when a thread stopped with
/// an error after the request, and the stopped thread's result otherwise.
pub fn run(
    segmenter: &mut Segmenter,
    events: &Receiver<PlayerEvent>,
    threads: &mut Threads,
    shutdown: &AtomicBool,
) -> Result<(), RecorderError> {
    loop {
        if shutdown.load(Ordering::Relaxed) {
            info!("shutdown requested");
            return Ok(());
        }

        match events.recv_timeout(POLL_INTERVAL) {
            Ok(event) => {
                let outcome = segmenter.handle(event);
                debug!(?outcome, "event handled");
            }
            Err(RecvTimeoutError::Timeout) => {}
            // The watcher is gone; `poll` below reports why.
            Err(RecvTimeoutError::Disconnected) => std::thread::sleep(POLL_INTERVAL),
        }

        if let Some(result) = threads.poll() {
            // A signal reaches the upstream producer too, so its exit is
            // part of the requested shutdown rather than a failure.
            if shutdown.load(Ordering::Relaxed) {
                info!("shutdown requested");
                return Ok(());
            }
            return result;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, mpsc};
    use std::thread;

    use super::*;
    use crate::recorder::{SharedState, encode_queue};
    use crate::track::MusicLibrary;

    fn segmenter() -> Segmenter {
        let (tx, _rx) = encode_queue(5);
        Segmenter::new(SharedState::handle(true), tx, MusicLibrary::new("/nonexistent", "ogg"))
    }

    fn idle() -> (thread::JoinHandle<Result<(), RecorderError>>, mpsc::Sender<()>) {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let handle = thread::spawn(move || {
            let _ = stop_rx.recv();
            Ok(())
        });
        (handle, stop_tx)
    }

    #[test]
    fn stops_on_shutdown_request() {
        let (capture, stop_capture) = idle();
        let (watcher, stop_watcher) = idle();
        let mut threads = Threads::watching(capture, watcher);
        let (_events_tx, events) = mpsc::channel();

        let result = run(&mut segmenter(), &events, &mut threads, &AtomicBool::new(true));
        assert!(result.is_ok());
        drop((stop_capture, stop_watcher));
    }

    #[test]
    fn upstream_closing_after_a_signal_is_a_clean_shutdown() {
        let shutdown = Arc::new(AtomicBool::new(false));
        let capture = {
            let shutdown = shutdown.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                shutdown.store(true, Ordering::Relaxed);
                thread::sleep(Duration::from_millis(10));
                Err(RecorderError::UpstreamClosed)
            })
        };
        let (watcher, stop_watcher) = idle();
        let mut threads = Threads::watching(capture, watcher);
        let (_events_tx, events) = mpsc::channel();

        let result = run(&mut segmenter(), &events, &mut threads, &shutdown);
        assert!(result.is_ok(), "got {result:?}");
        drop(stop_watcher);
    }

    #[test]
    fn capture_failure_ends_the_loop_with_its_error() {
        let capture = thread::spawn(|| Err(RecorderError::UpstreamClosed));
        let (watcher, stop_watcher) = idle();
        let mut threads = Threads::watching(capture, watcher);
        let (events_tx, events) = mpsc::channel();
        events_tx
            .send(PlayerEvent::Status(crate::events::PlaybackState::Playing))
            .unwrap();

        let result = run(&mut segmenter(), &events, &mut threads, &AtomicBool::new(false));
        assert!(matches!(result, Err(RecorderError::UpstreamClosed)));
        drop(stop_watcher);
    }
}
