use std::io;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::mpsc::{self, Receiver};
use std::thread::JoinHandle;

use tracing::info;

use crate::config::Settings;
use crate::control;
use crate::error::RecorderError;
use crate::events::PlayerEvent;
use crate::mpris;
use crate::recorder::{
    EncodeWorker, OggEnc, Segmenter, SharedState, encode_queue, spawn_capture, spawn_encode_worker,
};
use crate::track::MusicLibrary;

type Fallible = JoinHandle<Result<(), RecorderError>>;

/// Everything started by [`start`]: the segmenter for the dispatch thread,
/// its event source, and the threads the dispatch loop keeps an eye on.
pub struct Pipeline {
    pub segmenter: Segmenter,
    pub events: Receiver<PlayerEvent>,
    pub threads: Threads,
    pub encode: JoinHandle<()>,
}

pub struct Threads {
    capture: Option<Fallible>,
    watcher: Option<Fallible>,
}

impl Threads {
    pub fn watching(capture: Fallible, watcher: Fallible) -> Self {
        Self {
            capture: Some(capture),
            watcher: Some(watcher),
        }
    }

    /// The outcome of the first watched thread that has stopped, if any.
    ///
    /// Capture ending means there is no more audio; the watcher ending means
    /// there will be no more events. Either way the pipeline is done.
    pub fn poll(&mut self) -> Option<Result<(), RecorderError>> {
        take_finished(&mut self.capture, "capture").or_else(|| take_finished(&mut self.watcher, "mpris"))
    }
}

fn take_finished(slot: &mut Option<Fallible>, name: &'static str) -> Option<Result<(), RecorderError>> {
    if !slot.as_ref().is_some_and(|h| h.is_finished()) {
        return None;
    }
    let handle = slot.take()?;
    Some(handle.join().unwrap_or(Err(RecorderError::ThreadPanicked(name))))
}

/// Spawn the encode worker, the optional control client, the player watcher
/// and the capture thread, in that order, so each consumer exists before
/// its producer.
pub fn start(settings: &Settings, shutdown: &Arc<AtomicBool>) -> Result<Pipeline, RecorderError> {
    let recorder = &settings.recorder;

    // Without a control channel nothing could ever turn recording on.
    let recording = settings.control.broker.is_none() || settings.control.start_recording;
    let state = SharedState::handle(recording);

    let library = MusicLibrary::new(&recorder.music_root, recorder.extension.as_str());
    let (queue_tx, queue_rx) = encode_queue(recorder.queue_capacity);
    let worker = EncodeWorker::new(
        OggEnc::new(settings.encoder.clone()),
        library.clone(),
        recorder.backup_root.clone(),
    );
    let encode = spawn_encode_worker(worker, queue_rx)?;

    if let Some(broker) = settings.control.broker.clone() {
        info!(broker = %broker, topic = %settings.control.topic, recording, "remote control enabled");
        // Detached: it only ever flips the recording flag.
        control::spawn_control(settings.control.clone(), broker, state.clone())?;
    }

    let (event_tx, events) = mpsc::channel();
    let watcher = mpris::spawn_player_watcher(settings.player.clone(), event_tx)?;

    let capture = spawn_capture(
        io::stdin(),
        state.clone(),
        recorder.chunk_size,
        shutdown.clone(),
    )?;

    Ok(Pipeline {
        segmenter: Segmenter::new(state, queue_tx, library),
        events,
        threads: Threads::watching(capture, watcher),
        encode,
    })
}
