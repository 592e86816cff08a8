use std::io::{ErrorKind, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use tracing::{debug, error};

use crate::error::RecorderError;

use super::state::StateHandle;

/// Drain `source` one chunk at a time until it fails or `shutdown` is set.
///
/// Every chunk is read, whether or not it is kept; an unread pipe would stall
/// whatever is producing the audio. Kept chunks go to the active track.
pub fn run_capture<R: Read>(
    mut source: R,
    state: &StateHandle,
    chunk_size: usize,
    shutdown: &AtomicBool,
) -> Result<(), RecorderError> {
    let mut chunk = vec![0u8; chunk_size];

    loop {
        if shutdown.load(Ordering::Relaxed) {
            debug!("capture loop stopping");
            return Ok(());
        }

        source.read_exact(&mut chunk).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => RecorderError::UpstreamClosed,
            _ => RecorderError::Read(e),
        })?;

        if state.gate_open() {
            state.append(&chunk);
        }
    }
}

/// Run [`run_capture`] on a dedicated thread.
pub fn spawn_capture<R>(
    source: R,
    state: StateHandle,
    chunk_size: usize,
    shutdown: Arc<AtomicBool>,
) -> Result<JoinHandle<Result<(), RecorderError>>, RecorderError>
where
    R: Read + Send + 'static,
{
    thread::Builder::new()
        .name("capture".to_string())
        .spawn(move || {
            let result = run_capture(source, &state, chunk_size, &shutdown);
            if let Err(e) = &result {
                error!(error = %e, "capture stopped");
            }
            result
        })
        .map_err(|source| RecorderError::Spawn {
            name: "capture",
            source,
        })
}
