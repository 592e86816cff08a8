//! State shared between the capture thread and the event dispatch thread.

use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::track::Track;

/// The active track slot and the two flags that gate capture.
///
/// One mutex guards the slot: every append and every swap happens while it
/// is held, so a chunk lands either wholly in the outgoing track or wholly
/// in the incoming one.
#[derive(Debug)]
pub struct SharedState {
    active: Mutex<Track>,
    playing: AtomicBool,
    recording: AtomicBool,
}

pub type StateHandle = Arc<SharedState>;

impl SharedState {
    /// Start with a placeholder as the active track.
    pub fn new(recording: bool) -> Self {
        Self {
            active: Mutex::new(Track::placeholder()),
            playing: AtomicBool::new(false),
            recording: AtomicBool::new(recording),
        }
    }

    pub fn handle(recording: bool) -> StateHandle {
        Arc::new(Self::new(recording))
    }

    // A panic while holding the lock cannot leave a half-written swap, and a
    // partially extended buffer is still valid audio, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, Track> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a captured chunk to the active track.
    pub fn append(&self, chunk: &[u8]) {
        self.lock().append(chunk);
    }

    /// Replace the active track, returning the outgoing one.
    pub fn swap(&self, next: Track) -> Track {
        let mut active = self.lock();
        mem::replace(&mut *active, next)
    }

    /// Inspect the active track under the lock.
    pub fn with_active<R>(&self, f: impl FnOnce(&Track) -> R) -> R {
        f(&self.lock())
    }

    pub fn set_playing(&self, playing: bool) {
        self.playing.store(playing, Ordering::Relaxed);
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Relaxed)
    }

    pub fn set_recording(&self, recording: bool) {
        self.recording.store(recording, Ordering::Relaxed);
    }

    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::Relaxed)
    }

    /// Capture is kept only while the player is playing and recording is on.
    pub fn gate_open(&self) -> bool {
        self.is_playing() && self.is_recording()
    }
}
