//! The capture / segmentation / encode pipeline.
//!
//! ```text
//! stdin --(capture thread)--> active track --(segmenter swap)--> encode queue --(worker)--> files
//! ```
//!
//! `state` holds the single active-track slot both the capture thread and
//! the segmenter touch. Everything else is owned by one thread at a time.

mod capture;
mod encode;
mod segment;
mod state;

pub use capture::spawn_capture;
pub use encode::{EncodeWorker, OggEnc, encode_queue, spawn_encode_worker};
pub use segment::Segmenter;
pub use state::{SharedState, StateHandle};
