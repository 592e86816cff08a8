//! Tracks: captured audio plus the identity used to name and place it.
//!
//! `naming` holds the path-building rules, `library` the music root the
//! idempotency check runs against, and `model` the `Track` itself.

mod library;
mod model;
mod naming;

pub use library::MusicLibrary;
pub use model::{Retirement, Track, TrackInfo};
