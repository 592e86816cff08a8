//! Configuration loader and schema types.
//!
//! This module exposes the configuration schema handed to every component at
//! startup and helpers to load it from disk and the environment.

mod load;
mod schema;

pub use schema::*;
