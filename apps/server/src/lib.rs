//! Tracker bridge server library.
//!
//! Wires the translation engine to its HTTP collaborators and exposes the
//! bridge API: document translation, metadata synchronization, and curated
//! mapping indexing.

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod state;
pub mod sync;

pub use error::{Error, Result};
