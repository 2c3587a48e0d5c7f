//! Message transformation
//!
//! Flattens sampled messages into scalar field paths for per-field detection.

pub mod flatten;

pub use flatten::flatten_message;
