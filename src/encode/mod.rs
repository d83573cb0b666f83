//! Encoding sinks.
//!
//! Sinks consume quantized frames in animation order and are driven by
//! [`Generator::run`](crate::Generator::run).

/// Streaming animated-GIF sink.
pub mod gif;
/// Generic frame sink trait and the in-memory animation.
pub mod sink;
