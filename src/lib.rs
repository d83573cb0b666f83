//! Lissajous is a small HTTP service that answers every request with a freshly randomized,
//! animated Lissajous-curve GIF.
//!
//! Each animation is produced by one [`Generator`] run:
//!
//! - sample the curve for the current phase ([`LissajousCurve`])
//! - rasterize it onto a black canvas ([`render_frame`])
//! - quantize onto the fixed Plan9 palette ([`quantize`])
//! - push the frame into a [`FrameSink`], usually a streaming [`GifSink`]
//!
//! The [`server`] module wires this into an axum endpoint with graceful shutdown.
#![forbid(unsafe_code)]

mod foundation;

/// Process configuration.
pub mod config;
/// Lissajous curve sampling.
pub mod curve;
/// Encoding sinks.
pub mod encode;
/// Rasterization and palette quantization.
pub mod render;
/// HTTP endpoint.
pub mod server;
/// Per-animation orchestration.
pub mod session;

pub use crate::foundation::core::{
    AnimationParams, BACKGROUND, CancelToken, FOREGROUND, FrameIndex,
};
pub use crate::foundation::error::{LissajousError, LissajousResult};

pub use crate::config::ServerConfig;
pub use crate::curve::{CurveParams, LissajousCurve};
pub use crate::encode::gif::{GifSink, encode_animation};
pub use crate::encode::sink::{Animation, FrameSink, InMemorySink, SinkConfig};
pub use crate::render::palette::{Plan9, plan9};
pub use crate::render::quantize::{IndexedFrame, quantize};
pub use crate::render::raster::render_frame;
pub use crate::session::{Generator, RunStats};
