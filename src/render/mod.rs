//! Curve rasterization and palette quantization.

/// Plan9 palette and nearest-colour lookup.
pub mod palette;
/// Palette quantization of rendered frames.
pub mod quantize;
/// Full-colour frame rasterization.
pub mod raster;
