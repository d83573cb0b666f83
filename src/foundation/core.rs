use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::foundation::error::{LissajousError, LissajousResult};

/// Background fill of every frame.
pub const BACKGROUND: image::Rgba<u8> = image::Rgba([0, 0, 0, 255]);
/// Colour of the traced curve.
pub const FOREGROUND: image::Rgba<u8> = image::Rgba([0, 255, 0, 255]);

/// 0-based frame index within one animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameIndex(pub u64);

/// Fixed knobs of an animation.
///
/// These are process-wide: the server loads them once at start-up and every request shares them.
/// Only the frequency ratio varies between animations.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnimationParams {
    /// Canvas half-width in pixels; the canvas side is `2 * size + 1`.
    pub size: u32,
    /// Number of frames per animation.
    pub nframes: u32,
    /// Per-frame delay in hundredths of a second.
    pub delay: u16,
    /// Value written to the looping extension.
    pub loop_count: u16,
    /// Number of full turns of the `x` oscillator per frame.
    pub cycles: u32,
    /// Step of the curve parameter `t`, in radians.
    pub angular_step: f64,
    /// Phase advance between consecutive frames, in radians.
    pub phase_step: f64,
    /// Frequency ratios are drawn from `[0, max_frequency)`.
    pub max_frequency: f64,
}

impl Default for AnimationParams {
    fn default() -> Self {
        Self {
            size: 100,
            nframes: 64,
            delay: 8,
            loop_count: 64,
            cycles: 5,
            angular_step: 0.001,
            phase_step: 0.2,
            max_frequency: 3.0,
        }
    }
}

impl AnimationParams {
    pub fn validate(&self) -> LissajousResult<()> {
        if self.size == 0 {
            return Err(LissajousError::validation("size must be non-zero"));
        }
        if self.canvas_side() > u32::from(u16::MAX) {
            return Err(LissajousError::validation(format!(
                "canvas side {} exceeds the gif limit of {}",
                self.canvas_side(),
                u16::MAX
            )));
        }
        if self.nframes == 0 {
            return Err(LissajousError::validation("nframes must be non-zero"));
        }
        if self.cycles == 0 {
            return Err(LissajousError::validation("cycles must be non-zero"));
        }
        if !(self.angular_step.is_finite() && self.angular_step > 0.0) {
            return Err(LissajousError::validation(
                "angular_step must be finite and > 0",
            ));
        }
        if !self.phase_step.is_finite() {
            return Err(LissajousError::validation("phase_step must be finite"));
        }
        if !(self.max_frequency.is_finite() && self.max_frequency > 0.0) {
            return Err(LissajousError::validation(
                "max_frequency must be finite and > 0",
            ));
        }
        Ok(())
    }

    /// Width and height of every frame.
    pub fn canvas_side(&self) -> u32 {
        self.size.saturating_mul(2).saturating_add(1)
    }

    /// Nominal phase of frame `idx`.
    ///
    /// The generator accumulates the phase frame by frame, so the running value can drift from
    /// this closed form by a few ulps.
    pub fn phase_at(&self, idx: FrameIndex) -> f64 {
        self.phase_step * idx.0 as f64
    }
}

/// Cooperative cancellation flag shared between the server and in-flight renders.
///
/// Renders poll it between frames, so tripping it stops work at the next frame boundary.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
