//! Per-animation orchestration: sample → rasterize → quantize → sink, once per frame.

use std::io::Write;

use rand::Rng;

use crate::{
    curve::CurveParams,
    encode::{
        gif::GifSink,
        sink::{Animation, FrameSink, InMemorySink, SinkConfig},
    },
    foundation::core::{AnimationParams, CancelToken, FrameIndex},
    foundation::error::{LissajousError, LissajousResult},
    render::{quantize::quantize, raster::render_frame},
};

/// Summary of one completed run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunStats {
    pub frequency_ratio: f64,
    pub frames: u64,
    /// Phase after the last advance.
    pub final_phase: f64,
}

/// Produces Lissajous animations for a fixed set of [`AnimationParams`].
///
/// A generator holds no per-animation state; it can be shared across threads and every call
/// allocates its own frames.
#[derive(Clone, Debug)]
pub struct Generator {
    params: AnimationParams,
}

impl Generator {
    pub fn new(params: AnimationParams) -> LissajousResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &AnimationParams {
        &self.params
    }

    /// Draw a frequency ratio uniformly from `[0, max_frequency)`.
    pub fn random_frequency<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        rng.gen_range(0.0..self.params.max_frequency)
    }

    /// Render every frame into `sink`.
    ///
    /// `cancel` is checked before each frame. The first sink error ends the run; no further
    /// frames are rendered after it.
    #[tracing::instrument(skip(self, sink, cancel))]
    pub fn run(
        &self,
        frequency_ratio: f64,
        sink: &mut dyn FrameSink,
        cancel: &CancelToken,
    ) -> LissajousResult<RunStats> {
        if !frequency_ratio.is_finite() {
            return Err(LissajousError::validation(format!(
                "frequency ratio must be finite, got {frequency_ratio}"
            )));
        }
        let p = &self.params;
        let side = p.canvas_side();
        sink.begin(SinkConfig {
            width: side,
            height: side,
            frame_count: u64::from(p.nframes),
            loop_count: p.loop_count,
        })?;

        let mut phase = 0.0f64;
        for i in 0..u64::from(p.nframes) {
            if cancel.is_cancelled() {
                tracing::debug!(
                    frame = i,
                    phase = p.phase_at(FrameIndex(i)),
                    "render cancelled"
                );
                return Err(LissajousError::Cancelled);
            }
            let curve = CurveParams::new(p, frequency_ratio, phase);
            let frame = quantize(&render_frame(p, &curve), p.delay);
            sink.push_frame(FrameIndex(i), &frame)?;
            phase += p.phase_step;
        }
        sink.end()?;

        Ok(RunStats {
            frequency_ratio,
            frames: u64::from(p.nframes),
            final_phase: phase,
        })
    }

    /// Stream a complete GIF to `out` and hand the writer back once it is flushed.
    pub fn write_gif<W: Write>(
        &self,
        frequency_ratio: f64,
        out: W,
        cancel: &CancelToken,
    ) -> LissajousResult<W> {
        let mut sink = GifSink::new(out);
        let stats = self.run(frequency_ratio, &mut sink, cancel)?;
        let mut out = sink
            .into_inner()
            .ok_or_else(|| LissajousError::encode("gif sink did not finish"))?;
        out.flush()?;
        tracing::debug!(frames = stats.frames, "gif written");
        Ok(out)
    }

    /// Build the whole animation in memory.
    pub fn build_animation(&self, frequency_ratio: f64) -> LissajousResult<Animation> {
        let mut sink = InMemorySink::new();
        self.run(frequency_ratio, &mut sink, &CancelToken::new())?;
        sink.into_animation()
            .ok_or_else(|| LissajousError::encode("in-memory sink did not start"))
    }
}
