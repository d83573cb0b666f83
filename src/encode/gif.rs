//! Streaming GIF89a output.
//!
//! The header, the global Plan9 colour table and the looping extension are written in `begin`;
//! each pushed frame is LZW-compressed and written immediately, and `end` writes the trailer.
//! Nothing but the current frame is held in memory.

use std::{borrow::Cow, io::Write};

use crate::{
    encode::sink::{Animation, FrameSink, SinkConfig, check_frame_size},
    foundation::core::FrameIndex,
    foundation::error::{LissajousError, LissajousResult},
    render::{palette::plan9, quantize::IndexedFrame},
};

enum State<W: Write> {
    Idle(W),
    Encoding {
        encoder: gif::Encoder<W>,
        cfg: SinkConfig,
        pushed: u64,
    },
    Finished { out: W, frames: u64 },
    Poisoned,
}

/// [`FrameSink`] that writes an animated GIF to `W`.
pub struct GifSink<W: Write> {
    state: State<W>,
}

impl<W: Write> GifSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            state: State::Idle(out),
        }
    }

    /// Number of frames written so far; after `end`, the final count.
    ///
    /// Zero before `begin` and after a failed `begin` or `end`.
    pub fn frames_written(&self) -> u64 {
        match &self.state {
            State::Encoding { pushed, .. } => *pushed,
            State::Finished { frames, .. } => *frames,
            State::Idle(_) | State::Poisoned => 0,
        }
    }

    /// Return the writer once the trailer has been written.
    pub fn into_inner(self) -> Option<W> {
        match self.state {
            State::Finished { out, .. } => Some(out),
            _ => None,
        }
    }
}

fn gif_dim(v: u32, what: &str) -> LissajousResult<u16> {
    u16::try_from(v)
        .ok()
        .filter(|&d| d > 0)
        .ok_or_else(|| LissajousError::validation(format!("gif {what} must be in 1..=65535, got {v}")))
}

fn repeat_for(loop_count: u16) -> gif::Repeat {
    if loop_count == 0 {
        gif::Repeat::Infinite
    } else {
        gif::Repeat::Finite(loop_count)
    }
}

impl<W: Write> FrameSink for GifSink<W> {
    fn begin(&mut self, cfg: SinkConfig) -> LissajousResult<()> {
        let State::Idle(out) = std::mem::replace(&mut self.state, State::Poisoned) else {
            return Err(LissajousError::validation("gif sink already started"));
        };
        let width = gif_dim(cfg.width, "width")?;
        let height = gif_dim(cfg.height, "height")?;

        let mut encoder = gif::Encoder::new(out, width, height, &plan9().rgb_bytes())?;
        encoder.set_repeat(repeat_for(cfg.loop_count))?;

        self.state = State::Encoding {
            encoder,
            cfg,
            pushed: 0,
        };
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &IndexedFrame) -> LissajousResult<()> {
        let State::Encoding {
            encoder,
            cfg,
            pushed,
        } = &mut self.state
        else {
            return Err(LissajousError::validation(
                "push_frame called outside begin/end",
            ));
        };
        if idx.0 != *pushed {
            return Err(LissajousError::validation(format!(
                "frames must arrive in order: got {}, expected {}",
                idx.0, *pushed
            )));
        }
        if *pushed >= cfg.frame_count {
            return Err(LissajousError::validation(format!(
                "more than the declared {} frames",
                cfg.frame_count
            )));
        }
        check_frame_size(cfg.width, cfg.height, frame)?;

        let out = gif::Frame {
            width: cfg.width as u16,
            height: cfg.height as u16,
            delay: frame.delay,
            buffer: Cow::Borrowed(frame.indices.as_slice()),
            ..gif::Frame::default()
        };
        encoder.write_frame(&out)?;
        *pushed += 1;
        Ok(())
    }

    fn end(&mut self) -> LissajousResult<()> {
        let State::Encoding {
            encoder,
            cfg,
            pushed,
        } = std::mem::replace(&mut self.state, State::Poisoned)
        else {
            return Err(LissajousError::validation("end called before begin"));
        };
        if pushed != cfg.frame_count {
            return Err(LissajousError::validation(format!(
                "expected {} frames, got {pushed}",
                cfg.frame_count
            )));
        }
        let out = encoder.into_inner()?;
        self.state = State::Finished {
            out,
            frames: pushed,
        };
        Ok(())
    }
}

/// Serialize a fully built animation to `out` in one pass.
pub fn encode_animation<W: Write>(anim: &Animation, out: W) -> LissajousResult<W> {
    if anim.is_empty() {
        return Err(LissajousError::validation("animation has no frames"));
    }
    let mut sink = GifSink::new(out);
    sink.begin(SinkConfig {
        width: anim.width,
        height: anim.height,
        frame_count: anim.len() as u64,
        loop_count: anim.loop_count,
    })?;
    for (i, frame) in anim.frames().iter().enumerate() {
        sink.push_frame(FrameIndex(i as u64), frame)?;
    }
    sink.end()?;
    sink.into_inner()
        .ok_or_else(|| LissajousError::encode("gif sink did not finish"))
}
