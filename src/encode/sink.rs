use crate::foundation::core::FrameIndex;
use crate::foundation::error::{LissajousError, LissajousResult};
use crate::render::quantize::IndexedFrame;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Number of frames that will be pushed.
    pub frame_count: u64,
    /// Loop count recorded in the animation.
    pub loop_count: u16,
}

/// Sink contract for consuming quantized frames in animation order.
///
/// `push_frame` is called with strictly increasing [`FrameIndex`] values starting at 0, between
/// one `begin` and one `end`.
pub trait FrameSink {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> LissajousResult<()>;
    /// Push the next frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &IndexedFrame) -> LissajousResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> LissajousResult<()>;
}

/// A complete, in-memory animation.
///
/// Every frame carries its own delay, so the frame list and the delay list cannot disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Animation {
    pub width: u32,
    pub height: u32,
    pub loop_count: u16,
    frames: Vec<IndexedFrame>,
}

impl Animation {
    pub fn new(width: u32, height: u32, loop_count: u16) -> Self {
        Self {
            width,
            height,
            loop_count,
            frames: Vec::new(),
        }
    }

    /// Append a frame; its size must match the animation canvas.
    pub fn push(&mut self, frame: IndexedFrame) -> LissajousResult<()> {
        check_frame_size(self.width, self.height, &frame)?;
        self.frames.push(frame);
        Ok(())
    }

    pub fn frames(&self) -> &[IndexedFrame] {
        &self.frames
    }

    pub fn delays(&self) -> Vec<u16> {
        self.frames.iter().map(|f| f.delay).collect()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

pub(crate) fn check_frame_size(width: u32, height: u32, frame: &IndexedFrame) -> LissajousResult<()> {
    if frame.width != width || frame.height != height {
        return Err(LissajousError::validation(format!(
            "frame size mismatch: got {}x{}, expected {}x{}",
            frame.width, frame.height, width, height
        )));
    }
    if frame.indices.len() != (width as usize) * (height as usize) {
        return Err(LissajousError::validation(
            "frame.indices size mismatch with width*height",
        ));
    }
    Ok(())
}

/// Sink that collects an [`Animation`] in memory.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    anim: Option<Animation>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Borrow the frames collected so far.
    pub fn frames(&self) -> &[IndexedFrame] {
        self.anim.as_ref().map(Animation::frames).unwrap_or(&[])
    }

    pub fn into_animation(self) -> Option<Animation> {
        self.anim
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> LissajousResult<()> {
        self.anim = Some(Animation::new(cfg.width, cfg.height, cfg.loop_count));
        self.cfg = Some(cfg);
        Ok(())
    }

    fn push_frame(&mut self, _idx: FrameIndex, frame: &IndexedFrame) -> LissajousResult<()> {
        let Some(anim) = self.anim.as_mut() else {
            return Err(LissajousError::validation("push_frame called before begin"));
        };
        anim.push(frame.clone())
    }

    fn end(&mut self) -> LissajousResult<()> {
        let (Some(cfg), Some(anim)) = (self.cfg.as_ref(), self.anim.as_ref()) else {
            return Err(LissajousError::validation("end called before begin"));
        };
        if anim.len() as u64 != cfg.frame_count {
            return Err(LissajousError::validation(format!(
                "expected {} frames, got {}",
                cfg.frame_count,
                anim.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(w: u32, h: u32, delay: u16) -> IndexedFrame {
        IndexedFrame {
            width: w,
            height: h,
            indices: vec![0; (w * h) as usize],
            delay,
        }
    }

    fn cfg(frame_count: u64) -> SinkConfig {
        SinkConfig {
            width: 3,
            height: 3,
            frame_count,
            loop_count: 2,
        }
    }

    #[test]
    fn in_memory_sink_collects_frames_and_delays() {
        let mut sink = InMemorySink::new();
        sink.begin(cfg(2)).unwrap();
        sink.push_frame(FrameIndex(0), &frame(3, 3, 8)).unwrap();
        sink.push_frame(FrameIndex(1), &frame(3, 3, 8)).unwrap();
        sink.end().unwrap();

        assert_eq!(sink.frames().len(), 2);
        let anim = sink.into_animation().unwrap();
        assert_eq!(anim.delays(), vec![8, 8]);
        assert_eq!(anim.loop_count, 2);
    }

    #[test]
    fn in_memory_sink_rejects_count_mismatch() {
        let mut sink = InMemorySink::new();
        sink.begin(cfg(2)).unwrap();
        sink.push_frame(FrameIndex(0), &frame(3, 3, 8)).unwrap();
        assert!(matches!(sink.end(), Err(LissajousError::Validation(_))));
    }

    #[test]
    fn animation_rejects_mismatched_frames() {
        let mut anim = Animation::new(3, 3, 0);
        assert!(anim.push(frame(4, 3, 1)).is_err());
        let mut short = frame(3, 3, 1);
        short.indices.pop();
        assert!(anim.push(short).is_err());
        assert!(anim.is_empty());
    }

    #[test]
    fn push_before_begin_is_an_error() {
        let mut sink = InMemorySink::new();
        assert!(sink.push_frame(FrameIndex(0), &frame(3, 3, 1)).is_err());
        assert!(sink.end().is_err());
    }
}
