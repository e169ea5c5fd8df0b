use crate::shared::frame::Frame;
use crate::shared::video_metadata::frame_timestamp;

/// A raw frame selected for matching, annotation and output.
#[derive(Clone, Debug)]
pub struct SampledFrame {
    pub frame: Frame,
    /// Seconds from the start of the video.
    pub timestamp: f64,
}

impl SampledFrame {
    pub fn index(&self) -> usize {
        self.frame.index()
    }
}

/// Strides over a raw frame stream, yielding frames whose index is a
/// multiple of `frame_skip` and counting every raw frame it pulls.
///
/// Decode errors are yielded as they come; the caller decides whether to
/// stop.
pub struct FrameSampler<I> {
    frames: I,
    frame_skip: usize,
    fps: f64,
    frames_read: usize,
}

impl<I> FrameSampler<I>
where
    I: Iterator<Item = Result<Frame, Box<dyn std::error::Error>>>,
{
    /// `frame_skip` of 0 is treated as 1.
    pub fn new(frames: I, frame_skip: usize, fps: f64) -> Self {
        Self {
            frames,
            frame_skip: frame_skip.max(1),
            fps,
            frames_read: 0,
        }
    }

    /// Raw frames pulled from the source so far, sampled or not.
    pub fn frames_read(&self) -> usize {
        self.frames_read
    }
}

impl<I> Iterator for FrameSampler<I>
where
    I: Iterator<Item = Result<Frame, Box<dyn std::error::Error>>>,
{
    type Item = Result<SampledFrame, Box<dyn std::error::Error>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let frame = match self.frames.next()? {
                Ok(frame) => frame,
                Err(e) => return Some(Err(e)),
            };
            self.frames_read += 1;
            if frame.index() % self.frame_skip != 0 {
                continue;
            }
            let timestamp = frame_timestamp(frame.index(), self.fps);
            return Some(Ok(SampledFrame { frame, timestamp }));
        }
    }
}
