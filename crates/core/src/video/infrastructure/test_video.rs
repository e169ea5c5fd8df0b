//! Tiny MPEG-4 clips generated on the fly for ffmpeg round-trip tests.

use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_writer::VideoWriter;

use super::codec_fallback::CodecCandidate;
use super::ffmpeg_writer::FfmpegWriter;

const MPEG4: &[CodecCandidate] = &[CodecCandidate {
    name: "mpeg4",
    id: ffmpeg_next::codec::Id::MPEG4,
    options: &[],
}];

/// Writes `num_frames` frames produced by `make_frame(index)`.
pub fn write_video<F>(
    path: &Path,
    num_frames: usize,
    width: u32,
    height: u32,
    fps: f64,
    make_frame: F,
) where
    F: Fn(usize) -> Frame,
{
    let metadata = VideoMetadata {
        width,
        height,
        fps,
        total_frames: num_frames,
        codec: String::new(),
        source_path: None,
    };
    let mut writer = FfmpegWriter::with_candidates(MPEG4);
    writer.open(path, &metadata).unwrap();
    for i in 0..num_frames {
        writer.write(&make_frame(i)).unwrap();
    }
    writer.close().unwrap();
}

/// Solid gray frames whose brightness steps with the frame index.
pub fn write_gray_video(path: &Path, num_frames: usize, width: u32, height: u32, fps: f64) {
    write_video(path, num_frames, width, height, fps, |i| {
        let value = ((i * 40) % 256) as u8;
        Frame::new(vec![value; Frame::buffer_len(width, height)], width, height, i)
    });
}
