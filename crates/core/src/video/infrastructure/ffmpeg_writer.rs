use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_writer::VideoWriter;

use super::codec_fallback::{first_successful, CodecCandidate, DEFAULT_CODEC_CHAIN};

/// Frame rate used when the source reports none.
const FALLBACK_FPS: i32 = 30;

/// Encodes RGB frames via ffmpeg-next, trying each codec of a fallback
/// chain until one initializes.
pub struct FfmpegWriter {
    candidates: &'static [CodecCandidate],
    state: Option<EncoderState>,
    codec: Option<&'static str>,
}

struct EncoderState {
    octx: ffmpeg_next::format::context::Output,
    encoder: ffmpeg_next::codec::encoder::video::Encoder,
    scaler: ffmpeg_next::software::scaling::Context,
    width: u32,
    height: u32,
    time_base: ffmpeg_next::Rational,
    frame_count: usize,
}

// Safety: FfmpegWriter is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegWriter {}

impl FfmpegWriter {
    pub fn new() -> Self {
        Self::with_candidates(DEFAULT_CODEC_CHAIN)
    }

    pub fn with_candidates(candidates: &'static [CodecCandidate]) -> Self {
        Self {
            candidates,
            state: None,
            codec: None,
        }
    }
}

impl Default for FfmpegWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoWriter for FfmpegWriter {
    fn open(
        &mut self,
        path: &Path,
        metadata: &VideoMetadata,
    ) -> Result<(), Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let (candidate, (octx, encoder, time_base)) =
            first_successful(self.candidates, |candidate| {
                open_encoder(path, metadata, candidate)
            })?;

        let scaler = ffmpeg_next::software::scaling::Context::get(
            ffmpeg_next::format::Pixel::RGB24,
            metadata.width,
            metadata.height,
            ffmpeg_next::format::Pixel::YUV420P,
            metadata.width,
            metadata.height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        log::info!(
            "Writing {} ({}x{}, {} encoder)",
            path.display(),
            metadata.width,
            metadata.height,
            candidate.name
        );

        self.codec = Some(candidate.name);
        self.state = Some(EncoderState {
            octx,
            encoder,
            scaler,
            width: metadata.width,
            height: metadata.height,
            time_base,
            frame_count: 0,
        });
        Ok(())
    }

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        let state = self.state.as_mut().ok_or("FfmpegWriter: not opened")?;
        if frame.width() != state.width || frame.height() != state.height {
            return Err(format!(
                "frame is {}x{}, writer expects {}x{}",
                frame.width(),
                frame.height(),
                state.width,
                state.height
            )
            .into());
        }

        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::new(
            ffmpeg_next::format::Pixel::RGB24,
            state.width,
            state.height,
        );

        let stride = rgb_frame.stride(0);
        let row_len = state.width as usize * 3;
        let data = rgb_frame.data_mut(0);
        let src = frame.data();

        // Copy pixel data, respecting stride
        for row in 0..state.height as usize {
            let src_start = row * row_len;
            let dst_start = row * stride;
            data[dst_start..dst_start + row_len]
                .copy_from_slice(&src[src_start..src_start + row_len]);
        }

        let mut yuv_frame = ffmpeg_next::util::frame::video::Video::empty();
        state.scaler.run(&rgb_frame, &mut yuv_frame)?;
        yuv_frame.set_pts(Some(state.frame_count as i64));

        state.encoder.send_frame(&yuv_frame)?;
        state.drain_packets()?;

        state.frame_count += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let Some(mut state) = self.state.take() else {
            return Ok(());
        };

        state.encoder.send_eof()?;
        state.drain_packets()?;
        state.octx.write_trailer()?;
        log::debug!("Encoder closed after {} frames", state.frame_count);
        Ok(())
    }

    fn codec_name(&self) -> Option<String> {
        self.codec.map(str::to_string)
    }
}

impl EncoderState {
    fn drain_packets(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let ost_time_base = self
            .octx
            .stream(0)
            .ok_or("output stream missing")?
            .time_base();

        let mut encoded = ffmpeg_next::Packet::empty();
        while self.encoder.receive_packet(&mut encoded).is_ok() {
            encoded.set_stream(0);
            encoded.rescale_ts(self.time_base, ost_time_base);
            encoded.write_interleaved(&mut self.octx)?;
        }
        Ok(())
    }
}

type OpenedEncoder = (
    ffmpeg_next::format::context::Output,
    ffmpeg_next::codec::encoder::video::Encoder,
    ffmpeg_next::Rational,
);

/// One complete initialization attempt: container, stream, encoder and
/// header. Everything is dropped if any step fails.
fn open_encoder(
    path: &Path,
    metadata: &VideoMetadata,
    candidate: &CodecCandidate,
) -> Result<OpenedEncoder, Box<dyn std::error::Error>> {
    let codec = ffmpeg_next::encoder::find(candidate.id)
        .ok_or_else(|| format!("{} encoder not found", candidate.name))?;

    let mut octx = ffmpeg_next::format::output(path)?;

    let global_header = octx
        .format()
        .flags()
        .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

    let mut ost = octx.add_stream(Some(codec))?;

    let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
        .encoder()
        .video()?;

    let (num, den) = frame_rate_of(metadata.fps);
    let time_base = ffmpeg_next::Rational(den, num);

    encoder_ctx.set_width(metadata.width);
    encoder_ctx.set_height(metadata.height);
    encoder_ctx.set_format(ffmpeg_next::format::Pixel::YUV420P);
    encoder_ctx.set_time_base(time_base);
    encoder_ctx.set_frame_rate(Some(ffmpeg_next::Rational(num, den)));

    if global_header {
        encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
    }

    let encoder = encoder_ctx.open_with(candidate.dictionary())?;
    ost.set_parameters(&encoder);
    ost.set_time_base(time_base);

    octx.write_header()?;

    Ok((octx, encoder, time_base))
}

/// Rational approximation `(num, den)` of `fps` to a thousandth,
/// reduced. Non-positive or non-finite rates map to 30/1.
fn frame_rate_of(fps: f64) -> (i32, i32) {
    if !fps.is_finite() || fps <= 0.0 {
        return (FALLBACK_FPS, 1);
    }
    let num = (fps * 1000.0).round() as i64;
    if num <= 0 || num > i32::MAX as i64 {
        return (FALLBACK_FPS, 1);
    }
    let den = 1000i64;
    let g = gcd(num, den);
    ((num / g) as i32, (den / g) as i32)
}

fn gcd(mut a: i64, mut b: i64) -> i64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}
