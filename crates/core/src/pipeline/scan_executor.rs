use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::annotation::domain::frame_annotator::FrameAnnotator;
use crate::detection::domain::face_analyzer::FaceAnalyzer;
use crate::detection::domain::face_matcher::FaceMatcher;
use crate::detection::domain::reference_signature::ReferenceSignature;
use crate::shared::scan_error::{FailedStage, ScanError, StageError};
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::image_writer::ImageWriter;
use crate::video::domain::video_reader::VideoReader;
use crate::video::domain::video_writer::VideoWriter;

use super::detection_aggregator::{DetectionAggregator, DetectionSummary};
use super::frame_processor::FrameProcessor;
use super::pipeline_logger::PipelineLogger;

/// Components a scan consumes. The reader and writer arrive already opened;
/// the executor closes both on every exit path.
pub struct ScanComponents {
    pub reader: Box<dyn VideoReader>,
    pub writer: Box<dyn VideoWriter>,
    pub analyzer: Box<dyn FaceAnalyzer>,
    pub annotator: Box<dyn FrameAnnotator>,
    pub snapshot_writer: Box<dyn ImageWriter>,
}

/// Read-only inputs of one scan.
pub struct ScanConfig<'a> {
    pub reference: &'a ReferenceSignature,
    pub matcher: &'a FaceMatcher,
    pub metadata: &'a VideoMetadata,
    pub frame_skip: usize,
    pub output_path: &'a Path,
    pub snapshot_path: &'a Path,
    pub cancelled: Arc<AtomicBool>,
}

impl ScanConfig<'_> {
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Abstracts how the decode → match → annotate → write loop is executed.
///
/// Implementations may overlap decoding with matching, but must feed
/// sampled frames to the matcher, aggregator and writer in index order so
/// that every executor yields the same summary for the same input.
pub trait ScanExecutor: Send {
    fn execute(
        &self,
        components: ScanComponents,
        config: &ScanConfig<'_>,
        logger: &mut dyn PipelineLogger,
    ) -> Result<DetectionSummary, StageError>;
}

pub(crate) fn cancelled_error() -> StageError {
    StageError::new(
        FailedStage::Scanning,
        ScanError::Runtime("scan cancelled".to_string()),
    )
}

/// Builds the per-frame processor over borrowed components.
pub(crate) fn frame_processor<'a>(
    analyzer: &'a mut dyn FaceAnalyzer,
    annotator: &'a dyn FrameAnnotator,
    writer: &'a mut dyn VideoWriter,
    snapshot_writer: &'a dyn ImageWriter,
    config: &'a ScanConfig<'a>,
) -> FrameProcessor<'a> {
    FrameProcessor {
        analyzer,
        annotator,
        writer,
        snapshot_writer,
        matcher: config.matcher,
        reference: config.reference,
        snapshot_path: config.snapshot_path,
        aggregator: DetectionAggregator::new(config.output_path),
    }
}

/// Closes the writer whatever the loop's outcome and turns the aggregator
/// into the final summary. A loop error wins over a close error.
pub(crate) fn finish_scan(
    writer: &mut dyn VideoWriter,
    aggregator: DetectionAggregator,
    frames_read: usize,
    outcome: Result<(), StageError>,
) -> Result<DetectionSummary, StageError> {
    let closed = writer.close();

    if let Err(e) = outcome {
        if let Err(close_err) = closed {
            log::warn!("Output writer did not close cleanly after failure: {close_err}");
        }
        return Err(e);
    }
    closed.map_err(|e| StageError::muxing("cannot finalize output video", e))?;

    Ok(aggregator.finalize(frames_read, writer.codec_name()))
}
