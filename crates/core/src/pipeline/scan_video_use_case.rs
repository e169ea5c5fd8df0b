use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::detection::domain::face_matcher::FaceMatcher;
use crate::detection::domain::reference_signature::ReferenceSignature;
use crate::shared::scan_error::{FailedStage, ScanError, StageError};
use crate::shared::snapshot_path::snapshot_path_for;
use crate::shared::video_metadata::VideoMetadata;

use super::detection_aggregator::DetectionSummary;
use super::pipeline_logger::PipelineLogger;
use super::scan_executor::{ScanComponents, ScanConfig, ScanExecutor};

struct OpenedVideo {
    metadata: VideoMetadata,
    output_path: PathBuf,
    snapshot_path: PathBuf,
}

/// Opens the input and output videos, then hands the scan loop to a
/// `ScanExecutor`.
///
/// Single-use: `scan` consumes the components, so a second call fails.
pub struct ScanVideoUseCase {
    components: Option<ScanComponents>,
    executor: Box<dyn ScanExecutor>,
    cancelled: Arc<AtomicBool>,
    opened: Option<OpenedVideo>,
}

impl ScanVideoUseCase {
    pub fn new(
        components: ScanComponents,
        executor: Box<dyn ScanExecutor>,
        cancelled: Option<Arc<AtomicBool>>,
    ) -> Self {
        Self {
            components: Some(components),
            executor,
            cancelled: cancelled.unwrap_or_else(|| Arc::new(AtomicBool::new(false))),
            opened: None,
        }
    }

    /// Opens the source, then the output with the source's geometry and
    /// rate. The source is closed again if the output cannot be opened.
    pub fn open(
        &mut self,
        video_path: &Path,
        output_path: &Path,
    ) -> Result<&VideoMetadata, StageError> {
        let components = self.components.as_mut().ok_or_else(already_executed)?;

        let metadata = components.reader.open(video_path).map_err(|e| {
            StageError::new(FailedStage::VideoOpen, ScanError::input(video_path, e))
        })?;
        log::info!(
            "Opened {}: {}x{} at {:.2} fps, {} frames, codec {}",
            video_path.display(),
            metadata.width,
            metadata.height,
            metadata.fps,
            metadata.total_frames,
            metadata.codec
        );

        if let Err(e) = components.writer.open(output_path, &metadata) {
            components.reader.close();
            return Err(StageError::muxing(
                &format!("cannot open output video {}", output_path.display()),
                e,
            ));
        }
        if let Some(codec) = components.writer.codec_name() {
            log::info!("Writing {} with codec {codec}", output_path.display());
        }

        let opened = self.opened.insert(OpenedVideo {
            metadata,
            output_path: output_path.to_path_buf(),
            snapshot_path: snapshot_path_for(output_path),
        });
        Ok(&opened.metadata)
    }

    pub fn scan(
        &mut self,
        reference: &ReferenceSignature,
        matcher: &FaceMatcher,
        frame_skip: usize,
        logger: &mut dyn PipelineLogger,
    ) -> Result<DetectionSummary, StageError> {
        let opened = self.opened.take().ok_or_else(|| {
            StageError::new(
                FailedStage::Scanning,
                ScanError::Runtime("video must be opened before scanning".to_string()),
            )
        })?;
        let components = self.components.take().ok_or_else(already_executed)?;

        let config = ScanConfig {
            reference,
            matcher,
            metadata: &opened.metadata,
            frame_skip,
            output_path: &opened.output_path,
            snapshot_path: &opened.snapshot_path,
            cancelled: self.cancelled.clone(),
        };
        log::info!(
            "Scanning every {frame_skip} frame(s) with {} distance, tolerance {:.2}",
            matcher.metric(),
            matcher.tolerance()
        );
        let summary = self.executor.execute(components, &config, logger)?;

        log::info!(
            "Scan finished: {} of {} sampled frames matched; output written to {}",
            summary.detected_frame_count,
            summary.sampled_frame_count,
            summary.output_video_path.display()
        );
        Ok(summary)
    }
}

fn already_executed() -> StageError {
    StageError::new(
        FailedStage::Scanning,
        ScanError::Runtime("scan already executed".to_string()),
    )
}
