use std::path::Path;
use std::time::Instant;

use crate::annotation::domain::frame_annotator::FrameAnnotator;
use crate::detection::domain::face_analyzer::FaceAnalyzer;
use crate::detection::domain::face_matcher::FaceMatcher;
use crate::detection::domain::reference_signature::ReferenceSignature;
use crate::shared::scan_error::StageError;
use crate::video::domain::image_writer::ImageWriter;
use crate::video::domain::video_writer::VideoWriter;

use super::detection_aggregator::{DetectionAggregator, FrameOutcome};
use super::frame_sampler::SampledFrame;
use super::pipeline_logger::PipelineLogger;

/// Per-sampled-frame work shared by every executor:
/// match → aggregate → annotate → snapshot → write.
///
/// Frames must be fed in index order; the first-detection snapshot and the
/// timestamp list depend on it.
pub struct FrameProcessor<'a> {
    pub analyzer: &'a mut dyn FaceAnalyzer,
    pub annotator: &'a dyn FrameAnnotator,
    pub writer: &'a mut dyn VideoWriter,
    pub snapshot_writer: &'a dyn ImageWriter,
    pub matcher: &'a FaceMatcher,
    pub reference: &'a ReferenceSignature,
    pub snapshot_path: &'a Path,
    pub aggregator: DetectionAggregator,
}

impl FrameProcessor<'_> {
    pub fn process(
        &mut self,
        sampled: SampledFrame,
        logger: &mut dyn PipelineLogger,
    ) -> Result<(), StageError> {
        let SampledFrame {
            mut frame,
            timestamp,
        } = sampled;
        let index = frame.index();

        let t0 = Instant::now();
        let matches = self
            .matcher
            .match_frame(self.analyzer, &frame, self.reference)
            .map_err(|e| {
                StageError::scanning(&format!("face matching failed on frame {index}"), e)
            })?;
        logger.timing("match", t0.elapsed().as_secs_f64() * 1000.0);
        logger.metric("faces_per_frame", matches.len() as f64);

        let outcome = self.aggregator.observe(index, timestamp, &matches);

        let t0 = Instant::now();
        self.annotator
            .annotate(&mut frame, timestamp, &matches)
            .map_err(|e| StageError::scanning(&format!("annotation failed on frame {index}"), e))?;
        logger.timing("annotate", t0.elapsed().as_secs_f64() * 1000.0);

        if outcome == FrameOutcome::FirstDetection {
            self.snapshot_writer
                .write(self.snapshot_path, &frame)
                .map_err(|e| StageError::muxing("cannot write detection snapshot", e))?;
            self.aggregator.record_snapshot(self.snapshot_path);
            log::info!(
                "Saved first detection frame to {}",
                self.snapshot_path.display()
            );
        }
        if outcome != FrameOutcome::NoMatch {
            logger.detection(index, timestamp);
        }

        let t0 = Instant::now();
        self.writer
            .write(&frame)
            .map_err(|e| StageError::muxing(&format!("cannot write output frame {index}"), e))?;
        logger.timing("write", t0.elapsed().as_secs_f64() * 1000.0);

        Ok(())
    }

    pub fn into_aggregator(self) -> DetectionAggregator {
        self.aggregator
    }
}
