use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use serde::Serialize;

use crate::annotation::domain::frame_annotator::FrameAnnotator;
use crate::detection::domain::face_analyzer::FaceAnalyzer;
use crate::detection::domain::face_matcher::FaceMatcher;
use crate::shared::scan_error::{ErrorKind, FailedStage, ScanError, StageError};
use crate::video::domain::image_reader::ImageReader;
use crate::video::domain::image_writer::ImageWriter;
use crate::video::domain::video_reader::VideoReader;
use crate::video::domain::video_writer::VideoWriter;

use super::detection_aggregator::DetectionSummary;
use super::encode_reference_use_case::EncodeReferenceUseCase;
use super::pipeline_logger::PipelineLogger;
use super::scan_executor::{ScanComponents, ScanExecutor};
use super::scan_parameters::ScanParameters;
use super::scan_state::{ScanEvent, ScanState, ScanStateMachine};
use super::scan_video_use_case::ScanVideoUseCase;

/// What to scan and how.
#[derive(Clone, Debug)]
pub struct ScanRequest {
    pub reference_path: PathBuf,
    pub video_path: PathBuf,
    pub output_path: PathBuf,
    pub parameters: ScanParameters,
}

/// Outcome of a run. Exactly one of `summary` or the error fields is set.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScanReport {
    pub success: bool,
    pub state: ScanState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<DetectionSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    /// Unset for parameter errors, which are caught before the run starts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<FailedStage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ScanReport {
    fn completed(summary: DetectionSummary, state: ScanState) -> Self {
        Self {
            success: true,
            state,
            summary: Some(summary),
            error_kind: None,
            stage: None,
            message: None,
        }
    }

    /// A failed run, for callers that fail before or around [`PersonScan::run`].
    pub fn failed(error: &ScanError, stage: Option<FailedStage>, state: ScanState) -> Self {
        Self {
            success: false,
            state,
            summary: None,
            error_kind: Some(error.kind()),
            stage,
            message: Some(error.to_string()),
        }
    }
}

/// Builds the concrete collaborators of a run.
pub trait ScanComponentFactory {
    fn analyzer(
        &self,
        parameters: &ScanParameters,
    ) -> Result<Box<dyn FaceAnalyzer>, Box<dyn std::error::Error>>;

    fn image_reader(&self) -> Box<dyn ImageReader>;

    fn video_reader(&self) -> Box<dyn VideoReader>;

    fn video_writer(&self) -> Box<dyn VideoWriter>;

    fn annotator(&self) -> Box<dyn FrameAnnotator>;

    fn snapshot_writer(&self) -> Box<dyn ImageWriter>;
}

/// Entry point of a scan: validate → encode reference → open videos →
/// scan. Never panics on bad input; every failure comes back as a
/// [`ScanReport`].
///
/// Single-use, since a run owns its executor and components.
pub struct PersonScan {
    factory: Box<dyn ScanComponentFactory>,
    executor: Box<dyn ScanExecutor>,
    cancelled: Arc<AtomicBool>,
}

impl PersonScan {
    pub fn new(factory: Box<dyn ScanComponentFactory>, executor: Box<dyn ScanExecutor>) -> Self {
        Self {
            factory,
            executor,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that stops the scan between frames once set.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    pub fn run(self, request: &ScanRequest, logger: &mut dyn PipelineLogger) -> ScanReport {
        let mut machine = ScanStateMachine::new();

        if let Err(e) = request.parameters.validate() {
            log::error!("{e}");
            return ScanReport::failed(&e, None, machine.state());
        }

        match self.scan(request, logger, &mut machine) {
            Ok(summary) => {
                machine.apply(ScanEvent::ScanFinished);
                ScanReport::completed(summary, machine.state())
            }
            Err(e) => {
                log::error!("{e}");
                machine.apply(ScanEvent::Failure(e.stage));
                ScanReport::failed(&e.error, Some(e.stage), machine.state())
            }
        }
    }

    fn scan(
        self,
        request: &ScanRequest,
        logger: &mut dyn PipelineLogger,
        machine: &mut ScanStateMachine,
    ) -> Result<DetectionSummary, StageError> {
        let params = &request.parameters;
        let reference_failure = |e: ScanError| StageError::new(FailedStage::ReferenceLoad, e);

        let mut analyzer = self
            .factory
            .analyzer(params)
            .map_err(|e| reference_failure(ScanError::runtime("cannot load face models", e)))?;

        let reference = EncodeReferenceUseCase::new(self.factory.image_reader())
            .execute(analyzer.as_mut(), &request.reference_path)
            .map_err(reference_failure)?;
        machine.apply(ScanEvent::ReferenceEncoded);
        logger.info(&format!(
            "Reference encoded from {} ({}-d embedding)",
            reference.source_path().display(),
            reference.dimension()
        ));

        let components = ScanComponents {
            reader: self.factory.video_reader(),
            writer: self.factory.video_writer(),
            analyzer,
            annotator: self.factory.annotator(),
            snapshot_writer: self.factory.snapshot_writer(),
        };
        let mut use_case =
            ScanVideoUseCase::new(components, self.executor, Some(self.cancelled.clone()));
        use_case.open(&request.video_path, &request.output_path)?;
        machine.apply(ScanEvent::ScanStarted);

        let matcher = FaceMatcher::new(params.tolerance, params.metric);
        use_case.scan(&reference, &matcher, params.frame_skip, logger)
    }
}
