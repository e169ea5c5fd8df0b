use std::path::PathBuf;

use crate::annotation::domain::frame_annotator::FrameAnnotator;
use crate::annotation::infrastructure::match_box_annotator::MatchBoxAnnotator;
use crate::detection::domain::face_analyzer::FaceAnalyzer;
use crate::detection::infrastructure::onnx_face_analyzer::OnnxFaceAnalyzer;
use crate::pipeline::person_scan::ScanComponentFactory;
use crate::pipeline::scan_parameters::ScanParameters;
use crate::shared::constants::{
    DETECTOR_MODEL_NAME, DETECTOR_MODEL_URL, EMBEDDING_MODEL_NAME, EMBEDDING_MODEL_URL,
};
use crate::shared::model_resolver::{ModelLocator, ModelSpec, ProgressFn};
use crate::video::domain::image_reader::ImageReader;
use crate::video::domain::image_writer::ImageWriter;
use crate::video::domain::video_reader::VideoReader;
use crate::video::domain::video_writer::VideoWriter;
use crate::video::infrastructure::ffmpeg_reader::FfmpegReader;
use crate::video::infrastructure::ffmpeg_writer::FfmpegWriter;
use crate::video::infrastructure::image_file_reader::ImageFileReader;
use crate::video::infrastructure::image_file_writer::ImageFileWriter;

pub const DETECTOR_MODEL: ModelSpec = ModelSpec {
    name: DETECTOR_MODEL_NAME,
    url: DETECTOR_MODEL_URL,
};

pub const EMBEDDING_MODEL: ModelSpec = ModelSpec {
    name: EMBEDDING_MODEL_NAME,
    url: EMBEDDING_MODEL_URL,
};

/// Download progress: `(model name, bytes downloaded, total bytes)`.
pub type DownloadProgress = fn(&str, u64, u64);

/// Production collaborators: ONNX face models, ffmpeg video I/O and
/// `image` stills.
pub struct OnnxScanComponents {
    locator: ModelLocator,
    progress: Option<DownloadProgress>,
}

impl OnnxScanComponents {
    pub fn new(locator: ModelLocator) -> Self {
        Self {
            locator,
            progress: None,
        }
    }

    pub fn with_download_progress(mut self, progress: DownloadProgress) -> Self {
        self.progress = Some(progress);
        self
    }

    fn resolve(&self, spec: &ModelSpec) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let name = spec.name;
        let progress = self.progress.map(|report| -> ProgressFn {
            Box::new(move |done, total| report(name, done, total))
        });
        Ok(self.locator.resolve(spec, progress)?)
    }
}

impl ScanComponentFactory for OnnxScanComponents {
    fn analyzer(
        &self,
        parameters: &ScanParameters,
    ) -> Result<Box<dyn FaceAnalyzer>, Box<dyn std::error::Error>> {
        let detector = self.resolve(&DETECTOR_MODEL)?;
        let embedder = self.resolve(&EMBEDDING_MODEL)?;
        Ok(Box::new(OnnxFaceAnalyzer::from_models(
            &detector,
            &embedder,
            parameters.confidence,
        )?))
    }

    fn image_reader(&self) -> Box<dyn ImageReader> {
        Box::new(ImageFileReader::new())
    }

    fn video_reader(&self) -> Box<dyn VideoReader> {
        Box::new(FfmpegReader::new())
    }

    fn video_writer(&self) -> Box<dyn VideoWriter> {
        Box::new(FfmpegWriter::new())
    }

    fn annotator(&self) -> Box<dyn FrameAnnotator> {
        Box::new(MatchBoxAnnotator::default())
    }

    fn snapshot_writer(&self) -> Box<dyn ImageWriter> {
        Box::new(ImageFileWriter::default())
    }
}
