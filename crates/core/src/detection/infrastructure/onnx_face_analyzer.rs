use std::path::Path;

use crate::detection::domain::face_analyzer::FaceAnalyzer;
use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

use super::arcface_embedder::ArcFaceEmbedder;
use super::onnx_yolo_detector::OnnxYoloDetector;

/// [`FaceAnalyzer`] backed by a YOLO face detector and an ArcFace embedder.
pub struct OnnxFaceAnalyzer {
    detector: OnnxYoloDetector,
    embedder: ArcFaceEmbedder,
}

impl OnnxFaceAnalyzer {
    pub fn new(detector: OnnxYoloDetector, embedder: ArcFaceEmbedder) -> Self {
        Self { detector, embedder }
    }

    pub fn from_models(
        detector_path: &Path,
        embedder_path: &Path,
        confidence: f64,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        log::info!(
            "Loading face models: detector {}, embedder {}",
            detector_path.display(),
            embedder_path.display()
        );
        Ok(Self::new(
            OnnxYoloDetector::new(detector_path, confidence)?,
            ArcFaceEmbedder::new(embedder_path)?,
        ))
    }
}

impl FaceAnalyzer for OnnxFaceAnalyzer {
    fn detect_faces(&mut self, frame: &Frame) -> Result<Vec<FaceBox>, Box<dyn std::error::Error>> {
        self.detector.detect(frame)
    }

    fn embed(
        &mut self,
        frame: &Frame,
        face: &FaceBox,
    ) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
        self.embedder.embed(frame, face)
    }
}
