use std::path::Path;

use crate::detection::domain::face_analyzer::FaceAnalyzer;
use crate::detection::domain::reference_signature::ReferenceSignature;
use crate::shared::scan_error::ScanError;
use crate::video::domain::image_reader::ImageReader;

/// Turns the reference photograph into the signature the scan matches
/// against.
///
/// When the photo holds several faces the first one the analyzer reports
/// is used.
pub struct EncodeReferenceUseCase {
    image_reader: Box<dyn ImageReader>,
}

impl EncodeReferenceUseCase {
    pub fn new(image_reader: Box<dyn ImageReader>) -> Self {
        Self { image_reader }
    }

    pub fn execute(
        &self,
        analyzer: &mut dyn FaceAnalyzer,
        path: &Path,
    ) -> Result<ReferenceSignature, ScanError> {
        let image = self
            .image_reader
            .read(path)
            .map_err(|e| ScanError::input(path, e))?;

        let faces = analyzer
            .detect_faces(&image)
            .map_err(|e| ScanError::runtime("face detection failed on reference image", e))?;
        log::info!(
            "Found {} face(s) in reference image {}",
            faces.len(),
            path.display()
        );

        let Some(first) = faces.first() else {
            return Err(ScanError::NoFaceFound {
                path: path.to_path_buf(),
            });
        };
        if faces.len() > 1 {
            log::warn!("Reference image has several faces; using the first one");
        }

        let embedding = analyzer
            .embed(&image, first)
            .map_err(|e| ScanError::runtime("cannot embed reference face", e))?;
        Ok(ReferenceSignature::new(embedding, path))
    }
}
