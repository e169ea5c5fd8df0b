use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

/// Domain interface to a face detection + embedding backend.
///
/// The scan only needs two capabilities: locating faces in a frame and
/// turning one located face into a fixed-length embedding. Implementations
/// may hold inference sessions, hence `&mut self`.
pub trait FaceAnalyzer: Send {
    /// Returns face boxes in the backend's own enumeration order.
    fn detect_faces(&mut self, frame: &Frame) -> Result<Vec<FaceBox>, Box<dyn std::error::Error>>;

    /// Embeds the face inside `face`. Every call for one backend returns
    /// vectors of the same length.
    fn embed(
        &mut self,
        frame: &Frame,
        face: &FaceBox,
    ) -> Result<Vec<f32>, Box<dyn std::error::Error>>;
}
