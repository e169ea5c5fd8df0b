use crate::detection::domain::face_matcher::FaceMatch;
use crate::shared::frame::Frame;

/// Marks matched faces on a sampled frame, in place.
///
/// Implementations must leave the frame untouched when no entry in
/// `matches` is a match, and never mark unmatched faces.
pub trait FrameAnnotator: Send {
    fn annotate(
        &self,
        frame: &mut Frame,
        timestamp: f64,
        matches: &[FaceMatch],
    ) -> Result<(), Box<dyn std::error::Error>>;
}
