use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

use super::embedding_distance::DistanceMetric;
use super::face_analyzer::FaceAnalyzer;
use super::reference_signature::ReferenceSignature;

/// One face found in a sampled frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceObservation {
    pub face_box: FaceBox,
    pub embedding: Vec<f32>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchResult {
    pub is_match: bool,
    pub distance: f64,
}

/// A face paired with its comparison against the reference.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceMatch {
    pub observation: FaceObservation,
    pub result: MatchResult,
}

impl FaceMatch {
    pub fn is_match(&self) -> bool {
        self.result.is_match
    }
}

/// Scores every face in a frame against the reference signature.
///
/// A face matches iff its distance to the reference is `<= tolerance`.
/// Faces are judged independently, so several faces in one frame can match.
/// The frame is only read.
#[derive(Clone, Debug)]
pub struct FaceMatcher {
    tolerance: f64,
    metric: DistanceMetric,
}

impl FaceMatcher {
    pub fn new(tolerance: f64, metric: DistanceMetric) -> Self {
        Self { tolerance, metric }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    pub fn compare(
        &self,
        embedding: &[f32],
        reference: &ReferenceSignature,
    ) -> Result<MatchResult, Box<dyn std::error::Error>> {
        let distance = self.metric.distance(embedding, reference.embedding())?;
        Ok(MatchResult {
            is_match: distance <= self.tolerance,
            distance,
        })
    }

    /// Detects, embeds and scores each face, preserving detection order.
    pub fn match_frame(
        &self,
        analyzer: &mut dyn FaceAnalyzer,
        frame: &Frame,
        reference: &ReferenceSignature,
    ) -> Result<Vec<FaceMatch>, Box<dyn std::error::Error>> {
        let boxes = analyzer.detect_faces(frame)?;
        let mut matches = Vec::with_capacity(boxes.len());
        for face_box in boxes {
            let embedding = analyzer.embed(frame, &face_box)?;
            let result = self.compare(&embedding, reference)?;
            matches.push(FaceMatch {
                observation: FaceObservation {
                    face_box,
                    embedding,
                },
                result,
            });
        }
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    /// Returns fixed (box, embedding) pairs for every frame.
    struct FixedAnalyzer {
        faces: Vec<(FaceBox, Vec<f32>)>,
    }

    impl FaceAnalyzer for FixedAnalyzer {
        fn detect_faces(
            &mut self,
            _frame: &Frame,
        ) -> Result<Vec<FaceBox>, Box<dyn std::error::Error>> {
            Ok(self.faces.iter().map(|(b, _)| *b).collect())
        }

        fn embed(
            &mut self,
            _frame: &Frame,
            face: &FaceBox,
        ) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
            self.faces
                .iter()
                .find(|(b, _)| b == face)
                .map(|(_, e)| e.clone())
                .ok_or_else(|| "unknown face".into())
        }
    }

    fn frame() -> Frame {
        Frame::new(vec![0u8; 10 * 10 * 3], 10, 10, 0)
    }

    fn reference() -> ReferenceSignature {
        ReferenceSignature::new(vec![1.0, 0.0], "ref.png")
    }

    fn face(left: i32) -> FaceBox {
        FaceBox::new(0, left + 2, 2, left)
    }

    #[rstest]
    #[case::exact(vec![1.0, 0.0], 0.0, true)]
    #[case::inside_tolerance(vec![0.8, 0.6], 0.6, true)]
    #[case::at_boundary(vec![0.0, 1.0], 1.0, true)]
    #[case::outside_tolerance(vec![0.0, 1.0], 0.6, false)]
    fn test_compare_cosine(
        #[case] embedding: Vec<f32>,
        #[case] tolerance: f64,
        #[case] expected: bool,
    ) {
        let matcher = FaceMatcher::new(tolerance, DistanceMetric::Cosine);
        let result = matcher.compare(&embedding, &reference()).unwrap();
        assert_eq!(result.is_match, expected);
    }

    #[test]
    fn test_zero_tolerance_matches_only_exact_embedding() {
        let matcher = FaceMatcher::new(0.0, DistanceMetric::Euclidean);
        assert!(matcher.compare(&[1.0, 0.0], &reference()).unwrap().is_match);
        assert!(
            !matcher
                .compare(&[1.0, 0.0001], &reference())
                .unwrap()
                .is_match
        );
    }

    #[test]
    fn test_compare_reports_distance() {
        let matcher = FaceMatcher::new(0.6, DistanceMetric::Euclidean);
        let result = matcher.compare(&[1.0, 1.0], &reference()).unwrap();
        assert!((result.distance - 1.0).abs() < 1e-9);
        assert!(!result.is_match);
    }

    #[test]
    fn test_compare_dimension_mismatch_is_error() {
        let matcher = FaceMatcher::new(0.6, DistanceMetric::Cosine);
        assert!(matcher.compare(&[1.0, 0.0, 0.0], &reference()).is_err());
    }

    #[test]
    fn test_match_frame_no_faces() {
        let mut analyzer = FixedAnalyzer { faces: vec![] };
        let matcher = FaceMatcher::new(0.6, DistanceMetric::Cosine);
        let matches = matcher
            .match_frame(&mut analyzer, &frame(), &reference())
            .unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn test_match_frame_reports_every_face_in_order() {
        let mut analyzer = FixedAnalyzer {
            faces: vec![
                (face(0), vec![0.0, 1.0]),
                (face(3), vec![1.0, 0.0]),
                (face(6), vec![0.9, 0.1]),
            ],
        };
        let matcher = FaceMatcher::new(0.6, DistanceMetric::Cosine);
        let matches = matcher
            .match_frame(&mut analyzer, &frame(), &reference())
            .unwrap();

        assert_eq!(matches.len(), 3);
        assert_eq!(matches[0].observation.face_box, face(0));
        assert_eq!(matches[1].observation.face_box, face(3));
        assert_eq!(matches[2].observation.face_box, face(6));
        assert_eq!(
            matches.iter().map(FaceMatch::is_match).collect::<Vec<_>>(),
            vec![false, true, true]
        );
    }

    #[test]
    fn test_match_frame_propagates_embed_error() {
        struct BrokenEmbedder;
        impl FaceAnalyzer for BrokenEmbedder {
            fn detect_faces(
                &mut self,
                _frame: &Frame,
            ) -> Result<Vec<FaceBox>, Box<dyn std::error::Error>> {
                Ok(vec![FaceBox::new(0, 2, 2, 0)])
            }
            fn embed(
                &mut self,
                _frame: &Frame,
                _face: &FaceBox,
            ) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
                Err("inference failed".into())
            }
        }

        let matcher = FaceMatcher::new(0.6, DistanceMetric::Cosine);
        let result = matcher.match_frame(&mut BrokenEmbedder, &frame(), &reference());
        assert!(result.is_err());
    }
}
