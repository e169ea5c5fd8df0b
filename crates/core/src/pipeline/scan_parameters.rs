use serde::{Deserialize, Serialize};

use crate::detection::domain::embedding_distance::DistanceMetric;
use crate::shared::constants::{DEFAULT_CONFIDENCE, DEFAULT_FRAME_SKIP, DEFAULT_TOLERANCE};
use crate::shared::scan_error::ScanError;

/// Caller-tunable knobs of a scan. Missing fields deserialize to defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanParameters {
    /// Maximum embedding distance that still counts as a match.
    pub tolerance: f64,
    /// Every `frame_skip`-th raw frame is sampled, starting at frame 0.
    pub frame_skip: usize,
    pub metric: DistanceMetric,
    /// Minimum detector score for a face to be considered at all.
    pub confidence: f64,
}

impl Default for ScanParameters {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            frame_skip: DEFAULT_FRAME_SKIP,
            metric: DistanceMetric::default(),
            confidence: DEFAULT_CONFIDENCE,
        }
    }
}

impl ScanParameters {
    pub fn validate(&self) -> Result<(), ScanError> {
        if !(0.0..=1.0).contains(&self.tolerance) {
            return Err(ScanError::Parameter(format!(
                "tolerance must be between 0.0 and 1.0, got {}",
                self.tolerance
            )));
        }
        if self.frame_skip < 1 {
            return Err(ScanError::Parameter(format!(
                "frame_skip must be at least 1, got {}",
                self.frame_skip
            )));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(ScanError::Parameter(format!(
                "confidence must be between 0.0 and 1.0, got {}",
                self.confidence
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn params(tolerance: f64, frame_skip: usize, confidence: f64) -> ScanParameters {
        ScanParameters {
            tolerance,
            frame_skip,
            metric: DistanceMetric::Cosine,
            confidence,
        }
    }

    #[test]
    fn test_defaults() {
        let p = ScanParameters::default();
        assert_eq!(p.tolerance, 0.6);
        assert_eq!(p.frame_skip, 5);
        assert_eq!(p.metric, DistanceMetric::Cosine);
        assert_eq!(p.confidence, 0.5);
        assert!(p.validate().is_ok());
    }

    #[rstest]
    #[case::strictest(params(0.0, 1, 0.5))]
    #[case::loosest(params(1.0, 1, 0.5))]
    #[case::large_skip(params(0.6, 1000, 0.0))]
    #[case::full_confidence(params(0.6, 5, 1.0))]
    fn test_valid(#[case] p: ScanParameters) {
        assert!(p.validate().is_ok());
    }

    #[rstest]
    #[case::negative_tolerance(params(-0.1, 5, 0.5), "tolerance")]
    #[case::tolerance_too_high(params(1.5, 5, 0.5), "tolerance")]
    #[case::nan_tolerance(params(f64::NAN, 5, 0.5), "tolerance")]
    #[case::zero_skip(params(0.6, 0, 0.5), "frame_skip")]
    #[case::confidence_too_high(params(0.6, 5, 2.0), "confidence")]
    fn test_invalid(#[case] p: ScanParameters, #[case] field: &str) {
        let err = p.validate().unwrap_err();
        assert!(matches!(err, ScanError::Parameter(_)));
        assert!(err.to_string().contains(field));
    }

    #[test]
    fn test_deserialize_partial_uses_defaults() {
        let p: ScanParameters = serde_json::from_str(r#"{"frame_skip": 2}"#).unwrap();
        assert_eq!(p.frame_skip, 2);
        assert_eq!(p.tolerance, 0.6);
        assert_eq!(p.metric, DistanceMetric::Cosine);
    }

    #[test]
    fn test_deserialize_metric() {
        let p: ScanParameters = serde_json::from_str(r#"{"metric": "euclidean"}"#).unwrap();
        assert_eq!(p.metric, DistanceMetric::Euclidean);
    }
}
