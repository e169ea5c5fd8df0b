use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How the distance between two face embeddings is measured.
///
/// `Cosine` is `1 - cos(a, b)`, suited to L2-normalized ArcFace vectors
/// where same-identity pairs land well under 0.6. `Euclidean` is the plain
/// L2 distance used by classic 128-d face encodings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    #[default]
    Cosine,
    Euclidean,
}

impl DistanceMetric {
    pub const ALL: &[DistanceMetric] = &[DistanceMetric::Cosine, DistanceMetric::Euclidean];

    /// Distance between `a` and `b`; identical vectors are exactly 0.0.
    pub fn distance(&self, a: &[f32], b: &[f32]) -> Result<f64, String> {
        if a.len() != b.len() {
            return Err(format!(
                "embedding length mismatch: {} vs {}",
                a.len(),
                b.len()
            ));
        }
        if a == b {
            return Ok(0.0);
        }
        Ok(match self {
            DistanceMetric::Cosine => cosine_distance(a, b),
            DistanceMetric::Euclidean => euclidean_distance(a, b),
        })
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceMetric::Cosine => write!(f, "cosine"),
            DistanceMetric::Euclidean => write!(f, "euclidean"),
        }
    }
}

impl FromStr for DistanceMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DistanceMetric::ALL
            .iter()
            .copied()
            .find(|m| m.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let names: Vec<String> =
                    DistanceMetric::ALL.iter().map(|m| m.to_string()).collect();
                format!("distance metric must be one of {}, got '{s}'", names.join(", "))
            })
    }
}

/// `1 - cosine similarity`, clamped to `[0, 2]`. A zero vector has no
/// direction, so it scores 1.0 (orthogonal) against any other vector.
fn cosine_distance(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    (1.0 - dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(0.0, 2.0)
}

fn euclidean_distance(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = *x as f64 - *y as f64;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case::cosine(DistanceMetric::Cosine)]
    #[case::euclidean(DistanceMetric::Euclidean)]
    fn test_identical_vectors_are_exactly_zero(#[case] metric: DistanceMetric) {
        let v = vec![0.1f32, 0.7, -0.3, 0.2];
        assert_eq!(metric.distance(&v, &v).unwrap(), 0.0);
    }

    #[rstest]
    #[case::cosine(DistanceMetric::Cosine)]
    #[case::euclidean(DistanceMetric::Euclidean)]
    fn test_length_mismatch_is_error(#[case] metric: DistanceMetric) {
        assert!(metric.distance(&[1.0, 0.0], &[1.0, 0.0, 0.0]).is_err());
    }

    #[test]
    fn test_cosine_orthogonal() {
        let d = DistanceMetric::Cosine
            .distance(&[1.0, 0.0], &[0.0, 1.0])
            .unwrap();
        assert_relative_eq!(d, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_cosine_opposite() {
        let d = DistanceMetric::Cosine
            .distance(&[1.0, 0.0], &[-1.0, 0.0])
            .unwrap();
        assert_relative_eq!(d, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_cosine_ignores_magnitude() {
        let d = DistanceMetric::Cosine
            .distance(&[3.0, 4.0], &[0.6, 0.8])
            .unwrap();
        assert!(d < 1e-6);
    }

    #[test]
    fn test_cosine_zero_vector() {
        let d = DistanceMetric::Cosine
            .distance(&[0.0, 0.0], &[1.0, 0.0])
            .unwrap();
        assert_relative_eq!(d, 1.0);
    }

    #[test]
    fn test_euclidean_three_four_five() {
        let d = DistanceMetric::Euclidean
            .distance(&[0.0, 0.0], &[3.0, 4.0])
            .unwrap();
        assert_relative_eq!(d, 5.0);
    }

    #[rstest]
    #[case("cosine", DistanceMetric::Cosine)]
    #[case("EUCLIDEAN", DistanceMetric::Euclidean)]
    fn test_parse(#[case] input: &str, #[case] expected: DistanceMetric) {
        assert_eq!(input.parse::<DistanceMetric>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "manhattan".parse::<DistanceMetric>().unwrap_err();
        assert_eq!(err, "distance metric must be one of cosine, euclidean, got 'manhattan'");
    }

    #[test]
    fn test_display_round_trips() {
        for m in DistanceMetric::ALL {
            assert_eq!(m.to_string().parse::<DistanceMetric>().unwrap(), *m);
        }
    }
}
