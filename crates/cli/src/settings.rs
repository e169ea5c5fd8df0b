use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use facescan_core::detection::domain::embedding_distance::DistanceMetric;
use facescan_core::pipeline::scan_parameters::ScanParameters;
use facescan_core::shared::scan_error::ScanError;

pub const DEFAULT_OUTPUT_DIR: &str = "outputs";

/// Contents of a `--config` JSON file. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SettingsFile {
    #[serde(flatten)]
    pub parameters: ScanParameters,
    pub output_dir: Option<PathBuf>,
    pub models_dir: Option<PathBuf>,
    pub decode_ahead: bool,
}

impl SettingsFile {
    pub fn load(path: &Path) -> Result<Self, ScanError> {
        let text = fs::read_to_string(path).map_err(|e| ScanError::input(path, e))?;
        serde_json::from_str(&text)
            .map_err(|e| ScanError::Parameter(format!("{}: {e}", path.display())))
    }
}

/// Values given explicitly on the command line.
#[derive(Debug, Default)]
pub struct Overrides {
    pub tolerance: Option<f64>,
    pub frame_skip: Option<usize>,
    pub metric: Option<DistanceMetric>,
    pub confidence: Option<f64>,
    pub output_dir: Option<PathBuf>,
    pub models_dir: Option<PathBuf>,
    pub decode_ahead: bool,
}

/// Effective settings of one invocation.
#[derive(Debug, PartialEq)]
pub struct Settings {
    pub parameters: ScanParameters,
    pub output_dir: PathBuf,
    pub models_dir: Option<PathBuf>,
    pub decode_ahead: bool,
}

impl Settings {
    /// Command-line values win over the file, the file over defaults.
    pub fn merge(file: SettingsFile, overrides: Overrides) -> Self {
        let defaults = file.parameters;
        Self {
            parameters: ScanParameters {
                tolerance: overrides.tolerance.unwrap_or(defaults.tolerance),
                frame_skip: overrides.frame_skip.unwrap_or(defaults.frame_skip),
                metric: overrides.metric.unwrap_or(defaults.metric),
                confidence: overrides.confidence.unwrap_or(defaults.confidence),
            },
            output_dir: overrides
                .output_dir
                .or(file.output_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            models_dir: overrides.models_dir.or(file.models_dir),
            decode_ahead: overrides.decode_ahead || file.decode_ahead,
        }
    }
}
