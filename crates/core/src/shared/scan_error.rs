use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Coarse classification of a failed run, as reported to callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InputError,
    ReferenceError,
    ParameterError,
    RuntimeError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::InputError => write!(f, "InputError"),
            ErrorKind::ReferenceError => write!(f, "ReferenceError"),
            ErrorKind::ParameterError => write!(f, "ParameterError"),
            ErrorKind::RuntimeError => write!(f, "RuntimeError"),
        }
    }
}

/// Stage of the run at which a failure happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailedStage {
    ReferenceLoad,
    VideoOpen,
    Scanning,
    Muxing,
}

impl fmt::Display for FailedStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailedStage::ReferenceLoad => write!(f, "reference load"),
            FailedStage::VideoOpen => write!(f, "video open"),
            FailedStage::Scanning => write!(f, "scanning"),
            FailedStage::Muxing => write!(f, "muxing"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("cannot read {}: {message}", path.display())]
    Input { path: PathBuf, message: String },
    #[error("no face found in reference image {}; use an image with a clear face", path.display())]
    NoFaceFound { path: PathBuf },
    #[error("invalid parameter: {0}")]
    Parameter(String),
    #[error("{0}")]
    Runtime(String),
}

impl ScanError {
    pub fn input(path: impl Into<PathBuf>, source: impl fmt::Display) -> Self {
        ScanError::Input {
            path: path.into(),
            message: source.to_string(),
        }
    }

    pub fn runtime(context: &str, source: impl fmt::Display) -> Self {
        ScanError::Runtime(format!("{context}: {source}"))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ScanError::Input { .. } => ErrorKind::InputError,
            ScanError::NoFaceFound { .. } => ErrorKind::ReferenceError,
            ScanError::Parameter(_) => ErrorKind::ParameterError,
            ScanError::Runtime(_) => ErrorKind::RuntimeError,
        }
    }
}

/// A [`ScanError`] tagged with the stage it ended the run in.
#[derive(Error, Debug)]
#[error("{stage} failed: {error}")]
pub struct StageError {
    pub stage: FailedStage,
    #[source]
    pub error: ScanError,
}

impl StageError {
    pub fn new(stage: FailedStage, error: ScanError) -> Self {
        Self { stage, error }
    }

    pub fn scanning(context: &str, source: impl fmt::Display) -> Self {
        Self::new(FailedStage::Scanning, ScanError::runtime(context, source))
    }

    pub fn muxing(context: &str, source: impl fmt::Display) -> Self {
        Self::new(FailedStage::Muxing, ScanError::runtime(context, source))
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}
