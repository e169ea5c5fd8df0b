pub const DETECTOR_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const DETECTOR_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/yolo11n-pose_widerface.onnx";

pub const EMBEDDING_MODEL_NAME: &str = "w600k_r50.onnx";
pub const EMBEDDING_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/w600k_r50.onnx";

pub const DEFAULT_TOLERANCE: f64 = 0.6;
pub const DEFAULT_FRAME_SKIP: usize = 5;
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Raw frames between progress reports.
pub const PROGRESS_INTERVAL: usize = 100;

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp"];
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "wmv"];

pub const MATCH_LABEL: &str = "PERSON FOUND!";
pub const SNAPSHOT_SUFFIX: &str = "_detection_frame";
pub const SNAPSHOT_EXTENSION: &str = "jpg";
pub const SNAPSHOT_JPEG_QUALITY: u8 = 90;
