pub mod constants;
pub mod face_box;
pub mod frame;
pub mod model_resolver;
pub mod scan_error;
pub mod snapshot_path;
pub mod video_metadata;
