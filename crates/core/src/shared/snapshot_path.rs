use std::path::{Path, PathBuf};

use super::constants::{SNAPSHOT_EXTENSION, SNAPSHOT_SUFFIX};

/// Path of the first-detection still for a given output video.
///
/// Always a sibling of the video: `<dir>/<stem>_detection_frame.jpg`,
/// whatever extension the video itself has.
pub fn snapshot_path_for(output_video: &Path) -> PathBuf {
    let stem = output_video
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let file_name = format!("{stem}{SNAPSHOT_SUFFIX}.{SNAPSHOT_EXTENSION}");
    match output_video.parent() {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}
