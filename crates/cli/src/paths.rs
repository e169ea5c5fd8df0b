use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use uuid::Uuid;

use facescan_core::shared::scan_error::ScanError;

/// Checks that `path` exists and carries one of `allowed` extensions
/// (case-insensitive).
pub fn check_input(path: &Path, allowed: &[&str]) -> Result<(), ScanError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext {
        Some(ext) if allowed.contains(&ext.as_str()) => {}
        _ => {
            return Err(ScanError::input(
                path,
                format!("unsupported file type; expected one of {}", allowed.join(", ")),
            ))
        }
    }
    if !path.is_file() {
        return Err(ScanError::input(path, "file not found"));
    }
    Ok(())
}

/// `output_<YYYYmmdd_HHMMSS>_<8 hex>.mp4`, unique per call.
pub fn unique_output_name(now: DateTime<Local>) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("output_{}_{}.mp4", now.format("%Y%m%d_%H%M%S"), &id[..8])
}

/// The explicit output path, or a fresh unique name inside `output_dir`.
/// The parent directory is created when missing.
pub fn resolve_output(
    explicit: Option<PathBuf>,
    output_dir: &Path,
) -> Result<PathBuf, ScanError> {
    let path = explicit.unwrap_or_else(|| output_dir.join(unique_output_name(Local::now())));
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| ScanError::runtime("cannot create output directory", e))?;
    }
    Ok(path)
}

/// Deletes the given input files, leaving anything in `keep` alone.
/// Failures are logged, never fatal.
pub fn cleanup_inputs(inputs: &[&Path], keep: &[&Path]) {
    for input in inputs {
        if keep.contains(input) {
            continue;
        }
        match fs::remove_file(input) {
            Ok(()) => log::info!("Removed input {}", input.display()),
            Err(e) => log::warn!("Could not remove input {}: {e}", input.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use facescan_core::shared::constants::{IMAGE_EXTENSIONS, VIDEO_EXTENSIONS};

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"x").unwrap();
        path
    }

    #[test]
    fn test_accepts_known_extensions_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.png", "b.JPG", "c.jpeg", "d.gif", "e.bmp"] {
            let path = touch(dir.path(), name);
            assert!(check_input(&path, IMAGE_EXTENSIONS).is_ok(), "{name}");
        }
        for name in ["a.mp4", "b.AVI", "c.mov", "d.mkv", "e.wmv"] {
            let path = touch(dir.path(), name);
            assert!(check_input(&path, VIDEO_EXTENSIONS).is_ok(), "{name}");
        }
    }

    #[test]
    fn test_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = touch(dir.path(), "notes.txt");
        let err = check_input(&path, IMAGE_EXTENSIONS).unwrap_err();
        assert!(err.to_string().contains("expected one of png, jpg"));
    }

    #[test]
    fn test_rejects_missing_file() {
        let err =
            check_input(Path::new("/nonexistent/clip.mp4"), VIDEO_EXTENSIONS).unwrap_err();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_unique_output_name_format() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let name = unique_output_name(now);
        assert!(name.starts_with("output_20240309_140507_"), "{name}");
        assert!(name.ends_with(".mp4"));
        let id = &name["output_20240309_140507_".len()..name.len() - 4];
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(name, unique_output_name(now));
    }

    #[test]
    fn test_resolve_output_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("outputs");
        let path = resolve_output(None, &out_dir).unwrap();
        assert!(out_dir.is_dir());
        assert_eq!(path.parent(), Some(out_dir.as_path()));
    }

    #[test]
    fn test_explicit_output_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("nested").join("result.mp4");
        let path = resolve_output(Some(explicit.clone()), Path::new("unused")).unwrap();
        assert_eq!(path, explicit);
        assert!(dir.path().join("nested").is_dir());
    }

    #[test]
    fn test_cleanup_removes_inputs_but_keeps_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let reference = touch(dir.path(), "ref.png");
        let video = touch(dir.path(), "in.mp4");
        cleanup_inputs(&[reference.as_path(), video.as_path()], &[video.as_path()]);
        assert!(!reference.exists());
        assert!(video.exists());
    }

    #[test]
    fn test_cleanup_tolerates_missing_files() {
        cleanup_inputs(&[Path::new("/nonexistent/ref.png")], &[]);
    }
}
