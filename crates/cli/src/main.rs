mod paths;
mod settings;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use facescan_core::detection::domain::embedding_distance::DistanceMetric;
use facescan_core::pipeline::infrastructure::decode_ahead_scan_executor::DecodeAheadScanExecutor;
use facescan_core::pipeline::infrastructure::onnx_scan_components::OnnxScanComponents;
use facescan_core::pipeline::infrastructure::sequential_scan_executor::SequentialScanExecutor;
use facescan_core::pipeline::person_scan::{PersonScan, ScanReport, ScanRequest};
use facescan_core::pipeline::pipeline_logger::{PipelineLogger, StdoutPipelineLogger};
use facescan_core::pipeline::scan_executor::ScanExecutor;
use facescan_core::pipeline::scan_state::ScanState;
use facescan_core::shared::constants::{IMAGE_EXTENSIONS, VIDEO_EXTENSIONS};
use facescan_core::shared::model_resolver::ModelLocator;
use facescan_core::shared::scan_error::{ErrorKind, FailedStage, ScanError};
use facescan_core::shared::snapshot_path::snapshot_path_for;

use paths::{check_input, cleanup_inputs, resolve_output};
use settings::{Overrides, Settings, SettingsFile};

/// Find one person in a video from a single reference photo.
#[derive(Parser, Debug)]
#[command(name = "facescan")]
struct Cli {
    /// Reference photo of the person to look for.
    reference: PathBuf,

    /// Video to scan.
    video: PathBuf,

    /// Annotated output video (default: a unique name in --output-dir).
    output: Option<PathBuf>,

    /// Maximum embedding distance that counts as a match (0.0-1.0).
    #[arg(long)]
    tolerance: Option<f64>,

    /// Analyze every Nth frame.
    #[arg(long)]
    frame_skip: Option<usize>,

    /// Embedding distance: cosine or euclidean.
    #[arg(long)]
    metric: Option<DistanceMetric>,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long)]
    confidence: Option<f64>,

    /// Directory for generated output names.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// JSON settings file; command-line flags take priority.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the JSON report here instead of stdout.
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Decode frames on a separate thread.
    #[arg(long)]
    decode_ahead: bool,

    /// Directory of pre-packaged model files, used when the cache lacks them.
    #[arg(long)]
    models_dir: Option<PathBuf>,

    /// Delete the reference photo and input video after the run.
    #[arg(long)]
    cleanup_inputs: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            tolerance: self.tolerance,
            frame_skip: self.frame_skip,
            metric: self.metric,
            confidence: self.confidence,
            output_dir: self.output_dir.clone(),
            models_dir: self.models_dir.clone(),
            decode_ahead: self.decode_ahead,
        }
    }
}

fn main() {
    env_logger::init();
    process::exit(run(Cli::parse()));
}

fn run(cli: Cli) -> i32 {
    let (request, settings) = match prepare(&cli) {
        Ok(prepared) => prepared,
        Err(e) => {
            eprintln!("Error: {e}");
            return exit_code(e.kind());
        }
    };
    let report = scan(&request, &settings);
    finish(&cli, &request, &report)
}

fn scan(request: &ScanRequest, settings: &Settings) -> ScanReport {
    let locator = match ModelLocator::with_default_cache(settings.models_dir.clone()) {
        Ok(locator) => locator,
        Err(e) => {
            let error = ScanError::runtime("cannot load face models", e);
            log::error!("{error}");
            let stage = FailedStage::ReferenceLoad;
            return ScanReport::failed(&error, Some(stage), ScanState::Failed(stage));
        }
    };
    let factory = OnnxScanComponents::new(locator).with_download_progress(download_progress);
    let executor: Box<dyn ScanExecutor> = if settings.decode_ahead {
        Box::new(DecodeAheadScanExecutor::new())
    } else {
        Box::new(SequentialScanExecutor::new())
    };

    let mut logger = StdoutPipelineLogger::default();
    let report = PersonScan::new(Box::new(factory), executor).run(request, &mut logger);
    logger.summary();
    report
}

/// Emits the report and cleans up inputs whatever the outcome, then picks
/// the exit code.
fn finish(cli: &Cli, request: &ScanRequest, report: &ScanReport) -> i32 {
    let emitted = emit_report(report, cli.summary.as_deref());

    if cli.cleanup_inputs {
        let snapshot = snapshot_path_for(&request.output_path);
        cleanup_inputs(
            &[request.reference_path.as_path(), request.video_path.as_path()],
            &[request.output_path.as_path(), snapshot.as_path()],
        );
    }

    match emitted {
        Ok(()) => report_exit_code(report),
        Err(e) => {
            eprintln!("Error: {e}");
            exit_code(e.kind())
        }
    }
}

/// Merges settings, checks the inputs and picks the output path.
fn prepare(cli: &Cli) -> Result<(ScanRequest, Settings), ScanError> {
    let file = match &cli.config {
        Some(path) => SettingsFile::load(path)?,
        None => SettingsFile::default(),
    };
    let settings = Settings::merge(file, cli.overrides());

    check_input(&cli.reference, IMAGE_EXTENSIONS)?;
    check_input(&cli.video, VIDEO_EXTENSIONS)?;
    let output_path = resolve_output(cli.output.clone(), &settings.output_dir)?;

    let request = ScanRequest {
        reference_path: cli.reference.clone(),
        video_path: cli.video.clone(),
        output_path,
        parameters: settings.parameters.clone(),
    };
    Ok((request, settings))
}

fn emit_report(report: &ScanReport, destination: Option<&Path>) -> Result<(), ScanError> {
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| ScanError::runtime("cannot serialize report", e))?;
    match destination {
        Some(path) => fs::write(path, json + "\n")
            .map_err(|e| ScanError::runtime(&format!("cannot write {}", path.display()), e)),
        None => {
            println!("{json}");
            Ok(())
        }
    }
}

fn report_exit_code(report: &ScanReport) -> i32 {
    match (report.success, report.error_kind) {
        (true, _) => 0,
        (false, Some(kind)) => exit_code(kind),
        (false, None) => exit_code(ErrorKind::RuntimeError),
    }
}

/// Caller mistakes exit with 2, everything else with 1.
fn exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::ParameterError | ErrorKind::InputError | ErrorKind::ReferenceError => 2,
        ErrorKind::RuntimeError => 1,
    }
}

fn download_progress(model: &str, downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading {model}... {pct}%");
        if downloaded >= total {
            eprintln!();
        }
    } else {
        eprint!("\rDownloading {model}... {downloaded} bytes");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let cli = Cli::try_parse_from(["facescan", "ref.png", "in.mp4"]).unwrap();
        assert_eq!(cli.reference, PathBuf::from("ref.png"));
        assert_eq!(cli.video, PathBuf::from("in.mp4"));
        assert!(cli.output.is_none());
        assert!(!cli.decode_ahead);
        assert!(!cli.cleanup_inputs);
    }

    #[test]
    fn test_parse_all_flags() {
        let cli = Cli::try_parse_from([
            "facescan",
            "ref.png",
            "in.mp4",
            "out.mp4",
            "--tolerance",
            "0.45",
            "--frame-skip",
            "3",
            "--metric",
            "Euclidean",
            "--confidence",
            "0.7",
            "--output-dir",
            "results",
            "--models-dir",
            "models",
            "--decode-ahead",
        ])
        .unwrap();
        let overrides = cli.overrides();
        assert_eq!(overrides.tolerance, Some(0.45));
        assert_eq!(overrides.frame_skip, Some(3));
        assert_eq!(overrides.metric, Some(DistanceMetric::Euclidean));
        assert_eq!(overrides.confidence, Some(0.7));
        assert_eq!(overrides.output_dir, Some(PathBuf::from("results")));
        assert_eq!(overrides.models_dir, Some(PathBuf::from("models")));
        assert!(overrides.decode_ahead);
        assert_eq!(cli.output, Some(PathBuf::from("out.mp4")));
    }

    #[test]
    fn test_rejects_unknown_metric() {
        let result = Cli::try_parse_from(["facescan", "r.png", "v.mp4", "--metric", "manhattan"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_requires_reference_and_video() {
        assert!(Cli::try_parse_from(["facescan", "ref.png"]).is_err());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(ErrorKind::ParameterError), 2);
        assert_eq!(exit_code(ErrorKind::InputError), 2);
        assert_eq!(exit_code(ErrorKind::ReferenceError), 2);
        assert_eq!(exit_code(ErrorKind::RuntimeError), 1);
    }

    #[test]
    fn test_missing_inputs_fail_before_scanning() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::try_parse_from([
            "facescan",
            "/nonexistent/ref.png",
            "/nonexistent/in.mp4",
            "--output-dir",
            dir.path().to_str().unwrap(),
        ])
        .unwrap();
        let err = prepare(&cli).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputError);
        assert_eq!(run(cli), 2);
    }

    #[test]
    fn test_prepare_builds_request_from_merged_settings() {
        let dir = tempfile::tempdir().unwrap();
        let reference = dir.path().join("ref.png");
        let video = dir.path().join("in.mp4");
        fs::write(&reference, b"x").unwrap();
        fs::write(&video, b"x").unwrap();
        let config = dir.path().join("settings.json");
        fs::write(&config, r#"{"frame_skip": 2, "tolerance": 0.5}"#).unwrap();
        let out_dir = dir.path().join("outputs");

        let cli = Cli::try_parse_from([
            "facescan",
            reference.to_str().unwrap(),
            video.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
            "--tolerance",
            "0.3",
            "--output-dir",
            out_dir.to_str().unwrap(),
        ])
        .unwrap();
        let (request, settings) = prepare(&cli).unwrap();
        assert_eq!(request.parameters.frame_skip, 2);
        assert_eq!(request.parameters.tolerance, 0.3);
        assert_eq!(request.output_path.parent(), Some(out_dir.as_path()));
        assert!(!settings.decode_ahead);
    }

    #[test]
    fn test_report_written_to_summary_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let report = ScanReport {
            success: false,
            state: ScanState::Idle,
            summary: None,
            error_kind: Some(ErrorKind::ParameterError),
            stage: None,
            message: Some("invalid parameter: frame_skip".to_string()),
        };
        emit_report(&report, Some(&path)).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error_kind"], "parameter_error");
        assert_eq!(report_exit_code(&report), 2);
    }

    fn cleanup_cli(dir: &Path, summary: &Path) -> (Cli, ScanRequest) {
        let reference = dir.join("ref.png");
        let video = dir.join("in.mp4");
        fs::write(&reference, b"x").unwrap();
        fs::write(&video, b"x").unwrap();
        let cli = Cli::try_parse_from([
            "facescan",
            reference.to_str().unwrap(),
            video.to_str().unwrap(),
            dir.join("out.mp4").to_str().unwrap(),
            "--summary",
            summary.to_str().unwrap(),
            "--cleanup-inputs",
        ])
        .unwrap();
        let (request, _) = prepare(&cli).unwrap();
        (cli, request)
    }

    fn runtime_failure() -> ScanReport {
        let stage = FailedStage::Scanning;
        ScanReport::failed(
            &ScanError::Runtime("cannot decode video frame".to_string()),
            Some(stage),
            ScanState::Failed(stage),
        )
    }

    #[test]
    fn test_failed_scan_still_cleans_up_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let summary = dir.path().join("report.json");
        let (cli, request) = cleanup_cli(dir.path(), &summary);
        fs::write(&request.output_path, b"partial").unwrap();

        assert_eq!(finish(&cli, &request, &runtime_failure()), 1);
        assert!(!request.reference_path.exists());
        assert!(!request.video_path.exists());
        assert!(request.output_path.exists());
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&summary).unwrap()).unwrap();
        assert_eq!(value["stage"], "scanning");
    }

    #[test]
    fn test_unwritable_summary_still_cleans_up_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"x").unwrap();
        let (cli, request) = cleanup_cli(dir.path(), &blocker.join("report.json"));

        let report = ScanReport::failed(
            &ScanError::Parameter("frame_skip must be at least 1".to_string()),
            None,
            ScanState::Idle,
        );
        assert_eq!(finish(&cli, &request, &report), 1);
        assert!(!request.reference_path.exists());
        assert!(!request.video_path.exists());
    }
}
