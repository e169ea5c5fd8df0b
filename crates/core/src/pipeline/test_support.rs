//! Recording stubs of the scan's domain traits.
//!
//! Frames are solid fills; the fill value tells [`MarkerAnalyzer`] who is in
//! the picture, so readers and reference images can be scripted as plain
//! byte lists.

use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use crate::annotation::infrastructure::match_box_annotator::MatchBoxAnnotator;
use crate::detection::domain::embedding_distance::DistanceMetric;
use crate::detection::domain::face_analyzer::FaceAnalyzer;
use crate::detection::domain::face_matcher::FaceMatcher;
use crate::detection::domain::reference_signature::ReferenceSignature;
use crate::pipeline::detection_aggregator::DetectionSummary;
use crate::pipeline::pipeline_logger::NullPipelineLogger;
use crate::pipeline::scan_executor::{ScanComponents, ScanConfig, ScanExecutor};
use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;
use crate::shared::scan_error::StageError;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::image_reader::ImageReader;
use crate::video::domain::image_writer::ImageWriter;
use crate::video::domain::video_reader::VideoReader;
use crate::video::domain::video_writer::VideoWriter;

pub const NOBODY: u8 = 0;
pub const SUBJECT_A: u8 = 1;
pub const SUBJECT_B: u8 = 2;
pub const A_AND_B: u8 = 3;

pub const FRAME_W: u32 = 32;
pub const FRAME_H: u32 = 32;

pub const BOX_A: FaceBox = FaceBox {
    top: 4,
    right: 14,
    bottom: 14,
    left: 4,
};
pub const BOX_B: FaceBox = FaceBox {
    top: 16,
    right: 28,
    bottom: 28,
    left: 18,
};

pub fn marker_frame(mark: u8, index: usize) -> Frame {
    Frame::new(
        vec![mark; Frame::buffer_len(FRAME_W, FRAME_H)],
        FRAME_W,
        FRAME_H,
        index,
    )
}

pub fn metadata(total_frames: usize, fps: f64) -> VideoMetadata {
    VideoMetadata {
        width: FRAME_W,
        height: FRAME_H,
        fps,
        total_frames,
        codec: "stub".to_string(),
        source_path: None,
    }
}

/// 300 frames at 30 fps with subject A visible in frames 60..=89.
pub fn scenario_marks() -> Vec<u8> {
    (0..300)
        .map(|i| if (60..90).contains(&i) { SUBJECT_A } else { NOBODY })
        .collect()
}

/// Reads the first byte of a frame: 1 is subject A, 2 is subject B,
/// 3 is both (A first), anything else is an empty scene.
pub struct MarkerAnalyzer {
    pub detect_calls: Arc<Mutex<Vec<usize>>>,
    fail_on: Option<usize>,
}

impl MarkerAnalyzer {
    pub fn new() -> Self {
        Self {
            detect_calls: Arc::new(Mutex::new(Vec::new())),
            fail_on: None,
        }
    }

    pub fn failing_on(index: usize) -> Self {
        Self {
            fail_on: Some(index),
            ..Self::new()
        }
    }
}

impl FaceAnalyzer for MarkerAnalyzer {
    fn detect_faces(&mut self, frame: &Frame) -> Result<Vec<FaceBox>, Box<dyn std::error::Error>> {
        self.detect_calls.lock().unwrap().push(frame.index());
        if self.fail_on == Some(frame.index()) {
            return Err("inference backend crashed".into());
        }
        Ok(match frame.data().first().copied().unwrap_or(NOBODY) {
            SUBJECT_A => vec![BOX_A],
            SUBJECT_B => vec![BOX_B],
            A_AND_B => vec![BOX_A, BOX_B],
            _ => vec![],
        })
    }

    fn embed(
        &mut self,
        _frame: &Frame,
        face: &FaceBox,
    ) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
        if *face == BOX_A {
            Ok(vec![1.0, 0.0, 0.0])
        } else {
            Ok(vec![0.0, 1.0, 0.0])
        }
    }
}

#[derive(Clone, Default)]
pub struct ReaderLog {
    pub opened: Arc<Mutex<Vec<PathBuf>>>,
    pub closed: Arc<Mutex<usize>>,
}

pub struct StubReader {
    marks: Vec<u8>,
    fps: f64,
    log: ReaderLog,
    fail_open: bool,
    fail_at: Option<usize>,
}

impl StubReader {
    pub fn new(marks: Vec<u8>, fps: f64, log: ReaderLog) -> Self {
        Self {
            marks,
            fps,
            log,
            fail_open: false,
            fail_at: None,
        }
    }

    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub fn failing_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }
}

impl VideoReader for StubReader {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        self.log.opened.lock().unwrap().push(path.to_path_buf());
        if self.fail_open {
            return Err("moov atom not found".into());
        }
        Ok(metadata(self.marks.len(), self.fps))
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        let fail_at = self.fail_at;
        Box::new(self.marks.iter().enumerate().map(
            move |(i, &mark)| -> Result<Frame, Box<dyn std::error::Error>> {
                if fail_at == Some(i) {
                    Err("corrupt packet".into())
                } else {
                    Ok(marker_frame(mark, i))
                }
            },
        ))
    }

    fn close(&mut self) {
        *self.log.closed.lock().unwrap() += 1;
    }
}

#[derive(Clone, Default)]
pub struct WriterLog {
    pub opened: Arc<Mutex<Option<PathBuf>>>,
    pub written: Arc<Mutex<Vec<Frame>>>,
    pub closed: Arc<Mutex<bool>>,
}

impl WriterLog {
    pub fn written_indices(&self) -> Vec<usize> {
        self.written.lock().unwrap().iter().map(|f| f.index()).collect()
    }
}

pub struct StubWriter {
    log: WriterLog,
    fail_open: bool,
    fail_write_at: Option<usize>,
    fail_close: bool,
}

impl StubWriter {
    pub fn new(log: WriterLog) -> Self {
        Self {
            log,
            fail_open: false,
            fail_write_at: None,
            fail_close: false,
        }
    }

    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub fn failing_write_at(mut self, index: usize) -> Self {
        self.fail_write_at = Some(index);
        self
    }

    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }
}

impl VideoWriter for StubWriter {
    fn open(
        &mut self,
        path: &Path,
        _metadata: &VideoMetadata,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if self.fail_open {
            return Err("no usable encoder: h264, mpeg4".into());
        }
        *self.log.opened.lock().unwrap() = Some(path.to_path_buf());
        Ok(())
    }

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        if self.fail_write_at == Some(frame.index()) {
            return Err("No space left on device".into());
        }
        self.log.written.lock().unwrap().push(frame.clone());
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        *self.log.closed.lock().unwrap() = true;
        if self.fail_close {
            return Err("trailer write failed".into());
        }
        Ok(())
    }

    fn codec_name(&self) -> Option<String> {
        Some("stub".to_string())
    }
}

/// Records `(path, frame index)` for each snapshot written.
#[derive(Default)]
pub struct RecordingImageWriter {
    pub written: Arc<Mutex<Vec<(PathBuf, usize)>>>,
    pub fail: bool,
}

impl ImageWriter for RecordingImageWriter {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        if self.fail {
            return Err("permission denied".into());
        }
        self.written
            .lock()
            .unwrap()
            .push((path.to_path_buf(), frame.index()));
        Ok(())
    }
}

/// Serves one solid-fill image, or fails when `mark` is `None`.
pub struct StubImageReader {
    pub mark: Option<u8>,
}

impl ImageReader for StubImageReader {
    fn read(&self, _path: &Path) -> Result<Frame, Box<dyn std::error::Error>> {
        match self.mark {
            Some(mark) => Ok(marker_frame(mark, 0)),
            None => Err("unsupported image format".into()),
        }
    }
}

pub const OUTPUT_PATH: &str = "out/scan.mp4";
pub const SNAPSHOT_PATH: &str = "out/scan_detection_frame.jpg";

pub fn reference_a() -> ReferenceSignature {
    ReferenceSignature::new(vec![1.0, 0.0, 0.0], "ref.png")
}

/// Runs `executor` over stub components with subject A as the reference.
/// Returns the result plus every `(path, frame index)` snapshot written.
pub fn run_executor(
    executor: &dyn ScanExecutor,
    reader: StubReader,
    writer: StubWriter,
    analyzer: MarkerAnalyzer,
    frame_skip: usize,
    cancelled: Arc<AtomicBool>,
) -> (Result<DetectionSummary, StageError>, Vec<(PathBuf, usize)>) {
    let meta = metadata(reader.marks.len(), reader.fps);
    let reference = reference_a();
    let matcher = FaceMatcher::new(0.6, DistanceMetric::Cosine);
    let snapshots = RecordingImageWriter::default();
    let snapshot_log = snapshots.written.clone();

    let config = ScanConfig {
        reference: &reference,
        matcher: &matcher,
        metadata: &meta,
        frame_skip,
        output_path: Path::new(OUTPUT_PATH),
        snapshot_path: Path::new(SNAPSHOT_PATH),
        cancelled,
    };
    let components = ScanComponents {
        reader: Box::new(reader),
        writer: Box::new(writer),
        analyzer: Box::new(analyzer),
        annotator: Box::new(MatchBoxAnnotator::default()),
        snapshot_writer: Box::new(snapshots),
    };

    let result = executor.execute(components, &config, &mut NullPipelineLogger);
    let written = snapshot_log.lock().unwrap().clone();
    (result, written)
}
