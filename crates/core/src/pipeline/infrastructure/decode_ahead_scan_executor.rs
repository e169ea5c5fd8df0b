use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender};

use crate::pipeline::detection_aggregator::DetectionSummary;
use crate::pipeline::frame_processor::FrameProcessor;
use crate::pipeline::frame_sampler::{FrameSampler, SampledFrame};
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::scan_executor::{
    cancelled_error, finish_scan, frame_processor, ScanComponents, ScanConfig, ScanExecutor,
};
use crate::shared::scan_error::StageError;
use crate::video::domain::video_reader::VideoReader;

const DEFAULT_CHANNEL_CAPACITY: usize = 8;

type SendError = Box<dyn std::error::Error + Send + Sync>;

/// A sampled frame plus the raw frame count at the moment it was sampled.
type Sampled = (SampledFrame, usize);

/// Decodes and samples on a dedicated reader thread while matching,
/// annotation and writing stay on the calling thread.
///
/// Layout: `reader [decode/sample] → main [match/annotate/snapshot/write]`
///
/// The channel is FIFO and has a single consumer, so sampled frames reach
/// the aggregator in index order exactly as with the sequential executor.
pub struct DecodeAheadScanExecutor {
    channel_capacity: usize,
}

impl DecodeAheadScanExecutor {
    pub fn new() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    pub fn with_capacity(channel_capacity: usize) -> Self {
        Self {
            channel_capacity: channel_capacity.max(1),
        }
    }
}

impl Default for DecodeAheadScanExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanExecutor for DecodeAheadScanExecutor {
    fn execute(
        &self,
        components: ScanComponents,
        config: &ScanConfig<'_>,
        logger: &mut dyn PipelineLogger,
    ) -> Result<DetectionSummary, StageError> {
        let ScanComponents {
            reader,
            mut writer,
            mut analyzer,
            annotator,
            snapshot_writer,
        } = components;

        let (frame_tx, frame_rx) =
            crossbeam_channel::bounded::<Result<Sampled, SendError>>(self.channel_capacity);
        let reader_handle = spawn_reader(
            reader,
            config.frame_skip,
            config.metadata.fps,
            frame_tx,
            config.cancelled.clone(),
        );

        let (outcome, aggregator) = {
            let mut processor = frame_processor(
                analyzer.as_mut(),
                annotator.as_ref(),
                writer.as_mut(),
                snapshot_writer.as_ref(),
                config,
            );
            // Consumes the receiver so the reader thread unblocks and exits
            // as soon as the loop stops early.
            let outcome = run_main_loop(frame_rx, &mut processor, config, logger);
            (outcome, processor.into_aggregator())
        };

        let (outcome, frames_read) = join_reader(reader_handle, outcome);
        logger.progress(frames_read, config.metadata.total_frames);

        finish_scan(writer.as_mut(), aggregator, frames_read, outcome)
    }
}

fn spawn_reader(
    mut reader: Box<dyn VideoReader>,
    frame_skip: usize,
    fps: f64,
    frame_tx: Sender<Result<Sampled, SendError>>,
    cancelled: Arc<AtomicBool>,
) -> JoinHandle<(Box<dyn VideoReader>, usize)> {
    std::thread::spawn(move || {
        let frames_read = {
            let mut sampler = FrameSampler::new(reader.frames(), frame_skip, fps);
            while let Some(next) = sampler.next() {
                if cancelled.load(Ordering::Relaxed) {
                    break;
                }
                let failed = next.is_err();
                let item = next
                    .map(|sampled| (sampled, sampler.frames_read()))
                    .map_err(|e| -> SendError { e.to_string().into() });
                if frame_tx.send(item).is_err() || failed {
                    break;
                }
            }
            sampler.frames_read()
        };
        (reader, frames_read)
    })
}

fn run_main_loop(
    frame_rx: Receiver<Result<Sampled, SendError>>,
    processor: &mut FrameProcessor<'_>,
    config: &ScanConfig<'_>,
    logger: &mut dyn PipelineLogger,
) -> Result<(), StageError> {
    let total = config.metadata.total_frames;
    loop {
        let t0 = Instant::now();
        let Ok(item) = frame_rx.recv() else {
            break;
        };
        logger.timing("decode", t0.elapsed().as_secs_f64() * 1000.0);
        logger.metric("reader_queue_depth", frame_rx.len() as f64);

        if config.is_cancelled() {
            return Err(cancelled_error());
        }

        let (sampled, frames_read) =
            item.map_err(|e| StageError::scanning("cannot decode video frame", e))?;
        processor.process(sampled, logger)?;
        logger.progress(frames_read, total);
    }

    // The reader stops quietly on cancellation, closing the channel.
    if config.is_cancelled() {
        return Err(cancelled_error());
    }
    Ok(())
}

/// Joins the reader thread, closes the reader and returns the raw frame
/// count. A loop error wins over a reader panic.
fn join_reader(
    handle: JoinHandle<(Box<dyn VideoReader>, usize)>,
    outcome: Result<(), StageError>,
) -> (Result<(), StageError>, usize) {
    match handle.join() {
        Ok((mut reader, frames_read)) => {
            reader.close();
            (outcome, frames_read)
        }
        Err(_) => {
            let outcome =
                outcome.and(Err(StageError::scanning("video decoding", "reader thread panicked")));
            (outcome, 0)
        }
    }
}
