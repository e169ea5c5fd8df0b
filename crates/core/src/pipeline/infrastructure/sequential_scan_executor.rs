use std::time::Instant;

use crate::pipeline::detection_aggregator::DetectionSummary;
use crate::pipeline::frame_processor::FrameProcessor;
use crate::pipeline::frame_sampler::FrameSampler;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::scan_executor::{
    cancelled_error, finish_scan, frame_processor, ScanComponents, ScanConfig, ScanExecutor,
};
use crate::shared::frame::Frame;
use crate::shared::scan_error::StageError;

/// Runs the whole scan on the calling thread: one sampled frame is fully
/// matched, annotated and written before the next raw frame is decoded.
#[derive(Default)]
pub struct SequentialScanExecutor;

impl SequentialScanExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl ScanExecutor for SequentialScanExecutor {
    fn execute(
        &self,
        components: ScanComponents,
        config: &ScanConfig<'_>,
        logger: &mut dyn PipelineLogger,
    ) -> Result<DetectionSummary, StageError> {
        let ScanComponents {
            mut reader,
            mut writer,
            mut analyzer,
            annotator,
            snapshot_writer,
        } = components;

        let (outcome, frames_read, aggregator) = {
            let mut processor = frame_processor(
                analyzer.as_mut(),
                annotator.as_ref(),
                writer.as_mut(),
                snapshot_writer.as_ref(),
                config,
            );
            let mut sampler =
                FrameSampler::new(reader.frames(), config.frame_skip, config.metadata.fps);
            let outcome = run_loop(&mut sampler, &mut processor, config, logger);
            (outcome, sampler.frames_read(), processor.into_aggregator())
        };

        reader.close();
        logger.progress(frames_read, config.metadata.total_frames);

        finish_scan(writer.as_mut(), aggregator, frames_read, outcome)
    }
}

fn run_loop<I>(
    sampler: &mut FrameSampler<I>,
    processor: &mut FrameProcessor<'_>,
    config: &ScanConfig<'_>,
    logger: &mut dyn PipelineLogger,
) -> Result<(), StageError>
where
    I: Iterator<Item = Result<Frame, Box<dyn std::error::Error>>>,
{
    let total = config.metadata.total_frames;
    loop {
        if config.is_cancelled() {
            return Err(cancelled_error());
        }

        let t0 = Instant::now();
        let Some(next) = sampler.next() else {
            return Ok(());
        };
        logger.timing("decode", t0.elapsed().as_secs_f64() * 1000.0);

        let sampled =
            next.map_err(|e| StageError::scanning("cannot decode video frame", e))?;
        processor.process(sampled, logger)?;
        logger.progress(sampler.frames_read(), total);
    }
}
