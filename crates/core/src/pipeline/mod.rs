pub mod detection_aggregator;
pub mod encode_reference_use_case;
pub mod frame_processor;
pub mod frame_sampler;
pub mod infrastructure;
pub mod person_scan;
pub mod pipeline_logger;
pub mod scan_executor;
pub mod scan_parameters;
pub mod scan_state;
pub mod scan_video_use_case;

#[cfg(test)]
pub(crate) mod test_support;
