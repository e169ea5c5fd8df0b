//! Finds one person in a video, given a single reference photograph.
//!
//! The crate is laid out by concern. Each concern has a `domain` layer of
//! plain types and traits, and an `infrastructure` layer that binds those
//! traits to ffmpeg, ONNX Runtime and the `image` crate. The `pipeline`
//! module wires everything into the scan run.

pub mod annotation;
pub mod detection;
pub mod pipeline;
pub mod shared;
pub mod video;
