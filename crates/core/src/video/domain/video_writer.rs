use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// Abstracts video encoding so the scan can write output without
/// depending on a specific codec library.
pub trait VideoWriter: Send {
    /// Creates the output container with the source's geometry and rate.
    fn open(
        &mut self,
        path: &Path,
        metadata: &VideoMetadata,
    ) -> Result<(), Box<dyn std::error::Error>>;

    /// Appends one frame in presentation order.
    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>>;

    /// Flushes the encoder and finalizes the container.
    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>>;

    /// Name of the codec the writer settled on, once opened.
    fn codec_name(&self) -> Option<String>;
}
