use ndarray::ArrayView3;

/// A single decoded video frame or still image: tightly packed RGB24 bytes
/// in row-major order.
///
/// Pixel format conversion happens at the I/O boundaries (ffmpeg scaler,
/// `image` crate); everything in between treats the buffer as RGB.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    index: usize,
}

impl Frame {
    pub const CHANNELS: u8 = 3;

    pub fn new(data: Vec<u8>, width: u32, height: u32, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            Self::buffer_len(width, height),
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
            index,
        }
    }

    /// Byte length of an RGB24 buffer with the given dimensions.
    pub fn buffer_len(width: u32, height: u32) -> usize {
        (width as usize) * (height as usize) * Self::CHANNELS as usize
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Moves the pixel buffer out, leaving the frame empty until
    /// [`Frame::restore_data`] puts a buffer back.
    pub fn take_data(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.data)
    }

    pub fn restore_data(&mut self, data: Vec<u8>) {
        debug_assert_eq!(
            data.len(),
            Self::buffer_len(self.width, self.height),
            "restored buffer must match frame dimensions"
        );
        self.data = data;
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Decode-order index within the source (0 for still images).
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(
            (
                self.height as usize,
                self.width as usize,
                Self::CHANNELS as usize,
            ),
            &self.data,
        )
        .expect("Frame data length must match dimensions")
    }
}
