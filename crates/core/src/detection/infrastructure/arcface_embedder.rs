/// ArcFace face embedder using ONNX Runtime.
///
/// Crops the face box out of the frame, resizes the crop to 112x112, and
/// returns an L2-normalized embedding so cosine distance reduces to
/// `1 - dot(a, b)`.
use std::path::Path;

use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

use super::execution_provider::open_session;
use super::math::l2_normalize;

const INPUT_SIZE: usize = 112;
const NORM_MEAN: f32 = 127.5;
const NORM_STD: f32 = 127.5;

/// Extra margin around the detector box, as a fraction of its size.
const CROP_MARGIN: f64 = 0.1;

pub struct ArcFaceEmbedder {
    session: ort::session::Session,
}

impl ArcFaceEmbedder {
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            session: open_session(model_path)?,
        })
    }

    pub fn embed(
        &mut self,
        frame: &Frame,
        face: &FaceBox,
    ) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
        let crop = crop_face(frame, face).ok_or("face box lies outside the frame")?;
        let tensor = preprocess(&crop.data, crop.width, crop.height);
        let input_value = ort::value::Tensor::from_array(tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("embedding model produced no outputs".into());
        }
        let embedding_array = outputs[0].try_extract_array::<f32>()?;
        let embedding_slice = embedding_array
            .as_slice()
            .ok_or("Cannot get embedding slice")?;

        let mut embedding = embedding_slice.to_vec();
        l2_normalize(&mut embedding);
        Ok(embedding)
    }
}

#[derive(Debug)]
struct Crop {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

/// Copies the face region (plus margin, clamped to the frame) into a
/// packed RGB buffer. `None` when nothing of the box is inside the frame.
fn crop_face(frame: &Frame, face: &FaceBox) -> Option<Crop> {
    let margin_x = (face.width() as f64 * CROP_MARGIN).round() as i32;
    let margin_y = (face.height() as f64 * CROP_MARGIN).round() as i32;
    let fw = frame.width() as i32;
    let fh = frame.height() as i32;

    let x1 = (face.left - margin_x).clamp(0, fw);
    let y1 = (face.top - margin_y).clamp(0, fh);
    let x2 = (face.right + margin_x).clamp(0, fw);
    let y2 = (face.bottom + margin_y).clamp(0, fh);
    if x2 <= x1 || y2 <= y1 {
        return None;
    }

    let width = (x2 - x1) as usize;
    let height = (y2 - y1) as usize;
    let stride = frame.width() as usize * 3;
    let src = frame.data();

    let mut data = Vec::with_capacity(width * height * 3);
    for y in y1 as usize..y2 as usize {
        let start = y * stride + x1 as usize * 3;
        data.extend_from_slice(&src[start..start + width * 3]);
    }

    Some(Crop {
        data,
        width: width as u32,
        height: height as u32,
    })
}

/// Resize crop to 112x112, normalize, NCHW layout.
fn preprocess(rgb_data: &[u8], width: u32, height: u32) -> ndarray::Array4<f32> {
    let src_w = width as usize;
    let src_h = height as usize;

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, INPUT_SIZE, INPUT_SIZE));

    for y in 0..INPUT_SIZE {
        let src_y = (((y as f64 + 0.5) * src_h as f64 / INPUT_SIZE as f64) as usize).min(src_h - 1);
        for x in 0..INPUT_SIZE {
            let src_x =
                (((x as f64 + 0.5) * src_w as f64 / INPUT_SIZE as f64) as usize).min(src_w - 1);
            let offset = (src_y * src_w + src_x) * 3;
            for c in 0..3 {
                tensor[[0, c, y, x]] = (rgb_data[offset + c] as f32 - NORM_MEAN) / NORM_STD;
            }
        }
    }

    tensor
}
