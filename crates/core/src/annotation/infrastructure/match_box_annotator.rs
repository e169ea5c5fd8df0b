use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::annotation::domain::frame_annotator::FrameAnnotator;
use crate::detection::domain::face_matcher::FaceMatch;
use crate::shared::constants::MATCH_LABEL;
use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

use super::bitmap_font::{draw_text_mut, text_height};

pub const MATCH_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

const BOX_THICKNESS: i32 = 2;
const TEXT_SCALE: u32 = 2;
/// Vertical gap between the box edge and a text line.
const TEXT_GAP: i32 = 10;

/// Draws a green box around each matched face, the match label above it
/// and the frame timestamp below it.
pub struct MatchBoxAnnotator {
    label: String,
    color: Rgb<u8>,
}

impl MatchBoxAnnotator {
    pub fn new(label: impl Into<String>, color: Rgb<u8>) -> Self {
        Self {
            label: label.into(),
            color,
        }
    }
}

impl Default for MatchBoxAnnotator {
    fn default() -> Self {
        Self::new(MATCH_LABEL, MATCH_COLOR)
    }
}

impl FrameAnnotator for MatchBoxAnnotator {
    fn annotate(
        &self,
        frame: &mut Frame,
        timestamp: f64,
        matches: &[FaceMatch],
    ) -> Result<(), Box<dyn std::error::Error>> {
        let matched: Vec<&FaceBox> = matches
            .iter()
            .filter(|m| m.is_match())
            .map(|m| &m.observation.face_box)
            .filter(|b| !b.is_empty())
            .collect();
        if matched.is_empty() {
            return Ok(());
        }

        let (width, height) = (frame.width(), frame.height());
        let mut img = RgbImage::from_raw(width, height, frame.take_data())
            .ok_or("frame buffer does not match its dimensions")?;

        let time_text = format!("Time: {timestamp:.2}s");
        let line_height = text_height(TEXT_SCALE) as i32;
        for face in matched {
            draw_thick_rect(&mut img, face, self.color);
            draw_text_mut(
                &mut img,
                self.color,
                face.left,
                face.top - TEXT_GAP - line_height,
                TEXT_SCALE,
                &self.label,
            );
            draw_text_mut(
                &mut img,
                self.color,
                face.left,
                face.bottom + TEXT_GAP,
                TEXT_SCALE,
                &time_text,
            );
        }

        frame.restore_data(img.into_raw());
        Ok(())
    }
}

/// Nested hollow rectangles, outermost on the box edge.
fn draw_thick_rect(img: &mut RgbImage, face: &FaceBox, color: Rgb<u8>) {
    for inset in 0..BOX_THICKNESS {
        let w = face.width() - 2 * inset;
        let h = face.height() - 2 * inset;
        if w <= 0 || h <= 0 {
            break;
        }
        let rect = Rect::at(face.left + inset, face.top + inset).of_size(w as u32, h as u32);
        draw_hollow_rect_mut(img, rect, color);
    }
}
