use serde::{Deserialize, Serialize};

/// A face bounding box in pixel coordinates, stored as the
/// (top, right, bottom, left) edges of the face.
///
/// `right` and `bottom` are exclusive, so `width = right - left`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FaceBox {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl FaceBox {
    pub fn new(top: i32, right: i32, bottom: i32, left: i32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Builds a box from floating-point corners `(x1, y1, x2, y2)`, clamped
    /// to a `frame_width` x `frame_height` frame.
    pub fn from_corners(
        (x1, y1, x2, y2): (f64, f64, f64, f64),
        frame_width: u32,
        frame_height: u32,
    ) -> Self {
        let max_x = frame_width as f64;
        let max_y = frame_height as f64;
        let left = x1.min(x2).clamp(0.0, max_x).floor() as i32;
        let right = x1.max(x2).clamp(0.0, max_x).ceil() as i32;
        let top = y1.min(y2).clamp(0.0, max_y).floor() as i32;
        let bottom = y1.max(y2).clamp(0.0, max_y).ceil() as i32;
        Self::new(top, right, bottom, left)
    }

    pub fn width(&self) -> i32 {
        (self.right - self.left).max(0)
    }

    pub fn height(&self) -> i32 {
        (self.bottom - self.top).max(0)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// `[x1, y1, x2, y2]` form used by IoU helpers.
    pub fn corners(&self) -> [f64; 4] {
        [
            self.left as f64,
            self.top as f64,
            self.right as f64,
            self.bottom as f64,
        ]
    }
}
