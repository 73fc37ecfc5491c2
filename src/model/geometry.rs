//! Page geometry.

use lopdf::Object;
use serde::{Deserialize, Serialize};

/// A PDF rectangle (`MediaBox`, `BleedBox`, `BBox`, ...) in user-space points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl PageBox {
    /// Create a box from its lower-left and upper-right corners.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Create a box anchored at the origin.
    pub fn from_size(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Read a box from a four-number PDF array.
    ///
    /// Integer and real entries are both accepted. Returns `None` when the
    /// object is not an array of at least four numbers.
    pub fn from_object(obj: &Object) -> Option<Self> {
        let array = obj.as_array().ok()?;
        if array.len() < 4 {
            return None;
        }
        let mut coords = [0.0f32; 4];
        for (slot, value) in coords.iter_mut().zip(array.iter()) {
            *slot = value.as_float().ok()?;
        }
        Some(Self::new(coords[0], coords[1], coords[2], coords[3]))
    }

    /// Width of the box (`x1 - x0`).
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Height of the box (`y1 - y0`).
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// The same box translated so it starts at `(0, 0)`.
    ///
    /// Only a translation: width and height are preserved.
    pub fn normalized(&self) -> Self {
        Self::from_size(self.width(), self.height())
    }

    /// Encode as a PDF array.
    pub fn to_object(&self) -> Object {
        Object::Array(vec![
            number(self.x0),
            number(self.y0),
            number(self.x1),
            number(self.y1),
        ])
    }
}

/// Whole numbers are written as integers so unchanged boxes serialize the
/// way most producers write them.
fn number(value: f32) -> Object {
    if value.fract() == 0.0 && value.abs() < i32::MAX as f32 {
        Object::Integer(value as i64)
    } else {
        Object::Real(value)
    }
}
