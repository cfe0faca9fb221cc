use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/*------------------------------------------------------------------------------
 * Rect struct
 *------------------------------------------------------------------------------*/

/// Axis-aligned rectangle in integer pixel coordinates (row-major origin).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub upper: i32,
    pub left: i32,
    pub height: i32,
    pub width: i32,
}

impl Rect {
    /// Sentinel for "no such rectangle" (e.g. an unsupported named anchor).
    pub const INVALID: Rect = Rect {
        upper: -1,
        left: -1,
        height: -1,
        width: -1,
    };

    pub fn new(upper: i32, left: i32, height: i32, width: i32) -> Self {
        Self {
            upper,
            left,
            height,
            width,
        }
    }

    pub fn is_invalid(&self) -> bool {
        *self == Self::INVALID
    }

    pub fn size(&self) -> Size {
        Size {
            height: self.height,
            width: self.width,
        }
    }

    pub fn center(&self) -> Point2D {
        Point2D {
            row: self.upper + self.height / 2,
            col: self.left + self.width / 2,
        }
    }

    /// Smallest rectangle containing both `self` and `other`.
    pub fn union(&self, other: Rect) -> Rect {
        let upper = self.upper.min(other.upper);
        let left = self.left.min(other.left);
        Rect {
            upper,
            left,
            height: (self.upper + self.height).max(other.upper + other.height) - upper,
            width: (self.left + self.width).max(other.left + other.width) - left,
        }
    }

    /// Scale around the center. The origin is clamped at zero, the scaled
    /// extent is truncated to integer pixels.
    pub fn scaled(&self, factor: f32) -> Rect {
        let upper =
            (self.upper as f32 - (self.height as f32 * factor - self.height as f32) / 2.0) as i32;
        let left =
            (self.left as f32 - (self.width as f32 * factor - self.width as f32) / 2.0) as i32;
        Rect {
            upper: upper.max(0),
            left: left.max(0),
            height: (self.height as f32 * factor) as i32,
            width: (self.width as f32 * factor) as i32,
        }
    }

    /// True when the rectangle lies completely inside `valid_roi`.
    pub fn is_valid(&self, valid_roi: Rect) -> bool {
        self.upper >= valid_roi.upper
            && self.upper <= valid_roi.upper + valid_roi.height
            && self.left >= valid_roi.left
            && self.left <= valid_roi.left + valid_roi.width
            && self.upper + self.height >= valid_roi.upper
            && self.upper + self.height <= valid_roi.upper + valid_roi.height
            && self.left + self.width >= valid_roi.left
            && self.left + self.width <= valid_roi.left + valid_roi.width
    }

    /// Intersection area with `other` in square pixels, 0 when disjoint.
    pub fn overlap(&self, other: Rect) -> i32 {
        let x = self.left.max(other.left);
        let y = self.upper.max(other.upper);
        let w = (self.left + self.width).min(other.left + other.width) - x;
        let h = (self.upper + self.height).min(other.upper + other.height) - y;
        if w > 0 && h > 0 {
            w * h
        } else {
            0
        }
    }
}

impl From<Size> for Rect {
    fn from(s: Size) -> Self {
        Rect {
            upper: 0,
            left: 0,
            height: s.height,
            width: s.width,
        }
    }
}

impl Add<Point2D> for Rect {
    type Output = Rect;

    fn add(self, p: Point2D) -> Rect {
        Rect {
            upper: self.upper + p.row,
            left: self.left + p.col,
            ..self
        }
    }
}

impl Sub<Point2D> for Rect {
    type Output = Rect;

    fn sub(self, p: Point2D) -> Rect {
        Rect {
            upper: self.upper - p.row,
            left: self.left - p.col,
            ..self
        }
    }
}

/*------------------------------------------------------------------------------
 * Size struct
 *------------------------------------------------------------------------------*/

/// A rectangle extent with undefined origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub height: i32,
    pub width: i32,
}

impl Size {
    pub fn new(height: i32, width: i32) -> Self {
        Self { height, width }
    }

    pub fn area(&self) -> i32 {
        self.height * self.width
    }

    pub fn scaled(&self, factor: f32) -> Size {
        Size {
            height: (self.height as f32 * factor) as i32,
            width: (self.width as f32 * factor) as i32,
        }
    }
}

impl From<Rect> for Size {
    fn from(r: Rect) -> Self {
        Size {
            height: r.height,
            width: r.width,
        }
    }
}

/*------------------------------------------------------------------------------
 * Point2D struct
 *------------------------------------------------------------------------------*/

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point2D {
    pub row: i32,
    pub col: i32,
}

impl Point2D {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }
}

impl Add for Point2D {
    type Output = Point2D;

    fn add(self, p: Point2D) -> Point2D {
        Point2D {
            row: self.row + p.row,
            col: self.col + p.col,
        }
    }
}

impl Sub for Point2D {
    type Output = Point2D;

    fn sub(self, p: Point2D) -> Point2D {
        Point2D {
            row: self.row - p.row,
            col: self.col - p.col,
        }
    }
}

impl From<Rect> for Point2D {
    fn from(r: Rect) -> Self {
        Point2D {
            row: r.upper,
            col: r.left,
        }
    }
}
