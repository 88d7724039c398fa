use serde::{Deserialize, Serialize};

/// A point in screen pixels, origin top-left, y growing downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self { Self { x, y } }

    pub const fn offset(self, dx: i32, dy: i32) -> Self { Self::new(self.x + dx, self.y + dy) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub w: i32,
    pub h: i32,
}

impl Size {
    pub const fn new(w: i32, h: i32) -> Self { Self { w, h } }

    /// Largest 16:9 area that fits in a quarter of `self`.
    pub fn quarter_16_9(self) -> Size {
        let w = self.w / 2;
        let h = self.h / 2;
        if w * 9 > h * 16 {
            Size::new(h * 16 / 9, h)
        } else {
            Size::new(w, w * 9 / 16)
        }
    }
}

/// Screen rectangle `(x, y, w, h)`.
///
/// Serialized as a four element array so plans stay readable and match what
/// window providers report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "[i32; 4]", into = "[i32; 4]")]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    /// Returns `None` when either dimension is negative.
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Option<Self> {
        (w >= 0 && h >= 0).then_some(Self { x, y, w, h })
    }

    pub fn from_parts(origin: Point, size: Size) -> Option<Self> {
        Self::new(origin.x, origin.y, size.w, size.h)
    }

    pub fn origin(&self) -> Point { Point::new(self.x, self.y) }

    pub fn size(&self) -> Size { Size::new(self.w, self.h) }

    pub fn right(&self) -> i32 { self.x + self.w }

    pub fn bottom(&self) -> i32 { self.y + self.h }

    pub fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    pub fn with_origin(&self, origin: Point) -> Rect {
        Rect {
            x: origin.x,
            y: origin.y,
            ..*self
        }
    }

    pub fn is_empty(&self) -> bool { self.w == 0 || self.h == 0 }
}

impl TryFrom<[i32; 4]> for Rect {
    type Error = String;

    fn try_from([x, y, w, h]: [i32; 4]) -> Result<Self, Self::Error> {
        Rect::new(x, y, w, h).ok_or_else(|| format!("negative rect size {w}x{h}"))
    }
}

impl From<Rect> for [i32; 4] {
    fn from(r: Rect) -> Self { [r.x, r.y, r.w, r.h] }
}

/// Rectangle in corner form `(x0, y0, x1, y1)`, used for snap bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Band {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl Band {
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self { Self { x0, y0, x1, y1 } }

    pub fn width(&self) -> i32 { self.x1 - self.x0 }

    pub fn height(&self) -> i32 { self.y1 - self.y0 }

    pub fn translate(&self, dx: i32, dy: i32) -> Band {
        Band::new(self.x0 + dx, self.y0 + dy, self.x1 + dx, self.y1 + dy)
    }
}

impl From<Rect> for Band {
    fn from(r: Rect) -> Self { Band::new(r.x, r.y, r.right(), r.bottom()) }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn rect_rejects_negative_size() {
        assert!(Rect::new(0, 0, -1, 10).is_none());
        assert!(Rect::new(0, 0, 10, -1).is_none());
        assert!(Rect::new(-50, -50, 0, 0).is_some());
    }

    #[test]
    fn rect_serializes_as_array() {
        let r = Rect::new(1, 2, 3, 4).unwrap();
        assert_eq!(serde_json::to_string(&r).unwrap(), "[1,2,3,4]");
        let back: Rect = serde_json::from_str("[1,2,3,4]").unwrap();
        assert_eq!(back, r);
        assert!(serde_json::from_str::<Rect>("[1,2,-3,4]").is_err());
        assert!(serde_json::from_str::<Rect>("[1,2,3]").is_err());
    }

    #[test]
    fn quarter_of_common_monitors() {
        assert_eq!(Size::new(1920, 1080).quarter_16_9(), Size::new(960, 540));
        // Tall monitor: width bound.
        assert_eq!(Size::new(1080, 1920).quarter_16_9(), Size::new(540, 303));
        // Ultra wide: height bound.
        assert_eq!(Size::new(3440, 1440).quarter_16_9(), Size::new(1280, 720));
    }
}
