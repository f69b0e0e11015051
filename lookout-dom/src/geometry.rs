use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// A rectangle with no area (including NaN sizes from detached nodes).
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// At least `w` wide and `h` tall.
    pub fn at_least(&self, w: f64, h: f64) -> bool {
        self.width >= w && self.height >= h
    }

    pub fn translate(&self, offset: Offset) -> Self {
        Self {
            x: self.x + offset.x,
            y: self.y + offset.y,
            ..*self
        }
    }

    /// A `width` x `height` rectangle sharing this rectangle's center.
    pub fn centered(&self, width: f64, height: f64) -> Self {
        let (cx, cy) = self.center();
        Self::new(cx - width / 2.0, cy - height / 2.0, width, height)
    }
}

/// Accumulated translation of a nested frame's origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Offset {
    pub x: f64,
    pub y: f64,
}

impl Offset {
    pub const ZERO: Offset = Offset { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Shift by the top-left corner of `rect`.
    pub fn shifted_by(&self, rect: &Rect) -> Self {
        Self {
            x: self.x + rect.x,
            y: self.y + rect.y,
        }
    }
}

/// Dimensions and scroll position of the top-level viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub scroll_x: f64,
    #[serde(default)]
    pub scroll_y: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }

    pub fn with_scroll(mut self, x: f64, y: f64) -> Self {
        self.scroll_x = x;
        self.scroll_y = y;
        self
    }

    /// `WIDTHxHEIGHT`, rounded to whole pixels.
    pub fn label(&self) -> String {
        format!("{}x{}", self.width.round() as i64, self.height.round() as i64)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_keeps_center() {
        let r = Rect::new(100.0, 50.0, 40.0, 20.0);
        let m = r.centered(10.0, 10.0);
        assert_eq!(m.center(), r.center());
        assert_eq!(m, Rect::new(115.0, 55.0, 10.0, 10.0));
    }

    #[test]
    fn nan_rect_is_empty() {
        assert!(Rect::new(0.0, 0.0, f64::NAN, 10.0).is_empty());
        assert!(Rect::default().is_empty());
        assert!(!Rect::new(0.0, 0.0, 1.0, 1.0).is_empty());
    }

    #[test]
    fn offsets_accumulate() {
        let o = Offset::ZERO
            .shifted_by(&Rect::new(100.0, 50.0, 300.0, 200.0))
            .shifted_by(&Rect::new(5.0, 5.0, 10.0, 10.0));
        assert_eq!(o, Offset::new(105.0, 55.0));
    }

    #[test]
    fn viewport_label() {
        assert_eq!(Viewport::new(1280.4, 719.6).label(), "1280x720");
    }
}
