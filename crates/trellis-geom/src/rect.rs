use super::Point;

/// An offset rectangle: a signed top-left corner plus an unsigned size.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct Rect {
    /// Top-left corner.
    pub tl: Point,
    /// Width.
    pub w: u32,
    /// Height.
    pub h: u32,
}

impl Rect {
    /// Construct a rectangle from an offset and size.
    pub fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self {
            tl: Point { x, y },
            w,
            h,
        }
    }

    /// A zero-sized rect at the origin.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Left offset.
    pub fn left(&self) -> i32 {
        self.tl.x
    }

    /// Top offset.
    pub fn top(&self) -> i32 {
        self.tl.y
    }
}
