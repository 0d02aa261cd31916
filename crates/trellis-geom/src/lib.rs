//! Geometry primitives shared by the trellis widget tree.

/// Box-model sizing read from the host surface.
mod boxsizing;
/// Min/max size constraints.
mod limits;
/// Signed point type.
mod point;
/// Offset rectangles.
mod rect;

pub use boxsizing::BoxSizing;
pub use limits::SizeLimits;
pub use point::Point;
pub use rect::Rect;
