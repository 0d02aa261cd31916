/// Minimum and maximum size constraints. A `None` maximum is unbounded.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct SizeLimits {
    /// Minimum width.
    pub min_width: u32,
    /// Minimum height.
    pub min_height: u32,
    /// Maximum width, if bounded.
    pub max_width: Option<u32>,
    /// Maximum height, if bounded.
    pub max_height: Option<u32>,
}

impl SizeLimits {
    /// No constraints at all.
    pub fn unbounded() -> Self {
        Self::default()
    }
}
