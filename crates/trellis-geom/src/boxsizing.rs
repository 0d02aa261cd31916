/// Border and padding widths of a node, as computed by the host surface.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct BoxSizing {
    /// Top border width.
    pub border_top: u32,
    /// Left border width.
    pub border_left: u32,
    /// Right border width.
    pub border_right: u32,
    /// Bottom border width.
    pub border_bottom: u32,
    /// Top padding.
    pub padding_top: u32,
    /// Left padding.
    pub padding_left: u32,
    /// Right padding.
    pub padding_right: u32,
    /// Bottom padding.
    pub padding_bottom: u32,
}

impl BoxSizing {
    /// Uniform border and padding on all four sides.
    pub fn uniform(border: u32, padding: u32) -> Self {
        Self {
            border_top: border,
            border_left: border,
            border_right: border,
            border_bottom: border,
            padding_top: padding,
            padding_left: padding,
            padding_right: padding,
            padding_bottom: padding,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform() {
        let b = BoxSizing::uniform(1, 2);
        assert_eq!(b.border_top, 1);
        assert_eq!(b.border_right, 1);
        assert_eq!(b.padding_left, 2);
        assert_eq!(b.padding_bottom, 2);
        assert_eq!(BoxSizing::uniform(0, 0), BoxSizing::default());
    }
}
