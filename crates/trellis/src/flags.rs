use bitflags::bitflags;

bitflags! {
    /// Lifecycle state of a widget. Mutated only by the message dispatcher
    /// and by disposal.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WidgetFlags: u8 {
        /// The widget's node is part of the live host surface.
        const ATTACHED = 0b001;
        /// Attached, not hidden, and not under a hidden ancestor.
        const VISIBLE = 0b010;
        /// Terminal state. Never cleared once set.
        const DISPOSED = 0b100;
    }
}

impl WidgetFlags {
    /// Is the attached flag set?
    pub fn is_attached(self) -> bool {
        self.contains(Self::ATTACHED)
    }

    /// Is the visible flag set?
    pub fn is_visible(self) -> bool {
        self.contains(Self::VISIBLE)
    }

    /// Is the disposed flag set?
    pub fn is_disposed(self) -> bool {
        self.contains(Self::DISPOSED)
    }
}
