//! The host-surface collaborator.
//!
//! The tree touches the host only through this trait: node creation and
//! release, child insertion and removal, geometric reads, and inline style
//! writes.

use std::any::Any;

use trellis_geom::{BoxSizing, Rect, SizeLimits};

use crate::{id::SurfaceNode, name::NodeName};

/// In-memory surface implementation.
mod memory;

pub use memory::MemorySurface;

/// Inline style properties the tree writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleProperty {
    /// Positioning scheme.
    Position,
    /// Left offset.
    Left,
    /// Top offset.
    Top,
    /// Explicit width.
    Width,
    /// Explicit height.
    Height,
    /// Minimum width.
    MinWidth,
    /// Minimum height.
    MinHeight,
    /// Maximum width.
    MaxWidth,
    /// Maximum height.
    MaxHeight,
}

/// An inline style value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleValue {
    /// A length in surface units.
    Px(i64),
    /// Absolute positioning.
    Absolute,
    /// Explicitly unconstrained.
    None,
}

/// A host surface: a tree of native nodes that widgets are rendered into.
pub trait Surface: Any {
    /// The document root. Nodes reachable from here are live.
    fn root(&self) -> SurfaceNode;

    /// Create a detached node.
    fn create_node(&mut self, name: &NodeName) -> SurfaceNode;

    /// Destroy a node, removing it from its parent.
    fn release_node(&mut self, node: SurfaceNode);

    /// Append `child` as the last child of `parent`, moving it if needed.
    fn append_child(&mut self, parent: SurfaceNode, child: SurfaceNode);

    /// Insert `child` under `parent` before `reference`, or append it if
    /// `reference` is `None`. Moves `child` if it is already placed.
    fn insert_before(
        &mut self,
        parent: SurfaceNode,
        child: SurfaceNode,
        reference: Option<SurfaceNode>,
    );

    /// Remove `child` from `parent`. A no-op if `child` is not under `parent`.
    fn remove_child(&mut self, parent: SurfaceNode, child: SurfaceNode);

    /// The parent of a node.
    fn parent_of(&self, node: SurfaceNode) -> Option<SurfaceNode>;

    /// The children of a node, in order.
    fn children_of(&self, node: SurfaceNode) -> Vec<SurfaceNode>;

    /// Is the node part of the live surface tree?
    fn is_connected(&self, node: SurfaceNode) -> bool;

    /// Current offset geometry of the node.
    fn offset_rect(&self, node: SurfaceNode) -> Rect;

    /// Computed border and padding of the node.
    fn box_sizing(&self, node: SurfaceNode) -> BoxSizing;

    /// Computed size limits of the node.
    fn size_limits(&self, node: SurfaceNode) -> SizeLimits;

    /// Write an inline style. `None` removes the property.
    fn set_style(&mut self, node: SurfaceNode, prop: StyleProperty, value: Option<StyleValue>);

    /// Read an inline style.
    fn style(&self, node: SurfaceNode, prop: StyleProperty) -> Option<StyleValue>;

    /// Apply or remove the visual marker for hidden widgets.
    fn set_hidden_marker(&mut self, node: SurfaceNode, hidden: bool);

    /// Does the node carry the hidden marker?
    fn has_hidden_marker(&self, node: SurfaceNode) -> bool;
}
