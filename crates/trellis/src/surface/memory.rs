use std::collections::HashMap;

use slotmap::SlotMap;
use trellis_geom::{BoxSizing, Rect, SizeLimits};

use super::{StyleProperty, StyleValue, Surface};
use crate::{id::SurfaceNode, name::NodeName};

/// A node stored in the memory surface.
#[derive(Debug, Default)]
struct Entry {
    /// Diagnostic name.
    name: String,
    /// Parent node.
    parent: Option<SurfaceNode>,
    /// Ordered children.
    children: Vec<SurfaceNode>,
    /// Inline styles.
    styles: HashMap<StyleProperty, StyleValue>,
    /// Hidden marker.
    hidden: bool,
    /// Geometry reported by offset reads.
    rect: Rect,
    /// Border and padding reported to the tree.
    box_sizing: BoxSizing,
}

/// A headless surface that keeps its node tree in memory.
///
/// Geometry is whatever the host configures through [`set_offset_rect`] and
/// [`set_box_sizing`]. Size limits are derived from the inline min/max
/// styles, so limits written by the tree read back through the surface.
///
/// [`set_offset_rect`]: MemorySurface::set_offset_rect
/// [`set_box_sizing`]: MemorySurface::set_box_sizing
#[derive(Debug)]
pub struct MemorySurface {
    /// Node storage.
    nodes: SlotMap<SurfaceNode, Entry>,
    /// Document root.
    root: SurfaceNode,
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySurface {
    /// Construct a surface holding only its root.
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Entry {
            name: "root".into(),
            ..Entry::default()
        });
        Self { nodes, root }
    }

    /// Create a node and append it to the document root.
    pub fn create_host(&mut self, name: &str) -> SurfaceNode {
        let node = self.nodes.insert(Entry {
            name: name.into(),
            ..Entry::default()
        });
        let root = self.root;
        self.append_child(root, node);
        node
    }

    /// Set the geometry reported for a node.
    pub fn set_offset_rect(&mut self, node: SurfaceNode, rect: Rect) {
        if let Some(e) = self.nodes.get_mut(node) {
            e.rect = rect;
        }
    }

    /// Set the border and padding reported for a node.
    pub fn set_box_sizing(&mut self, node: SurfaceNode, sizing: BoxSizing) {
        if let Some(e) = self.nodes.get_mut(node) {
            e.box_sizing = sizing;
        }
    }

    /// The diagnostic name of a node.
    pub fn name(&self, node: SurfaceNode) -> Option<&str> {
        self.nodes.get(node).map(|e| e.name.as_str())
    }

    /// Does the node still exist?
    pub fn contains(&self, node: SurfaceNode) -> bool {
        self.nodes.contains_key(node)
    }

    /// Number of live nodes, including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Is the surface empty apart from its root?
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Unlink `child` from whatever parent it has.
    fn unlink(&mut self, child: SurfaceNode) {
        let Some(parent) = self.nodes.get(child).and_then(|e| e.parent) else {
            return;
        };
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.retain(|c| *c != child);
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = None;
        }
    }

    /// Read a length style as a non-negative size.
    fn px(&self, node: SurfaceNode, prop: StyleProperty) -> Option<u32> {
        match self.style(node, prop) {
            Some(StyleValue::Px(v)) => Some(u32::try_from(v.max(0)).unwrap_or(u32::MAX)),
            _ => None,
        }
    }
}

impl Surface for MemorySurface {
    fn root(&self) -> SurfaceNode {
        self.root
    }

    fn create_node(&mut self, name: &NodeName) -> SurfaceNode {
        self.nodes.insert(Entry {
            name: name.to_string(),
            ..Entry::default()
        })
    }

    fn release_node(&mut self, node: SurfaceNode) {
        if node == self.root {
            return;
        }
        self.unlink(node);
        if let Some(entry) = self.nodes.remove(node) {
            for child in entry.children {
                if let Some(c) = self.nodes.get_mut(child) {
                    c.parent = None;
                }
            }
        }
    }

    fn append_child(&mut self, parent: SurfaceNode, child: SurfaceNode) {
        self.insert_before(parent, child, None);
    }

    fn insert_before(
        &mut self,
        parent: SurfaceNode,
        child: SurfaceNode,
        reference: Option<SurfaceNode>,
    ) {
        if parent == child || !self.nodes.contains_key(parent) || !self.nodes.contains_key(child)
        {
            return;
        }
        self.unlink(child);
        let siblings = &mut self.nodes[parent].children;
        let at = reference
            .and_then(|r| siblings.iter().position(|c| *c == r))
            .unwrap_or(siblings.len());
        siblings.insert(at, child);
        self.nodes[child].parent = Some(parent);
    }

    fn remove_child(&mut self, parent: SurfaceNode, child: SurfaceNode) {
        if self.parent_of(child) == Some(parent) {
            self.unlink(child);
        }
    }

    fn parent_of(&self, node: SurfaceNode) -> Option<SurfaceNode> {
        self.nodes.get(node).and_then(|e| e.parent)
    }

    fn children_of(&self, node: SurfaceNode) -> Vec<SurfaceNode> {
        self.nodes
            .get(node)
            .map(|e| e.children.clone())
            .unwrap_or_default()
    }

    fn is_connected(&self, node: SurfaceNode) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == self.root {
                return true;
            }
            current = self.parent_of(id);
        }
        false
    }

    fn offset_rect(&self, node: SurfaceNode) -> Rect {
        self.nodes.get(node).map(|e| e.rect).unwrap_or_default()
    }

    fn box_sizing(&self, node: SurfaceNode) -> BoxSizing {
        self.nodes
            .get(node)
            .map(|e| e.box_sizing)
            .unwrap_or_default()
    }

    fn size_limits(&self, node: SurfaceNode) -> SizeLimits {
        SizeLimits {
            min_width: self.px(node, StyleProperty::MinWidth).unwrap_or(0),
            min_height: self.px(node, StyleProperty::MinHeight).unwrap_or(0),
            max_width: self.px(node, StyleProperty::MaxWidth),
            max_height: self.px(node, StyleProperty::MaxHeight),
        }
    }

    fn set_style(&mut self, node: SurfaceNode, prop: StyleProperty, value: Option<StyleValue>) {
        let Some(e) = self.nodes.get_mut(node) else {
            return;
        };
        match value {
            Some(v) => {
                e.styles.insert(prop, v);
            }
            None => {
                e.styles.remove(&prop);
            }
        }
    }

    fn style(&self, node: SurfaceNode, prop: StyleProperty) -> Option<StyleValue> {
        self.nodes
            .get(node)
            .and_then(|e| e.styles.get(&prop).copied())
    }

    fn set_hidden_marker(&mut self, node: SurfaceNode, hidden: bool) {
        if let Some(e) = self.nodes.get_mut(node) {
            e.hidden = hidden;
        }
    }

    fn has_hidden_marker(&self, node: SurfaceNode) -> bool {
        self.nodes.get(node).is_some_and(|e| e.hidden)
    }
}
