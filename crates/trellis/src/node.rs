use std::rc::Rc;

use trellis_geom::{BoxSizing, Rect, SizeLimits};

use crate::{
    flags::WidgetFlags,
    id::{NodeId, SurfaceNode},
    name::NodeName,
    widget::Widget,
};

/// Lazily computed geometry. Each field is `None` until first computed or
/// after being cleared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeometryCache {
    /// Border and padding read from the surface.
    pub(crate) box_sizing: Option<BoxSizing>,
    /// Size limits read from the surface.
    pub(crate) size_limits: Option<SizeLimits>,
    /// The last offset geometry set by a layout.
    pub(crate) offset: Option<Rect>,
}

/// Which parts of an offset rect changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct OffsetChange {
    /// Left offset changed.
    pub(crate) left: bool,
    /// Top offset changed.
    pub(crate) top: bool,
    /// Width changed.
    pub(crate) width: bool,
    /// Height changed.
    pub(crate) height: bool,
}

impl OffsetChange {
    /// Did the size change?
    pub(crate) fn resized(&self) -> bool {
        self.width || self.height
    }
}

impl GeometryCache {
    /// Cached border and padding.
    pub fn box_sizing(&self) -> Option<BoxSizing> {
        self.box_sizing
    }

    /// Cached size limits.
    pub fn size_limits(&self) -> Option<SizeLimits> {
        self.size_limits
    }

    /// Cached offset rect.
    pub fn offset(&self) -> Option<Rect> {
        self.offset
    }

    /// Store a new offset rect and report what differs from the old one.
    /// With nothing cached, everything differs.
    pub(crate) fn update_offset(&mut self, rect: Rect) -> OffsetChange {
        let change = match self.offset {
            None => OffsetChange {
                left: true,
                top: true,
                width: true,
                height: true,
            },
            Some(old) => OffsetChange {
                left: old.left() != rect.left(),
                top: old.top() != rect.top(),
                width: old.w != rect.w,
                height: old.h != rect.h,
            },
        };
        self.offset = Some(rect);
        change
    }
}

/// Widget data stored in the arena.
pub struct Node {
    /// Widget behaviour.
    pub(crate) widget: Rc<dyn Widget>,
    /// Name for diagnostics.
    pub(crate) name: NodeName,

    /// Parent in the tree.
    pub(crate) parent: Option<NodeId>,
    /// Children in order.
    pub(crate) children: Vec<NodeId>,

    /// Lifecycle flags.
    pub(crate) flags: WidgetFlags,
    /// Explicitly hidden.
    pub(crate) hidden: bool,

    /// The widget's node on the host surface.
    pub(crate) surface: SurfaceNode,
    /// Cached geometry.
    pub(crate) geometry: GeometryCache,
}

impl Node {
    /// The widget name.
    pub fn name(&self) -> &NodeName {
        &self.name
    }

    /// The parent, if any.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The children, in order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Lifecycle flags.
    pub fn flags(&self) -> WidgetFlags {
        self.flags
    }

    /// Is the node explicitly hidden?
    pub fn hidden(&self) -> bool {
        self.hidden
    }

    /// The node's surface node.
    pub fn surface(&self) -> SurfaceNode {
        self.surface
    }

    /// Cached geometry.
    pub fn geometry(&self) -> GeometryCache {
        self.geometry
    }
}
