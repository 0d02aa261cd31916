//! Widget hierarchy and message dispatch for a retained-mode UI toolkit.
//!
//! A [`Tree`] owns widgets in an arena keyed by [`NodeId`]. Structural
//! operations (inserting, moving and removing children, attaching roots to
//! the host [`Surface`], toggling visibility) are carried out by sending
//! messages through a per-widget state machine that keeps the attached and
//! visible flags of the whole subtree consistent. Widgets customise
//! behaviour by overriding [`Widget`] hooks.

mod context;
pub mod dump;
pub mod error;
mod flags;
mod id;
pub mod message;
mod name;
mod node;
pub mod scheduler;
pub mod surface;
pub mod testing;
pub mod tree;
mod widget;

pub use context::Context;
pub use dump::dump;
pub use error::{Error, Result};
pub use flags::WidgetFlags;
pub use id::{NodeId, SurfaceNode};
pub use message::{ChildMessage, Message, ResizeMessage};
pub use name::NodeName;
pub use node::{GeometryCache, Node};
pub use scheduler::OwnerData;
pub use surface::{MemorySurface, StyleProperty, StyleValue, Surface};
pub use tree::{Tree, TreeBuilder};
pub use widget::{Container, Widget};

pub use trellis_geom as geom;
pub use trellis_geom::{BoxSizing, Point, Rect, SizeLimits};
