use std::result::Result as StdResult;

use thiserror::Error;

use crate::id::{NodeId, SurfaceNode};

/// Result type for trellis operations.
pub type Result<T> = StdResult<T, Error>;

/// Core error type.
///
/// Every variant except `Invalid` and `Internal` is a programmer error: a
/// precondition of a structural operation was violated.
#[derive(PartialEq, Eq, Error, Debug, Clone)]
pub enum Error {
    /// No live node exists for this id.
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeId),
    /// The node has been disposed.
    #[error("node is disposed: {0:?}")]
    Disposed(NodeId),
    /// A widget was inserted into itself.
    #[error("widget cannot be its own child: {0:?}")]
    SelfParenting(NodeId),
    /// Parenting would make a widget its own ancestor.
    #[error("inserting {child:?} under {parent:?} would create a cycle")]
    WouldCreateCycle {
        /// Prospective parent.
        parent: NodeId,
        /// Prospective child.
        child: NodeId,
    },
    /// Only root widgets can be attached to or detached from the host.
    #[error("widget has a parent: {0:?}")]
    NotRoot(NodeId),
    /// The widget is already attached, or its node is already on the surface.
    #[error("widget is already attached: {0:?}")]
    AlreadyAttached(NodeId),
    /// The widget is not attached.
    #[error("widget is not attached: {0:?}")]
    NotAttached(NodeId),
    /// The host node is not part of the live surface.
    #[error("host is not attached to the surface: {0:?}")]
    HostNotAttached(SurfaceNode),
    #[error("invalid: {0}")]
    /// Invalid input error.
    Invalid(String),
    #[error("internal: {0}")]
    /// Internal error.
    Internal(String),
}
