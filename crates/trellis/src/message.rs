//! The message model and the compression policy for deferred delivery.

use std::borrow::Cow;

use crate::id::NodeId;

/// A message addressed to a single widget.
///
/// The built-in kinds drive the structural and lifecycle protocol of the
/// tree. `Custom` carries application-defined kinds, which the dispatcher
/// routes to [`Widget::on_message`](crate::Widget::on_message).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Message {
    /// The widget's size changed, or should be re-read.
    Resize(ResizeMessage),
    /// The widget should refresh its content.
    UpdateRequest,
    /// The widget should recompute its layout.
    LayoutRequest,
    /// The widget has been asked to close.
    CloseRequest,
    /// A child was inserted.
    ChildAdded(ChildMessage),
    /// A child was removed.
    ChildRemoved(ChildMessage),
    /// A child changed position.
    ChildMoved(ChildMessage),
    /// A child became un-hidden.
    ChildShown(ChildMessage),
    /// A child became hidden.
    ChildHidden(ChildMessage),
    /// The widget became visible.
    AfterShow,
    /// The widget is about to stop being visible.
    BeforeHide,
    /// The widget was attached to the host surface.
    AfterAttach,
    /// The widget is about to be detached from the host surface.
    BeforeDetach,
    /// An application-defined message kind.
    Custom(Cow<'static, str>),
}

impl Message {
    /// Construct a custom message.
    pub fn custom(kind: impl Into<Cow<'static, str>>) -> Self {
        Self::Custom(kind.into())
    }

    /// The message type string. Two messages of equal kind are
    /// interchangeable for the purposes of compression.
    pub fn kind(&self) -> &str {
        match self {
            Self::Resize(_) => "resize",
            Self::UpdateRequest => "update-request",
            Self::LayoutRequest => "layout-request",
            Self::CloseRequest => "close-request",
            Self::ChildAdded(_) => "child-added",
            Self::ChildRemoved(_) => "child-removed",
            Self::ChildMoved(_) => "child-moved",
            Self::ChildShown(_) => "child-shown",
            Self::ChildHidden(_) => "child-hidden",
            Self::AfterShow => "after-show",
            Self::BeforeHide => "before-hide",
            Self::AfterAttach => "after-attach",
            Self::BeforeDetach => "before-detach",
            Self::Custom(kind) => kind.as_ref(),
        }
    }

    /// The child payload, for the child-* kinds.
    pub fn child(&self) -> Option<&ChildMessage> {
        match self {
            Self::ChildAdded(m)
            | Self::ChildRemoved(m)
            | Self::ChildMoved(m)
            | Self::ChildShown(m)
            | Self::ChildHidden(m) => Some(m),
            _ => None,
        }
    }
}

/// Payload for messages about a child of the receiving widget.
///
/// A `None` index means the index is not reported: `previous_index` for
/// insertions, `current_index` for removals, and both for shown/hidden
/// notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChildMessage {
    /// The child concerned.
    pub child: NodeId,
    /// Index before the change.
    pub previous_index: Option<usize>,
    /// Index after the change.
    pub current_index: Option<usize>,
}

impl ChildMessage {
    /// A child message with no index information.
    pub fn new(child: NodeId) -> Self {
        Self {
            child,
            previous_index: None,
            current_index: None,
        }
    }

    /// Payload for an insertion at `index`.
    pub fn added(child: NodeId, index: usize) -> Self {
        Self {
            current_index: Some(index),
            ..Self::new(child)
        }
    }

    /// Payload for a removal from `index`.
    pub fn removed(child: NodeId, index: usize) -> Self {
        Self {
            previous_index: Some(index),
            ..Self::new(child)
        }
    }

    /// Payload for a move from `from` to `to`.
    pub fn moved(child: NodeId, from: usize, to: usize) -> Self {
        Self {
            child,
            previous_index: Some(from),
            current_index: Some(to),
        }
    }
}

/// Payload for resize messages. `None` dimensions are unknown, and the
/// receiver should measure itself if it needs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResizeMessage {
    /// New width, if known.
    pub width: Option<u32>,
    /// New height, if known.
    pub height: Option<u32>,
}

impl ResizeMessage {
    /// A resize with both dimensions unknown.
    pub const UNKNOWN: Self = Self {
        width: None,
        height: None,
    };

    /// A resize with a known size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
        }
    }

    /// True if neither dimension is known.
    pub fn is_unknown(&self) -> bool {
        self.width.is_none() && self.height.is_none()
    }
}

/// Default compression policy for the deferred path.
///
/// Update, layout and close requests are dropped when a message of the same
/// kind is already pending for the same widget. Every other kind is always
/// delivered.
pub fn compress(msg: &Message, pending: &[&Message]) -> bool {
    match msg {
        Message::UpdateRequest | Message::LayoutRequest | Message::CloseRequest => {
            pending.iter().any(|p| p.kind() == msg.kind())
        }
        _ => false,
    }
}
