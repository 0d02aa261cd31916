//! The widget hook trait.

use std::any::{Any, type_name};

use crate::{
    context::Context,
    error::Result,
    message::{self, ChildMessage, Message, ResizeMessage},
    name::NodeName,
};

/// Widgets are the behaviour attached to nodes in the tree.
///
/// The tree owns the structure and the lifecycle flags; a widget only
/// observes them through one hook per message kind. Hooks take `&self`
/// because dispatch is re-entrant: a hook may synchronously cause another
/// message to be delivered to the same widget before it returns. Widgets
/// that keep mutable state use interior mutability.
///
/// Several defaults do real work. Overrides that still want it can call the
/// matching [`Context`] helper.
pub trait Widget: Any {
    /// Name used in diagnostics and for the widget's surface node.
    fn name(&self) -> NodeName {
        NodeName::of_type(type_name::<Self>())
    }

    /// Should `msg` be dropped because an equivalent message is already
    /// pending? Consulted only when posting.
    fn compress_message(&self, msg: &Message, pending: &[&Message]) -> bool {
        message::compress(msg, pending)
    }

    /// The widget was resized. By default, every child gets an
    /// unknown-size resize.
    fn on_resize(&self, ctx: &mut Context<'_>, _msg: &ResizeMessage) -> Result<()> {
        ctx.broadcast_to_children(&Message::Resize(ResizeMessage::UNKNOWN))
    }

    /// The widget should refresh. Like resize, the default makes every child
    /// re-measure.
    fn on_update_request(&self, ctx: &mut Context<'_>) -> Result<()> {
        ctx.broadcast_to_children(&Message::Resize(ResizeMessage::UNKNOWN))
    }

    /// The widget's layout should be recomputed.
    fn on_layout_request(&self, _ctx: &mut Context<'_>) -> Result<()> {
        Ok(())
    }

    /// A child was inserted. The default places the child's surface node and
    /// attaches the child if this widget is attached.
    fn on_child_added(&self, ctx: &mut Context<'_>, msg: &ChildMessage) -> Result<()> {
        ctx.place_child(msg)
    }

    /// A child was removed. The default detaches the child if this widget is
    /// attached and takes its node off the surface.
    fn on_child_removed(&self, ctx: &mut Context<'_>, msg: &ChildMessage) -> Result<()> {
        ctx.unplace_child(msg)
    }

    /// A child changed index. The default runs a detach/attach cycle around
    /// the physical move.
    fn on_child_moved(&self, ctx: &mut Context<'_>, msg: &ChildMessage) -> Result<()> {
        ctx.reposition_child(msg)
    }

    /// The widget became visible. The visible flag is already set.
    fn on_after_show(&self, _ctx: &mut Context<'_>) -> Result<()> {
        Ok(())
    }

    /// The widget is about to stop being visible. The visible flag is still
    /// set.
    fn on_before_hide(&self, _ctx: &mut Context<'_>) -> Result<()> {
        Ok(())
    }

    /// The widget was attached. The attached flag is already set.
    fn on_after_attach(&self, _ctx: &mut Context<'_>) -> Result<()> {
        Ok(())
    }

    /// The widget is about to be detached. The attached flag is still set.
    fn on_before_detach(&self, _ctx: &mut Context<'_>) -> Result<()> {
        Ok(())
    }

    /// A child stopped being hidden.
    fn on_child_shown(&self, _ctx: &mut Context<'_>, _msg: &ChildMessage) -> Result<()> {
        Ok(())
    }

    /// A child became hidden.
    fn on_child_hidden(&self, _ctx: &mut Context<'_>, _msg: &ChildMessage) -> Result<()> {
        Ok(())
    }

    /// The widget was asked to close. The default removes it from its parent,
    /// or detaches it if it is an attached root. This does not dispose it.
    fn on_close_request(&self, ctx: &mut Context<'_>) -> Result<()> {
        ctx.close()
    }

    /// Handle a custom message kind.
    fn on_message(&self, _ctx: &mut Context<'_>, _msg: &Message) -> Result<()> {
        Ok(())
    }

    /// Called once, when disposal begins. The disposed flag is set and the
    /// widget is still in the tree.
    fn on_dispose(&self, _ctx: &mut Context<'_>) -> Result<()> {
        Ok(())
    }
}

/// A widget with no behaviour beyond the defaults.
#[derive(Debug, Default, Clone, Copy)]
pub struct Container;

impl Widget for Container {}
