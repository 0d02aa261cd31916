use crate::{
    error::Result,
    id::NodeId,
    message::{ChildMessage, Message},
    tree::Tree,
};

/// The view of the tree handed to a widget hook.
///
/// A context borrows the whole tree for the duration of the hook, so a hook
/// can query and mutate any widget. Sends made through it run to completion
/// before they return.
pub struct Context<'a> {
    /// The tree being dispatched on.
    tree: &'a mut Tree,
    /// The widget whose hook is running.
    node_id: NodeId,
}

impl<'a> Context<'a> {
    /// Bind a context to a node.
    pub(crate) fn new(tree: &'a mut Tree, node_id: NodeId) -> Self {
        Self { tree, node_id }
    }

    /// The widget whose hook is running.
    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    /// Shared access to the tree.
    pub fn tree(&self) -> &Tree {
        &*self.tree
    }

    /// Mutable access to the tree.
    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut *self.tree
    }

    /// This widget's parent.
    pub fn parent(&self) -> Option<NodeId> {
        self.tree.parent(self.node_id)
    }

    /// This widget's children, in order.
    pub fn children(&self) -> &[NodeId] {
        self.tree.children(self.node_id)
    }

    /// Is this widget attached?
    pub fn is_attached(&self) -> bool {
        self.tree.is_attached(self.node_id)
    }

    /// Is this widget visible?
    pub fn is_visible(&self) -> bool {
        self.tree.is_visible(self.node_id)
    }

    /// Is this widget explicitly hidden?
    pub fn is_hidden(&self) -> bool {
        self.tree.is_hidden(self.node_id)
    }

    /// Has disposal of this widget begun?
    pub fn is_disposed(&self) -> bool {
        self.tree.is_disposed(self.node_id)
    }

    /// Send a message synchronously.
    pub fn send(&mut self, target: NodeId, msg: &Message) -> Result<()> {
        self.tree.send_message(target, msg)
    }

    /// Post a message for the next flush.
    pub fn post(&mut self, target: NodeId, msg: Message) -> Result<bool> {
        self.tree.post_message(target, msg)
    }

    /// Send a message to each current child of this widget.
    pub fn broadcast_to_children(&mut self, msg: &Message) -> Result<()> {
        self.tree.forward(self.node_id, msg, false);
        Ok(())
    }

    /// Default handling for child-added.
    pub fn place_child(&mut self, msg: &ChildMessage) -> Result<()> {
        self.tree.place_child_node(self.node_id, msg);
        Ok(())
    }

    /// Default handling for child-moved.
    pub fn reposition_child(&mut self, msg: &ChildMessage) -> Result<()> {
        self.tree.reposition_child_node(self.node_id, msg);
        Ok(())
    }

    /// Default handling for child-removed.
    pub fn unplace_child(&mut self, msg: &ChildMessage) -> Result<()> {
        self.tree.unplace_child_node(self.node_id, msg);
        Ok(())
    }

    /// Default handling for close-request: leave the parent, or detach if
    /// this is an attached root.
    pub fn close(&mut self) -> Result<()> {
        let id = self.node_id;
        if let Some(parent) = self.tree.parent(id) {
            self.tree.remove_child(parent, id)?;
        } else if self.tree.is_attached(id) {
            self.tree.detach_widget(id)?;
        }
        Ok(())
    }
}
