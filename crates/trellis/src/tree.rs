//! The widget arena, the message dispatcher, and every structural operation.

use std::{any::Any, collections::HashSet, fmt, rc::Rc};

use slotmap::SlotMap;
use tracing::{debug, error, trace};
use trellis_geom::{BoxSizing, Rect, SizeLimits};

use crate::{
    context::Context,
    error::{Error, Result},
    flags::WidgetFlags,
    id::{NodeId, SurfaceNode},
    message::{ChildMessage, Message, ResizeMessage},
    node::{GeometryCache, Node},
    scheduler::{MessageQueue, OwnerData},
    surface::{MemorySurface, StyleProperty, StyleValue, Surface},
    widget::Widget,
};

/// Callback receiving errors returned by widget hooks.
pub type ErrorHandler = Box<dyn FnMut(NodeId, &Error)>;

/// Builder for a [`Tree`] with a fluent API.
pub struct TreeBuilder {
    /// Host surface. Defaults to a fresh [`MemorySurface`].
    surface: Option<Box<dyn Surface>>,
    /// Initial arena capacity.
    capacity: usize,
    /// Hook error handler.
    on_error: Option<ErrorHandler>,
    /// Assert invariants after each outermost operation.
    assert_invariants: bool,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self {
            surface: None,
            capacity: 0,
            on_error: None,
            assert_invariants: cfg!(debug_assertions),
        }
    }
}

impl TreeBuilder {
    /// Use `surface` as the host surface.
    pub fn surface(mut self, surface: impl Surface) -> Self {
        self.surface = Some(Box::new(surface));
        self
    }

    /// Pre-allocate space for `capacity` widgets.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Receive errors returned by widget hooks. The default logs them.
    pub fn on_error(mut self, handler: impl FnMut(NodeId, &Error) + 'static) -> Self {
        self.on_error = Some(Box::new(handler));
        self
    }

    /// Enable or disable invariant assertions. On by default in debug builds.
    pub fn check_invariants(mut self, enabled: bool) -> Self {
        self.assert_invariants = enabled;
        self
    }

    /// Construct the tree.
    pub fn build(self) -> Tree {
        Tree {
            nodes: SlotMap::with_capacity_and_key(self.capacity),
            surface: self
                .surface
                .unwrap_or_else(|| Box::new(MemorySurface::new())),
            queue: MessageQueue::new(),
            owner_data: Vec::new(),
            on_error: self.on_error.unwrap_or_else(|| {
                Box::new(|node, err| error!(?node, %err, "widget hook failed"))
            }),
            assert_invariants: self.assert_invariants,
            depth: 0,
        }
    }
}

/// A forest of widgets, the host surface they render into, and the
/// deferred message queue.
///
/// All mutation happens on one thread through `&mut Tree`. Sends are
/// synchronous and re-entrant: a hook may mutate the tree, and its effects
/// complete before the triggering call returns.
pub struct Tree {
    /// Widget storage.
    pub(crate) nodes: SlotMap<NodeId, Node>,
    /// Host surface.
    surface: Box<dyn Surface>,
    /// Deferred messages.
    queue: MessageQueue,
    /// Collaborators holding per-widget bookkeeping.
    owner_data: Vec<Box<dyn OwnerData>>,
    /// Receives hook errors.
    on_error: ErrorHandler,
    /// Assert invariants after outermost operations.
    assert_invariants: bool,
    /// Number of hooks currently on the stack.
    depth: usize,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("nodes", &self.nodes.len())
            .field("pending", &self.queue.len())
            .field("depth", &self.depth)
            .finish()
    }
}

impl Tree {
    /// A tree over a fresh [`MemorySurface`].
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start configuring a tree.
    pub fn builder() -> TreeBuilder {
        TreeBuilder::default()
    }

    // ------------------------------------------------------------------
    // Creation and queries
    // ------------------------------------------------------------------

    /// Add a widget to the arena. It starts with no parent, no children,
    /// no flags, and a detached surface node.
    pub fn create<W>(&mut self, widget: W) -> NodeId
    where
        W: Widget + 'static,
    {
        self.create_rc(Rc::new(widget))
    }

    /// Add a shared widget to the arena.
    pub fn create_rc(&mut self, widget: Rc<dyn Widget>) -> NodeId {
        let name = widget.name();
        let surface = self.surface.create_node(&name);
        let id = self.nodes.insert(Node {
            widget,
            name,
            parent: None,
            children: Vec::new(),
            flags: WidgetFlags::empty(),
            hidden: false,
            surface,
            geometry: GeometryCache::default(),
        });
        trace!(node = ?id, name = %self.nodes[id].name, "create");
        id
    }

    /// Number of widgets in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Is the arena empty?
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node data for a widget.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// The shared widget behind a node.
    pub fn widget(&self, id: NodeId) -> Option<Rc<dyn Widget>> {
        self.nodes.get(id).map(|n| Rc::clone(&n.widget))
    }

    /// Borrow a node's widget as its concrete type.
    pub fn widget_ref<W: Widget>(&self, id: NodeId) -> Option<&W> {
        let widget: &dyn Widget = self.nodes.get(id)?.widget.as_ref();
        (widget as &dyn Any).downcast_ref::<W>()
    }

    /// Lifecycle flags of a widget.
    pub fn flags(&self, id: NodeId) -> Option<WidgetFlags> {
        self.nodes.get(id).map(|n| n.flags)
    }

    /// Is the widget attached to the live surface?
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.flags.is_attached())
    }

    /// Is the widget visible?
    pub fn is_visible(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.flags.is_visible())
    }

    /// Is the widget explicitly hidden?
    pub fn is_hidden(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.hidden)
    }

    /// Has the widget been disposed? Ids that no longer name a widget count
    /// as disposed.
    pub fn is_disposed(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_none_or(|n| n.flags.is_disposed())
    }

    /// The widget's parent.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    /// The widget's children, in order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Number of children.
    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).len()
    }

    /// The child at `index`, if in range.
    pub fn child_at(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).get(index).copied()
    }

    /// The index of `child` under `parent`, if it is a child.
    pub fn child_index(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.children(parent).iter().position(|c| *c == child)
    }

    /// Is `node` equal to or a descendant of `ancestor`?
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// The widget's surface node.
    pub fn surface_node(&self, id: NodeId) -> Option<SurfaceNode> {
        self.nodes.get(id).map(|n| n.surface)
    }

    /// The host surface.
    pub fn surface(&self) -> &dyn Surface {
        self.surface.as_ref()
    }

    /// The host surface, mutably.
    pub fn surface_mut(&mut self) -> &mut dyn Surface {
        self.surface.as_mut()
    }

    /// The host surface as its concrete type.
    pub fn surface_as<S: Surface>(&self) -> Option<&S> {
        (self.surface.as_ref() as &dyn Any).downcast_ref::<S>()
    }

    /// The host surface as its concrete type, mutably.
    pub fn surface_as_mut<S: Surface>(&mut self) -> Option<&mut S> {
        (self.surface.as_mut() as &mut dyn Any).downcast_mut::<S>()
    }

    /// Register a collaborator whose per-widget data is released on dispose.
    pub fn register_owner_data(&mut self, data: impl OwnerData + 'static) {
        self.owner_data.push(Box::new(data));
    }

    /// Return the node if it exists and is not disposed.
    fn live_node(&self, id: NodeId) -> Result<&Node> {
        let node = self.nodes.get(id).ok_or(Error::NodeNotFound(id))?;
        if node.flags.is_disposed() {
            return Err(Error::Disposed(id));
        }
        Ok(node)
    }

    /// Mutable variant of [`live_node`](Self::live_node).
    fn live_node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        let node = self.nodes.get_mut(id).ok_or(Error::NodeNotFound(id))?;
        if node.flags.is_disposed() {
            return Err(Error::Disposed(id));
        }
        Ok(node)
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    /// Deliver a message synchronously. The message and everything it
    /// triggers has been fully processed when this returns.
    pub fn send_message(&mut self, id: NodeId, msg: &Message) -> Result<()> {
        self.live_node(id)?;
        self.dispatch(id, msg);
        self.settle();
        Ok(())
    }

    /// Queue a message for the next [`flush`](Self::flush). Returns `false`
    /// if the widget's compression policy dropped it.
    pub fn post_message(&mut self, id: NodeId, msg: Message) -> Result<bool> {
        let widget = Rc::clone(&self.live_node(id)?.widget);
        let compressed = widget.compress_message(&msg, &self.queue.pending_for(id));
        if compressed {
            trace!(node = ?id, kind = msg.kind(), "compressed");
            return Ok(false);
        }
        self.queue.push(id, msg);
        Ok(true)
    }

    /// Deliver every message posted before this call, in posting order.
    /// Messages posted while flushing wait for the next flush. Returns the
    /// number of messages delivered.
    pub fn flush(&mut self) -> usize {
        let mark = self.queue.mark();
        let mut delivered = 0;
        while let Some(posted) = self.queue.pop_before(mark) {
            if self.is_disposed(posted.target) {
                continue;
            }
            self.dispatch(posted.target, &posted.message);
            delivered += 1;
        }
        if delivered > 0 {
            debug!(delivered, "flush");
        }
        self.settle();
        delivered
    }

    /// Are any messages waiting for a flush?
    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Number of messages waiting for a flush.
    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    /// Post an update request.
    pub fn update(&mut self, id: NodeId) -> Result<bool> {
        self.post_message(id, Message::UpdateRequest)
    }

    /// Post a layout request.
    pub fn fit(&mut self, id: NodeId) -> Result<bool> {
        self.post_message(id, Message::LayoutRequest)
    }

    /// Send a close request immediately.
    pub fn close(&mut self, id: NodeId) -> Result<()> {
        self.send_message(id, &Message::CloseRequest)
    }

    /// The message state machine. Flags change only here and in disposal.
    ///
    /// Hide and detach transitions are applied after the hook and the
    /// forwarding, so both observe the old flags. Show and attach
    /// transitions are applied first.
    pub(crate) fn dispatch(&mut self, id: NodeId, msg: &Message) {
        let Some(widget) = self.widget(id) else {
            trace!(node = ?id, kind = msg.kind(), "dropped: no such node");
            return;
        };
        trace!(node = ?id, kind = msg.kind(), "dispatch");
        match msg {
            Message::Resize(m) => self.run_hook(id, |ctx| widget.on_resize(ctx, m)),
            Message::UpdateRequest => self.run_hook(id, |ctx| widget.on_update_request(ctx)),
            Message::LayoutRequest => self.run_hook(id, |ctx| widget.on_layout_request(ctx)),
            Message::CloseRequest => self.run_hook(id, |ctx| widget.on_close_request(ctx)),
            Message::ChildAdded(m) => self.run_hook(id, |ctx| widget.on_child_added(ctx, m)),
            Message::ChildRemoved(m) => {
                self.run_hook(id, |ctx| widget.on_child_removed(ctx, m));
            }
            Message::ChildMoved(m) => self.run_hook(id, |ctx| widget.on_child_moved(ctx, m)),
            Message::ChildShown(m) => self.run_hook(id, |ctx| widget.on_child_shown(ctx, m)),
            Message::ChildHidden(m) => self.run_hook(id, |ctx| widget.on_child_hidden(ctx, m)),
            Message::AfterShow => {
                self.update_flags(id, |f| f.insert(WidgetFlags::VISIBLE));
                self.run_hook(id, |ctx| widget.on_after_show(ctx));
                self.forward(id, msg, true);
            }
            Message::BeforeHide => {
                self.run_hook(id, |ctx| widget.on_before_hide(ctx));
                self.forward(id, msg, true);
                self.update_flags(id, |f| f.remove(WidgetFlags::VISIBLE));
            }
            Message::AfterAttach => {
                let eligible = self.show_eligible(id);
                self.update_flags(id, |f| {
                    if eligible {
                        f.insert(WidgetFlags::VISIBLE);
                    }
                    f.insert(WidgetFlags::ATTACHED);
                });
                self.run_hook(id, |ctx| widget.on_after_attach(ctx));
                self.forward(id, msg, false);
            }
            Message::BeforeDetach => {
                self.run_hook(id, |ctx| widget.on_before_detach(ctx));
                self.forward(id, msg, false);
                self.update_flags(id, |f| f.remove(WidgetFlags::VISIBLE));
                self.update_flags(id, |f| f.remove(WidgetFlags::ATTACHED));
            }
            Message::Custom(_) => self.run_hook(id, |ctx| widget.on_message(ctx, msg)),
        }
    }

    /// Run one hook with a context bound to `id`, routing its error to the
    /// error handler.
    fn run_hook(&mut self, id: NodeId, hook: impl FnOnce(&mut Context<'_>) -> Result<()>) {
        self.depth += 1;
        let result = {
            let mut ctx = Context::new(self, id);
            hook(&mut ctx)
        };
        self.depth -= 1;
        if let Err(err) = result {
            (self.on_error)(id, &err);
        }
    }

    /// Deliver `msg` to each child of `id`, in order. The child list is
    /// copied first; a child that has left `id` by the time its turn comes is
    /// skipped. Children added to `id` during the cascade are picked up
    /// afterwards unless they already reached the state `msg` moves them to.
    /// With `shown_only`, a child's hidden flag is read at the moment it
    /// would receive the message.
    pub(crate) fn forward(&mut self, id: NodeId, msg: &Message, shown_only: bool) {
        let children = self.children(id).to_vec();
        let mut seen: HashSet<NodeId> = children.iter().copied().collect();
        for child in children {
            let Some(node) = self.nodes.get(child) else {
                continue;
            };
            if node.parent != Some(id) || (shown_only && node.hidden) {
                continue;
            }
            self.dispatch(child, msg);
        }

        while let Some(child) = self
            .children(id)
            .iter()
            .copied()
            .find(|c| !seen.contains(c))
        {
            seen.insert(child);
            if (shown_only && self.is_hidden(child)) || self.already_applied(child, msg) {
                continue;
            }
            self.dispatch(child, msg);
        }
    }

    /// Is the widget already in the state a lifecycle message would put it
    /// in? Always false for other messages.
    fn already_applied(&self, id: NodeId, msg: &Message) -> bool {
        match msg {
            Message::AfterAttach => self.is_attached(id),
            Message::BeforeDetach => !self.is_attached(id),
            Message::AfterShow => self.is_visible(id),
            Message::BeforeHide => !self.is_visible(id),
            _ => false,
        }
    }

    /// Apply a flag change if the node still exists.
    fn update_flags(&mut self, id: NodeId, f: impl FnOnce(&mut WidgetFlags)) {
        if let Some(node) = self.nodes.get_mut(id) {
            f(&mut node.flags);
        }
    }

    /// Could the widget be visible once attached: not hidden, and either a
    /// root or under a visible parent.
    fn show_eligible(&self, id: NodeId) -> bool {
        !self.is_hidden(id) && self.parent(id).is_none_or(|p| self.is_visible(p))
    }

    /// End of an outermost public operation: check invariants if enabled.
    fn settle(&self) {
        if self.depth == 0
            && self.assert_invariants
            && let Err(err) = self.check_invariants()
        {
            panic!("{err}");
        }
    }

    // ------------------------------------------------------------------
    // Child mutation
    // ------------------------------------------------------------------

    /// Insert `child` under `parent` at `index`, clamped to the child count.
    ///
    /// The child first leaves its current parent, or is detached if it is an
    /// attached root.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<()> {
        self.live_node(parent)?;
        self.live_node(child)?;
        if parent == child {
            return Err(Error::SelfParenting(child));
        }
        if self.contains(child, parent) {
            return Err(Error::WouldCreateCycle { parent, child });
        }

        if let Some(old) = self.parent(child) {
            self.remove_child_inner(old, child);
        } else if self.is_attached(child) {
            self.detach_inner(child);
        }

        // Hooks run by the removal may have changed the picture.
        self.live_node(parent)?;
        if self.live_node(child)?.parent.is_some() {
            return Err(Error::Invalid(format!(
                "{child:?} was re-parented while leaving its previous parent"
            )));
        }

        let index = index.min(self.child_count(parent));
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.insert(index, child);
        trace!(?parent, ?child, index, "insert child");
        self.dispatch(parent, &Message::ChildAdded(ChildMessage::added(child, index)));
        self.settle();
        Ok(())
    }

    /// Append `child` as the last child of `parent`.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.insert_child(parent, usize::MAX, child)
    }

    /// Move the child at `from` to `to`. Returns `false` if either index is
    /// out of range. Nothing is sent when `from == to`.
    pub fn move_child(&mut self, parent: NodeId, from: usize, to: usize) -> Result<bool> {
        let count = self.live_node(parent)?.children.len();
        if from >= count || to >= count {
            return Ok(false);
        }
        if from == to {
            return Ok(true);
        }
        let children = &mut self.nodes[parent].children;
        let child = children.remove(from);
        children.insert(to, child);
        self.dispatch(parent, &Message::ChildMoved(ChildMessage::moved(child, from, to)));
        self.settle();
        Ok(true)
    }

    /// Remove the child at `index`. Returns `None` if out of range.
    pub fn remove_child_at(&mut self, parent: NodeId, index: usize) -> Result<Option<NodeId>> {
        self.live_node(parent)?;
        let removed = self.remove_child_at_inner(parent, index);
        self.settle();
        Ok(removed)
    }

    /// Remove `child` from `parent`. Returns its former index, or `None` if
    /// it was not a child.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<Option<usize>> {
        self.live_node(parent)?;
        let index = self.remove_child_inner(parent, child);
        self.settle();
        Ok(index)
    }

    /// Remove every child, last first.
    ///
    /// A hook that adds a child in response to a removal keeps this loop
    /// going for as long as it does so.
    pub fn clear_children(&mut self, parent: NodeId) -> Result<()> {
        self.live_node(parent)?;
        while let Some(last) = self.child_count(parent).checked_sub(1) {
            self.remove_child_at_inner(parent, last);
        }
        self.settle();
        Ok(())
    }

    /// Remove by value without liveness checks.
    fn remove_child_inner(&mut self, parent: NodeId, child: NodeId) -> Option<usize> {
        let index = self.child_index(parent, child)?;
        self.remove_child_at_inner(parent, index);
        Some(index)
    }

    /// Remove by index without liveness checks. The child's parent is
    /// cleared before child-removed is sent.
    fn remove_child_at_inner(&mut self, parent: NodeId, index: usize) -> Option<NodeId> {
        let children = &mut self.nodes.get_mut(parent)?.children;
        if index >= children.len() {
            return None;
        }
        let child = children.remove(index);
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = None;
        }
        trace!(?parent, ?child, index, "remove child");
        self.dispatch(
            parent,
            &Message::ChildRemoved(ChildMessage::removed(child, index)),
        );
        Some(child)
    }

    /// The surface node of the child following `index`, used as the
    /// insertion reference.
    fn next_sibling_surface(&self, parent: NodeId, index: Option<usize>) -> Option<SurfaceNode> {
        let next = self.child_at(parent, index? + 1)?;
        self.surface_node(next)
    }

    /// Default child-added handling.
    pub(crate) fn place_child_node(&mut self, parent: NodeId, msg: &ChildMessage) {
        let (Some(parent_node), Some(child_node)) =
            (self.surface_node(parent), self.surface_node(msg.child))
        else {
            return;
        };
        let reference = self.next_sibling_surface(parent, msg.current_index);
        self.surface.insert_before(parent_node, child_node, reference);
        if self.is_attached(parent) {
            self.dispatch(msg.child, &Message::AfterAttach);
        }
    }

    /// Default child-moved handling.
    pub(crate) fn reposition_child_node(&mut self, parent: NodeId, msg: &ChildMessage) {
        if self.is_attached(parent) {
            self.dispatch(msg.child, &Message::BeforeDetach);
        }
        if let (Some(parent_node), Some(child_node)) =
            (self.surface_node(parent), self.surface_node(msg.child))
        {
            let reference = self.next_sibling_surface(parent, msg.current_index);
            self.surface.insert_before(parent_node, child_node, reference);
        }
        if self.is_attached(parent) {
            self.dispatch(msg.child, &Message::AfterAttach);
        }
    }

    /// Default child-removed handling.
    pub(crate) fn unplace_child_node(&mut self, parent: NodeId, msg: &ChildMessage) {
        if self.is_attached(parent) {
            self.dispatch(msg.child, &Message::BeforeDetach);
        }
        if let (Some(parent_node), Some(child_node)) =
            (self.surface_node(parent), self.surface_node(msg.child))
        {
            self.surface.remove_child(parent_node, child_node);
        }
    }

    // ------------------------------------------------------------------
    // Attachment
    // ------------------------------------------------------------------

    /// Attach a root widget under `host`, which must be on the live surface.
    pub fn attach_widget(&mut self, id: NodeId, host: SurfaceNode) -> Result<()> {
        let node = self.live_node(id)?;
        if node.parent.is_some() {
            return Err(Error::NotRoot(id));
        }
        let surface_node = node.surface;
        if node.flags.is_attached() || self.surface.is_connected(surface_node) {
            return Err(Error::AlreadyAttached(id));
        }
        if !self.surface.is_connected(host) {
            return Err(Error::HostNotAttached(host));
        }
        debug!(node = ?id, ?host, "attach");
        self.surface.append_child(host, surface_node);
        self.dispatch(id, &Message::AfterAttach);
        self.settle();
        Ok(())
    }

    /// Detach an attached root widget from the surface.
    pub fn detach_widget(&mut self, id: NodeId) -> Result<()> {
        let node = self.live_node(id)?;
        if node.parent.is_some() {
            return Err(Error::NotRoot(id));
        }
        if !node.flags.is_attached() {
            return Err(Error::NotAttached(id));
        }
        debug!(node = ?id, "detach");
        self.detach_inner(id);
        self.settle();
        Ok(())
    }

    /// Send before-detach, then take the node off the surface.
    fn detach_inner(&mut self, id: NodeId) {
        self.dispatch(id, &Message::BeforeDetach);
        if let Some(node) = self.surface_node(id)
            && let Some(host) = self.surface.parent_of(node)
        {
            self.surface.remove_child(host, node);
        }
    }

    // ------------------------------------------------------------------
    // Visibility
    // ------------------------------------------------------------------

    /// Set the widget's hidden flag. Returns `true` if the value changed;
    /// writing the current value does nothing.
    pub fn set_hidden(&mut self, id: NodeId, hidden: bool) -> Result<bool> {
        let node = self.live_node_mut(id)?;
        if node.hidden == hidden {
            return Ok(false);
        }
        node.hidden = hidden;
        let surface_node = node.surface;

        let parent_shown = self.parent(id).is_none_or(|p| self.is_visible(p));
        if hidden {
            if self.is_attached(id) && parent_shown {
                self.dispatch(id, &Message::BeforeHide);
            }
            self.surface.set_hidden_marker(surface_node, true);
            if let Some(parent) = self.parent(id) {
                self.dispatch(parent, &Message::ChildHidden(ChildMessage::new(id)));
            }
        } else {
            self.surface.set_hidden_marker(surface_node, false);
            if self.is_attached(id) && parent_shown {
                self.dispatch(id, &Message::AfterShow);
            }
            if let Some(parent) = self.parent(id) {
                self.dispatch(parent, &Message::ChildShown(ChildMessage::new(id)));
            }
        }
        self.settle();
        Ok(true)
    }

    /// Hide a widget. Returns `true` if the hidden flag changed.
    pub fn hide(&mut self, id: NodeId) -> Result<bool> {
        self.set_hidden(id, true)
    }

    /// Show a widget. Returns `true` if the hidden flag changed.
    pub fn show(&mut self, id: NodeId) -> Result<bool> {
        self.set_hidden(id, false)
    }

    // ------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------

    /// Border and padding, read from the surface on first use and cached.
    pub fn box_sizing(&mut self, id: NodeId) -> Result<BoxSizing> {
        let node = self.live_node(id)?;
        if let Some(sizing) = node.geometry.box_sizing {
            return Ok(sizing);
        }
        let sizing = self.surface.box_sizing(node.surface);
        self.nodes[id].geometry.box_sizing = Some(sizing);
        Ok(sizing)
    }

    /// Forget the cached box sizing.
    pub fn clear_box_sizing(&mut self, id: NodeId) -> Result<()> {
        self.live_node_mut(id)?.geometry.box_sizing = None;
        Ok(())
    }

    /// Size limits, read from the surface on first use and cached.
    pub fn size_limits(&mut self, id: NodeId) -> Result<SizeLimits> {
        let node = self.live_node(id)?;
        if let Some(limits) = node.geometry.size_limits {
            return Ok(limits);
        }
        let limits = self.surface.size_limits(node.surface);
        self.nodes[id].geometry.size_limits = Some(limits);
        Ok(limits)
    }

    /// Forget the cached size limits.
    pub fn clear_size_limits(&mut self, id: NodeId) -> Result<()> {
        self.live_node_mut(id)?.geometry.size_limits = None;
        Ok(())
    }

    /// Write size limits as inline styles. Negative values clamp to zero; a
    /// `None` maximum is written as explicitly unconstrained. The cached
    /// limits are invalidated.
    pub fn set_size_limits(
        &mut self,
        id: NodeId,
        min_width: i64,
        min_height: i64,
        max_width: Option<i64>,
        max_height: Option<i64>,
    ) -> Result<()> {
        let node = self.live_node_mut(id)?;
        node.geometry.size_limits = None;
        let target = node.surface;
        let px = |v: i64| StyleValue::Px(v.max(0));
        let max = |v: Option<i64>| v.map_or(StyleValue::None, px);
        let s = &mut self.surface;
        s.set_style(target, StyleProperty::MinWidth, Some(px(min_width)));
        s.set_style(target, StyleProperty::MinHeight, Some(px(min_height)));
        s.set_style(target, StyleProperty::MaxWidth, Some(max(max_width)));
        s.set_style(target, StyleProperty::MaxHeight, Some(max(max_height)));
        Ok(())
    }

    /// The offset geometry last set with
    /// [`set_offset_geometry`](Self::set_offset_geometry).
    pub fn offset_geometry(&self, id: NodeId) -> Option<Rect> {
        self.nodes.get(id).and_then(|n| n.geometry.offset)
    }

    /// The widget's current geometry as reported by the surface.
    pub fn measure_offset(&self, id: NodeId) -> Result<Rect> {
        let node = self.live_node(id)?;
        Ok(self.surface.offset_rect(node.surface))
    }

    /// Position the widget absolutely. Only changed components are written.
    /// A size change sends one resize message; a pure move sends nothing.
    pub fn set_offset_geometry(
        &mut self,
        id: NodeId,
        left: i32,
        top: i32,
        width: u32,
        height: u32,
    ) -> Result<()> {
        let node = self.live_node_mut(id)?;
        let first = node.geometry.offset.is_none();
        let change = node
            .geometry
            .update_offset(Rect::new(left, top, width, height));
        let target = node.surface;

        let s = &mut self.surface;
        if first {
            s.set_style(target, StyleProperty::Position, Some(StyleValue::Absolute));
        }
        if change.top {
            s.set_style(target, StyleProperty::Top, Some(StyleValue::Px(top.into())));
        }
        if change.left {
            s.set_style(target, StyleProperty::Left, Some(StyleValue::Px(left.into())));
        }
        if change.width {
            s.set_style(target, StyleProperty::Width, Some(StyleValue::Px(width.into())));
        }
        if change.height {
            s.set_style(target, StyleProperty::Height, Some(StyleValue::Px(height.into())));
        }
        if change.resized() {
            self.dispatch(id, &Message::Resize(ResizeMessage::new(width, height)));
        }
        self.settle();
        Ok(())
    }

    /// Forget the offset geometry and remove the positioning styles. No
    /// resize is sent; whoever takes over the layout handles that.
    pub fn clear_offset_geometry(&mut self, id: NodeId) -> Result<()> {
        let node = self.live_node_mut(id)?;
        node.geometry.offset = None;
        let target = node.surface;
        for prop in [
            StyleProperty::Position,
            StyleProperty::Top,
            StyleProperty::Left,
            StyleProperty::Width,
            StyleProperty::Height,
        ] {
            self.surface.set_style(target, prop, None);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Disposal
    // ------------------------------------------------------------------

    /// Dispose a widget and its whole subtree. Disposing twice is a no-op.
    ///
    /// The widget leaves its parent (or is detached if it is an attached
    /// root), then its children are popped and disposed one at a time, last
    /// first. Each child's parent is cleared before it is disposed, so it
    /// does not try to remove itself again. Finally every collaborator
    /// releases what it holds for the widget and the id is retired.
    pub fn dispose(&mut self, id: NodeId) -> Result<()> {
        self.dispose_inner(id);
        self.settle();
        Ok(())
    }

    /// Recursive body of [`dispose`](Self::dispose).
    fn dispose_inner(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if node.flags.is_disposed() {
            return;
        }
        node.flags.insert(WidgetFlags::DISPOSED);
        let widget = Rc::clone(&node.widget);
        debug!(node = ?id, "dispose");
        self.run_hook(id, |ctx| widget.on_dispose(ctx));

        if let Some(parent) = self.parent(id) {
            self.remove_child_inner(parent, id);
        } else if self.is_attached(id) {
            self.detach_inner(id);
        }

        while let Some(child) = self.nodes.get_mut(id).and_then(|n| n.children.pop()) {
            if let Some(node) = self.nodes.get_mut(child) {
                node.parent = None;
            }
            self.dispose_inner(child);
        }

        self.queue.clear_owner(id);
        for data in &mut self.owner_data {
            data.clear_owner(id);
        }
        if let Some(node) = self.nodes.remove(id) {
            self.surface.release_node(node.surface);
        }
    }

    // ------------------------------------------------------------------
    // Invariants
    // ------------------------------------------------------------------

    /// Verify the structural and visibility invariants over the whole arena:
    /// parent and child links agree, no widget is its own ancestor, and each
    /// widget's visible flag matches its attachment, hidden flag and parent.
    pub fn check_invariants(&self) -> Result<()> {
        for (id, node) in &self.nodes {
            self.check_links(id, node)?;
            self.check_acyclic(id)?;
            self.check_visibility(id, node)?;
        }
        Ok(())
    }

    /// Parent and child links for one node.
    fn check_links(&self, id: NodeId, node: &Node) -> Result<()> {
        let mut seen = HashSet::with_capacity(node.children.len());
        for child in &node.children {
            if !seen.insert(*child) {
                return Err(Error::Internal(format!("duplicate child {child:?} under {id:?}")));
            }
            let parent = self.nodes.get(*child).map(|c| c.parent);
            if parent != Some(Some(id)) {
                return Err(Error::Internal(format!(
                    "child {child:?} of {id:?} has parent {parent:?}"
                )));
            }
        }
        if let Some(parent) = node.parent
            && !self.children(parent).contains(&id)
        {
            return Err(Error::Internal(format!(
                "{id:?} names {parent:?} as parent but is not its child"
            )));
        }
        Ok(())
    }

    /// No node reaches itself through its parent chain.
    fn check_acyclic(&self, id: NodeId) -> Result<()> {
        let mut current = self.parent(id);
        for _ in 0..self.nodes.len() {
            match current {
                None => return Ok(()),
                Some(p) if p == id => break,
                Some(p) => current = self.parent(p),
            }
        }
        Err(Error::Internal(format!("{id:?} is its own ancestor")))
    }

    /// The visible flag agrees with attachment, hidden state and parent.
    fn check_visibility(&self, id: NodeId, node: &Node) -> Result<()> {
        let expected = node.flags.is_attached()
            && !node.hidden
            && node.parent.is_none_or(|p| self.is_visible(p));
        if node.flags.is_visible() != expected {
            return Err(Error::Internal(format!(
                "{id:?} visible={} but expected {expected}",
                node.flags.is_visible()
            )));
        }
        if node.flags.is_disposed() {
            return Err(Error::Internal(format!("{id:?} disposed but still in the arena")));
        }
        Ok(())
    }
}
