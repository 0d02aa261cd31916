//! Helpers for exercising the tree in tests: a [`Recorder`] widget that records
//! every hook it receives into a shared [`EventLog`], and can be told to run
//! extra code when a particular message kind arrives.

use std::{cell::RefCell, fmt, rc::Rc};

use crate::{
    context::Context,
    error::Result,
    message::{ChildMessage, Message, ResizeMessage},
    name::NodeName,
    widget::Widget,
};

/// One recorded hook invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Label of the recorder that received the message.
    pub widget: String,
    /// Message kind, as returned by [`Message::kind`].
    pub kind: String,
    /// The attached flag when the hook ran.
    pub attached: bool,
    /// The visible flag when the hook ran.
    pub visible: bool,
    /// Index fields for child messages.
    pub indices: Option<(Option<usize>, Option<usize>)>,
}

/// A log shared between recorders.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Rc<RefCell<Vec<Entry>>>);

impl EventLog {
    /// Construct an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    fn push(&self, entry: Entry) {
        self.0.borrow_mut().push(entry);
    }

    /// A copy of every entry so far.
    pub fn entries(&self) -> Vec<Entry> {
        self.0.borrow().clone()
    }

    /// `label:kind` for every entry, in order.
    pub fn events(&self) -> Vec<String> {
        self.0
            .borrow()
            .iter()
            .map(|e| format!("{}:{}", e.widget, e.kind))
            .collect()
    }

    /// `label:kind` for entries of the given kind.
    pub fn events_of(&self, kind: &str) -> Vec<String> {
        self.0
            .borrow()
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| format!("{}:{}", e.widget, e.kind))
            .collect()
    }

    /// Entries received by one recorder.
    pub fn for_widget(&self, label: &str) -> Vec<Entry> {
        self.0
            .borrow()
            .iter()
            .filter(|e| e.widget == label)
            .cloned()
            .collect()
    }

    /// Number of entries of `kind` received by `label`.
    pub fn count(&self, label: &str, kind: &str) -> usize {
        self.0
            .borrow()
            .iter()
            .filter(|e| e.widget == label && e.kind == kind)
            .count()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Is the log empty?
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

/// Extra behaviour run after a recorder logs a message.
type Reaction = Box<dyn Fn(&mut Context<'_>, &Message) -> Result<()>>;

/// A widget that records each hook call, then does whatever the default
/// hook would have done.
pub struct Recorder {
    /// Label written into log entries; also the widget name.
    label: String,
    /// Shared log.
    log: EventLog,
    /// Extra behaviour keyed by message kind.
    reactions: RefCell<Vec<(String, Reaction)>>,
}

impl fmt::Debug for Recorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recorder").field("label", &self.label).finish()
    }
}

impl Recorder {
    /// A recorder writing to `log`.
    pub fn new(label: &str, log: &EventLog) -> Self {
        Self {
            label: label.to_string(),
            log: log.clone(),
            reactions: RefCell::new(Vec::new()),
        }
    }

    /// Run `f` whenever a message of `kind` arrives, after it is recorded
    /// and before the default behaviour.
    pub fn on(
        self,
        kind: &str,
        f: impl Fn(&mut Context<'_>, &Message) -> Result<()> + 'static,
    ) -> Self {
        self.reactions.borrow_mut().push((kind.to_string(), Box::new(f)));
        self
    }

    /// The recorder's label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Record `msg` and run any reactions registered for its kind.
    fn observe(&self, ctx: &mut Context<'_>, msg: &Message) -> Result<()> {
        self.log.push(Entry {
            widget: self.label.clone(),
            kind: msg.kind().to_string(),
            attached: ctx.is_attached(),
            visible: ctx.is_visible(),
            indices: msg.child().map(|c| (c.previous_index, c.current_index)),
        });
        let reactions = self.reactions.borrow();
        for (kind, reaction) in reactions.iter() {
            if kind == msg.kind() {
                reaction(ctx, msg)?;
            }
        }
        Ok(())
    }
}

impl Widget for Recorder {
    fn name(&self) -> NodeName {
        NodeName::convert(&self.label)
    }

    fn on_resize(&self, ctx: &mut Context<'_>, msg: &ResizeMessage) -> Result<()> {
        self.observe(ctx, &Message::Resize(*msg))?;
        ctx.broadcast_to_children(&Message::Resize(ResizeMessage::UNKNOWN))
    }

    fn on_update_request(&self, ctx: &mut Context<'_>) -> Result<()> {
        self.observe(ctx, &Message::UpdateRequest)?;
        ctx.broadcast_to_children(&Message::Resize(ResizeMessage::UNKNOWN))
    }

    fn on_layout_request(&self, ctx: &mut Context<'_>) -> Result<()> {
        self.observe(ctx, &Message::LayoutRequest)
    }

    fn on_child_added(&self, ctx: &mut Context<'_>, msg: &ChildMessage) -> Result<()> {
        self.observe(ctx, &Message::ChildAdded(*msg))?;
        ctx.place_child(msg)
    }

    fn on_child_removed(&self, ctx: &mut Context<'_>, msg: &ChildMessage) -> Result<()> {
        self.observe(ctx, &Message::ChildRemoved(*msg))?;
        ctx.unplace_child(msg)
    }

    fn on_child_moved(&self, ctx: &mut Context<'_>, msg: &ChildMessage) -> Result<()> {
        self.observe(ctx, &Message::ChildMoved(*msg))?;
        ctx.reposition_child(msg)
    }

    fn on_after_show(&self, ctx: &mut Context<'_>) -> Result<()> {
        self.observe(ctx, &Message::AfterShow)
    }

    fn on_before_hide(&self, ctx: &mut Context<'_>) -> Result<()> {
        self.observe(ctx, &Message::BeforeHide)
    }

    fn on_after_attach(&self, ctx: &mut Context<'_>) -> Result<()> {
        self.observe(ctx, &Message::AfterAttach)
    }

    fn on_before_detach(&self, ctx: &mut Context<'_>) -> Result<()> {
        self.observe(ctx, &Message::BeforeDetach)
    }

    fn on_child_shown(&self, ctx: &mut Context<'_>, msg: &ChildMessage) -> Result<()> {
        self.observe(ctx, &Message::ChildShown(*msg))
    }

    fn on_child_hidden(&self, ctx: &mut Context<'_>, msg: &ChildMessage) -> Result<()> {
        self.observe(ctx, &Message::ChildHidden(*msg))
    }

    fn on_close_request(&self, ctx: &mut Context<'_>) -> Result<()> {
        self.observe(ctx, &Message::CloseRequest)?;
        ctx.close()
    }

    fn on_message(&self, ctx: &mut Context<'_>, msg: &Message) -> Result<()> {
        self.observe(ctx, msg)
    }

    fn on_dispose(&self, ctx: &mut Context<'_>) -> Result<()> {
        self.observe(ctx, &Message::custom("dispose"))
    }
}
