//! Integration tests for message dispatch and widget hooks.

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use pretty_assertions::assert_eq;
    use trellis::{
        ChildMessage, Context, Error, Message, NodeId, ResizeMessage, Tree, Widget,
        error::Result,
        testing::{EventLog, Recorder},
    };

    /// Records the resize messages it receives, then rebroadcasts.
    #[derive(Default)]
    struct Sizer {
        seen: RefCell<Vec<ResizeMessage>>,
    }

    impl Widget for Sizer {
        fn on_resize(&self, ctx: &mut Context<'_>, msg: &ResizeMessage) -> Result<()> {
            self.seen.borrow_mut().push(*msg);
            ctx.broadcast_to_children(&Message::Resize(ResizeMessage::UNKNOWN))
        }
    }

    /// Fails every attach.
    struct Failing;

    impl Widget for Failing {
        fn on_after_attach(&self, _ctx: &mut Context<'_>) -> Result<()> {
            Err(Error::Invalid("boom".into()))
        }
    }

    #[test]
    fn resize_rebroadcasts_unknown_size() -> Result<()> {
        let mut tree = Tree::new();
        let p = tree.create(Sizer::default());
        let c = tree.create(Sizer::default());
        let gc = tree.create(Sizer::default());
        tree.add_child(p, c)?;
        tree.add_child(c, gc)?;

        tree.send_message(p, &Message::Resize(ResizeMessage::new(10, 20)))?;
        let seen = |id: NodeId| {
            tree.widget_ref::<Sizer>(id)
                .map(|s| s.seen.borrow().clone())
                .unwrap_or_default()
        };
        assert_eq!(seen(p), vec![ResizeMessage::new(10, 20)]);
        assert_eq!(seen(c), vec![ResizeMessage::UNKNOWN]);
        assert_eq!(seen(gc), vec![ResizeMessage::UNKNOWN]);
        assert!(seen(gc)[0].is_unknown());
        Ok(())
    }

    #[test]
    fn update_request_resizes_children() -> Result<()> {
        let mut tree = Tree::new();
        let p = tree.create(Sizer::default());
        let c = tree.create(Sizer::default());
        tree.add_child(p, c)?;

        tree.send_message(p, &Message::UpdateRequest)?;
        let c_seen = tree.widget_ref::<Sizer>(c).map(|s| s.seen.borrow().len());
        let p_seen = tree.widget_ref::<Sizer>(p).map(|s| s.seen.borrow().len());
        assert_eq!((p_seen, c_seen), (Some(0), Some(1)));
        Ok(())
    }

    #[test]
    fn layout_request_and_custom_stay_local() -> Result<()> {
        let log = EventLog::new();
        let mut tree = Tree::new();
        let p = tree.create(Recorder::new("p", &log));
        let c = tree.create(Recorder::new("c", &log));
        tree.add_child(p, c)?;
        log.clear();

        tree.send_message(p, &Message::LayoutRequest)?;
        tree.send_message(p, &Message::custom("activate"))?;
        assert_eq!(log.events(), vec!["p:layout-request", "p:activate"]);
        Ok(())
    }

    #[test]
    fn child_notifications_do_not_cascade() -> Result<()> {
        let log = EventLog::new();
        let mut tree = Tree::new();
        let p = tree.create(Recorder::new("p", &log));
        let c = tree.create(Recorder::new("c", &log));
        let gc = tree.create(Recorder::new("gc", &log));
        tree.add_child(p, c)?;
        tree.add_child(c, gc)?;
        log.clear();

        tree.send_message(p, &Message::ChildShown(ChildMessage::new(c)))?;
        assert_eq!(log.events(), vec!["p:child-shown"]);
        Ok(())
    }

    #[test]
    fn hook_errors_go_to_handler_and_dispatch_continues() -> Result<()> {
        let errors: Rc<RefCell<Vec<(NodeId, Error)>>> = Rc::default();
        let sink = Rc::clone(&errors);
        let mut tree = Tree::builder()
            .on_error(move |id, err| sink.borrow_mut().push((id, err.clone())))
            .build();

        let log = EventLog::new();
        let f = tree.create(Failing);
        let c = tree.create(Recorder::new("c", &log));
        tree.add_child(f, c)?;

        let host = tree.surface().root();
        tree.attach_widget(f, host)?;

        assert_eq!(
            errors.borrow().as_slice(),
            &[(f, Error::Invalid("boom".into()))]
        );
        assert!(tree.is_attached(f) && tree.is_visible(f));
        assert_eq!(log.events(), vec!["c:after-attach"]);
        Ok(())
    }

    #[test]
    fn default_error_handler_logs_and_continues() -> Result<()> {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let log = EventLog::new();
        let mut tree = Tree::new();
        let f = tree.create(Failing);
        let c = tree.create(Recorder::new("c", &log));
        tree.add_child(f, c)?;
        let host = tree.surface().root();
        tree.attach_widget(f, host)?;
        assert!(tree.is_visible(c));
        assert_eq!(log.count("c", "after-attach"), 1);
        Ok(())
    }

    #[test]
    fn sends_to_missing_widgets_fail() -> Result<()> {
        let mut tree = Tree::new();
        let w = tree.create(Sizer::default());
        tree.dispose(w)?;
        assert_eq!(
            tree.send_message(w, &Message::UpdateRequest),
            Err(Error::NodeNotFound(w))
        );
        Ok(())
    }

    #[test]
    fn reentrant_send_completes_before_return() -> Result<()> {
        let log = EventLog::new();
        let mut tree = Tree::new();
        let target = tree.create(Recorder::new("target", &log));
        let sender = tree.create(Recorder::new("sender", &log).on("go", move |ctx, _| {
            ctx.send(target, &Message::custom("ping"))
        }));

        tree.send_message(sender, &Message::custom("go"))?;
        tree.send_message(sender, &Message::custom("done"))?;
        assert_eq!(
            log.events(),
            vec!["sender:go", "target:ping", "sender:done"]
        );
        Ok(())
    }

    #[test]
    fn widgets_downcast_and_name() {
        let log = EventLog::new();
        let mut tree = Tree::new();
        let w = tree.create(Recorder::new("Side Panel", &log));
        assert_eq!(tree.widget_ref::<Recorder>(w).map(Recorder::label), Some("Side Panel"));
        assert!(tree.widget_ref::<Sizer>(w).is_none());
        assert_eq!(tree.node(w).map(|n| n.name().to_string()), Some("side_panel".into()));
    }

    #[test]
    fn child_removed_mid_cascade_gets_no_stale_messages() -> Result<()> {
        let log = EventLog::new();
        let mut tree = Tree::new();
        let p = tree.create(Recorder::new("p", &log));
        let b = tree.create(Recorder::new("b", &log));
        let a = tree.create(Recorder::new("a", &log).on("resize", move |ctx, _| {
            ctx.tree_mut().remove_child(p, b).map(|_| ())
        }));
        tree.add_child(p, a)?;
        tree.add_child(p, b)?;
        log.clear();

        tree.send_message(p, &Message::Resize(ResizeMessage::new(4, 4)))?;
        assert_eq!(log.count("a", "resize"), 1);
        assert_eq!(log.count("b", "resize"), 0);
        assert_eq!(tree.parent(b), None);
        Ok(())
    }

    #[test]
    fn child_removed_mid_detach_is_detached_once() -> Result<()> {
        let log = EventLog::new();
        let mut tree = Tree::new();
        let p = tree.create(Recorder::new("p", &log));
        let b = tree.create(Recorder::new("b", &log));
        let a = tree.create(Recorder::new("a", &log).on("before-detach", move |ctx, _| {
            ctx.tree_mut().remove_child(p, b).map(|_| ())
        }));
        tree.add_child(p, a)?;
        tree.add_child(p, b)?;
        let host = tree.surface().root();
        tree.attach_widget(p, host)?;
        log.clear();

        tree.detach_widget(p)?;
        assert_eq!(log.count("b", "before-detach"), 1);
        assert_eq!(tree.children(p).to_vec(), vec![a]);
        assert!(!tree.is_attached(b) && !tree.is_visible(b));
        assert_eq!(tree.check_invariants(), Ok(()));
        Ok(())
    }
}
