//! Integration tests for attaching and detaching widgets.

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use pretty_assertions::assert_eq;
    use trellis::{
        Error, Message, NodeId, NodeName, Tree,
        error::Result,
        testing::{EventLog, Recorder},
    };

    /// p -> [a -> [a1], b]
    struct Fixture {
        tree: Tree,
        log: EventLog,
        p: NodeId,
        a: NodeId,
        a1: NodeId,
        b: NodeId,
    }

    impl Fixture {
        fn new() -> Result<Self> {
            let log = EventLog::new();
            let mut tree = Tree::new();
            let p = tree.create(Recorder::new("p", &log));
            let a = tree.create(Recorder::new("a", &log));
            let a1 = tree.create(Recorder::new("a1", &log));
            let b = tree.create(Recorder::new("b", &log));
            tree.add_child(p, a)?;
            tree.add_child(a, a1)?;
            tree.add_child(p, b)?;
            log.clear();
            Ok(Self {
                tree,
                log,
                p,
                a,
                a1,
                b,
            })
        }

        fn attach(&mut self) -> Result<()> {
            let host = self.tree.surface().root();
            self.tree.attach_widget(self.p, host)
        }
    }

    #[test]
    fn attach_then_detach_notifies_each_descendant_once() -> Result<()> {
        let mut f = Fixture::new()?;
        f.attach()?;
        assert_eq!(
            f.log.events(),
            vec![
                "p:after-attach",
                "a:after-attach",
                "a1:after-attach",
                "b:after-attach",
            ]
        );
        for id in [f.p, f.a, f.a1, f.b] {
            assert!(f.tree.is_attached(id));
            assert!(f.tree.is_visible(id));
        }
        // Attach hooks observe the new state.
        assert!(f.log.entries().iter().all(|e| e.attached && e.visible));

        f.log.clear();
        f.tree.detach_widget(f.p)?;
        assert_eq!(
            f.log.events(),
            vec![
                "p:before-detach",
                "a:before-detach",
                "a1:before-detach",
                "b:before-detach",
            ]
        );
        // Detach hooks observe the old state.
        assert!(f.log.entries().iter().all(|e| e.attached && e.visible));
        for id in [f.p, f.a, f.a1, f.b] {
            assert!(!f.tree.is_attached(id));
            assert!(!f.tree.is_visible(id));
        }
        let root_node = f.tree.surface_node(f.p).unwrap();
        assert_eq!(f.tree.surface().parent_of(root_node), None);
        Ok(())
    }

    #[test]
    fn attach_preconditions() -> Result<()> {
        let mut f = Fixture::new()?;
        let host = f.tree.surface().root();

        assert_eq!(f.tree.attach_widget(f.a, host), Err(Error::NotRoot(f.a)));

        let loose = f.tree.surface_mut().create_node(&NodeName::convert("loose"));
        assert_eq!(
            f.tree.attach_widget(f.p, loose),
            Err(Error::HostNotAttached(loose))
        );

        f.attach()?;
        assert_eq!(
            f.tree.attach_widget(f.p, host),
            Err(Error::AlreadyAttached(f.p))
        );
        Ok(())
    }

    #[test]
    fn node_already_on_surface_cannot_attach() -> Result<()> {
        let mut f = Fixture::new()?;
        let host = f.tree.surface().root();
        let node = f.tree.surface_node(f.p).unwrap();
        f.tree.surface_mut().append_child(host, node);
        assert_eq!(
            f.tree.attach_widget(f.p, host),
            Err(Error::AlreadyAttached(f.p))
        );
        assert!(!f.tree.is_attached(f.p));
        Ok(())
    }

    #[test]
    fn detach_preconditions() -> Result<()> {
        let mut f = Fixture::new()?;
        assert_eq!(f.tree.detach_widget(f.p), Err(Error::NotAttached(f.p)));
        f.attach()?;
        assert_eq!(f.tree.detach_widget(f.a), Err(Error::NotRoot(f.a)));
        assert!(f.log.events_of("before-detach").is_empty());
        Ok(())
    }

    #[test]
    fn inserting_into_attached_parent_attaches_subtree() -> Result<()> {
        let mut f = Fixture::new()?;
        f.attach()?;
        let c = f.tree.create(Recorder::new("c", &f.log));
        let c1 = f.tree.create(Recorder::new("c1", &f.log));
        f.tree.add_child(c, c1)?;
        f.log.clear();

        f.tree.insert_child(f.p, 0, c)?;
        assert_eq!(
            f.log.events(),
            vec!["p:child-added", "c:after-attach", "c1:after-attach"]
        );
        assert!(f.tree.is_visible(c1));

        let sn = |id| f.tree.surface_node(id).unwrap();
        assert_eq!(
            f.tree.surface().children_of(sn(f.p)),
            vec![sn(c), sn(f.a), sn(f.b)]
        );
        Ok(())
    }

    #[test]
    fn moving_attached_child_cycles_attachment() -> Result<()> {
        let mut f = Fixture::new()?;
        f.attach()?;
        f.log.clear();

        assert!(f.tree.move_child(f.p, 0, 1)?);
        assert_eq!(
            f.log.events(),
            vec![
                "p:child-moved",
                "a:before-detach",
                "a1:before-detach",
                "a:after-attach",
                "a1:after-attach",
            ]
        );
        assert!(f.tree.is_attached(f.a));
        assert!(f.tree.is_visible(f.a1));
        assert_eq!(f.tree.children(f.p), &[f.b, f.a]);
        Ok(())
    }

    #[test]
    fn removing_attached_child_detaches_it() -> Result<()> {
        let mut f = Fixture::new()?;
        f.attach()?;
        f.log.clear();

        f.tree.remove_child(f.p, f.a)?;
        assert_eq!(
            f.log.events(),
            vec!["p:child-removed", "a:before-detach", "a1:before-detach"]
        );
        assert!(!f.tree.is_attached(f.a));
        assert!(!f.tree.is_attached(f.a1));
        let node = f.tree.surface_node(f.a).unwrap();
        assert_eq!(f.tree.surface().parent_of(node), None);
        // The detached subtree keeps its own structure.
        assert_eq!(f.tree.children(f.a), &[f.a1]);
        Ok(())
    }

    #[test]
    fn inserting_attached_root_detaches_it_first() -> Result<()> {
        let mut f = Fixture::new()?;
        let log = f.log.clone();
        let r = f.tree.create(Recorder::new("r", &log));
        let host = f.tree.surface().root();
        f.tree.attach_widget(r, host)?;
        log.clear();

        f.tree.add_child(f.b, r)?;
        assert_eq!(log.events(), vec!["r:before-detach", "b:child-added"]);
        assert!(!f.tree.is_attached(r));
        let sn = |id| f.tree.surface_node(id).unwrap();
        assert_eq!(f.tree.surface().parent_of(sn(r)), Some(sn(f.b)));
        Ok(())
    }

    #[test]
    fn close_request_removes_or_detaches() -> Result<()> {
        let mut f = Fixture::new()?;
        f.attach()?;
        f.log.clear();

        f.tree.close(f.b)?;
        assert_eq!(
            f.log.events(),
            vec!["b:close-request", "p:child-removed", "b:before-detach"]
        );
        assert_eq!(f.tree.parent(f.b), None);
        assert!(!f.tree.is_disposed(f.b));

        f.log.clear();
        f.tree.close(f.p)?;
        assert_eq!(f.log.events_of("before-detach").len(), 3);
        assert!(!f.tree.is_attached(f.p));

        // A detached root has nowhere to go.
        f.log.clear();
        f.tree.close(f.p)?;
        assert_eq!(f.log.events(), vec!["p:close-request"]);
        Ok(())
    }

    #[test]
    fn widget_can_close_itself_from_a_hook() -> Result<()> {
        let mut f = Fixture::new()?;
        let log = f.log.clone();
        let c = f
            .tree
            .create(Recorder::new("c", &log).on("bye", |ctx, _| ctx.close()));
        f.tree.add_child(f.p, c)?;
        f.attach()?;
        log.clear();

        f.tree.send_message(c, &Message::custom("bye"))?;
        assert_eq!(
            log.events(),
            vec!["c:bye", "p:child-removed", "c:before-detach"]
        );
        assert_eq!(f.tree.children(f.p), &[f.a, f.b]);
        assert!(!f.tree.is_attached(c));
        Ok(())
    }

    #[test]
    fn sibling_added_during_detach_is_detached_too() -> Result<()> {
        let log = EventLog::new();
        let mut tree = Tree::new();
        let p = tree.create(Recorder::new("p", &log));
        let n = tree.create(Recorder::new("n", &log));
        let a = tree.create(Recorder::new("a", &log).on("before-detach", move |ctx, _| {
            ctx.tree_mut().add_child(p, n)
        }));
        tree.add_child(p, a)?;
        let host = tree.surface().root();
        tree.attach_widget(p, host)?;
        log.clear();

        tree.detach_widget(p)?;
        assert_eq!(
            log.events(),
            vec![
                "p:before-detach",
                "a:before-detach",
                "p:child-added",
                "n:after-attach",
                "n:before-detach",
            ]
        );
        assert_eq!(tree.children(p).to_vec(), vec![a, n]);
        for id in [p, a, n] {
            assert!(!tree.is_attached(id));
            assert!(!tree.is_visible(id));
        }
        assert_eq!(tree.check_invariants(), Ok(()));
        Ok(())
    }

    #[test]
    fn parent_detached_during_move_stays_detached() -> Result<()> {
        let log = EventLog::new();
        let mut tree = Tree::new();
        let p = tree.create(Recorder::new("p", &log));
        let fired = Rc::new(Cell::new(false));
        let once = Rc::clone(&fired);
        let a = tree.create(Recorder::new("a", &log).on("before-detach", move |ctx, _| {
            if once.replace(true) {
                return Ok(());
            }
            ctx.tree_mut().detach_widget(p)
        }));
        let b = tree.create(Recorder::new("b", &log));
        tree.add_child(p, a)?;
        tree.add_child(p, b)?;
        let host = tree.surface().root();
        tree.attach_widget(p, host)?;
        log.clear();

        assert!(tree.move_child(p, 0, 1)?);
        assert!(fired.get());
        assert_eq!(tree.children(p).to_vec(), vec![b, a]);
        assert_eq!(log.count("a", "after-attach"), 0);
        for id in [p, a, b] {
            assert!(!tree.is_attached(id));
        }
        assert_eq!(tree.check_invariants(), Ok(()));
        Ok(())
    }
}
