#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::prelude::*;

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[derive(Clone, Debug, PartialEq)]
    struct CountView {
        count: Option<i32>,
    }

    fn count_view(vm: &dyn ViewModel) -> CountView {
        CountView {
            count: vm.field::<i32>("count"),
        }
    }

    fn counter() -> (Rc<ComponentClass<CountView>>, StateField<i32>) {
        let mut b = ComponentClass::builder("Counter");
        let count = b.state("count", 0i32).unwrap();
        b.render_with("CountView", count_view).unwrap();
        (b.build(), count)
    }

    #[test]
    fn test_state_write_is_visible_before_flush() {
        init_logs();
        let (class, count) = counter();
        let host = Host::new();
        let c = host.mount(&class, Props::new(), Children::Empty);

        count.update(&c, |n| n + 1);
        assert_eq!(count.get(&c), 1);
        assert!(c.is_shadowed("count"));
        assert_eq!(c.state().get_as::<i32>("count"), Some(0));
        assert_eq!(host.pending(), 1);

        host.flush();
        assert_eq!(count.get(&c), 1);
        assert_eq!(c.state().get_as::<i32>("count"), Some(1));
        assert!(!c.is_shadowed("count"));
        assert!(host.is_idle());
    }

    #[test]
    fn test_repeated_writes_accumulate_synchronously() {
        let (class, count) = counter();
        let host = Host::new();
        let c = host.mount(&class, Props::new(), Children::Empty);

        for _ in 0..3 {
            count.update(&c, |n| n + 1);
        }
        assert_eq!(count.get(&c), 3);

        assert_eq!(host.flush(), 1);
        assert_eq!(c.state().get_as::<i32>("count"), Some(3));
        assert_eq!(c.rendered(), Some(CountView { count: Some(3) }));
    }

    #[test]
    fn test_fresh_component_reflects_initializer() {
        let mut b = ComponentClass::<CountView>::builder("Counter");
        let count = b.state("count", 42i32).unwrap();
        let class = b.build();
        let host = Host::new();
        let c = host.mount(&class, Props::new(), Children::Empty);
        assert_eq!(count.get(&c), 42);
        assert!(!c.is_shadowed("count"));
    }

    #[test]
    fn test_explicit_initial_state_wins_over_initializer() {
        let mut b = ComponentClass::<CountView>::builder("Counter");
        b.initial_state(State::new().with("count", 5i32));
        let count = b.state("count", 0i32).unwrap();
        let class = b.build();
        let host = Host::new();

        let c = host.mount(&class, Props::new(), Children::Empty);
        assert_eq!(count.get(&c), 5);

        let d = host.mount_with_state(
            &class,
            Props::new(),
            Children::Empty,
            State::new().with("count", 9i32),
        );
        assert_eq!(count.get(&d), 9);
    }

    #[test]
    fn test_prop_default_and_supplied_value() {
        let mut b = ComponentClass::<()>::builder("Button");
        let label = b.prop("label", Some("OK".to_string())).unwrap();
        let width = b.prop::<f32>("width", None).unwrap();
        let class = b.build();
        assert!(class.default_props().contains("label"));
        assert!(!class.default_props().contains("width"));

        let host = Host::new();
        let plain = host.mount(&class, Props::new(), Children::Empty);
        assert_eq!(label.get(&plain).as_deref(), Some("OK"));
        assert_eq!(width.get(&plain), None);

        let custom = host.mount(
            &class,
            Props::new().with("label", "Cancel".to_string()),
            Children::Empty,
        );
        assert_eq!(label.get(&custom).as_deref(), Some("Cancel"));
    }

    #[test]
    fn test_prop_is_read_only_at_runtime() {
        let mut b = ComponentClass::<()>::builder("Button");
        b.prop("label", Some("OK".to_string())).unwrap();
        let class = b.build();
        let host = Host::new();
        let c = host.mount(&class, Props::new(), Children::Empty);

        let err = c.set("label", Value::new("nope".to_string())).unwrap_err();
        assert_eq!(
            err,
            ElevateError::ReadOnlyField {
                field: "label".into()
            }
        );
        assert_eq!(
            c.get("label").unwrap().and_then(|v| v.get::<String>()),
            Some("OK".to_string())
        );
    }

    #[test]
    fn test_receive_props_refills_defaults_and_fires_watchers() {
        let mut b = ComponentClass::<()>::builder("Badge");
        let text = b.prop("text", Some("new".to_string())).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        {
            let seen = seen.clone();
            b.watch_prop(&text, move |_, old, new| {
                seen.borrow_mut()
                    .push((old.cloned(), new.cloned()));
            });
        }
        let class = b.build();
        let host = Host::new();
        let c = host.mount(&class, Props::new(), Children::Empty);

        host.receive_props(
            &c,
            Props::new().with("text", "hot".to_string()),
            Children::Empty,
        );
        // props are applied on flush, not before
        assert_eq!(text.get(&c).as_deref(), Some("new"));
        host.flush();
        assert_eq!(text.get(&c).as_deref(), Some("hot"));

        // same value again: no change reported
        host.receive_props(
            &c,
            Props::new().with("text", "hot".to_string()),
            Children::Empty,
        );
        host.flush();

        // props replaced wholesale, default fills the gap
        host.receive_props(&c, Props::new(), Children::Empty);
        host.flush();
        assert_eq!(text.get(&c).as_deref(), Some("new"));

        assert_eq!(
            *seen.borrow(),
            vec![
                (Some("new".to_string()), Some("hot".to_string())),
                (Some("hot".to_string()), Some("new".to_string())),
            ]
        );
    }

    #[test]
    fn test_every_watcher_on_a_prop_fires() {
        let mut b = ComponentClass::<()>::builder("Badge");
        let text = b.prop("text", Some(1i32)).unwrap();
        let fired = Rc::new(RefCell::new(Vec::new()));
        for tag in ["first", "second"] {
            let fired = fired.clone();
            b.watch_prop(&text, move |_, _, _| fired.borrow_mut().push(tag));
        }
        let class = b.build();
        let host = Host::new();
        let c = host.mount(&class, Props::new(), Children::Empty);

        host.receive_props(&c, Props::new().with("text", 2i32), Children::Empty);
        host.flush();
        assert_eq!(*fired.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn test_before_update_sees_upcoming_value() {
        let observed = Rc::new(RefCell::new(Vec::new()));
        let mut b = ComponentClass::<CountView>::builder("Counter");
        let count = b.state("count", 0i32).unwrap();
        {
            let observed = observed.clone();
            let count = count.clone();
            b.on_before_update(move |c, _, next| {
                observed
                    .borrow_mut()
                    .push((count.get(c), next.get_as::<i32>("count")));
                UpdateGate::Proceed
            });
        }
        let class = b.build();
        let host = Host::new();
        let c = host.mount(&class, Props::new(), Children::Empty);

        // bypass the field: shadow is absent, container still says 0
        c.set_state(State::new().with("count", 7i32));
        assert_eq!(count.get(&c), 0);
        host.flush();

        assert_eq!(*observed.borrow(), vec![(7, Some(7))]);
        assert_eq!(count.get(&c), 7);
    }

    #[test]
    fn test_updater_function_resyncs_shadow() {
        let (class, count) = counter();
        let host = Host::new();
        let c = host.mount(&class, Props::new(), Children::Empty);

        count.set(&c, 10);
        c.update_state(|state, _| {
            let n = state.get_as::<i32>("count").unwrap_or_default();
            State::new().with("count", n * 2)
        });
        // the updater has not run yet; the shadow still holds the write
        assert_eq!(count.get(&c), 10);

        host.flush();
        assert_eq!(count.get(&c), 20);
        assert_eq!(c.rendered(), Some(CountView { count: Some(20) }));
    }

    #[test]
    fn test_gate_veto_commits_state_without_render() {
        let mut b = ComponentClass::<CountView>::builder("Frozen");
        let count = b.state("count", 0i32).unwrap();
        b.render_with("CountView", count_view).unwrap();
        b.on_before_update(|_, _, next| {
            if next.get_as::<i32>("count").unwrap_or_default() > 1 {
                UpdateGate::Skip
            } else {
                UpdateGate::Proceed
            }
        });
        let after = Rc::new(RefCell::new(0));
        {
            let after = after.clone();
            b.on_after_update(move |_, _, _| *after.borrow_mut() += 1);
        }
        let class = b.build();
        let host = Host::new();
        let c = host.mount(&class, Props::new(), Children::Empty);
        assert_eq!(c.render_count(), 1);

        count.set(&c, 1);
        host.flush();
        assert_eq!(c.render_count(), 2);
        assert_eq!(*after.borrow(), 1);

        count.set(&c, 2);
        host.flush();
        assert_eq!(c.render_count(), 2);
        assert_eq!(*after.borrow(), 1);
        assert_eq!(c.state().get_as::<i32>("count"), Some(2));
        assert_eq!(count.get(&c), 2);
        assert!(!c.is_shadowed("count"));
        assert_eq!(c.rendered(), Some(CountView { count: Some(1) }));
    }

    #[test]
    fn test_vetoed_cycle_leaves_no_shadows() {
        let mut b = ComponentClass::<()>::builder("Vetoed");
        let a = b.state("a", 0i32).unwrap();
        let other = b.state("other", 0i32).unwrap();
        b.on_before_update(|_, _, _| UpdateGate::Skip);
        let class = b.build();
        let host = Host::new();
        let c = host.mount(&class, Props::new(), Children::Empty);

        a.set(&c, 1);
        host.flush();
        assert!(host.is_idle());
        assert!(!c.is_shadowed("a"));
        assert!(!c.is_shadowed("other"));
        assert_eq!(a.get(&c), 1);
        assert_eq!(other.get(&c), 0);
    }

    #[test]
    fn test_veto_keeps_write_made_during_the_cycle() {
        let mut b = ComponentClass::<()>::builder("Vetoed");
        let n = b.state("n", 0i32).unwrap();
        {
            let n = n.clone();
            b.on_before_update(move |c, _, next| {
                if next.get_as::<i32>("n") == Some(1) {
                    n.set(c, 2);
                }
                UpdateGate::Skip
            });
        }
        let class = b.build();
        let host = Host::with_config(HostConfig::default().max_flush_passes(1));
        let c = host.mount(&class, Props::new(), Children::Empty);

        n.set(&c, 1);
        host.flush();
        // the write from the hook is still queued and must stay visible
        assert_eq!(host.pending(), 1);
        assert!(c.is_shadowed("n"));
        assert_eq!(n.get(&c), 2);
    }

    #[test]
    fn test_fields_compose_independently() {
        let mut b = ComponentClass::<()>::builder("Form");
        let name = b.state("name", String::new()).unwrap();
        let age = b.state("age", 0u32).unwrap();
        let class = b.build();
        assert_eq!(class.hooks().before_update.len(), 2);
        assert_eq!(class.hooks().after_update.len(), 2);

        let host = Host::new();
        let c = host.mount(&class, Props::new(), Children::Empty);
        name.set(&c, "Ada".to_string());
        age.set(&c, 36);
        host.flush();

        assert_eq!(name.get(&c), "Ada");
        assert_eq!(age.get(&c), 36);
        assert!(!c.is_shadowed("name"));
        assert!(!c.is_shadowed("age"));
    }

    #[test]
    fn test_write_from_after_update_is_kept_until_applied() {
        let mut b = ComponentClass::<()>::builder("Echo");
        let count = b.state("count", 0i32).unwrap();
        let echoed = b.state("echoed", 0i32).unwrap();
        {
            let count = count.clone();
            let echoed = echoed.clone();
            b.on_after_update(move |c, _, _| {
                let n = count.get(c);
                if echoed.get(c) != n {
                    echoed.set(c, n);
                }
            });
        }
        let class = b.build();
        let host = Host::new();
        let c = host.mount(&class, Props::new(), Children::Empty);

        count.set(&c, 3);
        // first pass commits count and queues echoed; the second commits it
        assert_eq!(host.flush(), 2);
        assert_eq!(echoed.get(&c), 3);
        assert_eq!(c.state().get_as::<i32>("echoed"), Some(3));
        assert!(host.is_idle());
    }

    #[test]
    fn test_write_from_before_receive_props_survives_the_batch() {
        let mut b = ComponentClass::<()>::builder("Mirror");
        let seen = b.state("seen", 0u32).unwrap();
        {
            let seen = seen.clone();
            b.on_before_receive_props(move |c, _| seen.update(c, |n| n + 1));
        }
        let class = b.build();
        let host = Host::new();
        let c = host.mount(&class, Props::new(), Children::Empty);

        host.receive_props(&c, Props::new(), Children::Empty);
        host.flush();
        assert_eq!(seen.get(&c), 1);
        assert_eq!(c.state().get_as::<u32>("seen"), Some(1));
    }

    #[test]
    fn test_flush_pass_limit() {
        let mut b = ComponentClass::<()>::builder("Runaway");
        let ticks = b.state("ticks", 0u64).unwrap();
        {
            let ticks = ticks.clone();
            b.on_after_update(move |c, _, _| ticks.update(c, |n| n + 1));
        }
        let class = b.build();
        let host = Host::with_config(HostConfig::default().max_flush_passes(3));
        let c = host.mount(&class, Props::new(), Children::Empty);

        ticks.set(&c, 1);
        assert_eq!(host.flush(), 3);
        assert_eq!(host.pending(), 1);
        assert_eq!(ticks.get(&c), 4);
    }

    #[test]
    fn test_unmounted_component_drops_updates() {
        let (class, count) = counter();
        let host = Host::new();
        let c = host.mount(&class, Props::new(), Children::Empty);
        count.set(&c, 1);
        assert!(host.unmount(&c));
        assert!(!c.is_mounted());
        assert_eq!(host.flush(), 0);
        assert_eq!(c.state().get_as::<i32>("count"), Some(0));
        assert!(!host.unmount(&c));
        assert!(host.is_empty());
    }

    #[test]
    fn test_children_accessors() {
        #[derive(Clone, Debug, PartialEq)]
        enum El {
            Tab(&'static str),
            Divider,
        }

        let mut b = ComponentClass::<El>::builder("Tabs");
        let first = b.child("first").unwrap();
        let first_tab = b
            .child_where("first_tab", |e| matches!(e, El::Tab(_)))
            .unwrap();
        let all = b.children("all").unwrap();
        let tabs = b
            .children_where("tabs", |e| matches!(e, El::Tab(_)))
            .unwrap();
        let class = b.build();

        let host = Host::new();
        let empty = host.mount(&class, Props::new(), Children::Empty);
        assert_eq!(first.get(&empty), None);
        assert!(all.get(&empty).is_empty());

        let scalar = host.mount(&class, Props::new(), Children::One(El::Tab("a")));
        assert_eq!(first.get(&scalar), Some(El::Tab("a")));
        assert_eq!(all.get(&scalar), vec![El::Tab("a")]);

        let kids = Children::nested(vec![
            Children::One(El::Divider),
            Children::many([El::Tab("a"), El::Divider, El::Tab("b")]),
        ]);
        let c = host.mount(&class, Props::new(), kids);
        assert_eq!(first.get(&c), Some(El::Divider));
        assert_eq!(first_tab.get(&c), Some(El::Tab("a")));
        assert_eq!(all.get(&c).len(), 4);
        assert_eq!(tabs.get(&c), vec![El::Tab("a"), El::Tab("b")]);

        // recomputed after the parent re-renders with other children
        host.receive_props(&c, Props::new(), Children::One(El::Tab("z")));
        host.flush();
        assert_eq!(first_tab.get(&c), Some(El::Tab("z")));
        assert_eq!(tabs.get(&c), vec![El::Tab("z")]);

        // no setter
        assert!(matches!(
            c.set("tabs", Value::new(Vec::<El>::new())),
            Err(ElevateError::ReadOnlyField { .. })
        ));
        let through_descriptor = c
            .get("tabs")
            .unwrap()
            .and_then(|v| v.get::<Vec<El>>());
        assert_eq!(through_descriptor, Some(vec![El::Tab("z")]));
    }

    #[test]
    fn test_single_child_reads_through_view_model() {
        let mut b = ComponentClass::<i32>::builder("Wrapper");
        b.child("first").unwrap();
        b.child_where("big", |n| *n > 100).unwrap();
        b.render_with("WrapperView", |vm| vm.field::<i32>("first").unwrap_or(-1))
            .unwrap();
        let class = b.build();
        let host = Host::new();

        let c = host.mount(&class, Props::new(), Children::One(7));
        assert_eq!(c.rendered(), Some(7));
        let first = c.get("first").unwrap().and_then(|v| v.get::<i32>());
        assert_eq!(first, Some(7));
        // unmatched reads as absent, not as a present empty value
        assert!(c.get("big").unwrap().is_none());

        let empty = host.mount(&class, Props::new(), Children::Empty);
        assert_eq!(empty.rendered(), Some(-1));
        assert!(empty.get("first").unwrap().is_none());
    }

    #[test]
    fn test_non_function_predicate_rejected_at_decoration() {
        let mut b = ComponentClass::<u8>::builder("Picker");
        let err = b.child_with("picked", Some(Value::new(3u8))).err();
        assert!(matches!(err, Some(ElevateError::InvalidArgument { .. })));
        let err = b.children_with("picked", Some(Value::new("x"))).err();
        assert!(matches!(err, Some(ElevateError::InvalidArgument { .. })));

        let odd: ChildPredicate<u8> = Rc::new(|n: &u8| n % 2 == 1);
        let picked = b.children_with("picked", Some(Value::new(odd))).unwrap();
        let any = b.child_with("any", None).unwrap();
        let class = b.build();

        let host = Host::new();
        let c = host.mount(&class, Props::new(), vec![2u8, 3, 5].into());
        assert_eq!(picked.get(&c), vec![3, 5]);
        assert_eq!(any.get(&c), Some(2));
    }

    #[test]
    fn test_field_name_validation() {
        let mut b = ComponentClass::<()>::builder("Bad");
        for name in ["", "9lives", "has space", "props", "render"] {
            assert!(
                matches!(b.state(name, 0), Err(ElevateError::InvalidArgument { .. })),
                "{name:?} should be rejected"
            );
        }
        b.state("value", 0).unwrap();
        assert!(matches!(
            b.prop::<i32>("value", None),
            Err(ElevateError::InvalidArgument { .. })
        ));
        // same kind: override
        assert!(b.state("value", 1).is_ok());
        let class = b.build();
        assert_eq!(class.fields().len(), 1);
        assert_eq!(class.default_state().get_as::<i32>("value"), Some(1));
    }

    #[test]
    fn test_static_render_with_plain_view_model() {
        let (class, _) = counter();
        let render = class.static_render("CountView").unwrap();
        let plain = FieldMap::new().with("count", 3i32);
        assert_eq!(render(&plain), CountView { count: Some(3) });
        assert_eq!(render(&plain), count_view(&plain));
        assert!(class.static_render("Missing").is_none());
    }

    #[test]
    fn test_render_reads_through_descriptors() {
        let (class, count) = counter();
        let host = Host::new();
        let c = host.mount(&class, Props::new(), Children::Empty);
        assert_eq!(c.rendered(), Some(CountView { count: Some(0) }));

        count.set(&c, 5);
        // rendering on demand sees the shadow; the host's output does not move
        assert_eq!(c.render(), Some(CountView { count: Some(5) }));
        assert_eq!(c.rendered(), Some(CountView { count: Some(0) }));
    }

    #[test]
    fn test_subclass_inherits_fields_and_hooks() {
        let (base, count) = counter();
        let mut b = ComponentClass::extend(&base, "LabeledCounter");
        let label = b.prop("label", Some("clicks".to_string())).unwrap();
        let sub = b.build();
        assert_eq!(sub.parent(), Some("Counter"));
        assert_eq!(sub.fields().len(), 2);
        assert_eq!(base.fields().len(), 1);

        let host = Host::new();
        let c = host.mount(&sub, Props::new(), Children::Empty);
        count.update(&c, |n| n + 1);
        host.flush();
        assert_eq!(count.get(&c), 1);
        assert!(!c.is_shadowed("count"));
        assert_eq!(label.get(&c).as_deref(), Some("clicks"));
        assert_eq!(c.rendered(), Some(CountView { count: Some(1) }));
    }

    #[test]
    fn test_subclass_overrides_state_initializer() {
        let (base, _) = counter();
        let mut b = ComponentClass::extend(&base, "TenCounter");
        let count = b.state("count", 10i32).unwrap();
        let sub = b.build();
        assert_eq!(sub.fields().len(), 1);
        assert_eq!(sub.hooks().before_update.len(), 1);
        assert_eq!(sub.default_state().get_as::<i32>("count"), Some(10));
        assert_eq!(base.default_state().get_as::<i32>("count"), Some(0));

        let host = Host::new();
        let c = host.mount(&sub, Props::new(), Children::Empty);
        assert_eq!(count.get(&c), 10);
        count.update(&c, |n| n + 1);
        host.flush();
        assert_eq!(c.rendered(), Some(CountView { count: Some(11) }));
        assert!(!c.is_shadowed("count"));

        let b0 = host.mount(&base, Props::new(), Children::Empty);
        assert_eq!(count.get(&b0), 0);
    }

    #[test]
    fn test_dynamic_access() {
        let (class, _) = counter();
        let host = Host::new();
        let c = host.mount(&class, Props::new(), Children::Empty);

        c.set("count", Value::new(4i32)).unwrap();
        let v = c.get("count").unwrap().and_then(|v| v.get::<i32>());
        assert_eq!(v, Some(4));
        assert!(matches!(
            c.get("nope"),
            Err(ElevateError::UnknownField { .. })
        ));

        // a mistyped dynamic write falls back to the initializer for typed reads
        let mut b = ComponentClass::<()>::builder("Typed");
        let n = b.state("n", 11i32).unwrap();
        let class = b.build();
        let t = host_mount(&class);
        t.set("n", Value::new("eleven")).unwrap();
        assert_eq!(n.get(&t), 11);
    }

    fn host_mount(class: &Rc<ComponentClass<()>>) -> Component<()> {
        Host::new().mount(class, Props::new(), Children::Empty)
    }

    #[test]
    fn test_value_identity() {
        let a = Value::new(1u8);
        let b = a.clone();
        let c = Value::new(1u8);
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
        assert!(a.is::<u8>());
        assert_eq!(format!("{a:?}"), "Value(<u8>)");
    }
}
