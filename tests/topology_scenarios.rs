#[cfg(test)]
mod topology_scenarios {
    use std::panic::{self, AssertUnwindSafe};

    use netlaunch::controller::ControllerRef;
    use netlaunch::emulation::{
        DryRunRuntime, EmulationRuntime, InteractiveSession, Journal, RunningNetwork, RuntimeCall, SessionError,
    };
    use netlaunch::launch::{self, LaunchError};
    use netlaunch::topology::{
        analyze, BuilderState, Link, SwitchVariant, TopologyBuilder, TopologyError, TopologyWarning,
    };

    struct CrashingSession;

    impl<R: EmulationRuntime> InteractiveSession<R> for CrashingSession {
        fn interact(&mut self, _network: &mut RunningNetwork<R>) -> Result<(), SessionError> {
            Err(SessionError::Aborted("simulated session failure".to_string()))
        }
    }

    struct PanickingSession;

    impl<R: EmulationRuntime> InteractiveSession<R> for PanickingSession {
        fn interact(&mut self, _network: &mut RunningNetwork<R>) -> Result<(), SessionError> {
            panic!("simulated session panic");
        }
    }

    /// Node count and name set match the unique add calls
    #[test]
    fn test_unique_nodes_are_all_kept() {
        let names = ["h1", "s1", "h2", "s2", "h3", "s3", "h10"];
        let mut builder = TopologyBuilder::new();
        for name in names {
            if name.starts_with('h') {
                builder.add_host(name, None).unwrap();
            } else {
                builder.add_switch(name, Some(SwitchVariant::Standard)).unwrap();
            }
        }

        let topo = builder.build();
        assert_eq!(topo.node_count(), names.len());
        assert_eq!(topo.node_names().collect::<Vec<_>>(), names.to_vec());
    }

    /// A duplicate name fails and leaves the node set unchanged
    #[test]
    fn test_duplicate_node_leaves_topology_unchanged() {
        let mut builder = TopologyBuilder::new();
        builder.add_host("h1", Some("10.0.0.1")).unwrap();
        builder.add_switch("s1", None).unwrap();

        let err = builder.add_host("h1", Some("10.0.0.9")).unwrap_err();
        assert_eq!(err, TopologyError::DuplicateNode { name: "h1".to_string() });

        let topo = builder.build();
        assert_eq!(topo.node_count(), 2);
        assert_eq!(topo.node("h1").unwrap().address().unwrap().to_string(), "10.0.0.1");
    }

    /// A handle from another builder is rejected without touching the links
    #[test]
    fn test_foreign_handle_is_unknown() {
        let mut other = TopologyBuilder::new();
        let foreign = other.add_switch("s1", None).unwrap();

        let mut builder = TopologyBuilder::new();
        let s1 = builder.add_switch("s1", None).unwrap();
        let h1 = builder.add_host("h1", None).unwrap();
        builder.add_link(h1, s1).unwrap();

        let err = builder.add_link(h1, foreign).unwrap_err();
        assert!(matches!(err, TopologyError::UnknownNode { .. }));
        let err = builder.add_link(foreign, s1).unwrap_err();
        assert!(matches!(err, TopologyError::UnknownNode { .. }));

        let topo = builder.build();
        assert_eq!(topo.links(), &[Link::new("h1", "s1")]);
    }

    /// links[i] is the i-th add_link pair, and parallel links are not merged
    #[test]
    fn test_link_order_and_parallel_links() {
        let mut builder = TopologyBuilder::new();
        let s1 = builder.add_switch("s1", None).unwrap();
        let s2 = builder.add_switch("s2", None).unwrap();
        let h1 = builder.add_host("h1", None).unwrap();

        let calls = [(s1, s2), (h1, s1), (s1, s2), (s2, h1)];
        for (i, (a, b)) in calls.iter().enumerate() {
            assert_eq!(builder.add_link(*a, *b).unwrap().index(), i);
        }

        let topo = builder.build();
        assert_eq!(
            topo.links(),
            &[
                Link::new("s1", "s2"),
                Link::new("h1", "s1"),
                Link::new("s1", "s2"),
                Link::new("s2", "h1"),
            ]
        );
        assert_eq!(topo.links_between("s1", "s2"), 2);
    }

    /// Repeated build calls return equal topologies
    #[test]
    fn test_build_is_idempotent() {
        let mut builder = TopologyBuilder::new();
        let s1 = builder.add_switch("s1", Some(SwitchVariant::Ovs)).unwrap();
        let h1 = builder.add_host("h1", Some("10.0.0.1/24")).unwrap();
        builder.add_link(h1, s1).unwrap();

        let first = builder.build();
        let second = builder.build();
        assert_eq!(first, second);
        assert_eq!(first.nodes(), second.nodes());
        assert_eq!(first.links(), second.links());
        assert_eq!(builder.state(), BuilderState::Frozen);
    }

    /// Scenario A: two switches, four hosts, a tree
    #[test]
    fn test_scenario_a_tree() {
        let mut builder = TopologyBuilder::new();
        let h: Vec<_> = (1..=4)
            .map(|i| builder.add_host(&format!("h{i}"), None).unwrap())
            .collect();
        let s1 = builder.add_switch("s1", None).unwrap();
        let s2 = builder.add_switch("s2", None).unwrap();

        builder.add_link(h[0], s1).unwrap();
        builder.add_link(h[1], s1).unwrap();
        builder.add_link(s1, s2).unwrap();
        builder.add_link(h[2], s2).unwrap();
        builder.add_link(h[3], s2).unwrap();

        let topo = builder.build();
        assert_eq!(topo.node_count(), 6);
        assert_eq!(topo.link_count(), 5);
        assert!(builder.warnings().is_empty());

        let report = analyze(&topo);
        assert!(!report.has_cycle);
        assert!(report.is_connected());
    }

    /// Scenario B: a switch triangle plus two duplicate links
    #[test]
    fn test_scenario_b_triangle_with_duplicates() {
        let mut builder = TopologyBuilder::new();
        let s1 = builder.add_switch("s1", None).unwrap();
        let s2 = builder.add_switch("s2", None).unwrap();
        let s3 = builder.add_switch("s3", None).unwrap();

        builder.add_link(s1, s2).unwrap();
        builder.add_link(s2, s3).unwrap();
        builder.add_link(s1, s3).unwrap();
        assert!(builder.warnings().is_empty());

        builder.add_link(s2, s1).unwrap();
        builder.add_link(s3, s1).unwrap();

        let topo = builder.build();
        assert_eq!(topo.switches().count(), 3);
        assert_eq!(topo.link_count(), 5);
        assert_eq!(
            builder.warnings(),
            &[
                TopologyWarning::ParallelLink { a: "s2".into(), b: "s1".into(), count: 2 },
                TopologyWarning::ParallelLink { a: "s3".into(), b: "s1".into(), count: 2 },
            ]
        );
    }

    /// Scenario C: a failing session still stops the network exactly once
    #[test]
    fn test_scenario_c_stop_after_session_error() {
        let journal = Journal::new();
        let runtime = DryRunRuntime::new().with_journal(journal.clone());
        let topo = netlaunch::topology::build_named("simple").unwrap();

        let err = launch::run(topo, ControllerRef::Local, runtime, &mut CrashingSession).unwrap_err();

        assert!(matches!(err, LaunchError::Session(SessionError::Aborted(_))));
        assert_eq!(journal.count(&RuntimeCall::Start), 1);
        assert_eq!(journal.count(&RuntimeCall::Stop), 1);
        assert_eq!(journal.calls().last(), Some(&RuntimeCall::Stop));
    }

    /// Scenario C under unwinding: the dropped network stops itself
    #[test]
    fn test_scenario_c_stop_after_session_panic() {
        let journal = Journal::new();
        let runtime = DryRunRuntime::new().with_journal(journal.clone());
        let topo = netlaunch::topology::build_named("complex").unwrap();

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            launch::run(topo, ControllerRef::remote("127.0.0.1", 6653), runtime, &mut PanickingSession)
        }));

        assert!(result.is_err());
        assert_eq!(journal.count(&RuntimeCall::Stop), 1);
    }

    /// Explicit start / interact / stop also releases exactly once
    #[test]
    fn test_explicit_stop_is_not_repeated_on_drop() {
        let journal = Journal::new();
        let runtime = DryRunRuntime::new().with_journal(journal.clone());
        let topo = netlaunch::topology::build_named("simple").unwrap();

        let mut network = launch::start(topo, ControllerRef::Local, runtime).unwrap();
        assert!(launch::interact(&mut network, &mut CrashingSession).is_err());
        launch::stop(network).unwrap();

        assert_eq!(journal.count(&RuntimeCall::Stop), 1);
    }

    /// Scenario D: a link to an unknown name fails and the builder stays usable
    #[test]
    fn test_scenario_d_unknown_name() {
        let mut builder = TopologyBuilder::new();
        builder.add_host("h1", None).unwrap();
        builder.add_switch("s1", None).unwrap();

        let err = builder.add_link_by_name("h1", "s9").unwrap_err();
        assert_eq!(err, TopologyError::UnknownNode { node: "'s9'".to_string() });
        assert_eq!(builder.state(), BuilderState::Building);

        builder.add_link_by_name("h1", "s1").unwrap();
        let topo = builder.build();
        assert_eq!(topo.links(), &[Link::new("h1", "s1")]);
    }
}
