//! End-to-end scenarios over the public core API.

use chrononet_core::capability::{Capability, CapabilitySet};
use chrononet_core::catalog::CatalogBuilder;
use chrononet_core::export::build_task;
use chrononet_core::fixed::FlowAmount;
use chrononet_core::id::*;
use chrononet_core::reachability::{IntervalFilter, ReachabilityQuery, find_reachability};
use chrononet_core::simulation::{simulate, simulate_sequence};
use chrononet_core::test_utils::*;
use chrononet_core::validation::{validate_catalog, validate_sequence};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ===========================================================================
// Simulation
// ===========================================================================

#[test]
fn stock_bounds_executions() {
    init_logging();
    let catalog = unit_catalog(0.0);
    let (mut dir, ids) = directory_with(&["worker"]);
    dir.device_mut(ids[0])
        .unwrap()
        .add_process(ProcessTypeId(1))
        .set_input_flow(raw_data(), fixed(5.0));

    // Time would allow ten executions; stock allows five.
    let mut snap = snapshot_of(0, interval(0, 10), &dir, vec![]);
    let report = simulate(&mut snap, &catalog);

    assert_eq!(report.executions(ids[0], ProcessTypeId(1)), 5);
    let state = snap.state(ids[0]).unwrap();
    assert_eq!(state.stored(raw_data()), FlowAmount::ZERO);
    assert_eq!(state.stored(processed_data()), fixed(5.0));
    assert_eq!(state.incoming(raw_data()), fixed(5.0));
}

#[test]
fn capacity_clamps_production() {
    init_logging();
    let catalog = unit_catalog(0.0);
    let (mut dir, ids) = directory_with(&["worker"]);
    dir.device_mut(ids[0])
        .unwrap()
        .add_process(ProcessTypeId(1))
        .set_input_flow(raw_data(), fixed(15.0))
        .set_storage_capacity(processed_data(), fixed(10.0));

    let mut snap = snapshot_of(0, interval(0, 20), &dir, vec![]);
    let report = simulate(&mut snap, &catalog);

    assert_eq!(report.executions(ids[0], ProcessTypeId(1)), 15);
    assert_eq!(snap.state(ids[0]).unwrap().stored(processed_data()), fixed(10.0));
    assert_eq!(report.discarded(processed_data()), fixed(5.0));
}

#[test]
fn processes_run_in_ascending_id_order() {
    init_logging();
    let mut b = CatalogBuilder::new();
    b.register_flow(FlowTypeId(1), None)
        .register_flow(FlowTypeId(2), None)
        .register_flow(FlowTypeId(3), None)
        .register_process(
            ProcessTypeId(5),
            FlowAmount::ONE,
            [(FlowTypeId(1), FlowAmount::ONE)],
            [(FlowTypeId(3), FlowAmount::ONE)],
        )
        .register_process(
            ProcessTypeId(2),
            FlowAmount::ONE,
            [(FlowTypeId(1), FlowAmount::ONE)],
            [(FlowTypeId(2), FlowAmount::ONE)],
        );
    let catalog = b.build().unwrap();

    let (mut dir, ids) = directory_with(&["worker"]);
    dir.device_mut(ids[0])
        .unwrap()
        .add_process(ProcessTypeId(5))
        .add_process(ProcessTypeId(2))
        .set_input_flow(FlowTypeId(1), fixed(4.0));

    // Time allows three executions of each; process 2 goes first and takes
    // three of the four units.
    let mut snap = snapshot_of(0, interval(0, 3), &dir, vec![]);
    let report = simulate(&mut snap, &catalog);

    assert_eq!(report.productions[0].process, ProcessTypeId(2));
    assert_eq!(report.executions(ids[0], ProcessTypeId(2)), 3);
    assert_eq!(report.executions(ids[0], ProcessTypeId(5)), 1);
    let state = snap.state(ids[0]).unwrap();
    assert_eq!(state.stored(FlowTypeId(1)), FlowAmount::ZERO);
    assert_eq!(state.stored(FlowTypeId(2)), fixed(3.0));
    assert_eq!(state.stored(FlowTypeId(3)), fixed(1.0));
}

#[test]
fn reference_model_produces_and_ships() {
    init_logging();
    let catalog = reference_catalog();
    let (mut dir, ids) = directory_with(&["sat", "ground"]);
    let (sat, ground) = (ids[0], ids[1]);
    dir.device_mut(sat)
        .unwrap()
        .add_capability(Capability::Compute)
        .add_process(ProcessTypeId(1))
        .set_input_flow(raw_data(), fixed(10.0));

    let edges = vec![right(sat, ground).with_transports([uplink()])];
    let mut snap = snapshot_of(0, interval(0, 3), &dir, edges);
    let report = simulate(&mut snap, &catalog);

    // 3 / 0.2 = 15 by time, 10 by stock.
    assert_eq!(report.executions(sat, ProcessTypeId(1)), 10);
    assert_eq!(report.transferred(processed_data()), fixed(10.0));

    let sat_state = snap.state(sat).unwrap();
    assert_eq!(sat_state.stored(processed_data()), FlowAmount::ZERO);
    assert_eq!(sat_state.outgoing(processed_data()), fixed(10.0));
    let ground_state = snap.state(ground).unwrap();
    assert_eq!(ground_state.stored(processed_data()), fixed(10.0));
    assert_eq!(ground_state.incoming(processed_data()), fixed(10.0));
}

#[test]
fn undirected_edges_move_nothing() {
    let catalog = unit_catalog(100.0);
    let (mut dir, ids) = directory_with(&["a", "b"]);
    dir.device_mut(ids[0])
        .unwrap()
        .set_input_flow(raw_data(), fixed(40.0));

    let edges = vec![undirected(ids[0], ids[1]).with_transports([TransportTypeId(1)])];
    let mut snap = snapshot_of(0, interval(0, 5), &dir, edges);
    let report = simulate(&mut snap, &catalog);

    assert!(report.transfers.is_empty());
    assert_eq!(snap.state(ids[0]).unwrap().stored(raw_data()), fixed(40.0));
    assert_eq!(snap.state(ids[1]).unwrap().stored(raw_data()), FlowAmount::ZERO);
}

#[test]
fn transport_is_sequential_within_a_snapshot() {
    // a -> b then b -> c: stock arriving at b is forwarded in the same pass.
    let catalog = unit_catalog(100.0);
    let (mut dir, ids) = directory_with(&["a", "b", "c"]);
    dir.device_mut(ids[0])
        .unwrap()
        .set_input_flow(raw_data(), fixed(7.0));
    dir.device_mut(ids[1])
        .unwrap()
        .set_input_flow(raw_data(), FlowAmount::ZERO);

    let edges = vec![
        right(ids[0], ids[1]).with_transports([TransportTypeId(1)]),
        right(ids[1], ids[2]).with_transports([TransportTypeId(1)]),
    ];
    let mut snap = snapshot_of(0, interval(0, 1), &dir, edges);
    simulate(&mut snap, &catalog);

    assert_eq!(snap.state(ids[2]).unwrap().stored(raw_data()), fixed(7.0));
    assert_eq!(snap.state(ids[1]).unwrap().stored(raw_data()), FlowAmount::ZERO);
}

#[test]
fn sequence_reseeds_every_snapshot() {
    let catalog = unit_catalog(0.0);
    let (mut dir, ids) = directory_with(&["worker"]);
    dir.device_mut(ids[0])
        .unwrap()
        .add_process(ProcessTypeId(1))
        .set_input_flow(raw_data(), fixed(3.0));

    let mut snaps = vec![
        snapshot_of(0, interval(0, 10), &dir, vec![]),
        snapshot_of(1, interval(10, 20), &dir, vec![]),
    ];
    let reports = simulate_sequence(&mut snaps, &catalog);
    assert_eq!(reports.len(), 2);
    for snap in &snaps {
        assert_eq!(snap.state(ids[0]).unwrap().stored(processed_data()), fixed(3.0));
    }

    // Running again gives the same state.
    simulate_sequence(&mut snaps, &catalog);
    assert_eq!(snaps[1].state(ids[0]).unwrap().stored(processed_data()), fixed(3.0));
}

// ===========================================================================
// Reachability
// ===========================================================================

#[test]
fn direct_hop_is_reachable() {
    let (dir, ids) = directory_with(&["A", "B"]);
    let snaps = vec![snapshot_of(0, interval(0, 3), &dir, vec![right(ids[0], ids[1])])];

    let result = find_reachability(&snaps, &ReachabilityQuery::new("A", &["B"]), &dir);
    assert!(result.is_reachable);
    assert_eq!(result.paths.len(), 1);
    assert_eq!(result.paths[0].devices, vec![ids[0], ids[1]]);
    assert_eq!(result.paths[0].interval, interval(0, 3));
}

#[test]
fn relay_timeline_with_exact_filter() {
    init_logging();
    let (dir, snaps) = relay_timeline();
    let first = snaps[0].interval();
    let query = ReachabilityQuery::new("a1", &["b1"]).within(IntervalFilter::exact(first));

    let result = find_reachability(&snaps, &query, &dir);
    let a1 = dir.id_of("a1").unwrap();
    let b1 = dir.id_of("b1").unwrap();
    assert!(result.is_reachable);
    assert_eq!(result.paths.len(), 1);
    assert_eq!(result.paths[0].devices, vec![a1, b1]);
    assert_eq!(result.paths[0].interval, first);
}

#[test]
fn relay_timeline_later_window_blocks_a_side() {
    let (dir, snaps) = relay_timeline();
    // From the second snapshot on, every edge points toward the a side.
    let later = interval(1_000_000_003, 1_000_000_015);
    let query = ReachabilityQuery::new("a1", &["b1", "b2"]).within(IntervalFilter::overlapping(later));
    let result = find_reachability(&snaps, &query, &dir);
    assert!(!result.is_reachable);
    assert!(result.paths.is_empty());

    let query = ReachabilityQuery::new("b1", &["a1", "a2"]).within(IntervalFilter::overlapping(later));
    let result = find_reachability(&snaps, &query, &dir);
    assert!(result.is_reachable);
    assert_eq!(result.paths.len(), 2);
    let a2 = dir.id_of("a2").unwrap();
    assert_eq!(result.path_to(a2).unwrap().interval, interval(1_000_000_005, 1_000_000_010));

    // b2 only ever links to a1.
    let query = ReachabilityQuery::new("b2", &["a1", "a2"]).within(IntervalFilter::overlapping(later));
    let result = find_reachability(&snaps, &query, &dir);
    assert_eq!(result.paths.len(), 1);
    assert!(result.path_to(a2).is_none());
}

#[test]
fn flipping_an_edge_reverses_reachability() {
    let (dir, ids) = directory_with(&["A", "B"]);
    let mut snap = snapshot_of(0, interval(0, 3), &dir, vec![right(ids[0], ids[1])]);
    let forward = ReachabilityQuery::new("A", &["B"]);
    assert!(find_reachability(std::slice::from_ref(&snap), &forward, &dir).is_reachable);

    // Right -> Left
    snap.edges_mut()[0].cycle_direction();
    assert!(!find_reachability(std::slice::from_ref(&snap), &forward, &dir).is_reachable);
    let backward = ReachabilityQuery::new("B", &["A"]);
    assert!(find_reachability(std::slice::from_ref(&snap), &backward, &dir).is_reachable);
}

#[test]
fn hops_must_respect_time_order() {
    // B -> C exists only before A -> B.
    let (dir, ids) = directory_with(&["A", "B", "C"]);
    let snaps = vec![
        snapshot_of(0, interval(0, 5), &dir, vec![right(ids[1], ids[2])]),
        snapshot_of(1, interval(5, 10), &dir, vec![right(ids[0], ids[1])]),
    ];
    let result = find_reachability(&snaps, &ReachabilityQuery::new("A", &["C"]), &dir);
    assert!(!result.is_reachable);

    let result = find_reachability(&snaps, &ReachabilityQuery::new("A", &["B"]), &dir);
    assert_eq!(result.paths[0].interval, interval(5, 10));
}

#[test]
fn capability_gate_uses_snapshot_local_flags() {
    let (dir, ids) = directory_with(&["A", "B"]);
    let mut snap = snapshot_of(0, interval(0, 3), &dir, vec![right(ids[0], ids[1])]);
    let query = ReachabilityQuery::new("A", &["B"]).with_capabilities(true);

    let result = find_reachability(std::slice::from_ref(&snap), &query, &dir);
    assert!(!result.is_reachable);

    snap.set_local_capabilities(ids[0], CapabilitySet::of(&[Capability::Send]));
    snap.set_local_capabilities(ids[1], CapabilitySet::of(&[Capability::Receive]));
    let result = find_reachability(std::slice::from_ref(&snap), &query, &dir);
    assert!(result.is_reachable);
}

// ===========================================================================
// Export and validation
// ===========================================================================

#[test]
fn reference_task_document() {
    let catalog = reference_catalog();
    assert!(validate_catalog(&catalog).is_empty());

    let (dir, mut snaps) = relay_timeline();
    assert!(validate_sequence(&snaps, &catalog).is_empty());
    simulate_sequence(&mut snaps, &catalog);

    let doc = build_task(&snaps, &catalog, vec!["<selector/>".to_string()]);
    assert_eq!(doc.flows, vec![1, 2]);
    assert_eq!(doc.processes.len(), 4);
    assert_eq!(doc.transports.len(), 2);
    assert_eq!(doc.storages[0].input, vec![1, 2]);
    assert_eq!(doc.structs.len(), 5);
    assert_eq!(doc.structs[0].start_time, 1_000_000_000);
    assert_eq!(doc.structs[0].time, 3);
    assert_eq!(doc.structs[0].elements.len(), dir.len());
    assert_eq!(doc.structs[1].links.len(), 2);
    assert_eq!(doc.structs[2].time, 5);
    assert_eq!(doc.trailing_blocks, vec!["<selector/>".to_string()]);
}
