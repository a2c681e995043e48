#![no_main]
use arbitrary::Arbitrary;
use chrononet_core::device::{Edge, EdgeDirection};
use chrononet_core::fixed::FlowAmount;
use chrononet_core::id::*;
use chrononet_core::reachability::{ReachabilityQuery, find_reachability};
use chrononet_core::simulation::simulate;
use chrononet_core::test_utils::*;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct FuzzDevice {
    seed: i16,
    capacity: Option<i16>,
    process: bool,
}

#[derive(Arbitrary, Debug)]
struct FuzzEdge {
    a: u8,
    b: u8,
    direction: u8,
}

/// A device set shared by a run of snapshots with arbitrary edges.
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    devices: Vec<FuzzDevice>,
    snapshots: Vec<(u8, Vec<FuzzEdge>)>,
    rate: i8,
}

fuzz_target!(|input: FuzzInput| {
    if input.devices.is_empty() {
        return;
    }
    let count = input.devices.len().min(32);
    let names: Vec<String> = (0..count).map(|i| format!("d{i}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let (mut dir, ids) = directory_with(&refs);

    for (planned, &id) in input.devices.iter().zip(&ids) {
        let Ok(device) = dir.device_mut(id) else {
            continue;
        };
        device.set_input_flow(raw_data(), fixed(planned.seed as f64));
        if let Some(cap) = planned.capacity {
            device.set_storage_capacity(processed_data(), fixed(cap as f64));
        }
        if planned.process {
            device.add_process(ProcessTypeId(1));
        }
    }

    let catalog = unit_catalog(input.rate as f64);
    let mut start = 0i64;
    let mut snapshots = Vec::new();
    for (index, (len, edges)) in input.snapshots.iter().take(16).enumerate() {
        let edges = edges
            .iter()
            .take(64)
            .map(|e| {
                let direction = match e.direction % 3 {
                    0 => EdgeDirection::Undirected,
                    1 => EdgeDirection::Left,
                    _ => EdgeDirection::Right,
                };
                Edge::new(ids[e.a as usize % count], ids[e.b as usize % count], direction)
                    .with_transports([TransportTypeId(1)])
            })
            .collect();
        let end = start + *len as i64;
        let mut snapshot = snapshot_of(index, interval(start, end), &dir, edges);
        simulate(&mut snapshot, &catalog);
        for (_, state) in snapshot.states() {
            assert!(state.stored.values().all(|v| *v >= FlowAmount::ZERO));
        }
        snapshots.push(snapshot);
        start = end;
    }

    let result = find_reachability(&snapshots, &ReachabilityQuery::new("d0", &refs), &dir);
    assert_eq!(result.is_reachable, !result.paths.is_empty());
});
