//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::capability::Capability;
use crate::catalog::{Catalog, CatalogBuilder};
use crate::device::{DeviceDirectory, Edge, EdgeDirection};
use crate::fixed::{Fixed64, FlowAmount};
use crate::id::*;
use crate::interval::TimeInterval;
use crate::snapshot::Snapshot;

// ===========================================================================
// Fixed-point helper
// ===========================================================================

pub fn fixed(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

// ===========================================================================
// Flow and type ids of the reference model
// ===========================================================================

pub fn raw_data() -> FlowTypeId {
    FlowTypeId(1)
}
pub fn processed_data() -> FlowTypeId {
    FlowTypeId(2)
}

/// Ships processed data, 20 per chunk.
pub fn uplink() -> TransportTypeId {
    TransportTypeId(1)
}
/// Ships raw data, 20 per chunk.
pub fn downlink() -> TransportTypeId {
    TransportTypeId(2)
}

pub fn interval(start: i64, end: i64) -> TimeInterval {
    TimeInterval::new(start, end).expect("bad test interval")
}

/// Two flows, four raw-to-processed processes of decreasing cost, two
/// transports and one storage type holding both flows.
pub fn reference_catalog() -> Catalog {
    let mut b = CatalogBuilder::new();
    b.register_flow(raw_data(), Some("RawData"))
        .register_flow(processed_data(), Some("ProcessedData"));
    let times = [0.2, 0.04, 0.06666666666666667, 0.02];
    for (id, time) in (1u32..).zip(times) {
        b.register_process(
            ProcessTypeId(id),
            fixed(time),
            [(raw_data(), Fixed64::ONE)],
            [(processed_data(), Fixed64::ONE)],
        );
    }
    b.register_transport(uplink(), Fixed64::ONE, [(processed_data(), fixed(20.0))])
        .register_transport(downlink(), Fixed64::ONE, [(raw_data(), fixed(20.0))])
        .register_storage(StorageTypeId(1), [raw_data(), processed_data()]);
    b.build().expect("reference catalog must build")
}

/// A catalog with a single 1:1 process (`ProcessTypeId(1)`, time 1) and a
/// single transport (`TransportTypeId(1)`, time 1) moving `rate` of raw data.
pub fn unit_catalog(rate: f64) -> Catalog {
    let mut b = CatalogBuilder::new();
    b.register_flow(raw_data(), None)
        .register_flow(processed_data(), None)
        .register_process(
            ProcessTypeId(1),
            Fixed64::ONE,
            [(raw_data(), Fixed64::ONE)],
            [(processed_data(), Fixed64::ONE)],
        )
        .register_transport(TransportTypeId(1), Fixed64::ONE, [(raw_data(), fixed(rate))]);
    b.build().expect("unit catalog must build")
}

// ===========================================================================
// Directory and snapshot helpers
// ===========================================================================

/// Register `names` in a fresh directory, returning ids in the same order.
pub fn directory_with(names: &[&str]) -> (DeviceDirectory, Vec<DeviceId>) {
    let mut dir = DeviceDirectory::new();
    let ids = names
        .iter()
        .map(|name| dir.add(name).unwrap())
        .collect();
    (dir, ids)
}

pub fn right(a: DeviceId, b: DeviceId) -> Edge {
    Edge::new(a, b, EdgeDirection::Right)
}

pub fn left(a: DeviceId, b: DeviceId) -> Edge {
    Edge::new(a, b, EdgeDirection::Left)
}

pub fn undirected(a: DeviceId, b: DeviceId) -> Edge {
    Edge::new(a, b, EdgeDirection::Undirected)
}

/// A snapshot holding every device currently in `dir`.
pub fn snapshot_of(index: usize, iv: TimeInterval, dir: &DeviceDirectory, edges: Vec<Edge>) -> Snapshot {
    Snapshot::new(index, iv, dir.vertices(), edges)
}

/// Devices `a1, a2, b1, b2` over five snapshots with the windows
/// `[1e9, 1e9+3)`, `+3..+5`, `+5..+10`, `+10..+12` and `+12..+15`. The first
/// snapshot carries `a1 -> b1`; every later edge points from a `b` device
/// back to an `a` device.
pub fn relay_timeline() -> (DeviceDirectory, Vec<Snapshot>) {
    let (dir, ids) = directory_with(&["a1", "a2", "b1", "b2"]);
    let (a1, a2, b1, b2) = (ids[0], ids[1], ids[2], ids[3]);
    let base = 1_000_000_000;

    let windows = [
        (0, 3, vec![right(a1, b1)]),
        (3, 5, vec![left(a1, b1), left(a1, b2)]),
        (5, 10, vec![left(a1, b1), left(a1, b2), left(a2, b1)]),
        (10, 12, vec![left(a1, b2), left(a2, b1)]),
        (12, 15, vec![left(a2, b1)]),
    ];
    let snapshots = windows
        .into_iter()
        .enumerate()
        .map(|(i, (start, end, edges))| snapshot_of(i, interval(base + start, base + end), &dir, edges))
        .collect();
    (dir, snapshots)
}

// ===========================================================================
// Factory builders (benchmarks)
// ===========================================================================

/// A line of `length` compute nodes, each seeded with `seed` raw data and
/// forwarding processed data to the next over the uplink transport.
pub fn build_chain(length: usize, seed: f64) -> (DeviceDirectory, Snapshot) {
    let mut dir = DeviceDirectory::new();
    let mut ids = Vec::with_capacity(length);
    for i in 0..length {
        let id = dir.add(&format!("n{i}")).unwrap();
        dir.device_mut(id)
            .unwrap()
            .add_capability(Capability::Compute)
            .add_capability(Capability::Storage)
            .add_process(ProcessTypeId(1))
            .set_input_flow(raw_data(), fixed(seed))
            .set_storage_capacity(processed_data(), fixed(seed * 4.0));
        ids.push(id);
    }
    let edges = ids
        .windows(2)
        .map(|w| right(w[0], w[1]).with_transports([uplink()]))
        .collect();
    let snapshot = snapshot_of(0, interval(0, 10), &dir, edges);
    (dir, snapshot)
}

/// `count` snapshots of `width` devices each, with a rotating directed ring
/// so that reachability has to cross several snapshots.
pub fn build_ring_timeline(width: usize, count: usize) -> (DeviceDirectory, Vec<Snapshot>) {
    let names: Vec<String> = (0..width).map(|i| format!("d{i}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let (dir, ids) = directory_with(&refs);

    let snapshots = (0..count)
        .map(|s| {
            let edges = (0..width)
                .filter(|i| (i + s) % 3 != 0)
                .map(|i| right(ids[i], ids[(i + 1) % width]))
                .collect();
            let start = (s as i64) * 10;
            snapshot_of(s, interval(start, start + 10), &dir, edges)
        })
        .collect();
    (dir, snapshots)
}

/// Total of `flow` stored across every device of `snapshot`.
pub fn total_stored(snapshot: &Snapshot, flow: FlowTypeId) -> FlowAmount {
    snapshot
        .states()
        .fold(FlowAmount::ZERO, |acc, (_, state)| acc.saturating_add(state.stored(flow)))
}
