//! Mapping of simulated snapshots into the solver's task document model.
//!
//! The document is a tree of plain records: catalog sections followed by one
//! [`StructRecord`] per snapshot, then any caller-supplied trailing blocks
//! carried verbatim. Rendering the tree to text is left to the caller; every
//! record derives `Serialize`.

use crate::catalog::Catalog;
use crate::fixed::{FlowAmount, fixed64_to_f64};
use crate::id::{DeviceId, FlowTypeId};
use crate::snapshot::Snapshot;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Fixed two-decimal formatting used for every numeric attribute.
pub fn format_amount(amount: FlowAmount) -> String {
    format!("{:.2}", fixed64_to_f64(amount))
}

// ---------------------------------------------------------------------------
// Per-snapshot records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementRecord {
    pub id: u32,
    pub attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkRecord {
    pub id1: u32,
    pub id2: u32,
    pub attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructRecord {
    pub id: usize,
    pub start_time: i64,
    pub end_time: i64,
    pub time: i64,
    pub elements: Vec<ElementRecord>,
    pub links: Vec<LinkRecord>,
}

/// Number vertices 1.. in vertex order.
pub fn device_id_map(snapshot: &Snapshot) -> HashMap<DeviceId, u32> {
    snapshot
        .vertices()
        .iter()
        .zip(1u32..)
        .map(|(device, n)| (device.id(), n))
        .collect()
}

/// Map one snapshot. Edges whose endpoints are missing from `id_map` are
/// left out.
pub fn map_snapshot(snapshot: &Snapshot, id_map: &HashMap<DeviceId, u32>) -> StructRecord {
    let mut elements = Vec::with_capacity(snapshot.vertices().len());
    for (device, state) in snapshot.states() {
        let Some(&id) = id_map.get(&device.id()) else {
            continue;
        };
        let mut attributes = BTreeMap::new();
        for (flow, &amount) in &state.incoming {
            attributes.insert(format!("input_{}", flow.0), format_amount(amount));
        }
        for (flow, &amount) in &state.outgoing {
            attributes.insert(format!("output_{}", flow.0), format_amount(amount));
        }
        for process in &device.supported_processes {
            attributes.insert(format!("process_{}", process.0), String::new());
        }
        for (flow, &capacity) in &device.storage_capacities {
            attributes.insert(format!("storage_{}", flow.0), format_amount(capacity));
        }
        elements.push(ElementRecord { id, attributes });
    }

    let links = snapshot
        .edges()
        .iter()
        .filter_map(|edge| {
            let id1 = *id_map.get(&edge.a())?;
            let id2 = *id_map.get(&edge.b())?;
            let attributes = edge
                .transports
                .iter()
                .map(|t| (format!("transport_{}", t.0), String::new()))
                .collect();
            Some(LinkRecord { id1, id2, attributes })
        })
        .collect();

    let interval = snapshot.interval();
    StructRecord {
        id: snapshot.index(),
        start_time: interval.start(),
        end_time: interval.end(),
        time: interval.duration(),
        elements,
        links,
    }
}

// ---------------------------------------------------------------------------
// Catalog records
// ---------------------------------------------------------------------------

/// `(flow id, size)` entry of a process or transport definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowSizeRecord {
    pub id: u32,
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessRecord {
    pub id: u32,
    pub time: f64,
    pub input: Vec<FlowSizeRecord>,
    pub output: Vec<FlowSizeRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransportRecord {
    pub id: u32,
    pub time: f64,
    pub input: Vec<FlowSizeRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageRecord {
    pub id: u32,
    pub input: Vec<u32>,
}

/// The complete task handed to the external solver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskDocument {
    pub flows: Vec<u32>,
    pub processes: Vec<ProcessRecord>,
    pub transports: Vec<TransportRecord>,
    pub storages: Vec<StorageRecord>,
    pub structs: Vec<StructRecord>,
    /// Opaque payload appended after the structs, in order.
    pub trailing_blocks: Vec<String>,
}

fn sizes<'a>(
    entries: impl IntoIterator<Item = (&'a FlowTypeId, &'a FlowAmount)>,
) -> Vec<FlowSizeRecord> {
    entries
        .into_iter()
        .map(|(flow, &size)| FlowSizeRecord {
            id: flow.0,
            size: fixed64_to_f64(size),
        })
        .collect()
}

/// Build the task document from simulated snapshots and the catalog.
/// Each snapshot numbers its own vertices from 1.
pub fn build_task(snapshots: &[Snapshot], catalog: &Catalog, trailing_blocks: Vec<String>) -> TaskDocument {
    TaskDocument {
        flows: catalog.flows().map(|f| f.id.0).collect(),
        processes: catalog
            .processes()
            .map(|p| ProcessRecord {
                id: p.id.0,
                time: fixed64_to_f64(p.time_per_chunk),
                input: sizes(&p.inputs),
                output: sizes(&p.outputs),
            })
            .collect(),
        transports: catalog
            .transports()
            .map(|t| TransportRecord {
                id: t.id.0,
                time: fixed64_to_f64(t.time_per_chunk),
                input: sizes(&t.throughput),
            })
            .collect(),
        storages: catalog
            .storages()
            .map(|s| StorageRecord {
                id: s.id.0,
                input: s.flows.iter().map(|f| f.0).collect(),
            })
            .collect(),
        structs: snapshots
            .iter()
            .map(|s| map_snapshot(s, &device_id_map(s)))
            .collect(),
        trailing_blocks,
    }
}
