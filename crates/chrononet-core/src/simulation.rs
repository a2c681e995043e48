//! The flow simulation engine.
//!
//! [`simulate`] advances one snapshot's flow state through four ordered
//! phases:
//!
//! 1. **Initialization** -- clear every device's flow maps, then seed stored
//!    amounts from the device's input flows (also recorded as incoming).
//! 2. **Production** -- each device runs its supported processes in ascending
//!    id order, as many whole executions as time and stock allow.
//! 3. **Transport** -- each directed edge, in list order, moves stock from its
//!    source to its target. Moved stock is visible to later edges at once.
//! 4. **Storage clamp** -- stored amounts above a declared capacity are cut
//!    down to it; the excess is discarded.
//!
//! The engine is total: catalog gaps are skipped, non-positive denominators
//! block the operation, and arithmetic saturates.

use crate::catalog::{Catalog, ProcessType};
use crate::device::{Device, Edge};
use crate::fixed::{Fixed64, FlowAmount, guarded_ratio, ticks_to_fixed64};
use crate::id::{DeviceId, FlowTypeId, ProcessTypeId, TransportTypeId};
use crate::interval::TimeInterval;
use crate::snapshot::{DeviceFlowState, Snapshot};
use slotmap::SecondaryMap;

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// A process that ran at least once on a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductionRecord {
    pub device: DeviceId,
    pub process: ProcessTypeId,
    pub executions: u64,
}

/// One flow movement along an edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRecord {
    /// Position of the edge in the snapshot's edge list.
    pub edge_index: usize,
    pub from: DeviceId,
    pub to: DeviceId,
    pub transport: TransportTypeId,
    pub flow: FlowTypeId,
    pub amount: FlowAmount,
}

/// Stock thrown away by the storage clamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscardRecord {
    pub device: DeviceId,
    pub flow: FlowTypeId,
    pub amount: FlowAmount,
}

/// What happened during one [`simulate`] call. Purely informational.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationReport {
    pub snapshot_index: usize,
    pub interval: TimeInterval,
    pub productions: Vec<ProductionRecord>,
    pub transfers: Vec<TransferRecord>,
    pub discards: Vec<DiscardRecord>,
}

impl SimulationReport {
    fn new(snapshot: &Snapshot) -> Self {
        Self {
            snapshot_index: snapshot.index(),
            interval: snapshot.interval(),
            productions: Vec::new(),
            transfers: Vec::new(),
            discards: Vec::new(),
        }
    }

    /// Executions of `process` on `device`, zero if it never ran.
    pub fn executions(&self, device: DeviceId, process: ProcessTypeId) -> u64 {
        self.productions
            .iter()
            .filter(|p| p.device == device && p.process == process)
            .map(|p| p.executions)
            .sum()
    }

    /// Total amount of `flow` discarded across all devices.
    pub fn discarded(&self, flow: FlowTypeId) -> FlowAmount {
        self.discards
            .iter()
            .filter(|d| d.flow == flow)
            .fold(FlowAmount::ZERO, |acc, d| acc.saturating_add(d.amount))
    }

    /// Total amount of `flow` moved across all edges.
    pub fn transferred(&self, flow: FlowTypeId) -> FlowAmount {
        self.transfers
            .iter()
            .filter(|t| t.flow == flow)
            .fold(FlowAmount::ZERO, |acc, t| acc.saturating_add(t.amount))
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Run one snapshot's flow step in place.
///
/// The returned report may be ignored; the snapshot's flow state is the
/// result.
pub fn simulate(snapshot: &mut Snapshot, catalog: &Catalog) -> SimulationReport {
    let mut report = SimulationReport::new(snapshot);
    let duration = ticks_to_fixed64(snapshot.interval().duration());
    let (vertices, edges, states) = snapshot.split_mut();

    seed_initial_flows(vertices, states);
    run_production(duration, vertices, states, catalog, &mut report);
    run_transport(duration, edges, states, catalog, &mut report);
    clamp_storage(vertices, states, &mut report);

    log::debug!(
        "snapshot {} {}: {} productions, {} transfers, {} discards",
        report.snapshot_index,
        report.interval,
        report.productions.len(),
        report.transfers.len(),
        report.discards.len()
    );
    report
}

/// Simulate every snapshot in slice order.
pub fn simulate_sequence(snapshots: &mut [Snapshot], catalog: &Catalog) -> Vec<SimulationReport> {
    snapshots
        .iter_mut()
        .map(|snapshot| simulate(snapshot, catalog))
        .collect()
}

// ---------------------------------------------------------------------------
// Phase 1: initialization
// ---------------------------------------------------------------------------

fn seed_initial_flows(vertices: &[Device], states: &mut SecondaryMap<DeviceId, DeviceFlowState>) {
    for state in states.values_mut() {
        state.clear_flows();
    }

    for device in vertices {
        let Some(state) = states.get_mut(device.id()) else {
            continue;
        };
        for (&flow, &amount) in &device.input_flows {
            let seed = amount.max(FlowAmount::ZERO);
            state.stored.insert(flow, seed);
            state.add_incoming(flow, seed);
        }
    }
}

// ---------------------------------------------------------------------------
// Phase 2: production
// ---------------------------------------------------------------------------

/// Whole executions of `process` allowed by the time budget and the stock
/// in `state`.
///
/// A process without inputs is bounded by time only. A required flow that is
/// absent from storage, or a non-positive requirement, blocks the process.
pub fn max_executions(duration: Fixed64, process: &ProcessType, state: &DeviceFlowState) -> Fixed64 {
    let by_time = guarded_ratio(duration, process.time_per_chunk);

    let by_input = process
        .inputs
        .iter()
        .map(|(flow, &required)| match state.stored.get(flow) {
            Some(&available) => guarded_ratio(available, required),
            None => Fixed64::ZERO,
        })
        .min();

    let bound = match by_input {
        Some(by_input) => by_time.min(by_input),
        None => by_time,
    };
    let mut executions = bound.floor().max(Fixed64::ZERO);

    // Division rounding must never let consumption exceed stock.
    while executions > Fixed64::ZERO
        && process.inputs.iter().any(|(&flow, &required)| {
            required.saturating_mul(executions) > state.stored(flow)
        })
    {
        executions -= Fixed64::ONE;
    }
    executions
}

fn run_production(
    duration: Fixed64,
    vertices: &[Device],
    states: &mut SecondaryMap<DeviceId, DeviceFlowState>,
    catalog: &Catalog,
    report: &mut SimulationReport,
) {
    for device in vertices {
        let Some(state) = states.get_mut(device.id()) else {
            continue;
        };

        for &process_id in &device.supported_processes {
            let Some(process) = catalog.process(process_id) else {
                log::debug!(
                    "device {} supports process {:?} missing from catalog; skipped",
                    device.name(),
                    process_id
                );
                continue;
            };

            let executions = max_executions(duration, process, state);
            if executions <= Fixed64::ZERO {
                continue;
            }

            for (&flow, &amount) in &process.inputs {
                state.withdraw(flow, amount.saturating_mul(executions));
            }
            for (&flow, &amount) in &process.outputs {
                state.deposit(flow, amount.saturating_mul(executions).max(FlowAmount::ZERO));
            }

            let executions = executions.to_num::<u64>();
            log::trace!(
                "device {} ran process {:?} x{}",
                device.name(),
                process_id,
                executions
            );
            report.productions.push(ProductionRecord {
                device: device.id(),
                process: process_id,
                executions,
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Phase 3: transport
// ---------------------------------------------------------------------------

fn run_transport(
    duration: Fixed64,
    edges: &[Edge],
    states: &mut SecondaryMap<DeviceId, DeviceFlowState>,
    catalog: &Catalog,
    report: &mut SimulationReport,
) {
    for (edge_index, edge) in edges.iter().enumerate() {
        let Some((from, to)) = edge.endpoints() else {
            continue;
        };
        if !states.contains_key(from) || !states.contains_key(to) {
            log::debug!("edge {edge_index} references a device outside the snapshot; skipped");
            continue;
        }

        for &transport_id in &edge.transports {
            let Some(transport) = catalog.transport(transport_id) else {
                log::debug!(
                    "edge {edge_index} supports transport {transport_id:?} missing from catalog; skipped"
                );
                continue;
            };

            let by_time = guarded_ratio(duration, transport.time_per_chunk);

            for (&flow, &rate) in &transport.throughput {
                let moved = {
                    let Some(source) = states.get_mut(from) else {
                        continue;
                    };
                    let Some(&available) = source.stored.get(&flow) else {
                        continue;
                    };
                    let limit = by_time.saturating_mul(rate.max(FlowAmount::ZERO));
                    let moved = source.withdraw(flow, available.min(limit));
                    source.add_outgoing(flow, moved);
                    moved
                };

                if let Some(target) = states.get_mut(to) {
                    target.deposit(flow, moved);
                    target.add_incoming(flow, moved);
                }

                log::trace!("edge {edge_index} moved {moved} of {flow:?} via {transport_id:?}");
                report.transfers.push(TransferRecord {
                    edge_index,
                    from,
                    to,
                    transport: transport_id,
                    flow,
                    amount: moved,
                });
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Phase 4: storage clamp
// ---------------------------------------------------------------------------

fn clamp_storage(
    vertices: &[Device],
    states: &mut SecondaryMap<DeviceId, DeviceFlowState>,
    report: &mut SimulationReport,
) {
    for device in vertices {
        let Some(state) = states.get_mut(device.id()) else {
            continue;
        };
        for (&flow, &capacity) in &device.storage_capacities {
            let capacity = capacity.max(FlowAmount::ZERO);
            if let Some(held) = state.stored.get_mut(&flow)
                && *held > capacity
            {
                let excess = held.saturating_sub(capacity);
                *held = capacity;
                report.discards.push(DiscardRecord {
                    device: device.id(),
                    flow,
                    amount: excess,
                });
            }
        }
    }
}
