//! Advisory checks for catalogs and snapshot sequences.
//!
//! The engines never require these to pass: they guard every division and
//! skip every gap on their own. These checks exist so loaders and builders
//! can report data that would silently block production or transport.

use crate::catalog::Catalog;
use crate::fixed::Fixed64;
use crate::id::*;
use crate::snapshot::Snapshot;

// ---------------------------------------------------------------------------
// Catalog issues
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogIssue {
    /// A process whose time per chunk is zero or negative never runs.
    NonPositiveProcessTime(ProcessTypeId),
    /// A transport whose time per chunk is zero or negative never moves.
    NonPositiveTransportTime(TransportTypeId),
    /// A process input or output amount that is zero or negative.
    NonPositiveProcessAmount { process: ProcessTypeId, flow: FlowTypeId },
    /// A transport throughput that is zero or negative.
    NonPositiveThroughput { transport: TransportTypeId, flow: FlowTypeId },
    /// A storage type that admits no flow.
    EmptyStorage(StorageTypeId),
}

/// List every numeric or structural problem in `catalog`.
pub fn validate_catalog(catalog: &Catalog) -> Vec<CatalogIssue> {
    let mut issues = Vec::new();

    for process in catalog.processes() {
        if process.time_per_chunk <= Fixed64::ZERO {
            issues.push(CatalogIssue::NonPositiveProcessTime(process.id));
        }
        for (&flow, &amount) in process.inputs.iter().chain(process.outputs.iter()) {
            if amount <= Fixed64::ZERO {
                issues.push(CatalogIssue::NonPositiveProcessAmount {
                    process: process.id,
                    flow,
                });
            }
        }
    }

    for transport in catalog.transports() {
        if transport.time_per_chunk <= Fixed64::ZERO {
            issues.push(CatalogIssue::NonPositiveTransportTime(transport.id));
        }
        for (&flow, &rate) in &transport.throughput {
            if rate <= Fixed64::ZERO {
                issues.push(CatalogIssue::NonPositiveThroughput {
                    transport: transport.id,
                    flow,
                });
            }
        }
    }

    for storage in catalog.storages() {
        if storage.flows.is_empty() {
            issues.push(CatalogIssue::EmptyStorage(storage.id));
        }
    }

    issues
}

// ---------------------------------------------------------------------------
// Sequence issues
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceIssue {
    /// Snapshot at `position` starts before its predecessor.
    OutOfOrder { position: usize },
    /// Snapshots at `position - 1` and `position` share time.
    Overlapping { position: usize },
    /// An edge endpoint is not a vertex of its snapshot.
    DanglingEdge { position: usize, edge_index: usize },
    /// A vertex supports a process the catalog does not define.
    UnknownProcess { position: usize, device: DeviceId, process: ProcessTypeId },
    /// An edge supports a transport the catalog does not define.
    UnknownTransport { position: usize, edge_index: usize, transport: TransportTypeId },
}

/// Check ordering, overlap and catalog references of a snapshot sequence.
pub fn validate_sequence(snapshots: &[Snapshot], catalog: &Catalog) -> Vec<SequenceIssue> {
    let mut issues = Vec::new();

    for (position, pair) in snapshots.windows(2).enumerate() {
        let (prev, next) = (pair[0].interval(), pair[1].interval());
        let position = position + 1;
        if next.start() < prev.start() {
            issues.push(SequenceIssue::OutOfOrder { position });
        } else if prev.overlaps(&next) {
            issues.push(SequenceIssue::Overlapping { position });
        }
    }

    for (position, snapshot) in snapshots.iter().enumerate() {
        for device in snapshot.vertices() {
            for &process in &device.supported_processes {
                if catalog.process(process).is_none() {
                    issues.push(SequenceIssue::UnknownProcess {
                        position,
                        device: device.id(),
                        process,
                    });
                }
            }
        }
        for (edge_index, edge) in snapshot.edges().iter().enumerate() {
            if snapshot.state(edge.a()).is_none() || snapshot.state(edge.b()).is_none() {
                issues.push(SequenceIssue::DanglingEdge {
                    position,
                    edge_index,
                });
            }
            for &transport in &edge.transports {
                if catalog.transport(transport).is_none() {
                    issues.push(SequenceIssue::UnknownTransport {
                        position,
                        edge_index,
                        transport,
                    });
                }
            }
        }
    }

    issues
}
