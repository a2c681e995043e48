use crate::fixed::{Fixed64, FlowAmount};
use crate::id::*;
use std::collections::{BTreeMap, BTreeSet};

/// A flow type definition.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FlowType {
    pub id: FlowTypeId,
    pub name: Option<String>,
}

/// A process type: consumes `inputs` and yields `outputs` once per execution.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProcessType {
    pub id: ProcessTypeId,
    /// Time units needed to run one execution.
    pub time_per_chunk: Fixed64,
    pub inputs: BTreeMap<FlowTypeId, FlowAmount>,
    pub outputs: BTreeMap<FlowTypeId, FlowAmount>,
}

/// A transport type: moves up to `throughput[flow]` per chunk.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TransportType {
    pub id: TransportTypeId,
    pub time_per_chunk: Fixed64,
    pub throughput: BTreeMap<FlowTypeId, FlowAmount>,
}

/// A storage type: the flow types it may hold.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StorageType {
    pub id: StorageTypeId,
    pub flows: BTreeSet<FlowTypeId>,
}

/// Builder for constructing an immutable Catalog.
/// Two-phase lifecycle: registration -> finalization.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    flows: Vec<FlowType>,
    processes: Vec<ProcessType>,
    transports: Vec<TransportType>,
    storages: Vec<StorageType>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_flow(&mut self, id: FlowTypeId, name: Option<&str>) -> &mut Self {
        self.flows.push(FlowType {
            id,
            name: name.map(str::to_string),
        });
        self
    }

    pub fn register_process(
        &mut self,
        id: ProcessTypeId,
        time_per_chunk: Fixed64,
        inputs: impl IntoIterator<Item = (FlowTypeId, FlowAmount)>,
        outputs: impl IntoIterator<Item = (FlowTypeId, FlowAmount)>,
    ) -> &mut Self {
        self.processes.push(ProcessType {
            id,
            time_per_chunk,
            inputs: inputs.into_iter().collect(),
            outputs: outputs.into_iter().collect(),
        });
        self
    }

    pub fn register_transport(
        &mut self,
        id: TransportTypeId,
        time_per_chunk: Fixed64,
        throughput: impl IntoIterator<Item = (FlowTypeId, FlowAmount)>,
    ) -> &mut Self {
        self.transports.push(TransportType {
            id,
            time_per_chunk,
            throughput: throughput.into_iter().collect(),
        });
        self
    }

    pub fn register_storage(
        &mut self,
        id: StorageTypeId,
        flows: impl IntoIterator<Item = FlowTypeId>,
    ) -> &mut Self {
        self.storages.push(StorageType {
            id,
            flows: flows.into_iter().collect(),
        });
        self
    }

    /// Finalize and build the immutable catalog.
    ///
    /// Rejects duplicate ids within a kind and flow references to flow types
    /// that were never registered. Numeric sanity is left to
    /// [`validate_catalog`](crate::validation::validate_catalog).
    pub fn build(self) -> Result<Catalog, CatalogError> {
        let mut flows = BTreeMap::new();
        for flow in self.flows {
            let id = flow.id;
            if flows.insert(id, flow).is_some() {
                return Err(CatalogError::DuplicateId {
                    kind: "flow",
                    id: id.0,
                });
            }
        }

        let check_flow = |flow: FlowTypeId, owner: &'static str, owner_id: u32| {
            if flows.contains_key(&flow) {
                Ok(())
            } else {
                Err(CatalogError::UnknownFlowRef {
                    flow,
                    owner,
                    owner_id,
                })
            }
        };

        let mut processes = BTreeMap::new();
        for process in self.processes {
            for &flow in process.inputs.keys().chain(process.outputs.keys()) {
                check_flow(flow, "process", process.id.0)?;
            }
            let id = process.id;
            if processes.insert(id, process).is_some() {
                return Err(CatalogError::DuplicateId {
                    kind: "process",
                    id: id.0,
                });
            }
        }

        let mut transports = BTreeMap::new();
        for transport in self.transports {
            for &flow in transport.throughput.keys() {
                check_flow(flow, "transport", transport.id.0)?;
            }
            let id = transport.id;
            if transports.insert(id, transport).is_some() {
                return Err(CatalogError::DuplicateId {
                    kind: "transport",
                    id: id.0,
                });
            }
        }

        let mut storages = BTreeMap::new();
        for storage in self.storages {
            for &flow in &storage.flows {
                check_flow(flow, "storage", storage.id.0)?;
            }
            let id = storage.id;
            if storages.insert(id, storage).is_some() {
                return Err(CatalogError::DuplicateId {
                    kind: "storage",
                    id: id.0,
                });
            }
        }

        Ok(Catalog {
            flows,
            processes,
            transports,
            storages,
        })
    }
}

/// Immutable catalog of flow, process, transport and storage types.
/// Frozen after build(). Thread-safe to share.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    flows: BTreeMap<FlowTypeId, FlowType>,
    processes: BTreeMap<ProcessTypeId, ProcessType>,
    transports: BTreeMap<TransportTypeId, TransportType>,
    storages: BTreeMap<StorageTypeId, StorageType>,
}

impl Catalog {
    pub fn flow(&self, id: FlowTypeId) -> Option<&FlowType> {
        self.flows.get(&id)
    }

    pub fn process(&self, id: ProcessTypeId) -> Option<&ProcessType> {
        self.processes.get(&id)
    }

    pub fn transport(&self, id: TransportTypeId) -> Option<&TransportType> {
        self.transports.get(&id)
    }

    pub fn storage(&self, id: StorageTypeId) -> Option<&StorageType> {
        self.storages.get(&id)
    }

    /// Iterate flows in ascending id order. Same for the other kinds.
    pub fn flows(&self) -> impl Iterator<Item = &FlowType> {
        self.flows.values()
    }

    pub fn processes(&self) -> impl Iterator<Item = &ProcessType> {
        self.processes.values()
    }

    pub fn transports(&self) -> impl Iterator<Item = &TransportType> {
        self.transports.values()
    }

    pub fn storages(&self) -> impl Iterator<Item = &StorageType> {
        self.storages.values()
    }

    pub fn flow_count(&self) -> usize {
        self.flows.len()
    }

    pub fn process_count(&self) -> usize {
        self.processes.len()
    }

    pub fn transport_count(&self) -> usize {
        self.transports.len()
    }

    pub fn storage_count(&self) -> usize {
        self.storages.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: u32 },
    #[error("{owner} {owner_id} references unknown flow type {flow:?}")]
    UnknownFlowRef {
        flow: FlowTypeId,
        owner: &'static str,
        owner_id: u32,
    },
}
