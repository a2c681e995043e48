//! Data-driven catalog loading from JSON.
//!
//! Feature-gated behind `data-loader`. Deserializes [`CatalogData`] and
//! replays it into a [`CatalogBuilder`]. The same data structures are reused
//! by file-based loaders for other formats.

use crate::catalog::{Catalog, CatalogBuilder, CatalogError};
use crate::fixed::{Fixed64, FlowAmount, checked_f64_to_fixed64};
use crate::id::*;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("{owner} {id}: {field} is not a finite number")]
    NonFinite {
        owner: &'static str,
        id: u32,
        field: &'static str,
    },
}

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// Top-level catalog data structure.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct CatalogData {
    #[serde(default)]
    pub flows: Vec<FlowData>,
    #[serde(default)]
    pub processes: Vec<ProcessData>,
    #[serde(default)]
    pub transports: Vec<TransportData>,
    #[serde(default)]
    pub storages: Vec<StorageData>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FlowData {
    pub id: u32,
    #[serde(default)]
    pub name: Option<String>,
}

/// `(flow, amount)` entry of a process or transport.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FlowAmountData {
    pub flow: u32,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProcessData {
    pub id: u32,
    pub time_per_chunk: f64,
    #[serde(default)]
    pub inputs: Vec<FlowAmountData>,
    #[serde(default)]
    pub outputs: Vec<FlowAmountData>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TransportData {
    pub id: u32,
    pub time_per_chunk: f64,
    #[serde(default)]
    pub throughput: Vec<FlowAmountData>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StorageData {
    pub id: u32,
    #[serde(default)]
    pub flows: Vec<u32>,
}

// ---------------------------------------------------------------------------
// Loading functions
// ---------------------------------------------------------------------------

/// Load a catalog builder from a JSON string.
pub fn load_catalog_json(json: &str) -> Result<CatalogBuilder, DataLoadError> {
    let data: CatalogData = serde_json::from_str(json)?;
    build_catalog(&data)
}

/// Load a catalog builder from JSON bytes.
pub fn load_catalog_json_bytes(bytes: &[u8]) -> Result<CatalogBuilder, DataLoadError> {
    let data: CatalogData = serde_json::from_slice(bytes)?;
    build_catalog(&data)
}

/// Parse and build in one go.
pub fn load_catalog(json: &str) -> Result<Catalog, DataLoadError> {
    Ok(load_catalog_json(json)?.build()?)
}

fn finite(value: f64, owner: &'static str, id: u32, field: &'static str) -> Result<Fixed64, DataLoadError> {
    checked_f64_to_fixed64(value).ok_or(DataLoadError::NonFinite { owner, id, field })
}

fn amounts(
    entries: &[FlowAmountData],
    owner: &'static str,
    id: u32,
    field: &'static str,
) -> Result<Vec<(FlowTypeId, FlowAmount)>, DataLoadError> {
    entries
        .iter()
        .map(|e| Ok((FlowTypeId(e.flow), finite(e.amount, owner, id, field)?)))
        .collect()
}

/// Replay `data` into a fresh builder. Reference checks happen at
/// [`CatalogBuilder::build`]; NaN or infinite numbers are rejected here.
pub fn build_catalog(data: &CatalogData) -> Result<CatalogBuilder, DataLoadError> {
    let mut builder = CatalogBuilder::new();

    for flow in &data.flows {
        builder.register_flow(FlowTypeId(flow.id), flow.name.as_deref());
    }
    for process in &data.processes {
        builder.register_process(
            ProcessTypeId(process.id),
            finite(process.time_per_chunk, "process", process.id, "time_per_chunk")?,
            amounts(&process.inputs, "process", process.id, "inputs")?,
            amounts(&process.outputs, "process", process.id, "outputs")?,
        );
    }
    for transport in &data.transports {
        builder.register_transport(
            TransportTypeId(transport.id),
            finite(transport.time_per_chunk, "transport", transport.id, "time_per_chunk")?,
            amounts(&transport.throughput, "transport", transport.id, "throughput")?,
        );
    }
    for storage in &data.storages {
        builder.register_storage(
            StorageTypeId(storage.id),
            storage.flows.iter().copied().map(FlowTypeId),
        );
    }

    Ok(builder)
}

// ===========================================================================
// Tests
// ===========================================================================
