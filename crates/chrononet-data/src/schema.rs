//! Serde data file structs for network scenarios.
//!
//! A scenario names its devices once and then lists snapshots that refer to
//! them by name. The loader resolves names into
//! [`DeviceId`](chrononet_core::id::DeviceId)s. Catalog files reuse
//! [`CatalogData`](chrononet_core::data_loader::CatalogData) from core.

use chrononet_core::capability::Capability;
use chrononet_core::data_loader::FlowAmountData;
use chrononet_core::device::EdgeDirection;
use serde::Deserialize;

// ===========================================================================
// Devices
// ===========================================================================

/// A device definition shared by every snapshot of the scenario.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeviceData {
    pub name: String,
    #[serde(default)]
    pub capabilities: Vec<Capability>,
    /// Supported process type ids.
    #[serde(default)]
    pub processes: Vec<u32>,
    /// Stock seeded at the start of every snapshot.
    #[serde(default)]
    pub inputs: Vec<FlowAmountData>,
    #[serde(default)]
    pub outputs: Vec<FlowAmountData>,
    /// Per-flow storage capacity; flows not listed are unbounded.
    #[serde(default)]
    pub storage: Vec<FlowAmountData>,
}

// ===========================================================================
// Snapshots
// ===========================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EdgeData {
    pub a: String,
    pub b: String,
    #[serde(default)]
    pub direction: EdgeDirection,
    /// Supported transport type ids.
    #[serde(default)]
    pub transports: Vec<u32>,
}

/// Capabilities a device has within one snapshot only.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LocalCapabilityData {
    pub device: String,
    pub capabilities: Vec<Capability>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SnapshotData {
    pub start: i64,
    pub end: i64,
    /// Devices present; all scenario devices when absent.
    #[serde(default)]
    pub devices: Option<Vec<String>>,
    #[serde(default)]
    pub edges: Vec<EdgeData>,
    #[serde(default)]
    pub local_capabilities: Vec<LocalCapabilityData>,
}

// ===========================================================================
// Top level
// ===========================================================================

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ScenarioData {
    #[serde(default)]
    pub devices: Vec<DeviceData>,
    #[serde(default)]
    pub snapshots: Vec<SnapshotData>,
}
