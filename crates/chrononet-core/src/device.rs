//! Structural network model: devices, edges and the device directory.

use crate::capability::{Capability, CapabilitySet};
use crate::fixed::FlowAmount;
use crate::id::{DeviceId, FlowTypeId, ProcessTypeId, TransportTypeId};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectoryError {
    #[error("duplicate device name: {0}")]
    DuplicateName(String),
    #[error("unknown device: {0:?}")]
    UnknownDevice(DeviceId),
}

// ---------------------------------------------------------------------------
// Device
// ---------------------------------------------------------------------------

/// A network device: what it is seeded with, what it can store, which
/// processes it can run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    id: DeviceId,
    name: String,
    pub capabilities: CapabilitySet,
    /// Initial stored amounts seeded at the start of every snapshot.
    pub input_flows: BTreeMap<FlowTypeId, FlowAmount>,
    pub output_flows: BTreeMap<FlowTypeId, FlowAmount>,
    pub storage_capacities: BTreeMap<FlowTypeId, FlowAmount>,
    /// Ordered ascending, which is also the order production evaluates them.
    pub supported_processes: BTreeSet<ProcessTypeId>,
}

impl Device {
    fn new(id: DeviceId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            capabilities: CapabilitySet::none(),
            input_flows: BTreeMap::new(),
            output_flows: BTreeMap::new(),
            storage_capacities: BTreeMap::new(),
            supported_processes: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> DeviceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.has(capability)
    }

    pub fn add_capability(&mut self, capability: Capability) -> &mut Self {
        self.capabilities.insert(capability);
        self
    }

    pub fn remove_capability(&mut self, capability: Capability) -> &mut Self {
        self.capabilities.remove(capability);
        self
    }

    pub fn set_input_flow(&mut self, flow: FlowTypeId, amount: FlowAmount) -> &mut Self {
        self.input_flows.insert(flow, amount);
        self
    }

    pub fn set_output_flow(&mut self, flow: FlowTypeId, amount: FlowAmount) -> &mut Self {
        self.output_flows.insert(flow, amount);
        self
    }

    pub fn set_storage_capacity(&mut self, flow: FlowTypeId, capacity: FlowAmount) -> &mut Self {
        self.storage_capacities.insert(flow, capacity);
        self
    }

    pub fn add_process(&mut self, process: ProcessTypeId) -> &mut Self {
        self.supported_processes.insert(process);
        self
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// ---------------------------------------------------------------------------
// Edge
// ---------------------------------------------------------------------------

/// Direction tag of an edge relative to its `(a, b)` endpoint pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeDirection {
    #[default]
    Undirected,
    /// `b -> a`.
    Left,
    /// `a -> b`.
    Right,
}

/// A link between two devices.
///
/// Identity is the unordered endpoint pair: `{A, B}` equals `{B, A}` whatever
/// the direction tags or transports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    a: DeviceId,
    b: DeviceId,
    direction: EdgeDirection,
    pub transports: BTreeSet<TransportTypeId>,
}

impl Edge {
    pub fn new(a: DeviceId, b: DeviceId, direction: EdgeDirection) -> Self {
        Self {
            a,
            b,
            direction,
            transports: BTreeSet::new(),
        }
    }

    /// Builder-style helper to attach supported transport types.
    pub fn with_transports(mut self, transports: impl IntoIterator<Item = TransportTypeId>) -> Self {
        self.transports.extend(transports);
        self
    }

    pub fn a(&self) -> DeviceId {
        self.a
    }

    pub fn b(&self) -> DeviceId {
        self.b
    }

    pub fn direction(&self) -> EdgeDirection {
        self.direction
    }

    pub fn set_direction(&mut self, direction: EdgeDirection) {
        self.direction = direction;
    }

    /// Rotate Undirected -> Right -> Left -> Undirected. Returns the new direction.
    pub fn cycle_direction(&mut self) -> EdgeDirection {
        self.direction = match self.direction {
            EdgeDirection::Undirected => EdgeDirection::Right,
            EdgeDirection::Right => EdgeDirection::Left,
            EdgeDirection::Left => EdgeDirection::Undirected,
        };
        self.direction
    }

    /// `(from, to)` for a directed edge; `None` when undirected.
    pub fn endpoints(&self) -> Option<(DeviceId, DeviceId)> {
        match self.direction {
            EdgeDirection::Right => Some((self.a, self.b)),
            EdgeDirection::Left => Some((self.b, self.a)),
            EdgeDirection::Undirected => None,
        }
    }

    pub fn source(&self) -> Option<DeviceId> {
        self.endpoints().map(|(from, _)| from)
    }

    pub fn target(&self) -> Option<DeviceId> {
        self.endpoints().map(|(_, to)| to)
    }

    pub fn touches(&self, device: DeviceId) -> bool {
        self.a == device || self.b == device
    }

    fn unordered_pair(&self) -> (DeviceId, DeviceId) {
        if self.a <= self.b {
            (self.a, self.b)
        } else {
            (self.b, self.a)
        }
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.unordered_pair() == other.unordered_pair()
    }
}

impl Eq for Edge {}

impl Hash for Edge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.unordered_pair().hash(state);
    }
}

// ---------------------------------------------------------------------------
// DeviceDirectory
// ---------------------------------------------------------------------------

/// Owns every device of a run, addressable by id or by unique name.
#[derive(Debug, Clone, Default)]
pub struct DeviceDirectory {
    devices: SlotMap<DeviceId, Device>,
    by_name: HashMap<String, DeviceId>,
}

impl DeviceDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new device with an empty profile.
    pub fn add(&mut self, name: &str) -> Result<DeviceId, DirectoryError> {
        if self.by_name.contains_key(name) {
            return Err(DirectoryError::DuplicateName(name.to_string()));
        }
        let id = self.devices.insert_with_key(|id| Device::new(id, name));
        self.by_name.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn get(&self, id: DeviceId) -> Option<&Device> {
        self.devices.get(id)
    }

    pub fn get_mut(&mut self, id: DeviceId) -> Option<&mut Device> {
        self.devices.get_mut(id)
    }

    /// Mutable access that reports unknown ids as an error.
    pub fn device_mut(&mut self, id: DeviceId) -> Result<&mut Device, DirectoryError> {
        self.devices
            .get_mut(id)
            .ok_or(DirectoryError::UnknownDevice(id))
    }

    pub fn id_of(&self, name: &str) -> Option<DeviceId> {
        self.by_name.get(name).copied()
    }

    pub fn by_name(&self, name: &str) -> Option<&Device> {
        self.id_of(name).and_then(|id| self.devices.get(id))
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Iterate devices in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    /// Cloned vertex list for building a snapshot.
    pub fn vertices(&self) -> Vec<Device> {
        self.devices.values().cloned().collect()
    }
}
