//! Time-sliced views of the network.
//!
//! A [`Snapshot`] pairs a [`TimeInterval`] with the vertex and edge lists valid
//! during it, plus one [`DeviceFlowState`] per vertex. The flow state is the
//! only part the engines mutate.

use crate::capability::CapabilitySet;
use crate::device::{Device, Edge};
use crate::fixed::FlowAmount;
use crate::id::{DeviceId, FlowTypeId};
use crate::interval::TimeInterval;
use slotmap::SecondaryMap;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Per-device flow state
// ---------------------------------------------------------------------------

/// Mutable per-device record for one snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceFlowState {
    pub stored: BTreeMap<FlowTypeId, FlowAmount>,
    /// Cumulative amounts received during this interval, seed included.
    pub incoming: BTreeMap<FlowTypeId, FlowAmount>,
    /// Cumulative amounts sent during this interval.
    pub outgoing: BTreeMap<FlowTypeId, FlowAmount>,
    pub local_capabilities: CapabilitySet,
}

impl DeviceFlowState {
    pub fn new(local_capabilities: CapabilitySet) -> Self {
        Self {
            local_capabilities,
            ..Self::default()
        }
    }

    /// Stored amount of `flow`, zero when absent.
    pub fn stored(&self, flow: FlowTypeId) -> FlowAmount {
        self.stored.get(&flow).copied().unwrap_or(FlowAmount::ZERO)
    }

    pub fn incoming(&self, flow: FlowTypeId) -> FlowAmount {
        self.incoming.get(&flow).copied().unwrap_or(FlowAmount::ZERO)
    }

    pub fn outgoing(&self, flow: FlowTypeId) -> FlowAmount {
        self.outgoing.get(&flow).copied().unwrap_or(FlowAmount::ZERO)
    }

    pub fn add_incoming(&mut self, flow: FlowTypeId, amount: FlowAmount) {
        let entry = self.incoming.entry(flow).or_insert(FlowAmount::ZERO);
        *entry = entry.saturating_add(amount);
    }

    pub fn add_outgoing(&mut self, flow: FlowTypeId, amount: FlowAmount) {
        let entry = self.outgoing.entry(flow).or_insert(FlowAmount::ZERO);
        *entry = entry.saturating_add(amount);
    }

    /// Add to stored, creating the entry at zero first.
    pub fn deposit(&mut self, flow: FlowTypeId, amount: FlowAmount) {
        let entry = self.stored.entry(flow).or_insert(FlowAmount::ZERO);
        *entry = entry.saturating_add(amount);
    }

    /// Remove up to `amount` from stored. Never drops below zero.
    /// Returns the amount actually withdrawn.
    pub fn withdraw(&mut self, flow: FlowTypeId, amount: FlowAmount) -> FlowAmount {
        match self.stored.get_mut(&flow) {
            Some(held) => {
                let taken = amount.clamp(FlowAmount::ZERO, (*held).max(FlowAmount::ZERO));
                *held = held.saturating_sub(taken).max(FlowAmount::ZERO);
                taken
            }
            None => FlowAmount::ZERO,
        }
    }

    /// Clear stored, incoming and outgoing. Local capabilities are kept.
    pub fn clear_flows(&mut self) {
        self.stored.clear();
        self.incoming.clear();
        self.outgoing.clear();
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// One time-sliced instance of the network graph.
#[derive(Debug, Clone)]
pub struct Snapshot {
    index: usize,
    interval: TimeInterval,
    vertices: Vec<Device>,
    edges: Vec<Edge>,
    states: SecondaryMap<DeviceId, DeviceFlowState>,
}

impl Snapshot {
    /// Create a snapshot. Every vertex gets a fresh flow state with empty
    /// local capabilities.
    pub fn new(index: usize, interval: TimeInterval, vertices: Vec<Device>, edges: Vec<Edge>) -> Self {
        let mut states = SecondaryMap::with_capacity(vertices.len());
        for device in &vertices {
            states.insert(device.id(), DeviceFlowState::default());
        }
        Self {
            index,
            interval,
            vertices,
            edges,
            states,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn interval(&self) -> TimeInterval {
        self.interval
    }

    pub fn vertices(&self) -> &[Device] {
        &self.vertices
    }

    pub fn vertex(&self, id: DeviceId) -> Option<&Device> {
        self.vertices.iter().find(|d| d.id() == id)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Edges may be edited in place; the vertex set and flow states are fixed.
    pub fn edges_mut(&mut self) -> &mut [Edge] {
        &mut self.edges
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn state(&self, device: DeviceId) -> Option<&DeviceFlowState> {
        self.states.get(device)
    }

    pub fn state_mut(&mut self, device: DeviceId) -> Option<&mut DeviceFlowState> {
        self.states.get_mut(device)
    }

    /// Iterate `(device, state)` pairs in vertex order.
    pub fn states(&self) -> impl Iterator<Item = (&Device, &DeviceFlowState)> {
        self.vertices
            .iter()
            .filter_map(|d| self.states.get(d.id()).map(|s| (d, s)))
    }

    /// Replace the local capabilities of a device. No-op for unknown devices.
    pub fn set_local_capabilities(&mut self, device: DeviceId, capabilities: CapabilitySet) {
        if let Some(state) = self.states.get_mut(device) {
            state.local_capabilities = capabilities;
        }
    }

    /// Local capabilities of a device; the empty set for unknown devices.
    pub fn local_capabilities(&self, device: DeviceId) -> CapabilitySet {
        self.states
            .get(device)
            .map(|s| s.local_capabilities)
            .unwrap_or_default()
    }

    /// Borrow the vertex list and the state table at once, for passes that
    /// read structure and write flow state.
    pub(crate) fn split_mut(
        &mut self,
    ) -> (&[Device], &[Edge], &mut SecondaryMap<DeviceId, DeviceFlowState>) {
        (&self.vertices, &self.edges, &mut self.states)
    }
}
