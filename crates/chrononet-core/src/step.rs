//! Discrete-step action engine.
//!
//! A lighter model than [`simulation`](crate::simulation): devices hold
//! storage with per-flow capacities and a compute budget, edges are plain
//! `from -> to` pairs, and each [`ExecutionEngine::step`] collects fixed-size
//! [`Action`]s and applies those that are still valid when their turn comes.

use crate::fixed::FlowAmount;
use crate::id::FlowTypeId;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepDevice {
    pub storage: BTreeMap<FlowTypeId, FlowAmount>,
    pub capacity: BTreeMap<FlowTypeId, FlowAmount>,
    pub can_compute: bool,
    pub can_send: bool,
    pub can_receive: bool,
    pub compute_per_step: FlowAmount,
}

impl StepDevice {
    pub fn stored(&self, flow: FlowTypeId) -> FlowAmount {
        self.storage.get(&flow).copied().unwrap_or(FlowAmount::ZERO)
    }

    pub fn capacity(&self, flow: FlowTypeId) -> FlowAmount {
        self.capacity.get(&flow).copied().unwrap_or(FlowAmount::ZERO)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepEdge {
    pub from: String,
    pub to: String,
}

/// Devices keyed by name, directed edges, and a step counter.
#[derive(Debug, Clone, Default)]
pub struct SystemState {
    pub devices: BTreeMap<String, StepDevice>,
    pub edges: Vec<StepEdge>,
    time_step: u64,
}

impl SystemState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_device(&mut self, name: &str, device: StepDevice) {
        self.devices.insert(name.to_string(), device);
    }

    pub fn connect(&mut self, from: &str, to: &str) {
        self.edges.push(StepEdge {
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    pub fn time_step(&self) -> u64 {
        self.time_step
    }

    fn advance(&mut self) {
        self.time_step += 1;
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// Convert `amount` of `input` into the same amount of `output` on a device.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessAction {
    pub device: String,
    pub input: FlowTypeId,
    pub output: FlowTypeId,
    pub amount: FlowAmount,
}

/// Move `amount` of `flow` from one device to another.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportAction {
    pub from: String,
    pub to: String,
    pub flow: FlowTypeId,
    pub amount: FlowAmount,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Process(ProcessAction),
    Transport(TransportAction),
}

impl Action {
    /// Whether the action is valid against `state` right now. Non-positive
    /// amounts are never valid.
    pub fn can_apply(&self, state: &SystemState) -> bool {
        match self {
            Action::Process(p) => state.devices.get(&p.device).is_some_and(|d| {
                p.amount > FlowAmount::ZERO
                    && d.can_compute
                    && d.stored(p.input) >= p.amount
                    && d.compute_per_step >= p.amount
            }),
            Action::Transport(t) => {
                let (Some(src), Some(dst)) = (state.devices.get(&t.from), state.devices.get(&t.to))
                else {
                    return false;
                };
                t.amount > FlowAmount::ZERO
                    && src.can_send
                    && dst.can_receive
                    && src.stored(t.flow) >= t.amount
                    && dst.stored(t.flow).saturating_add(t.amount) <= dst.capacity(t.flow)
            }
        }
    }

    /// Apply the action. Returns false, leaving `state` untouched, when
    /// [`can_apply`](Self::can_apply) does not hold.
    pub fn apply(&self, state: &mut SystemState) -> bool {
        if !self.can_apply(state) {
            return false;
        }
        match self {
            Action::Process(p) => {
                if let Some(d) = state.devices.get_mut(&p.device) {
                    let input = d.stored(p.input).saturating_sub(p.amount);
                    d.storage.insert(p.input, input);
                    let output = d.stored(p.output).saturating_add(p.amount);
                    d.storage.insert(p.output, output);
                }
            }
            Action::Transport(t) => {
                if let Some(src) = state.devices.get_mut(&t.from) {
                    let left = src.stored(t.flow).saturating_sub(t.amount);
                    src.storage.insert(t.flow, left);
                }
                if let Some(dst) = state.devices.get_mut(&t.to) {
                    let held = dst.stored(t.flow).saturating_add(t.amount);
                    dst.storage.insert(t.flow, held);
                }
            }
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Which flows and amounts the engine proposes each step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepRules {
    pub process_input: FlowTypeId,
    pub process_output: FlowTypeId,
    pub process_amount: FlowAmount,
    pub transport_flow: FlowTypeId,
    pub transport_amount: FlowAmount,
}

impl Default for StepRules {
    /// Raw data (1) is processed into processed data (2), which is shipped,
    /// ten units at a time.
    fn default() -> Self {
        Self {
            process_input: FlowTypeId(1),
            process_output: FlowTypeId(2),
            process_amount: FlowAmount::from_num(10),
            transport_flow: FlowTypeId(2),
            transport_amount: FlowAmount::from_num(10),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExecutionEngine {
    pub rules: StepRules,
}

impl ExecutionEngine {
    pub fn new(rules: StepRules) -> Self {
        Self { rules }
    }

    /// Actions proposed for the current state: processes first (device name
    /// order), then transports (edge order).
    pub fn collect_actions(&self, state: &SystemState) -> Vec<Action> {
        let mut actions = Vec::new();

        for (name, device) in &state.devices {
            if device.can_compute && device.stored(self.rules.process_input) > FlowAmount::ZERO {
                actions.push(Action::Process(ProcessAction {
                    device: name.clone(),
                    input: self.rules.process_input,
                    output: self.rules.process_output,
                    amount: self.rules.process_amount,
                }));
            }
        }

        for edge in &state.edges {
            let holds_flow = state
                .devices
                .get(&edge.from)
                .is_some_and(|d| d.stored(self.rules.transport_flow) > FlowAmount::ZERO);
            if holds_flow {
                actions.push(Action::Transport(TransportAction {
                    from: edge.from.clone(),
                    to: edge.to.clone(),
                    flow: self.rules.transport_flow,
                    amount: self.rules.transport_amount,
                }));
            }
        }

        actions
    }

    /// Collect, apply what is valid in order, advance the step counter.
    /// Returns the actions that were applied.
    pub fn step(&self, state: &mut SystemState) -> Vec<Action> {
        let actions = self.collect_actions(state);
        let mut applied = Vec::with_capacity(actions.len());
        for action in actions {
            if action.apply(state) {
                applied.push(action);
            } else {
                log::trace!("step {}: skipped {:?}", state.time_step(), action);
            }
        }
        state.advance();
        applied
    }
}
