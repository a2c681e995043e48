//! Named device capabilities.
//!
//! Devices carry a structural [`CapabilitySet`]; each snapshot also carries a
//! snapshot-local set per device that the reachability engine consults.

use serde::{Deserialize, Serialize};

/// A single capability a device may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Capability {
    Compute,
    Storage,
    Transfer,
    Send,
    Receive,
}

impl Capability {
    pub const ALL: [Capability; 5] = [
        Capability::Compute,
        Capability::Storage,
        Capability::Transfer,
        Capability::Send,
        Capability::Receive,
    ];
}

/// A set of orthogonal capabilities, each independently toggleable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CapabilitySet {
    #[serde(default)]
    pub compute: bool,
    #[serde(default)]
    pub storage: bool,
    #[serde(default)]
    pub transfer: bool,
    #[serde(default)]
    pub send: bool,
    #[serde(default)]
    pub receive: bool,
}

impl CapabilitySet {
    /// The empty set.
    pub fn none() -> Self {
        Self::default()
    }

    /// Build a set from a list of capabilities.
    pub fn of(capabilities: &[Capability]) -> Self {
        let mut set = Self::none();
        for &c in capabilities {
            set.insert(c);
        }
        set
    }

    fn slot(&mut self, capability: Capability) -> &mut bool {
        match capability {
            Capability::Compute => &mut self.compute,
            Capability::Storage => &mut self.storage,
            Capability::Transfer => &mut self.transfer,
            Capability::Send => &mut self.send,
            Capability::Receive => &mut self.receive,
        }
    }

    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::Compute => self.compute,
            Capability::Storage => self.storage,
            Capability::Transfer => self.transfer,
            Capability::Send => self.send,
            Capability::Receive => self.receive,
        }
    }

    pub fn insert(&mut self, capability: Capability) {
        *self.slot(capability) = true;
    }

    pub fn remove(&mut self, capability: Capability) {
        *self.slot(capability) = false;
    }

    /// Flip a capability. Returns the new state.
    pub fn toggle(&mut self, capability: Capability) -> bool {
        let slot = self.slot(capability);
        *slot = !*slot;
        *slot
    }

    pub fn is_empty(&self) -> bool {
        Capability::ALL.iter().all(|&c| !self.has(c))
    }

    /// Iterate the capabilities present, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::ALL.into_iter().filter(|&c| self.has(c))
    }
}
