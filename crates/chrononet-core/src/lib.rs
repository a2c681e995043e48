//! ChronoNet Core -- time-varying network model and flow engines.
//!
//! A network is described as an ordered sequence of [`snapshot::Snapshot`]s,
//! each a graph of devices and edges valid over one half-open
//! [`interval::TimeInterval`]. Two engines run over that model:
//!
//! - [`simulation`] moves data flows through one snapshot: seed, produce,
//!   transport, clamp to storage.
//! - [`reachability`] answers whether a device can reach others along
//!   time-respecting paths across the whole sequence.
//!
//! # Simulation phases
//!
//! Each call to [`simulation::simulate`] runs four ordered phases:
//!
//! 1. **Initialization** -- clear per-device flow state, seed stored amounts
//!    from each device's input flows.
//! 2. **Production** -- run supported processes, bounded by time and stock.
//! 3. **Transport** -- move stock along directed edges in list order.
//! 4. **Storage clamp** -- discard stock above declared capacity.
//!
//! # Key Types
//!
//! - [`device::DeviceDirectory`] -- named devices with unique names.
//! - [`device::Edge`] -- unordered device pair with a direction flag.
//! - [`catalog::Catalog`] -- immutable flow, process, transport and storage
//!   types (frozen at startup via [`catalog::CatalogBuilder`]).
//! - [`fixed::Fixed64`] -- Q32.32 fixed-point type for deterministic amounts.
//! - [`export::TaskDocument`] -- solver task built from simulated snapshots.
//! - [`step::ExecutionEngine`] -- a discrete action-based alternative engine.

pub mod capability;
pub mod catalog;
#[cfg(feature = "data-loader")]
pub mod data_loader;
pub mod device;
pub mod export;
pub mod fixed;
pub mod id;
pub mod interval;
pub mod reachability;
pub mod simulation;
pub mod snapshot;
pub mod step;
pub mod validation;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
