//! File-based configuration for ChronoNet: catalogs and network scenarios
//! in RON, TOML or JSON.

pub mod loader;
pub mod schema;

pub use loader::{DataLoadError, NetworkData, Scenario, load_network_data};
