//! Resolution pipeline: reads data files, resolves device names, builds the
//! catalog and the snapshot sequence.
//!
//! Provides format detection (RON/JSON/TOML), file discovery, and
//! deserialization helpers used by the higher-level loading functions.

use crate::schema::{DeviceData, ScenarioData, SnapshotData};
use chrononet_core::capability::CapabilitySet;
use chrononet_core::catalog::{Catalog, CatalogError};
use chrononet_core::data_loader::{CatalogData, FlowAmountData, build_catalog};
use chrononet_core::device::{Device, DeviceDirectory, Edge};
use chrononet_core::fixed::{FlowAmount, checked_f64_to_fixed64};
use chrononet_core::id::*;
use chrononet_core::interval::{IntervalError, TimeInterval};
use chrononet_core::snapshot::Snapshot;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: &'static str, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A device name could not be resolved.
    #[error("unresolved device reference '{name}' in {file}")]
    UnresolvedRef { file: PathBuf, name: String },

    /// A device name was declared twice.
    #[error("duplicate device name '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    /// A snapshot interval ends before it starts.
    #[error("snapshot {snapshot} in {file}: {source}")]
    InvalidInterval {
        file: PathBuf,
        snapshot: usize,
        #[source]
        source: IntervalError,
    },

    /// A number is NaN or infinite.
    #[error("non-finite number in {file}: {detail}")]
    NonFinite { file: PathBuf, detail: String },

    /// The catalog failed to build.
    #[error("catalog in {file}: {source}")]
    Catalog {
        file: PathBuf,
        #[source]
        source: CatalogError,
    },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Scan a directory for a data file with the given base name (without extension).
///
/// Looks for `{base_name}.ron`, `{base_name}.toml`, and `{base_name}.json`.
/// Returns `Ok(None)` if no file is found, or `Err(ConflictingFormats)` if
/// multiple formats exist for the same base name.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;

    for ext in ["ron", "toml", "json"] {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing,
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

/// Like [`find_data_file`], but returns an error if no file is found.
pub fn require_data_file(dir: &Path, base_name: &'static str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name,
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

/// Deserialize `content` according to `format`. `file` is only used for
/// error reporting.
pub fn deserialize_str<T: DeserializeOwned>(
    content: &str,
    format: Format,
    file: &Path,
) -> Result<T, DataLoadError> {
    let parse_err = |detail: String| DataLoadError::Parse {
        file: file.to_path_buf(),
        detail,
    };
    match format {
        Format::Ron => ron::from_str(content).map_err(|e| parse_err(e.to_string())),
        Format::Json => serde_json::from_str(content).map_err(|e| parse_err(e.to_string())),
        Format::Toml => toml::from_str(content).map_err(|e| parse_err(e.to_string())),
    }
}

/// Read a file and deserialize it according to its format (detected from extension).
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    deserialize_str(&content, format, path)
}

// ===========================================================================
// Catalog
// ===========================================================================

/// Build a catalog from already-deserialized data.
pub fn resolve_catalog(data: &CatalogData, file: &Path) -> Result<Catalog, DataLoadError> {
    build_catalog(data)
        .map_err(|e| DataLoadError::NonFinite {
            file: file.to_path_buf(),
            detail: e.to_string(),
        })?
        .build()
        .map_err(|source| DataLoadError::Catalog {
            file: file.to_path_buf(),
            source,
        })
}

/// Load and build a catalog file.
pub fn load_catalog_file(path: &Path) -> Result<Catalog, DataLoadError> {
    let data: CatalogData = deserialize_file(path)?;
    let catalog = resolve_catalog(&data, path)?;
    log::debug!(
        "loaded catalog {}: {} flows, {} processes, {} transports, {} storages",
        path.display(),
        catalog.flow_count(),
        catalog.process_count(),
        catalog.transport_count(),
        catalog.storage_count()
    );
    Ok(catalog)
}

/// Load `catalog.{ron,toml,json}` from `dir`.
pub fn load_catalog_dir(dir: &Path) -> Result<Catalog, DataLoadError> {
    let path = require_data_file(dir, "catalog")?;
    load_catalog_file(&path)
}

// ===========================================================================
// Scenario
// ===========================================================================

/// A device directory and the snapshots built over it.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub directory: DeviceDirectory,
    pub snapshots: Vec<Snapshot>,
}

fn resolve_device(directory: &DeviceDirectory, name: &str, file: &Path) -> Result<DeviceId, DataLoadError> {
    directory
        .id_of(name)
        .ok_or_else(|| DataLoadError::UnresolvedRef {
            file: file.to_path_buf(),
            name: name.to_string(),
        })
}

fn flow_entries(
    entries: &[FlowAmountData],
    device: &str,
    field: &str,
    file: &Path,
) -> Result<Vec<(FlowTypeId, FlowAmount)>, DataLoadError> {
    entries
        .iter()
        .map(|e| {
            let amount = checked_f64_to_fixed64(e.amount).ok_or_else(|| DataLoadError::NonFinite {
                file: file.to_path_buf(),
                detail: format!("device '{device}' {field} for flow {}", e.flow),
            })?;
            Ok((FlowTypeId(e.flow), amount))
        })
        .collect()
}

fn apply_device(device: &mut Device, data: &DeviceData, file: &Path) -> Result<(), DataLoadError> {
    for &capability in &data.capabilities {
        device.add_capability(capability);
    }
    for &process in &data.processes {
        device.add_process(ProcessTypeId(process));
    }
    for (flow, amount) in flow_entries(&data.inputs, &data.name, "inputs", file)? {
        device.set_input_flow(flow, amount);
    }
    for (flow, amount) in flow_entries(&data.outputs, &data.name, "outputs", file)? {
        device.set_output_flow(flow, amount);
    }
    for (flow, capacity) in flow_entries(&data.storage, &data.name, "storage", file)? {
        device.set_storage_capacity(flow, capacity);
    }
    Ok(())
}

fn resolve_snapshot(
    index: usize,
    data: &SnapshotData,
    directory: &DeviceDirectory,
    file: &Path,
) -> Result<Snapshot, DataLoadError> {
    let interval = TimeInterval::new(data.start, data.end).map_err(|source| {
        DataLoadError::InvalidInterval {
            file: file.to_path_buf(),
            snapshot: index,
            source,
        }
    })?;

    let vertices = match &data.devices {
        None => directory.vertices(),
        Some(names) => {
            let mut vertices: Vec<Device> = Vec::with_capacity(names.len());
            for name in names {
                let id = resolve_device(directory, name, file)?;
                if vertices.iter().any(|d| d.id() == id) {
                    continue;
                }
                if let Some(device) = directory.get(id) {
                    vertices.push(device.clone());
                }
            }
            vertices
        }
    };

    let mut edges = Vec::with_capacity(data.edges.len());
    for edge in &data.edges {
        let a = resolve_device(directory, &edge.a, file)?;
        let b = resolve_device(directory, &edge.b, file)?;
        edges.push(
            Edge::new(a, b, edge.direction)
                .with_transports(edge.transports.iter().copied().map(TransportTypeId)),
        );
    }

    let mut snapshot = Snapshot::new(index, interval, vertices, edges);
    for local in &data.local_capabilities {
        let id = resolve_device(directory, &local.device, file)?;
        snapshot.set_local_capabilities(id, CapabilitySet::of(&local.capabilities));
    }
    Ok(snapshot)
}

/// Resolve names in `data` into a directory and a snapshot sequence.
/// Snapshot indices follow file order.
pub fn resolve_scenario(data: &ScenarioData, file: &Path) -> Result<Scenario, DataLoadError> {
    let mut directory = DeviceDirectory::new();
    for device in &data.devices {
        let id = directory
            .add(&device.name)
            .map_err(|_| DataLoadError::DuplicateName {
                file: file.to_path_buf(),
                name: device.name.clone(),
            })?;
        if let Some(target) = directory.get_mut(id) {
            apply_device(target, device, file)?;
        }
    }

    let snapshots = data
        .snapshots
        .iter()
        .enumerate()
        .map(|(index, snapshot)| resolve_snapshot(index, snapshot, &directory, file))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Scenario {
        directory,
        snapshots,
    })
}

/// Load and resolve a scenario file.
pub fn load_scenario_file(path: &Path) -> Result<Scenario, DataLoadError> {
    let data: ScenarioData = deserialize_file(path)?;
    let scenario = resolve_scenario(&data, path)?;
    log::debug!(
        "loaded scenario {}: {} devices, {} snapshots",
        path.display(),
        scenario.directory.len(),
        scenario.snapshots.len()
    );
    Ok(scenario)
}

// ===========================================================================
// Directory loading
// ===========================================================================

/// Everything found in one data directory.
#[derive(Debug, Clone)]
pub struct NetworkData {
    pub catalog: Catalog,
    pub scenario: Option<Scenario>,
}

/// Load `catalog.*` (required) and `scenario.*` (optional) from `dir`.
pub fn load_network_data(dir: &Path) -> Result<NetworkData, DataLoadError> {
    let catalog = load_catalog_dir(dir)?;
    let scenario = match find_data_file(dir, "scenario")? {
        Some(path) => Some(load_scenario_file(&path)?),
        None => {
            log::debug!("no scenario file in {}", dir.display());
            None
        }
    };
    Ok(NetworkData { catalog, scenario })
}

// ===========================================================================
// Tests
// ===========================================================================
