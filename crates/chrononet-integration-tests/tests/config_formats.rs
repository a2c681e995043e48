//! The same network written in each supported format loads identically.

use chrononet_core::id::*;
use chrononet_core::simulation::simulate;
use chrononet_core::test_utils::fixed;
use chrononet_data::loader::{load_catalog_file, load_scenario_file};
use std::fs;
use std::path::PathBuf;

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("chrononet_it_{name}_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

const CATALOG_RON: &str = r#"(
    flows: [(id: 1), (id: 2)],
    processes: [(id: 1, time_per_chunk: 1.0,
                 inputs: [(flow: 1, amount: 1.0)], outputs: [(flow: 2, amount: 2.0)])],
    transports: [(id: 1, time_per_chunk: 1.0, throughput: [(flow: 2, amount: 3.0)])],
)"#;

const CATALOG_TOML: &str = r#"
[[flows]]
id = 1

[[flows]]
id = 2

[[processes]]
id = 1
time_per_chunk = 1.0
inputs = [{ flow = 1, amount = 1.0 }]
outputs = [{ flow = 2, amount = 2.0 }]

[[transports]]
id = 1
time_per_chunk = 1.0
throughput = [{ flow = 2, amount = 3.0 }]
"#;

const CATALOG_JSON: &str = r#"{
    "flows": [{"id": 1}, {"id": 2}],
    "processes": [{"id": 1, "time_per_chunk": 1.0,
                   "inputs": [{"flow": 1, "amount": 1.0}],
                   "outputs": [{"flow": 2, "amount": 2.0}]}],
    "transports": [{"id": 1, "time_per_chunk": 1.0,
                    "throughput": [{"flow": 2, "amount": 3.0}]}]
}"#;

const SCENARIO_TOML: &str = r#"
[[devices]]
name = "node"
processes = [1]
inputs = [{ flow = 1, amount = 4.0 }]

[[devices]]
name = "sink"

[[snapshots]]
start = 0
end = 2
edges = [{ a = "node", b = "sink", direction = "Right", transports = [1] }]
"#;

#[test]
fn catalog_formats_agree() {
    let dir = scratch("formats");
    let mut catalogs = Vec::new();
    for (file, body) in [
        ("c.ron", CATALOG_RON),
        ("c.toml", CATALOG_TOML),
        ("c.json", CATALOG_JSON),
    ] {
        let path = dir.join(file);
        fs::write(&path, body).unwrap();
        catalogs.push(load_catalog_file(&path).unwrap());
    }

    for catalog in &catalogs {
        let process = catalog.process(ProcessTypeId(1)).unwrap();
        assert_eq!(process.outputs[&FlowTypeId(2)], fixed(2.0));
        let transport = catalog.transport(TransportTypeId(1)).unwrap();
        assert_eq!(transport.throughput[&FlowTypeId(2)], fixed(3.0));
    }
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn toml_scenario_simulates() {
    let dir = scratch("toml_scenario");
    let catalog_path = dir.join("catalog.toml");
    let scenario_path = dir.join("scenario.toml");
    fs::write(&catalog_path, CATALOG_TOML).unwrap();
    fs::write(&scenario_path, SCENARIO_TOML).unwrap();

    let catalog = load_catalog_file(&catalog_path).unwrap();
    let mut scenario = load_scenario_file(&scenario_path).unwrap();
    let node = scenario.directory.id_of("node").unwrap();
    let sink = scenario.directory.id_of("sink").unwrap();

    // Two ticks allow two executions (4 processed); the link moves 3 per tick.
    let report = simulate(&mut scenario.snapshots[0], &catalog);
    assert_eq!(report.executions(node, ProcessTypeId(1)), 2);
    let snap = &scenario.snapshots[0];
    assert_eq!(snap.state(node).unwrap().stored(FlowTypeId(1)), fixed(2.0));
    assert_eq!(snap.state(sink).unwrap().stored(FlowTypeId(2)), fixed(4.0));
    assert_eq!(snap.state(node).unwrap().stored(FlowTypeId(2)), fixed(0.0));

    let _ = fs::remove_dir_all(&dir);
}
