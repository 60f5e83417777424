use std::fs;
use std::path::Path;
use std::time::Duration;

use tempfile::tempdir;

use border_pairs::report::{render_json, render_text};
use border_pairs::{
    CachingSource, CountrySource, FailureKind, Orchestrator, PairsConfig, PhaseState,
    SnapshotCountrySource,
};

const WAIT: Duration = Duration::from_secs(10);

fn url(name: &str) -> String {
    format!("https://travelbriefing.org/{name}?format=json")
}

fn write_list(root: &Path, names: &[&str]) {
    let entries: Vec<serde_json::Value> = names
        .iter()
        .map(|name| serde_json::json!({ "name": name, "url": url(name) }))
        .collect();
    fs::write(
        root.join("countries.json"),
        serde_json::to_string(&entries).unwrap(),
    )
    .unwrap();
}

fn write_detail(root: &Path, name: &str, neighbors: &[&str]) {
    let neighbors: Vec<serde_json::Value> = neighbors
        .iter()
        .map(|neighbor| serde_json::json!({ "id": "xx", "name": neighbor }))
        .collect();
    let body = serde_json::json!({
        "names": { "name": name, "full": format!("Republic of {name}") },
        "neighbors": neighbors,
        "timezone": { "name": "Europe/Somewhere" }
    });
    fs::write(root.join(format!("{name}.json")), body.to_string()).unwrap();
}

fn config(sample_size: usize) -> PairsConfig {
    PairsConfig {
        sample_size,
        seed: Some(2024),
        ..PairsConfig::default()
    }
}

#[test]
fn snapshot_cycle_pairs_iberia_and_skips_islands() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write_list(root, &["Spain", "Portugal", "Andorra", "Iceland"]);
    write_detail(root, "Spain", &["Portugal", "Andorra", "France", "Morocco"]);
    write_detail(root, "Portugal", &["Spain"]);
    write_detail(root, "Andorra", &["Spain", "France"]);
    fs::write(
        root.join("Iceland.json"),
        r#"{"names": {"name": "Iceland"}, "neighbors": null}"#,
    )
    .unwrap();

    let source = CachingSource::new(SnapshotCountrySource::new(root));
    let orchestrator = Orchestrator::new(source, &config(4)).unwrap();
    orchestrator.start();
    let state = orchestrator.wait_until_settled(WAIT).unwrap();
    assert_eq!(state.pairing, PhaseState::Ready);
    assert_eq!(state.sample.len(), 4);
    assert_eq!(state.pairs.len(), 2);
    assert!(state.pairs.iter().any(|pair| pair.connects("Spain", "Portugal")));
    assert!(state.pairs.iter().any(|pair| pair.connects("Spain", "Andorra")));
    assert!(state.pairs.iter().all(|pair| !pair.involves("Iceland")));

    let text = render_text(&state);
    assert!(text.contains("(isolated: Iceland)"));
    let json: serde_json::Value =
        serde_json::from_str(&render_json(orchestrator.base_seed(), &state).unwrap()).unwrap();
    assert_eq!(json["base_seed"], 2024);
    assert_eq!(json["coverage"]["connected"], 3);
}

#[test]
fn cached_list_survives_snapshot_removal_between_cycles() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write_list(root, &["Chad", "Niger"]);
    write_detail(root, "Chad", &["Niger"]);
    write_detail(root, "Niger", &["Chad"]);

    let orchestrator = Orchestrator::new(
        CachingSource::new(SnapshotCountrySource::new(root)),
        &config(2),
    )
    .unwrap();
    orchestrator.start();
    assert_eq!(orchestrator.wait_until_settled(WAIT).unwrap().pairs.len(), 1);

    fs::remove_file(root.join("countries.json")).unwrap();
    orchestrator.retry().unwrap();
    let state = orchestrator.wait_until_settled(WAIT).unwrap();
    assert_eq!(state.cycle, 2);
    assert_eq!(state.pairing, PhaseState::Ready);
    assert_eq!(state.pairs.len(), 1);

    // Without the cache the missing list is a fetch failure.
    let uncached = SnapshotCountrySource::new(root);
    assert!(uncached.list_countries().is_err());
}

#[test]
fn malformed_detail_fails_cycle_as_fetch_failure() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write_list(root, &["Chad", "Niger"]);
    write_detail(root, "Chad", &["Niger"]);
    fs::write(root.join("Niger.json"), "{ not json").unwrap();

    let orchestrator =
        Orchestrator::new(SnapshotCountrySource::new(root), &config(2)).unwrap();
    orchestrator.start();
    let state = orchestrator.wait_until_settled(WAIT).unwrap();
    assert_eq!(state.pairing, PhaseState::Failed);
    assert_eq!(
        state.failure.map(|failure| failure.kind),
        Some(FailureKind::FetchFailure)
    );
}

#[test]
fn nameless_neighbor_fails_cycle_as_data_integrity() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write_list(root, &["Chad", "Niger"]);
    write_detail(root, "Niger", &["Chad"]);
    fs::write(
        root.join("Chad.json"),
        r#"{"names": {"name": "Chad"}, "neighbors": [{"id": "ne"}]}"#,
    )
    .unwrap();

    let orchestrator =
        Orchestrator::new(SnapshotCountrySource::new(root), &config(2)).unwrap();
    orchestrator.start();
    let state = orchestrator.wait_until_settled(WAIT).unwrap();
    assert_eq!(
        state.failure.map(|failure| failure.kind),
        Some(FailureKind::DataIntegrity)
    );
    assert!(state.pairs.is_empty());
}
