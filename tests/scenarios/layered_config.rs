//! Scenario: a Home Assistant config directory with shared variables,
//! per-file overrides and a skip list.

use std::sync::{Arc, Mutex};

use jinja_watch::entities::{EntityFetcher, EntityRecord, FetchError};
use jinja_watch::watcher::{Collaborators, WatchEvent, WatchOptions, Watcher};

use crate::common::{generated, TestEnv};

const CONFIG: &str = r#"
default_temp: 20
rooms:
  kitchen: { floor: 0, sensors: [t1, t2] }
  attic: { floor: 2 }
fileConfigs:
  a.yaml.jinja:
    default_temp: 22
  rooms/kitchen.yaml.jinja:
    rooms:
      kitchen: { sensors: [t3] }
skippedFiles:
  - c.yaml.jinja
"#;

fn offline_watcher(env: &TestEnv) -> Watcher {
    Watcher::new(WatchOptions::new(env.root.path().into()).with_jobs(2), Collaborators::offline())
        .unwrap()
}

#[test]
fn scenario_file_override_beats_global_value() {
    let env = TestEnv::new();
    env.write("jinja-watch.yaml", CONFIG);
    env.write("a.yaml.jinja", "target: {{ default_temp }}\n");
    env.write("b.yaml.jinja", "target: {{ default_temp }}\n");

    let report = offline_watcher(&env).build_all(|_| {}).unwrap();

    assert_eq!(report.compiled(), 2);
    assert_eq!(env.read("a.yaml"), generated("a.yaml.jinja", "target: 22\n"));
    assert_eq!(env.read("b.yaml"), generated("b.yaml.jinja", "target: 20\n"));
}

#[test]
fn scenario_nested_override_merges_deeply() {
    let env = TestEnv::new();
    env.write("jinja-watch.yaml", CONFIG);
    env.write(
        "rooms/kitchen.yaml.jinja",
        "floor: {{ rooms.kitchen.floor }}\nsensors: {{ rooms.kitchen.sensors | join(',') }}\nattic: {{ rooms.attic.floor }}\n",
    );

    offline_watcher(&env).build_all(|_| {}).unwrap();

    // Sibling keys survive, the overridden sequence is replaced, not extended
    assert_eq!(
        env.read("rooms/kitchen.yaml"),
        generated("kitchen.yaml.jinja", "floor: 0\nsensors: t3\nattic: 2\n")
    );
}

#[test]
fn scenario_reserved_keys_are_not_variables() {
    let env = TestEnv::new();
    env.write("jinja-watch.yaml", CONFIG);
    env.write("a.yaml.jinja", "leak: {{ skippedFiles }}\n");

    let report = offline_watcher(&env).build_all(|_| {}).unwrap();

    assert_eq!(report.failed(), 1);
    assert!(!env.exists("a.yaml"));
    assert!(env.exists("a.yaml.jinja.errors.log"));
}

#[test]
fn scenario_skipped_template_leaves_no_trace() {
    let env = TestEnv::new();
    env.write("jinja-watch.yaml", CONFIG);
    env.write("c.yaml.jinja", "broken: {{ \n");
    env.write("c.yaml", "stale output\n");
    env.write("c.yaml.jinja.errors.log", "stale error\n");

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let report = offline_watcher(&env)
        .build_all(move |e| sink.lock().unwrap().push(e))
        .unwrap();

    assert!(report.outcomes.is_empty());
    assert!(!env.exists("c.yaml"));
    assert!(!env.exists("c.yaml.jinja.errors.log"));
    assert!(events.lock().unwrap().contains(&WatchEvent::FileRemoved {
        path: "c.yaml.jinja".to_string()
    }));
}

struct StaticEntities;

impl EntityFetcher for StaticEntities {
    fn fetch(&self) -> Result<Vec<EntityRecord>, FetchError> {
        Ok(vec![EntityRecord {
            entity_id: "sensor.outside".to_string(),
            state: serde_json::json!("12.5"),
            attributes: serde_json::json!({ "unit_of_measurement": "°C" }),
        }])
    }
}

struct Unreachable;

impl EntityFetcher for Unreachable {
    fn fetch(&self) -> Result<Vec<EntityRecord>, FetchError> {
        Err(FetchError::Transport("connection refused".to_string()))
    }
}

#[test]
fn scenario_entities_are_injected() {
    let env = TestEnv::new();
    env.write(
        "outside.yaml.jinja",
        "temp: {{ entities['sensor.outside'].state }}\n",
    );

    let watcher = Watcher::new(
        WatchOptions::new(env.root.path().into()),
        Collaborators::offline().with_fetcher(Box::new(StaticEntities)),
    )
    .unwrap();
    watcher.build_all(|_| {}).unwrap();

    assert_eq!(
        env.read("outside.yaml"),
        generated("outside.yaml.jinja", "temp: 12.5\n")
    );
}

#[test]
fn scenario_unreachable_entities_do_not_block_compiles() {
    let env = TestEnv::new();
    env.write("jinja-watch.yaml", "default_temp: 20\n");
    env.write("a.yaml.jinja", "target: {{ default_temp }}\n");

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let watcher = Watcher::new(
        WatchOptions::new(env.root.path().into()),
        Collaborators::offline().with_fetcher(Box::new(Unreachable)),
    )
    .unwrap();
    let report = watcher
        .build_all(move |e| sink.lock().unwrap().push(e))
        .unwrap();

    assert!(report.is_success());
    assert!(env.exists("a.yaml"));
    assert!(events
        .lock()
        .unwrap()
        .iter()
        .any(|e| matches!(e, WatchEvent::EntitiesUnavailable { .. })));
}
