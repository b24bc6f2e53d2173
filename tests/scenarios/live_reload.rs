//! Scenario: a running watcher reacts to edits, deletes, renames and config
//! changes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use jinja_watch::watcher::{Collaborators, WatchEvent, WatchOptions, Watcher};

use crate::common::{wait_for, TestEnv};

const TIMEOUT: Duration = Duration::from_secs(15);

struct Running {
    running: Arc<AtomicBool>,
    events: Arc<Mutex<Vec<WatchEvent>>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl Running {
    fn start(env: &TestEnv) -> Self {
        let options = WatchOptions::new(env.root.path().into()).with_debounce(Duration::from_millis(300));
        let mut watcher = Watcher::new(options, Collaborators::offline()).unwrap();
        let running = Arc::new(AtomicBool::new(true));
        let events = Arc::new(Mutex::new(Vec::new()));

        let handle = {
            let running = running.clone();
            let events = events.clone();
            thread::spawn(move || {
                watcher
                    .run(running, move |e| events.lock().unwrap().push(e))
                    .unwrap();
            })
        };

        let this = Self {
            running,
            events,
            handle: Some(handle),
        };
        assert!(wait_for(TIMEOUT, || this.saw(|e| matches!(e, WatchEvent::WatchStarted { .. }))));
        this
    }

    fn saw(&self, pred: impl Fn(&WatchEvent) -> bool) -> bool {
        self.events.lock().unwrap().iter().any(pred)
    }

    fn stop(mut self) -> Vec<WatchEvent> {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            handle.join().unwrap();
        }
        self.events.lock().unwrap().clone()
    }
}

#[test]
fn scenario_config_edit_rebuilds_everything() {
    let env = TestEnv::new();
    env.write("jinja-watch.yaml", "default_temp: 20\n");
    env.write("a.yaml.jinja", "t: {{ default_temp }}\n");
    env.write("b.yaml.jinja", "static: true\n");

    let watcher = Running::start(&env);
    let compiles_of_b = |events: &[WatchEvent]| {
        events
            .iter()
            .filter(|e| matches!(e, WatchEvent::Compiled { path, .. } if path == "b.yaml.jinja"))
            .count()
    };
    let before = compiles_of_b(&watcher.events.lock().unwrap());

    env.write("jinja-watch.yaml", "default_temp: 21\n");

    assert!(wait_for(TIMEOUT, || env.read("a.yaml").contains("t: 21")));
    // b does not use the changed variable but is rebuilt anyway
    assert!(wait_for(TIMEOUT, || {
        compiles_of_b(&watcher.events.lock().unwrap()) > before
    }));

    let events = watcher.stop();
    assert_eq!(events.last(), Some(&WatchEvent::Shutdown));
}

#[test]
fn scenario_broken_config_keeps_previous_variables() {
    let env = TestEnv::new();
    env.write("jinja-watch.yaml", "default_temp: 20\n");
    env.write("a.yaml.jinja", "t: {{ default_temp }}\n");

    let watcher = Running::start(&env);
    env.write("jinja-watch.yaml", "default_temp: [unclosed\n");

    assert!(wait_for(TIMEOUT, || {
        watcher.saw(|e| matches!(e, WatchEvent::ConfigRejected { .. }))
    }));
    // The rebuild that follows still sees the last good configuration
    env.write("a.yaml.jinja", "t: {{ default_temp }} # touched\n");
    assert!(wait_for(TIMEOUT, || env.read("a.yaml").contains("t: 20 # touched")));

    watcher.stop();
}

#[test]
fn scenario_delete_and_rename_follow_the_source() {
    let env = TestEnv::new();
    env.write("old.yaml.jinja", "v: 1\n");
    env.write("gone.yaml.jinja", "v: 2\n");

    let watcher = Running::start(&env);
    assert!(env.exists("old.yaml") && env.exists("gone.yaml"));

    std::fs::remove_file(env.path("gone.yaml.jinja")).unwrap();
    std::fs::rename(env.path("old.yaml.jinja"), env.path("new.yaml.jinja")).unwrap();

    assert!(wait_for(TIMEOUT, || {
        !env.exists("gone.yaml") && !env.exists("old.yaml") && env.exists("new.yaml")
    }));

    watcher.stop();
}

#[test]
fn scenario_newly_skipped_template_is_cleaned_up() {
    let env = TestEnv::new();
    env.write("jinja-watch.yaml", "x: 1\n");
    env.write("c.yaml.jinja", "x: {{ x }}\n");

    let watcher = Running::start(&env);
    assert!(env.exists("c.yaml"));

    env.write("jinja-watch.yaml", "x: 1\nskippedFiles: [c.yaml.jinja]\n");
    assert!(wait_for(TIMEOUT, || !env.exists("c.yaml")));

    // Edits to a skipped template produce nothing
    env.write("c.yaml.jinja", "x: {{ broken\n");
    assert!(wait_for(TIMEOUT, || {
        watcher.saw(|e| matches!(e, WatchEvent::Skipped { path } if path == "c.yaml.jinja"))
    }));
    assert!(!env.exists("c.yaml"));
    assert!(!env.exists("c.yaml.jinja.errors.log"));

    watcher.stop();
}

#[test]
fn scenario_directory_moved_into_root_is_compiled() {
    let env = TestEnv::new();
    env.write("a.yaml.jinja", "v: 1\n");
    let outside = tempfile::TempDir::new().unwrap();
    let pkg = outside.path().join("pkg");
    std::fs::create_dir_all(pkg.join("deep")).unwrap();
    std::fs::write(pkg.join("heat.yaml.jinja"), "heat: on\n").unwrap();
    std::fs::write(pkg.join("deep/cool.yaml.jinja"), "cool: off\n").unwrap();

    let watcher = Running::start(&env);
    std::fs::rename(&pkg, env.path("pkg")).unwrap();

    assert!(wait_for(TIMEOUT, || {
        env.exists("pkg/heat.yaml") && env.exists("pkg/deep/cool.yaml")
    }));
    assert!(env.read("pkg/heat.yaml").ends_with("heat: on\n"));

    watcher.stop();
}
