//! Scenario: a template breaks, gets fixed, and the two artifacts swap places.

use jinja_watch::compiler::Formatter;
use jinja_watch::watcher::{Collaborators, WatchOptions, Watcher};
use jinja_watch::{JinjaWatchError, JinjaWatchResult};

use crate::common::{generated, TestEnv};

fn build(env: &TestEnv, collaborators: Collaborators) -> jinja_watch::BatchReport {
    Watcher::new(WatchOptions::new(env.root.path().into()), collaborators)
        .unwrap()
        .build_all(|_| {})
        .unwrap()
}

#[test]
fn scenario_undefined_variable_then_fix() {
    let env = TestEnv::new();
    env.write("jinja-watch.yaml", "name: hall\n");
    env.write("d.yaml.jinja", "light: {{ nmae }}\n");

    let report = build(&env, Collaborators::offline());
    assert_eq!(report.failed(), 1);
    assert!(!env.exists("d.yaml"));
    let message = env.read("d.yaml.jinja.errors.log");
    assert!(message.contains("undefined"), "unexpected message: {message}");

    env.write("d.yaml.jinja", "light: {{ name }}\n");
    let report = build(&env, Collaborators::offline());
    assert_eq!(report.compiled(), 1);
    assert!(!env.exists("d.yaml.jinja.errors.log"));
    assert_eq!(env.read("d.yaml"), generated("d.yaml.jinja", "light: hall\n"));
}

#[test]
fn scenario_breaking_a_working_template_removes_its_output() {
    let env = TestEnv::new();
    env.write("e.yaml.jinja", "ok: true\n");
    build(&env, Collaborators::offline());
    assert!(env.exists("e.yaml"));

    env.write("e.yaml.jinja", "ok: {% if %}\n");
    build(&env, Collaborators::offline());

    assert!(!env.exists("e.yaml"));
    assert!(env.exists("e.yaml.jinja.errors.log"));
}

struct RejectingFormatter;

impl Formatter for RejectingFormatter {
    fn format(&self, _text: &str) -> JinjaWatchResult<String> {
        Err(JinjaWatchError::Format("[error] unexpected indentation".to_string()))
    }
}

#[test]
fn scenario_formatter_failure_fails_the_compile() {
    let env = TestEnv::new();
    env.write("f.yaml.jinja", "ok: true\n");
    env.write("f.yaml", "previous output\n");

    let report = build(
        &env,
        Collaborators::offline().with_formatter(Box::new(RejectingFormatter)),
    );

    assert_eq!(report.failed(), 1);
    assert!(!env.exists("f.yaml"));
    assert!(env
        .read("f.yaml.jinja.errors.log")
        .contains("unexpected indentation"));
}

#[test]
fn scenario_one_broken_template_does_not_stop_the_batch() {
    let env = TestEnv::new();
    for i in 0..8 {
        env.write(&format!("ok{i}.yaml.jinja"), "ok: true\n");
    }
    env.write("broken.yaml.jinja", "x: {{ nope }}\n");

    let report = build(&env, Collaborators::offline());

    assert_eq!(report.compiled(), 8);
    assert_eq!(report.failed(), 1);
    for i in 0..8 {
        assert!(env.exists(&format!("ok{i}.yaml")));
    }
}
