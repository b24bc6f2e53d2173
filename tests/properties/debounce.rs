//! Property tests for the debounce queue.

use proptest::prelude::*;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use jinja_watch::paths::TemplatePath;
use jinja_watch::watcher::{ChangeEvent, ChangeKind, ChangeQueue};

const WINDOW: Duration = Duration::from_secs(5);

fn kind() -> impl Strategy<Value = ChangeKind> {
    prop_oneof![
        Just(ChangeKind::Created),
        Just(ChangeKind::Modified),
        Just(ChangeKind::Deleted),
    ]
}

/// Edits inside one window: (path index, kind, offset from the first event)
fn edits() -> impl Strategy<Value = Vec<(usize, ChangeKind, u64)>> {
    proptest::collection::vec((0usize..4, kind(), 0u64..5_000), 1..40).prop_map(|mut edits| {
        edits.sort_by_key(|(_, _, offset)| *offset);
        edits
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Every path edited inside one window appears exactly once in
    /// the settled batch, classified by its latest event.
    #[test]
    fn property_each_path_once_latest_kind(edits in edits()) {
        let mut queue = ChangeQueue::new(WINDOW);
        let t0 = Instant::now();
        let mut latest = BTreeMap::new();

        for (idx, kind, offset) in &edits {
            let path = TemplatePath::new(format!("t{idx}.yaml.jinja"));
            latest.insert(path.clone(), *kind);
            queue.enqueue(ChangeEvent::template_at(path, *kind, t0 + Duration::from_millis(*offset)));
        }

        // Nothing settles before the fixed deadline, whatever the last edit time
        prop_assert!(queue.take_batch(t0 + WINDOW - Duration::from_millis(1)).is_none());
        let batch = queue.take_batch(t0 + WINDOW).unwrap();

        prop_assert_eq!(batch.len(), latest.len());
        for (path, kind) in latest {
            let in_compile = batch.compile.contains(&path);
            let in_removed = batch.removed.contains(&path);
            prop_assert!(in_compile != in_removed, "{path} must be in exactly one list");
            prop_assert_eq!(in_removed, kind == ChangeKind::Deleted);
        }
        prop_assert!(queue.window().is_none());
    }
}
