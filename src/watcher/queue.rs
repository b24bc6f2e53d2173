//! Debounced change queue
//!
//! Events are folded into a window that opens on the first event and closes a
//! fixed duration later, however many events arrive in between. Each closed
//! window yields one settled batch with every path listed once.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError};

use crate::paths::TemplatePath;

use super::event::{ChangeEvent, ChangeKind, ChangeSubject};

/// Longest the sequencer sleeps before re-checking the shutdown flag
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// An open debounce window
#[derive(Debug, Clone)]
pub struct DebounceWindow {
    started: Instant,
    pending: BTreeMap<TemplatePath, ChangeKind>,
}

impl DebounceWindow {
    fn new(started: Instant) -> Self {
        Self {
            started,
            pending: BTreeMap::new(),
        }
    }

    pub fn started(&self) -> Instant {
        self.started
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Paths from one closed window
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettledBatch {
    /// Paths last seen created or modified
    pub compile: Vec<TemplatePath>,
    /// Paths last seen deleted
    pub removed: Vec<TemplatePath>,
}

impl SettledBatch {
    pub fn len(&self) -> usize {
        self.compile.len() + self.removed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compile.is_empty() && self.removed.is_empty()
    }
}

/// Accumulates changes and hands them out one window at a time
#[derive(Debug)]
pub struct ChangeQueue {
    duration: Duration,
    window: Option<DebounceWindow>,
    reload_pending: bool,
}

impl ChangeQueue {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            window: None,
            reload_pending: false,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn window(&self) -> Option<&DebounceWindow> {
        self.window.as_ref()
    }

    /// Fold `event` into the open window, opening one at `event.at` if needed.
    ///
    /// A global config change is not queued as a path; it marks a reload as
    /// pending for the caller to pick up with [`ChangeQueue::take_reload`].
    pub fn enqueue(&mut self, event: ChangeEvent) {
        let window = self
            .window
            .get_or_insert_with(|| DebounceWindow::new(event.at));
        match event.subject {
            ChangeSubject::Template(path) => {
                window.pending.insert(path, event.kind);
            }
            ChangeSubject::GlobalConfig => self.reload_pending = true,
        }
    }

    /// Whether a config change arrived since the last call
    pub fn take_reload(&mut self) -> bool {
        std::mem::take(&mut self.reload_pending)
    }

    /// Add `paths` to the open window (or one opened at `at`) for compilation.
    pub fn inject(&mut self, paths: impl IntoIterator<Item = TemplatePath>, at: Instant) {
        let window = self.window.get_or_insert_with(|| DebounceWindow::new(at));
        for path in paths {
            window.pending.insert(path, ChangeKind::Modified);
        }
    }

    /// When the open window closes
    pub fn deadline(&self) -> Option<Instant> {
        self.window.as_ref().map(|w| w.started + self.duration)
    }

    /// Close the window if it has expired by `now`.
    ///
    /// An expired window with nothing in it closes without producing a batch.
    pub fn take_batch(&mut self, now: Instant) -> Option<SettledBatch> {
        let expired = self
            .window
            .as_ref()
            .is_some_and(|w| now.saturating_duration_since(w.started) >= self.duration);
        if !expired {
            return None;
        }

        let window = self.window.take()?;
        let mut batch = SettledBatch::default();
        for (path, kind) in window.pending {
            match kind {
                ChangeKind::Deleted => batch.removed.push(path),
                ChangeKind::Created | ChangeKind::Modified => batch.compile.push(path),
            }
        }
        (!batch.is_empty()).then_some(batch)
    }

    /// Abandon the open window; returns how many paths were dropped.
    pub fn discard(&mut self) -> usize {
        self.reload_pending = false;
        self.window.take().map_or(0, |w| w.pending.len())
    }

    /// Settled batches fed from `rx`, until `running` clears or `rx` closes.
    ///
    /// `reload` runs on this thread whenever a received burst contained a
    /// global config change; the paths it returns join the open window.
    pub fn drain<'a, R>(
        &'a mut self,
        rx: &'a Receiver<ChangeEvent>,
        running: &'a AtomicBool,
        reload: R,
    ) -> Batches<'a, R>
    where
        R: FnMut() -> Vec<TemplatePath>,
    {
        Batches {
            queue: self,
            rx,
            running,
            reload,
        }
    }
}

/// Iterator returned by [`ChangeQueue::drain`]
pub struct Batches<'a, R> {
    queue: &'a mut ChangeQueue,
    rx: &'a Receiver<ChangeEvent>,
    running: &'a AtomicBool,
    reload: R,
}

impl<R> Batches<'_, R>
where
    R: FnMut() -> Vec<TemplatePath>,
{
    fn stop(&mut self) {
        let dropped = self.queue.discard();
        if dropped > 0 {
            tracing::info!(dropped, "discarding pending changes");
        }
    }
}

impl<R> Iterator for Batches<'_, R>
where
    R: FnMut() -> Vec<TemplatePath>,
{
    type Item = SettledBatch;

    fn next(&mut self) -> Option<SettledBatch> {
        loop {
            if !self.running.load(Ordering::SeqCst) {
                self.stop();
                return None;
            }

            let now = Instant::now();
            if let Some(batch) = self.queue.take_batch(now) {
                return Some(batch);
            }

            let wait = self
                .queue
                .deadline()
                .map_or(POLL_INTERVAL, |d| d.saturating_duration_since(now))
                .min(POLL_INTERVAL);

            match self.rx.recv_timeout(wait) {
                Ok(event) => {
                    self.queue.enqueue(event);
                    for event in self.rx.try_iter() {
                        self.queue.enqueue(event);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    tracing::debug!("change channel closed");
                    self.stop();
                    return None;
                }
            }

            // One reload per burst, however many config events it held
            if self.queue.take_reload() {
                let paths = (self.reload)();
                self.queue.inject(paths, Instant::now());
            }
        }
    }
}
