//! Watcher driver
//!
//! Owns the startup build, the file-system subscription and the sequencer
//! loop that turns settled batches into compiles.

use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecursiveMode, Watcher as _};

use crate::compiler::{
    CompileOutcome, Compiler, Formatter, MiniJinjaRenderer, NoopFormatter, Renderer,
};
use crate::context::WatchContext;
use crate::discovery;
use crate::entities::{EntityCache, EntityFetcher, HttpEntityFetcher};
use crate::error::{JinjaWatchError, JinjaWatchResult};
use crate::paths::TemplatePath;
use crate::scheduler::{BatchReport, CompilationScheduler};

use super::event::{ChangeEvent, ChangeKind, ChangeSubject, WatchEvent, WatchOptions};
use super::queue::{ChangeQueue, SettledBatch};

/// Lifecycle of a [`Watcher`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherPhase {
    Starting,
    Running,
    ShuttingDown,
    Stopped,
}

/// External collaborators plugged into the pipeline
pub struct Collaborators {
    pub renderer: Box<dyn Renderer>,
    pub formatter: Box<dyn Formatter>,
    pub fetcher: Option<Box<dyn EntityFetcher>>,
}

impl Collaborators {
    /// MiniJinja rendering, no formatting, no entity source
    pub fn offline() -> Self {
        Self {
            renderer: Box::new(MiniJinjaRenderer::new()),
            formatter: Box::new(NoopFormatter),
            fetcher: None,
        }
    }

    /// Offline collaborators plus an HTTP entity source when a token is set
    pub fn from_options(options: &WatchOptions) -> Self {
        let fetcher = options.entities_token.as_ref().map(|token| {
            Box::new(HttpEntityFetcher::new(options.entities_url.clone(), token.clone()))
                as Box<dyn EntityFetcher>
        });
        Self {
            fetcher,
            ..Self::offline()
        }
    }

    pub fn with_renderer(mut self, renderer: Box<dyn Renderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_formatter(mut self, formatter: Box<dyn Formatter>) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn with_fetcher(mut self, fetcher: Box<dyn EntityFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }
}

impl Default for Collaborators {
    fn default() -> Self {
        Self::offline()
    }
}

/// Watch driver
///
/// `build_all` compiles everything once; `run` does the same and then keeps
/// recompiling on changes until the running flag clears.
pub struct Watcher {
    options: WatchOptions,
    compiler: Compiler,
    scheduler: CompilationScheduler,
    phase: WatcherPhase,
}

impl Watcher {
    /// Resolve the root and build the pipeline; nothing is read or compiled yet.
    pub fn new(options: WatchOptions, collaborators: Collaborators) -> JinjaWatchResult<Self> {
        let root = options
            .root
            .canonicalize()
            .ok()
            .filter(|p| p.is_dir())
            .ok_or_else(|| JinjaWatchError::RootNotFound {
                path: options.root.clone(),
            })?;

        let entities = match collaborators.fetcher {
            Some(fetcher) => EntityCache::new(fetcher),
            None => EntityCache::disabled(),
        };
        let context = Arc::new(WatchContext::new(root, entities));
        let compiler = Compiler::new(context)
            .with_renderer(collaborators.renderer)
            .with_formatter(collaborators.formatter)
            .with_delimiters(options.delimiters.clone());
        let scheduler = CompilationScheduler::new(options.jobs)?;

        Ok(Self {
            options,
            compiler,
            scheduler,
            phase: WatcherPhase::Starting,
        })
    }

    /// Canonical root directory
    pub fn root(&self) -> &Path {
        self.compiler.context().root()
    }

    pub fn phase(&self) -> WatcherPhase {
        self.phase
    }

    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    /// Load config, refresh entities and compile every template once.
    pub fn build_all<F>(&self, on_event: F) -> JinjaWatchResult<BatchReport>
    where
        F: Fn(WatchEvent),
    {
        self.full_build(&on_event)
    }

    /// Build everything, then watch until `running` is cleared (blocking).
    pub fn run<F>(&mut self, running: Arc<AtomicBool>, on_event: F) -> JinjaWatchResult<()>
    where
        F: Fn(WatchEvent),
    {
        if self.phase != WatcherPhase::Starting {
            return Err(JinjaWatchError::WatcherStopped);
        }

        let startup = self.full_build(&on_event);
        let templates = match startup {
            Ok(report) => report.outcomes.len(),
            Err(e) => {
                self.phase = WatcherPhase::Stopped;
                return Err(e);
            }
        };

        let (tx, rx) = crossbeam_channel::unbounded();
        let root = self.root().to_path_buf();
        let config_path = self.compiler.context().config().path().to_path_buf();

        let subscription = {
            let event_root = root.clone();
            notify::recommended_watcher(move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    for change in classify(&event, &event_root, &config_path) {
                        // Receiver gone means we are shutting down
                        let _ = tx.send(change);
                    }
                }
                Err(e) => tracing::warn!(error = %e, "file watch error"),
            })
            .and_then(|mut watcher| {
                watcher.watch(&root, RecursiveMode::Recursive)?;
                Ok(watcher)
            })
        };
        let subscription = match subscription {
            Ok(subscription) => subscription,
            Err(e) => {
                self.phase = WatcherPhase::Stopped;
                return Err(e.into());
            }
        };

        self.phase = WatcherPhase::Running;
        tracing::info!(root = %root.display(), templates, "watching");
        on_event(WatchEvent::WatchStarted {
            root: root.display().to_string(),
            templates,
        });

        let mut queue = ChangeQueue::new(self.options.debounce);
        {
            let this = &*self;
            let batches = queue.drain(&rx, &running, || this.reload(&on_event));
            for batch in batches {
                this.process_batch(batch, &on_event);
            }
        }

        self.phase = WatcherPhase::ShuttingDown;
        drop(subscription);
        self.phase = WatcherPhase::Stopped;
        tracing::info!("watcher stopped");
        on_event(WatchEvent::Shutdown);
        Ok(())
    }

    fn full_build(&self, on_event: &impl Fn(WatchEvent)) -> JinjaWatchResult<BatchReport> {
        let templates = self.refresh_state(on_event)?;
        Ok(self.compile_batch(templates, Vec::new(), on_event))
    }

    /// Config change inside the loop: refresh and rebuild everything.
    fn reload(&self, on_event: &impl Fn(WatchEvent)) -> Vec<TemplatePath> {
        tracing::info!("global configuration changed");
        match self.refresh_state(on_event) {
            Ok(templates) => templates,
            Err(e) => {
                on_event(WatchEvent::Error {
                    message: e.to_string(),
                });
                Vec::new()
            }
        }
    }

    /// Reload config and entities, drop artifacts of skipped templates and
    /// return the templates left to compile.
    fn refresh_state(&self, on_event: &impl Fn(WatchEvent)) -> JinjaWatchResult<Vec<TemplatePath>> {
        let context = self.compiler.context();

        match context.config().load() {
            Ok(config) => {
                tracing::debug!(epoch = context.config().epoch(), "configuration loaded");
                on_event(WatchEvent::ConfigReloaded {
                    variables: config.variables().len(),
                    file_configs: config.file_config_count(),
                    skipped_files: config.skipped_files().count(),
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "keeping previous configuration");
                on_event(WatchEvent::ConfigRejected {
                    message: e.to_string(),
                });
            }
        }

        if context.entities().is_enabled() {
            match context.entities().refresh() {
                Ok(snapshot) => on_event(WatchEvent::EntitiesRefreshed {
                    count: snapshot.len(),
                }),
                Err(e) => {
                    tracing::warn!(error = %e, "entity data unavailable");
                    on_event(WatchEvent::EntitiesUnavailable {
                        reason: e.to_string(),
                    });
                }
            }
        }

        let config = context.config().snapshot();
        let (skipped, templates): (Vec<_>, Vec<_>) = discovery::walk(context.root())?
            .into_iter()
            .partition(|path| config.is_skipped(path));

        for path in skipped {
            match self.compiler.clear_artifacts(&path) {
                Ok(true) => on_event(WatchEvent::FileRemoved {
                    path: path.to_string(),
                }),
                Ok(false) => {}
                Err(e) => on_event(WatchEvent::Error {
                    message: format!("{path}: {e}"),
                }),
            }
        }
        Ok(templates)
    }

    fn process_batch(&self, batch: SettledBatch, on_event: &impl Fn(WatchEvent)) -> BatchReport {
        // Deletion is judged against the tree as it is now, not as it was
        // when the event fired
        let root = self.root();
        let SettledBatch {
            mut compile,
            removed,
        } = batch;
        let mut gone = Vec::new();
        for path in removed {
            if path.source_path(root).is_file() {
                compile.push(path);
            } else {
                gone.push(path);
            }
        }

        for path in &compile {
            on_event(WatchEvent::FileChanged {
                path: path.to_string(),
            });
        }
        self.compile_batch(compile, gone, on_event)
    }

    fn compile_batch(
        &self,
        compile: Vec<TemplatePath>,
        gone: Vec<TemplatePath>,
        on_event: &impl Fn(WatchEvent),
    ) -> BatchReport {
        on_event(WatchEvent::BatchStarted {
            size: compile.len(),
        });
        let started = Instant::now();

        let mut report = self.scheduler.run(&self.compiler, &compile);
        for path in gone {
            if let Err(e) = self.compiler.clear_artifacts(&path) {
                on_event(WatchEvent::Error {
                    message: format!("{path}: {e}"),
                });
            }
            report.outcomes.push((path, CompileOutcome::Removed));
        }

        for (path, outcome) in &report.outcomes {
            on_event(outcome_event(self.root(), path, outcome));
        }
        tracing::debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            compiled = report.compiled(),
            failed = report.failed(),
            "batch complete"
        );
        on_event(WatchEvent::BatchComplete {
            compiled: report.compiled(),
            skipped: report.skipped(),
            failed: report.failed(),
            removed: report.removed(),
        });
        report
    }
}

impl std::fmt::Debug for Watcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watcher")
            .field("root", &self.root())
            .field("phase", &self.phase)
            .field("scheduler", &self.scheduler)
            .finish()
    }
}

fn outcome_event(root: &Path, path: &TemplatePath, outcome: &CompileOutcome) -> WatchEvent {
    let path = path.to_string();
    match outcome {
        CompileOutcome::Success { output } => WatchEvent::Compiled {
            path,
            output: output.strip_prefix(root).unwrap_or(output).display().to_string(),
        },
        CompileOutcome::Skipped => WatchEvent::Skipped { path },
        CompileOutcome::Failure { reason } => WatchEvent::CompileFailed {
            path,
            message: reason.clone(),
        },
        CompileOutcome::Removed => WatchEvent::FileRemoved { path },
    }
}

/// Translate one notification into queue events.
///
/// Only template files and the global config document are of interest. A
/// directory that appears yields a create for every template inside it; other
/// directory events are dropped. A rename counts as a delete of its source
/// and a create of its destination.
pub fn classify(event: &Event, root: &Path, config_path: &Path) -> Vec<ChangeEvent> {
    let at = Instant::now();
    let kinds: Vec<(&PathBuf, ChangeKind)> = match event.kind {
        EventKind::Create(_) => event.paths.iter().map(|p| (p, ChangeKind::Created)).collect(),
        EventKind::Remove(_) => event.paths.iter().map(|p| (p, ChangeKind::Deleted)).collect(),
        EventKind::Modify(ModifyKind::Name(mode)) => match mode {
            RenameMode::From => event.paths.iter().map(|p| (p, ChangeKind::Deleted)).collect(),
            RenameMode::To => event.paths.iter().map(|p| (p, ChangeKind::Created)).collect(),
            RenameMode::Both => {
                let mut kinds = Vec::new();
                if let Some(from) = event.paths.first() {
                    kinds.push((from, ChangeKind::Deleted));
                }
                if let Some(to) = event.paths.get(1) {
                    kinds.push((to, ChangeKind::Created));
                }
                kinds
            }
            _ => event
                .paths
                .iter()
                .map(|p| {
                    let kind = if p.exists() {
                        ChangeKind::Modified
                    } else {
                        ChangeKind::Deleted
                    };
                    (p, kind)
                })
                .collect(),
        },
        EventKind::Modify(_) => event.paths.iter().map(|p| (p, ChangeKind::Modified)).collect(),
        _ => Vec::new(),
    };

    let mut changes = Vec::new();
    for (path, kind) in kinds {
        if path == config_path {
            changes.push(ChangeEvent {
                subject: ChangeSubject::GlobalConfig,
                kind,
                at,
            });
        } else if path.is_dir() {
            // A directory moved or copied in brings its templates with it
            if kind == ChangeKind::Created {
                changes.extend(
                    discovery::walk_under(root, path)
                        .into_iter()
                        .map(|template| ChangeEvent::template_at(template, kind, at)),
                );
            }
        } else if let Some(template) = TemplatePath::from_absolute(root, path) {
            changes.push(ChangeEvent::template_at(template, kind, at));
        }
    }
    changes
}
