//! Bounded-parallel batch compilation
//!
//! A batch is fanned out over a fixed-size worker pool and `run` returns only
//! once every path in it has an outcome. Within a batch paths finish in any
//! order; batches themselves never overlap because the caller waits on `run`.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::compiler::{CompileOutcome, Compiler};
use crate::error::{JinjaWatchError, JinjaWatchResult};
use crate::paths::TemplatePath;

/// Outcomes of one batch, in the order the batch listed its paths
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub outcomes: Vec<(TemplatePath, CompileOutcome)>,
}

impl BatchReport {
    pub fn compiled(&self) -> usize {
        self.count(|o| matches!(o, CompileOutcome::Success { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, CompileOutcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, CompileOutcome::Failure { .. }))
    }

    pub fn removed(&self) -> usize {
        self.count(|o| matches!(o, CompileOutcome::Removed))
    }

    /// Check if every compile succeeded or was skipped
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, pred: impl Fn(&CompileOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| pred(o)).count()
    }
}

/// Default worker count: the machine's available parallelism
pub fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Runs compile batches on a dedicated pool
pub struct CompilationScheduler {
    pool: ThreadPool,
}

impl CompilationScheduler {
    /// Pool with `jobs` workers (at least one).
    pub fn new(jobs: usize) -> JinjaWatchResult<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(jobs.max(1))
            .thread_name(|i| format!("jinja-watch-worker-{i}"))
            .build()
            .map_err(|e| JinjaWatchError::Scheduler(e.to_string()))?;
        Ok(Self { pool })
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Compile every path in `batch`, blocking until all are done.
    pub fn run(&self, compiler: &Compiler, batch: &[TemplatePath]) -> BatchReport {
        self.run_with(batch, |path| compiler.compile(path))
    }

    /// Apply `task` to every path in `batch` on the pool.
    ///
    /// Each path's outcome is collected independently; a failure in one never
    /// stops the others.
    pub fn run_with<F>(&self, batch: &[TemplatePath], task: F) -> BatchReport
    where
        F: Fn(&TemplatePath) -> CompileOutcome + Sync,
    {
        let outcomes = self.pool.install(|| {
            batch
                .par_iter()
                .map(|path| (path.clone(), task(path)))
                .collect()
        });
        BatchReport { outcomes }
    }
}

impl std::fmt::Debug for CompilationScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompilationScheduler")
            .field("workers", &self.workers())
            .finish()
    }
}
