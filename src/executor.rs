//! Parallel dispatch of per-file hashing work.
//!
//! The finder never talks to a concurrency runtime directly. It hands a list
//! of [`FileEntry`] tasks and a hashing closure to an [`Executor`] and gets
//! every task back paired with its result. Both bundled executors return
//! results in task order, which keeps group numbering independent of the
//! worker count.
//!
//! # Example
//!
//! ```
//! use dupescan::executor::{executor_for, Executor};
//!
//! let executor = executor_for(4).unwrap();
//! assert_eq!(executor.workers(), 4);
//! ```

use rayon::prelude::*;

use crate::scanner::{FileEntry, Hash, HashError};

/// Hashing closure run once per task.
pub type HashWork<'a> = dyn Fn(&FileEntry) -> Result<Hash, HashError> + Sync + 'a;

/// A finished task: the entry and what hashing it produced.
pub type HashOutcome = (FileEntry, Result<Hash, HashError>);

/// Runs hashing work over a batch of files.
///
/// Implementations must call `work` exactly once per task and return one
/// outcome per task. A failing task must not prevent the others from running.
pub trait Executor: Send + Sync {
    /// Degree of parallelism.
    fn workers(&self) -> usize;

    /// Run `work` over every task and return the paired outcomes.
    fn run(&self, tasks: Vec<FileEntry>, work: &HashWork<'_>) -> Vec<HashOutcome>;
}

/// Errors raised while setting up an executor.
#[derive(thiserror::Error, Debug)]
pub enum ExecutorError {
    /// Worker count was zero.
    #[error("Worker count must be at least 1")]
    ZeroWorkers,

    /// The rayon thread pool could not be created.
    #[error("Failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Runs every task on the calling thread, in order.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialExecutor;

impl Executor for SequentialExecutor {
    fn workers(&self) -> usize {
        1
    }

    fn run(&self, tasks: Vec<FileEntry>, work: &HashWork<'_>) -> Vec<HashOutcome> {
        tasks
            .into_iter()
            .map(|file| {
                let result = work(&file);
                (file, result)
            })
            .collect()
    }
}

/// Runs tasks on a dedicated rayon pool of fixed size.
///
/// The pool is private to this executor so that hashing parallelism is
/// bounded regardless of what the global rayon pool is doing.
pub struct ThreadPoolExecutor {
    pool: rayon::ThreadPool,
    workers: usize,
}

impl std::fmt::Debug for ThreadPoolExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadPoolExecutor")
            .field("workers", &self.workers)
            .finish_non_exhaustive()
    }
}

impl ThreadPoolExecutor {
    /// Build a pool with `workers` threads.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::ZeroWorkers`] for a zero count, or
    /// [`ExecutorError::ThreadPool`] if the threads cannot be spawned.
    pub fn new(workers: usize) -> Result<Self, ExecutorError> {
        if workers == 0 {
            return Err(ExecutorError::ZeroWorkers);
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("dupescan-hash-{i}"))
            .build()?;
        log::debug!("Created hashing pool with {} threads", workers);
        Ok(Self { pool, workers })
    }
}

impl Executor for ThreadPoolExecutor {
    fn workers(&self) -> usize {
        self.workers
    }

    fn run(&self, tasks: Vec<FileEntry>, work: &HashWork<'_>) -> Vec<HashOutcome> {
        // Indexed collect keeps task order whatever the completion order.
        self.pool.install(|| {
            tasks
                .into_par_iter()
                .map(|file| {
                    let result = work(&file);
                    (file, result)
                })
                .collect()
        })
    }
}

/// Pick the executor for a worker count: sequential for 1, a pool otherwise.
///
/// # Errors
///
/// Returns [`ExecutorError`] for a zero count or if the pool cannot be built.
pub fn executor_for(workers: usize) -> Result<Box<dyn Executor>, ExecutorError> {
    match workers {
        0 => Err(ExecutorError::ZeroWorkers),
        1 => Ok(Box::new(SequentialExecutor)),
        n => Ok(Box::new(ThreadPoolExecutor::new(n)?)),
    }
}
