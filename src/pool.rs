//! Render worker pool.
//!
//! Consumes [`RenderJob`]s from a conduit and posts one [`RenderResult`] per
//! job to a shared result conduit. Each accepted job becomes its own task;
//! how many tasks may run at once depends on [`Concurrency`]:
//!
//! | Setting | Execution |
//! |---------|-----------|
//! | `Unbounded` | one scoped OS thread per job, no cap |
//! | `Limited(n)` | a dedicated [rayon](https://docs.rs/rayon) pool of `n` threads |
//! | `Auto` | `Limited(cores × 2)` |
//!
//! ## Completion Barrier
//!
//! Tasks are spawned inside a scope (`std::thread::scope` or
//! `rayon::ThreadPool::in_place_scope`). The scope only returns after every
//! task has finished, and the result sender is dropped only after the scope
//! returns. A consumer reading results until the conduit closes therefore
//! sees every result, including the slowest one.
//!
//! ## One Result Per Job
//!
//! A task always sends a result: renderer errors become `Failed`, a panicking
//! renderer is caught and reported as [`ArticleError::Panicked`], and a
//! thread that cannot be spawned is reported as [`ArticleError::Spawn`].

use crate::config::Concurrency;
use crate::render::{ArticleError, ArticleRenderer, RenderJob, RenderResult};
use std::any::Any;
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{Receiver, SyncSender};
use std::thread;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PoolError {
    #[error("failed to build render thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Render every job received on `jobs`, posting results to `results`.
///
/// Returns once `jobs` is closed and every spawned task has posted its
/// result. `results` is dropped on return, closing the result conduit.
pub fn run_pool<R: ArticleRenderer>(
    renderer: &R,
    concurrency: Concurrency,
    jobs: Receiver<RenderJob>,
    results: SyncSender<RenderResult>,
) -> Result<(), PoolError> {
    match concurrency.limit() {
        None => {
            tracing::debug!("render pool: one thread per job, unbounded");
            run_unbounded(renderer, jobs, &results);
            Ok(())
        }
        Some(workers) => {
            tracing::debug!(workers = workers.get(), "render pool: bounded");
            run_limited(renderer, workers, jobs, &results)
        }
    }
}

fn run_unbounded<R: ArticleRenderer>(
    renderer: &R,
    jobs: Receiver<RenderJob>,
    results: &SyncSender<RenderResult>,
) {
    thread::scope(|s| {
        for job in jobs {
            let input = job.input.clone();
            let task_results = results.clone();
            let spawned = thread::Builder::new()
                .name("render".into())
                .spawn_scoped(s, move || {
                    let _ = task_results.send(render_one(renderer, &job));
                });
            if let Err(err) = spawned {
                let _ = results.send(RenderResult::Failed {
                    input,
                    error: ArticleError::Spawn(err),
                });
            }
        }
    });
}

fn run_limited<R: ArticleRenderer>(
    renderer: &R,
    workers: NonZeroUsize,
    jobs: Receiver<RenderJob>,
    results: &SyncSender<RenderResult>,
) -> Result<(), PoolError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.get())
        .thread_name(|i| format!("render-{i}"))
        .build()?;

    pool.in_place_scope(|s| {
        for job in jobs {
            let task_results = results.clone();
            s.spawn(move |_| {
                let _ = task_results.send(render_one(renderer, &job));
            });
        }
    });
    Ok(())
}

/// Render a single job, turning a panic into a failed result.
fn render_one<R: ArticleRenderer>(renderer: &R, job: &RenderJob) -> RenderResult {
    tracing::debug!(input = %job.input.display(), "rendering");
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| renderer.render(job)))
        .unwrap_or_else(|payload| Err(ArticleError::Panicked(panic_message(payload.as_ref()))));
    RenderResult::from_outcome(job, outcome)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
