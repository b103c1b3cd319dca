//! Where root tasks run: on the calling thread or on a scoped worker pool.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};
use versus_core::{Evaluator, Position};

use crate::error::SearchError;
use crate::search::context::SearchContext;

/// Runs a batch of root tasks, each against a [`SearchContext`].
///
/// `execute` returns once every task has finished or been abandoned. A task
/// that panics is reported as [`SearchError::WorkerPanicked`].
pub trait ExecutionContext<P: Position, E: Evaluator<P>> {
    /// The context of the calling thread, positioned at the search root.
    fn context(&mut self) -> &mut SearchContext<P, E>;

    /// Run `tasks` to completion.
    fn execute<F>(&mut self, tasks: Vec<F>) -> Result<(), SearchError>
    where
        F: FnOnce(&mut SearchContext<P, E>) + Send;
}

/// Runs tasks one after the other on the calling thread.
#[derive(Debug)]
pub struct SingleThread<P, E> {
    context: SearchContext<P, E>,
}

impl<P: Position, E: Evaluator<P>> SingleThread<P, E> {
    /// Run tasks against `context`.
    pub fn new(context: SearchContext<P, E>) -> Self {
        Self { context }
    }

    /// Give the context back.
    pub fn into_context(self) -> SearchContext<P, E> {
        self.context
    }
}

impl<P: Position, E: Evaluator<P>> ExecutionContext<P, E> for SingleThread<P, E> {
    fn context(&mut self) -> &mut SearchContext<P, E> {
        &mut self.context
    }

    fn execute<F>(&mut self, tasks: Vec<F>) -> Result<(), SearchError>
    where
        F: FnOnce(&mut SearchContext<P, E>) + Send,
    {
        for task in tasks {
            let context = &mut self.context;
            // The context may be mid-move after a panic: stop right there.
            panic::catch_unwind(AssertUnwindSafe(|| task(context))).map_err(|payload| {
                let message = panic_message(payload.as_ref());
                warn!(%message, "search task panicked");
                SearchError::WorkerPanicked { message }
            })?;
        }
        Ok(())
    }
}

/// Runs tasks on a pool of scoped worker threads.
///
/// Each call to `execute` forks the calling context once per worker; the
/// workers then pull tasks from a shared queue until it is empty. A panic
/// in one worker does not stop the others, and is reported after every
/// worker has been joined.
#[derive(Debug)]
pub struct MultiThread<P, E> {
    context: SearchContext<P, E>,
    workers: usize,
}

impl<P: Position, E: Evaluator<P>> MultiThread<P, E> {
    /// A pool of `workers` threads (at least one) forking `context`.
    pub fn new(context: SearchContext<P, E>, workers: usize) -> Self {
        Self {
            context,
            workers: workers.max(1),
        }
    }

    /// Number of worker threads.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Give the context back.
    pub fn into_context(self) -> SearchContext<P, E> {
        self.context
    }
}

impl<P: Position, E: Evaluator<P>> ExecutionContext<P, E> for MultiThread<P, E> {
    fn context(&mut self) -> &mut SearchContext<P, E> {
        &mut self.context
    }

    fn execute<F>(&mut self, tasks: Vec<F>) -> Result<(), SearchError>
    where
        F: FnOnce(&mut SearchContext<P, E>) + Send,
    {
        let workers = self.workers.min(tasks.len());
        if workers == 0 {
            return Ok(());
        }
        debug!(tasks = tasks.len(), workers, "dispatching root tasks");

        let queue = Mutex::new(tasks.into_iter());
        let forks: Vec<SearchContext<P, E>> = (0..workers).map(|_| self.context.fork()).collect();

        let failures: Vec<String> = std::thread::scope(|s| {
            let handles: Vec<_> = forks
                .into_iter()
                .map(|mut context| {
                    let queue = &queue;
                    s.spawn(move || {
                        loop {
                            let next = queue.lock().unwrap_or_else(PoisonError::into_inner).next();
                            match next {
                                Some(task) => task(&mut context),
                                None => break,
                            }
                        }
                    })
                })
                .collect();

            // Join every worker before reporting anything.
            handles
                .into_iter()
                .filter_map(|handle| handle.join().err())
                .map(|payload| panic_message(payload.as_ref()))
                .collect()
        });

        for message in &failures {
            warn!(%message, "search worker panicked");
        }
        match failures.into_iter().next() {
            Some(message) => Err(SearchError::WorkerPanicked { message }),
            None => Ok(()),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
