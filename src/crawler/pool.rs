//! Bounded worker pool
//!
//! A pool runs one batch of keyed tasks with at most `limit` of them in
//! flight, and hands back `(key, output)` pairs in completion order. Every
//! call to [`WorkerPool::run`] gets its own semaphore, so a task may drive a
//! nested batch on a second pool without competing for its own permits.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

/// A named concurrency limit for one level of the crawl
#[derive(Debug, Clone)]
pub struct WorkerPool {
    name: &'static str,
    limit: usize,
}

impl WorkerPool {
    /// Creates a pool
    ///
    /// `limit` is clamped to at least 1; configuration validation rejects 0
    /// before a pool is ever built.
    pub fn new(name: &'static str, limit: usize) -> Self {
        Self {
            name,
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Submits every task and collects outputs as they complete
    ///
    /// Outputs arrive over a channel keyed by each task's identity, so the
    /// returned order is completion order, not submission order. A task that
    /// panics is logged and contributes nothing.
    pub async fn run<K, R, Fut>(&self, tasks: Vec<(K, Fut)>) -> Vec<(K, R)>
    where
        K: Send + 'static,
        R: Send + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        let submitted = tasks.len();
        let semaphore = Arc::new(Semaphore::new(self.limit));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut workers = JoinSet::new();

        for (key, task) in tasks {
            let semaphore = Arc::clone(&semaphore);
            let tx = tx.clone();
            workers.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return;
                };
                let output = task.await;
                // The collector only stops listening once every sender is gone
                let _ = tx.send((key, output));
            });
        }
        drop(tx);

        let mut completed = Vec::with_capacity(submitted);
        while let Some(done) = rx.recv().await {
            completed.push(done);
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                tracing::error!("{} worker failed: {}", self.name, e);
            }
        }

        if completed.len() < submitted {
            tracing::warn!(
                "{} pool finished {} of {} tasks",
                self.name,
                completed.len(),
                submitted
            );
        }

        completed
    }
}
