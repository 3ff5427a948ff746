use std::future::{poll_fn, Future};
use std::sync::{Mutex, MutexGuard};

use tokio::runtime::Handle;
use tokio::task::JoinSet;
use tracing::warn;

use crate::error::StoreError;

/// Background tasks owned by one component. Outstanding tasks are aborted on
/// `shutdown` or when the group is dropped.
#[derive(Debug)]
pub struct TaskGroup {
    runtime: Handle,
    tasks: Mutex<JoinSet<Result<(), StoreError>>>,
}

impl TaskGroup {
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            tasks: Mutex::new(JoinSet::new()),
        }
    }

    fn tasks(&self) -> MutexGuard<'_, JoinSet<Result<(), StoreError>>> {
        self.tasks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn spawn<F>(&self, label: &'static str, task: F)
    where
        F: Future<Output = Result<(), StoreError>> + Send + 'static,
    {
        let mut tasks = self.tasks();
        reap_finished(&mut tasks);
        tasks.spawn_on(
            async move {
                let result = task.await;
                if let Err(err) = &result {
                    warn!(task = label, error = %err, "background task failed");
                }
                result
            },
            &self.runtime,
        );
    }

    /// Number of tasks still running.
    pub fn len(&self) -> usize {
        let mut tasks = self.tasks();
        reap_finished(&mut tasks);
        tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Waits for every task spawned so far, including ones spawned while
    /// waiting. Returns the first failure still held by the group; aborted
    /// tasks are not failures. Tasks stay in the group while awaited, so
    /// `shutdown` and `len` keep seeing them.
    pub async fn wait_idle(&self) -> Result<(), StoreError> {
        let mut first_error: Option<StoreError> = None;
        // The lock is only held for a single poll, never across a suspension.
        while let Some(done) = poll_fn(|cx| self.tasks().poll_join_next(cx)).await {
            let err = match done {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => err,
                Err(join_err) if join_err.is_cancelled() => continue,
                Err(join_err) => StoreError::from(join_err),
            };
            first_error.get_or_insert(err);
        }
        first_error.map_or(Ok(()), Err)
    }

    pub fn shutdown(&self) {
        self.tasks().abort_all();
    }
}

fn reap_finished(tasks: &mut JoinSet<Result<(), StoreError>>) {
    // Failures were already logged by the task wrapper.
    while tasks.try_join_next().is_some() {}
}
