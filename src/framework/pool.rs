//! A fixed number of worker slots gating how many tasks run at once.

use std::sync::Arc;

use tokio::{
    sync::{OwnedSemaphorePermit, Semaphore},
    task::{AbortHandle, JoinSet},
};

/// A counting gate of exactly `size` slots. Tasks spawned through it hold a slot until they finish.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    size: usize,
}

impl WorkerPool {
    /// Creates a [`WorkerPool`] of `size` slots. A size of zero is raised to one.
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    /// The number of slots.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The number of slots currently free.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Waits until a slot is free and takes it. The slot is released when the permit is dropped.
    ///
    /// # Panics
    ///
    /// Panics if the underlying semaphore is closed, which never happens.
    pub async fn acquire(&self) -> OwnedSemaphorePermit {
        self.semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("worker pool semaphore is never closed")
    }

    /// Waits for a free slot, then spawns `task` onto `tasks`.
    ///
    /// The slot is held until `task` completes.
    ///
    /// # Panics
    ///
    /// See [`Self::acquire`].
    pub async fn spawn<F>(&self, tasks: &mut JoinSet<F::Output>, task: F) -> AbortHandle
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let slot = self.acquire().await;
        tasks.spawn(async move {
            let output = task.await;
            drop(slot);
            output
        })
    }
}
