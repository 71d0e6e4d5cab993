//! Structured task group with first-failure cancellation.
//!
//! Tasks are spawned onto the tokio runtime through a cloneable
//! [`Spawner`]; [`TaskGroup::wait`] returns once every task has finished
//! and either every spawner is gone or the group is cancelled. The first
//! failing task cancels the group.

use anyhow::{Result, anyhow};
use futures_util::stream::{FuturesUnordered, StreamExt};
use log::debug;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

type TaskHandle = JoinHandle<Result<()>>;

struct Shared {
    cancelled: watch::Sender<bool>,
}

impl Shared {
    fn cancel(&self) {
        self.cancelled.send_replace(true);
    }

    fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }
}

/// Handle for adding tasks to a [`TaskGroup`].
#[derive(Clone)]
pub struct Spawner {
    tx: mpsc::UnboundedSender<TaskHandle>,
    shared: Arc<Shared>,
}

impl Spawner {
    /// Spawns `task` into the group.
    ///
    /// Returns false without spawning once the group is cancelled. A task
    /// that has not started when cancellation arrives never runs.
    pub fn spawn<F>(&self, task: F) -> bool
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        if self.shared.is_cancelled() {
            debug!("Task group cancelled, not spawning");
            return false;
        }
        let mut cancelled = self.shared.cancelled.subscribe();
        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = async {
                    let _ = cancelled.wait_for(|cancelled| *cancelled).await;
                } => Ok(()),
                result = task => result,
            }
        });
        if let Err(mpsc::error::SendError(handle)) = self.tx.send(handle) {
            handle.abort();
            return false;
        }
        true
    }

    pub fn cancel(&self) {
        self.shared.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.is_cancelled()
    }
}

pub struct TaskGroup {
    spawner: Spawner,
    shared: Arc<Shared>,
    rx: mpsc::UnboundedReceiver<TaskHandle>,
}

impl Default for TaskGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskGroup {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (cancelled, _) = watch::channel(false);
        let shared = Arc::new(Shared { cancelled });
        Self {
            spawner: Spawner {
                tx,
                shared: Arc::clone(&shared),
            },
            shared,
            rx,
        }
    }

    pub fn spawner(&self) -> Spawner {
        self.spawner.clone()
    }

    pub fn spawn<F>(&self, task: F) -> bool
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        self.spawner.spawn(task)
    }

    /// Waits for every task, including ones spawned while waiting.
    ///
    /// Returns the first error (a panic counts as one) after cancelling the
    /// remaining tasks.
    pub async fn wait(self) -> Result<()> {
        let TaskGroup {
            spawner,
            shared,
            mut rx,
        } = self;
        drop(spawner);

        let mut cancelled = shared.cancelled.subscribe();
        let mut running = FuturesUnordered::new();
        let mut accepting = true;
        let mut first_error: Option<anyhow::Error> = None;
        loop {
            tokio::select! {
                handle = rx.recv(), if accepting => match handle {
                    Some(handle) => running.push(handle),
                    None => accepting = false,
                },
                _ = async {
                    let _ = cancelled.wait_for(|cancelled| *cancelled).await;
                }, if accepting => {
                    // Spawns are refused from here on; collect what was queued.
                    while let Ok(handle) = rx.try_recv() {
                        running.push(handle);
                    }
                    accepting = false;
                }
                Some(joined) = running.next(), if !running.is_empty() => {
                    let result = joined.unwrap_or_else(|e| Err(anyhow!("Task failed: {}", e)));
                    if let Err(e) = result {
                        if first_error.is_none() {
                            debug!("Cancelling task group: {:#}", e);
                            shared.cancel();
                            first_error = Some(e);
                        } else {
                            debug!("Discarding error after cancellation: {:#}", e);
                        }
                    }
                }
                else => break,
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
