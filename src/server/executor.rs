//! Execution strategies for connection work.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

/// One accepted connection's worth of work.
pub type Work = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Runs the work the server submits for each accepted connection.
#[async_trait]
pub trait Executor: Send + Sync + 'static {
    /// Hand over a unit of work. The accept loop waits for this to return
    /// before accepting the next connection.
    async fn submit(&self, work: Work);

    /// Whether a `submit` still pending when the server stops may be
    /// dropped, and its connection with it. Executors that run the work
    /// inside `submit` return `false` so the connection is finished first.
    fn abandon_on_stop(&self) -> bool {
        true
    }
}

/// Runs each unit of work on the accept loop itself, one connection at a
/// time.
#[derive(Debug, Default, Clone, Copy)]
pub struct Inline;

#[async_trait]
impl Executor for Inline {
    async fn submit(&self, work: Work) {
        work.await;
    }

    fn abandon_on_stop(&self) -> bool {
        false
    }
}

/// Spawns a task per connection, with no limit on concurrency.
#[derive(Debug, Default, Clone, Copy)]
pub struct Spawn;

#[async_trait]
impl Executor for Spawn {
    async fn submit(&self, work: Work) {
        tokio::spawn(work);
    }
}

/// A fixed set of worker tasks fed through a bounded queue.
///
/// `submit` waits while the queue is full, which holds back the accept loop
/// until a slot frees up or the server stops. Dropping the pool closes the
/// queue; workers finish what was queued and exit.
pub struct WorkerPool {
    queue: mpsc::Sender<Work>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Start `workers` tasks sharing a queue of `queue_capacity` slots.
    /// Both are raised to at least one.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(workers: usize, queue_capacity: usize) -> Self {
        let (queue, receiver) = mpsc::channel::<Work>(queue_capacity.max(1));
        let receiver = Arc::new(Mutex::new(receiver));

        let workers = (0..workers.max(1))
            .map(|id| {
                let receiver = receiver.clone();
                tokio::spawn(async move {
                    loop {
                        // Hold the lock only while waiting for the next item.
                        let next = receiver.lock().await.recv().await;
                        let Some(work) = next else { break };

                        // A panicking unit must not take the worker down with it.
                        if let Err(e) = tokio::spawn(work).await {
                            warn!("Worker {id}: connection task failed: {e}");
                        }
                    }
                    debug!("Worker {id} exiting");
                })
            })
            .collect();

        Self { queue, workers }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }
}

#[async_trait]
impl Executor for WorkerPool {
    async fn submit(&self, work: Work) {
        if self.queue.send(work).await.is_err() {
            warn!("Worker pool is closed; dropping connection");
        }
    }
}
