//! Fixed-size worker pools connecting two bounded queues
//!
//! A pool owns its worker tasks, a shared handle on the input queue, and the
//! original sender of the output queue. Workers pull until the input queue is
//! closed and drained. The output queue closes only when [`WorkerPool::join`]
//! has seen every worker exit and releases the sender it holds, so a worker
//! finishing early can never close the queue under its siblings.

use crate::model::{ItemOutcome, StageTally};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;

/// Input queue shared by every worker of a pool
///
/// The lock is held only while waiting for the next item.
pub type SharedReceiver<T> = Arc<Mutex<mpsc::Receiver<T>>>;

/// Result of processing one item
#[derive(Debug)]
pub struct Step<O> {
    pub outcome: ItemOutcome,
    pub forward: Option<O>,
}

impl<O> Step<O> {
    /// The item continues downstream
    pub fn forward(outcome: ItemOutcome, item: O) -> Self {
        Self {
            outcome,
            forward: Some(item),
        }
    }

    /// The item ends here
    pub fn resolved(outcome: ItemOutcome) -> Self {
        Self {
            outcome,
            forward: None,
        }
    }
}

/// Per-item behaviour of a pool
pub trait StageWorker<I, O>: Send + Sync + 'static {
    fn process(&self, item: I) -> impl Future<Output = Step<O>> + Send;

    /// Called when a forwarded item could not be delivered because the
    /// output queue was closed
    fn undelivered(&self, _item: O) {}
}

/// A running pool of identical workers
pub struct WorkerPool<O> {
    stage: &'static str,
    size: usize,
    workers: JoinSet<StageTally>,
    output: Option<mpsc::Sender<O>>,
}

impl<O: Send + 'static> WorkerPool<O> {
    /// Spawns `size` workers (at least one) reading `input` and writing `output`
    pub fn spawn<I, W>(
        stage: &'static str,
        size: usize,
        input: mpsc::Receiver<I>,
        output: mpsc::Sender<O>,
        worker: Arc<W>,
    ) -> Self
    where
        I: Send + 'static,
        W: StageWorker<I, O>,
    {
        let size = size.max(1);
        let input: SharedReceiver<I> = Arc::new(Mutex::new(input));
        let mut workers = JoinSet::new();

        for id in 0..size {
            workers.spawn(worker_loop(
                stage,
                id,
                Arc::clone(&input),
                output.clone(),
                Arc::clone(&worker),
            ));
        }

        tracing::debug!("Spawned {} {} workers", size, stage);

        Self {
            stage,
            size,
            workers,
            output: Some(output),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Completion barrier: waits for every worker, then closes the output queue
    ///
    /// Returns the merged tally of all workers. A worker that panicked is
    /// logged and contributes nothing.
    pub async fn join(mut self) -> StageTally {
        let mut tally = StageTally::default();

        while let Some(result) = self.workers.join_next().await {
            match result {
                Ok(worker_tally) => tally += worker_tally,
                Err(e) => tracing::error!("A {} worker terminated abnormally: {}", self.stage, e),
            }
        }

        drop(self.output.take());
        tracing::info!(
            "{} stage finished: {} items processed, {} forwarded",
            self.stage,
            tally.processed(),
            tally.passed + tally.extracted
        );

        tally
    }
}

async fn worker_loop<I, O, W>(
    stage: &'static str,
    id: usize,
    input: SharedReceiver<I>,
    output: mpsc::Sender<O>,
    worker: Arc<W>,
) -> StageTally
where
    I: Send + 'static,
    O: Send + 'static,
    W: StageWorker<I, O>,
{
    let mut tally = StageTally::default();

    loop {
        let next = {
            let mut receiver = input.lock().await;
            receiver.recv().await
        };
        let Some(item) = next else {
            break;
        };

        let step = worker.process(item).await;
        tally.record(step.outcome);

        if let Some(forward) = step.forward {
            if let Err(mpsc::error::SendError(item)) = output.send(forward).await {
                tracing::warn!("{} worker {}: downstream queue closed", stage, id);
                tally.undelivered += 1;
                worker.undelivered(item);
            }
        }
    }

    tracing::trace!("{} worker {} exiting", stage, id);
    tally
}
