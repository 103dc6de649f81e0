//! Bounded worker pool for asynchronous tasks.
//!
//! A fixed number of worker loops pull jobs from one shared FIFO queue, so at
//! most `concurrency` submitted tasks run at any instant. Each submission gets
//! its own [`TaskHandle`] that resolves exactly once with the task's output.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::FutureExt;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::{ExecutorError, ValidationError};

type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

pub struct BoundedExecutor {
    sender: Option<mpsc::UnboundedSender<Job>>,
    workers: Vec<JoinHandle<()>>,
    concurrency: usize,
}

impl BoundedExecutor {
    /// Starts `concurrency` worker loops on the current Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::FieldMustBePositive`] when `concurrency` is 0.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn new(concurrency: usize) -> Result<Self, ValidationError> {
        if concurrency == 0 {
            return Err(ValidationError::FieldMustBePositive {
                field: "concurrency",
            });
        }

        let (sender, receiver) = mpsc::unbounded_channel::<Job>();
        let receiver = Arc::new(Mutex::new(receiver));
        let workers = (0..concurrency)
            .map(|worker_id| {
                let receiver = Arc::clone(&receiver);
                tokio::spawn(async move {
                    loop {
                        let job = receiver.lock().await.recv().await;
                        match job {
                            Some(job) => job.await,
                            None => break,
                        }
                    }
                    debug!("Executor worker {} stopped", worker_id);
                })
            })
            .collect();

        Ok(Self {
            sender: Some(sender),
            workers,
            concurrency,
        })
    }

    #[must_use]
    pub const fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Queues `task` and returns a handle to its eventual output.
    ///
    /// The task starts once a worker is free, after every task queued before
    /// it. A panic inside the task resolves only its own handle with
    /// [`ExecutorError::TaskPanicked`].
    pub fn enqueue<F, T>(&self, task: F) -> TaskHandle<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (result_tx, result_rx) = oneshot::channel();
        let job: Job = Box::pin(async move {
            let outcome = AssertUnwindSafe(task)
                .catch_unwind()
                .await
                .map_err(|_panic| ExecutorError::TaskPanicked);
            if result_tx.send(outcome).is_err() {
                debug!("Task handle dropped before completion");
            }
        });

        if let Some(sender) = self.sender.as_ref()
            && sender.send(job).is_err()
        {
            debug!("Executor queue closed; task dropped");
        }

        TaskHandle {
            receiver: result_rx,
        }
    }

    /// Stops accepting work, lets queued tasks drain, and waits for every
    /// worker to exit.
    ///
    /// # Errors
    ///
    /// Returns the join error of a worker that failed to shut down.
    pub async fn shutdown(mut self) -> Result<(), tokio::task::JoinError> {
        drop(self.sender.take());
        for worker in self.workers.drain(..) {
            worker.await?;
        }
        Ok(())
    }
}

/// Resolves once with the output of one enqueued task.
pub struct TaskHandle<T> {
    receiver: oneshot::Receiver<Result<T, ExecutorError>>,
}

impl<T> Future for TaskHandle<T> {
    type Output = Result<T, ExecutorError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|received| match received {
                Ok(outcome) => outcome,
                Err(_closed) => Err(ExecutorError::Closed),
            })
    }
}
