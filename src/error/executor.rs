use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("Executor is closed.")]
    Closed,
    #[error("Task panicked before completing.")]
    TaskPanicked,
}
