use thiserror::Error;

/// Errors surfaced by the engine and its configuration layer.
///
/// Collision misses from failed stickiness draws are not errors; they are
/// counted outcomes of normal operation. Abort is likewise not an error but
/// a controlled, observable termination.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Rejected synchronously at configuration time, never mid-run.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Operation requested in a state that forbids it, e.g. `clear` while a
    /// run is active.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// A position already in the aggregate was about to be inserted again.
    /// This indicates a concurrency bug, not a recoverable runtime
    /// condition; the run is terminated rather than the insert being
    /// silently ignored.
    #[error("duplicate attachment at {0}")]
    DuplicateAttachment(String),

    /// The worker thread panicked instead of returning an outcome.
    #[error("worker thread terminated abnormally")]
    WorkerFailed,

    #[error("config file i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("config file parse: {0}")]
    Json(#[from] serde_json::Error),
}
