use thiserror::Error;

/// Failure of a single remote call. Kept `Clone` so a failure can be stored on the
/// entity it belongs to.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The engine answered with an error message.
    #[error("engine error: {0}")]
    Remote(String),
    /// The engine answered, but the payload did not have the expected shape.
    #[error("malformed engine payload: {0}")]
    Malformed(String),
    /// The engine process or the reply channel went away before an answer arrived.
    #[error("engine disconnected before answering")]
    Disconnected,
    /// The request could not be written to the engine.
    #[error("failed to reach engine: {0}")]
    Io(String),
}

impl EngineError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }
}
