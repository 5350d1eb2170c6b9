use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use serde_json::Value;

use super::{EngineError, Payload, RemoteCall, ResultShape, decode};

pub type RawOutcome = Result<Value, EngineError>;

/// Typed call boundary to the analytics engine. Implementations answer on their own
/// threads; callers poll the returned [`PendingCall`].
pub trait Gateway: Send + Sync {
    fn invoke(&self, call: RemoteCall) -> PendingCall;
}

pub struct PendingCall {
    operation: String,
    shape: ResultShape,
    rx: Receiver<RawOutcome>,
}

impl PendingCall {
    pub fn channel(call: &RemoteCall) -> (Sender<RawOutcome>, Self) {
        let (tx, rx) = mpsc::channel();
        (
            tx,
            Self {
                operation: call.operation.clone(),
                shape: call.shape,
                rx,
            },
        )
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Returns `None` while the engine has not answered. The raw answer is decoded into
    /// the shape the call expects.
    pub fn try_take(&self) -> Option<Result<Payload, EngineError>> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome.and_then(|value| decode(self.shape, value))),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(EngineError::Disconnected)),
        }
    }
}
