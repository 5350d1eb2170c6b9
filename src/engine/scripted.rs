use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::gateway::{Gateway, PendingCall, RawOutcome};
use super::protocol::RemoteCall;

/// In-memory engine for tests: records every call and lets the test decide when and
/// how each one is answered.
#[derive(Default)]
pub(crate) struct ScriptedGateway {
    calls: Mutex<Vec<ScriptedCall>>,
}

struct ScriptedCall {
    call: RemoteCall,
    responder: Option<Sender<RawOutcome>>,
}

impl ScriptedGateway {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn calls_guard(&self) -> MutexGuard<'_, Vec<ScriptedCall>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn calls(&self) -> Vec<RemoteCall> {
        self.calls_guard()
            .iter()
            .map(|scripted| scripted.call.clone())
            .collect()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls_guard().len()
    }

    pub(crate) fn last_call(&self) -> Option<RemoteCall> {
        self.calls_guard().last().map(|scripted| scripted.call.clone())
    }

    /// Answers the call at `index` (in issue order). Panics if it was already answered.
    pub(crate) fn respond(&self, index: usize, outcome: RawOutcome) {
        let responder = self.calls_guard()[index]
            .responder
            .take()
            .expect("call already answered");
        let _ = responder.send(outcome);
    }

    /// Answers the oldest unanswered call to `operation`.
    pub(crate) fn respond_to(&self, operation: &str, outcome: RawOutcome) {
        let responder = self
            .calls_guard()
            .iter_mut()
            .find(|scripted| scripted.call.operation == operation && scripted.responder.is_some())
            .and_then(|scripted| scripted.responder.take())
            .unwrap_or_else(|| panic!("no unanswered call to {operation}"));
        let _ = responder.send(outcome);
    }
}

impl Gateway for ScriptedGateway {
    fn invoke(&self, call: RemoteCall) -> PendingCall {
        let (tx, pending) = PendingCall::channel(&call);
        self.calls_guard().push(ScriptedCall {
            call,
            responder: Some(tx),
        });
        pending
    }
}
