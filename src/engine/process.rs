use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

use anyhow::{Context, Result, anyhow};
use log::{debug, warn};

use super::gateway::{Gateway, PendingCall, RawOutcome};
use super::protocol::{RemoteCall, WireRequest, WireResponse};
use super::EngineError;

/// Engine running as a child process, speaking newline-delimited JSON over its
/// stdin/stdout. Answers may come back in any order and are matched by request id.
pub struct ProcessGateway {
    program: String,
    child: Mutex<Child>,
    stdin: Mutex<ChildStdin>,
    waiting: Arc<Mutex<Waiting>>,
    next_id: AtomicU64,
}

#[derive(Default)]
struct Waiting {
    closed: bool,
    senders: HashMap<u64, Sender<RawOutcome>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ProcessGateway {
    pub fn spawn(program: &str, args: &[String]) -> Result<Self> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .with_context(|| format!("failed to spawn engine {program} with args: {args:?}"))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("engine {program} has no stdin pipe"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("engine {program} has no stdout pipe"))?;

        let waiting = Arc::new(Mutex::new(Waiting::default()));
        let reader_waiting = Arc::clone(&waiting);
        thread::Builder::new()
            .name("engine-reader".to_owned())
            .spawn(move || read_responses(stdout, &reader_waiting))
            .context("failed to start engine reader thread")?;

        debug!("spawned engine {program} (pid {})", child.id());

        Ok(Self {
            program: program.to_owned(),
            child: Mutex::new(child),
            stdin: Mutex::new(stdin),
            waiting,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn fail(&self, id: u64, error: EngineError) {
        if let Some(tx) = lock(&self.waiting).senders.remove(&id) {
            let _ = tx.send(Err(error));
        }
    }
}

impl Gateway for ProcessGateway {
    fn invoke(&self, call: RemoteCall) -> PendingCall {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, pending) = PendingCall::channel(&call);

        {
            let mut waiting = lock(&self.waiting);
            if waiting.closed {
                let _ = tx.send(Err(EngineError::Disconnected));
                return pending;
            }
            waiting.senders.insert(id, tx);
        }

        let request = WireRequest {
            id,
            op: &call.operation,
            params: &call.params,
        };
        let line = match serde_json::to_string(&request) {
            Ok(line) => line,
            Err(error) => {
                self.fail(id, EngineError::Io(error.to_string()));
                return pending;
            }
        };

        debug!("engine call #{id}: {}", call.operation);
        let written = {
            let mut stdin = lock(&self.stdin);
            writeln!(stdin, "{line}").and_then(|()| stdin.flush())
        };
        if let Err(error) = written {
            warn!("failed to send {} to engine {}: {error}", call.operation, self.program);
            self.fail(id, EngineError::Io(error.to_string()));
        }

        pending
    }
}

impl Drop for ProcessGateway {
    fn drop(&mut self) {
        let mut child = lock(&self.child);
        if let Err(error) = child.kill() {
            debug!("engine {} already exited: {error}", self.program);
        }
        let _ = child.wait();
    }
}

fn read_responses(stdout: ChildStdout, waiting: &Mutex<Waiting>) {
    for line in BufReader::new(stdout).lines() {
        let line = match line {
            Ok(line) => line,
            Err(error) => {
                warn!("failed to read engine output: {error}");
                break;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<WireResponse>(trimmed) {
            Ok(response) => response,
            Err(error) => {
                warn!("ignoring unparsable engine output ({error}): {trimmed}");
                continue;
            }
        };

        let id = response.id;
        let sender = lock(waiting).senders.remove(&id);
        match sender {
            Some(tx) => {
                debug!("engine answered #{id}");
                let _ = tx.send(response.into_outcome());
            }
            None => warn!("engine answered unknown request #{id}"),
        }
    }

    let orphaned = {
        let mut waiting = lock(waiting);
        waiting.closed = true;
        waiting.senders.drain().collect::<Vec<_>>()
    };
    debug!(
        "engine output closed with {} call(s) still waiting",
        orphaned.len()
    );
    for (_id, tx) in orphaned {
        let _ = tx.send(Err(EngineError::Disconnected));
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::time::{Duration, Instant};

    use super::super::{Payload, ResultShape, operations};
    use super::*;

    fn shell_engine(script: &str) -> ProcessGateway {
        ProcessGateway::spawn("sh", &["-c".to_owned(), script.to_owned()])
            .expect("sh is available")
    }

    fn wait_for(pending: &PendingCall) -> Result<Payload, EngineError> {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(outcome) = pending.try_take() {
                return outcome;
            }
            assert!(Instant::now() < deadline, "engine did not answer in time");
            thread::sleep(Duration::from_millis(5));
        }
    }

    const ID_OF_A: &str = r#"ida=${a#*\"id\":}; ida=${ida%%,*};"#;
    const ID_OF_B: &str = r#"idb=${b#*\"id\":}; idb=${idb%%,*};"#;

    #[test]
    fn answers_are_matched_by_id_out_of_order() {
        let script = format!(
            r#"read a; read b; {ID_OF_A} {ID_OF_B} echo "{{\"id\":$idb,\"result\":2}}"; echo "{{\"id\":$ida,\"result\":1}}"; read c"#
        );
        let gateway = shell_engine(&script);

        let first = gateway.invoke(RemoteCall::new(operations::NODE_COUNT, ResultShape::Scalar));
        let second = gateway.invoke(RemoteCall::new(operations::EDGE_COUNT, ResultShape::Scalar));

        assert_eq!(wait_for(&second), Ok(Payload::Scalar(2.0)));
        assert_eq!(wait_for(&first), Ok(Payload::Scalar(1.0)));
    }

    #[test]
    fn engine_error_is_reported_as_remote() {
        let script = format!(
            r#"read a; {ID_OF_A} echo "{{\"id\":$ida,\"error\":\"no dataset loaded\"}}"; read c"#
        );
        let gateway = shell_engine(&script);

        let pending = gateway.invoke(RemoteCall::new(operations::MAX_DEGREE, ResultShape::Scalar));
        assert_eq!(
            wait_for(&pending),
            Err(EngineError::Remote("no dataset loaded".to_owned()))
        );
    }

    #[test]
    fn exit_fails_waiting_calls() {
        let gateway = shell_engine("read a; exit 0");

        let pending = gateway.invoke(RemoteCall::load_dataset("graph.tsv"));
        assert_eq!(wait_for(&pending), Err(EngineError::Disconnected));

        let late = gateway.invoke(RemoteCall::new(operations::NODE_COUNT, ResultShape::Scalar));
        assert!(wait_for(&late).is_err());
    }

    #[test]
    fn missing_program_is_a_startup_error() {
        let error = ProcessGateway::spawn("network-analyzer-no-such-engine", &[])
            .err()
            .expect("spawn fails");
        assert!(error.to_string().contains("failed to spawn engine"));
    }
}
