use anyhow::{Result, ensure};
use log::{info, warn};

use crate::engine::{EngineError, Payload, RemoteCall};

use super::Status;

/// Dataset-load lifecycle. Every submission starts a new epoch; anything issued under an
/// older epoch is stale.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Session {
    status: Status,
    dataset_path: String,
    error: Option<String>,
    epoch: u64,
}

impl Session {
    pub fn status(&self) -> Status {
        self.status
    }

    pub fn dataset_path(&self) -> &str {
        &self.dataset_path
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_ready(&self) -> bool {
        self.status == Status::Ready
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub(super) fn begin(&mut self, path: &str) -> Result<RemoteCall> {
        let path = path.trim();
        ensure!(!path.is_empty(), "dataset path must not be empty");
        ensure!(
            self.status != Status::Loading,
            "dataset {} is still loading",
            self.dataset_path
        );

        *self = Self {
            status: Status::Loading,
            dataset_path: path.to_owned(),
            error: None,
            epoch: self.epoch + 1,
        };
        info!("loading dataset {path}");

        Ok(RemoteCall::load_dataset(path))
    }

    pub(super) fn complete(&mut self, outcome: Result<Payload, EngineError>) {
        let next = match outcome {
            Ok(_) => {
                info!("dataset {} ready", self.dataset_path);
                Self {
                    status: Status::Ready,
                    error: None,
                    ..self.clone()
                }
            }
            Err(error) => {
                warn!("failed to load dataset {}: {error}", self.dataset_path);
                Self {
                    status: Status::Failed,
                    error: Some(error.to_string()),
                    ..self.clone()
                }
            }
        };
        *self = next;
    }
}
