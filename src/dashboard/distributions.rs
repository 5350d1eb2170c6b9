use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Result, anyhow, ensure};
use log::{debug, warn};
use serde_json::Value;

use crate::engine::{EngineError, Payload, RemoteCall, ResultShape, SeriesPoint};

use super::Status;
use super::catalog::{DistributionSpec, ParameterSpec};

#[derive(Clone, Debug, PartialEq)]
pub struct DistributionEntry {
    pub id: String,
    pub display_name: String,
    pub operation: String,
    pub x_label: String,
    pub y_label: String,
    pub parameter_spec: Option<ParameterSpec>,
    /// Parameter sent with the latest request; `None` is sent as `null`.
    pub parameter: Option<i64>,
    pub status: Status,
    pub series: Arc<Vec<SeriesPoint>>,
    pub error: Option<String>,
}

impl DistributionEntry {
    fn idle(spec: &DistributionSpec) -> Self {
        Self {
            id: spec.id.clone(),
            display_name: spec.display_name.clone(),
            operation: spec.operation.clone(),
            x_label: spec.x_label.clone(),
            y_label: spec.y_label.clone(),
            parameter_spec: spec.parameter.clone(),
            parameter: None,
            status: Status::Idle,
            series: Arc::new(Vec::new()),
            error: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status.is_loading()
    }

    pub fn current_series(&self) -> Option<&Arc<Vec<SeriesPoint>>> {
        (self.status == Status::Ready).then_some(&self.series)
    }

    fn with_series(
        &self,
        status: Status,
        series: Arc<Vec<SeriesPoint>>,
        error: Option<String>,
    ) -> Self {
        Self {
            status,
            series,
            error,
            ..self.clone()
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DistributionRegistry {
    order: Vec<String>,
    entries: HashMap<String, DistributionEntry>,
}

impl DistributionRegistry {
    pub fn from_specs(specs: &[DistributionSpec]) -> Self {
        let order = specs.iter().map(|spec| spec.id.clone()).collect();
        let entries = specs
            .iter()
            .map(|spec| (spec.id.clone(), DistributionEntry::idle(spec)))
            .collect();
        Self { order, entries }
    }

    #[cfg(test)]
    pub fn get(&self, id: &str) -> Option<&DistributionEntry> {
        self.entries.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DistributionEntry> + '_ {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    fn entry(&self, id: &str) -> Result<&DistributionEntry> {
        self.entries
            .get(id)
            .ok_or_else(|| anyhow!("unknown distribution {id}"))
    }

    fn replace(&mut self, entry: DistributionEntry) {
        self.entries.insert(entry.id.clone(), entry);
    }

    /// The parameter is forwarded verbatim for parameterized entries and ignored for
    /// the others.
    pub(super) fn begin(&mut self, id: &str, parameter: Option<i64>) -> Result<RemoteCall> {
        let entry = self.entry(id)?;
        ensure!(
            matches!(entry.status, Status::Idle | Status::Loading),
            "distribution {id} is {}; reset it before fetching again",
            entry.status.label()
        );
        let mut call = RemoteCall::new(entry.operation.clone(), ResultShape::Series);

        let parameter = match &entry.parameter_spec {
            Some(spec) => {
                call = call.with_param(spec.name.clone(), parameter.map_or(Value::Null, Value::from));
                parameter
            }
            None => {
                if parameter.is_some() {
                    debug!("distribution {id} takes no parameter; ignoring {parameter:?}");
                }
                None
            }
        };

        let loading = DistributionEntry {
            parameter,
            ..entry.with_series(Status::Loading, Arc::new(Vec::new()), None)
        };
        self.replace(loading);
        Ok(call)
    }

    pub(super) fn complete(&mut self, id: &str, outcome: Result<Payload, EngineError>) {
        let Ok(entry) = self.entry(id) else {
            warn!("dropping result for unknown distribution {id}");
            return;
        };

        let next = match outcome.and_then(Payload::into_series) {
            Ok(series) => {
                debug!("distribution {id}: {} point(s)", series.len());
                entry.with_series(Status::Ready, Arc::new(series), None)
            }
            Err(error) => {
                warn!("distribution {id} ({}) failed: {error}", entry.operation);
                entry.with_series(Status::Failed, Arc::new(Vec::new()), Some(error.to_string()))
            }
        };
        self.replace(next);
    }

    pub(super) fn rearm(&mut self, id: &str) -> Result<()> {
        let entry = self.entry(id)?;
        let idle = entry.with_series(Status::Idle, Arc::new(Vec::new()), None);
        self.replace(idle);
        Ok(())
    }
}
