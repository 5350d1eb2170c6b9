use std::collections::HashMap;

use anyhow::{Result, anyhow, ensure};
use log::{debug, warn};

use crate::engine::{EngineError, Payload, RemoteCall, ResultShape};

use super::Status;
use super::catalog::MetricSpec;

#[derive(Clone, Debug, PartialEq)]
pub struct MetricEntry {
    pub id: String,
    pub display_name: String,
    pub operation: String,
    pub status: Status,
    pub value: f64,
    pub error: Option<String>,
}

impl MetricEntry {
    fn idle(spec: &MetricSpec) -> Self {
        Self {
            id: spec.id.clone(),
            display_name: spec.display_name.clone(),
            operation: spec.operation.clone(),
            status: Status::Idle,
            value: 0.0,
            error: None,
        }
    }

    /// The value, only once it has been fetched.
    pub fn current_value(&self) -> Option<f64> {
        (self.status == Status::Ready).then_some(self.value)
    }

    fn with_status(&self, status: Status, value: f64, error: Option<String>) -> Self {
        Self {
            status,
            value,
            error,
            ..self.clone()
        }
    }
}

/// Scalar metrics keyed by id, in catalog order.
#[derive(Clone, Debug, PartialEq)]
pub struct MetricRegistry {
    order: Vec<String>,
    entries: HashMap<String, MetricEntry>,
}

impl MetricRegistry {
    pub fn from_specs(specs: &[MetricSpec]) -> Self {
        let order = specs.iter().map(|spec| spec.id.clone()).collect();
        let entries = specs
            .iter()
            .map(|spec| (spec.id.clone(), MetricEntry::idle(spec)))
            .collect();
        Self { order, entries }
    }

    #[cfg(test)]
    pub fn get(&self, id: &str) -> Option<&MetricEntry> {
        self.entries.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricEntry> + '_ {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    fn entry(&self, id: &str) -> Result<&MetricEntry> {
        self.entries
            .get(id)
            .ok_or_else(|| anyhow!("unknown metric {id}"))
    }

    fn replace(&mut self, entry: MetricEntry) {
        self.entries.insert(entry.id.clone(), entry);
    }

    pub(super) fn begin(&mut self, id: &str) -> Result<RemoteCall> {
        let entry = self.entry(id)?;
        ensure!(
            matches!(entry.status, Status::Idle | Status::Loading),
            "metric {id} is {}; reset it before fetching again",
            entry.status.label()
        );
        let call = RemoteCall::new(entry.operation.clone(), ResultShape::Scalar);
        let loading = entry.with_status(Status::Loading, 0.0, None);
        self.replace(loading);
        Ok(call)
    }

    pub(super) fn complete(&mut self, id: &str, outcome: Result<Payload, EngineError>) {
        let Ok(entry) = self.entry(id) else {
            warn!("dropping result for unknown metric {id}");
            return;
        };

        let next = match outcome.and_then(Payload::into_scalar) {
            Ok(value) => {
                debug!("metric {id} = {value}");
                entry.with_status(Status::Ready, value, None)
            }
            Err(error) => {
                warn!("metric {id} ({}) failed: {error}", entry.operation);
                entry.with_status(Status::Failed, 0.0, Some(error.to_string()))
            }
        };
        self.replace(next);
    }

    pub(super) fn rearm(&mut self, id: &str) -> Result<()> {
        let entry = self.entry(id)?;
        let idle = entry.with_status(Status::Idle, 0.0, None);
        self.replace(idle);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::catalog::Catalog;
    use super::*;

    fn registry() -> MetricRegistry {
        MetricRegistry::from_specs(&Catalog::builtin().metrics)
    }

    #[test]
    fn keeps_catalog_order() {
        let ids = registry()
            .iter()
            .map(|entry| entry.id.clone())
            .collect::<Vec<_>>();
        assert_eq!(ids.first().map(String::as_str), Some("nodes"));
        assert_eq!(ids.len(), 8);
    }

    #[test]
    fn failure_resets_value_to_default() {
        let mut metrics = registry();
        metrics.begin("avg_dg").expect("known metric");
        metrics.complete("avg_dg", Ok(Payload::Scalar(3.5)));
        assert_eq!(metrics.get("avg_dg").and_then(MetricEntry::current_value), Some(3.5));

        metrics.rearm("avg_dg").expect("known metric");
        metrics.begin("avg_dg").expect("known metric");
        metrics.complete("avg_dg", Err(EngineError::Remote("boom".to_owned())));

        let entry = metrics.get("avg_dg").expect("entry exists");
        assert_eq!(entry.status, Status::Failed);
        assert_eq!(entry.value, 0.0);
        assert_eq!(entry.current_value(), None);
    }

    #[test]
    fn unknown_id_is_rejected() {
        let mut metrics = registry();
        let before = metrics.clone();
        assert!(metrics.begin("diameter").is_err());
        assert_eq!(metrics, before);
    }

    #[test]
    fn non_scalar_payload_fails_the_entry() {
        let mut metrics = registry();
        metrics.begin("nodes").expect("known metric");
        metrics.complete("nodes", Ok(Payload::Series(vec![(0.0, 1.0)])));
        assert_eq!(
            metrics.get("nodes").map(|entry| entry.status),
            Some(Status::Failed)
        );
    }
}
