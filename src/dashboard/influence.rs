use std::sync::Arc;

use anyhow::{Context, Result, ensure};
use log::{debug, warn};

use crate::engine::{EngineError, InfluenceResult, NodeId, Payload, RemoteCall, SeriesPoint};

use super::Tracked;

pub const DEFAULT_SEED_COUNT: i64 = 5;

/// A finished spread simulation together with the seeds it was asked to start from
/// (`None` when the engine picked them).
#[derive(Clone, Debug, PartialEq)]
pub struct SpreadOutcome {
    pub seeds: Option<Vec<NodeId>>,
    pub result: InfluenceResult,
}

impl SpreadOutcome {
    /// Influence count per simulation step.
    pub fn series(&self) -> Vec<SeriesPoint> {
        self.result
            .counts
            .iter()
            .enumerate()
            .map(|(step, count)| (step as f64, *count))
            .collect()
    }
}

/// Blank input means "let the engine choose"; otherwise a comma-separated list of ids.
pub fn parse_seed_list(raw: &str) -> Result<Option<Vec<NodeId>>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    let seeds = raw
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<NodeId>()
                .with_context(|| format!("seed {part:?} is not a node id"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok((!seeds.is_empty()).then_some(seeds))
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct InfluenceQuery {
    best_seeds: Tracked<Vec<NodeId>>,
    spread: Tracked<Arc<SpreadOutcome>>,
}

impl InfluenceQuery {
    pub fn best_seeds(&self) -> &Tracked<Vec<NodeId>> {
        &self.best_seeds
    }

    pub fn spread(&self) -> &Tracked<Arc<SpreadOutcome>> {
        &self.spread
    }

    pub(super) fn begin_best_seeds(&mut self, n: i64) -> Result<RemoteCall> {
        ensure!(n >= 1, "seed count must be a positive integer, got {n}");
        self.best_seeds = Tracked::loading();
        Ok(RemoteCall::best_seed_nodes(n))
    }

    pub(super) fn complete_best_seeds(&mut self, outcome: Result<Payload, EngineError>) {
        self.best_seeds = match outcome.and_then(Payload::into_nodes) {
            Ok(seeds) => {
                debug!("best seeds: {seeds:?}");
                Tracked::ready(seeds)
            }
            Err(error) => {
                warn!("best seed search failed: {error}");
                Tracked::failed(error.to_string())
            }
        };
    }

    pub(super) fn begin_spread(&mut self, seeds: Option<&[NodeId]>) -> RemoteCall {
        self.spread = Tracked::loading();
        RemoteCall::simulate_influence_spread(seeds.unwrap_or_default())
    }

    pub(super) fn complete_spread(
        &mut self,
        seeds: Option<Vec<NodeId>>,
        outcome: Result<Payload, EngineError>,
    ) {
        self.spread = match outcome.and_then(Payload::into_influence) {
            Ok(result) => {
                debug!("spread simulation over {} step(s)", result.counts.len());
                Tracked::ready(Arc::new(SpreadOutcome { seeds, result }))
            }
            Err(error) => {
                warn!("spread simulation failed: {error}");
                Tracked::failed(error.to_string())
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::engine::Subgraph;

    use super::super::Status;
    use super::*;

    #[test]
    fn parses_seed_lists() {
        assert_eq!(parse_seed_list("").expect("blank"), None);
        assert_eq!(parse_seed_list("   ").expect("blank"), None);
        assert_eq!(
            parse_seed_list("1, 2,3").expect("valid list"),
            Some(vec![1, 2, 3])
        );
        assert_eq!(parse_seed_list("7,").expect("trailing comma"), Some(vec![7]));
        assert!(parse_seed_list("1,x").is_err());
    }

    #[test]
    fn seed_count_must_be_positive() {
        let mut query = InfluenceQuery::default();
        assert!(query.begin_best_seeds(0).is_err());
        assert_eq!(query.best_seeds().status(), Status::Idle);

        let call = query.begin_best_seeds(DEFAULT_SEED_COUNT).expect("positive");
        assert_eq!(call.param("n"), Some(&json!(5)));
        assert_eq!(query.best_seeds().status(), Status::Loading);
    }

    #[test]
    fn random_seed_sends_empty_list() {
        let mut query = InfluenceQuery::default();
        let call = query.begin_spread(None);
        assert_eq!(call.param("initial_nodes"), Some(&json!([])));

        let call = query.begin_spread(Some(&[4, 9]));
        assert_eq!(call.param("initial_nodes"), Some(&json!([4, 9])));
    }

    #[test]
    fn spread_keeps_counts_as_series() {
        let mut query = InfluenceQuery::default();
        query.begin_spread(Some(&[1]));
        query.complete_spread(
            Some(vec![1]),
            Ok(Payload::Influence(InfluenceResult {
                subgraph: Subgraph::from_edges([(1, 2, 1.0)]),
                counts: vec![1.0, 2.0],
            })),
        );

        let outcome = query.spread().current().expect("ready");
        assert_eq!(outcome.series(), vec![(0.0, 1.0), (1.0, 2.0)]);
        assert_eq!(outcome.seeds.as_deref(), Some(&[1][..]));
    }
}
