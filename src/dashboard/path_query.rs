use std::sync::Arc;

use anyhow::{Result, anyhow};
use log::{debug, warn};

use crate::engine::{EngineError, NodeId, PathResult, Payload, RemoteCall};

use super::Tracked;

/// Shortest distance and shortest path for the currently entered node pair. Results are
/// tied to the pair: changing either node drops them, including answers still in flight.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathQuery {
    node1: Option<NodeId>,
    node2: Option<NodeId>,
    epoch: u64,
    distance: Tracked<f64>,
    route: Tracked<Arc<PathResult>>,
}

impl PathQuery {
    pub fn node1(&self) -> Option<NodeId> {
        self.node1
    }

    pub fn node2(&self) -> Option<NodeId> {
        self.node2
    }

    pub fn distance(&self) -> &Tracked<f64> {
        &self.distance
    }

    pub fn route(&self) -> &Tracked<Arc<PathResult>> {
        &self.route
    }

    pub(super) fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn set_node1(&mut self, node: Option<NodeId>) {
        if self.node1 != node {
            self.node1 = node;
            self.invalidate();
        }
    }

    pub fn set_node2(&mut self, node: Option<NodeId>) {
        if self.node2 != node {
            self.node2 = node;
            self.invalidate();
        }
    }

    pub(super) fn invalidate(&mut self) {
        self.epoch += 1;
        self.distance = Tracked::idle();
        self.route = Tracked::idle();
    }

    fn pair(&self) -> Result<(NodeId, NodeId)> {
        let start = self.node1.ok_or_else(|| anyhow!("node 1 is not set"))?;
        let end = self.node2.ok_or_else(|| anyhow!("node 2 is not set"))?;
        Ok((start, end))
    }

    pub(super) fn begin_distance(&mut self) -> Result<RemoteCall> {
        let (start, end) = self.pair()?;
        self.distance = Tracked::loading();
        Ok(RemoteCall::shortest_distance(start, end))
    }

    pub(super) fn begin_path(&mut self) -> Result<RemoteCall> {
        let (start, end) = self.pair()?;
        self.route = Tracked::loading();
        Ok(RemoteCall::shortest_path(start, end))
    }

    fn is_stale(&self, epoch: u64, what: &str) -> bool {
        if epoch == self.epoch {
            return false;
        }
        debug!("dropping {what} answer for a node pair that is no longer entered");
        true
    }

    pub(super) fn complete_distance(&mut self, epoch: u64, outcome: Result<Payload, EngineError>) {
        if self.is_stale(epoch, "distance") {
            return;
        }

        self.distance = match outcome.and_then(Payload::into_scalar) {
            Ok(distance) => Tracked::ready(distance),
            Err(error) => {
                warn!("shortest distance failed: {error}");
                Tracked::failed(error.to_string())
            }
        };
    }

    /// A failed path also fails the distance: both answer the same endpoints.
    pub(super) fn complete_path(&mut self, epoch: u64, outcome: Result<Payload, EngineError>) {
        if self.is_stale(epoch, "path") {
            return;
        }

        match outcome.and_then(Payload::into_path) {
            Ok(result) => {
                debug!(
                    "shortest path of {} node(s) over {} edge(s)",
                    result.path.len(),
                    result.subgraph.edge_count()
                );
                self.route = Tracked::ready(Arc::new(result));
            }
            Err(error) => {
                warn!("shortest path failed: {error}");
                self.route = Tracked::failed(error.to_string());
                self.distance = Tracked::failed(format!("shortest path failed: {error}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::Subgraph;

    use super::super::Status;
    use super::*;

    fn with_pair(node1: NodeId, node2: NodeId) -> PathQuery {
        let mut query = PathQuery::default();
        query.set_node1(Some(node1));
        query.set_node2(Some(node2));
        query
    }

    fn path_payload() -> Payload {
        Payload::Path(PathResult {
            subgraph: Subgraph::from_edges([(1, 2, 1.0), (2, 4, 2.0)]),
            path: vec![1, 2, 4],
        })
    }

    #[test]
    fn requires_both_nodes() {
        let mut query = PathQuery::default();
        query.set_node1(Some(1));
        assert!(query.begin_distance().is_err());
        assert!(query.begin_path().is_err());
        assert_eq!(query.distance().status(), Status::Idle);
    }

    #[test]
    fn path_failure_also_fails_distance() {
        let mut query = with_pair(1, 4);
        query.begin_distance().expect("pair set");
        let epoch = query.epoch();
        query.complete_distance(epoch, Ok(Payload::Scalar(3.0)));
        assert_eq!(query.distance().current(), Some(&3.0));

        query.begin_path().expect("pair set");
        query.complete_path(epoch, Err(EngineError::Remote("unreachable".to_owned())));

        assert_eq!(query.route().status(), Status::Failed);
        assert_eq!(query.distance().status(), Status::Failed);
        assert_eq!(query.distance().current(), None);
    }

    #[test]
    fn editing_a_node_resets_results() {
        let mut query = with_pair(1, 4);
        query.begin_path().expect("pair set");
        let epoch = query.epoch();
        query.complete_path(epoch, Ok(path_payload()));
        assert_eq!(query.route().status(), Status::Ready);

        query.set_node2(Some(5));
        assert_eq!(query.route().status(), Status::Idle);
        assert_eq!(query.distance().status(), Status::Idle);
        assert!(query.route().current().is_none());
    }

    #[test]
    fn setting_the_same_node_keeps_results() {
        let mut query = with_pair(1, 4);
        query.begin_distance().expect("pair set");
        let epoch = query.epoch();
        query.complete_distance(epoch, Ok(Payload::Scalar(2.0)));

        query.set_node1(Some(1));
        assert_eq!(query.distance().current(), Some(&2.0));
    }

    #[test]
    fn answers_for_an_old_pair_are_dropped() {
        let mut query = with_pair(1, 4);
        query.begin_path().expect("pair set");
        let old_epoch = query.epoch();

        query.set_node1(Some(2));
        query.complete_path(old_epoch, Ok(path_payload()));

        assert_eq!(query.route().status(), Status::Idle);
    }
}
