use std::collections::HashSet;

use crate::dashboard::SpreadOutcome;
use crate::engine::{NodeId, PathResult, Subgraph};

mod build;
mod interaction;
mod view;

pub(in crate::app) use build::GraphScene;
pub(in crate::app) use view::GraphView;

/// A result that can be drawn as a node-link graph.
pub(in crate::app) trait GraphSource {
    fn subgraph(&self) -> &Subgraph;
    fn highlighted(&self) -> HashSet<NodeId>;
}

impl GraphSource for PathResult {
    fn subgraph(&self) -> &Subgraph {
        &self.subgraph
    }

    fn highlighted(&self) -> HashSet<NodeId> {
        self.path.iter().copied().collect()
    }
}

impl GraphSource for SpreadOutcome {
    fn subgraph(&self) -> &Subgraph {
        &self.result.subgraph
    }

    fn highlighted(&self) -> HashSet<NodeId> {
        self.seeds.iter().flatten().copied().collect()
    }
}
