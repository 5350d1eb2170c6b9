use std::collections::{HashMap, HashSet};

use eframe::egui::{Pos2, Vec2, vec2};

use crate::engine::{NodeId, Subgraph};
use crate::util::stable_pair;

pub(in crate::app) struct GraphScene {
    pub(in crate::app) nodes: Vec<SceneNode>,
    pub(in crate::app) edges: Vec<SceneEdge>,
    pub(in crate::app) max_weight: f64,
    pub(in crate::app) scratch: ViewScratch,
}

pub(in crate::app) struct SceneNode {
    pub(in crate::app) id: NodeId,
    pub(in crate::app) world_pos: Vec2,
    pub(in crate::app) velocity: Vec2,
    pub(in crate::app) radius: f32,
    pub(in crate::app) highlighted: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct SceneEdge {
    pub(in crate::app) from: usize,
    pub(in crate::app) to: usize,
    pub(in crate::app) weight: f64,
}

impl SceneEdge {
    pub(in crate::app) fn is_loop(&self) -> bool {
        self.from == self.to
    }
}

#[derive(Default)]
pub(in crate::app) struct ViewScratch {
    pub(in crate::app) screen_positions: Vec<Pos2>,
    pub(in crate::app) screen_radii: Vec<f32>,
}

impl GraphScene {
    const BASE_RADIUS: f32 = 9.0;
    const HIGHLIGHT_RADIUS: f32 = 13.0;

    /// One node per id in the subgraph, one edge per (source, target, weight) entry.
    pub(in crate::app) fn build(subgraph: &Subgraph, highlighted: &HashSet<NodeId>) -> Self {
        let ids = subgraph.node_ids();
        let spread = (ids.len() as f32).sqrt() * 48.0;

        let nodes = ids
            .iter()
            .enumerate()
            .map(|(index, id)| {
                let highlighted = highlighted.contains(id);
                SceneNode {
                    id: *id,
                    world_pos: Self::initial_position(*id, index) * spread,
                    velocity: Vec2::ZERO,
                    radius: if highlighted {
                        Self::HIGHLIGHT_RADIUS
                    } else {
                        Self::BASE_RADIUS
                    },
                    highlighted,
                }
            })
            .collect::<Vec<_>>();

        let index_by_id = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id, index))
            .collect::<HashMap<_, _>>();

        let edges = subgraph
            .edges()
            .filter_map(|(source, target, weight)| {
                Some(SceneEdge {
                    from: *index_by_id.get(&source)?,
                    to: *index_by_id.get(&target)?,
                    weight,
                })
            })
            .collect::<Vec<_>>();

        let max_weight = edges
            .iter()
            .map(|edge| edge.weight.abs())
            .fold(0.0, f64::max);

        Self {
            nodes,
            edges,
            max_weight,
            scratch: ViewScratch::default(),
        }
    }

    fn initial_position(id: NodeId, index: usize) -> Vec2 {
        let (jx, jy) = stable_pair(id);
        let direction = vec2(jx, jy);
        if direction.length_sq() <= 0.0001 {
            let angle = ((index as f32) * 0.618_034 + 0.11) * std::f32::consts::TAU;
            vec2(angle.cos(), angle.sin())
        } else {
            direction
        }
    }

    /// Weight relative to the heaviest edge, in [0, 1].
    pub(in crate::app) fn weight_share(&self, edge: &SceneEdge) -> f32 {
        if self.max_weight <= f64::EPSILON {
            return 0.0;
        }
        (edge.weight.abs() / self.max_weight) as f32
    }

    /// Stroke width for an edge, scaled by its weight relative to the heaviest edge.
    pub(in crate::app) fn edge_width(&self, edge: &SceneEdge) -> f32 {
        if self.max_weight <= f64::EPSILON {
            return 1.5;
        }
        1.0 + self.weight_share(edge) * 4.0
    }
}
