mod quadtree;

use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

use super::graph::GraphScene;
use quadtree::Cell;

/// Cells seen under a smaller angle than this are summarised by their centroid.
const THETA: f32 = 0.7;
/// Two nodes closer than this many summed radii push each other apart.
const CONTACT_FACTOR: f32 = 2.5;
const SPRING_BASE: f32 = 80.0;
/// Extra rest length for the heaviest edge; lighter edges get a share of it.
const SPRING_STRETCH: f32 = 120.0;
const TIME_STEP: f32 = 0.055;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct PhysicsConfig {
    pub(super) intensity: f32,
    pub(super) spring_scale: f32,
    pub(super) velocity_damping: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            intensity: 1.0,
            spring_scale: 1.0,
            velocity_damping: 0.88,
        }
    }
}

/// Node-node forces: inverse-square repulsion plus a linear push on overlap.
struct Repulsion {
    strength: f32,
    softening: f32,
    collision: f32,
    /// No two nodes farther apart than this can overlap.
    reach: f32,
}

impl Repulsion {
    fn between(&self, index: usize, other: usize, positions: &[Vec2], radii: &[f32]) -> Vec2 {
        let delta = positions[index] - positions[other];
        let distance = delta.length();
        let direction = if distance > 0.0001 {
            delta / distance
        } else {
            separation_axis(index, other)
        };

        let mut magnitude = self.strength / (distance * distance + self.softening);
        let contact = (radii[index] + radii[other]) * CONTACT_FACTOR;
        if distance < contact {
            magnitude += (contact - distance) * self.collision;
        }
        direction * magnitude
    }

    fn from_cell(&self, cell: &Cell, index: usize, positions: &[Vec2], radii: &[f32]) -> Vec2 {
        if cell.is_leaf() {
            return cell
                .members
                .iter()
                .filter(|&&other| other != index)
                .fold(Vec2::ZERO, |sum, &other| {
                    sum + self.between(index, other, positions, radii)
                });
        }

        let point = positions[index];
        let delta = point - cell.centroid;
        let distance = delta.length();
        let far = distance > self.reach
            && !cell.square.contains(point)
            && cell.square.side() / distance < THETA;
        if far {
            let magnitude = self.strength * cell.count as f32 / (distance * distance + self.softening);
            return delta / distance * magnitude;
        }

        cell.quadrants.iter().fold(Vec2::ZERO, |sum, quadrant| {
            sum + self.from_cell(quadrant, index, positions, radii)
        })
    }

    fn forces(&self, positions: &[Vec2], radii: &[f32]) -> Vec<Vec2> {
        match Cell::build(positions) {
            Some(root) => (0..positions.len())
                .map(|index| self.from_cell(&root, index, positions, radii))
                .collect(),
            None => vec![Vec2::ZERO; positions.len()],
        }
    }
}

/// Deterministic push direction for coincident nodes, opposite for the two sides of a pair.
fn separation_axis(index: usize, other: usize) -> Vec2 {
    let (low, high) = (index.min(other), index.max(other));
    let angle = ((low as f32) * 0.618_034 + (high as f32) * 0.414_214) * TAU;
    let axis = vec2(angle.cos(), angle.sin());
    if index < other { axis } else { -axis }
}

fn clamp_length(vector: Vec2, limit: f32) -> Vec2 {
    let length = vector.length();
    if length > limit {
        vector * (limit / length)
    } else {
        vector
    }
}

/// Advances the force layout by one tick. Returns whether any node is still moving.
pub(super) fn step_physics(scene: &mut GraphScene, config: PhysicsConfig) -> bool {
    if scene.nodes.is_empty() {
        return false;
    }

    let intensity = config.intensity.clamp(0.2, 2.5);
    let positions = scene.nodes.iter().map(|node| node.world_pos).collect::<Vec<_>>();
    let radii = scene.nodes.iter().map(|node| node.radius).collect::<Vec<_>>();
    let max_radius = radii.iter().copied().fold(0.0, f32::max);

    let repulsion = Repulsion {
        strength: 42_000.0 * intensity,
        softening: 400.0,
        collision: 1.6 * intensity,
        reach: max_radius * 2.0 * CONTACT_FACTOR,
    };
    let mut forces = repulsion.forces(&positions, &radii);

    let stiffness = 0.02 * intensity * config.spring_scale.clamp(0.2, 2.2);
    for edge in scene.edges.iter().filter(|edge| !edge.is_loop()) {
        let (from, to) = (edge.from, edge.to);
        let delta = positions[from] - positions[to];
        let distance = delta.length();
        if distance <= 0.0001 {
            continue;
        }
        let direction = delta / distance;

        let rest = SPRING_BASE
            + (radii[from] + radii[to]) * 2.0
            + SPRING_STRETCH * scene.weight_share(edge);
        let closing_speed = (scene.nodes[from].velocity - scene.nodes[to].velocity).dot(direction);
        let pull = direction * ((distance - rest) * stiffness + closing_speed * 0.22);

        forces[from] -= pull;
        forces[to] += pull;
    }

    let max_force = 165.0 + intensity * 90.0;
    let max_speed = 11.0 + intensity * 15.0;
    let damping = config.velocity_damping.clamp(0.6, 0.97);
    let mut moving = false;
    for (node, force) in scene.nodes.iter_mut().zip(forces) {
        let force = clamp_length(force - node.world_pos * 0.004, max_force);
        let velocity = clamp_length((node.velocity + force * TIME_STEP) * damping, max_speed);

        let settled = velocity.length() < 0.02 && force.length() < 0.08;
        node.velocity = if settled { Vec2::ZERO } else { velocity };
        node.world_pos += node.velocity;
        moving |= !settled;
    }

    moving
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::engine::Subgraph;

    use super::*;

    fn scene() -> GraphScene {
        GraphScene::build(
            &Subgraph::from_edges([(1, 2, 5.0), (2, 3, 1.0), (3, 1, 2.0), (4, 4, 1.0)]),
            &HashSet::from([1]),
        )
    }

    #[test]
    fn positions_stay_finite() {
        let mut scene = scene();
        for _ in 0..500 {
            step_physics(&mut scene, PhysicsConfig::default());
        }
        for node in &scene.nodes {
            assert!(node.world_pos.x.is_finite() && node.world_pos.y.is_finite());
        }
    }

    #[test]
    fn a_disconnected_pair_drifts_toward_the_center() {
        let mut scene = GraphScene::build(
            &Subgraph::from_edges([(8, 8, 1.0), (9, 9, 1.0)]),
            &HashSet::new(),
        );
        scene.nodes[0].world_pos = vec2(400.0, -300.0);
        scene.nodes[1].world_pos = vec2(-400.0, 300.0);

        for _ in 0..50 {
            step_physics(&mut scene, PhysicsConfig::default());
        }

        for node in &scene.nodes {
            assert!(node.world_pos.length() < 500.0);
        }
    }

    #[test]
    fn coincident_nodes_are_pushed_apart() {
        let mut scene = scene();
        for node in &mut scene.nodes {
            node.world_pos = Vec2::ZERO;
        }

        assert!(step_physics(&mut scene, PhysicsConfig::default()));
        let first = scene.nodes[0].world_pos;
        assert!(scene.nodes.iter().skip(1).any(|node| node.world_pos != first));
    }

    #[test]
    fn tree_forces_match_the_pairwise_sum() {
        let positions = (0..400)
            .map(|index| vec2((index % 20) as f32 * 60.0, (index / 20) as f32 * 60.0))
            .collect::<Vec<_>>();
        let radii = vec![9.0; positions.len()];
        let repulsion = Repulsion {
            strength: 42_000.0,
            softening: 400.0,
            collision: 1.6,
            reach: 45.0,
        };

        let approximate = repulsion.forces(&positions, &radii);
        let (mut error, mut magnitude) = (0.0, 0.0);
        for (index, estimate) in approximate.iter().enumerate() {
            let exact = (0..positions.len())
                .filter(|&other| other != index)
                .fold(Vec2::ZERO, |sum, other| {
                    sum + repulsion.between(index, other, &positions, &radii)
                });
            error += (*estimate - exact).length();
            magnitude += exact.length();
        }

        assert!(magnitude > 0.0);
        assert!(error / magnitude < 0.1, "relative error {}", error / magnitude);
    }

    #[test]
    fn heavier_edges_settle_longer() {
        let mut scene = GraphScene::build(
            &Subgraph::from_edges([(1, 2, 10.0), (3, 4, 1.0)]),
            &HashSet::new(),
        );
        scene.nodes[0].world_pos = vec2(-2000.0, 0.0);
        scene.nodes[1].world_pos = vec2(-2000.0, 100.0);
        scene.nodes[2].world_pos = vec2(2000.0, 0.0);
        scene.nodes[3].world_pos = vec2(2000.0, 100.0);

        for _ in 0..400 {
            step_physics(&mut scene, PhysicsConfig::default());
        }

        let heavy = (scene.nodes[0].world_pos - scene.nodes[1].world_pos).length();
        let light = (scene.nodes[2].world_pos - scene.nodes[3].world_pos).length();
        assert!(heavy > light, "heavy {heavy} light {light}");
    }
}
