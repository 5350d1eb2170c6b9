use std::sync::Arc;

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Sense, Stroke, Ui, Vec2, vec2};

use crate::util::format_number;

use super::super::physics::{PhysicsConfig, step_physics};
use super::super::render_utils::{
    EDGE_COLOR, HIGHLIGHT_COLOR, HOVER_COLOR, NODE_COLOR, ROUTE_COLOR, Viewport,
};
use super::super::slot::SceneSlot;
use super::interaction::hovered_index;
use super::{GraphScene, GraphSource};

/// Interactive node-link view over whichever result is currently shown.
pub(in crate::app) struct GraphView<I> {
    slot: SceneSlot<I, GraphScene>,
    pub(super) pan: Vec2,
    pub(super) zoom: f32,
    live_physics: bool,
    physics: PhysicsConfig,
}

impl<I> Default for GraphView<I> {
    fn default() -> Self {
        Self {
            slot: SceneSlot::default(),
            pan: Vec2::ZERO,
            zoom: 1.0,
            live_physics: true,
            physics: PhysicsConfig::default(),
        }
    }
}

impl<I: GraphSource> GraphView<I> {
    fn update_screen_space(view: Viewport, scene: &mut GraphScene) {
        scene.scratch.screen_positions.clear();
        scene.scratch.screen_radii.clear();
        for node in &scene.nodes {
            scene
                .scratch
                .screen_positions
                .push(view.to_screen(node.world_pos));
            scene
                .scratch
                .screen_radii
                .push((node.radius * view.zoom.powf(0.40)).clamp(2.5, 40.0));
        }
    }

    fn draw_controls(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.checkbox(&mut self.live_physics, "Live physics");
            ui.add(
                egui::Slider::new(&mut self.physics.intensity, 0.2..=2.5)
                    .text("Intensity")
                    .fixed_decimals(2),
            );
            ui.add(
                egui::Slider::new(&mut self.physics.spring_scale, 0.2..=2.2)
                    .text("Springs")
                    .fixed_decimals(2),
            );
            if ui.button("Reset view").clicked() {
                self.reset_view();
            }
        });
    }

    /// Draws `source` as a graph, or releases the previous scene when there is nothing
    /// to show.
    pub(in crate::app) fn show(&mut self, ui: &mut Ui, source: Option<&Arc<I>>, height: f32) {
        let Some(source) = source else {
            self.slot.clear();
            return;
        };

        self.draw_controls(ui);

        let desired = vec2(ui.available_width(), height);
        let (rect, response) = ui.allocate_exact_size(desired, Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        self.handle_zoom(ui, rect, &response);
        self.handle_pan(&response);
        if response.double_clicked() {
            self.reset_view();
        }
        let view = Viewport {
            rect,
            pan: self.pan,
            zoom: self.zoom,
        };
        view.paint_backdrop(&painter);

        let live_physics = self.live_physics;
        let physics = self.physics;
        let scene = self.slot.sync(source, |source| {
            GraphScene::build(source.subgraph(), &source.highlighted())
        });

        if scene.nodes.is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "The result contains no nodes.",
                FontId::proportional(14.0),
                Color32::from_gray(200),
            );
            return;
        }

        let moving = live_physics && step_physics(scene, physics);
        if moving || response.dragged() {
            ui.ctx().request_repaint();
        }

        Self::update_screen_space(view, scene);
        let scene: &GraphScene = scene;
        let positions = &scene.scratch.screen_positions;
        let radii = &scene.scratch.screen_radii;

        let pointer = if response.hovered() {
            ui.input(|input| input.pointer.hover_pos())
        } else {
            None
        };
        let hovered = hovered_index(pointer, positions, radii);
        if hovered.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }

        let zoom = view.zoom;
        let zoom_sqrt = zoom.sqrt();
        for edge in &scene.edges {
            let on_route = scene.nodes[edge.from].highlighted && scene.nodes[edge.to].highlighted;
            let color = if on_route { ROUTE_COLOR } else { EDGE_COLOR };
            let stroke = Stroke::new((scene.edge_width(edge) * zoom_sqrt).clamp(0.6, 8.0), color);

            let label_at = if edge.is_loop() {
                let (center, loop_radius) = loop_ring(positions[edge.from], radii[edge.from]);
                painter.circle_stroke(center, loop_radius, stroke);
                center - vec2(0.0, loop_radius + 6.0)
            } else {
                let (start, end) = (positions[edge.from], positions[edge.to]);
                painter.line_segment([start, end], stroke);
                start + (end - start) * 0.5
            };

            if zoom > 1.2 {
                painter.text(
                    label_at,
                    Align2::CENTER_CENTER,
                    format_number(edge.weight),
                    FontId::proportional(11.0),
                    Color32::from_gray(190),
                );
            }
        }

        let label_everything = scene.nodes.len() <= 60 || zoom > 1.35;
        for (index, node) in scene.nodes.iter().enumerate() {
            let (position, radius) = (positions[index], radii[index]);
            if !view.shows_circle(position, radius) {
                continue;
            }

            let is_hovered = hovered == Some(index);
            let color = if is_hovered {
                HOVER_COLOR
            } else if node.highlighted {
                HIGHLIGHT_COLOR
            } else {
                NODE_COLOR
            };

            painter.circle_filled(position, radius, color);
            painter.circle_stroke(
                position,
                radius,
                Stroke::new(
                    if node.highlighted { 1.8 } else { 1.0 },
                    Color32::from_rgba_unmultiplied(15, 15, 15, 190),
                ),
            );

            if label_everything || node.highlighted || is_hovered {
                painter.text(
                    position + vec2(radius + 4.0, 0.0),
                    Align2::LEFT_CENTER,
                    node.id.to_string(),
                    FontId::proportional(12.0),
                    Color32::from_gray(238),
                );
            }
        }

        painter.text(
            rect.left_bottom() + vec2(10.0, -10.0),
            Align2::LEFT_BOTTOM,
            format!("{} nodes | {} edges", scene.nodes.len(), scene.edges.len()),
            FontId::proportional(12.0),
            Color32::from_gray(200),
        );

        if let Some(node) = hovered.and_then(|index| scene.nodes.get(index)) {
            let outgoing = scene
                .edges
                .iter()
                .filter(|edge| scene.nodes[edge.from].id == node.id)
                .count();
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                format!("node {}  |  out-edges {outgoing}", node.id),
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }
    }
}

/// Ring drawn for a self-loop: it sits on top of the node and overlaps its outline.
fn loop_ring(position: Pos2, radius: f32) -> (Pos2, f32) {
    let loop_radius = radius * 0.8;
    (position - vec2(0.0, radius + loop_radius * 0.6), loop_radius)
}
