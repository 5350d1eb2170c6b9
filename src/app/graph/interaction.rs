use eframe::egui::{self, Pos2, Rect, Ui, Vec2};

use super::super::render_utils::Viewport;
use super::view::GraphView;

impl<I> GraphView<I> {
    pub(super) fn handle_zoom(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = Viewport {
            rect,
            pan: self.pan,
            zoom: self.zoom,
        }
        .to_world(pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(0.05, 6.0);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
    }

    pub(super) fn handle_pan(&mut self, response: &egui::Response) {
        if response.dragged() {
            self.pan += response.drag_delta();
        }
    }

    pub(super) fn reset_view(&mut self) {
        self.pan = Vec2::ZERO;
        self.zoom = 1.0;
    }
}

/// Closest node under the pointer, if any.
pub(super) fn hovered_index(
    pointer: Option<Pos2>,
    screen_positions: &[Pos2],
    screen_radii: &[f32],
) -> Option<usize> {
    let pointer = pointer?;
    screen_positions
        .iter()
        .zip(screen_radii)
        .enumerate()
        .filter_map(|(index, (position, radius))| {
            let distance = position.distance(pointer);
            (distance <= *radius).then_some((index, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::*;

    #[test]
    fn picks_the_nearest_node_under_the_pointer() {
        let positions = [pos2(0.0, 0.0), pos2(8.0, 0.0), pos2(100.0, 100.0)];
        let radii = [10.0, 10.0, 10.0];

        assert_eq!(hovered_index(Some(pos2(6.0, 0.0)), &positions, &radii), Some(1));
        assert_eq!(hovered_index(Some(pos2(50.0, 50.0)), &positions, &radii), None);
        assert_eq!(hovered_index(None, &positions, &radii), None);
    }
}
