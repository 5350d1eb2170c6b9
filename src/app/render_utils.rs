use eframe::egui::{Color32, Painter, Pos2, Rangef, Rect, Stroke, Vec2};

pub(super) const NODE_COLOR: Color32 = Color32::from_rgb(88, 160, 214);
pub(super) const HIGHLIGHT_COLOR: Color32 = Color32::from_rgb(246, 194, 92);
pub(super) const HOVER_COLOR: Color32 = Color32::from_rgb(255, 164, 101);
pub(super) const BAR_COLOR: Color32 = Color32::from_rgb(103, 176, 230);
pub(super) const EDGE_COLOR: Color32 = Color32::from_rgba_premultiplied(82, 88, 97, 190);
pub(super) const ROUTE_COLOR: Color32 = Color32::from_rgb(222, 178, 92);

const BACKDROP_COLOR: Color32 = Color32::from_rgb(19, 23, 29);
const GRID_COLOR: Color32 = Color32::from_rgba_premultiplied(16, 19, 22, 70);

/// Maps layout coordinates, centred on the origin, into a screen rectangle.
#[derive(Clone, Copy, Debug)]
pub(super) struct Viewport {
    pub(super) rect: Rect,
    pub(super) pan: Vec2,
    pub(super) zoom: f32,
}

impl Viewport {
    fn origin(&self) -> Pos2 {
        self.rect.center() + self.pan
    }

    pub(super) fn to_screen(&self, world: Vec2) -> Pos2 {
        self.origin() + world * self.zoom
    }

    pub(super) fn to_world(&self, screen: Pos2) -> Vec2 {
        (screen - self.origin()) / self.zoom
    }

    pub(super) fn shows_circle(&self, center: Pos2, radius: f32) -> bool {
        self.rect.expand(radius).contains(center)
    }

    /// Fills the rect and draws a grid that moves with pan and zoom.
    pub(super) fn paint_backdrop(&self, painter: &Painter) {
        painter.rect_filled(self.rect, 0.0, BACKDROP_COLOR);

        let step = (56.0 * self.zoom.clamp(0.6, 1.8)).max(20.0);
        let origin = self.origin();
        let stroke = Stroke::new(1.0, GRID_COLOR);
        for x in grid_lines(self.rect.x_range(), origin.x, step) {
            painter.vline(x, self.rect.y_range(), stroke);
        }
        for y in grid_lines(self.rect.y_range(), origin.y, step) {
            painter.hline(self.rect.x_range(), y, stroke);
        }
    }
}

/// Coordinates inside `range` that lie a whole number of steps away from `anchor`.
fn grid_lines(range: Rangef, anchor: f32, step: f32) -> impl Iterator<Item = f32> {
    let first = range.min + (anchor - range.min).rem_euclid(step);
    (0u32..)
        .map(move |line| first + line as f32 * step)
        .take_while(move |coordinate| *coordinate < range.max)
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;

    #[test]
    fn screen_and_world_agree() {
        let view = Viewport {
            rect: Rect::from_min_size(pos2(10.0, 20.0), vec2(400.0, 300.0)),
            pan: vec2(12.0, -7.0),
            zoom: 1.7,
        };
        let world = vec2(33.0, -41.0);

        assert!((view.to_world(view.to_screen(world)) - world).length() < 1e-3);
        assert_eq!(view.to_screen(Vec2::ZERO), pos2(222.0, 163.0));
    }

    #[test]
    fn circles_just_outside_the_rect_are_culled() {
        let view = Viewport {
            rect: Rect::from_min_size(pos2(0.0, 0.0), vec2(100.0, 100.0)),
            pan: Vec2::ZERO,
            zoom: 1.0,
        };
        assert!(view.shows_circle(pos2(105.0, 50.0), 6.0));
        assert!(!view.shows_circle(pos2(107.0, 50.0), 6.0));
    }

    #[test]
    fn grid_lines_pass_through_the_anchor() {
        let lines = grid_lines(Rangef::new(0.0, 100.0), 130.0, 40.0).collect::<Vec<_>>();
        assert_eq!(lines, vec![10.0, 50.0, 90.0]);
    }
}
