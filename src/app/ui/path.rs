use eframe::egui::{self, RichText, Ui};

use crate::dashboard::Status;
use crate::util::format_number;

use super::super::AnalyzerApp;
use super::{ERROR_COLOR, parse_node, status_badge};

impl AnalyzerApp {
    pub(in crate::app) fn draw_path_controls(&mut self, ui: &mut Ui) {
        ui.heading("Shortest path");
        let ready = self.dashboard.session().is_ready();

        let mut edited = false;
        egui::Grid::new("path_nodes").num_columns(2).show(ui, |ui| {
            ui.label("Node 1");
            edited |= ui
                .add(egui::TextEdit::singleline(&mut self.forms.node1).desired_width(120.0))
                .changed();
            ui.end_row();

            ui.label("Node 2");
            edited |= ui
                .add(egui::TextEdit::singleline(&mut self.forms.node2).desired_width(120.0))
                .changed();
            ui.end_row();
        });

        let node1 = parse_node(&self.forms.node1);
        let node2 = parse_node(&self.forms.node2);
        if edited {
            self.dashboard
                .set_node1(node1.as_ref().ok().copied().flatten());
            self.dashboard
                .set_node2(node2.as_ref().ok().copied().flatten());
        }
        for error in [&node1, &node2].into_iter().filter_map(|parsed| parsed.as_ref().err()) {
            ui.label(RichText::new(error.to_string()).color(ERROR_COLOR));
        }

        let path = self.dashboard.path();
        let has_pair = path.node1().is_some() && path.node2().is_some();
        let distance_busy = path.distance().status().is_loading();
        let route_busy = path.route().status().is_loading();

        let mut compute_distance = false;
        let mut compute_path = false;
        ui.horizontal(|ui| {
            compute_distance = ui
                .add_enabled(
                    ready && has_pair && !distance_busy,
                    egui::Button::new("Calculate distance"),
                )
                .clicked();
            compute_path = ui
                .add_enabled(
                    ready && has_pair && !route_busy,
                    egui::Button::new("Visualize path"),
                )
                .clicked();
        });

        if compute_distance {
            let result = self.dashboard.compute_distance();
            self.report(result);
        }
        if compute_path {
            let result = self.dashboard.compute_path();
            self.report(result);
        }
    }

    pub(in crate::app) fn draw_path_results(&mut self, ui: &mut Ui) {
        ui.heading("Shortest path");
        let path = self.dashboard.path();

        ui.horizontal(|ui| {
            ui.label("Distance:");
            match path.distance().current() {
                Some(distance) => {
                    ui.monospace(format_number(*distance));
                }
                None if path.distance().status() == Status::Idle => {
                    ui.weak("-");
                }
                None => {}
            }
            status_badge(ui, path.distance().status(), path.distance().error());
        });

        ui.horizontal(|ui| {
            ui.label("Path:");
            match path.route().current() {
                Some(route) => {
                    let hops = route
                        .path
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(" -> ");
                    ui.monospace(hops);
                }
                None if path.route().status() == Status::Idle => {
                    ui.weak("-");
                }
                None => {}
            }
            status_badge(ui, path.route().status(), path.route().error());
        });

        self.path_graph
            .show(ui, path.route().current(), Self::GRAPH_HEIGHT);
    }
}
