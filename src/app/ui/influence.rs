use anyhow::Context;
use eframe::egui::{self, Ui};

use crate::dashboard::{Status, parse_seed_list};
use crate::engine::NodeId;

use super::super::AnalyzerApp;
use super::super::chart::BarChart;
use super::status_badge;

fn join_ids(ids: &[NodeId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl AnalyzerApp {
    pub(in crate::app) fn draw_influence_controls(&mut self, ui: &mut Ui) {
        ui.heading("Influence");
        let ready = self.dashboard.session().is_ready();
        let influence = self.dashboard.influence();
        let seeds_busy = influence.best_seeds().status().is_loading();
        let spread_busy = influence.spread().status().is_loading();
        let best = influence.best_seeds().current().cloned();

        let mut find_best = false;
        let mut simulate = false;

        ui.horizontal(|ui| {
            ui.label("Seed count");
            ui.add(egui::TextEdit::singleline(&mut self.forms.seed_count).desired_width(50.0));
            find_best = ui
                .add_enabled(ready && !seeds_busy, egui::Button::new("Find best seeds"))
                .clicked();
        });

        ui.label("Initial seeds (comma-separated, blank for random)");
        ui.add(
            egui::TextEdit::singleline(&mut self.forms.seeds)
                .hint_text("random")
                .desired_width(240.0),
        );

        ui.horizontal(|ui| {
            if ui
                .add_enabled(best.is_some(), egui::Button::new("Use best seeds"))
                .clicked()
                && let Some(best) = &best
            {
                self.forms.seeds = join_ids(best);
            }
            simulate = ui
                .add_enabled(ready && !spread_busy, egui::Button::new("Simulate spread"))
                .clicked();
        });

        if find_best {
            let result = self
                .forms
                .seed_count
                .trim()
                .parse::<i64>()
                .with_context(|| format!("seed count {:?} is not an integer", self.forms.seed_count))
                .and_then(|n| self.dashboard.best_seeds(n));
            self.report(result);
        }
        if simulate {
            let result = parse_seed_list(&self.forms.seeds)
                .and_then(|seeds| self.dashboard.simulate_spread(seeds));
            self.report(result);
        }
    }

    pub(in crate::app) fn draw_influence_results(&mut self, ui: &mut Ui) {
        ui.heading("Influence");
        let influence = self.dashboard.influence();

        ui.horizontal(|ui| {
            ui.label("Best seeds:");
            match influence.best_seeds().current() {
                Some(seeds) if seeds.is_empty() => {
                    ui.weak("none");
                }
                Some(seeds) => {
                    ui.monospace(join_ids(seeds));
                }
                None if influence.best_seeds().status() == Status::Idle => {
                    ui.weak("-");
                }
                None => {}
            }
            status_badge(
                ui,
                influence.best_seeds().status(),
                influence.best_seeds().error(),
            );
        });

        let spread = influence.spread();
        ui.horizontal(|ui| {
            ui.label("Spread:");
            if let Some(outcome) = spread.current() {
                let seeds = outcome
                    .seeds
                    .as_deref()
                    .map_or_else(|| "random seed".to_owned(), join_ids);
                ui.label(format!(
                    "from {seeds}, {} step(s)",
                    outcome.result.counts.len()
                ));
            } else if spread.status() == Status::Idle {
                ui.weak("-");
            }
            status_badge(ui, spread.status(), spread.error());
        });

        match spread.current() {
            Some(outcome) => {
                self.spread_chart
                    .sync(outcome, |outcome| BarChart::build(&outcome.series()))
                    .show(ui, "spread", "Step", "Influenced nodes", Self::CHART_HEIGHT);
            }
            None => self.spread_chart.clear(),
        }

        self.spread_graph
            .show(ui, spread.current(), Self::GRAPH_HEIGHT);
    }
}
