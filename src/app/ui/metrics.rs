use eframe::egui::{self, Ui};

use crate::dashboard::Status;
use crate::util::format_number;

use super::super::AnalyzerApp;
use super::{EntryControl, status_badge};

enum MetricAction {
    Fetch(String),
    Rearm(String),
}

impl AnalyzerApp {
    pub(in crate::app) fn draw_metrics(&mut self, ui: &mut Ui) {
        ui.heading("Metrics");
        let ready = self.dashboard.session().is_ready();
        if !ready {
            ui.label("Load a dataset to compute metrics.");
        }

        let mut actions = Vec::new();
        egui::Grid::new("metrics")
            .num_columns(3)
            .striped(true)
            .spacing([18.0, 6.0])
            .show(ui, |ui| {
                for entry in self.dashboard.metrics().iter() {
                    ui.label(entry.display_name.as_str());

                    ui.horizontal(|ui| {
                        match entry.current_value() {
                            Some(value) => {
                                ui.monospace(format_number(value));
                            }
                            None if entry.status == Status::Idle => {
                                ui.weak("-");
                            }
                            None => {}
                        }
                        status_badge(ui, entry.status, entry.error.as_deref());
                    });

                    match EntryControl::for_status(entry.status) {
                        Some(control) => {
                            if ui
                                .add_enabled(ready, egui::Button::new(control.label()))
                                .clicked()
                            {
                                actions.push(match control {
                                    EntryControl::Calc => MetricAction::Fetch(entry.id.clone()),
                                    EntryControl::Reset => MetricAction::Rearm(entry.id.clone()),
                                });
                            }
                        }
                        None => {
                            ui.label("");
                        }
                    }
                    ui.end_row();
                }
            });

        ui.horizontal(|ui| {
            let idle = self
                .dashboard
                .metrics()
                .iter()
                .filter(|entry| entry.status == Status::Idle)
                .map(|entry| entry.id.clone())
                .collect::<Vec<_>>();
            if ui
                .add_enabled(ready && !idle.is_empty(), egui::Button::new("Calc all"))
                .clicked()
            {
                actions.extend(idle.into_iter().map(MetricAction::Fetch));
            }
        });

        for action in actions {
            let result = match action {
                MetricAction::Fetch(id) => self.dashboard.fetch_metric(&id),
                MetricAction::Rearm(id) => self.dashboard.rearm_metric(&id),
            };
            self.report(result);
        }
    }
}
