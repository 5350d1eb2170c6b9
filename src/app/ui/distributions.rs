use eframe::egui::{self, Ui};

use super::super::AnalyzerApp;
use super::super::chart::BarChart;
use super::{EntryControl, parse_optional_int, status_badge};

enum DistributionAction {
    Fetch { id: String, raw_parameter: String },
    Rearm(String),
}

impl AnalyzerApp {
    pub(in crate::app) fn draw_distributions(&mut self, ui: &mut Ui) {
        ui.heading("Distributions");
        let ready = self.dashboard.session().is_ready();
        let mut actions = Vec::new();

        for entry in self.dashboard.distributions().iter() {
            egui::CollapsingHeader::new(entry.display_name.as_str())
                .id_salt(("distribution", entry.id.as_str()))
                .default_open(true)
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        if let Some(parameter) = &entry.parameter_spec {
                            ui.label(parameter.label.as_str());
                            let raw = self.forms.parameters.entry(entry.id.clone()).or_default();
                            ui.add(egui::TextEdit::singleline(raw).desired_width(60.0));
                        }

                        if let Some(control) = EntryControl::for_status(entry.status)
                            && ui
                                .add_enabled(ready, egui::Button::new(control.label()))
                                .clicked()
                        {
                            actions.push(match control {
                                EntryControl::Calc => DistributionAction::Fetch {
                                    id: entry.id.clone(),
                                    raw_parameter: self
                                        .forms
                                        .parameters
                                        .get(&entry.id)
                                        .cloned()
                                        .unwrap_or_default(),
                                },
                                EntryControl::Reset => DistributionAction::Rearm(entry.id.clone()),
                            });
                        }

                        status_badge(ui, entry.status, entry.error.as_deref());
                    });

                    let chart_slot = self.distribution_charts.entry(entry.id.clone()).or_default();
                    match entry.current_series() {
                        Some(series) => {
                            chart_slot.sync(series, |series| BarChart::build(series)).show(
                                ui,
                                &entry.id,
                                &entry.x_label,
                                &entry.y_label,
                                Self::CHART_HEIGHT,
                            );
                        }
                        None if entry.is_loading() => {
                            chart_slot.clear();
                            ui.weak("Waiting for the engine...");
                        }
                        None => chart_slot.clear(),
                    }
                });
        }

        for action in actions {
            let result = match action {
                DistributionAction::Fetch { id, raw_parameter } => {
                    parse_optional_int(&raw_parameter, "parameter")
                        .and_then(|parameter| self.dashboard.fetch_distribution(&id, parameter))
                }
                DistributionAction::Rearm(id) => self.dashboard.rearm_distribution(&id),
            };
            self.report(result);
        }
    }
}
