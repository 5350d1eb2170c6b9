use eframe::egui::{self, Align, Layout, RichText, Ui};

use crate::dashboard::Status;

use super::super::AnalyzerApp;
use super::{ERROR_COLOR, status_badge};

impl AnalyzerApp {
    pub(in crate::app) fn draw_top_bar(&mut self, ui: &mut Ui) {
        let session = self.dashboard.session();
        ui.horizontal(|ui| {
            ui.heading("network-analyzer");
            ui.separator();
            ui.label(format!("session: {}", session.status().label()));
            if !session.dataset_path().is_empty() {
                ui.label(format!("dataset: {}", session.dataset_path()));
            }
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                if self.dashboard.has_in_flight() {
                    ui.spinner();
                }
            });
        });

        if let Some(notice) = self.notice.clone() {
            ui.horizontal(|ui| {
                ui.label(RichText::new(notice).color(ERROR_COLOR));
                if ui.small_button("Dismiss").clicked() {
                    self.notice = None;
                }
            });
        }
    }

    pub(in crate::app) fn draw_session(&mut self, ui: &mut Ui) {
        ui.heading("Dataset");
        ui.label("Edge list (.tsv)");

        let loading = self.dashboard.session().status().is_loading();
        let mut submit = false;

        ui.horizontal(|ui| {
            let response = ui.add_enabled(
                !loading,
                egui::TextEdit::singleline(&mut self.forms.dataset_path)
                    .hint_text("path/to/graph.tsv")
                    .desired_width(200.0),
            );
            if response.lost_focus() && ui.input(|input| input.key_pressed(egui::Key::Enter)) {
                submit = true;
            }

            if ui
                .add_enabled(!loading, egui::Button::new("Browse..."))
                .clicked()
                && let Some(path) = rfd::FileDialog::new()
                    .add_filter("Tab-separated edges", &["tsv"])
                    .pick_file()
            {
                self.forms.dataset_path = path.display().to_string();
                submit = true;
            }
        });

        ui.horizontal(|ui| {
            if ui
                .add_enabled(!loading, egui::Button::new("Load dataset"))
                .clicked()
            {
                submit = true;
            }

            let session = self.dashboard.session();
            status_badge(ui, session.status(), session.error());
            if session.status() == Status::Ready {
                ui.label("Loaded");
            }
        });

        if let Some(error) = self.dashboard.session().error() {
            ui.label(RichText::new(error).color(ERROR_COLOR));
        }

        if submit {
            let result = self.dashboard.submit_dataset_path(&self.forms.dataset_path);
            self.report(result);
        }
    }
}
