use std::collections::HashMap;
use std::time::Duration;

use eframe::egui::{self, Context};
use log::warn;

use crate::dashboard::{Dashboard, SpreadOutcome};
use crate::engine::{PathResult, SeriesPoint};

mod chart;
mod graph;
mod physics;
mod render_utils;
mod slot;
mod ui;

use chart::BarChart;
use graph::GraphView;
use slot::SceneSlot;

pub struct AnalyzerApp {
    dashboard: Dashboard,
    forms: Forms,
    path_graph: GraphView<PathResult>,
    spread_graph: GraphView<SpreadOutcome>,
    distribution_charts: HashMap<String, SceneSlot<Vec<SeriesPoint>, BarChart>>,
    spread_chart: SceneSlot<SpreadOutcome, BarChart>,
    notice: Option<String>,
}

/// Raw text of every input field. Parsed when the matching action is triggered.
#[derive(Default)]
struct Forms {
    dataset_path: String,
    node1: String,
    node2: String,
    parameters: HashMap<String, String>,
    seed_count: String,
    seeds: String,
}

impl AnalyzerApp {
    const POLL_INTERVAL: Duration = Duration::from_millis(100);
    const CHART_HEIGHT: f32 = 220.0;
    const GRAPH_HEIGHT: f32 = 420.0;

    pub fn new(_cc: &eframe::CreationContext<'_>, dashboard: Dashboard, seed_count: i64) -> Self {
        let forms = Forms {
            dataset_path: dashboard.session().dataset_path().to_owned(),
            seed_count: seed_count.to_string(),
            ..Forms::default()
        };

        Self {
            dashboard,
            forms,
            path_graph: GraphView::default(),
            spread_graph: GraphView::default(),
            distribution_charts: HashMap::new(),
            spread_chart: SceneSlot::default(),
            notice: None,
        }
    }

    /// Surfaces a refused action in the UI; a successful one clears the previous notice.
    fn report(&mut self, result: anyhow::Result<()>) {
        match result {
            Ok(()) => self.notice = None,
            Err(error) => {
                warn!("{error:#}");
                self.notice = Some(format!("{error:#}"));
            }
        }
    }
}

impl eframe::App for AnalyzerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.dashboard.poll();
        if self.dashboard.has_in_flight() {
            ctx.request_repaint_after(Self::POLL_INTERVAL);
        }

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| self.draw_top_bar(ui));

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.draw_session(ui);
                    ui.separator();
                    self.draw_path_controls(ui);
                    ui.separator();
                    self.draw_influence_controls(ui);
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                self.draw_metrics(ui);
                ui.add_space(12.0);
                self.draw_distributions(ui);
                ui.add_space(12.0);
                self.draw_path_results(ui);
                ui.add_space(12.0);
                self.draw_influence_results(ui);
            });
        });
    }
}
