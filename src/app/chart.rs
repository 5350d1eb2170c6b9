use eframe::egui::Ui;
use egui_plot::Plot;

use crate::engine::SeriesPoint;
use crate::util::format_number;

use super::render_utils::BAR_COLOR;

#[derive(Clone, Debug, PartialEq)]
pub(super) struct Bar {
    pub(super) label: String,
    pub(super) x: f64,
    pub(super) value: f64,
}

/// Bar chart over (x, y) pairs, one bar per pair in input order.
#[derive(Clone, Debug, PartialEq)]
pub(super) struct BarChart {
    pub(super) bars: Vec<Bar>,
    /// Bar width in x units. Narrower than the closest pair of x values so bars never overlap.
    pub(super) width: f64,
}

impl BarChart {
    const FILL: f64 = 0.8;

    pub(super) fn build(series: &[SeriesPoint]) -> Self {
        let bars = series
            .iter()
            .map(|&(x, value)| Bar {
                label: format_number(x),
                x,
                value,
            })
            .collect();

        let mut xs = series.iter().map(|(x, _)| *x).collect::<Vec<_>>();
        xs.sort_by(f64::total_cmp);
        let spacing = xs
            .windows(2)
            .map(|pair| pair[1] - pair[0])
            .filter(|gap| *gap > 0.0)
            .fold(f64::INFINITY, f64::min);

        Self {
            bars,
            width: if spacing.is_finite() {
                spacing * Self::FILL
            } else {
                Self::FILL
            },
        }
    }

    fn plot_bars(&self) -> Vec<egui_plot::Bar> {
        self.bars
            .iter()
            .map(|bar| {
                egui_plot::Bar::new(bar.x, bar.value)
                    .width(self.width)
                    .name(&bar.label)
                    .fill(BAR_COLOR)
            })
            .collect()
    }

    pub(super) fn show(&self, ui: &mut Ui, id: &str, x_label: &str, y_label: &str, height: f32) {
        if self.bars.is_empty() {
            ui.label("No data points.");
            return;
        }

        let chart = egui_plot::BarChart::new(y_label, self.plot_bars());
        Plot::new(("bar_chart", id))
            .height(height)
            .x_axis_label(x_label)
            .y_axis_label(y_label)
            .allow_scroll(false)
            .show(ui, |plot_ui| plot_ui.bar_chart(chart));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_bar_per_point_in_input_order() {
        let chart = BarChart::build(&[(2.0, 3.0), (0.0, 7.0), (1.0, 2.0)]);

        let labels = chart
            .bars
            .iter()
            .map(|bar| bar.label.as_str())
            .collect::<Vec<_>>();
        assert_eq!(labels, vec!["2", "0", "1"]);
        assert_eq!(
            chart.bars.iter().map(|bar| bar.value).collect::<Vec<_>>(),
            vec![3.0, 7.0, 2.0]
        );
        assert_eq!(chart.plot_bars().len(), 3);
    }

    #[test]
    fn width_follows_the_closest_x_spacing() {
        let chart = BarChart::build(&[(0.0, 1.0), (0.25, 4.0), (1.0, 2.0)]);
        assert!((chart.width - 0.2).abs() < 1e-9);
    }

    #[test]
    fn single_point_and_duplicate_x_use_the_default_width() {
        assert_eq!(BarChart::build(&[(0.5, 0.0)]).width, BarChart::FILL);
        assert_eq!(BarChart::build(&[(3.0, 1.0), (3.0, 2.0)]).width, BarChart::FILL);
    }

    #[test]
    fn empty_series_has_no_bars() {
        assert!(BarChart::build(&[]).bars.is_empty());
    }
}
