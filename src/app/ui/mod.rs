use anyhow::{Context, Result};
use eframe::egui::{Color32, RichText, Ui};

use crate::dashboard::Status;
use crate::engine::NodeId;

mod distributions;
mod influence;
mod metrics;
mod path;
mod session;

const ERROR_COLOR: Color32 = Color32::from_rgb(232, 104, 96);

/// Blank input is "not set".
fn parse_optional_int(raw: &str, what: &str) -> Result<Option<i64>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<i64>()
        .map(Some)
        .with_context(|| format!("{what} {raw:?} is not an integer"))
}

fn parse_node(raw: &str) -> Result<Option<NodeId>> {
    parse_optional_int(raw, "node id")
}

/// The one button a catalog entry offers. Fetched entries stay as they are until the
/// next dataset; failed ones can be re-armed by hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EntryControl {
    Calc,
    Reset,
}

impl EntryControl {
    fn for_status(status: Status) -> Option<Self> {
        match status {
            Status::Idle => Some(Self::Calc),
            Status::Failed => Some(Self::Reset),
            Status::Loading | Status::Ready => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Calc => "Calc",
            Self::Reset => "Reset",
        }
    }
}

/// Spinner while loading, a red label with the message on hover when failed.
fn status_badge(ui: &mut Ui, status: Status, error: Option<&str>) {
    match status {
        Status::Loading => {
            ui.spinner();
        }
        Status::Failed => {
            ui.label(RichText::new("Error").color(ERROR_COLOR))
                .on_hover_text(error.unwrap_or("unknown error"));
        }
        Status::Idle | Status::Ready => {}
    }
}
