//! JSON-line messages exchanged with the browser front end

use serde::{Deserialize, Serialize};

use av_core::{Metric, ReportedViewport};
use av_views::{EngineEvent, UpdateEngine};

/// Plotly relayout data as reported by the map
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RelayoutData {
    #[serde(flatten)]
    pub viewport: ReportedViewport,

    /// Set on first paint, before any user interaction
    #[serde(default)]
    pub autosize: bool,
}

/// One message read from the front end
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiMessage {
    /// A dropdown changed
    FilterChanged {
        #[serde(default)]
        time_of_day: Option<String>,
        #[serde(default)]
        metric: Option<String>,
    },
    /// The map was panned, zoomed or tilted
    ViewportReported {
        #[serde(default)]
        relayout: Option<RelayoutData>,
    },
    /// Ask for the dropdown options
    Options,
}

impl UiMessage {
    /// Engine event for this message, if it is one
    pub fn into_engine_event(self) -> Option<EngineEvent> {
        match self {
            UiMessage::FilterChanged { time_of_day, metric } => {
                Some(EngineEvent::FilterChanged { time_of_day, metric })
            }
            UiMessage::ViewportReported { relayout } => {
                let autosize = relayout.as_ref().map(|r| r.autosize).unwrap_or(false);
                Some(EngineEvent::ViewportReported {
                    viewport: relayout.map(|r| r.viewport),
                    autosize,
                })
            }
            UiMessage::Options => None,
        }
    }
}

/// Dropdown contents sent back to the front end
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Options {
    pub time_of_day: Vec<String>,
    pub metric: Vec<Metric>,
}

impl Options {
    pub fn from_engine(engine: &UpdateEngine) -> Self {
        Self {
            time_of_day: engine.time_of_day_options().iter().cloned().collect(),
            metric: engine.metric_options().to_vec(),
        }
    }
}

/// Reply lines other than figures
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reply {
    Options(Options),
    Error { message: String },
}
