//! Scene composition and the reactive update engine

pub mod colors;
pub mod composer;
pub mod engine;
pub mod figure;

pub use colors::{availability_color, scale_color};
pub use composer::{compose, hover_label, ViewComposer};
pub use engine::{EngineError, EngineEvent, EngineSettings, UpdateEngine};
pub use figure::{figure_json, FigureSurface};
