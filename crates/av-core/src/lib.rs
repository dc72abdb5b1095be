//! Core types for the station availability map
//!
//! This crate holds the vocabulary shared by the data store, the view
//! composer and the update engine: filter and camera state, the scene
//! descriptor handed to rendering surfaces, and the collaborator traits.

pub mod events;
pub mod render;
pub mod scene;
pub mod state;

// Re-export commonly used types
pub use data::{RawStationRow, StationSource};
pub use events::EventBus;
pub use render::{RenderError, RenderSurface};
pub use scene::{ColorScale, ColorStop, Marker, Rgb, SceneDescriptor};
pub use state::{
    CameraState, FilterState, Metric, ReportedCenter, ReportedViewport, UnknownMetric,
    ViewportError,
};

/// Boundary contract with the data source collaborator
pub mod data {
    use serde::{Deserialize, Serialize};

    /// One row as delivered by the data source, before any cleaning
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct RawStationRow {
        pub station_id: String,
        pub station_name: String,
        pub latitude: f64,
        pub longitude: f64,
        pub time_of_day: String,
        pub operational_status: String,
        /// Fraction of observed time with at least one bike docked
        pub bike_availability: f64,
        /// Fraction of observed time with at least one open dock
        pub dock_availability: f64,
    }

    /// Trait for station data sources
    ///
    /// Sources are read once at startup; the rows are treated as a static
    /// snapshot for the rest of the process lifetime.
    #[async_trait::async_trait]
    pub trait StationSource: Send + Sync {
        /// Read every row the source holds
        async fn load_rows(&self) -> anyhow::Result<Vec<RawStationRow>>;

        /// Get the source name/path
        fn source_name(&self) -> &str;
    }
}
