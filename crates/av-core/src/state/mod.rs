//! Filter and camera state owned by the update engine

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod viewport;

pub use viewport::{ReportedCenter, ReportedViewport, ViewportError};

/// Availability metric shown on the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    /// Share of time at least one bike was docked
    #[serde(rename = "Bikes")]
    Bikes,
    /// Share of time at least one dock was free
    #[serde(rename = "Open Docks")]
    OpenDocks,
}

/// A metric key outside the fixed set
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown metric '{0}'")]
pub struct UnknownMetric(pub String);

impl Metric {
    /// Every metric, in dropdown order
    pub const ALL: [Metric; 2] = [Metric::Bikes, Metric::OpenDocks];

    /// Dropdown key
    pub fn key(&self) -> &'static str {
        match self {
            Metric::Bikes => "Bikes",
            Metric::OpenDocks => "Open Docks",
        }
    }

    /// Key with only the first letter upper-case, as used in hover labels
    pub fn capitalized(&self) -> &'static str {
        match self {
            Metric::Bikes => "Bikes",
            Metric::OpenDocks => "Open docks",
        }
    }
}

impl Default for Metric {
    fn default() -> Self {
        Metric::Bikes
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Metric {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|metric| metric.key() == s)
            .ok_or_else(|| UnknownMetric(s.to_string()))
    }
}

/// Current dropdown selections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    /// Selected time-of-day bucket; always one present in the dataset
    pub time_of_day: String,

    /// Selected availability metric
    pub metric: Metric,
}

impl FilterState {
    pub fn new(time_of_day: impl Into<String>, metric: Metric) -> Self {
        Self {
            time_of_day: time_of_day.into(),
            metric,
        }
    }
}

/// Map viewport applied on render
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    pub lat: f64,
    pub lon: f64,
    pub zoom: f64,
    pub pitch: f64,
}

impl CameraState {
    /// Startup viewport, centered on Mercer St & Bleecker St
    pub const DEFAULT: CameraState = CameraState {
        lat: 40.72706363348306,
        lon: -73.99662137031554,
        zoom: 11.0,
        pitch: 0.0,
    };

    pub fn new(lat: f64, lon: f64, zoom: f64, pitch: f64) -> Self {
        Self { lat, lon, zoom, pitch }
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_keys_parse() {
        assert_eq!("Bikes".parse::<Metric>(), Ok(Metric::Bikes));
        assert_eq!("Open Docks".parse::<Metric>(), Ok(Metric::OpenDocks));
        assert_eq!(
            "open docks".parse::<Metric>(),
            Err(UnknownMetric("open docks".to_string()))
        );
    }

    #[test]
    fn test_metric_capitalized() {
        assert_eq!(Metric::Bikes.capitalized(), "Bikes");
        assert_eq!(Metric::OpenDocks.capitalized(), "Open docks");
    }

    #[test]
    fn test_metric_serde_uses_keys() {
        let json = serde_json::to_string(&Metric::OpenDocks).unwrap();
        assert_eq!(json, "\"Open Docks\"");
        let metric: Metric = serde_json::from_str("\"Bikes\"").unwrap();
        assert_eq!(metric, Metric::Bikes);
    }

    #[test]
    fn test_default_camera() {
        let camera = CameraState::default();
        assert_eq!(camera.lat, 40.72706363348306);
        assert_eq!(camera.lon, -73.99662137031554);
        assert_eq!(camera.zoom, 11.0);
        assert_eq!(camera.pitch, 0.0);
    }
}
