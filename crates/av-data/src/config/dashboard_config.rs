//! Dashboard configuration

use std::path::{Path, PathBuf};
use serde::{Serialize, Deserialize};
use av_core::Metric;

use super::null_handling::NullConfig;
use crate::DataError;

/// Time-of-day bucket selected on first load
pub const DEFAULT_TIME_OF_DAY: &str = "Peak Weekday Mornings (7-10 AM)";

/// Marker diameter used when none is configured
pub const DEFAULT_MARKER_SIZE: f32 = 11.0;

/// CSV header names for each station field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub station_id: String,
    pub station_name: String,
    pub latitude: String,
    pub longitude: String,
    pub time_of_day: String,
    pub operational_status: String,
    pub bike_availability: String,
    pub dock_availability: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            station_id: "id".to_string(),
            station_name: "stationName".to_string(),
            latitude: "latitude".to_string(),
            longitude: "longitude".to_string(),
            time_of_day: "time_of_day".to_string(),
            operational_status: "statusValue".to_string(),
            bike_availability: "bike_uptime".to_string(),
            dock_availability: "dock_uptime".to_string(),
        }
    }
}

/// Configuration for one dashboard deployment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Path to the station availability CSV
    pub data_path: PathBuf,

    /// Header names in the CSV
    pub columns: ColumnMapping,

    /// Null handling configuration
    pub null_config: NullConfig,

    /// Bucket selected before any user interaction
    pub default_time_of_day: String,

    /// Metric selected before any user interaction
    pub default_metric: Metric,

    /// Marker size for every station
    pub marker_size: f32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("csv/station-availability-by-time-of-day.csv"),
            columns: ColumnMapping::default(),
            null_config: NullConfig::default(),
            default_time_of_day: DEFAULT_TIME_OF_DAY.to_string(),
            default_metric: Metric::Bikes,
            marker_size: DEFAULT_MARKER_SIZE,
        }
    }
}

impl DashboardConfig {
    /// Parse a JSON document; absent keys keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self, DataError> {
        let config: DashboardConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file
    pub fn from_json_file(path: &Path) -> Result<Self, DataError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    fn validate(&self) -> Result<(), DataError> {
        if !self.marker_size.is_finite() || self.marker_size <= 0.0 {
            return Err(DataError::Config(format!(
                "marker_size must be positive, got {}",
                self.marker_size
            )));
        }
        if self.default_time_of_day.trim().is_empty() {
            return Err(DataError::Config("default_time_of_day is empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_original_file() {
        let config = DashboardConfig::default();
        assert_eq!(config.columns.station_name, "stationName");
        assert_eq!(config.columns.operational_status, "statusValue");
        assert_eq!(config.default_time_of_day, "Peak Weekday Mornings (7-10 AM)");
        assert_eq!(config.default_metric, Metric::Bikes);
        assert_eq!(config.marker_size, 11.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = DashboardConfig::from_json_str(
            r#"{
                "data_path": "data/sept.csv",
                "default_metric": "Open Docks",
                "columns": { "station_id": "stationId" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.data_path, PathBuf::from("data/sept.csv"));
        assert_eq!(config.default_metric, Metric::OpenDocks);
        assert_eq!(config.columns.station_id, "stationId");
        assert_eq!(config.columns.latitude, "latitude");
        assert_eq!(config.marker_size, 11.0);
    }

    #[test]
    fn test_unknown_metric_is_rejected() {
        let result = DashboardConfig::from_json_str(r#"{ "default_metric": "Scooters" }"#);
        assert!(matches!(result, Err(DataError::Config(_))));
    }

    #[test]
    fn test_non_positive_marker_size_is_rejected() {
        let result = DashboardConfig::from_json_str(r#"{ "marker_size": 0 }"#);
        assert!(matches!(result, Err(DataError::Config(_))));
    }
}
