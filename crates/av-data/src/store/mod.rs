//! Immutable in-memory station dataset
//!
//! The dataset is built once from raw rows and never mutated afterwards.
//! Filtering produces new datasets that share nothing with the original.

use indexmap::IndexSet;
use tracing::{debug, info, warn};
use av_core::{Metric, RawStationRow};

/// Only stations with this status are kept
pub const IN_SERVICE: &str = "In Service";

/// Off-peak bucket that is never shown
pub const EXCLUDED_TIME_OF_DAY: &str = "Other";

/// A cleaned station row
#[derive(Debug, Clone, PartialEq)]
pub struct StationRecord {
    station_id: String,
    station_name: String,
    latitude: f64,
    longitude: f64,
    time_of_day: String,
    operational_status: String,
    bike_availability: f64,
    dock_availability: f64,
    bike_percent: String,
    dock_percent: String,
}

impl StationRecord {
    fn from_raw(raw: RawStationRow) -> Self {
        let bike_percent = format_percent(raw.bike_availability);
        let dock_percent = format_percent(raw.dock_availability);

        Self {
            station_id: raw.station_id,
            station_name: raw.station_name,
            latitude: raw.latitude,
            longitude: raw.longitude,
            time_of_day: raw.time_of_day,
            operational_status: raw.operational_status,
            bike_availability: raw.bike_availability,
            dock_availability: raw.dock_availability,
            bike_percent,
            dock_percent,
        }
    }

    pub fn station_id(&self) -> &str {
        &self.station_id
    }

    pub fn station_name(&self) -> &str {
        &self.station_name
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn time_of_day(&self) -> &str {
        &self.time_of_day
    }

    pub fn operational_status(&self) -> &str {
        &self.operational_status
    }

    pub fn bike_availability(&self) -> f64 {
        self.bike_availability
    }

    pub fn dock_availability(&self) -> f64 {
        self.dock_availability
    }

    /// Raw fraction in [0, 1] for a metric
    pub fn availability(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Bikes => self.bike_availability(),
            Metric::OpenDocks => self.dock_availability(),
        }
    }

    /// Display-only rounded percentage for a metric, e.g. `"90"`
    pub fn percent_label(&self, metric: Metric) -> &str {
        match metric {
            Metric::Bikes => &self.bike_percent,
            Metric::OpenDocks => &self.dock_percent,
        }
    }
}

/// Round `fraction * 100` half to even and format it
pub fn format_percent(fraction: f64) -> String {
    format!("{}", (fraction * 100.0).round_ties_even() as i64)
}

/// Ordered sequence of retained station records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<StationRecord>,
}

impl Dataset {
    /// Build the dataset, keeping in-service stations outside the "Other" bucket
    pub fn load(rows: impl IntoIterator<Item = RawStationRow>) -> Self {
        let mut rows_read = 0usize;
        let mut records = Vec::new();

        for raw in rows {
            rows_read += 1;

            if !is_retained(&raw) {
                continue;
            }
            if !is_fraction(raw.bike_availability) || !is_fraction(raw.dock_availability) {
                warn!(
                    "Dropping station '{}' ({}): availability outside [0, 1] (bikes {}, docks {})",
                    raw.station_name, raw.time_of_day, raw.bike_availability, raw.dock_availability
                );
                continue;
            }

            records.push(StationRecord::from_raw(raw));
        }

        let dataset = Self { records };
        info!(
            "Loaded {} of {} rows ({} stations) across {} time-of-day buckets",
            dataset.len(),
            rows_read,
            dataset.station_count(),
            dataset.distinct_time_of_day_buckets().len()
        );
        dataset
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[StationRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &StationRecord> {
        self.records.iter()
    }

    /// Number of distinct station ids
    pub fn station_count(&self) -> usize {
        self.records
            .iter()
            .map(StationRecord::station_id)
            .collect::<IndexSet<_>>()
            .len()
    }

    /// Buckets in first-seen order
    pub fn distinct_time_of_day_buckets(&self) -> IndexSet<String> {
        self.records
            .iter()
            .map(|record| record.time_of_day.clone())
            .collect()
    }

    /// Records for one bucket, in original order
    ///
    /// An absent bucket yields an empty dataset.
    pub fn filter_by_time_of_day(&self, bucket: &str) -> Dataset {
        let records: Vec<StationRecord> = self
            .records
            .iter()
            .filter(|record| record.time_of_day == bucket)
            .cloned()
            .collect();

        debug!("Bucket '{}' matched {} of {} records", bucket, records.len(), self.len());
        Dataset { records }
    }
}

fn is_retained(raw: &RawStationRow) -> bool {
    raw.operational_status == IN_SERVICE && raw.time_of_day != EXCLUDED_TIME_OF_DAY
}

fn is_fraction(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}
