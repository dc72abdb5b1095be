//! Scene composition
//!
//! Turns a filtered dataset, a metric and a camera into a scene descriptor.
//! Composition is pure: the same inputs always give an equal scene.

use av_core::{CameraState, ColorScale, Marker, Metric, SceneDescriptor};
use av_data::config::DEFAULT_MARKER_SIZE;
use av_data::{Dataset, StationRecord};

/// Builds scenes with a fixed marker size and color scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewComposer {
    marker_size: f32,
    color_scale: ColorScale,
}

impl ViewComposer {
    pub fn new(marker_size: f32) -> Self {
        Self {
            marker_size,
            color_scale: ColorScale::AVAILABILITY,
        }
    }

    /// One marker per record, in dataset order; the camera passes through
    pub fn compose(&self, filtered: &Dataset, metric: Metric, camera: CameraState) -> SceneDescriptor {
        let markers = filtered
            .iter()
            .map(|record| Marker {
                lat: record.latitude(),
                lon: record.longitude(),
                color_value: record.availability(metric),
                size: self.marker_size,
                label: hover_label(record, metric),
            })
            .collect();

        SceneDescriptor {
            markers,
            camera,
            color_scale: self.color_scale,
        }
    }
}

impl Default for ViewComposer {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER_SIZE)
    }
}

/// Compose with the default marker size
pub fn compose(filtered: &Dataset, metric: Metric, camera: CameraState) -> SceneDescriptor {
    ViewComposer::default().compose(filtered, metric, camera)
}

/// e.g. `"W 52 St & 11 Ave<br />Bikes available 90% of the time"`
pub fn hover_label(record: &StationRecord, metric: Metric) -> String {
    format!(
        "{}<br />{} available {}% of the time",
        record.station_name(),
        metric.capitalized(),
        record.percent_label(metric)
    )
}
