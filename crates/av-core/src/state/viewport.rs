//! Viewport as reported back by the rendering surface

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::CameraState;

/// Why a reported viewport cannot become the camera
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ViewportError {
    #[error("reported viewport is missing '{0}'")]
    MissingField(&'static str),

    #[error("reported viewport has a non-finite '{0}'")]
    NonFinite(&'static str),

    #[error("reported viewport has a negative '{0}': {1}")]
    Negative(&'static str, f64),
}

/// Map center inside a relayout report
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportedCenter {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

/// Viewport fields from a relayout report
///
/// Every field is optional on the wire. A report only becomes a camera when
/// all four values are present; partial reports are rejected rather than
/// merged with the current camera.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportedViewport {
    #[serde(rename = "mapbox.center", default)]
    pub center: Option<ReportedCenter>,

    #[serde(rename = "mapbox.zoom", default)]
    pub zoom: Option<f64>,

    #[serde(rename = "mapbox.pitch", default)]
    pub pitch: Option<f64>,
}

impl ReportedViewport {
    /// A complete report
    pub fn new(lat: f64, lon: f64, zoom: f64, pitch: f64) -> Self {
        Self {
            center: Some(ReportedCenter {
                lat: Some(lat),
                lon: Some(lon),
            }),
            zoom: Some(zoom),
            pitch: Some(pitch),
        }
    }

    /// Convert to a camera, taking every value verbatim
    pub fn into_camera(self) -> Result<CameraState, ViewportError> {
        let center = self.center.unwrap_or_default();
        let lat = finite("mapbox.center.lat", center.lat)?;
        let lon = finite("mapbox.center.lon", center.lon)?;
        let zoom = non_negative("mapbox.zoom", self.zoom)?;
        let pitch = non_negative("mapbox.pitch", self.pitch)?;

        Ok(CameraState { lat, lon, zoom, pitch })
    }
}

fn finite(field: &'static str, value: Option<f64>) -> Result<f64, ViewportError> {
    match value {
        None => Err(ViewportError::MissingField(field)),
        Some(v) if !v.is_finite() => Err(ViewportError::NonFinite(field)),
        Some(v) => Ok(v),
    }
}

fn non_negative(field: &'static str, value: Option<f64>) -> Result<f64, ViewportError> {
    let v = finite(field, value)?;
    if v < 0.0 {
        return Err(ViewportError::Negative(field, v));
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_report_is_verbatim() {
        let camera = ReportedViewport::new(41.0, -74.0, 13.0, 5.0)
            .into_camera()
            .unwrap();
        assert_eq!(camera, CameraState::new(41.0, -74.0, 13.0, 5.0));
    }

    #[test]
    fn test_partial_report_is_rejected() {
        let mut report = ReportedViewport::new(41.0, -74.0, 13.0, 5.0);
        report.pitch = None;
        assert_eq!(
            report.into_camera(),
            Err(ViewportError::MissingField("mapbox.pitch"))
        );

        let report = ReportedViewport {
            center: None,
            zoom: Some(12.0),
            pitch: Some(0.0),
        };
        assert_eq!(
            report.into_camera(),
            Err(ViewportError::MissingField("mapbox.center.lat"))
        );
    }

    #[test]
    fn test_negative_zoom_is_rejected() {
        let report = ReportedViewport::new(41.0, -74.0, -1.0, 0.0);
        assert_eq!(
            report.into_camera(),
            Err(ViewportError::Negative("mapbox.zoom", -1.0))
        );
    }

    #[test]
    fn test_non_finite_is_rejected() {
        let report = ReportedViewport::new(f64::NAN, -74.0, 11.0, 0.0);
        assert!(matches!(
            report.into_camera(),
            Err(ViewportError::NonFinite("mapbox.center.lat"))
        ));
    }

    #[test]
    fn test_deserialize_relayout_keys() {
        let json = r#"{
            "mapbox.center": {"lat": 40.75, "lon": -73.98},
            "mapbox.zoom": 12.5,
            "mapbox.pitch": 30
        }"#;
        let report: ReportedViewport = serde_json::from_str(json).unwrap();
        assert_eq!(
            report.into_camera().unwrap(),
            CameraState::new(40.75, -73.98, 12.5, 30.0)
        );
    }

    #[test]
    fn test_deserialize_zoom_only() {
        let report: ReportedViewport = serde_json::from_str(r#"{"mapbox.zoom": 14}"#).unwrap();
        assert_eq!(report.zoom, Some(14.0));
        assert!(report.center.is_none());
        assert!(report.into_camera().is_err());
    }
}
