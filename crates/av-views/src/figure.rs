//! Plotly `scattermapbox` figure output
//!
//! Writes each scene as one JSON line a Plotly front end can draw directly.

use std::io::Write;

use serde_json::{json, Value};
use tracing::debug;

use av_core::{RenderError, RenderSurface, SceneDescriptor};

/// Rendering surface that writes Plotly figures to a sink
pub struct FigureSurface<W: Write> {
    sink: W,
    access_token: Option<String>,
}

impl<W: Write> FigureSurface<W> {
    /// The token is passed through to the map provider untouched
    pub fn new(sink: W, access_token: Option<String>) -> Self {
        Self { sink, access_token }
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

impl<W: Write> RenderSurface for FigureSurface<W> {
    fn surface_name(&self) -> &str {
        "plotly-figure"
    }

    fn render(&mut self, scene: &SceneDescriptor) -> Result<(), RenderError> {
        let token = match self.access_token.as_deref() {
            Some(token) if !token.trim().is_empty() => token,
            _ => return Err(RenderError::MissingCredential),
        };

        let figure = figure_json(scene, token);
        serde_json::to_writer(&mut self.sink, &figure)?;
        self.sink.write_all(b"\n")?;
        self.sink.flush()?;

        debug!("Wrote figure with {} markers", scene.markers.len());
        Ok(())
    }
}

/// Build the Plotly figure for a scene
pub fn figure_json(scene: &SceneDescriptor, access_token: &str) -> Value {
    let lat: Vec<f64> = scene.markers.iter().map(|m| m.lat).collect();
    let lon: Vec<f64> = scene.markers.iter().map(|m| m.lon).collect();
    let color: Vec<f64> = scene.markers.iter().map(|m| m.color_value).collect();
    let text: Vec<&str> = scene.markers.iter().map(|m| m.label.as_str()).collect();
    let size = scene.markers.first().map(|m| m.size);

    let colorscale: Vec<Value> = scene
        .color_scale
        .stops
        .iter()
        .map(|stop| json!([stop.position, stop.color.to_hex()]))
        .collect();

    json!({
        "data": [{
            "lat": lat,
            "lon": lon,
            "marker": {
                "color": color,
                "colorscale": colorscale,
                "cmin": 0.0,
                "cmax": 1.0,
                "size": size,
            },
            "text": text,
            "hoverinfo": "text",
            "type": "scattermapbox",
        }],
        "layout": {
            "mapbox": {
                "center": {
                    "lat": scene.camera.lat,
                    "lon": scene.camera.lon,
                },
                "zoom": scene.camera.zoom,
                "pitch": scene.camera.pitch,
                "accesstoken": access_token,
            },
            "margin": { "l": 0, "r": 0, "b": 0, "t": 0 },
        },
    })
}
