//! Scene descriptor handed to rendering surfaces

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::state::CameraState;

/// An opaque RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#RRGGBB` form
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// A color pinned to a position in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub position: f64,
    pub color: Rgb,
}

/// Gradient over absolute color values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorScale {
    pub stops: [ColorStop; 3],
}

impl ColorScale {
    /// Red at 0%, gray at 50%, green at 100%
    pub const AVAILABILITY: ColorScale = ColorScale {
        stops: [
            ColorStop {
                position: 0.0,
                color: Rgb::new(0xC6, 0x5C, 0x2F),
            },
            ColorStop {
                position: 0.5,
                color: Rgb::new(0xDC, 0xDC, 0xDC),
            },
            ColorStop {
                position: 1.0,
                color: Rgb::new(0x4E, 0x86, 0x81),
            },
        ],
    };

    pub fn low(&self) -> Rgb {
        self.stops[0].color
    }

    pub fn neutral(&self) -> Rgb {
        self.stops[1].color
    }

    pub fn high(&self) -> Rgb {
        self.stops[2].color
    }
}

impl Default for ColorScale {
    fn default() -> Self {
        Self::AVAILABILITY
    }
}

/// One station marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub lat: f64,
    pub lon: f64,
    /// Raw availability fraction in [0, 1]
    pub color_value: f64,
    pub size: f32,
    /// Hover text
    pub label: String,
}

/// Render-ready output of one update cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescriptor {
    pub markers: Vec<Marker>,
    pub camera: CameraState,
    pub color_scale: ColorScale,
}

impl SceneDescriptor {
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}
