//! Color lookup for availability markers

use av_core::{ColorScale, Rgb};

/// Color for an absolute value on a scale
///
/// This is the reference mapping a front end applies to `Marker::color_value`
/// when it draws a scene; figures carry the stops and fixed `cmin`/`cmax`
/// bounds rather than per-marker colors.
///
/// Values are clamped to [0, 1]; NaN maps to the low stop. The result never
/// depends on other values in the scene.
pub fn scale_color(scale: &ColorScale, value: f64) -> Rgb {
    let t = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };

    for pair in scale.stops.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        if t <= hi.position {
            let span = hi.position - lo.position;
            let s = if span > 0.0 { (t - lo.position) / span } else { 0.0 };
            return Rgb::new(
                lerp(lo.color.r, hi.color.r, s),
                lerp(lo.color.g, hi.color.g, s),
                lerp(lo.color.b, hi.color.b, s),
            );
        }
    }

    scale.high()
}

/// Red-gray-green availability color
pub fn availability_color(value: f64) -> Rgb {
    scale_color(&ColorScale::AVAILABILITY, value)
}

fn lerp(a: u8, b: u8, s: f64) -> u8 {
    (a as f64 * (1.0 - s) + b as f64 * s).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stops_are_exact() {
        let scale = ColorScale::AVAILABILITY;
        assert_eq!(availability_color(0.0), scale.low());
        assert_eq!(availability_color(0.5), scale.neutral());
        assert_eq!(availability_color(1.0), scale.high());
    }

    #[test]
    fn test_midpoints_interpolate() {
        // Halfway between #C65C2F and #DCDCDC
        assert_eq!(availability_color(0.25), Rgb::new(0xD1, 0x9C, 0x86));
        // Halfway between #DCDCDC and #4E8681
        assert_eq!(availability_color(0.75), Rgb::new(0x95, 0xB1, 0xAF));
    }

    #[test]
    fn test_out_of_range_clamps() {
        let scale = ColorScale::AVAILABILITY;
        assert_eq!(availability_color(-0.3), scale.low());
        assert_eq!(availability_color(1.7), scale.high());
        assert_eq!(availability_color(f64::NAN), scale.low());
    }
}
