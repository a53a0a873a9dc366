//! Unit conversion utilities.
//!
//! RTF measures lengths in twips (1/1440 inch) and font sizes in half-points;
//! XAML measures both in device-independent pixels (1/96 inch).

pub const TWIPS_PER_INCH: i32 = 1440;
pub const PX_PER_INCH: i32 = 96;
pub const TWIPS_PER_PX: i32 = TWIPS_PER_INCH / PX_PER_INCH;
pub const HALF_POINTS_PER_PX: f64 = 1.5;

#[inline]
pub fn px_to_twips(px: f64) -> i32 {
    (px * TWIPS_PER_PX as f64).round() as i32
}

#[inline]
pub fn twips_to_px(twips: i32) -> f64 {
    twips as f64 / TWIPS_PER_PX as f64
}

#[inline]
pub fn px_to_half_points(px: f64) -> i32 {
    (px * HALF_POINTS_PER_PX).round() as i32
}

#[inline]
pub fn half_points_to_px(half_points: i32) -> f64 {
    half_points as f64 / HALF_POINTS_PER_PX
}

/// Format a pixel length the way XAML writers do: integral values without a
/// fraction, others rounded to two decimals with trailing zeros removed.
pub fn format_px(px: f64) -> String {
    let rounded = (px * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        let s = format!("{:.2}", rounded);
        s.trim_end_matches('0').to_string()
    }
}

/// Parse a XAML length in pixels. Accepts plain numbers and the `px`, `in`,
/// `cm` and `pt` qualifiers XAML allows.
pub fn parse_px(value: &str) -> Option<f64> {
    let value = value.trim();
    let (number, scale) = if let Some(v) = value.strip_suffix("px") {
        (v, 1.0)
    } else if let Some(v) = value.strip_suffix("in") {
        (v, PX_PER_INCH as f64)
    } else if let Some(v) = value.strip_suffix("cm") {
        (v, PX_PER_INCH as f64 / 2.54)
    } else if let Some(v) = value.strip_suffix("pt") {
        (v, PX_PER_INCH as f64 / 72.0)
    } else {
        (value, 1.0)
    };
    let n: f64 = number.trim().parse().ok()?;
    n.is_finite().then_some(n * scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twips_round_trip() {
        assert_eq!(px_to_twips(96.0), 1440);
        assert_eq!(twips_to_px(1440), 96.0);
        assert_eq!(px_to_twips(twips_to_px(300)), 300);
    }

    #[test]
    fn test_font_sizes() {
        assert_eq!(px_to_half_points(16.0), 24);
        assert_eq!(half_points_to_px(24), 16.0);
        assert_eq!(format_px(half_points_to_px(20)), "13.33");
    }

    #[test]
    fn test_parse_px() {
        assert_eq!(parse_px("12"), Some(12.0));
        assert_eq!(parse_px("12px"), Some(12.0));
        assert_eq!(parse_px("1in"), Some(96.0));
        assert_eq!(parse_px("9pt"), Some(12.0));
        assert_eq!(parse_px("Auto"), None);
        assert_eq!(parse_px("NaN"), None);
    }

    #[test]
    fn test_format_px() {
        assert_eq!(format_px(16.0), "16");
        assert_eq!(format_px(10.5), "10.5");
        assert_eq!(format_px(-2.0), "-2");
    }
}
