//! Color utilities for plots and map shapes

use egui::Color32;
use gv_core::ValueRange;

/// Fill for features without a numeric value
pub const NEUTRAL_GREY: Color32 = Color32::from_rgb(128, 128, 128);

/// Histogram bar base color, `rgb(31, 119, 180)`
pub const BAR_BLUE: (u8, u8, u8) = (31, 119, 180);

/// Convert HSL (hue in degrees, saturation and lightness in 0..=1) to RGB
pub fn hsl_to_color(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let h = hue.rem_euclid(360.0) / 60.0;
    let s = saturation.clamp(0.0, 1.0);
    let l = lightness.clamp(0.0, 1.0);

    let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = l - chroma / 2.0;

    let channel = |c: f32| ((c + m) * 255.0).round() as u8;
    Color32::from_rgb(channel(r), channel(g), channel(b))
}

/// Position of `value` within `range`, 0 for a degenerate range
pub fn ramp_ratio(value: f64, range: ValueRange) -> f32 {
    let span = range.span();
    if span <= 0.0 || !span.is_finite() {
        return 0.0;
    }
    ((value - range.min) / span).clamp(0.0, 1.0) as f32
}

/// Yellow-to-red ramp: `hsl((1 - ratio) * 60, 100%, 50%)`
pub fn ramp_color(value: Option<f64>, range: Option<ValueRange>) -> Color32 {
    match (value.filter(|v| v.is_finite()), range) {
        (Some(v), Some(range)) => {
            let ratio = ramp_ratio(v, range);
            hsl_to_color((1.0 - ratio) * 60.0, 1.0, 0.5)
        }
        _ => NEUTRAL_GREY,
    }
}

/// Histogram bar color for a bin whose `ratio` of features is selected
pub fn emphasis_color(ratio: f32) -> Color32 {
    let alpha = 0.7 + 0.3 * ratio.clamp(0.0, 1.0);
    let (r, g, b) = BAR_BLUE;
    Color32::from_rgba_unmultiplied(r, g, b, (alpha * 255.0).round() as u8)
}
