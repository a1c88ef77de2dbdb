use crate::global_prefs::ColorScheme;
use ratatui::style::Color;

/// Stable per-author color: the string hashes to a hue, and the lightness
/// is picked so the text stays readable on the scheme's background.
pub fn colorize_string(s: &str, scheme: ColorScheme) -> Color {
    let hash = s
        .bytes()
        .fold(5381u32, |h, b| h.wrapping_mul(33).wrapping_add(b as u32));
    let hue = (hash % 360) as f32;
    let lightness = match scheme {
        ColorScheme::Dark => 0.70,
        ColorScheme::Light => 0.35,
    };
    let (r, g, b) = hsl_to_rgb(hue, 0.65, lightness);
    Color::Rgb(r, g, b)
}

fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (u8, u8, u8) {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = l - c / 2.0;
    let (r, g, b) = match h as u32 {
        0..=59 => (c, x, 0.0),
        60..=119 => (x, c, 0.0),
        120..=179 => (0.0, c, x),
        180..=239 => (0.0, x, c),
        240..=299 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let to_byte = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    (to_byte(r), to_byte(g), to_byte(b))
}
