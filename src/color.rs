use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

fn hsl_to_color32(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let rgb: Srgb = Hsl::new(hue, saturation, lightness).into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| hsl_to_color32((i as f32 / n as f32) * 360.0, 0.75, 0.55))
        .collect()
}

// ---------------------------------------------------------------------------
// Diverging scale for the correlation heatmap
// ---------------------------------------------------------------------------

const NEGATIVE_HUE: f32 = 215.0;
const POSITIVE_HUE: f32 = 5.0;

/// Blue for negative, red for positive, fading to white at zero. Cells without
/// data are gray.
pub fn correlation_color(r: Option<f64>) -> Color32 {
    let Some(r) = r else {
        return Color32::GRAY;
    };
    let strength = r.abs().min(1.0) as f32;
    let hue = if r < 0.0 { NEGATIVE_HUE } else { POSITIVE_HUE };
    hsl_to_color32(hue, 0.7, 0.97 - 0.47 * strength)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        let p = generate_palette(5);
        assert_eq!(p.len(), 5);
        assert_ne!(p[0], p[1]);
    }

    #[test]
    fn correlation_sign_picks_hue() {
        let pos = correlation_color(Some(0.9));
        let neg = correlation_color(Some(-0.9));
        assert!(pos.r() > pos.b());
        assert!(neg.b() > neg.r());
        assert_eq!(correlation_color(None), Color32::GRAY);
    }

    #[test]
    fn weak_correlation_is_pale() {
        let weak = correlation_color(Some(0.05));
        assert!(weak.r() > 230 && weak.g() > 230 && weak.b() > 230);
    }
}
