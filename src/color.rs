use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::{Category, Pollutant};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize, saturation: f32, lightness: f32) -> Vec<Color32> {
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let rgb: Srgb = Hsl::new(hue, saturation, lightness).into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

/// Softer variant for pie-style breakdowns.
pub fn pastel_palette(n: usize) -> Vec<Color32> {
    generate_palette(n, 0.6, 0.75)
}

pub const TREND_COLOR: Color32 = Color32::from_rgb(0x90, 0xCA, 0xF9);

pub fn pollutant_color(pollutant: Pollutant) -> Color32 {
    let palette = generate_palette(Pollutant::ALL.len(), 0.75, 0.55);
    palette[pollutant as usize]
}

pub fn category_color(category: Category) -> Color32 {
    let palette = pastel_palette(Category::ALL.len());
    palette[category as usize]
}

// ---------------------------------------------------------------------------
// Color mapping: station → Color32
// ---------------------------------------------------------------------------

/// Maps labels (e.g. station identifiers) to distinct colours.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
}

impl ColorMap {
    pub fn new<'a>(labels: impl IntoIterator<Item = &'a String>) -> Self {
        let labels: Vec<&String> = labels.into_iter().collect();
        let palette = generate_palette(labels.len(), 0.75, 0.55);
        let mapping = labels
            .into_iter()
            .zip(palette)
            .map(|(label, c)| (label.clone(), c))
            .collect();
        ColorMap { mapping }
    }

    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping.get(label).copied().unwrap_or(Color32::GRAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_colours_are_distinct() {
        let p = generate_palette(4, 0.75, 0.55);
        assert_eq!(p.len(), 4);
        for (i, a) in p.iter().enumerate() {
            assert!(p[i + 1..].iter().all(|b| a != b));
        }
        assert!(generate_palette(0, 0.75, 0.55).is_empty());
    }

    #[test]
    fn test_unknown_label_is_gray() {
        let stations = vec!["Dongsi".to_string(), "Wanliu".to_string()];
        let map = ColorMap::new(&stations);
        assert_ne!(map.color_for("Dongsi"), map.color_for("Wanliu"));
        assert_eq!(map.color_for("Tiantan"), Color32::GRAY);
    }
}
