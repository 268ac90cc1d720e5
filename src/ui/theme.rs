// ImageQA - ui/theme.rs
//
// Maps theme presets onto egui visuals, plus shared colours and layout
// constants. No dependencies on app state or business logic.

use crate::core::theme::{Rgb, ThemePreset};
use egui::text::LayoutJob;
use egui::{Color32, FontId, Stroke, TextFormat, Visuals};

/// Convert a preset colour to egui.
pub fn colour(rgb: Rgb) -> Color32 {
    Color32::from_rgb(rgb.0, rgb.1, rgb.2)
}

pub fn primary(preset: ThemePreset) -> Color32 {
    colour(preset.primary())
}

pub fn secondary(preset: ThemePreset) -> Color32 {
    colour(preset.secondary())
}

/// Linear blend between the preset's primary (t = 0) and secondary (t = 1).
pub fn gradient_at(preset: ThemePreset, t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    let (a, b) = (preset.primary(), preset.secondary());
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    Color32::from_rgb(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Base visuals with the preset's accents applied.
pub fn visuals_for(preset: ThemePreset) -> Visuals {
    let mut visuals = if preset.is_dark() {
        Visuals::dark()
    } else {
        Visuals::light()
    };
    let accent = primary(preset);
    visuals.selection.bg_fill = accent;
    visuals.selection.stroke = Stroke::new(1.0, Color32::WHITE);
    visuals.hyperlink_color = secondary(preset);
    visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, accent);
    visuals.widgets.active.bg_stroke = Stroke::new(1.5, accent);
    visuals
}

/// Apply `preset` to the whole context.
pub fn apply(ctx: &egui::Context, preset: ThemePreset) {
    ctx.set_visuals(visuals_for(preset));
    tracing::debug!(theme = preset.name(), "Theme applied");
}

/// `text` with each character tinted along the preset gradient.
pub fn gradient_text(text: &str, preset: ThemePreset, size: f32) -> LayoutJob {
    let mut job = LayoutJob::default();
    let count = text.chars().count().max(2) - 1;
    for (i, ch) in text.chars().enumerate() {
        let mut buf = [0u8; 4];
        job.append(
            ch.encode_utf8(&mut buf),
            0.0,
            TextFormat {
                font_id: FontId::proportional(size),
                color: gradient_at(preset, i as f32 / count as f32),
                ..Default::default()
            },
        );
    }
    job
}

/// "No image" warning card.
pub const WARNING_BG: Color32 = Color32::from_rgb(0xff, 0xf3, 0xcd);
pub const WARNING_TEXT: Color32 = Color32::from_rgb(0x85, 0x64, 0x04);

/// Error text in the status bar and question panel.
pub const ERROR_TEXT: Color32 = Color32::from_rgb(220, 38, 38); // Red 600

/// Layout constants.
pub const SETTINGS_PANEL_WIDTH: f32 = 300.0;
pub const PREVIEW_MAX_HEIGHT: f32 = 420.0;
pub const TITLE_SIZE: f32 = 32.0;
pub const EMPTY_CARD_HEIGHT: f32 = 180.0;

/// Longest preview texture side; larger uploads are thumbnailed for display.
pub const PREVIEW_TEXTURE_MAX: u32 = 2048;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_endpoints() {
        let p = ThemePreset::SunsetOrange;
        assert_eq!(gradient_at(p, 0.0), primary(p));
        assert_eq!(gradient_at(p, 1.0), secondary(p));
        assert_eq!(gradient_at(p, 7.0), secondary(p));
    }

    #[test]
    fn test_visuals_follow_preset() {
        assert!(visuals_for(ThemePreset::DarkMode).dark_mode);
        let light = visuals_for(ThemePreset::OceanBlue);
        assert!(!light.dark_mode);
        assert_eq!(light.selection.bg_fill, Color32::from_rgb(0x2e, 0x31, 0x92));
    }

    #[test]
    fn test_gradient_text_one_section_per_char() {
        let job = gradient_text("Ask", ThemePreset::RosePink, 20.0);
        assert_eq!(job.sections.len(), 3);
        assert_eq!(job.text, "Ask");
    }
}
