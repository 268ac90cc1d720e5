// ImageQA - ui/panels/settings.rs
//
// Right-hand settings panel:
//   1. Theme selector
//   2. Model Configuration   (endpoint, API key, temperature, max tokens)
//   3. Image Preprocessing   (resize toggle, max dimension)
//   4. Additional Options    (debug window, save history)
//   5. Export Data           (only with history and saving enabled)
//   6. Session Stats         (only with history)
//
// Numeric widgets are bounded by the ranges in util::constants; the frame
// loop clamps again before each submission.

use crate::app::state::AppState;
use crate::core::theme::ThemePreset;
use crate::ui::panels::metric;
use crate::util::constants::{
    ABSOLUTE_MAX_DIMENSION, ABSOLUTE_MAX_TOKENS, MAX_DIMENSION_STEP, MAX_TEMPERATURE,
    MAX_TOKENS_STEP, MIN_MAX_DIMENSION, MIN_MAX_TOKENS, MIN_TEMPERATURE, TEMPERATURE_STEP,
};

/// Render the settings panel contents.
pub fn render(ui: &mut egui::Ui, state: &mut AppState) {
    ui.heading("\u{2699} Settings");
    ui.separator();

    egui::ScrollArea::vertical()
        .id_salt("settings")
        .show(ui, |ui| {
            theme_section(ui, state);
            ui.add_space(6.0);
            model_section(ui, state);
            preprocessing_section(ui, state);
            options_section(ui, state);

            if state.export_available() {
                ui.separator();
                export_section(ui, state);
            }

            if !state.session.history().is_empty() {
                ui.separator();
                stats_section(ui, state);
            }
        });
}

fn theme_section(ui: &mut egui::Ui, state: &mut AppState) {
    ui.label(egui::RichText::new("\u{1f3a8} Theme").strong());
    let current = state.session.theme();
    let mut selected = current;
    egui::ComboBox::from_id_salt("theme_selector")
        .selected_text(current.name())
        .width(ui.available_width() - 8.0)
        .show_ui(ui, |ui| {
            for preset in ThemePreset::ALL {
                ui.selectable_value(&mut selected, preset, preset.name());
            }
        });
    if selected != current {
        state.select_theme(selected);
    }
}

fn model_section(ui: &mut egui::Ui, state: &mut AppState) {
    egui::CollapsingHeader::new("\u{1f916} Model Configuration")
        .default_open(true)
        .show(ui, |ui| {
            let config = &mut state.answer_config;

            ui.label("Model endpoint:");
            ui.add(
                egui::TextEdit::singleline(&mut config.endpoint)
                    .hint_text("https://api.example.com/v1/model")
                    .desired_width(f32::INFINITY),
            )
            .on_hover_text("Leave empty to use the built-in placeholder responder");

            ui.label("API key:");
            ui.add(
                egui::TextEdit::singleline(config.api_key.as_mut_string())
                    .password(true)
                    .hint_text("Enter your API key")
                    .desired_width(f32::INFINITY),
            );

            ui.add_space(4.0);
            ui.label("Temperature:");
            ui.add(
                egui::Slider::new(&mut config.temperature, MIN_TEMPERATURE..=MAX_TEMPERATURE)
                    .step_by(TEMPERATURE_STEP)
                    .fixed_decimals(1),
            )
            .on_hover_text("Higher values make output more random");

            ui.label("Max tokens:");
            ui.add(
                egui::Slider::new(&mut config.max_tokens, MIN_MAX_TOKENS..=ABSOLUTE_MAX_TOKENS)
                    .step_by(MAX_TOKENS_STEP),
            )
            .on_hover_text("Maximum length of the response");

            let source = if config.has_endpoint() {
                "Answers from the configured endpoint."
            } else {
                "No endpoint set: answers are placeholders."
            };
            ui.label(egui::RichText::new(source).small().weak());
        });
}

fn preprocessing_section(ui: &mut egui::Ui, state: &mut AppState) {
    egui::CollapsingHeader::new("\u{1f5bc} Image Preprocessing")
        .default_open(true)
        .show(ui, |ui| {
            let pre = &mut state.answer_config.preprocessing;
            ui.checkbox(&mut pre.resize_enabled, "Resize image")
                .on_hover_text("Resize the image before sending it to the model");
            if pre.resize_enabled {
                ui.label("Max dimension:");
                ui.add(
                    egui::Slider::new(
                        &mut pre.max_dimension,
                        MIN_MAX_DIMENSION..=ABSOLUTE_MAX_DIMENSION,
                    )
                    .step_by(MAX_DIMENSION_STEP)
                    .suffix(" px"),
                );
            }
        });
}

fn options_section(ui: &mut egui::Ui, state: &mut AppState) {
    egui::CollapsingHeader::new("\u{1f527} Additional Options")
        .default_open(false)
        .show(ui, |ui| {
            ui.checkbox(&mut state.show_debug, "Show debug information");
            ui.checkbox(&mut state.save_history, "Save conversation history");
        });
}

fn export_section(ui: &mut egui::Ui, state: &mut AppState) {
    ui.label(egui::RichText::new("\u{1f4be} Export Data").strong());
    ui.horizontal(|ui| {
        if ui.button("\u{1f4e5} Download History").clicked() {
            state.request_export = true;
        }
        if ui.button("\u{1f4cb} Copy to Clipboard").clicked() {
            ui.ctx().copy_text(state.history_report());
            state.status_message = "Conversation history copied to clipboard.".to_string();
        }
    });
}

fn stats_section(ui: &mut egui::Ui, state: &AppState) {
    ui.label(egui::RichText::new("\u{1f4ca} Session Stats").strong());
    ui.columns(2, |cols| {
        metric(
            &mut cols[0],
            "Questions Asked",
            &state.session.question_count().to_string(),
        );
        let image = if state.session.has_image() {
            "\u{2713}"
        } else {
            "\u{2717}"
        };
        metric(&mut cols[1], "Image Loaded", image);
    });
}
