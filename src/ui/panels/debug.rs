// ImageQA - ui/panels/debug.rs
//
// Debug information window, toggled by "Show debug information" or
// View > Debug Information. Read-only view of the session.

use crate::app::state::AppState;

/// Render the debug window (if `state.show_debug` is true).
pub fn render(ctx: &egui::Context, state: &mut AppState) {
    if !state.show_debug {
        return;
    }

    let mut open = true;
    egui::Window::new("\u{1f41b} Debug Information")
        .open(&mut open)
        .default_width(320.0)
        .show(ctx, |ui| {
            egui::Grid::new("debug_grid")
                .num_columns(2)
                .striped(true)
                .show(ui, |ui| {
                    let session = &state.session;
                    row(ui, "Phase", session.phase().label());
                    row(ui, "Epoch", &session.epoch().to_string());
                    match session.image() {
                        Some(image) => {
                            let info = image.info();
                            row(ui, "Image format", info.format.label());
                            row(ui, "Image size", &info.dimensions_label());
                            row(ui, "Colour type", &format!("{:?}", image.color_type()));
                            row(ui, "Bytes", &image.bytes().len().to_string());
                        }
                        None => row(ui, "Image", "none"),
                    }
                    row(ui, "History length", &session.history().len().to_string());
                    row(ui, "Theme", session.theme().name());
                    let endpoint = if state.answer_config.has_endpoint() {
                        state.answer_config.endpoint.as_str()
                    } else {
                        "(placeholder)"
                    };
                    row(ui, "Endpoint", endpoint);
                    row(ui, "Last answerer", state.last_answerer.unwrap_or("-"));
                    row(ui, "Warnings", &state.warnings.len().to_string());
                });

            if !state.warnings.is_empty() {
                ui.separator();
                for warning in &state.warnings {
                    ui.label(egui::RichText::new(warning).small().weak());
                }
            }
        });

    if !open {
        state.show_debug = false;
    }
}

fn row(ui: &mut egui::Ui, label: &str, value: &str) {
    ui.label(label);
    ui.monospace(value);
    ui.end_row();
}
