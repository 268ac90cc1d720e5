// ImageQA - ui/panels/upload.rs
//
// Left column: image preview with dimension/format metrics and the clear
// button, or the drop-target card when no image is loaded.

use crate::app::state::AppState;
use crate::ui::panels::metric;
use crate::ui::theme;

/// Render the upload column.
///
/// `preview` is the texture built by the frame loop for the current image.
pub fn render(ui: &mut egui::Ui, state: &mut AppState, preview: Option<&egui::TextureHandle>) {
    ui.heading("\u{1f4e4} Image Upload");
    ui.separator();

    let preset = state.session.theme();

    let Some(info) = state.session.image_info() else {
        let card_width = ui.available_width();
        egui::Frame::group(ui.style())
            .fill(theme::primary(preset))
            .show(ui, |ui| {
                ui.set_min_size(egui::vec2(card_width - 16.0, theme::EMPTY_CARD_HEIGHT));
                ui.vertical_centered(|ui| {
                    ui.add_space(40.0);
                    ui.label(
                        egui::RichText::new("\u{1f446} Drop your image here")
                            .size(22.0)
                            .strong()
                            .color(egui::Color32::WHITE),
                    );
                    ui.add_space(6.0);
                    ui.label(egui::RichText::new("or click to browse").color(egui::Color32::WHITE));
                    ui.add_space(10.0);
                    if ui
                        .button("Browse\u{2026}")
                        .on_hover_text("Upload an image file to analyze (PNG, JPEG, BMP, GIF)")
                        .clicked()
                    {
                        state.request_open_dialog = true;
                    }
                });
            });
        return;
    };

    if let Some(texture) = preview {
        ui.add(
            egui::Image::from_texture(texture)
                .max_width(ui.available_width())
                .max_height(theme::PREVIEW_MAX_HEIGHT)
                .maintain_aspect_ratio(true),
        );
    }

    if let Some(ref name) = state.image_name {
        ui.label(egui::RichText::new(name).small().weak());
    }
    ui.add_space(6.0);

    ui.columns(2, |cols| {
        metric(&mut cols[0], "\u{1f4d0} Dimensions", &info.dimensions_label());
        metric(&mut cols[1], "\u{1f4c1} Format", info.format.label());
    });

    ui.add_space(8.0);
    ui.horizontal(|ui| {
        if ui.button("\u{1f5d1} Clear Image").clicked() {
            state.clear_image();
        }
        if ui.button("Replace\u{2026}").clicked() {
            state.request_open_dialog = true;
        }
    });
}
