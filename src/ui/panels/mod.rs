// ImageQA - ui/panels/mod.rs

pub mod about;
pub mod ask;
pub mod debug;
pub mod settings;
pub mod upload;

/// A label/value pair rendered as a small caption over a large value.
pub fn metric(ui: &mut egui::Ui, label: &str, value: &str) {
    ui.vertical(|ui| {
        ui.label(egui::RichText::new(label).small().weak());
        ui.label(egui::RichText::new(value).size(22.0).strong());
    });
}
