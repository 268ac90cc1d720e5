// ImageQA - ui/panels/ask.rs
//
// Right column: question input, submit / clear-history buttons, busy
// indicator, and the conversation history (newest first).

use crate::app::state::AppState;
use crate::core::model::ConversationEntry;
use crate::core::theme::ThemePreset;
use crate::ui::theme;

/// Render the question column.
pub fn render(ui: &mut egui::Ui, state: &mut AppState) {
    ui.heading("\u{1f4ac} Ask Questions");
    ui.separator();

    let preset = state.session.theme();

    if !state.session.has_image() {
        egui::Frame::group(ui.style())
            .fill(theme::WARNING_BG)
            .show(ui, |ui| {
                ui.set_min_width(ui.available_width());
                ui.vertical_centered(|ui| {
                    ui.add_space(30.0);
                    ui.label(
                        egui::RichText::new("\u{26a0} No Image Uploaded")
                            .size(18.0)
                            .strong()
                            .color(theme::WARNING_TEXT),
                    );
                    ui.label(
                        egui::RichText::new(
                            "Please upload an image on the left to start asking questions",
                        )
                        .color(theme::WARNING_TEXT),
                    );
                    ui.add_space(30.0);
                });
            });
        return;
    }

    let awaiting = state.session.is_awaiting_answer();

    let response = ui.add_enabled(
        !awaiting,
        egui::TextEdit::singleline(&mut state.question_input)
            .hint_text("e.g., What is shown in this image? Describe the main elements...")
            .desired_width(f32::INFINITY),
    );
    let enter_pressed = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

    ui.add_space(4.0);
    ui.horizontal(|ui| {
        let submit = egui::Button::new(
            egui::RichText::new("\u{1f680} Submit Question").color(egui::Color32::WHITE),
        )
        .fill(theme::primary(preset));
        if ui.add_enabled(!awaiting, submit).clicked() || (enter_pressed && !awaiting) {
            state.request_submit = true;
        }
        if ui.button("\u{1f504} Clear History").clicked() {
            state.clear_history();
        }
    });

    if awaiting {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label("\u{1f914} Analyzing image and generating response...");
        });
    }

    if let Some(ref err) = state.last_error {
        ui.colored_label(theme::ERROR_TEXT, err);
    }

    ui.add_space(8.0);

    let history = state.session.history();
    if history.is_empty() {
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            ui.vertical_centered(|ui| {
                ui.add_space(20.0);
                ui.label(
                    egui::RichText::new("\u{1f4a1} Ready to Start!")
                        .size(18.0)
                        .strong()
                        .color(theme::primary(preset)),
                );
                ui.label(egui::RichText::new("Type your question above and click Submit").weak());
                ui.add_space(20.0);
            });
        });
        return;
    }

    ui.heading("\u{1f4dd} Conversation History");
    egui::ScrollArea::vertical()
        .id_salt("history")
        .auto_shrink([false; 2])
        .show(ui, |ui| {
            // Newest first; numbering stays chronological.
            for (idx, entry) in history.iter().enumerate().rev() {
                entry_card(ui, idx + 1, entry, preset);
                ui.add_space(6.0);
            }
        });
}

fn entry_card(ui: &mut egui::Ui, number: usize, entry: &ConversationEntry, preset: ThemePreset) {
    let accent = theme::primary(preset);
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_min_width(ui.available_width());
        ui.label(
            egui::RichText::new(format!("\u{2753} Question {number}"))
                .strong()
                .color(accent),
        );
        ui.indent(("question", number), |ui| {
            ui.label(&entry.question);
        });
        ui.add_space(4.0);
        ui.label(egui::RichText::new("\u{1f4a1} Answer").strong().color(accent));
        ui.indent(("answer", number), |ui| {
            ui.label(&entry.answer);
        });
    });
}
