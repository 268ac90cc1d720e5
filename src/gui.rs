// ImageQA - gui.rs
//
// Top-level eframe::App implementation.
// Wires together all UI panels and manages the answer request lifecycle.

use crate::app::ask::{AskManager, AskProgress};
use crate::app::state::AppState;
use crate::core::export;
use crate::core::model::{ConversationEntry, SessionEvent};
use crate::ui;
use crate::util::constants::{ANSWER_POLL_INTERVAL_MS, EXPORT_FILE_NAME, UPLOAD_EXTENSIONS};
use crate::util::error::{ImageQaError, Result};
use std::path::Path;

/// The image question answering application.
pub struct ImageQaApp {
    pub state: AppState,
    pub ask_manager: AskManager,
    /// Texture for the current image; rebuilt on `ImageChanged`.
    preview: Option<egui::TextureHandle>,
    theme_applied: bool,
}

impl ImageQaApp {
    /// Create a new application instance with the given state.
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            ask_manager: AskManager::new(),
            preview: None,
            theme_applied: false,
        }
    }

    /// Rebuild the preview texture from the session's current image.
    fn refresh_preview(&mut self, ctx: &egui::Context) {
        self.preview = self.state.session.image().map(|image| {
            let max = ui::theme::PREVIEW_TEXTURE_MAX;
            let pixels = image.pixels();
            let rgba = if pixels.width() > max || pixels.height() > max {
                pixels.thumbnail(max, max).to_rgba8()
            } else {
                pixels.to_rgba8()
            };
            let size = [rgba.width() as usize, rgba.height() as usize];
            let colour_image = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
            ctx.load_texture("image_preview", colour_image, egui::TextureOptions::LINEAR)
        });
    }

    /// Write the history to `dest` and report the outcome in the status bar.
    fn export_to(&mut self, dest: &Path) {
        match write_export(self.state.session.history(), dest) {
            Ok(n) => {
                tracing::info!(path = %dest.display(), entries = n, "History exported");
                self.state.status_message =
                    format!("Exported {n} question(s) to {}.", dest.display());
            }
            Err(e) => {
                tracing::warn!(error = %e, "History export failed");
                self.state.report_error(e.to_string());
            }
        }
    }

    /// Handle the request flags panels and the menu set during the last frame.
    fn handle_requests(&mut self) {
        if self.state.request_open_dialog {
            self.state.request_open_dialog = false;
            if let Some(path) = rfd::FileDialog::new()
                .add_filter("Images", UPLOAD_EXTENSIONS)
                .pick_file()
            {
                self.state.pending_upload = Some(path);
            }
        }

        if let Some(path) = self.state.pending_upload.take() {
            self.state.upload_from_path(&path);
        }

        if self.state.request_submit {
            self.state.request_submit = false;
            if let Some(pending) = self.state.begin_submit() {
                self.ask_manager
                    .start(pending, self.state.answer_config.clamped());
            }
        }

        if self.state.request_export {
            self.state.request_export = false;
            let mut dialog = rfd::FileDialog::new()
                .add_filter("Text", &["txt"])
                .add_filter("JSON", &["json"])
                .set_file_name(EXPORT_FILE_NAME);
            if let Some(dir) = self.state.export_dir.as_deref().filter(|d| d.is_dir()) {
                dialog = dialog.set_directory(dir);
            }
            if let Some(dest) = dialog.save_file() {
                self.export_to(&dest);
            }
        }
    }
}

/// Text export, or JSON when the file name ends in `.json`.
fn write_export(entries: &[ConversationEntry], dest: &Path) -> Result<usize> {
    let file = std::fs::File::create(dest).map_err(|e| ImageQaError::Io {
        path: dest.to_path_buf(),
        operation: "create export file",
        source: e,
    })?;
    let written = if export::wants_json(dest) {
        export::write_history_json(entries, file, dest)?
    } else {
        export::write_history_text(entries, file, dest)?
    };
    Ok(written)
}

impl eframe::App for ImageQaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.theme_applied {
            ui::theme::apply(ctx, self.state.session.theme());
            self.theme_applied = true;
        }

        // Poll for answers from the request thread.
        for msg in self.ask_manager.poll_progress() {
            match msg {
                AskProgress::Completed {
                    epoch,
                    question,
                    answerer,
                    elapsed,
                    result,
                } => {
                    tracing::debug!(elapsed_ms = elapsed.as_millis() as u64, "Answer delivered");
                    self.state.apply_answer(epoch, question, answerer, result);
                }
            }
        }
        // Keep polling while a request is outstanding.
        if self.state.session.is_awaiting_answer() {
            ctx.request_repaint_after(std::time::Duration::from_millis(ANSWER_POLL_INTERVAL_MS));
        }

        // Files dropped onto the window: only the first one is used.
        let dropped = ctx.input(|i| i.raw.dropped_files.first().cloned());
        if let Some(file) = dropped {
            if let Some(path) = file.path {
                self.state.pending_upload = Some(path);
            } else if let Some(bytes) = file.bytes {
                let declared = Path::new(&file.name)
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(str::to_string);
                self.state
                    .upload_bytes(bytes.to_vec(), declared.as_deref(), &file.name);
            }
        }

        self.handle_requests();

        // React to session changes.
        for event in self.state.session.take_events() {
            match event {
                SessionEvent::ImageChanged => self.refresh_preview(ctx),
                SessionEvent::ThemeChanged => ui::theme::apply(ctx, self.state.session.theme()),
                SessionEvent::HistoryChanged | SessionEvent::PhaseChanged => {}
            }
        }

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Image\u{2026}").clicked() {
                        self.state.request_open_dialog = true;
                        ui.close_menu();
                    }
                    ui.add_enabled_ui(self.state.export_available(), |ui| {
                        if ui.button("Export History\u{2026}").clicked() {
                            self.state.request_export = true;
                            ui.close_menu();
                        }
                    });
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
                ui.menu_button("View", |ui| {
                    if ui.button("Debug Information").clicked() {
                        self.state.show_debug = true;
                        ui.close_menu();
                    }
                    if ui.button("About").clicked() {
                        self.state.show_about = true;
                        ui.close_menu();
                    }
                });
            });
        });

        // Status bar
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.state.session.is_awaiting_answer() {
                    ui.spinner();
                }
                match self.state.last_error {
                    Some(ref err) if *err == self.state.status_message => {
                        ui.colored_label(ui::theme::ERROR_TEXT, err);
                    }
                    _ => {
                        ui.label(&self.state.status_message);
                    }
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let count = self.state.session.question_count();
                    if count > 0 {
                        ui.label(format!("{count} question(s)"));
                    }
                });
            });
        });

        egui::SidePanel::right("settings")
            .default_width(ui::theme::SETTINGS_PANEL_WIDTH)
            .resizable(true)
            .show(ctx, |ui| {
                ui::panels::settings::render(ui, &mut self.state);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            let preset = self.state.session.theme();
            ui.vertical_centered(|ui| {
                ui.label(ui::theme::gradient_text(
                    &format!("\u{1f5bc} {}", crate::util::constants::APP_NAME),
                    preset,
                    ui::theme::TITLE_SIZE,
                ));
                ui.label(
                    egui::RichText::new("Upload an image and ask questions about it")
                        .weak(),
                );
            });
            ui.add_space(8.0);

            let preview = self.preview.as_ref();
            let state = &mut self.state;
            ui.columns(2, |cols| {
                egui::ScrollArea::vertical()
                    .id_salt("upload_column")
                    .show(&mut cols[0], |ui| {
                        ui::panels::upload::render(ui, state, preview);
                    });
                ui::panels::ask::render(&mut cols[1], state);
            });
        });

        ui::panels::about::render(ctx, &mut self.state);
        ui::panels::debug::render(ctx, &mut self.state);
    }
}
