// ImageQA - app/state.rs
//
// Application state. Holds the session controller, the editable model
// configuration, the question input buffer, status/error messages, and the
// request flags panels set for the frame loop in gui.rs to act on.
// Owned by the eframe::App implementation.

use crate::core::answer::AnswerConfig;
use crate::core::session::{PendingQuestion, Session};
use crate::core::theme::ThemePreset;
use crate::util::error::AnswerError;
use std::path::{Path, PathBuf};

/// Top-level application state.
#[derive(Debug)]
pub struct AppState {
    /// Image, history, theme and submission phase.
    pub session: Session,

    /// Model endpoint options as edited in the settings panel.
    pub answer_config: AnswerConfig,

    /// Text currently typed into the question field.
    pub question_input: String,

    /// File name of the current image, for display.
    pub image_name: Option<String>,

    /// Status message for the status bar.
    pub status_message: String,

    /// Most recent user-visible failure (decode, answer, export).
    pub last_error: Option<String>,

    /// Non-fatal warnings (configuration problems and the like).
    pub warnings: Vec<String>,

    /// Offer the export section. Mirrors "Save Conversation History".
    pub save_history: bool,

    /// Whether the debug information window is open.
    pub show_debug: bool,

    /// Whether the About dialog is open.
    pub show_about: bool,

    /// Whether debug mode was requested at startup.
    pub debug_mode: bool,

    /// Name of the collaborator that produced the last answer.
    pub last_answerer: Option<&'static str>,

    /// Folder the export dialog opens in, when it exists.
    pub export_dir: Option<PathBuf>,

    // ---- Requests raised by panels, handled by the frame loop ----
    /// A file chosen or dropped by the user, to be loaded.
    pub pending_upload: Option<PathBuf>,

    /// Open the image file dialog.
    pub request_open_dialog: bool,

    /// Submit `question_input`.
    pub request_submit: bool,

    /// Open the save dialog for the history export.
    pub request_export: bool,
}

impl AppState {
    /// Create initial state.
    pub fn new(answer_config: AnswerConfig, theme: ThemePreset, debug_mode: bool) -> Self {
        Self {
            session: Session::with_theme(theme),
            answer_config,
            question_input: String::new(),
            image_name: None,
            status_message: "Ready. Upload an image to begin.".to_string(),
            last_error: None,
            warnings: Vec::new(),
            save_history: true,
            show_debug: debug_mode,
            show_about: false,
            debug_mode,
            last_answerer: None,
            export_dir: None,
            pending_upload: None,
            request_open_dialog: false,
            request_submit: false,
            request_export: false,
        }
    }

    /// Read an image file from disk and upload it.
    ///
    /// The file extension is passed along as the declared format.
    /// Returns true on success; failures are reported via `last_error`.
    pub fn upload_from_path(&mut self, path: &Path) -> bool {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        match std::fs::read(path) {
            Ok(bytes) => {
                let declared = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(str::to_string);
                self.upload_bytes(bytes, declared.as_deref(), &name)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Cannot read image file");
                self.report_error(format!("Cannot read '{name}': {e}"));
                false
            }
        }
    }

    /// Upload an in-memory payload named `name`.
    pub fn upload_bytes(&mut self, bytes: Vec<u8>, declared: Option<&str>, name: &str) -> bool {
        match self.session.upload_image(bytes, declared) {
            Ok(info) => {
                self.image_name = Some(name.to_string());
                self.last_error = None;
                self.status_message = format!(
                    "Loaded '{name}' ({}, {}).",
                    info.dimensions_label(),
                    info.format
                );
                true
            }
            Err(e) => {
                tracing::warn!(name, error = %e, "Image upload rejected");
                self.report_error(e.to_string());
                false
            }
        }
    }

    /// Remove the image and its conversation.
    pub fn clear_image(&mut self) {
        self.session.clear_image();
        self.image_name = None;
        self.last_error = None;
        self.status_message = "Image cleared.".to_string();
    }

    pub fn clear_history(&mut self) {
        self.session.clear_history();
        self.status_message = "Conversation history cleared.".to_string();
    }

    /// Switch theme from the selector.
    pub fn select_theme(&mut self, preset: ThemePreset) {
        if let Err(e) = self.session.set_theme(preset.name()) {
            // The selector only lists known presets.
            tracing::error!(error = %e, "Theme selector produced an unknown preset");
            debug_assert!(false, "unknown theme preset: {e}");
        }
    }

    /// Validate and accept the typed question.
    ///
    /// Returns the request to hand to the ask manager, or `None` when the
    /// submission was ignored or failed before reaching the collaborator.
    pub fn begin_submit(&mut self) -> Option<PendingQuestion> {
        let config = self.answer_config.clamped();
        match self
            .session
            .begin_question(&self.question_input, &config.preprocessing)
        {
            Ok(Some(pending)) => {
                self.last_error = None;
                self.status_message = "Analyzing image and generating response...".to_string();
                Some(pending)
            }
            Ok(None) => None,
            Err(e) => {
                self.report_error(e.to_string());
                None
            }
        }
    }

    /// Feed a collaborator result back into the session.
    pub fn apply_answer(
        &mut self,
        epoch: u64,
        question: String,
        answerer: &'static str,
        result: Result<String, AnswerError>,
    ) {
        match self.session.complete_question(epoch, question, result) {
            Ok(Some(entry)) => {
                self.last_answerer = Some(answerer);
                if self.question_input == entry.question {
                    self.question_input.clear();
                }
                self.status_message = format!(
                    "Answer received ({} question(s) this session).",
                    self.session.question_count()
                );
            }
            Ok(None) => {
                tracing::debug!("Answer for a previous image ignored");
            }
            Err(e) => {
                self.report_error(format!("{e}. You can resubmit the question."));
            }
        }
    }

    /// Whether the export section should be offered.
    pub fn export_available(&self) -> bool {
        self.save_history && !self.session.history().is_empty()
    }

    /// Plain-text history for the clipboard or a download.
    pub fn history_report(&self) -> String {
        self.session.export_history()
    }

    /// Show `message` in the status bar and as the current error.
    pub fn report_error(&mut self, message: String) {
        self.status_message = message.clone();
        self.last_error = Some(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 32, Rgb([1, 2, 3])));
        let mut cursor = Cursor::new(Vec::new());
        img.write_to(&mut cursor, ImageFormat::Png).unwrap();
        cursor.into_inner()
    }

    fn state() -> AppState {
        AppState::new(AnswerConfig::default(), ThemePreset::default(), false)
    }

    #[test]
    fn test_upload_bytes_sets_status() {
        let mut s = state();
        assert!(s.upload_bytes(png_bytes(), Some("png"), "cat.png"));
        assert_eq!(s.image_name.as_deref(), Some("cat.png"));
        assert!(s.status_message.contains("64 \u{00d7} 32"));
        assert!(s.last_error.is_none());
    }

    #[test]
    fn test_bad_upload_reports_error() {
        let mut s = state();
        assert!(!s.upload_bytes(b"nope".to_vec(), Some("txt"), "notes.txt"));
        assert!(s.last_error.is_some());
        assert!(!s.session.has_image());
    }

    #[test]
    fn test_missing_file_reports_error() {
        let mut s = state();
        assert!(!s.upload_from_path(Path::new("/nonexistent/imageqa/test.png")));
        assert!(s.last_error.as_deref().unwrap().contains("test.png"));
    }

    #[test]
    fn test_submit_cycle_clears_input() {
        let mut s = state();
        s.upload_bytes(png_bytes(), None, "x.png");
        s.question_input = "What is it?".to_string();
        let pending = s.begin_submit().unwrap();
        assert!(s.session.is_awaiting_answer());
        assert!(s.begin_submit().is_none());

        s.apply_answer(pending.epoch, pending.question, "stub", Ok("a square".into()));
        assert!(s.question_input.is_empty());
        assert_eq!(s.session.history().len(), 1);
        assert_eq!(s.last_answerer, Some("stub"));
        assert!(s.export_available());
    }

    #[test]
    fn test_failed_answer_keeps_input_for_retry() {
        let mut s = state();
        s.upload_bytes(png_bytes(), None, "x.png");
        s.question_input = "Again?".to_string();
        let pending = s.begin_submit().unwrap();
        s.apply_answer(
            pending.epoch,
            pending.question,
            "stub",
            Err(AnswerError::Unavailable {
                reason: "offline".into(),
            }),
        );
        assert_eq!(s.question_input, "Again?");
        assert!(s.session.history().is_empty());
        assert!(!s.session.is_awaiting_answer());
        assert!(s.last_error.as_deref().unwrap().contains("resubmit"));
    }

    #[test]
    fn test_export_gated_by_save_history() {
        let mut s = state();
        s.upload_bytes(png_bytes(), None, "x.png");
        s.question_input = "q".to_string();
        let p = s.begin_submit().unwrap();
        s.apply_answer(p.epoch, p.question, "stub", Ok("a".into()));
        s.save_history = false;
        assert!(!s.export_available());
        assert_eq!(s.history_report(), "Q: q\nA: a");
    }

    #[test]
    fn test_select_theme() {
        let mut s = state();
        s.select_theme(ThemePreset::ForestGreen);
        assert_eq!(s.session.theme(), ThemePreset::ForestGreen);
    }
}
