// ImageQA - core/session.rs
//
// Session state controller: the single active image, the append-only
// conversation history, the theme preset, and the submission phase.
//
// Invariant: history is empty whenever no image is loaded. Every path that
// removes or replaces the image also empties the history, and questions are
// only accepted while an image is present.
//
// Submitting a question is split in two so the collaborator call can run off
// the UI thread:
//   begin_question    -> validates, encodes the payload, enters AwaitingAnswer
//   complete_question -> returns to Ready, appends on success
// `submit_question` runs both halves synchronously around an `Answerer`.
//
// Answers carry the image epoch they were asked under. Uploading or clearing
// bumps the epoch, so an answer that arrives for a replaced image is dropped.

use crate::core::answer::{AnswerConfig, Answerer};
use crate::core::export;
use crate::core::image::{self, ImageFormatKind, ImageInfo, LoadedImage, Preprocessing};
use crate::core::model::{ConversationEntry, SessionEvent, SessionPhase};
use crate::core::theme::ThemePreset;
use crate::util::error::{AnswerError, DecodeError, InvalidThemeError};

/// A question that has been accepted and is waiting for its answer.
#[derive(Debug, Clone)]
pub struct PendingQuestion {
    /// Image epoch the question was asked under.
    pub epoch: u64,
    /// Question text exactly as submitted.
    pub question: String,
    /// Encoded image bytes for the collaborator.
    pub payload: Vec<u8>,
    pub format: ImageFormatKind,
}

/// One user's independent session state.
#[derive(Debug, Default)]
pub struct Session {
    image: Option<LoadedImage>,
    history: Vec<ConversationEntry>,
    theme: ThemePreset,
    phase: SessionPhase,
    epoch: u64,
    events: Vec<SessionEvent>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session starting on the given theme.
    pub fn with_theme(theme: ThemePreset) -> Self {
        Self {
            theme,
            ..Self::default()
        }
    }

    // -------------------------------------------------------------------------
    // Read-only projections
    // -------------------------------------------------------------------------

    pub fn image(&self) -> Option<&LoadedImage> {
        self.image.as_ref()
    }

    pub fn image_info(&self) -> Option<ImageInfo> {
        self.image.as_ref().map(LoadedImage::info)
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// Entries in chronological order (oldest first).
    pub fn history(&self) -> &[ConversationEntry] {
        &self.history
    }

    pub fn question_count(&self) -> usize {
        self.history.len()
    }

    pub fn theme(&self) -> ThemePreset {
        self.theme
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_awaiting_answer(&self) -> bool {
        self.phase == SessionPhase::AwaitingAnswer
    }

    /// Identifier of the current image; changes on every upload and clear.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Drain the change notifications accumulated since the last call.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    // -------------------------------------------------------------------------
    // Image lifecycle
    // -------------------------------------------------------------------------

    /// Decode `bytes` and make it the active image.
    ///
    /// On success any previous image is replaced and the history is emptied.
    /// On failure the session is left exactly as it was.
    pub fn upload_image(
        &mut self,
        bytes: Vec<u8>,
        declared_format: Option<&str>,
    ) -> Result<ImageInfo, DecodeError> {
        let loaded = image::decode(bytes, declared_format)?;
        let info = loaded.info();

        self.image = Some(loaded);
        self.bump_epoch();
        self.events.push(SessionEvent::ImageChanged);
        self.reset_history();
        self.set_phase(SessionPhase::Ready);

        tracing::info!(
            width = info.width,
            height = info.height,
            format = info.format.label(),
            epoch = self.epoch,
            "Image uploaded"
        );
        Ok(info)
    }

    /// Remove the active image and its history. Idempotent.
    pub fn clear_image(&mut self) {
        if self.image.take().is_some() {
            self.bump_epoch();
            self.events.push(SessionEvent::ImageChanged);
            tracing::info!(epoch = self.epoch, "Image cleared");
        }
        self.reset_history();
        self.set_phase(SessionPhase::Ready);
    }

    // -------------------------------------------------------------------------
    // Questions
    // -------------------------------------------------------------------------

    /// Ask `text` about the current image and wait for the answer.
    ///
    /// Returns `Ok(None)` without calling the collaborator when the text is
    /// blank, no image is loaded, or another question is still in flight.
    pub fn submit_question(
        &mut self,
        text: &str,
        answerer: &dyn Answerer,
        config: &AnswerConfig,
    ) -> Result<Option<ConversationEntry>, AnswerError> {
        let Some(pending) = self.begin_question(text, &config.preprocessing)? else {
            return Ok(None);
        };
        let result = answerer.answer(&pending.payload, &pending.question, config);
        self.complete_question(pending.epoch, pending.question, result)
    }

    /// Accept a question and prepare the collaborator payload.
    ///
    /// Enters `AwaitingAnswer` on success. `Ok(None)` means the submission was
    /// ignored (blank text, no image, or already awaiting an answer).
    pub fn begin_question(
        &mut self,
        text: &str,
        preprocessing: &Preprocessing,
    ) -> Result<Option<PendingQuestion>, AnswerError> {
        if text.trim().is_empty() {
            tracing::debug!("Blank question ignored");
            return Ok(None);
        }
        if self.is_awaiting_answer() {
            tracing::debug!("Question ignored: an answer is still pending");
            return Ok(None);
        }
        let Some(image) = self.image.as_ref() else {
            tracing::debug!("Question ignored: no image loaded");
            return Ok(None);
        };

        let payload =
            image::encode_payload(image, preprocessing).map_err(|e| AnswerError::Payload {
                format: image.info().format.label(),
                source: e,
            })?;

        let pending = PendingQuestion {
            epoch: self.epoch,
            question: text.to_string(),
            payload: payload.bytes,
            format: payload.format,
        };
        self.set_phase(SessionPhase::AwaitingAnswer);

        tracing::info!(
            epoch = pending.epoch,
            payload_bytes = pending.payload.len(),
            format = pending.format.label(),
            "Question submitted"
        );
        Ok(Some(pending))
    }

    /// Record the collaborator's result for a question from `begin_question`.
    ///
    /// A result for an image that has since been replaced or cleared is
    /// discarded and returns `Ok(None)`. Failures leave history untouched.
    pub fn complete_question(
        &mut self,
        epoch: u64,
        question: String,
        result: Result<String, AnswerError>,
    ) -> Result<Option<ConversationEntry>, AnswerError> {
        if epoch != self.epoch || self.image.is_none() {
            tracing::debug!(
                answer_epoch = epoch,
                current_epoch = self.epoch,
                "Discarding answer for a replaced image"
            );
            return Ok(None);
        }

        self.set_phase(SessionPhase::Ready);

        match result {
            Ok(answer) => {
                let entry = ConversationEntry::new(question, answer);
                self.history.push(entry.clone());
                self.events.push(SessionEvent::HistoryChanged);
                tracing::info!(entries = self.history.len(), "Answer recorded");
                Ok(Some(entry))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Answer request failed");
                Err(e)
            }
        }
    }

    /// Empty the history; the image is kept. Idempotent.
    pub fn clear_history(&mut self) {
        if !self.history.is_empty() {
            tracing::info!(entries = self.history.len(), "History cleared");
        }
        self.reset_history();
    }

    // -------------------------------------------------------------------------
    // Theme and export
    // -------------------------------------------------------------------------

    /// Switch to the preset called `name`. Unknown names leave the theme as is.
    pub fn set_theme(&mut self, name: &str) -> Result<(), InvalidThemeError> {
        let preset = ThemePreset::from_name(name)?;
        if preset != self.theme {
            tracing::debug!(from = self.theme.name(), to = preset.name(), "Theme changed");
            self.theme = preset;
            self.events.push(SessionEvent::ThemeChanged);
        }
        Ok(())
    }

    /// Conversation as `Q:`/`A:` blocks, oldest first.
    pub fn export_history(&self) -> String {
        export::export_history(&self.history)
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn reset_history(&mut self) {
        if !self.history.is_empty() {
            self.history.clear();
            self.events.push(SessionEvent::HistoryChanged);
        }
    }

    fn set_phase(&mut self, phase: SessionPhase) {
        if self.phase != phase {
            self.phase = phase;
            self.events.push(SessionEvent::PhaseChanged);
        }
    }

    fn bump_epoch(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
    }
}
