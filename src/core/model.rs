// ImageQA - core/model.rs
//
// Plain data types shared across layers: conversation entries, the
// submission phase, and the change notifications emitted by the session.

use serde::{Deserialize, Serialize};

/// One question/answer pair. Created at submission time and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub question: String,
    pub answer: String,
}

impl ConversationEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Whether the session can accept a new question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Ready,
    /// A question has been handed to the answering collaborator and no
    /// result has come back yet. Further submissions are refused.
    AwaitingAnswer,
}

impl SessionPhase {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ready => "Ready",
            Self::AwaitingAnswer => "Awaiting answer",
        }
    }
}

/// Change notifications drained by the presentation layer.
///
/// Only emitted when observable state actually changes, so repeating an
/// idempotent operation produces no further events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The image was uploaded, replaced, or cleared.
    ImageChanged,
    /// An entry was appended or the history was emptied.
    HistoryChanged,
    /// A different theme preset is active; presentation must refresh.
    ThemeChanged,
    /// The session entered or left the awaiting-answer phase.
    PhaseChanged,
}
