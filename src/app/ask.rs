// ImageQA - app/ask.rs
//
// Runs the answering collaborator off the UI thread.
//
// Architecture:
//   - `AskManager` lives on the UI thread; each request runs on its own
//     background thread and reports back over an mpsc channel.
//   - The UI polls `poll_progress` every frame and feeds results into the
//     session via `AppState::apply_answer`.
//   - Starting a new request replaces the receiver. A superseded thread's
//     send fails and is ignored. There is no cancellation: a request runs
//     until the collaborator returns.

use crate::app::http::{select_answerer, HttpAnswerer};
use crate::core::answer::{AnswerConfig, Answerer};
use crate::core::session::PendingQuestion;
use crate::util::error::AnswerError;
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

/// Messages sent from the request thread to the UI.
#[derive(Debug)]
pub enum AskProgress {
    /// The collaborator returned (successfully or not).
    Completed {
        epoch: u64,
        question: String,
        answerer: &'static str,
        elapsed: Duration,
        result: Result<String, AnswerError>,
    },
}

/// Dispatches questions to the configured collaborator on a background thread.
pub struct AskManager {
    progress_rx: Option<mpsc::Receiver<AskProgress>>,
    http: Arc<HttpAnswerer>,
    /// Fixed collaborator that bypasses endpoint selection (tests, demos).
    fixed: Option<Arc<dyn Answerer>>,
}

impl AskManager {
    pub fn new() -> Self {
        Self {
            progress_rx: None,
            http: Arc::new(HttpAnswerer::new()),
            fixed: None,
        }
    }

    /// Always use `answerer`, whatever the endpoint configuration says.
    pub fn with_answerer(answerer: Arc<dyn Answerer>) -> Self {
        Self {
            fixed: Some(answerer),
            ..Self::new()
        }
    }

    /// The collaborator a request with `config` would be sent to.
    pub fn answerer_for(&self, config: &AnswerConfig) -> Arc<dyn Answerer> {
        match &self.fixed {
            Some(answerer) => Arc::clone(answerer),
            None => select_answerer(config, &self.http),
        }
    }

    /// Send `pending` to the collaborator on a new background thread.
    pub fn start(&mut self, pending: PendingQuestion, config: AnswerConfig) {
        let (tx, rx) = mpsc::channel();
        self.progress_rx = Some(rx);

        let answerer = self.answerer_for(&config);
        tracing::info!(
            answerer = answerer.name(),
            epoch = pending.epoch,
            "Answer request started"
        );

        std::thread::spawn(move || {
            let started = Instant::now();
            let result = answerer.answer(&pending.payload, &pending.question, &config);
            let elapsed = started.elapsed();
            match &result {
                Ok(_) => tracing::info!(
                    answerer = answerer.name(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Answer received"
                ),
                Err(e) => tracing::warn!(
                    answerer = answerer.name(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "Answer request failed"
                ),
            }
            // Receiver dropped (UI closed or request superseded); nothing to do.
            let _ = tx.send(AskProgress::Completed {
                epoch: pending.epoch,
                question: pending.question,
                answerer: answerer.name(),
                elapsed,
                result,
            });
        });
    }

    /// Poll for progress messages without blocking. Returns all pending messages.
    pub fn poll_progress(&self) -> Vec<AskProgress> {
        let mut messages = Vec::new();
        if let Some(ref rx) = self.progress_rx {
            while let Ok(msg) = rx.try_recv() {
                messages.push(msg);
            }
        }
        messages
    }

    /// Block until the current request reports back, or `timeout` elapses.
    pub fn wait(&self, timeout: Duration) -> Option<AskProgress> {
        self.progress_rx
            .as_ref()
            .and_then(|rx| rx.recv_timeout(timeout).ok())
    }
}

impl Default for AskManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::image::ImageFormatKind;

    struct Echo;

    impl Answerer for Echo {
        fn answer(&self, image: &[u8], question: &str, _: &AnswerConfig) -> Result<String, AnswerError> {
            Ok(format!("{question} ({} bytes)", image.len()))
        }
        fn name(&self) -> &'static str {
            "echo"
        }
    }

    fn pending(epoch: u64, question: &str) -> PendingQuestion {
        PendingQuestion {
            epoch,
            question: question.to_string(),
            payload: vec![0; 4],
            format: ImageFormatKind::Png,
        }
    }

    #[test]
    fn test_result_delivered_over_channel() {
        let mut manager = AskManager::with_answerer(Arc::new(Echo));
        manager.start(pending(7, "hello"), AnswerConfig::default());
        match manager.wait(Duration::from_secs(5)) {
            Some(AskProgress::Completed {
                epoch,
                question,
                answerer,
                result,
                ..
            }) => {
                assert_eq!(epoch, 7);
                assert_eq!(question, "hello");
                assert_eq!(answerer, "echo");
                assert_eq!(result.unwrap(), "hello (4 bytes)");
            }
            None => panic!("no answer delivered"),
        }
    }

    #[test]
    fn test_placeholder_used_without_endpoint() {
        let mut manager = AskManager::new();
        assert_eq!(manager.answerer_for(&AnswerConfig::default()).name(), "placeholder");
        manager.start(pending(1, "sky?"), AnswerConfig::default());
        let Some(AskProgress::Completed { result, .. }) = manager.wait(Duration::from_secs(5))
        else {
            panic!("no answer delivered");
        };
        assert!(result.unwrap().contains("'sky?'"));
    }

    #[test]
    fn test_poll_without_request_is_empty() {
        assert!(AskManager::new().poll_progress().is_empty());
    }
}
