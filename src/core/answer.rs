// ImageQA - core/answer.rs
//
// The answering collaborator seam. The session never talks to a model
// directly: it hands the encoded image and the question to an `Answerer`
// together with the user's `AnswerConfig`.
//
// Implementations:
//   - `PlaceholderAnswerer` (here): canned response, used when no endpoint
//     is configured.
//   - `HttpAnswerer` (app/http.rs): POSTs to a configured endpoint.

use crate::core::image::Preprocessing;
use crate::util::constants::{
    ABSOLUTE_MAX_DIMENSION, ABSOLUTE_MAX_TOKENS, DEFAULT_MAX_TOKENS, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_TEMPERATURE, MAX_REQUEST_TIMEOUT_SECS, MAX_TEMPERATURE, MIN_MAX_DIMENSION,
    MIN_MAX_TOKENS, MIN_REQUEST_TIMEOUT_SECS, MIN_TEMPERATURE,
};
use crate::util::error::AnswerError;
use std::fmt;
use std::time::Duration;

/// Produces an answer for a question about an image.
///
/// Called from a background thread; implementations may block.
pub trait Answerer: Send + Sync {
    fn answer(
        &self,
        image: &[u8],
        question: &str,
        config: &AnswerConfig,
    ) -> Result<String, AnswerError>;

    /// Short name for logs and the debug window.
    fn name(&self) -> &'static str;
}

/// Secret API key. `Debug` never reveals the value.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Mutable access for the password field in the settings panel.
    pub fn as_mut_string(&mut self) -> &mut String {
        &mut self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("ApiKey(<empty>)")
        } else {
            f.write_str("ApiKey(<redacted>)")
        }
    }
}

/// Options forwarded to the answering collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerConfig {
    /// Model endpoint URL. Empty means "not configured".
    pub endpoint: String,
    pub api_key: ApiKey,
    /// Sampling temperature in [0, 1].
    pub temperature: f32,
    /// Maximum response length in [50, 2000] tokens.
    pub max_tokens: u32,
    pub preprocessing: Preprocessing,
    pub timeout: Duration,
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: ApiKey::default(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            preprocessing: Preprocessing::default(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl AnswerConfig {
    /// Whether a model endpoint has been entered.
    pub fn has_endpoint(&self) -> bool {
        !self.endpoint.trim().is_empty()
    }

    /// Copy with every numeric option forced into its allowed range.
    pub fn clamped(&self) -> Self {
        let temperature = if self.temperature.is_nan() {
            DEFAULT_TEMPERATURE
        } else {
            self.temperature.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE)
        };
        let timeout_secs = self
            .timeout
            .as_secs()
            .clamp(MIN_REQUEST_TIMEOUT_SECS, MAX_REQUEST_TIMEOUT_SECS);
        Self {
            endpoint: self.endpoint.trim().to_string(),
            api_key: self.api_key.clone(),
            temperature,
            max_tokens: self.max_tokens.clamp(MIN_MAX_TOKENS, ABSOLUTE_MAX_TOKENS),
            preprocessing: Preprocessing {
                resize_enabled: self.preprocessing.resize_enabled,
                max_dimension: self
                    .preprocessing
                    .max_dimension
                    .clamp(MIN_MAX_DIMENSION, ABSOLUTE_MAX_DIMENSION),
            },
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

/// Stand-in used until a real endpoint is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderAnswerer;

impl PlaceholderAnswerer {
    pub fn response_for(question: &str) -> String {
        format!("[Model Response] This is a placeholder response for: '{question}'")
    }
}

impl Answerer for PlaceholderAnswerer {
    fn answer(
        &self,
        image: &[u8],
        question: &str,
        _config: &AnswerConfig,
    ) -> Result<String, AnswerError> {
        tracing::debug!(payload_bytes = image.len(), "Placeholder answer generated");
        Ok(Self::response_for(question))
    }

    fn name(&self) -> &'static str {
        "placeholder"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_echoes_question() {
        let answer = PlaceholderAnswerer
            .answer(&[1, 2, 3], "What is this?", &AnswerConfig::default())
            .unwrap();
        assert_eq!(
            answer,
            "[Model Response] This is a placeholder response for: 'What is this?'"
        );
    }

    #[test]
    fn test_defaults() {
        let config = AnswerConfig::default();
        assert!(!config.has_endpoint());
        assert_eq!(config.max_tokens, 500);
        assert!((config.temperature - 0.7).abs() < f32::EPSILON);
        assert!(!config.preprocessing.resize_enabled);
        assert_eq!(config.preprocessing.max_dimension, 512);
    }

    #[test]
    fn test_clamped_enforces_ranges() {
        let config = AnswerConfig {
            endpoint: "  http://localhost:9000/predict ".to_string(),
            temperature: 3.5,
            max_tokens: 10,
            preprocessing: Preprocessing {
                resize_enabled: true,
                max_dimension: 99_999,
            },
            timeout: Duration::from_secs(1),
            ..Default::default()
        }
        .clamped();
        assert_eq!(config.endpoint, "http://localhost:9000/predict");
        assert_eq!(config.temperature, 1.0);
        assert_eq!(config.max_tokens, 50);
        assert_eq!(config.preprocessing.max_dimension, 2048);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_api_key_debug_is_redacted() {
        let key = ApiKey::new("sk-secret-value");
        let shown = format!("{key:?}");
        assert!(!shown.contains("sk-secret-value"));
        assert_eq!(format!("{:?}", ApiKey::default()), "ApiKey(<empty>)");
    }
}
