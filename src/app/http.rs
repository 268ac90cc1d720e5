// ImageQA - app/http.rs
//
// HTTP-backed answering collaborator.
//
// Request: POST <endpoint> with a JSON body
//   { "question", "image" (base64), "image_format", "temperature", "max_tokens" }
// and `Authorization: Bearer <key>` when an API key is configured.
//
// Response: a JSON object carrying the answer in `answer` (or `text` /
// `response`), a bare JSON string, or a plain-text body.
//
// Runs on the ask manager's background thread, so the blocking client is used.

use crate::core::answer::{AnswerConfig, Answerer, PlaceholderAnswerer};
use crate::core::image::ImageFormatKind;
use crate::util::constants::{APP_ID, APP_VERSION, MAX_ERROR_BODY_CHARS};
use crate::util::error::AnswerError;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use serde::Serialize;
use std::sync::{Arc, OnceLock};

/// JSON fields checked, in order, for the answer text.
const ANSWER_FIELDS: [&str; 3] = ["answer", "text", "response"];

#[derive(Debug, Serialize)]
struct AnswerRequest<'a> {
    question: &'a str,
    image: String,
    image_format: &'static str,
    temperature: f32,
    max_tokens: u32,
}

/// Answerer that calls a remote model endpoint.
#[derive(Debug, Default)]
pub struct HttpAnswerer {
    client: OnceLock<Client>,
}

impl HttpAnswerer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared client, built on first use.
    fn client(&self) -> Result<&Client, AnswerError> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let built = Client::builder()
            .user_agent(format!("{APP_ID}/{APP_VERSION}"))
            .build()
            .map_err(|e| AnswerError::Client { source: e })?;
        Ok(self.client.get_or_init(|| built))
    }
}

impl Answerer for HttpAnswerer {
    fn answer(
        &self,
        image: &[u8],
        question: &str,
        config: &AnswerConfig,
    ) -> Result<String, AnswerError> {
        let endpoint = config.endpoint.trim();
        let url = parse_endpoint(endpoint)?;

        let image_format = image::guess_format(image)
            .ok()
            .and_then(ImageFormatKind::from_image_format)
            .unwrap_or(ImageFormatKind::Png);

        let body = AnswerRequest {
            question,
            image: BASE64_STANDARD.encode(image),
            image_format: image_format.extension(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        };

        let mut request = self
            .client()?
            .post(url)
            .timeout(config.timeout)
            .json(&body);
        if !config.api_key.is_empty() {
            request = request.bearer_auth(config.api_key.expose());
        }

        tracing::debug!(
            endpoint,
            payload_bytes = image.len(),
            format = image_format.label(),
            temperature = config.temperature,
            max_tokens = config.max_tokens,
            authenticated = !config.api_key.is_empty(),
            "Sending answer request"
        );

        let response = request.send().map_err(|e| AnswerError::Network {
            endpoint: endpoint.to_string(),
            source: e,
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let text = response.text().map_err(|e| AnswerError::Network {
            endpoint: endpoint.to_string(),
            source: e,
        })?;
        parse_answer(&text)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Pick the collaborator for `config`: the endpoint when one is set,
/// otherwise the placeholder.
pub fn select_answerer(config: &AnswerConfig, http: &Arc<HttpAnswerer>) -> Arc<dyn Answerer> {
    if config.has_endpoint() {
        Arc::clone(http) as Arc<dyn Answerer>
    } else {
        Arc::new(PlaceholderAnswerer)
    }
}

/// Validate the endpoint string as an absolute http(s) URL.
pub fn parse_endpoint(endpoint: &str) -> Result<Url, AnswerError> {
    let invalid = |reason: String| AnswerError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason,
    };
    let url = Url::parse(endpoint).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme '{other}', expected http or https"))),
    }
}

/// Map a non-success status to the matching error.
fn status_error(status: StatusCode, body: &str) -> AnswerError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AnswerError::Unauthorized {
            status: status.as_u16(),
        },
        StatusCode::TOO_MANY_REQUESTS => AnswerError::QuotaExceeded {
            status: status.as_u16(),
        },
        _ => AnswerError::Status {
            status: status.as_u16(),
            body: body.trim().chars().take(MAX_ERROR_BODY_CHARS).collect(),
        },
    }
}

/// Extract the answer text from a response body.
pub fn parse_answer(body: &str) -> Result<String, AnswerError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(AnswerError::InvalidResponse {
            reason: "empty response body".to_string(),
        });
    }

    let answer = match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::Object(map)) => ANSWER_FIELDS
            .iter()
            .find_map(|field| map.get(*field).and_then(|v| v.as_str()))
            .map(str::to_string)
            .ok_or_else(|| AnswerError::InvalidResponse {
                reason: format!("JSON response has no {} field", ANSWER_FIELDS.join("/")),
            })?,
        Ok(serde_json::Value::String(s)) => s,
        // Numbers, arrays, and non-JSON bodies are taken as plain text.
        _ => trimmed.to_string(),
    };

    if answer.trim().is_empty() {
        return Err(AnswerError::InvalidResponse {
            reason: "answer is empty".to_string(),
        });
    }
    Ok(answer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_answer_field() {
        assert_eq!(parse_answer(r#"{"answer":"blue"}"#).unwrap(), "blue");
        assert_eq!(parse_answer(r#"{"text":"green","id":3}"#).unwrap(), "green");
        assert_eq!(parse_answer(r#"{"response":"red"}"#).unwrap(), "red");
    }

    #[test]
    fn test_parse_answer_prefers_answer_field() {
        assert_eq!(
            parse_answer(r#"{"text":"second","answer":"first"}"#).unwrap(),
            "first"
        );
    }

    #[test]
    fn test_parse_plain_text_and_json_string() {
        assert_eq!(parse_answer("  A red barn.\n").unwrap(), "A red barn.");
        assert_eq!(parse_answer(r#""quoted""#).unwrap(), "quoted");
    }

    #[test]
    fn test_parse_rejects_empty_and_fieldless() {
        assert!(matches!(
            parse_answer("   "),
            Err(AnswerError::InvalidResponse { .. })
        ));
        assert!(matches!(
            parse_answer(r#"{"result":"x"}"#),
            Err(AnswerError::InvalidResponse { .. })
        ));
        assert!(matches!(
            parse_answer(r#"{"answer":"  "}"#),
            Err(AnswerError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, ""),
            AnswerError::Unauthorized { status: 401 }
        ));
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, ""),
            AnswerError::Unauthorized { status: 403 }
        ));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, ""),
            AnswerError::QuotaExceeded { status: 429 }
        ));
        let long = "x".repeat(1_000);
        match status_error(StatusCode::INTERNAL_SERVER_ERROR, &long) {
            AnswerError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body.len(), MAX_ERROR_BODY_CHARS);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_invalid_endpoints() {
        assert!(matches!(
            parse_endpoint("not a url"),
            Err(AnswerError::InvalidEndpoint { .. })
        ));
        assert!(matches!(
            parse_endpoint("ftp://example.com/predict"),
            Err(AnswerError::InvalidEndpoint { .. })
        ));
        assert!(parse_endpoint("https://api.example.com/predict").is_ok());
    }

    #[test]
    fn test_invalid_endpoint_fails_before_network() {
        let config = AnswerConfig {
            endpoint: "::nope::".to_string(),
            ..Default::default()
        };
        let err = HttpAnswerer::new().answer(&[], "q", &config).unwrap_err();
        assert!(matches!(err, AnswerError::InvalidEndpoint { .. }));
    }

    #[test]
    fn test_select_answerer() {
        let http = Arc::new(HttpAnswerer::new());
        assert_eq!(select_answerer(&AnswerConfig::default(), &http).name(), "placeholder");
        let config = AnswerConfig {
            endpoint: "http://localhost:1/predict".to_string(),
            ..Default::default()
        };
        assert_eq!(select_answerer(&config, &http).name(), "http");
    }
}
