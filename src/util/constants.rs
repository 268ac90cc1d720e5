// ImageQA - util/constants.rs
//
// Single source of truth for named constants, limits, and defaults.
// Config loading and UI controls validate against these bounds.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "Image Question Answering";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "ImageQA";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Upload limits
// =============================================================================

/// Largest image payload accepted for upload, in bytes.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024; // 50 MB

/// File extensions offered by the open dialog.
pub const UPLOAD_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];

// =============================================================================
// Model configuration bounds
// =============================================================================

/// Sampling temperature range and default.
pub const MIN_TEMPERATURE: f32 = 0.0;
pub const MAX_TEMPERATURE: f32 = 1.0;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const TEMPERATURE_STEP: f64 = 0.1;

/// Maximum response length, in tokens.
pub const MIN_MAX_TOKENS: u32 = 50;
pub const ABSOLUTE_MAX_TOKENS: u32 = 2_000;
pub const DEFAULT_MAX_TOKENS: u32 = 500;
pub const MAX_TOKENS_STEP: f64 = 50.0;

/// Longest image side after optional resizing, in pixels.
pub const MIN_MAX_DIMENSION: u32 = 128;
pub const ABSOLUTE_MAX_DIMENSION: u32 = 2_048;
pub const DEFAULT_MAX_DIMENSION: u32 = 512;
pub const MAX_DIMENSION_STEP: f64 = 128.0;

/// HTTP request timeout for the answering endpoint, in seconds.
pub const MIN_REQUEST_TIMEOUT_SECS: u64 = 5;
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 600;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Environment variable consulted for the endpoint API key.
pub const API_KEY_ENV_VAR: &str = "IMAGEQA_API_KEY";

/// Longest error body excerpt kept from a failed endpoint response.
pub const MAX_ERROR_BODY_CHARS: usize = 200;

// =============================================================================
// UI timing
// =============================================================================

/// Repaint interval while waiting for an answer, so the result appears promptly.
pub const ANSWER_POLL_INTERVAL_MS: u64 = 100;

// =============================================================================
// Export
// =============================================================================

/// Default file name offered when downloading the conversation history.
pub const EXPORT_FILE_NAME: &str = "conversation_history.txt";

/// MIME type of the exported history.
pub const EXPORT_MIME_TYPE: &str = "text/plain";

// =============================================================================
// Paths and logging
// =============================================================================

/// Configuration file name, stored in the application config root.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Default log level when nothing else is specified.
pub const DEFAULT_LOG_LEVEL: &str = "info";
