// ImageQA - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// Each subsystem has its own error enum; all of them convert into
// `ImageQaError` for callers that handle failures uniformly.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all ImageQA operations.
#[derive(Debug)]
pub enum ImageQaError {
    /// An uploaded payload could not be decoded as a supported image.
    Decode(DecodeError),

    /// The answering collaborator failed.
    Answer(AnswerError),

    /// An unknown theme preset was requested.
    Theme(InvalidThemeError),

    /// Writing the conversation export failed.
    Export(ExportError),

    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for ImageQaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(e) => write!(f, "Image error: {e}"),
            Self::Answer(e) => write!(f, "Answer error: {e}"),
            Self::Theme(e) => write!(f, "Theme error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for ImageQaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode(e) => Some(e),
            Self::Answer(e) => Some(e),
            Self::Theme(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Decode errors
// ---------------------------------------------------------------------------

/// Errors raised while turning an uploaded payload into an image.
#[derive(Debug)]
pub enum DecodeError {
    /// The payload contained no bytes.
    Empty,

    /// The payload exceeds the upload size limit.
    TooLarge { size: usize, max_size: usize },

    /// Neither the content nor the declared format identify an image encoding.
    Unrecognised { declared: Option<String> },

    /// The payload is an image, but not in one of the accepted encodings.
    UnsupportedFormat { format: String },

    /// The payload claims a supported encoding but could not be decoded.
    Malformed {
        format: &'static str,
        source: image::ImageError,
    },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "The uploaded file is empty"),
            Self::TooLarge { size, max_size } => write!(
                f,
                "The uploaded file is {size} bytes, exceeds maximum of {max_size} bytes"
            ),
            Self::Unrecognised { declared: Some(d) } => write!(
                f,
                "Could not recognise the uploaded file as an image (declared as '{d}'). \
                 Supported formats: PNG, JPEG, BMP, GIF."
            ),
            Self::Unrecognised { declared: None } => write!(
                f,
                "Could not recognise the uploaded file as an image. \
                 Supported formats: PNG, JPEG, BMP, GIF."
            ),
            Self::UnsupportedFormat { format } => write!(
                f,
                "{format} images are not supported. Supported formats: PNG, JPEG, BMP, GIF."
            ),
            Self::Malformed { format, source } => {
                write!(f, "Could not decode {format} image: {source}")
            }
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Malformed { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<DecodeError> for ImageQaError {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}

// ---------------------------------------------------------------------------
// Answer errors
// ---------------------------------------------------------------------------

/// Errors raised by the answering collaborator or while preparing its input.
///
/// The session treats every variant the same way: the message is shown to the
/// user and history is left untouched.
#[derive(Debug)]
pub enum AnswerError {
    /// The image could not be re-encoded into a request payload.
    Payload {
        format: &'static str,
        source: image::ImageError,
    },

    /// The configured endpoint is not a usable URL.
    InvalidEndpoint { endpoint: String, reason: String },

    /// The HTTP client could not be constructed.
    Client { source: reqwest::Error },

    /// The request did not complete (DNS, connect, TLS, timeout, body read).
    Network {
        endpoint: String,
        source: reqwest::Error,
    },

    /// The endpoint rejected the credentials.
    Unauthorized { status: u16 },

    /// The endpoint reported that a rate limit or quota was exceeded.
    QuotaExceeded { status: u16 },

    /// Any other non-success HTTP status.
    Status { status: u16, body: String },

    /// The response could not be interpreted as an answer.
    InvalidResponse { reason: String },

    /// Collaborator-specific failure without further structure.
    Unavailable { reason: String },
}

impl fmt::Display for AnswerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Payload { format, source } => {
                write!(f, "Could not prepare {format} image for the model: {source}")
            }
            Self::InvalidEndpoint { endpoint, reason } => {
                write!(f, "Model endpoint '{endpoint}' is not valid: {reason}")
            }
            Self::Client { source } => write!(f, "Could not create HTTP client: {source}"),
            Self::Network { endpoint, source } => {
                write!(f, "Request to '{endpoint}' failed: {source}")
            }
            Self::Unauthorized { status } => write!(
                f,
                "The model endpoint rejected the API key (HTTP {status}). Check the API key setting."
            ),
            Self::QuotaExceeded { status } => write!(
                f,
                "The model endpoint quota or rate limit was exceeded (HTTP {status}). Try again later."
            ),
            Self::Status { status, body } if body.is_empty() => {
                write!(f, "The model endpoint returned HTTP {status}")
            }
            Self::Status { status, body } => {
                write!(f, "The model endpoint returned HTTP {status}: {body}")
            }
            Self::InvalidResponse { reason } => {
                write!(f, "The model response could not be read: {reason}")
            }
            Self::Unavailable { reason } => write!(f, "The model is unavailable: {reason}"),
        }
    }
}

impl std::error::Error for AnswerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Payload { source, .. } => Some(source),
            Self::Client { source } => Some(source),
            Self::Network { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<AnswerError> for ImageQaError {
    fn from(e: AnswerError) -> Self {
        Self::Answer(e)
    }
}

// ---------------------------------------------------------------------------
// Theme errors
// ---------------------------------------------------------------------------

/// An unknown theme preset name was requested.
///
/// The presentation surface only offers known presets, so reaching this from
/// the UI indicates a validation bug upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidThemeError {
    pub name: String,
}

impl fmt::Display for InvalidThemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown theme '{}'", self.name)
    }
}

impl std::error::Error for InvalidThemeError {}

impl From<InvalidThemeError> for ImageQaError {
    fn from(e: InvalidThemeError) -> Self {
        Self::Theme(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to exporting the conversation history.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the export file.
    Io { path: PathBuf, source: io::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Export I/O error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON export error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

impl From<ExportError> for ImageQaError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for ImageQaError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for ImageQA results.
pub type Result<T> = std::result::Result<T, ImageQaError>;
