// ImageQA - platform/config.rs
//
// Platform-specific directory resolution and config.toml loading with
// startup validation. Invalid values never stop the application: they
// produce a warning and the built-in default is used instead.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for ImageQA configuration and data.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/imageqa/ or %APPDATA%\ImageQA\config\)
    pub config_dir: PathBuf,

    /// Data directory (default location offered for exports).
    pub data_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to the current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            let data_dir = proj_dirs.data_dir().to_path_buf();

            tracing::debug!(
                config = %config_dir.display(),
                data = %data_dir.display(),
                "Platform paths resolved"
            );

            Self {
                config_dir,
                data_dir,
            }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            let fallback = PathBuf::from(".");
            Self {
                config_dir: fallback.clone(),
                data_dir: fallback,
            }
        }
    }
}

// =============================================================================
// config.toml
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[model]` section.
    pub model: ModelSection,
    /// `[preprocessing]` section.
    pub preprocessing: PreprocessingSection,
    /// `[ui]` section.
    pub ui: UiSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[model]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ModelSection {
    /// Model API endpoint URL.
    pub endpoint: Option<String>,
    /// API key. The IMAGEQA_API_KEY environment variable takes priority.
    pub api_key: Option<String>,
    /// Sampling temperature, 0.0-1.0.
    pub temperature: Option<f32>,
    /// Maximum response tokens.
    pub max_tokens: Option<u32>,
    /// Request timeout in seconds.
    pub timeout_seconds: Option<u64>,
}

/// `[preprocessing]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct PreprocessingSection {
    /// Resize the image before sending it.
    pub resize: Option<bool>,
    /// Longest side after resizing, in pixels.
    pub max_dimension: Option<u32>,
}

/// `[ui]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct UiSection {
    /// Theme preset name, e.g. "Ocean Blue".
    pub theme: Option<String>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    // -- Model --
    pub endpoint: String,
    /// API key from the config file (may be overridden by the environment).
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,

    // -- Preprocessing --
    pub resize: bool,
    pub max_dimension: u32,

    // -- UI --
    /// Theme name as written; validated against the presets by the caller.
    pub theme: Option<String>,

    // -- Logging --
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: None,
            temperature: constants::DEFAULT_TEMPERATURE,
            max_tokens: constants::DEFAULT_MAX_TOKENS,
            timeout_secs: constants::DEFAULT_REQUEST_TIMEOUT_SECS,
            resize: false,
            max_dimension: constants::DEFAULT_MAX_DIMENSION,
            theme: None,
            log_level: None,
        }
    }
}

/// Load and validate `config.toml` from `config_dir`.
///
/// Returns the validated config and a list of non-fatal warnings.
/// A missing file yields defaults with no warnings (first run).
pub fn load_config(config_dir: &Path) -> (AppConfig, Vec<String>) {
    let config_path = config_dir.join(constants::CONFIG_FILE_NAME);

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), Vec::new());
    }

    let content = match std::fs::read_to_string(&config_path) {
        Ok(c) => c,
        Err(e) => {
            let err = ConfigError::Io {
                path: config_path.clone(),
                source: e,
            };
            let msg = format!("{err}. Using defaults.");
            tracing::warn!("{}", msg);
            return (AppConfig::default(), vec![msg]);
        }
    };

    parse_config(&content, &config_path)
}

/// Validate config.toml `content`. `path` is only used in messages.
pub fn parse_config(content: &str, path: &Path) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    let raw: RawConfig = match toml::from_str(content) {
        Ok(r) => r,
        Err(e) => {
            let err = ConfigError::TomlParse {
                path: path.to_path_buf(),
                source: e,
            };
            let msg = format!("{err}. Using defaults. See config.example.toml for the expected format.");
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    tracing::info!(path = %path.display(), "Loaded config.toml");

    let mut config = AppConfig::default();
    let mut out_of_range = |field: &str, value: String, expected: String, default: String| {
        let err = ConfigError::ValueOutOfRange {
            field: field.to_string(),
            value,
            expected,
        };
        warnings.push(format!("{err}. Using default ({default})."));
    };

    // -- Model: endpoint --
    if let Some(endpoint) = raw.model.endpoint {
        config.endpoint = endpoint.trim().to_string();
    }

    // -- Model: api_key --
    if let Some(key) = raw.model.api_key {
        if !key.trim().is_empty() {
            config.api_key = Some(key);
        }
    }

    // -- Model: temperature --
    if let Some(t) = raw.model.temperature {
        if (constants::MIN_TEMPERATURE..=constants::MAX_TEMPERATURE).contains(&t) {
            config.temperature = t;
        } else {
            out_of_range(
                "[model] temperature",
                t.to_string(),
                format!("{}-{}", constants::MIN_TEMPERATURE, constants::MAX_TEMPERATURE),
                constants::DEFAULT_TEMPERATURE.to_string(),
            );
        }
    }

    // -- Model: max_tokens --
    if let Some(n) = raw.model.max_tokens {
        if (constants::MIN_MAX_TOKENS..=constants::ABSOLUTE_MAX_TOKENS).contains(&n) {
            config.max_tokens = n;
        } else {
            out_of_range(
                "[model] max_tokens",
                n.to_string(),
                format!("{}-{}", constants::MIN_MAX_TOKENS, constants::ABSOLUTE_MAX_TOKENS),
                constants::DEFAULT_MAX_TOKENS.to_string(),
            );
        }
    }

    // -- Model: timeout_seconds --
    if let Some(secs) = raw.model.timeout_seconds {
        if (constants::MIN_REQUEST_TIMEOUT_SECS..=constants::MAX_REQUEST_TIMEOUT_SECS)
            .contains(&secs)
        {
            config.timeout_secs = secs;
        } else {
            out_of_range(
                "[model] timeout_seconds",
                secs.to_string(),
                format!(
                    "{}-{}",
                    constants::MIN_REQUEST_TIMEOUT_SECS,
                    constants::MAX_REQUEST_TIMEOUT_SECS
                ),
                constants::DEFAULT_REQUEST_TIMEOUT_SECS.to_string(),
            );
        }
    }

    // -- Preprocessing --
    if let Some(resize) = raw.preprocessing.resize {
        config.resize = resize;
    }
    if let Some(dim) = raw.preprocessing.max_dimension {
        if (constants::MIN_MAX_DIMENSION..=constants::ABSOLUTE_MAX_DIMENSION).contains(&dim) {
            config.max_dimension = dim;
        } else {
            out_of_range(
                "[preprocessing] max_dimension",
                dim.to_string(),
                format!(
                    "{}-{}",
                    constants::MIN_MAX_DIMENSION,
                    constants::ABSOLUTE_MAX_DIMENSION
                ),
                constants::DEFAULT_MAX_DIMENSION.to_string(),
            );
        }
    }

    // -- UI: theme (checked against presets in main) --
    config.theme = raw.ui.theme;

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    if !warnings.is_empty() {
        tracing::warn!(count = warnings.len(), "Config validation produced warnings");
    }

    (config, warnings)
}

/// Pick the API key: environment value first, then the config file.
/// Blank values count as absent.
pub fn resolve_api_key(env_value: Option<String>, config_value: Option<&str>) -> Option<String> {
    env_value
        .filter(|k| !k.trim().is_empty())
        .or_else(|| {
            config_value
                .filter(|k| !k.trim().is_empty())
                .map(str::to_string)
        })
}
