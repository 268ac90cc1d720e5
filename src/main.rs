// ImageQA - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Configuration loading (config.toml) and logging initialisation
// 3. Theme and model option resolution (CLI > environment > config > defaults)
// 4. eframe GUI launch

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod gui;

// Re-export modules from the library crate so that `gui.rs` can use
// `crate::app::...`, `crate::core::...` etc.
pub use imageqa::app;
pub use imageqa::core;
pub use imageqa::platform;
pub use imageqa::ui;
pub use imageqa::util;

use clap::Parser;
use crate::core::answer::{AnswerConfig, ApiKey};
use crate::core::image::Preprocessing;
use crate::core::theme::ThemePreset;
use std::path::PathBuf;
use std::time::Duration;

/// Side length of the generated window icon.
const ICON_SIZE: u32 = 64;

/// Window icon: a diagonal gradient in the preset's colours.
fn gradient_icon(preset: ThemePreset) -> egui::IconData {
    let (a, b) = (preset.primary(), preset.secondary());
    let span = (2 * (ICON_SIZE - 1)) as f32;
    let mut rgba = Vec::with_capacity((ICON_SIZE * ICON_SIZE * 4) as usize);
    for y in 0..ICON_SIZE {
        for x in 0..ICON_SIZE {
            let t = (x + y) as f32 / span;
            let mix = |p: u8, q: u8| (p as f32 + (q as f32 - p as f32) * t).round() as u8;
            rgba.extend_from_slice(&[mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2), 255]);
        }
    }
    egui::IconData {
        rgba,
        width: ICON_SIZE,
        height: ICON_SIZE,
    }
}

/// Image Question Answering - upload an image and ask questions about it.
///
/// Answers come from the model endpoint configured in config.toml, on the
/// command line, or in the settings panel. Without an endpoint a built-in
/// placeholder responder is used.
#[derive(Parser, Debug)]
#[command(name = "imageqa", version, about)]
struct Cli {
    /// Image to load at startup.
    image: Option<PathBuf>,

    /// Model endpoint URL (overrides config.toml).
    #[arg(short = 'e', long = "endpoint")]
    endpoint: Option<String>,

    /// Theme preset name, e.g. "Ocean Blue".
    #[arg(short = 't', long = "theme")]
    theme: Option<String>,

    /// Directory containing config.toml (overrides the platform default).
    #[arg(short = 'c', long = "config-dir")]
    config_dir: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    // Config first: it may carry the log level.
    let platform_paths = platform::config::PlatformPaths::resolve();
    let config_dir = cli
        .config_dir
        .clone()
        .unwrap_or_else(|| platform_paths.config_dir.clone());
    let (config, mut warnings) = platform::config::load_config(&config_dir);

    util::logging::init(cli.debug, config.log_level.as_deref());

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        config_dir = %config_dir.display(),
        "ImageQA starting"
    );
    for warning in &warnings {
        tracing::warn!("{}", warning);
    }

    // Theme: an explicit CLI name must be valid; a bad config value falls back.
    let theme = match cli.theme.as_deref() {
        Some(name) => match ThemePreset::from_name(name) {
            Ok(preset) => preset,
            Err(e) => {
                let known: Vec<&str> = ThemePreset::ALL.iter().map(|p| p.name()).collect();
                tracing::error!(error = %e, "Invalid --theme");
                eprintln!("Error: {e}. Known themes: {}", known.join(", "));
                std::process::exit(2);
            }
        },
        None => match config.theme.as_deref().map(ThemePreset::from_name) {
            Some(Ok(preset)) => preset,
            Some(Err(e)) => {
                let msg = format!("config.toml [ui] theme: {e}. Using the default theme.");
                tracing::warn!("{}", msg);
                warnings.push(msg);
                ThemePreset::default()
            }
            None => ThemePreset::default(),
        },
    };

    let api_key = platform::config::resolve_api_key(
        std::env::var(util::constants::API_KEY_ENV_VAR).ok(),
        config.api_key.as_deref(),
    );

    let answer_config = AnswerConfig {
        endpoint: cli.endpoint.clone().unwrap_or(config.endpoint.clone()),
        api_key: api_key.map(ApiKey::new).unwrap_or_default(),
        temperature: config.temperature,
        max_tokens: config.max_tokens,
        preprocessing: Preprocessing {
            resize_enabled: config.resize,
            max_dimension: config.max_dimension,
        },
        timeout: Duration::from_secs(config.timeout_secs),
    }
    .clamped();

    tracing::info!(
        theme = theme.name(),
        endpoint = answer_config.has_endpoint(),
        api_key = ?answer_config.api_key,
        "Ready to launch GUI"
    );

    let mut state = app::state::AppState::new(answer_config, theme, cli.debug);
    state.warnings = warnings;
    state.export_dir = Some(platform_paths.data_dir.clone());

    // An image named on the CLI is loaded before the first frame.
    if let Some(ref path) = cli.image {
        state.upload_from_path(path);
    }

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!(
                "{} v{}",
                util::constants::APP_NAME,
                util::constants::APP_VERSION
            ))
            .with_app_id(util::constants::APP_ID)
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([900.0, 560.0])
            .with_drag_and_drop(true)
            .with_icon(gradient_icon(theme)),
        ..Default::default()
    };

    let result = eframe::run_native(
        util::constants::APP_NAME,
        native_options,
        Box::new(move |_cc| Ok(Box::new(gui::ImageQaApp::new(state)))),
    );

    if let Err(e) = result {
        tracing::error!(error = %e, "Failed to launch GUI");
        eprintln!("Error: Failed to launch the ImageQA GUI: {e}");
        std::process::exit(1);
    }
}
