// ImageQA - platform/mod.rs
//
// Platform abstraction layer: directories and config.toml.
// Dependencies: util, directories, toml.
// Must NOT depend on: core, app, ui.

pub mod config;
