// ImageQA - core/mod.rs
//
// Core business logic layer: session state machine, image codec,
// theme presets, answering strategy seam, export.
// Dependencies: util, image, serde.
// Must NOT depend on: ui, platform, app, or any GUI crate.

pub mod answer;
pub mod export;
pub mod image;
pub mod model;
pub mod session;
pub mod theme;
