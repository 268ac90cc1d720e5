// ImageQA - app/mod.rs
//
// Application layer: UI-facing state, the HTTP answering collaborator,
// and the background request manager.
// Dependencies: core layer.
// Must NOT depend on: ui, platform specifics.

pub mod ask;
pub mod http;
pub mod state;
