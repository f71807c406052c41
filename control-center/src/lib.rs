//! Control Center server
//!
//! Renders the table of compute node config files and persists edits made
//! in the browser by the `cfg-editor` widgets.

pub mod api;
pub mod catalog;
pub mod config;
pub mod state;

pub use state::AppState;
