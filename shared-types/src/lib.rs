//! Shared types between frontend and backend
//!
//! These types are used by both:
//! - the control center server (native Rust)
//! - the config editor widgets (WASM)
//!
//! Serializable with serde for JSON over HTTP

use serde::{Deserialize, Serialize};

// ============================================================================
// Save Endpoint
// ============================================================================

/// Body of `POST /cnode/v1/save`
///
/// Field names are PascalCase on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct SaveConfigRequest {
    /// Backing file, relative to the server's config directory
    pub file_name: String,

    /// Content the user wants persisted
    pub after_edit: String,

    /// Content captured when edit mode was entered.
    /// Empty means "no stale check".
    #[serde(default)]
    pub pre_edit: String,
}

/// Response of `POST /cnode/v1/save`
///
/// An HTTP success status with `err` set is still a failed save.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SaveConfigResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<String>,
}

impl SaveConfigResponse {
    pub fn ok() -> Self {
        Self { err: None }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            err: Some(message.into()),
        }
    }

    /// Application-level error, if any. An empty `err` counts as success.
    pub fn error_message(&self) -> Option<&str> {
        self.err.as_deref().filter(|e| !e.is_empty())
    }
}

// ============================================================================
// Widget Actions
// ============================================================================

/// Declared action of a widget button (`data-act`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonAction {
    Save,
    Cancel,
}

impl ButtonAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ButtonAction::Save => ACTION_SAVE,
            ButtonAction::Cancel => ACTION_CANCEL,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            ACTION_SAVE => Some(ButtonAction::Save),
            ACTION_CANCEL => Some(ButtonAction::Cancel),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ButtonAction::Save => "Save",
            ButtonAction::Cancel => "Cancel",
        }
    }
}

// ============================================================================
// Constants
// ============================================================================

/// Save endpoint path
pub const SAVE_CONFIG_PATH: &str = "/cnode/v1/save";

/// DOM contract between the rendered page and the editor
pub const CONFIG_TABLE_ID: &str = "cnode_tbl";
pub const WIDGET_CLASS: &str = "ConfigFileEdit";
pub const WIDGET_SELECTOR: &str = "div.ConfigFileEdit";
pub const TEXT_SURFACE_TAG: &str = "TEXTAREA";
pub const ACTION_BUTTON_TAG: &str = "BUTTON";
pub const ATTR_FILE_NAME: &str = "data-filename";
pub const ATTR_PRE_EDIT: &str = "data-pre-edit";
pub const ATTR_ACTION: &str = "data-act";
pub const ATTR_WIDGET_ID: &str = "data-widget-id";

pub const ACTION_SAVE: &str = "save";
pub const ACTION_CANCEL: &str = "cancel";

// ============================================================================
// Tests
// ============================================================================
