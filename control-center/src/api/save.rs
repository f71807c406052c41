//! `POST /cnode/v1/save`
//!
//! Application-level outcomes always answer 200; failures are reported in
//! the `err` field of the body.

use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Local};
use shared_types::{SaveConfigRequest, SaveConfigResponse};
use thiserror::Error;
use tokio::fs;
use tracing::{error, info, warn};

use crate::catalog::{self, PathError};
use crate::AppState;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("Invalid config file name: {0}")]
    InvalidName(#[from] PathError),

    /// The file on disk no longer matches the content the user started from
    #[error("Config file has changed at {0}")]
    Stale(String),

    #[error("Unexpected error: {0}")]
    Read(std::io::Error),

    #[error("Failed saving config file: {0}")]
    Write(std::io::Error),
}

pub async fn save_config(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SaveConfigRequest>,
) -> Json<SaveConfigResponse> {
    let result = {
        let _guard = state.save_lock.lock().await;
        save_to_disk(&state.config_root, &req).await
    };

    match result {
        Ok(()) => {
            info!(
                file = %req.file_name,
                bytes = req.after_edit.len(),
                "config file saved"
            );
            Json(SaveConfigResponse::ok())
        }
        Err(e) => {
            match &e {
                SaveError::Stale(_) | SaveError::InvalidName(_) => {
                    warn!(file = %req.file_name, "rejected config save: {e}")
                }
                SaveError::Read(_) | SaveError::Write(_) => {
                    error!(file = %req.file_name, "Error saving config file: {e}")
                }
            }
            Json(SaveConfigResponse::error(e.to_string()))
        }
    }
}

async fn save_to_disk(root: &Path, req: &SaveConfigRequest) -> Result<(), SaveError> {
    let path = catalog::resolve(root, &req.file_name)?;

    match fs::metadata(&path).await {
        Ok(meta) if !req.pre_edit.is_empty() => {
            let current = fs::read_to_string(&path).await.map_err(SaveError::Read)?;
            if req.pre_edit != current {
                return Err(SaveError::Stale(format_mtime(meta.modified().ok())));
            }
        }
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(file = %req.file_name, "Config file disappeared, writing it anew");
        }
        Err(e) => return Err(SaveError::Read(e)),
    }

    fs::write(&path, req.after_edit.as_bytes())
        .await
        .map_err(SaveError::Write)
}

fn format_mtime(modified: Option<SystemTime>) -> String {
    match modified {
        Some(time) => DateTime::<Local>::from(time).to_rfc3339(),
        None => "an unknown time".to_string(),
    }
}
