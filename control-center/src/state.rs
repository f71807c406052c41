use std::path::PathBuf;

use tokio::sync::Mutex;

pub struct AppState {
    /// Root that every `FileName` is resolved against
    pub config_root: PathBuf,
    pub title: String,
    /// Serializes the read-compare-write of a save
    pub save_lock: Mutex<()>,
}

impl AppState {
    pub fn new(config_root: impl Into<PathBuf>, title: impl Into<String>) -> Self {
        Self {
            config_root: config_root.into(),
            title: title.into(),
            save_lock: Mutex::new(()),
        }
    }
}
