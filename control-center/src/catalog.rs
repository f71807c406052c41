//! Config file discovery and path resolution
//!
//! All names handed to the browser, and all `FileName`s coming back, are
//! relative to the config root. Traversal out of the root is rejected.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tracing::error;

const CONFIG_SUFFIX: &str = ".yaml";

/// Leading characters marking a file as hidden, scratch, or retired
const SKIP_PREFIXES: [char; 4] = ['.', '_', '~', '!'];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("empty file name")]
    Empty,
    #[error("file name contains null bytes")]
    NullByte,
    #[error("absolute paths are not allowed")]
    Absolute,
    #[error("path escapes the config directory")]
    Escapes,
    #[error("not an editable config file")]
    NotConfigFile,
}

/// Validate `name` and join it onto `root`.
///
/// The result is always a direct child of `root` that [`list_config_files`]
/// would include.
pub fn resolve(root: &Path, name: &str) -> Result<PathBuf, PathError> {
    if name.is_empty() {
        return Err(PathError::Empty);
    }
    if name.contains('\0') {
        return Err(PathError::NullByte);
    }
    if name.starts_with('/') || name.starts_with('\\') {
        return Err(PathError::Absolute);
    }

    let mut normalized = PathBuf::new();
    for comp in Path::new(name).components() {
        match comp {
            Component::Normal(s) => normalized.push(s),
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    return Err(PathError::Escapes);
                }
            }
            Component::RootDir | Component::Prefix(_) => return Err(PathError::Absolute),
        }
    }
    if normalized.as_os_str().is_empty() {
        return Err(PathError::Empty);
    }
    // Only names the listing would show are writable.
    let listed = normalized.components().count() == 1
        && normalized.to_str().is_some_and(is_config_file_name);
    if !listed {
        return Err(PathError::NotConfigFile);
    }

    Ok(root.join(normalized))
}

/// Whether a directory entry name is an editable config file
pub fn is_config_file_name(name: &str) -> bool {
    match name.chars().next() {
        None => false,
        Some(first) if SKIP_PREFIXES.contains(&first) => false,
        Some(_) => name.ends_with(CONFIG_SUFFIX),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    /// Name relative to the config root, as sent back in `FileName`
    pub name: String,
    pub content: String,
}

/// List the config files directly under `root`, sorted by name.
///
/// A file that cannot be read is logged and left out; the rest still load.
pub async fn list_config_files(root: &Path) -> std::io::Result<Vec<ConfigFile>> {
    let mut entries = fs::read_dir(root).await?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let file_type = entry.file_type().await?;
        if !file_type.is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(ToString::to_string) else {
            continue;
        };
        if !is_config_file_name(&name) {
            continue;
        }

        match fs::read_to_string(entry.path()).await {
            Ok(content) => files.push(ConfigFile { name, content }),
            Err(e) => error!(file = %name, error = %e, "Error loading config file"),
        }
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}
