use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Port the control center listens on
    pub port: u16,
    /// Directory holding the editable compute node config files
    pub config_dir: PathBuf,
    /// Directory with the built `cfg-editor` bundle, served under `/wasm`
    pub frontend_dist: String,
    /// Page title
    pub title: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            port: env_parse("CONTROL_CENTER_PORT", 7070)?,
            config_dir: PathBuf::from(env_str("CONTROL_CENTER_CONFIG_DIR", "etc/cnodes")),
            frontend_dist: frontend_dist_from_env(),
            title: env_str("CONTROL_CENTER_TITLE", "Different HPC Control Center"),
        })
    }
}

fn env_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Failed to parse env var {key}={val}: {e}")),
        Err(_) => Ok(default),
    }
}

/// Resolve the `cfg-editor` dist directory.
///
/// If `FRONTEND_DIST` is set, that value is used as-is.
/// Otherwise resolve from the workspace root so this works whether the
/// server is launched from repository root or from `control-center/`.
pub fn frontend_dist_from_env() -> String {
    if let Ok(path) = std::env::var("FRONTEND_DIST") {
        return path;
    }

    let workspace_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));

    workspace_root
        .join("cfg-editor/dist")
        .to_string_lossy()
        .to_string()
}
