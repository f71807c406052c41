use std::sync::Arc;

use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use control_center::{api, config, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "control_center=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::Config::from_env()?;
    info!(port = config.port, "control center starting");

    if !config.config_dir.is_dir() {
        warn!(
            dir = %config.config_dir.display(),
            "config directory does not exist yet; the page will report it"
        );
    }
    info!(dir = %config.config_dir.display(), "serving config files from");

    let frontend_dist = config.frontend_dist.clone();
    info!(path = %frontend_dist, "serving editor bundle from");

    let state = Arc::new(AppState::new(config.config_dir.clone(), config.title.clone()));

    let app = api::router()
        // wasm-bindgen output: cfg_editor.js + cfg_editor_bg.wasm
        .nest_service("/wasm", ServeDir::new(&frontend_dist))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    info!("listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
