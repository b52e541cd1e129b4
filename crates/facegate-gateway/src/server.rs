//! Server startup and lifecycle

use crate::config::GatewayConfig;
use crate::routes::create_router;
use crate::state::AppState;
use anyhow::{Context, Result};
use std::future::Future;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

/// How often lapsed rate windows get swept out
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Run the gateway until the process is killed
pub async fn run_server(config: GatewayConfig) -> Result<()> {
    run_server_with_shutdown(config, std::future::pending()).await
}

/// Run the gateway until `shutdown` resolves
pub async fn run_server_with_shutdown(
    config: GatewayConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let bind = config.bind_addr();
    let state = AppState::new(config)?;

    state.stager.ensure_dir().await.with_context(|| {
        format!(
            "creating staging directory {}",
            state.stager.dir().display()
        )
    })?;
    spawn_window_sweeper(state.clone());

    let app = create_router(state.clone());
    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("binding {bind}"))?;

    info!("🚀 Facegate listening on {}", bind);
    info!(
        "   Upstream recognizer: {}",
        state.recognizer.config().base_url()
    );
    info!(
        "   Rate limit: {} requests per {}s",
        state.limiter.max_requests(),
        state.limiter.window().as_secs()
    );
    info!("   Staging uploads in {}", state.stager.dir().display());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

/// Periodically drop rate windows nobody will read again. Admission
/// correctness never depends on this; it only caps memory.
fn spawn_window_sweeper(state: AppState) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
        // The first tick fires immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = state.limiter.sweep_expired();
            if removed > 0 {
                tracing::debug!("Swept {} lapsed rate windows", removed);
            }
        }
    });
}
