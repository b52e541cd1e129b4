//! Facegate entrypoint

use anyhow::Result;
use clap::Parser;
use facegate_gateway::config::GatewayConfig;
use facegate_gateway::server::run_server_with_shutdown;
use std::path::PathBuf;
use std::time::Duration;
use tokio::signal;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "facegate",
    version,
    about = "Authenticated gateway for the face recognition service"
)]
struct Args {
    /// Address to bind
    #[arg(long, env = "FACEGATE_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(long, env = "FACEGATE_PORT", default_value_t = 3001)]
    port: u16,

    /// Base URL of the recognizer service
    #[arg(long, env = "RECOGNIZER_API_URL", default_value = "http://localhost:5000")]
    upstream_url: String,

    /// Shared secret for verifying bearer tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: String,

    /// Directory for transient upload staging
    #[arg(long, env = "FACEGATE_STAGING_DIR", default_value = "uploads")]
    staging_dir: PathBuf,

    /// Upload size ceiling in bytes
    #[arg(long, env = "FACEGATE_MAX_UPLOAD_BYTES", default_value_t = 10 * 1024 * 1024)]
    max_upload_bytes: u64,

    /// Requests allowed per rate window
    #[arg(long, env = "FACEGATE_RATE_LIMIT_MAX", default_value_t = 10)]
    rate_limit_max: u32,

    /// Rate window length in seconds
    #[arg(long, env = "FACEGATE_RATE_LIMIT_WINDOW_SECS", default_value_t = 60)]
    rate_limit_window_secs: u64,

    /// Enable debug logging
    #[arg(long, env = "FACEGATE_DEBUG")]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let default_filter = if args.debug {
        "facegate_gateway=debug,facegate_recognizer=debug,tower_http=debug"
    } else {
        "facegate_gateway=info,facegate_recognizer=info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = GatewayConfig {
        host: args.host,
        port: args.port,
        upstream_url: args.upstream_url,
        jwt_secret: args.jwt_secret,
        staging_dir: args.staging_dir,
        max_upload_bytes: args.max_upload_bytes,
        rate_limit_max: args.rate_limit_max,
        rate_limit_window: Duration::from_secs(args.rate_limit_window_secs),
        ..GatewayConfig::default()
    };

    run_server_with_shutdown(config, shutdown_signal()).await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
