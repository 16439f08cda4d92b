use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trusted_merge::config::{Config, LogFormat};
use trusted_merge::{create_router, AppState};

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "trusted_merge=debug,tower_http=debug,axum::rejection=trace".into());

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_target(false))
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    init_tracing(LogFormat::from_env());

    let config = Config::from_env()?;

    tracing::info!("Starting Trusted Merge service");
    tracing::info!("Max files per request: {}", config.max_files);
    tracing::info!("External command timeout: {}s", config.command_timeout_seconds);
    tracing::info!("Workspace root: {}", config.temp_root.display());

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let app = create_router(AppState::from_config(config));

    tracing::info!("Server listening on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
