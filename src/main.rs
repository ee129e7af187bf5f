use chatsearch::{AppConfig, SearchApp};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chatsearch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;
    tracing::info!("starting chatsearch v{}", env!("CARGO_PKG_VERSION"));

    let app = SearchApp::start(config).await?;
    tracing::info!("search backend running, press Ctrl+C to shut down");

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received");

    app.shutdown().await;
    Ok(())
}
