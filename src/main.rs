use listing_desk::config::Config;
use listing_desk::server;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("🏠 Listing Desk");
    info!("==========================================");

    let config = Config::from_env()?;
    info!(
        "Backend: {:?}, listening on {}",
        config.backend.kind,
        config.server_address()
    );

    server::serve(config).await
}
