mod bootstrap;
mod config;
mod error;
mod ledger;
mod nodes;
mod promoter;
mod state;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Initialize logging and tracing
fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tangle_promoter=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("🚀 Starting tangle bundle promoter");

    dotenv::dotenv().ok();
    let config = config::Config::from_env()?;

    let promoter = bootstrap::initialize_promoter(&config).await?;
    let summary = promoter.run().await?;

    info!(
        "✓ Pass finished: {} bundle(s) processed, {} still need attention",
        summary.processed, summary.failed
    );

    Ok(())
}
