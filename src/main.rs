mod bootstrap;
mod commission;
mod config;
mod error;
mod ledger;
mod notification;
mod reconciliation;
mod settlement;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Initialize logging and tracing
fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,auction_settlement=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    info!("🚀 Starting Auction Settlement Backend");

    // Load configuration
    dotenv::dotenv().ok();
    let config = config::Config::from_env()
        .map_err(|e| error::AppError::Config(e.to_string()))?;

    let app = bootstrap::initialize_app(&config).await?;

    // Each scheduler owns its own background task; the process owns the
    // handles and stops them on shutdown
    let settlement = app.settlement.start();
    let reconciliation = app.reconciliation.start();

    info!("🌐 Settlement and reconciliation schedulers started");

    tokio::signal::ctrl_c().await?;

    info!("Shutting down schedulers");
    settlement.abort();
    reconciliation.abort();

    Ok(())
}
