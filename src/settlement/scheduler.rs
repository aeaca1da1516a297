use crate::settlement::pipeline::AuctionSettler;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};
use tracing::{error, info};

/// Settlement schedule configuration
#[derive(Debug, Clone)]
pub struct SettlementScheduleConfig {
    /// Fixed polling interval between sweeps
    pub poll_interval: Duration,
}

impl Default for SettlementScheduleConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(60),
        }
    }
}

/// Settlement scheduler - drives the ended-auction sweep on a fixed
/// interval
///
/// A tick runs its batch to completion before the next fires, but a
/// slow tick and its successor are not mutually excluded; the
/// pipeline's flag and atomic balance operations keep that overlap
/// safe.
pub struct SettlementScheduler {
    config: SettlementScheduleConfig,
    settler: Arc<AuctionSettler>,
}

impl SettlementScheduler {
    pub fn new(config: SettlementScheduleConfig, settler: Arc<AuctionSettler>) -> Self {
        Self { config, settler }
    }

    /// Start the scheduler (runs in background until the handle is
    /// aborted)
    pub fn start(&self) -> JoinHandle<()> {
        let config = self.config.clone();
        let settler = self.settler.clone();

        tokio::spawn(async move {
            let mut ticker = interval(config.poll_interval);

            loop {
                ticker.tick().await;

                info!("🔄 Cron for ended auctions running...");

                // A failed tick ends early; the next tick retries from
                // scratch
                if let Err(e) = settler.settle_ended_auctions().await {
                    error!("❌ Error in ended auction sweep: {}", e);
                }
            }
        })
    }
}
