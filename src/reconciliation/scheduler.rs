use crate::reconciliation::pipeline::CommissionReconciler;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};
use tracing::{error, info};

/// Reconciliation schedule configuration
#[derive(Debug, Clone)]
pub struct ReconciliationScheduleConfig {
    /// Fixed polling interval between sweeps
    pub poll_interval: Duration,
}

impl Default for ReconciliationScheduleConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(60),
        }
    }
}

/// Reconciliation scheduler - drives the approved-proof sweep on a
/// fixed interval
pub struct ReconciliationScheduler {
    config: ReconciliationScheduleConfig,
    reconciler: Arc<CommissionReconciler>,
}

impl ReconciliationScheduler {
    pub fn new(
        config: ReconciliationScheduleConfig,
        reconciler: Arc<CommissionReconciler>,
    ) -> Self {
        Self { config, reconciler }
    }

    /// Start the scheduler (runs in background until the handle is
    /// aborted)
    pub fn start(&self) -> JoinHandle<()> {
        let config = self.config.clone();
        let reconciler = self.reconciler.clone();

        tokio::spawn(async move {
            let mut ticker = interval(config.poll_interval);

            loop {
                ticker.tick().await;

                info!("🔄 Running verify commission cron...");

                if let Err(e) = reconciler.reconcile_approved_proofs().await {
                    error!("❌ Error in commission reconciliation sweep: {}", e);
                }
            }
        })
    }
}
