use crate::{
    commission::CommissionCalculator,
    config::Config,
    error::AppResult,
    ledger::{repository::LedgerRepository, store::LedgerStore},
    notification::email::{LogMailer, NotificationSink, ResendMailer},
    reconciliation::{
        pipeline::CommissionReconciler,
        scheduler::{ReconciliationScheduleConfig, ReconciliationScheduler},
    },
    settlement::{
        pipeline::AuctionSettler,
        scheduler::{SettlementScheduleConfig, SettlementScheduler},
    },
};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{sync::Arc, time::Duration};
use tracing::{info, warn};

pub struct App {
    pub settlement: SettlementScheduler,
    pub reconciliation: ReconciliationScheduler,
}

pub async fn initialize_app(config: &Config) -> AppResult<App> {
    info!("Initializing application components ...");

    // Database pool
    let pool = initialize_database(&config.database_url).await?;

    // The ledger store is THE source of truth for all state
    let ledger: Arc<dyn LedgerStore> = Arc::new(LedgerRepository::new(pool));

    let mailer: Arc<dyn NotificationSink> = match &config.resend_api_key {
        Some(api_key) => {
            info!("✅ Resend mailer configured (from: {})", config.mail_from);
            Arc::new(ResendMailer::new(api_key.clone(), config.mail_from.clone()))
        }
        None => {
            warn!("⚠️  RESEND_API_KEY not set - outbound email disabled, notices are logged only");
            Arc::new(LogMailer)
        }
    };

    let settler = Arc::new(AuctionSettler::new(
        ledger.clone(),
        CommissionCalculator::new(ledger.clone()),
        mailer.clone(),
        config.support_email.clone(),
    ));
    let settlement = SettlementScheduler::new(
        SettlementScheduleConfig {
            poll_interval: Duration::from_secs(config.settlement_interval_secs),
        },
        settler,
    );
    info!(
        "✅ Settlement pipeline initialized (every {}s)",
        config.settlement_interval_secs
    );

    let reconciler = Arc::new(CommissionReconciler::new(ledger.clone(), mailer.clone()));
    let reconciliation = ReconciliationScheduler::new(
        ReconciliationScheduleConfig {
            poll_interval: Duration::from_secs(config.reconciliation_interval_secs),
        },
        reconciler,
    );
    info!(
        "✅ Reconciliation pipeline initialized (every {}s)",
        config.reconciliation_interval_secs
    );

    Ok(App {
        settlement,
        reconciliation,
    })
}

async fn initialize_database(database_url: &str) -> AppResult<PgPool> {
    info!("📊 Connecting to database...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .connect(database_url)
        .await?;

    // Run migrations
    info!("🔄 Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    info!("✓ Database initialized");
    Ok(pool)
}
