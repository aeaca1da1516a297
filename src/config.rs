use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database_url: String,
    /// Resend API key; outbound email is disabled when unset
    pub resend_api_key: Option<String>,
    pub mail_from: String,
    pub support_email: String,
    /// Seconds between ended-auction settlement sweeps
    pub settlement_interval_secs: u64,
    /// Seconds between payment-proof reconciliation sweeps
    pub reconciliation_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgresql://localhost/auctions".to_string()),
            resend_api_key: std::env::var("RESEND_API_KEY").ok(),
            mail_from: std::env::var("MAIL_FROM")
                .unwrap_or_else(|_| "no-reply@primebid.example".to_string()),
            support_email: std::env::var("SUPPORT_EMAIL")
                .unwrap_or_else(|_| "support@primebid.example".to_string()),
            settlement_interval_secs: std::env::var("SETTLEMENT_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            reconciliation_interval_secs: std::env::var("RECONCILIATION_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
        })
    }
}
