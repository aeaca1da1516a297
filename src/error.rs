use thiserror::Error;
use uuid::Uuid;

/// Top-level error type for the entire application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Commission error: {0}")]
    Commission(#[from] CommissionError),

    #[error("Notification error: {0}")]
    Notification(#[from] NotificationError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Commission calculator errors
#[derive(Error, Debug)]
pub enum CommissionError {
    #[error("Auction not found: {0}")]
    AuctionNotFound(Uuid),
}

/// Notification delivery errors
///
/// Delivery is best-effort from the pipelines' perspective: callers log
/// these and carry on, they never roll back applied mutations.
#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Mail transport error: {0}")]
    Transport(String),

    #[error("Mail provider rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(error: sqlx::migrate::MigrateError) -> Self {
        AppError::Internal(format!("Migration error: {:?}", error))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal(format!("Error converting: {:?}", error))
    }
}

impl From<rust_decimal::Error> for AppError {
    fn from(error: rust_decimal::Error) -> Self {
        AppError::InvalidInput(format!("Decimal conversion error: {:?}", error))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        AppError::Notification(NotificationError::Transport(format!("{:?}", error)))
    }
}

/// Result type alias for the application
pub type AppResult<T> = Result<T, AppError>;
