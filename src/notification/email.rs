// Outbound email
//
// Provider: Resend (HTTP API, bearer auth)
// Delivery is best-effort: pipelines log failures and move on, they
// never retry inline and never roll back settlement state.

use crate::error::{AppResult, NotificationError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

/// A single outbound message for the notification sink
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub recipient: String,
    pub subject: String,
    pub body: EmailBody,
}

#[derive(Debug, Clone)]
pub enum EmailBody {
    Text(String),
    Html(String),
}

/// Notification sink boundary
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> AppResult<()>;
}

/// Resend email client
pub struct ResendMailer {
    api_key: String,
    from_email: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ResendEmailRequest {
    to: String,
    from: String,
    subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResendEmailResponse {
    id: String,
}

impl ResendMailer {
    pub fn new(api_key: String, from_email: String) -> Self {
        Self {
            api_key,
            from_email,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl NotificationSink for ResendMailer {
    async fn send(&self, message: &EmailMessage) -> AppResult<()> {
        let (text, html) = match &message.body {
            EmailBody::Text(body) => (Some(body.clone()), None),
            EmailBody::Html(body) => (None, Some(body.clone())),
        };

        let request = ResendEmailRequest {
            to: message.recipient.clone(),
            from: self.from_email.clone(),
            subject: message.subject.clone(),
            text,
            html,
        };

        let response = self
            .client
            .post("https://api.resend.com/emails")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(NotificationError::Rejected { status, body }.into());
        }

        let result: ResendEmailResponse = response.json().await?;
        info!("📧 Email sent via Resend: {}", result.id);
        Ok(())
    }
}

/// Log-only sink, used when no mail provider is configured
pub struct LogMailer;

#[async_trait]
impl NotificationSink for LogMailer {
    async fn send(&self, message: &EmailMessage) -> AppResult<()> {
        info!(
            "📧 Outbound email suppressed (no provider configured): to={} subject={:?}",
            message.recipient, message.subject
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resend_mailer_creation() {
        let mailer = ResendMailer::new(
            "test_key".to_string(),
            "no-reply@example.com".to_string(),
        );
        assert_eq!(mailer.from_email, "no-reply@example.com");
    }

    #[test]
    fn test_request_carries_one_body_kind() {
        let request = ResendEmailRequest {
            to: "a@example.com".to_string(),
            from: "b@example.com".to_string(),
            subject: "hi".to_string(),
            text: Some("plain".to_string()),
            html: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["text"], "plain");
        assert!(json.get("html").is_none());
    }
}
