use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::Type;
use std::fmt;
use uuid::Uuid;

/// Marketplace role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
pub enum UserRole {
    Auctioneer,
    Bidder,
    SuperAdmin,
}

/// Payment proof lifecycle
///
/// Proofs are created and approved upstream; this service only ever moves
/// `Approved` proofs to `Settled`. `Settled` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "proof_status", rename_all = "lowercase")]
pub enum ProofStatus {
    Pending,
    Approved,
    Rejected,
    Settled,
}

impl fmt::Display for ProofStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProofStatus::Pending => "pending",
            ProofStatus::Approved => "approved",
            ProofStatus::Rejected => "rejected",
            ProofStatus::Settled => "settled",
        };
        write!(f, "{}", label)
    }
}

/// Seller payout coordinates, used only for message rendering
///
/// Each method is present or absent as a whole; rendering substitutes
/// "Not Available" for anything missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentMethods {
    pub bank_transfer: Option<BankTransferDetails>,
    pub upi: Option<UpiDetails>,
    pub paypal: Option<PaypalDetails>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankTransferDetails {
    pub bank_account_name: Option<String>,
    pub bank_account_number: Option<String>,
    pub bank_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpiDetails {
    pub upi_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaypalDetails {
    pub paypal_email: Option<String>,
}

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub user_name: String,
    pub email: String,
    pub role: UserRole,

    /// Seller-side running balance of commission owed. Never negative.
    #[serde(with = "rust_decimal::serde::float")]
    pub unpaid_commission: Decimal,

    /// Bidder-side counters
    pub auctions_won: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub money_spent: Decimal,

    pub payment_methods: PaymentMethods,
    pub created_at: DateTime<Utc>,
}

/// Auction entity
///
/// INVARIANT: `commission_calculated` is monotonic false→true; once true
/// the settlement pipeline must never pick the auction up again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Auction {
    pub id: Uuid,
    pub title: String,
    pub end_time: DateTime<Utc>,

    /// Highest amount reached while bidding was open
    #[serde(with = "rust_decimal::serde::float")]
    pub current_bid: Decimal,

    pub commission_calculated: bool,
    /// Resolved winner, null until settlement finds one
    pub highest_bidder: Option<Uuid>,
    /// The seller
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Auction {
    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        self.end_time < now
    }

    /// Eligible for the settlement sweep
    pub fn awaiting_settlement(&self, now: DateTime<Utc>) -> bool {
        self.has_ended(now) && !self.commission_calculated
    }
}

/// Bid entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bid {
    pub id: Uuid,
    pub auction_item: Uuid,
    pub bidder: Uuid,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Seller-submitted claim of commission payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentProof {
    pub id: Uuid,
    /// The seller who submitted the proof
    pub user_id: Uuid,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub status: ProofStatus,
    /// Reviewer note, rendering-only
    pub comment: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

/// Append-only audit record of a settled commission payment
///
/// Keyed by the proof that produced it so a retried partial run cannot
/// append twice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommissionEntry {
    pub id: Uuid,
    pub proof_id: Uuid,
    pub user_id: Uuid,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_awaiting_settlement() {
        let now = Utc::now();
        let mut auction = Auction {
            id: Uuid::new_v4(),
            title: "Vintage camera".to_string(),
            end_time: now - chrono::Duration::minutes(5),
            current_bid: dec!(120),
            commission_calculated: false,
            highest_bidder: None,
            created_by: Uuid::new_v4(),
            created_at: now - chrono::Duration::days(3),
        };
        assert!(auction.awaiting_settlement(now));

        auction.commission_calculated = true;
        assert!(!auction.awaiting_settlement(now));

        auction.commission_calculated = false;
        auction.end_time = now + chrono::Duration::minutes(5);
        assert!(!auction.awaiting_settlement(now));
    }
}
