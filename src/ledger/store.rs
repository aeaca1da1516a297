use crate::error::AppResult;
use crate::ledger::models::{Auction, Bid, PaymentProof, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Ledger & account store boundary
///
/// The pipelines hold no state between ticks beyond what they reload
/// through this trait. No multi-document transaction is assumed beyond
/// per-document atomicity, so every balance mutation here is a single
/// store-level atomic operation, never read-modify-write.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    // ========== AUCTION / BID OPERATIONS ==========

    /// Auctions whose end time has passed and whose commission has not
    /// yet been calculated.
    async fn find_ended_unsettled_auctions(&self, now: DateTime<Utc>) -> AppResult<Vec<Auction>>;

    async fn get_auction(&self, auction_id: Uuid) -> AppResult<Option<Auction>>;

    /// The bid on `auction_id` whose amount equals the auction's recorded
    /// closing price. Zero matches means the auction closed without a
    /// winner; with more than one match (a data anomaly) the earliest bid
    /// wins, so the choice is deterministic.
    async fn find_winning_bid(&self, auction_id: Uuid, amount: Decimal)
        -> AppResult<Option<Bid>>;

    /// Set `commission_calculated = true`. Persisted before anything else
    /// in the settlement sequence so the auction is never reprocessed,
    /// whatever happens afterwards.
    async fn mark_commission_calculated(&self, auction_id: Uuid) -> AppResult<()>;

    async fn record_highest_bidder(&self, auction_id: Uuid, bidder: Uuid) -> AppResult<()>;

    // ========== USER / BALANCE OPERATIONS ==========

    async fn get_user(&self, user_id: Uuid) -> AppResult<Option<User>>;

    /// Atomically increment the seller's unpaid commission balance and
    /// return the new value.
    async fn add_unpaid_commission(&self, user_id: Uuid, amount: Decimal) -> AppResult<Decimal>;

    /// Atomically credit a won auction to the bidder: `money_spent` grows
    /// by the winning amount, `auctions_won` by one.
    async fn record_auction_win(&self, user_id: Uuid, amount: Decimal) -> AppResult<()>;

    /// Atomically decrement the seller's unpaid commission balance,
    /// clamping at zero, and return the new value.
    async fn settle_unpaid_commission(
        &self,
        user_id: Uuid,
        amount: Decimal,
    ) -> AppResult<Decimal>;

    // ========== PAYMENT PROOF / COMMISSION LEDGER ==========

    async fn find_approved_proofs(&self) -> AppResult<Vec<PaymentProof>>;

    /// Guarded transition `Approved -> Settled`. Returns false when the
    /// proof was not in `Approved` (already settled by an overlapping
    /// tick, or withdrawn upstream), in which case the caller skips the
    /// rest of the sequence.
    async fn mark_proof_settled(&self, proof_id: Uuid) -> AppResult<bool>;

    /// Append the audit entry for a settled proof. Idempotent by
    /// `proof_id`: appending twice for the same proof is a no-op.
    async fn append_commission_entry(
        &self,
        proof_id: Uuid,
        user_id: Uuid,
        amount: Decimal,
    ) -> AppResult<()>;
}
