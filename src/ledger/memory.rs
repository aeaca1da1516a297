use crate::error::{AppError, AppResult};
use crate::ledger::models::*;
use crate::ledger::store::LedgerStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Default)]
struct LedgerState {
    auctions: HashMap<Uuid, Auction>,
    bids: HashMap<Uuid, Bid>,
    users: HashMap<Uuid, User>,
    proofs: HashMap<Uuid, PaymentProof>,
    /// Commission audit entries keyed by the proof that produced them
    entries: HashMap<Uuid, CommissionEntry>,
}

/// In-memory ledger store
///
/// Backs the pipeline test suites and local development without a
/// database. All mutations run under one write lock, which gives the
/// same sequential-equivalent guarantee the SQL store gets from
/// single-statement atomic updates.
pub struct MemoryLedger {
    state: tokio::sync::RwLock<LedgerState>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self {
            state: tokio::sync::RwLock::new(LedgerState::default()),
        }
    }

    pub async fn insert_auction(&self, auction: Auction) {
        let mut state = self.state.write().await;
        state.auctions.insert(auction.id, auction);
    }

    pub async fn insert_bid(&self, bid: Bid) {
        let mut state = self.state.write().await;
        state.bids.insert(bid.id, bid);
    }

    pub async fn insert_user(&self, user: User) {
        let mut state = self.state.write().await;
        state.users.insert(user.id, user);
    }

    pub async fn insert_proof(&self, proof: PaymentProof) {
        let mut state = self.state.write().await;
        state.proofs.insert(proof.id, proof);
    }

    pub async fn get_proof(&self, proof_id: Uuid) -> Option<PaymentProof> {
        let state = self.state.read().await;
        state.proofs.get(&proof_id).cloned()
    }

    pub async fn commission_entries(&self) -> Vec<CommissionEntry> {
        let state = self.state.read().await;
        let mut entries: Vec<_> = state.entries.values().cloned().collect();
        entries.sort_by_key(|e| e.created_at);
        entries
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn find_ended_unsettled_auctions(&self, now: DateTime<Utc>) -> AppResult<Vec<Auction>> {
        let state = self.state.read().await;
        let mut ended: Vec<_> = state
            .auctions
            .values()
            .filter(|a| a.awaiting_settlement(now))
            .cloned()
            .collect();
        ended.sort_by_key(|a| a.end_time);
        Ok(ended)
    }

    async fn get_auction(&self, auction_id: Uuid) -> AppResult<Option<Auction>> {
        let state = self.state.read().await;
        Ok(state.auctions.get(&auction_id).cloned())
    }

    async fn find_winning_bid(
        &self,
        auction_id: Uuid,
        amount: Decimal,
    ) -> AppResult<Option<Bid>> {
        let state = self.state.read().await;
        let mut matches: Vec<_> = state
            .bids
            .values()
            .filter(|b| b.auction_item == auction_id && b.amount == amount)
            .collect();
        matches.sort_by_key(|b| b.created_at);
        Ok(matches.first().map(|b| (*b).clone()))
    }

    async fn mark_commission_calculated(&self, auction_id: Uuid) -> AppResult<()> {
        let mut state = self.state.write().await;
        let auction = state
            .auctions
            .get_mut(&auction_id)
            .ok_or_else(|| AppError::NotFound(format!("Auction {} not found", auction_id)))?;
        auction.commission_calculated = true;
        Ok(())
    }

    async fn record_highest_bidder(&self, auction_id: Uuid, bidder: Uuid) -> AppResult<()> {
        let mut state = self.state.write().await;
        let auction = state
            .auctions
            .get_mut(&auction_id)
            .ok_or_else(|| AppError::NotFound(format!("Auction {} not found", auction_id)))?;
        auction.highest_bidder = Some(bidder);
        Ok(())
    }

    async fn get_user(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.get(&user_id).cloned())
    }

    async fn add_unpaid_commission(&self, user_id: Uuid, amount: Decimal) -> AppResult<Decimal> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;
        user.unpaid_commission += amount;
        Ok(user.unpaid_commission)
    }

    async fn record_auction_win(&self, user_id: Uuid, amount: Decimal) -> AppResult<()> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;
        user.money_spent += amount;
        user.auctions_won += 1;
        Ok(())
    }

    async fn settle_unpaid_commission(
        &self,
        user_id: Uuid,
        amount: Decimal,
    ) -> AppResult<Decimal> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;
        user.unpaid_commission = (user.unpaid_commission - amount).max(Decimal::ZERO);
        Ok(user.unpaid_commission)
    }

    async fn find_approved_proofs(&self) -> AppResult<Vec<PaymentProof>> {
        let state = self.state.read().await;
        let mut approved: Vec<_> = state
            .proofs
            .values()
            .filter(|p| p.status == ProofStatus::Approved)
            .cloned()
            .collect();
        approved.sort_by_key(|p| p.uploaded_at);
        Ok(approved)
    }

    async fn mark_proof_settled(&self, proof_id: Uuid) -> AppResult<bool> {
        let mut state = self.state.write().await;
        match state.proofs.get_mut(&proof_id) {
            Some(proof) if proof.status == ProofStatus::Approved => {
                proof.status = ProofStatus::Settled;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn append_commission_entry(
        &self,
        proof_id: Uuid,
        user_id: Uuid,
        amount: Decimal,
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.entries.entry(proof_id).or_insert_with(|| CommissionEntry {
            id: Uuid::new_v4(),
            proof_id,
            user_id,
            amount,
            created_at: Utc::now(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn seller(unpaid: Decimal) -> User {
        User {
            id: Uuid::new_v4(),
            user_name: "ravi".to_string(),
            email: "ravi@example.com".to_string(),
            role: UserRole::Auctioneer,
            unpaid_commission: unpaid,
            auctions_won: 0,
            money_spent: Decimal::ZERO,
            payment_methods: PaymentMethods::default(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_concurrent_increments_sum_exactly() {
        let store = Arc::new(MemoryLedger::new());
        let user = seller(Decimal::ZERO);
        let user_id = user.id;
        store.insert_user(user).await;

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.add_unpaid_commission(user_id, dec!(10)).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let user = store.get_user(user_id).await.unwrap().unwrap();
        assert_eq!(user.unpaid_commission, dec!(160));
    }

    #[tokio::test]
    async fn test_settle_clamps_at_zero() {
        let store = MemoryLedger::new();
        let user = seller(dec!(300));
        let user_id = user.id;
        store.insert_user(user).await;

        let remaining = store.settle_unpaid_commission(user_id, dec!(500)).await.unwrap();
        assert_eq!(remaining, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_commission_entry_append_is_idempotent() {
        let store = MemoryLedger::new();
        let proof_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();

        store
            .append_commission_entry(proof_id, user_id, dec!(500))
            .await
            .unwrap();
        store
            .append_commission_entry(proof_id, user_id, dec!(500))
            .await
            .unwrap();

        assert_eq!(store.commission_entries().await.len(), 1);
    }

    #[tokio::test]
    async fn test_mark_proof_settled_is_guarded() {
        let store = MemoryLedger::new();
        let proof = PaymentProof {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            amount: dec!(200),
            status: ProofStatus::Approved,
            comment: None,
            uploaded_at: Utc::now(),
        };
        let proof_id = proof.id;
        store.insert_proof(proof).await;

        assert!(store.mark_proof_settled(proof_id).await.unwrap());
        // Terminal: a second transition must report no-op
        assert!(!store.mark_proof_settled(proof_id).await.unwrap());
    }
}
