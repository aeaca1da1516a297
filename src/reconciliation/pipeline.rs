// Commission reconciliation pipeline
//
// Applies approved payment proofs against sellers' outstanding
// commission balances. Per-proof sequence: resolve the seller, apply
// the clamped decrement, transition the proof to its terminal state,
// append the audit entry, confirm by email. The audit entry is keyed by
// proof id so a retried partial run cannot append twice.

use crate::error::AppResult;
use crate::ledger::models::PaymentProof;
use crate::ledger::store::LedgerStore;
use crate::notification::email::NotificationSink;
use crate::notification::templates;
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct CommissionReconciler {
    store: Arc<dyn LedgerStore>,
    mailer: Arc<dyn NotificationSink>,
}

impl CommissionReconciler {
    pub fn new(store: Arc<dyn LedgerStore>, mailer: Arc<dyn NotificationSink>) -> Self {
        Self { store, mailer }
    }

    /// One reconciliation sweep over every approved payment proof.
    ///
    /// Failures are isolated per proof: an error settling one is logged
    /// and the loop continues with the next.
    pub async fn reconcile_approved_proofs(&self) -> AppResult<()> {
        let proofs = self.store.find_approved_proofs().await?;

        if proofs.is_empty() {
            return Ok(());
        }

        info!("📊 Found {} approved payment proofs", proofs.len());

        for proof in &proofs {
            if let Err(e) = self.settle_proof(proof).await {
                error!(
                    "❌ Error processing commission proof {} for user {}: {}",
                    proof.id, proof.user_id, e
                );
            }
        }

        Ok(())
    }

    async fn settle_proof(&self, proof: &PaymentProof) -> AppResult<()> {
        let Some(seller) = self.store.get_user(proof.user_id).await? else {
            // Left Approved on purpose for manual follow-up
            warn!(
                "❌ Payment proof {} references unknown user {}",
                proof.id, proof.user_id
            );
            return Ok(());
        };

        // Settles min(proof amount, outstanding); the store clamps the
        // balance at zero
        let remaining = self
            .store
            .settle_unpaid_commission(seller.id, proof.amount)
            .await?;

        if !self.store.mark_proof_settled(proof.id).await? {
            warn!(
                "⚠️ Proof {} was no longer approved, skipping the rest",
                proof.id
            );
            return Ok(());
        }

        // The audit trail records the full claimed amount, not the
        // clamped settlement
        self.store
            .append_commission_entry(proof.id, seller.id, proof.amount)
            .await?;

        let confirmation = templates::payment_settled(&seller, proof.amount, remaining, Utc::now());
        if let Err(e) = self.mailer.send(&confirmation).await {
            warn!(
                "⚠️ Failed to send settlement confirmation to {}: {}",
                seller.email, e
            );
        }

        info!(
            "✓ User {} paid ₹{} (remaining unpaid: ₹{})",
            seller.id, proof.amount, remaining
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotificationError;
    use crate::ledger::memory::MemoryLedger;
    use crate::ledger::models::*;
    use crate::notification::email::EmailMessage;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    #[derive(Default)]
    struct RecordingMailer {
        sent: std::sync::Mutex<Vec<EmailMessage>>,
        fail: bool,
    }

    impl RecordingMailer {
        fn failing() -> Self {
            Self {
                sent: std::sync::Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn sent(&self) -> Vec<EmailMessage> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NotificationSink for RecordingMailer {
        async fn send(&self, message: &EmailMessage) -> AppResult<()> {
            if self.fail {
                return Err(NotificationError::Transport("provider down".into()).into());
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

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

    fn approved_proof(user_id: Uuid, amount: Decimal) -> PaymentProof {
        PaymentProof {
            id: Uuid::new_v4(),
            user_id,
            amount,
            status: ProofStatus::Approved,
            comment: None,
            uploaded_at: Utc::now(),
        }
    }

    fn reconciler(
        store: Arc<MemoryLedger>,
        mailer: Arc<RecordingMailer>,
    ) -> CommissionReconciler {
        CommissionReconciler::new(store, mailer)
    }

    #[tokio::test]
    async fn test_overpaying_proof_clamps_balance_to_zero() {
        let store = Arc::new(MemoryLedger::new());
        let mailer = Arc::new(RecordingMailer::default());

        let seller = seller(dec!(300));
        let proof = approved_proof(seller.id, dec!(500));
        store.insert_user(seller.clone()).await;
        store.insert_proof(proof.clone()).await;

        reconciler(store.clone(), mailer.clone())
            .reconcile_approved_proofs()
            .await
            .unwrap();

        let seller = store.get_user(seller.id).await.unwrap().unwrap();
        assert_eq!(seller.unpaid_commission, Decimal::ZERO);

        let proof = store.get_proof(proof.id).await.unwrap();
        assert_eq!(proof.status, ProofStatus::Settled);

        // Audit trail keeps the full claimed amount
        let entries = store.commission_entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].amount, dec!(500));
    }

    #[tokio::test]
    async fn test_partial_proof_leaves_remainder_outstanding() {
        let store = Arc::new(MemoryLedger::new());
        let mailer = Arc::new(RecordingMailer::default());

        let seller = seller(dec!(500));
        let proof = approved_proof(seller.id, dec!(200));
        store.insert_user(seller.clone()).await;
        store.insert_proof(proof.clone()).await;

        reconciler(store.clone(), mailer.clone())
            .reconcile_approved_proofs()
            .await
            .unwrap();

        let seller = store.get_user(seller.id).await.unwrap().unwrap();
        assert_eq!(seller.unpaid_commission, dec!(300));

        let proof = store.get_proof(proof.id).await.unwrap();
        assert_eq!(proof.status, ProofStatus::Settled);

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient, "ravi@example.com");
    }

    #[tokio::test]
    async fn test_settled_proof_is_never_reprocessed() {
        let store = Arc::new(MemoryLedger::new());
        let mailer = Arc::new(RecordingMailer::default());

        let seller = seller(dec!(500));
        let proof = approved_proof(seller.id, dec!(200));
        store.insert_user(seller.clone()).await;
        store.insert_proof(proof.clone()).await;

        let reconciler = reconciler(store.clone(), mailer.clone());
        reconciler.reconcile_approved_proofs().await.unwrap();
        reconciler.reconcile_approved_proofs().await.unwrap();

        // No double decrement, no second audit entry, no second email
        let seller = store.get_user(seller.id).await.unwrap().unwrap();
        assert_eq!(seller.unpaid_commission, dec!(300));
        assert_eq!(store.commission_entries().await.len(), 1);
        assert_eq!(mailer.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_user_leaves_proof_approved() {
        let store = Arc::new(MemoryLedger::new());
        let mailer = Arc::new(RecordingMailer::default());

        let proof = approved_proof(Uuid::new_v4(), dec!(200));
        store.insert_proof(proof.clone()).await;

        reconciler(store.clone(), mailer.clone())
            .reconcile_approved_proofs()
            .await
            .unwrap();

        let proof = store.get_proof(proof.id).await.unwrap();
        assert_eq!(proof.status, ProofStatus::Approved);
        assert!(store.commission_entries().await.is_empty());
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_skipped_proof_does_not_block_the_batch() {
        let store = Arc::new(MemoryLedger::new());
        let mailer = Arc::new(RecordingMailer::default());

        let seller = seller(dec!(500));
        store.insert_user(seller.clone()).await;

        // Orphaned proof uploads first, valid proof second
        let mut orphan = approved_proof(Uuid::new_v4(), dec!(100));
        orphan.uploaded_at = Utc::now() - chrono::Duration::hours(1);
        let valid = approved_proof(seller.id, dec!(200));
        store.insert_proof(orphan.clone()).await;
        store.insert_proof(valid.clone()).await;

        reconciler(store.clone(), mailer.clone())
            .reconcile_approved_proofs()
            .await
            .unwrap();

        let valid = store.get_proof(valid.id).await.unwrap();
        assert_eq!(valid.status, ProofStatus::Settled);
        let orphan = store.get_proof(orphan.id).await.unwrap();
        assert_eq!(orphan.status, ProofStatus::Approved);
    }

    #[tokio::test]
    async fn test_notification_failure_keeps_settlement_applied() {
        let store = Arc::new(MemoryLedger::new());
        let mailer = Arc::new(RecordingMailer::failing());

        let seller = seller(dec!(500));
        let proof = approved_proof(seller.id, dec!(200));
        store.insert_user(seller.clone()).await;
        store.insert_proof(proof.clone()).await;

        reconciler(store.clone(), mailer.clone())
            .reconcile_approved_proofs()
            .await
            .unwrap();

        let seller = store.get_user(seller.id).await.unwrap().unwrap();
        assert_eq!(seller.unpaid_commission, dec!(300));

        let proof = store.get_proof(proof.id).await.unwrap();
        assert_eq!(proof.status, ProofStatus::Settled);
        assert_eq!(store.commission_entries().await.len(), 1);
    }
}
