// Auction settlement pipeline
//
// Per-auction sequence once the end time has passed:
// 1. Compute commission and persist the processed flag
// 2. Resolve the winning bid (none found is a defined terminal state)
// 3. Resolve winner and seller
// 4. Accrue commission to the seller and notify them
// 5. Persist the winner on the auction, credit the winner's counters,
//    notify the winner
//
// The flag write comes before any balance mutation so a crash or skip
// later in the sequence can never cause a second accrual for the same
// auction on the next sweep.

use crate::commission::CommissionCalculator;
use crate::error::AppResult;
use crate::ledger::models::Auction;
use crate::ledger::store::LedgerStore;
use crate::notification::email::NotificationSink;
use crate::notification::templates;
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct AuctionSettler {
    store: Arc<dyn LedgerStore>,
    commission: CommissionCalculator,
    mailer: Arc<dyn NotificationSink>,
    support_email: String,
}

impl AuctionSettler {
    pub fn new(
        store: Arc<dyn LedgerStore>,
        commission: CommissionCalculator,
        mailer: Arc<dyn NotificationSink>,
        support_email: String,
    ) -> Self {
        Self {
            store,
            commission,
            mailer,
            support_email,
        }
    }

    /// One settlement sweep over every ended, unprocessed auction.
    ///
    /// Failures are isolated per auction: an error settling one is
    /// logged and the loop continues with the next.
    pub async fn settle_ended_auctions(&self) -> AppResult<()> {
        let now = Utc::now();
        let ended = self.store.find_ended_unsettled_auctions(now).await?;

        if ended.is_empty() {
            return Ok(());
        }

        info!("📊 Found {} ended auctions awaiting settlement", ended.len());

        for auction in &ended {
            if let Err(e) = self.settle_auction(auction).await {
                error!(
                    "❌ Error settling auction {} ({}): {}",
                    auction.id, auction.title, e
                );
            }
        }

        Ok(())
    }

    async fn settle_auction(&self, auction: &Auction) -> AppResult<()> {
        info!("Processing auction: {}", auction.title);

        let commission = self.commission.commission_for_auction(auction.id).await?;

        // Flag first: whatever happens below, this auction is done and
        // the next sweep must not pick it up again.
        self.store.mark_commission_calculated(auction.id).await?;

        let Some(winning_bid) = self
            .store
            .find_winning_bid(auction.id, auction.current_bid)
            .await?
        else {
            warn!("❌ No highest bidder found for auction: {}", auction.title);
            return Ok(());
        };

        let Some(winner) = self.store.get_user(winning_bid.bidder).await? else {
            warn!("❌ Winner user not found for ID: {}", winning_bid.bidder);
            return Ok(());
        };

        let Some(seller) = self.store.get_user(auction.created_by).await? else {
            warn!("❌ Auctioneer not found for auction: {}", auction.title);
            return Ok(());
        };

        let outstanding = self
            .store
            .add_unpaid_commission(seller.id, commission)
            .await?;
        info!(
            "✓ Commission of ₹{} accrued to {} (outstanding: ₹{})",
            commission, seller.user_name, outstanding
        );

        let notice = templates::commission_due(&seller, auction, commission, &self.support_email);
        if let Err(e) = self.mailer.send(&notice).await {
            warn!(
                "⚠️ Failed to send unpaid commission notice to {}: {}",
                seller.email, e
            );
        }

        self.store
            .record_highest_bidder(auction.id, winner.id)
            .await?;

        self.store
            .record_auction_win(winner.id, winning_bid.amount)
            .await?;

        let congrats = templates::auction_won(&winner, &seller, auction);
        if let Err(e) = self.mailer.send(&congrats).await {
            warn!(
                "⚠️ Failed to send winner notice to {}: {}",
                winner.email, e
            );
        }

        info!(
            "✓ Auction settled: {} won by {}",
            auction.title, winner.user_name
        );
        Ok(())
    }
}
