// Commission policy
//
// The seller owes a flat percentage of the auction's final price. The
// policy is a pure function of the price; the calculator only adds the
// auction lookup in front of it.

use crate::error::{AppResult, CommissionError};
use crate::ledger::store::LedgerStore;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use uuid::Uuid;

const COMMISSION_RATE: Decimal = dec!(0.05);

/// Commission owed on a final price, rounded to the paisa. Never
/// negative.
pub fn commission_on(final_price: Decimal) -> Decimal {
    (final_price * COMMISSION_RATE)
        .round_dp(2)
        .max(Decimal::ZERO)
}

pub struct CommissionCalculator {
    store: Arc<dyn LedgerStore>,
}

impl CommissionCalculator {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Commission owed by the seller of `auction_id`, derived from the
    /// auction's recorded closing price. Idempotent, no side effects.
    /// Settlement must not proceed when this fails.
    pub async fn commission_for_auction(&self, auction_id: Uuid) -> AppResult<Decimal> {
        let auction = self
            .store
            .get_auction(auction_id)
            .await?
            .ok_or(CommissionError::AuctionNotFound(auction_id))?;

        Ok(commission_on(auction.current_bid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commission_is_five_percent() {
        assert_eq!(commission_on(dec!(1000)), dec!(50.00));
        assert_eq!(commission_on(dec!(120)), dec!(6.00));
    }

    #[test]
    fn test_commission_rounds_to_two_places() {
        // 5% of 333.33 is 16.6665
        assert_eq!(commission_on(dec!(333.33)), dec!(16.67));
    }

    #[test]
    fn test_commission_never_negative() {
        assert_eq!(commission_on(dec!(0)), Decimal::ZERO);
        assert_eq!(commission_on(dec!(-10)), Decimal::ZERO);
    }
}
