use super::models::*;
use super::store::LedgerStore;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::{BigDecimal, Json};
use sqlx::{FromRow, PgPool};
use std::str::FromStr;
use uuid::Uuid;

/// Ledger repository - THE source of truth for all state
pub struct LedgerRepository {
    pub pool: PgPool,
}

impl LedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Monetary columns are NUMERIC, crossing the boundary as BigDecimal.
fn to_decimal(value: &BigDecimal) -> AppResult<Decimal> {
    Decimal::from_str(&value.to_string()).map_err(AppError::from)
}

fn to_bigdecimal(value: Decimal) -> BigDecimal {
    // A Decimal's string form is always a valid BigDecimal
    BigDecimal::from_str(&value.to_string()).unwrap()
}

#[derive(FromRow)]
struct AuctionRow {
    id: Uuid,
    title: String,
    end_time: DateTime<Utc>,
    current_bid: BigDecimal,
    commission_calculated: bool,
    highest_bidder: Option<Uuid>,
    created_by: Uuid,
    created_at: DateTime<Utc>,
}

impl TryFrom<AuctionRow> for Auction {
    type Error = AppError;

    fn try_from(row: AuctionRow) -> AppResult<Auction> {
        Ok(Auction {
            id: row.id,
            title: row.title,
            end_time: row.end_time,
            current_bid: to_decimal(&row.current_bid)?,
            commission_calculated: row.commission_calculated,
            highest_bidder: row.highest_bidder,
            created_by: row.created_by,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct BidRow {
    id: Uuid,
    auction_item: Uuid,
    bidder: Uuid,
    amount: BigDecimal,
    created_at: DateTime<Utc>,
}

impl TryFrom<BidRow> for Bid {
    type Error = AppError;

    fn try_from(row: BidRow) -> AppResult<Bid> {
        Ok(Bid {
            id: row.id,
            auction_item: row.auction_item,
            bidder: row.bidder,
            amount: to_decimal(&row.amount)?,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    user_name: String,
    email: String,
    role: UserRole,
    unpaid_commission: BigDecimal,
    auctions_won: i32,
    money_spent: BigDecimal,
    payment_methods: Json<PaymentMethods>,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> AppResult<User> {
        Ok(User {
            id: row.id,
            user_name: row.user_name,
            email: row.email,
            role: row.role,
            unpaid_commission: to_decimal(&row.unpaid_commission)?,
            auctions_won: row.auctions_won,
            money_spent: to_decimal(&row.money_spent)?,
            payment_methods: row.payment_methods.0,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct PaymentProofRow {
    id: Uuid,
    user_id: Uuid,
    amount: BigDecimal,
    status: ProofStatus,
    comment: Option<String>,
    uploaded_at: DateTime<Utc>,
}

impl TryFrom<PaymentProofRow> for PaymentProof {
    type Error = AppError;

    fn try_from(row: PaymentProofRow) -> AppResult<PaymentProof> {
        Ok(PaymentProof {
            id: row.id,
            user_id: row.user_id,
            amount: to_decimal(&row.amount)?,
            status: row.status,
            comment: row.comment,
            uploaded_at: row.uploaded_at,
        })
    }
}

#[async_trait]
impl LedgerStore for LedgerRepository {
    // ========== AUCTION / BID OPERATIONS ==========

    async fn find_ended_unsettled_auctions(&self, now: DateTime<Utc>) -> AppResult<Vec<Auction>> {
        let rows = sqlx::query_as::<_, AuctionRow>(
            r#"
            SELECT id, title, end_time, current_bid, commission_calculated,
                   highest_bidder, created_by, created_at
            FROM auctions
            WHERE end_time < $1 AND commission_calculated = FALSE
            ORDER BY end_time ASC
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Auction::try_from).collect()
    }

    async fn get_auction(&self, auction_id: Uuid) -> AppResult<Option<Auction>> {
        let row = sqlx::query_as::<_, AuctionRow>(
            r#"
            SELECT id, title, end_time, current_bid, commission_calculated,
                   highest_bidder, created_by, created_at
            FROM auctions
            WHERE id = $1
            "#,
        )
        .bind(auction_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Auction::try_from).transpose()
    }

    async fn find_winning_bid(
        &self,
        auction_id: Uuid,
        amount: Decimal,
    ) -> AppResult<Option<Bid>> {
        // Earliest bid wins if the store holds more than one match
        let row = sqlx::query_as::<_, BidRow>(
            r#"
            SELECT id, auction_item, bidder, amount, created_at
            FROM bids
            WHERE auction_item = $1 AND amount = $2
            ORDER BY created_at ASC
            LIMIT 1
            "#,
        )
        .bind(auction_id)
        .bind(to_bigdecimal(amount))
        .fetch_optional(&self.pool)
        .await?;

        row.map(Bid::try_from).transpose()
    }

    async fn mark_commission_calculated(&self, auction_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE auctions
            SET commission_calculated = TRUE
            WHERE id = $1
            "#,
        )
        .bind(auction_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Auction {} not found", auction_id)));
        }

        Ok(())
    }

    async fn record_highest_bidder(&self, auction_id: Uuid, bidder: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE auctions
            SET highest_bidder = $2
            WHERE id = $1
            "#,
        )
        .bind(auction_id)
        .bind(bidder)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Auction {} not found", auction_id)));
        }

        Ok(())
    }

    // ========== USER / BALANCE OPERATIONS ==========

    async fn get_user(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, user_name, email, role, unpaid_commission,
                   auctions_won, money_spent, payment_methods, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn add_unpaid_commission(&self, user_id: Uuid, amount: Decimal) -> AppResult<Decimal> {
        let balance = sqlx::query_scalar::<_, BigDecimal>(
            r#"
            UPDATE users
            SET unpaid_commission = unpaid_commission + $2
            WHERE id = $1
            RETURNING unpaid_commission
            "#,
        )
        .bind(user_id)
        .bind(to_bigdecimal(amount))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        to_decimal(&balance)
    }

    async fn record_auction_win(&self, user_id: Uuid, amount: Decimal) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET money_spent = money_spent + $2,
                auctions_won = auctions_won + 1
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(to_bigdecimal(amount))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} not found", user_id)));
        }

        Ok(())
    }

    async fn settle_unpaid_commission(
        &self,
        user_id: Uuid,
        amount: Decimal,
    ) -> AppResult<Decimal> {
        // Clamp at zero in the store so an oversized proof can never push
        // the balance negative
        let balance = sqlx::query_scalar::<_, BigDecimal>(
            r#"
            UPDATE users
            SET unpaid_commission = GREATEST(unpaid_commission - $2, 0)
            WHERE id = $1
            RETURNING unpaid_commission
            "#,
        )
        .bind(user_id)
        .bind(to_bigdecimal(amount))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        to_decimal(&balance)
    }

    // ========== PAYMENT PROOF / COMMISSION LEDGER ==========

    async fn find_approved_proofs(&self) -> AppResult<Vec<PaymentProof>> {
        let rows = sqlx::query_as::<_, PaymentProofRow>(
            r#"
            SELECT id, user_id, amount, status, comment, uploaded_at
            FROM payment_proofs
            WHERE status = $1
            ORDER BY uploaded_at ASC
            "#,
        )
        .bind(ProofStatus::Approved)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PaymentProof::try_from).collect()
    }

    async fn mark_proof_settled(&self, proof_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE payment_proofs
            SET status = $2
            WHERE id = $1 AND status = $3
            "#,
        )
        .bind(proof_id)
        .bind(ProofStatus::Settled)
        .bind(ProofStatus::Approved)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn append_commission_entry(
        &self,
        proof_id: Uuid,
        user_id: Uuid,
        amount: Decimal,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO commission_entries (proof_id, user_id, amount)
            VALUES ($1, $2, $3)
            ON CONFLICT (proof_id) DO NOTHING
            "#,
        )
        .bind(proof_id)
        .bind(user_id)
        .bind(to_bigdecimal(amount))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
