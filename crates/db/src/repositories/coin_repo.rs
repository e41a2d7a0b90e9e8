//! Repository for the coin economy: the cached `user_coins` balance and the
//! `coin_transactions` ledger.
//!
//! Invariant: a user's balance equals the sum of their ledger entries. Every
//! balance mutation and its ledger entry are written in one transaction, and
//! the deduction itself is a single conditional decrement so concurrent
//! spends cannot both succeed when only one can afford it.

use sqlx::PgPool;

use lullaby_core::error::CoreError;
use lullaby_core::types::DbId;

use crate::models::coins::{CoinTransaction, CoinTransactionType, UserCoins};

/// Coins granted when a user's balance row is first created.
pub const SIGNUP_BONUS: i64 = 10;

/// Ledger description for the signup bonus entry.
const SIGNUP_BONUS_DESCRIPTION: &str = "Welcome bonus";

/// Maximum ledger entries returned by [`CoinRepo::recent_transactions`].
const RECENT_TRANSACTIONS_LIMIT: i64 = 50;

/// Outcome of a successful deduction.
#[derive(Debug, Clone, Copy)]
pub struct DeductOutcome {
    pub new_balance: i64,
}

/// Balance and ledger operations.
pub struct CoinRepo;

impl CoinRepo {
    /// The user's current balance, creating the row with the signup bonus on
    /// first touch.
    ///
    /// Creation uses `INSERT ... ON CONFLICT DO NOTHING`: if two requests
    /// race, the loser's insert affects zero rows and the subsequent read
    /// returns whatever the winner wrote. The bonus ledger entry is written
    /// only by the request whose insert actually created the row.
    pub async fn get_balance(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        if let Some(row) = Self::find(pool, user_id).await? {
            return Ok(row.balance);
        }

        let mut tx = pool.begin().await?;
        let inserted = sqlx::query(
            "INSERT INTO user_coins (user_id, balance) VALUES ($1, $2) \
             ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(SIGNUP_BONUS)
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() > 0 {
            sqlx::query(
                "INSERT INTO coin_transactions (user_id, amount, type, description) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(user_id)
            .bind(SIGNUP_BONUS)
            .bind(CoinTransactionType::SignupBonus.as_str())
            .bind(SIGNUP_BONUS_DESCRIPTION)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        let row = Self::find(pool, user_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        Ok(row.balance)
    }

    /// Atomically deduct `amount` coins and log exactly one ledger entry.
    ///
    /// The decrement is a single conditional `UPDATE ... WHERE balance >= $2`;
    /// when it matches no row the balance was insufficient (or the row does
    /// not exist yet) and [`CoreError::InsufficientCoins`] is returned with
    /// the current balance echoed back.
    pub async fn deduct(
        pool: &PgPool,
        user_id: DbId,
        amount: i64,
        tx_type: CoinTransactionType,
        reference_id: Option<DbId>,
        description: &str,
    ) -> Result<DeductOutcome, DeductError> {
        let mut tx = pool.begin().await?;

        let updated: Option<(i64,)> = sqlx::query_as(
            "UPDATE user_coins \
             SET balance = balance - $2, updated_at = NOW() \
             WHERE user_id = $1 AND balance >= $2 \
             RETURNING balance",
        )
        .bind(user_id)
        .bind(amount)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((new_balance,)) = updated else {
            tx.rollback().await?;
            let balance = Self::find(pool, user_id).await?.map(|r| r.balance).unwrap_or(0);
            return Err(DeductError::Insufficient(CoreError::InsufficientCoins {
                cost: amount,
                balance,
            }));
        };

        sqlx::query(
            "INSERT INTO coin_transactions (user_id, amount, type, reference_id, description) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user_id)
        .bind(-amount)
        .bind(tx_type.as_str())
        .bind(reference_id)
        .bind(description)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(DeductOutcome { new_balance })
    }

    /// Credit coins (admin top-up) and log the ledger entry.
    pub async fn credit(
        pool: &PgPool,
        user_id: DbId,
        amount: i64,
        tx_type: CoinTransactionType,
        description: &str,
    ) -> Result<i64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let (new_balance,): (i64,) = sqlx::query_as(
            "INSERT INTO user_coins (user_id, balance) VALUES ($1, $2) \
             ON CONFLICT (user_id) \
             DO UPDATE SET balance = user_coins.balance + $2, updated_at = NOW() \
             RETURNING balance",
        )
        .bind(user_id)
        .bind(amount)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO coin_transactions (user_id, amount, type, description) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(user_id)
        .bind(amount)
        .bind(tx_type.as_str())
        .bind(description)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(new_balance)
    }

    /// The user's most recent ledger entries, newest first.
    pub async fn recent_transactions(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<CoinTransaction>, sqlx::Error> {
        sqlx::query_as::<_, CoinTransaction>(
            "SELECT id, user_id, amount, type, reference_id, description, created_at \
             FROM coin_transactions WHERE user_id = $1 \
             ORDER BY created_at DESC \
             LIMIT $2",
        )
        .bind(user_id)
        .bind(RECENT_TRANSACTIONS_LIMIT)
        .fetch_all(pool)
        .await
    }

    async fn find(pool: &PgPool, user_id: DbId) -> Result<Option<UserCoins>, sqlx::Error> {
        sqlx::query_as::<_, UserCoins>(
            "SELECT user_id, balance, updated_at FROM user_coins WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }
}

/// Errors from [`CoinRepo::deduct`].
#[derive(Debug, thiserror::Error)]
pub enum DeductError {
    /// Balance below the requested amount; carries cost and balance.
    #[error(transparent)]
    Insufficient(CoreError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
