//! Coin economy models.

use serde::Serialize;
use sqlx::FromRow;

use lullaby_core::types::{DbId, Timestamp};

/// A row from the `user_coins` table: the cached balance projection.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserCoins {
    pub user_id: DbId,
    pub balance: i64,
    pub updated_at: Timestamp,
}

/// A row from the `coin_transactions` ledger.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinTransaction {
    pub id: DbId,
    pub user_id: DbId,
    /// Signed: negative for spend, positive for credit.
    pub amount: i64,
    pub r#type: String,
    pub reference_id: Option<DbId>,
    pub description: String,
    pub created_at: Timestamp,
}

/// Ledger entry type tags. The column is constrained to these values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoinTransactionType {
    StoryCreate,
    ChapterContinue,
    AdminTopup,
    SignupBonus,
}

impl CoinTransactionType {
    pub fn as_str(self) -> &'static str {
        match self {
            CoinTransactionType::StoryCreate => "story_create",
            CoinTransactionType::ChapterContinue => "chapter_continue",
            CoinTransactionType::AdminTopup => "admin_topup",
            CoinTransactionType::SignupBonus => "signup_bonus",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_type_strings_match_schema_constraint() {
        assert_eq!(CoinTransactionType::StoryCreate.as_str(), "story_create");
        assert_eq!(
            CoinTransactionType::ChapterContinue.as_str(),
            "chapter_continue"
        );
        assert_eq!(CoinTransactionType::AdminTopup.as_str(), "admin_topup");
        assert_eq!(CoinTransactionType::SignupBonus.as_str(), "signup_bonus");
    }
}
