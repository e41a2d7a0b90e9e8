//! Handler for the coin balance endpoint.
//!
//! Routes:
//! - `GET /coins` -- current balance plus recent ledger entries

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use lullaby_db::models::coins::CoinTransaction;
use lullaby_db::repositories::CoinRepo;

use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::state::AppState;

/// Payload for `GET /coins`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinsResponse {
    pub balance: i64,
    pub transactions: Vec<CoinTransaction>,
}

/// GET /api/v1/coins
///
/// The first call for a new user creates their balance row with the signup
/// bonus, so the client never observes a missing balance.
pub async fn get_coins(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let balance = CoinRepo::get_balance(&state.pool, user.user_id).await?;
    let transactions = CoinRepo::recent_transactions(&state.pool, user.user_id).await?;

    Ok(Json(CoinsResponse {
        balance,
        transactions,
    }))
}
