//! Route definitions for the coin economy.
//!
//! ```text
//! GET /    get_coins
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::coins;
use crate::state::AppState;

/// Routes mounted under the `/coins` nest.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(coins::get_coins))
}
