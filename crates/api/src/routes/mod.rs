//! Route tree construction.

pub mod coins;
pub mod health;
pub mod stories;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /stories                          create, list
/// /stories/{id}                     get, delete
/// /stories/{id}/continue            append chapter
/// /stories/{id}/generate-media      deferred media phase
///
/// /coins                            balance + recent ledger entries
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/stories", stories::router())
        .nest("/coins", coins::router())
}
