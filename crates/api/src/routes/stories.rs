//! Route definitions for stories.
//!
//! ```text
//! POST   /                      create_story
//! GET    /                      list_stories
//! GET    /{id}                  get_story
//! DELETE /{id}                  delete_story
//! POST   /{id}/continue         continue_story
//! POST   /{id}/generate-media   generate_media
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::stories;
use crate::state::AppState;

/// Routes mounted under the `/stories` nest.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(stories::create_story).get(stories::list_stories))
        .route(
            "/{id}",
            get(stories::get_story).delete(stories::delete_story),
        )
        .route("/{id}/continue", post(stories::continue_story))
        .route("/{id}/generate-media", post(stories::generate_media))
}
