use std::sync::Arc;

use lullaby_events::EventBus;
use lullaby_pipeline::ChapterOrchestrator;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already
/// `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: lullaby_db::DbPool,
    /// Server configuration (JWT secret, CORS, timeouts).
    pub config: Arc<ServerConfig>,
    /// The chapter generation orchestrator.
    pub orchestrator: Arc<ChapterOrchestrator>,
    /// Centralized event bus for story lifecycle events.
    pub event_bus: Arc<EventBus>,
}
