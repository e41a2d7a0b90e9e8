//! Chapter generation and media orchestration.
//!
//! The [`orchestrator::ChapterOrchestrator`] drives the three flows: story
//! creation (text now, media deferred), the idempotent generate-media phase,
//! and chapter continuation (media inline). Per-substep failures degrade to
//! partial results; only auth, ownership, malformed core text, and
//! insufficient balance abort a request.

pub mod consistency;
pub mod error;
pub mod media;
pub mod orchestrator;

pub use error::PipelineError;
pub use orchestrator::ChapterOrchestrator;
