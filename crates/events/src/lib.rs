//! In-process event bus for story lifecycle events.

mod bus;

pub use bus::{EventBus, StoryEvent};

use tokio::sync::broadcast;

/// Run a subscriber that logs every event with structured fields.
///
/// Spawned at startup; exits when the bus sender is dropped.
pub async fn run_event_logger(mut receiver: broadcast::Receiver<StoryEvent>) {
    loop {
        match receiver.recv().await {
            Ok(event) => {
                tracing::info!(
                    event_type = %event.event_type,
                    story_id = event.story_id,
                    user_id = event.user_id,
                    payload = %event.payload,
                    "story event"
                );
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "event logger lagged; events dropped");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
