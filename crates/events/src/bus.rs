//! Broadcast-channel event bus shared via `Arc<EventBus>`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use lullaby_core::types::DbId;

/// Buffered events per subscriber before lag kicks in.
const CHANNEL_CAPACITY: usize = 256;

/// A story lifecycle event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryEvent {
    /// Dot-separated event name, e.g. `"story.created"`.
    pub event_type: String,
    pub story_id: DbId,
    pub user_id: DbId,
    /// Event-specific data (chapter index, coins charged, ...).
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl StoryEvent {
    fn new(event_type: &str, story_id: DbId, user_id: DbId, payload: serde_json::Value) -> Self {
        Self {
            event_type: event_type.to_string(),
            story_id,
            user_id,
            payload,
            timestamp: Utc::now(),
        }
    }

    /// A story and its first chapter were created.
    pub fn story_created(story_id: DbId, user_id: DbId, coins_charged: i64) -> Self {
        Self::new(
            "story.created",
            story_id,
            user_id,
            serde_json::json!({ "coinsCharged": coins_charged }),
        )
    }

    /// A continuation chapter finished generating.
    pub fn chapter_added(
        story_id: DbId,
        user_id: DbId,
        chapter_index: i32,
        coins_charged: i64,
    ) -> Self {
        Self::new(
            "story.chapter_added",
            story_id,
            user_id,
            serde_json::json!({ "chapterIndex": chapter_index, "coinsCharged": coins_charged }),
        )
    }

    /// The deferred media phase finished and the story is done.
    pub fn media_completed(
        story_id: DbId,
        user_id: DbId,
        voice_generated: usize,
        voice_total: usize,
        images_generated: usize,
    ) -> Self {
        Self::new(
            "story.media_completed",
            story_id,
            user_id,
            serde_json::json!({
                "voiceGenerated": voice_generated,
                "voiceTotal": voice_total,
                "imagesGenerated": images_generated,
            }),
        )
    }

    /// A story was deleted by its owner.
    pub fn story_deleted(story_id: DbId, user_id: DbId) -> Self {
        Self::new("story.deleted", story_id, user_id, serde_json::json!({}))
    }
}

/// Central publish/subscribe hub for [`StoryEvent`]s.
pub struct EventBus {
    sender: broadcast::Sender<StoryEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }
}

impl EventBus {
    /// Publish an event to all current subscribers. Events published with no
    /// subscribers are dropped silently.
    pub fn publish(&self, event: StoryEvent) {
        let _ = self.sender.send(event);
    }

    /// Create a new subscription receiving all events published after this
    /// call.
    pub fn subscribe(&self) -> broadcast::Receiver<StoryEvent> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_published_event() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(StoryEvent::story_created(7, 42, 3));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type, "story.created");
        assert_eq!(event.story_id, 7);
        assert_eq!(event.user_id, 42);
        assert_eq!(event.payload["coinsCharged"], 3);
    }

    #[tokio::test]
    async fn publish_without_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(StoryEvent::story_deleted(1, 1));
    }

    #[test]
    fn media_completed_carries_counts() {
        let event = StoryEvent::media_completed(1, 2, 4, 5, 2);
        assert_eq!(event.payload["voiceGenerated"], 4);
        assert_eq!(event.payload["voiceTotal"], 5);
        assert_eq!(event.payload["imagesGenerated"], 2);
    }
}
