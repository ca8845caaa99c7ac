//! Contracts for the external collaborators the core consumes: the hosted
//! data store, the live-event transport, and the auth/session provider.
//! Implementations live elsewhere (`banter-memory` ships an in-process one).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use banter_types::{ChangeEvent, MessageRow, NewMessage, Reaction, Room};

/// Query and mutation surface of the hosted data store.
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Messages in `room` created at or after `since`, ascending by
    /// creation time.
    async fn messages_since(
        &self,
        room: Room,
        since: DateTime<Utc>,
    ) -> anyhow::Result<Vec<MessageRow>>;

    /// Reaction rows targeting any of `message_ids`.
    async fn reactions_for(&self, message_ids: &[Uuid]) -> anyhow::Result<Vec<Reaction>>;

    /// Insert a message. The stored row (server-assigned id and timestamp)
    /// comes back through the live channel, not the return value.
    async fn insert_message(&self, message: NewMessage) -> anyhow::Result<()>;

    async fn delete_message(&self, id: Uuid) -> anyhow::Result<()>;

    /// Insert a reaction row. The backend enforces at most one row per
    /// (message, author, emoji) triple, so racing toggles cannot duplicate.
    async fn insert_reaction(
        &self,
        message_id: Uuid,
        author_id: Uuid,
        emoji: &str,
    ) -> anyhow::Result<()>;

    async fn delete_reaction(&self, id: Uuid) -> anyhow::Result<()>;

    /// Display pseudonym for an author id.
    async fn pseudonym_for(&self, author_id: Uuid) -> anyhow::Result<String>;

    /// Moderation entrypoint. Returns an opaque acknowledgement token.
    async fn report_message(&self, id: Uuid, reason: Option<&str>) -> anyhow::Result<String>;
}

/// An open live-event channel scoped to one room.
#[async_trait]
pub trait LiveFeed: Send {
    /// Next change notification, or `None` once the channel is closed by
    /// the remote end.
    async fn next_event(&mut self) -> Option<ChangeEvent>;

    /// Close the channel. Callers must await this before opening a channel
    /// for a different room — at most one channel is live per client.
    async fn close(self: Box<Self>);
}

/// Factory for live-event channels.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn subscribe(&self, room: Room) -> anyhow::Result<Box<dyn LiveFeed>>;
}

/// Current-user identity from the auth provider. Absence means
/// unauthenticated, and mutating operations are rejected.
pub trait SessionProvider: Send + Sync {
    fn current_user(&self) -> Option<Uuid>;
}
