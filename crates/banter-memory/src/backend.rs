//! The in-memory backend: `Vec`-backed tables behind one lock, with a
//! broadcast channel standing in for the hosted live-event stream. Fanout
//! mirrors the hosted service: every mutation is committed first, then
//! published to all subscribed rooms' feeds.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::seq::IndexedRandom;
use serde_json::json;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use banter_emoji::EmoteSource;
use banter_sync::{ChatStore, EventSource, LiveFeed};
use banter_types::{ChangeEvent, ChangeKind, CustomEmote, MessageRow, NewMessage, Reaction, Room};

/// Events buffered per subscriber before the channel starts lagging.
pub const BROADCAST_CAPACITY: usize = 256;

const PSEUDONYM_ADJECTIVES: &[&str] = &[
    "sleepy", "feral", "cheeky", "mellow", "rowdy", "dusty", "salty", "sunny",
    "grumpy", "wily", "soggy", "breezy",
];

const PSEUDONYM_ANIMALS: &[&str] = &[
    "quokka", "wombat", "galah", "bilby", "dingo", "magpie", "numbat", "echidna",
    "cassowary", "kookaburra", "platypus", "bandicoot",
];

/// A moderation report accepted by [`ChatStore::report_message`].
#[derive(Debug, Clone)]
pub struct Report {
    pub message_id: Uuid,
    pub reason: Option<String>,
    pub received_at: DateTime<Utc>,
}

/// In-process store, event source, and emote source in one handle.
#[derive(Clone)]
pub struct MemoryBackend {
    inner: Arc<BackendInner>,
}

struct BackendInner {
    tables: Mutex<Tables>,
    live: broadcast::Sender<(Room, ChangeEvent)>,
    /// When set, read queries fail. Lets tests exercise degraded fetches.
    fail_reads: AtomicBool,
}

#[derive(Default)]
struct Tables {
    messages: Vec<MessageRow>,
    reactions: Vec<Reaction>,
    pseudonyms: HashMap<Uuid, String>,
    emotes: Vec<CustomEmote>,
    reports: Vec<Report>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BackendInner {
                tables: Mutex::new(Tables::default()),
                live: broadcast::channel(BROADCAST_CAPACITY).0,
                fail_reads: AtomicBool::new(false),
            }),
        }
    }

    /// Insert a row directly, without a live notification. For pre-seeding
    /// history that predates any subscription.
    pub fn seed_message(
        &self,
        room: Room,
        author_id: Uuid,
        content: &str,
        created_at: DateTime<Utc>,
    ) -> MessageRow {
        let row = MessageRow {
            id: Uuid::new_v4(),
            room,
            author_id,
            content: Some(content.to_string()),
            image_url: None,
            reply_to_id: None,
            created_at,
        };
        self.inner.lock().messages.push(row.clone());
        row
    }

    /// Publish an arbitrary event on a room's feed, bypassing the tables.
    /// For exercising consumers against malformed or unexpected payloads.
    pub fn broadcast_raw(&self, room: Room, event: ChangeEvent) {
        self.inner.publish(room, event);
    }

    /// Make subsequent read queries fail until called with `false`.
    pub fn set_fail_reads(&self, fail: bool) {
        self.inner.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_emotes(&self, emotes: Vec<CustomEmote>) {
        self.inner.lock().emotes = emotes;
    }

    pub fn reports(&self) -> Vec<Report> {
        self.inner.lock().reports.clone()
    }

    pub fn message_count(&self) -> usize {
        self.inner.lock().messages.len()
    }

    pub fn reaction_count(&self) -> usize {
        self.inner.lock().reactions.len()
    }

    /// The server-side expiry job: drop messages older than `ttl` along with
    /// their reactions, publishing a delete for each dropped message.
    /// Returns the number of messages dropped.
    pub fn sweep_expired(&self, ttl: std::time::Duration) -> usize {
        let cutoff = Utc::now() - ttl;
        let expired: Vec<MessageRow> = {
            let mut tables = self.inner.lock();
            let (expired, kept): (Vec<MessageRow>, Vec<MessageRow>) =
                std::mem::take(&mut tables.messages)
                    .into_iter()
                    .partition(|m| m.created_at <= cutoff);
            tables.messages = kept;
            let dropped: std::collections::HashSet<Uuid> =
                expired.iter().map(|m| m.id).collect();
            tables.reactions.retain(|r| !dropped.contains(&r.message_id));
            expired
        };

        for row in &expired {
            self.inner.publish(
                row.room,
                ChangeEvent { kind: ChangeKind::Delete, record: json!({ "id": row.id }) },
            );
        }
        expired.len()
    }
}

impl BackendInner {
    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().expect("memory tables poisoned")
    }

    fn publish(&self, room: Room, event: ChangeEvent) {
        // Err just means nobody is subscribed right now.
        let _ = self.live.send((room, event));
    }

    fn check_reads(&self) -> anyhow::Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            anyhow::bail!("store unavailable");
        }
        Ok(())
    }
}

#[async_trait]
impl ChatStore for MemoryBackend {
    async fn messages_since(
        &self,
        room: Room,
        since: DateTime<Utc>,
    ) -> anyhow::Result<Vec<MessageRow>> {
        self.inner.check_reads()?;
        let tables = self.inner.lock();
        let mut rows: Vec<MessageRow> = tables
            .messages
            .iter()
            .filter(|m| m.room == room && m.created_at >= since)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(rows)
    }

    async fn reactions_for(&self, message_ids: &[Uuid]) -> anyhow::Result<Vec<Reaction>> {
        self.inner.check_reads()?;
        let tables = self.inner.lock();
        Ok(tables
            .reactions
            .iter()
            .filter(|r| message_ids.contains(&r.message_id))
            .cloned()
            .collect())
    }

    async fn insert_message(&self, message: NewMessage) -> anyhow::Result<()> {
        let row = MessageRow {
            id: Uuid::new_v4(),
            room: message.room,
            author_id: message.author_id,
            content: message.content,
            image_url: message.image_url,
            reply_to_id: message.reply_to_id,
            created_at: Utc::now(),
        };
        self.inner.lock().messages.push(row.clone());
        self.inner.publish(
            row.room,
            ChangeEvent { kind: ChangeKind::Insert, record: serde_json::to_value(&row)? },
        );
        Ok(())
    }

    async fn delete_message(&self, id: Uuid) -> anyhow::Result<()> {
        let room = {
            let mut tables = self.inner.lock();
            let Some(at) = tables.messages.iter().position(|m| m.id == id) else {
                anyhow::bail!("no message {id}");
            };
            let row = tables.messages.remove(at);
            tables.reactions.retain(|r| r.message_id != id);
            row.room
        };
        self.inner
            .publish(room, ChangeEvent { kind: ChangeKind::Delete, record: json!({ "id": id }) });
        Ok(())
    }

    async fn insert_reaction(
        &self,
        message_id: Uuid,
        author_id: Uuid,
        emoji: &str,
    ) -> anyhow::Result<()> {
        let (room, reaction) = {
            let mut tables = self.inner.lock();
            let Some(message) = tables.messages.iter().find(|m| m.id == message_id) else {
                anyhow::bail!("no message {message_id}");
            };
            let room = message.room;

            // Uniqueness per (message, author, emoji): a duplicate insert is
            // absorbed, matching the hosted store's constraint semantics.
            let duplicate = tables.reactions.iter().any(|r| {
                r.message_id == message_id && r.author_id == author_id && r.emoji == emoji
            });
            if duplicate {
                debug!("duplicate reaction absorbed for {message_id}");
                return Ok(());
            }

            let reaction = Reaction {
                id: Uuid::new_v4(),
                message_id,
                author_id,
                emoji: emoji.to_string(),
                created_at: Utc::now(),
            };
            tables.reactions.push(reaction.clone());
            (room, reaction)
        };
        self.inner.publish(
            room,
            ChangeEvent { kind: ChangeKind::Insert, record: serde_json::to_value(&reaction)? },
        );
        Ok(())
    }

    async fn delete_reaction(&self, id: Uuid) -> anyhow::Result<()> {
        let room = {
            let mut tables = self.inner.lock();
            let Some(at) = tables.reactions.iter().position(|r| r.id == id) else {
                anyhow::bail!("no reaction {id}");
            };
            let reaction = tables.reactions.remove(at);
            tables
                .messages
                .iter()
                .find(|m| m.id == reaction.message_id)
                .map(|m| m.room)
        };
        if let Some(room) = room {
            self.inner.publish(
                room,
                ChangeEvent { kind: ChangeKind::Delete, record: json!({ "id": id }) },
            );
        }
        Ok(())
    }

    async fn pseudonym_for(&self, author_id: Uuid) -> anyhow::Result<String> {
        self.inner.check_reads()?;
        let mut tables = self.inner.lock();
        let name = tables.pseudonyms.entry(author_id).or_insert_with(|| {
            let mut rng = rand::rng();
            // The word lists are non-empty, so choose cannot miss.
            let adjective = PSEUDONYM_ADJECTIVES.choose(&mut rng).copied().unwrap_or("quiet");
            let animal = PSEUDONYM_ANIMALS.choose(&mut rng).copied().unwrap_or("quokka");
            format!("{adjective}-{animal}")
        });
        Ok(name.clone())
    }

    async fn report_message(&self, id: Uuid, reason: Option<&str>) -> anyhow::Result<String> {
        let mut tables = self.inner.lock();
        if !tables.messages.iter().any(|m| m.id == id) {
            anyhow::bail!("no message {id}");
        }
        tables.reports.push(Report {
            message_id: id,
            reason: reason.map(str::to_string),
            received_at: Utc::now(),
        });
        Ok(format!("report-{}", tables.reports.len()))
    }
}

#[async_trait]
impl EventSource for MemoryBackend {
    async fn subscribe(&self, room: Room) -> anyhow::Result<Box<dyn LiveFeed>> {
        Ok(Box::new(BroadcastFeed { room, rx: self.inner.live.subscribe() }))
    }
}

#[async_trait]
impl EmoteSource for MemoryBackend {
    async fn fetch_emotes(&self) -> anyhow::Result<Vec<CustomEmote>> {
        self.inner.check_reads()?;
        Ok(self.inner.lock().emotes.clone())
    }
}

/// One subscriber's view of the broadcast stream, filtered to its room.
struct BroadcastFeed {
    room: Room,
    rx: broadcast::Receiver<(Room, ChangeEvent)>,
}

#[async_trait]
impl LiveFeed for BroadcastFeed {
    async fn next_event(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.rx.recv().await {
                Ok((room, event)) if room == self.room => return Some(event),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    debug!("feed for {} lagged, skipped {missed} events", self.room);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    async fn close(self: Box<Self>) {
        // Dropping the receiver is the whole teardown.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use banter_types::RoomEvent;

    fn new_message(room: Room, author_id: Uuid, content: &str) -> NewMessage {
        NewMessage {
            room,
            author_id,
            content: Some(content.to_string()),
            image_url: None,
            reply_to_id: None,
        }
    }

    #[tokio::test]
    async fn insert_reaches_only_the_matching_room_feed() {
        let backend = MemoryBackend::new();
        let mut general = backend.subscribe(Room::General).await.unwrap();
        let mut memes = backend.subscribe(Room::Memes).await.unwrap();

        backend
            .insert_message(new_message(Room::General, Uuid::new_v4(), "oi"))
            .await
            .unwrap();
        backend
            .insert_message(new_message(Room::Memes, Uuid::new_v4(), "lol"))
            .await
            .unwrap();

        let event = general.next_event().await.unwrap();
        match RoomEvent::decode(event) {
            RoomEvent::MessageCreated(row) => assert_eq!(row.room, Room::General),
            other => panic!("expected MessageCreated, got {other:?}"),
        }
        let event = memes.next_event().await.unwrap();
        match RoomEvent::decode(event) {
            RoomEvent::MessageCreated(row) => assert_eq!(row.room, Room::Memes),
            other => panic!("expected MessageCreated, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn duplicate_reaction_insert_is_absorbed() {
        let backend = MemoryBackend::new();
        let author = Uuid::new_v4();
        let row = backend.seed_message(Room::General, author, "oi", Utc::now());

        backend.insert_reaction(row.id, author, "👍").await.unwrap();
        backend.insert_reaction(row.id, author, "👍").await.unwrap();
        assert_eq!(backend.reaction_count(), 1);
    }

    #[tokio::test]
    async fn deleting_a_message_cascades_its_reactions() {
        let backend = MemoryBackend::new();
        let author = Uuid::new_v4();
        let row = backend.seed_message(Room::General, author, "oi", Utc::now());
        backend.insert_reaction(row.id, author, "🔥").await.unwrap();

        backend.delete_message(row.id).await.unwrap();
        assert_eq!(backend.message_count(), 0);
        assert_eq!(backend.reaction_count(), 0);
    }

    #[tokio::test]
    async fn messages_since_filters_room_and_window() {
        let backend = MemoryBackend::new();
        let author = Uuid::new_v4();
        let now = Utc::now();
        backend.seed_message(Room::General, author, "old", now - chrono::Duration::hours(2));
        let fresh = backend.seed_message(Room::General, author, "fresh", now);
        backend.seed_message(Room::Memes, author, "elsewhere", now);

        let rows = backend
            .messages_since(Room::General, now - chrono::Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, fresh.id);
    }

    #[tokio::test]
    async fn pseudonyms_are_stable_per_author() {
        let backend = MemoryBackend::new();
        let author = Uuid::new_v4();
        let first = backend.pseudonym_for(author).await.unwrap();
        let second = backend.pseudonym_for(author).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn sweep_publishes_deletes_for_expired_rows() {
        let backend = MemoryBackend::new();
        let author = Uuid::new_v4();
        let old = backend.seed_message(
            Room::General,
            author,
            "stale",
            Utc::now() - chrono::Duration::hours(2),
        );
        backend.seed_message(Room::General, author, "fresh", Utc::now());

        let mut feed = backend.subscribe(Room::General).await.unwrap();
        assert_eq!(backend.sweep_expired(std::time::Duration::from_secs(3600)), 1);
        assert_eq!(backend.message_count(), 1);

        match RoomEvent::decode(feed.next_event().await.unwrap()) {
            RoomEvent::Deleted { id } => assert_eq!(id, old.id),
            other => panic!("expected Deleted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn reporting_unknown_message_fails() {
        let backend = MemoryBackend::new();
        assert!(backend.report_message(Uuid::new_v4(), None).await.is_err());

        let row = backend.seed_message(Room::General, Uuid::new_v4(), "oi", Utc::now());
        let ack = backend.report_message(row.id, Some("spam")).await.unwrap();
        assert!(!ack.is_empty());
        assert_eq!(backend.reports().len(), 1);
    }
}
