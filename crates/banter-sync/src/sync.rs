//! The room synchronization core: one consistent, deduplicated,
//! time-windowed view of the active room, merged from a point-in-time
//! history fetch and a continuous live-event feed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use chrono::Utc;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use banter_types::{ChangeEvent, ChatMessage, MessageRow, NewMessage, Room, RoomEvent};

use crate::compose::{self, Draft};
use crate::config::SyncConfig;
use crate::error::ChatError;
use crate::ports::{ChatStore, EventSource, LiveFeed, SessionProvider};
use crate::pseudonym::PseudonymCache;
use crate::state::{self, RoomSnapshot};

/// Handle to the sync engine. Cheap to clone; all clones share one view.
///
/// Presentation code reads via [`RoomSync::snapshot`] and awaits
/// [`RoomSync::changes`]; every mutation goes back through the operations
/// here — the displayed list is never mutated directly.
#[derive(Clone)]
pub struct RoomSync {
    inner: Arc<SyncInner>,
}

struct SyncInner {
    store: Arc<dyn ChatStore>,
    events: Arc<dyn EventSource>,
    session: Arc<dyn SessionProvider>,
    pseudonyms: PseudonymCache,
    config: SyncConfig,
    /// Held only for synchronous merges, never across an await.
    state: Mutex<RoomSnapshot>,
    /// Serializes join/leave so teardown and connect cannot interleave.
    subscription: tokio::sync::Mutex<Subscription>,
    /// Bumped on every join/leave. Async continuations re-check it before
    /// applying, so a late result for a stale room is a no-op.
    epoch: AtomicU64,
    changed: watch::Sender<u64>,
}

/// Live-channel state machine. At most one channel is open per client, and
/// transitions always run teardown-then-connect under the subscription lock.
enum Subscription {
    Disconnected,
    Connecting(Room),
    Connected(Room, FeedHandle),
}

struct FeedHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl RoomSync {
    pub fn new(
        store: Arc<dyn ChatStore>,
        events: Arc<dyn EventSource>,
        session: Arc<dyn SessionProvider>,
        config: SyncConfig,
    ) -> Self {
        let inner = Arc::new(SyncInner {
            pseudonyms: PseudonymCache::new(store.clone()),
            store,
            events,
            session,
            config,
            state: Mutex::new(RoomSnapshot::default()),
            subscription: tokio::sync::Mutex::new(Subscription::Disconnected),
            epoch: AtomicU64::new(0),
            changed: watch::channel(0).0,
        });
        spawn_prune_loop(&inner);
        Self { inner }
    }

    /// Join `room`: tear down any other room's channel, subscribe, then
    /// fetch the TTL window of history and merge it under dedup.
    ///
    /// Calling this for the room already joined is a no-op — not a
    /// teardown/rejoin — so callers can't shed state by accident.
    ///
    /// Fetch policy is fail-open: a failed history fetch records an error on
    /// the room state but leaves the live feed running, so new messages
    /// still arrive.
    pub async fn join_room(&self, room: Room) -> Result<(), ChatError> {
        let mut sub = self.inner.subscription.lock().await;
        if matches!(&*sub, Subscription::Connected(current, _) if *current == room) {
            debug!("already joined {room}, ignoring");
            return Ok(());
        }

        let epoch = self.inner.bump_epoch();
        teardown(&mut sub).await;

        {
            let mut state = self.inner.state.lock().expect("room state poisoned");
            *state = RoomSnapshot { room: Some(room), loading: true, ..Default::default() };
        }
        self.inner.notify();

        *sub = Subscription::Connecting(room);
        let feed = match self.inner.events.subscribe(room).await {
            Ok(feed) => feed,
            Err(err) => {
                *sub = Subscription::Disconnected;
                let mut state = self.inner.state.lock().expect("room state poisoned");
                state.loading = false;
                state.error = Some(err.to_string());
                drop(state);
                self.inner.notify();
                return Err(ChatError::Channel(err));
            }
        };
        *sub = Subscription::Connected(room, spawn_pump(&self.inner, epoch, feed));
        drop(sub);

        info!("joined {room}");
        self.load_history(room, epoch).await;
        Ok(())
    }

    /// Tear down the live channel and clear local state. No-op when idle.
    pub async fn leave_room(&self) {
        let mut sub = self.inner.subscription.lock().await;
        self.inner.bump_epoch();
        teardown(&mut sub).await;

        let mut state = self.inner.state.lock().expect("room state poisoned");
        if let Some(room) = state.room {
            info!("left {room}");
        }
        *state = RoomSnapshot::default();
        drop(state);
        self.inner.notify();
    }

    /// Persist a message. The stored row comes back through the live feed —
    /// there is no optimistic local append, so the server-assigned id and
    /// timestamp are the only ones ever displayed.
    pub async fn send_message(&self, draft: Draft) -> Result<(), ChatError> {
        let author_id = self.current_user().ok_or(ChatError::NotAuthenticated)?;
        let room = self.current_room().ok_or(ChatError::NoRoomJoined)?;
        let valid = compose::validate(draft, self.inner.config.max_content_len)?;

        self.inner
            .store
            .insert_message(NewMessage {
                room,
                author_id,
                content: valid.content,
                image_url: valid.image_url,
                reply_to_id: valid.reply_to_id,
            })
            .await?;
        Ok(())
    }

    /// Request deletion. Local removal happens via the live DELETE event.
    pub async fn delete_message(&self, id: Uuid) -> Result<(), ChatError> {
        self.inner.store.delete_message(id).await?;
        Ok(())
    }

    /// Toggle the current user's reaction: delete the row if we see one for
    /// this (message, user, emoji) triple, insert otherwise. The backend's
    /// uniqueness rule keeps racing toggles from ever duplicating a row.
    pub async fn toggle_reaction(&self, message_id: Uuid, emoji: &str) -> Result<(), ChatError> {
        let user = self.current_user().ok_or(ChatError::NotAuthenticated)?;

        let existing = {
            let state = self.inner.state.lock().expect("room state poisoned");
            if state.room.is_none() {
                return Err(ChatError::NoRoomJoined);
            }
            state.own_reaction(user, message_id, emoji).map(|r| r.id)
        };

        match existing {
            Some(reaction_id) => self.inner.store.delete_reaction(reaction_id).await?,
            None => self.inner.store.insert_reaction(message_id, user, emoji).await?,
        }
        Ok(())
    }

    /// Report a message to moderation. Returns the acknowledgement token.
    pub async fn report_message(
        &self,
        id: Uuid,
        reason: Option<&str>,
    ) -> Result<String, ChatError> {
        let ack = self.inner.store.report_message(id, reason).await?;
        Ok(ack)
    }

    /// Read-only copy of the current room view.
    pub fn snapshot(&self) -> RoomSnapshot {
        self.inner.state.lock().expect("room state poisoned").clone()
    }

    /// Version ticker that fires on every state change.
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.inner.changed.subscribe()
    }

    pub fn current_room(&self) -> Option<Room> {
        self.inner.state.lock().expect("room state poisoned").room
    }

    pub fn current_user(&self) -> Option<Uuid> {
        self.inner.session.current_user()
    }

    /// Windowed history fetch plus pseudonym enrichment and reaction
    /// backfill. Every continuation re-checks `epoch` so a slow fetch for a
    /// room we've since left cannot clobber the new room's state.
    async fn load_history(&self, room: Room, epoch: u64) {
        let since = Utc::now() - self.inner.config.message_ttl;

        let rows = match self.inner.store.messages_since(room, since).await {
            Ok(rows) => rows,
            Err(err) => {
                warn!("history fetch for {room} failed: {err}");
                if self.inner.is_current(epoch) {
                    let mut state = self.inner.state.lock().expect("room state poisoned");
                    state.loading = false;
                    state.error = Some(err.to_string());
                    drop(state);
                    self.inner.notify();
                }
                return;
            }
        };

        let pseudonyms = self.inner.pseudonyms.resolve_many(rows.iter().map(|r| r.author_id)).await;
        if !self.inner.is_current(epoch) {
            debug!("dropping stale history for {room}");
            return;
        }

        let message_ids = {
            let mut state = self.inner.state.lock().expect("room state poisoned");
            for row in rows {
                let pseudonym = pseudonyms
                    .get(&row.author_id)
                    .cloned()
                    .unwrap_or_else(|| crate::pseudonym::UNKNOWN_PSEUDONYM.to_string());
                // Dedup against anything the live feed already delivered.
                state::merge_created(&mut state, ChatMessage::from_row(row, pseudonym));
            }
            state.loading = false;
            state.messages.iter().map(|m| m.id).collect::<Vec<_>>()
        };
        self.inner.notify();

        match self.inner.store.reactions_for(&message_ids).await {
            Ok(reactions) => {
                if !self.inner.is_current(epoch) {
                    return;
                }
                let mut state = self.inner.state.lock().expect("room state poisoned");
                for reaction in reactions {
                    state::merge_reaction(&mut state, reaction);
                }
                drop(state);
                self.inner.notify();
            }
            Err(err) => warn!("reaction backfill for {room} failed: {err}"),
        }
    }
}

impl SyncInner {
    fn bump_epoch(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.epoch.load(Ordering::SeqCst) == epoch
    }

    fn notify(&self) {
        self.changed.send_modify(|v| *v += 1);
    }

    /// Decode and merge one live event. The merge itself is synchronous
    /// under the state lock; only pseudonym resolution awaits, and the epoch
    /// is re-checked after it.
    async fn apply_live_event(&self, epoch: u64, event: ChangeEvent) {
        match RoomEvent::decode(event) {
            RoomEvent::MessageCreated(row) => {
                if let Some(message) = self.enrich(row, epoch).await {
                    let changed = {
                        let mut state = self.state.lock().expect("room state poisoned");
                        state::merge_created(&mut state, message)
                    };
                    if changed {
                        self.notify();
                    }
                }
            }
            RoomEvent::MessageUpdated(row) => {
                if let Some(message) = self.enrich(row, epoch).await {
                    let changed = {
                        let mut state = self.state.lock().expect("room state poisoned");
                        state::merge_updated(&mut state, message)
                    };
                    if changed {
                        self.notify();
                    }
                }
            }
            RoomEvent::ReactionAdded(reaction) => {
                let changed = {
                    let mut state = self.state.lock().expect("room state poisoned");
                    state::merge_reaction(&mut state, reaction)
                };
                if changed {
                    self.notify();
                }
            }
            RoomEvent::Deleted { id } => {
                let changed = {
                    let mut state = self.state.lock().expect("room state poisoned");
                    state::remove_by_id(&mut state, id)
                };
                if changed {
                    self.notify();
                }
            }
            RoomEvent::Unknown(event) => {
                // A single bad event must never take down the feed.
                warn!("dropping unrecognized live event (kind {:?})", event.kind);
            }
        }
    }

    /// Resolve the author's pseudonym and guard against both a stale epoch
    /// and an event that somehow belongs to a different room.
    async fn enrich(&self, row: MessageRow, epoch: u64) -> Option<ChatMessage> {
        let pseudonym = self.pseudonyms.resolve(row.author_id).await;
        if !self.is_current(epoch) {
            return None;
        }
        {
            let state = self.state.lock().expect("room state poisoned");
            if state.room != Some(row.room) {
                debug!("dropping live event for {} while in {:?}", row.room, state.room);
                return None;
            }
        }
        Some(ChatMessage::from_row(row, pseudonym))
    }
}

/// Stop the running feed task and wait for it to close the channel. The
/// await is what guarantees no dangling subscription can deliver into the
/// next room's state.
async fn teardown(sub: &mut Subscription) {
    match std::mem::replace(sub, Subscription::Disconnected) {
        Subscription::Connected(room, handle) => {
            debug!("closing live channel for {room}");
            let _ = handle.shutdown.send(());
            if let Err(err) = handle.task.await {
                warn!("feed task for {room} ended abnormally: {err}");
            }
        }
        Subscription::Connecting(room) => debug!("abandoning pending connect to {room}"),
        Subscription::Disconnected => {}
    }
}

fn spawn_pump(inner: &Arc<SyncInner>, epoch: u64, mut feed: Box<dyn LiveFeed>) -> FeedHandle {
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
    // Weak so a dropped client doesn't stay alive through its own feed task.
    let weak: Weak<SyncInner> = Arc::downgrade(inner);

    let task = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = &mut shutdown_rx => {
                    feed.close().await;
                    return;
                }
                event = feed.next_event() => {
                    let Some(event) = event else {
                        debug!("live feed closed by remote");
                        return;
                    };
                    let Some(inner) = weak.upgrade() else {
                        feed.close().await;
                        return;
                    };
                    inner.apply_live_event(epoch, event).await;
                }
            }
        }
    });

    FeedHandle { shutdown: shutdown_tx, task }
}

/// Client-side mirror of the server's expiry job. Advisory only — the
/// server is the source of truth for durable deletion — but keeps the local
/// window converging on the same TTL.
fn spawn_prune_loop(inner: &Arc<SyncInner>) {
    let weak = Arc::downgrade(inner);
    let period = inner.config.prune_interval;
    let ttl = inner.config.message_ttl;

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // The first tick fires immediately; nothing to prune yet.
        interval.tick().await;
        loop {
            interval.tick().await;
            let Some(inner) = weak.upgrade() else { return };

            let cutoff = Utc::now() - ttl;
            let dropped = {
                let mut state = inner.state.lock().expect("room state poisoned");
                state::prune_expired(&mut state, cutoff)
            };
            if dropped > 0 {
                debug!("pruned {dropped} expired messages");
                inner.notify();
            }
        }
    });
}
