//! The in-memory room view and the synchronous merge primitives that keep
//! it consistent. Every mutation here runs to completion under one lock
//! acquisition — no awaits — so the dedup and ordering invariants cannot be
//! observed mid-merge.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use banter_types::{ChatMessage, Reaction, Room};

use crate::aggregate::{self, ReactionAggregates};

/// Read-only view of the active room, cloned out to presentation code.
/// Messages are always ascending by creation time.
#[derive(Debug, Clone, Default)]
pub struct RoomSnapshot {
    pub room: Option<Room>,
    pub messages: Vec<ChatMessage>,
    pub reactions: Vec<Reaction>,
    /// True while the initial history fetch is in flight.
    pub loading: bool,
    /// Last recoverable failure for this room, e.g. a failed history fetch.
    pub error: Option<String>,
}

impl RoomSnapshot {
    /// The message a reply points at, if it is still in the window.
    pub fn reply_target(&self, message: &ChatMessage) -> Option<&ChatMessage> {
        let target = message.reply_to_id?;
        self.messages.iter().find(|m| m.id == target)
    }

    /// Reaction rollup for the current view. Recomputed from the full set.
    pub fn aggregates(&self, current_user: Option<Uuid>) -> ReactionAggregates {
        aggregate::aggregate(&self.reactions, current_user)
    }

    /// The current user's reaction row for a (message, emoji) pair.
    pub fn own_reaction(&self, user: Uuid, message_id: Uuid, emoji: &str) -> Option<&Reaction> {
        self.reactions
            .iter()
            .find(|r| r.message_id == message_id && r.author_id == user && r.emoji == emoji)
    }
}

/// Insert a message unless one with the same id is already present.
/// Returns whether anything changed.
///
/// The dedup check is load-bearing: during join, the same row can arrive
/// through both the history fetch and a near-simultaneous live event.
pub(crate) fn merge_created(state: &mut RoomSnapshot, message: ChatMessage) -> bool {
    if state.messages.iter().any(|m| m.id == message.id) {
        return false;
    }
    let at = state
        .messages
        .partition_point(|m| (m.created_at, m.id) <= (message.created_at, message.id));
    state.messages.insert(at, message);
    true
}

/// Replace the entry matching the update's id. A miss is a no-op — updates
/// never insert, since the row may have expired or been deleted locally.
pub(crate) fn merge_updated(state: &mut RoomSnapshot, message: ChatMessage) -> bool {
    match state.messages.iter_mut().find(|m| m.id == message.id) {
        Some(existing) => {
            *existing = message;
            // Server-assigned timestamps don't change on update, but resorting
            // is cheap and keeps the ordering invariant unconditional.
            state.messages.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
            true
        }
        None => false,
    }
}

/// Insert a reaction unless its id is already present.
pub(crate) fn merge_reaction(state: &mut RoomSnapshot, reaction: Reaction) -> bool {
    if state.reactions.iter().any(|r| r.id == reaction.id) {
        return false;
    }
    state.reactions.push(reaction);
    true
}

/// Remove whatever carries `id`, probing both collections — delete events
/// don't say which table they came from. Reactions of a removed message go
/// with it.
pub(crate) fn remove_by_id(state: &mut RoomSnapshot, id: Uuid) -> bool {
    let messages_before = state.messages.len();
    let reactions_before = state.reactions.len();

    state.messages.retain(|m| m.id != id);
    if state.messages.len() < messages_before {
        state.reactions.retain(|r| r.message_id != id);
        return true;
    }

    state.reactions.retain(|r| r.id != id);
    state.reactions.len() < reactions_before
}

/// Drop messages created at or before `cutoff`, plus their reactions.
/// Returns the number of messages dropped.
pub(crate) fn prune_expired(state: &mut RoomSnapshot, cutoff: DateTime<Utc>) -> usize {
    let before = state.messages.len();
    state.messages.retain(|m| m.created_at > cutoff);
    let dropped = before - state.messages.len();

    if dropped > 0 {
        let live: std::collections::HashSet<Uuid> = state.messages.iter().map(|m| m.id).collect();
        state.reactions.retain(|r| live.contains(&r.message_id));
    }

    dropped
}
