use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::rooms::Room;

/// A message row as stored by the backend. Ids and `created_at` are
/// server-assigned; clients never fabricate either.
///
/// `content` may be absent when an image is attached, but at least one of
/// `content` / `image_url` is always present on a valid row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRow {
    pub id: Uuid,
    pub room: Room,
    pub author_id: Uuid,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub reply_to_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// A message enriched with the author's resolved pseudonym, ready for
/// presentation. This is what the sync core exposes; raw rows stay internal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub room: Room,
    pub author_id: Uuid,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub reply_to_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub pseudonym: String,
}

impl ChatMessage {
    pub fn from_row(row: MessageRow, pseudonym: String) -> Self {
        Self {
            id: row.id,
            room: row.room,
            author_id: row.author_id,
            content: row.content,
            image_url: row.image_url,
            reply_to_id: row.reply_to_id,
            created_at: row.created_at,
            pseudonym,
        }
    }
}

/// A single reaction row. The backend guarantees at most one row per
/// (message_id, author_id, emoji) triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    pub id: Uuid,
    pub message_id: Uuid,
    pub author_id: Uuid,
    pub emoji: String,
    pub created_at: DateTime<Utc>,
}

/// A remotely defined custom emote, e.g. `:fair-go:` backed by an image URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomEmote {
    pub code: String,
    pub url: String,
    pub alt: String,
    #[serde(default)]
    pub category: Option<String>,
}

/// Payload for inserting a new message. The backend assigns id and timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMessage {
    pub room: Room,
    pub author_id: Uuid,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub reply_to_id: Option<Uuid>,
}
