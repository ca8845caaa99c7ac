use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::models::{MessageRow, Reaction};

/// Change kind tag on a raw live-channel notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// Raw notification as delivered by the live channel: a kind tag plus the
/// affected record as loose JSON. For deletes the record may be the full old
/// row or just `{"id": ...}` — the channel does not say which table it came
/// from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub record: serde_json::Value,
}

/// A change event decoded at the channel boundary into an exhaustive union.
///
/// Classification is by record shape: message rows carry a `room` field,
/// reaction rows carry a `message_id` field. Anything else — including rows
/// that name the right fields but fail to deserialize — lands in `Unknown`,
/// which consumers log and drop. A malformed event must never take down the
/// merge loop.
#[derive(Debug, Clone)]
pub enum RoomEvent {
    MessageCreated(MessageRow),
    MessageUpdated(MessageRow),
    ReactionAdded(Reaction),
    /// Id of a deleted row. Deletes do not identify their collection, so the
    /// consumer probes both messages and reactions.
    Deleted { id: Uuid },
    Unknown(ChangeEvent),
}

impl RoomEvent {
    pub fn decode(event: ChangeEvent) -> RoomEvent {
        match event.kind {
            ChangeKind::Insert | ChangeKind::Update => decode_upsert(event),
            ChangeKind::Delete => decode_delete(event),
        }
    }
}

fn decode_upsert(event: ChangeEvent) -> RoomEvent {
    if event.record.get("room").is_some() {
        match serde_json::from_value::<MessageRow>(event.record.clone()) {
            Ok(row) if event.kind == ChangeKind::Insert => RoomEvent::MessageCreated(row),
            Ok(row) => RoomEvent::MessageUpdated(row),
            Err(err) => {
                debug!("undecodable message record: {err}");
                RoomEvent::Unknown(event)
            }
        }
    } else if event.record.get("message_id").is_some() {
        // Reactions are toggled (inserted/deleted), never updated in place.
        if event.kind != ChangeKind::Insert {
            return RoomEvent::Unknown(event);
        }
        match serde_json::from_value::<Reaction>(event.record.clone()) {
            Ok(reaction) => RoomEvent::ReactionAdded(reaction),
            Err(err) => {
                debug!("undecodable reaction record: {err}");
                RoomEvent::Unknown(event)
            }
        }
    } else {
        RoomEvent::Unknown(event)
    }
}

fn decode_delete(event: ChangeEvent) -> RoomEvent {
    let id = event
        .record
        .get("id")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<Uuid>().ok());

    match id {
        Some(id) => RoomEvent::Deleted { id },
        None => RoomEvent::Unknown(event),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rooms::Room;
    use serde_json::json;

    fn message_record(id: Uuid) -> serde_json::Value {
        json!({
            "id": id,
            "room": "general",
            "author_id": Uuid::new_v4(),
            "content": "g'day",
            "created_at": "2026-08-24T00:00:00Z",
        })
    }

    #[test]
    fn classifies_message_insert_by_room_field() {
        let id = Uuid::new_v4();
        let event = ChangeEvent { kind: ChangeKind::Insert, record: message_record(id) };
        match RoomEvent::decode(event) {
            RoomEvent::MessageCreated(row) => {
                assert_eq!(row.id, id);
                assert_eq!(row.room, Room::General);
                assert_eq!(row.content.as_deref(), Some("g'day"));
            }
            other => panic!("expected MessageCreated, got {other:?}"),
        }
    }

    #[test]
    fn classifies_message_update() {
        let event = ChangeEvent {
            kind: ChangeKind::Update,
            record: message_record(Uuid::new_v4()),
        };
        assert!(matches!(RoomEvent::decode(event), RoomEvent::MessageUpdated(_)));
    }

    #[test]
    fn classifies_reaction_insert_by_message_id_field() {
        let event = ChangeEvent {
            kind: ChangeKind::Insert,
            record: json!({
                "id": Uuid::new_v4(),
                "message_id": Uuid::new_v4(),
                "author_id": Uuid::new_v4(),
                "emoji": "🔥",
                "created_at": "2026-08-24T00:00:00Z",
            }),
        };
        match RoomEvent::decode(event) {
            RoomEvent::ReactionAdded(r) => assert_eq!(r.emoji, "🔥"),
            other => panic!("expected ReactionAdded, got {other:?}"),
        }
    }

    #[test]
    fn reaction_update_is_unknown() {
        let event = ChangeEvent {
            kind: ChangeKind::Update,
            record: json!({ "id": Uuid::new_v4(), "message_id": Uuid::new_v4() }),
        };
        assert!(matches!(RoomEvent::decode(event), RoomEvent::Unknown(_)));
    }

    #[test]
    fn delete_extracts_id_without_classifying() {
        let id = Uuid::new_v4();
        let event = ChangeEvent {
            kind: ChangeKind::Delete,
            record: json!({ "id": id }),
        };
        assert!(matches!(RoomEvent::decode(event), RoomEvent::Deleted { id: got } if got == id));
    }

    #[test]
    fn unrecognized_shapes_are_unknown_not_errors() {
        for record in [json!({"foo": "bar"}), json!(null), json!({"room": 7})] {
            let event = ChangeEvent { kind: ChangeKind::Insert, record };
            assert!(matches!(RoomEvent::decode(event), RoomEvent::Unknown(_)));
        }
    }

    #[test]
    fn malformed_message_row_is_unknown() {
        // Has a `room` field but the row itself does not deserialize.
        let event = ChangeEvent {
            kind: ChangeKind::Insert,
            record: json!({ "room": "general", "id": "not-a-uuid" }),
        };
        assert!(matches!(RoomEvent::decode(event), RoomEvent::Unknown(_)));
    }
}
