use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The fixed set of chat rooms. Rooms are enumerated, never user-created,
/// and a message belongs to exactly one room for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Room {
    General,
    Memes,
    Whinge,
}

impl Room {
    pub const ALL: [Room; 3] = [Room::General, Room::Memes, Room::Whinge];

    /// Stable wire name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Room::General => "general",
            Room::Memes => "memes",
            Room::Whinge => "whinge",
        }
    }

    /// Display label for room pickers.
    pub fn label(&self) -> &'static str {
        match self {
            Room::General => "#general",
            Room::Memes => "#memes",
            Room::Whinge => "#whinge",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Room::General => "Main discussion",
            Room::Memes => "Shitposting & levity",
            Room::Whinge => "Venting about work",
        }
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown room: {0}")]
pub struct UnknownRoom(pub String);

impl FromStr for Room {
    type Err = UnknownRoom;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "general" => Ok(Room::General),
            "memes" => Ok(Room::Memes),
            "whinge" => Ok(Room::Whinge),
            other => Err(UnknownRoom(other.to_string())),
        }
    }
}
