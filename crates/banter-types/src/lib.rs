pub mod events;
pub mod models;
pub mod rooms;

pub use events::{ChangeEvent, ChangeKind, RoomEvent};
pub use models::{ChatMessage, CustomEmote, MessageRow, NewMessage, Reaction};
pub use rooms::Room;
