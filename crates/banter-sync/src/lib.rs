//! Room synchronization core for Banter: merges a point-in-time history
//! fetch with a live change feed into one deduplicated, time-ordered,
//! TTL-windowed room view, and routes every mutation back through the
//! hosted store.
//!
//! The engine is backend-agnostic: it talks to the outside world only
//! through the [`ports`] traits.

pub mod aggregate;
pub mod compose;
pub mod config;
pub mod error;
pub mod ports;
pub mod pseudonym;
pub mod state;
pub mod sync;

pub use aggregate::{aggregate, ReactionAggregates, ReactionTally};
pub use compose::{Draft, ValidDraft};
pub use config::SyncConfig;
pub use error::ChatError;
pub use ports::{ChatStore, EventSource, LiveFeed, SessionProvider};
pub use pseudonym::{PseudonymCache, UNKNOWN_PSEUDONYM};
pub use state::RoomSnapshot;
pub use sync::RoomSync;
