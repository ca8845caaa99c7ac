//! In-process implementation of the backend contracts: a table-per-`Vec`
//! store, a broadcast-based live feed, and a static session. Powers the
//! demo binary and the integration tests without any hosted service.

mod backend;
mod session;

pub use backend::{MemoryBackend, Report, BROADCAST_CAPACITY};
pub use session::StaticSession;
