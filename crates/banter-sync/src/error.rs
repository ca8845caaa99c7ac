use thiserror::Error;

/// Errors surfaced by the sync core.
///
/// Validation variants are rejected synchronously, before any network call.
/// `Store` and `Channel` wrap failures from the backend traits; the merge
/// loop itself never propagates them as fatal.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("not authenticated")]
    NotAuthenticated,

    #[error("no room joined")]
    NoRoomJoined,

    #[error("message needs text or an image")]
    EmptyDraft,

    #[error("message is {len} characters, max is {max}")]
    ContentTooLong { len: usize, max: usize },

    #[error("store request failed: {0}")]
    Store(#[from] anyhow::Error),

    #[error("live channel failed: {0}")]
    Channel(#[source] anyhow::Error),
}
