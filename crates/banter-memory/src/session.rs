use uuid::Uuid;

use banter_sync::SessionProvider;

/// Fixed-identity session: one anonymous account minted up front, the way
/// the hosted auth layer signs clients in before they ever reach a room.
#[derive(Debug, Clone, Copy)]
pub struct StaticSession {
    user: Option<Uuid>,
}

impl StaticSession {
    /// A signed-in session with a fresh anonymous account.
    pub fn signed_in() -> Self {
        Self { user: Some(Uuid::new_v4()) }
    }

    pub fn with_user(user: Uuid) -> Self {
        Self { user: Some(user) }
    }

    /// A session that never authenticated.
    pub fn anonymous() -> Self {
        Self { user: None }
    }
}

impl SessionProvider for StaticSession {
    fn current_user(&self) -> Option<Uuid> {
        self.user
    }
}
