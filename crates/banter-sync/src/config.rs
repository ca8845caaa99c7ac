use std::time::Duration;

/// Tunables for the sync core. Defaults mirror the server-side policy: the
/// server expires messages after an hour, the client prunes its mirror every
/// thirty seconds.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Rolling retention window. Messages at or past this age are dropped
    /// locally; the server remains the source of truth for durable deletion.
    pub message_ttl: Duration,
    /// How often the local prune pass runs.
    pub prune_interval: Duration,
    /// Maximum trimmed message length, in characters.
    pub max_content_len: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            message_ttl: Duration::from_secs(60 * 60),
            prune_interval: Duration::from_secs(30),
            max_content_len: 2000,
        }
    }
}

impl SyncConfig {
    /// Defaults overridden by `BANTER_MESSAGE_TTL_SECS` and
    /// `BANTER_PRUNE_INTERVAL_SECS` where set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(secs) = env_secs("BANTER_MESSAGE_TTL_SECS") {
            config.message_ttl = Duration::from_secs(secs);
        }
        if let Some(secs) = env_secs("BANTER_PRUNE_INTERVAL_SECS") {
            config.prune_interval = Duration::from_secs(secs);
        }
        config
    }
}

fn env_secs(key: &str) -> Option<u64> {
    std::env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_server_policy() {
        let config = SyncConfig::default();
        assert_eq!(config.message_ttl, Duration::from_secs(3600));
        assert_eq!(config.prune_interval, Duration::from_secs(30));
        assert_eq!(config.max_content_len, 2000);
    }
}
