//! Carrier auth token cache
//!
//! Login-token carriers (RapidShyp) hand out short-lived tokens. The cache
//! is an explicit object injected into the carrier client, not process
//! globals, so tests and multi-instance deployments each own their state.

use dashmap::DashMap;
use shared::util::now_millis;

#[derive(Debug, Default)]
pub struct TokenCache {
    entries: DashMap<String, CachedToken>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: i64,
}

impl TokenCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// A live token, or None when absent/expired
    pub fn get(&self, key: &str) -> Option<String> {
        let entry = self.entries.get(key)?;
        if entry.expires_at <= now_millis() {
            drop(entry);
            self.entries.remove(key);
            return None;
        }
        Some(entry.token.clone())
    }

    pub fn put(&self, key: &str, token: String, ttl_ms: i64) {
        self.entries.insert(
            key.to_string(),
            CachedToken {
                token,
                expires_at: now_millis() + ttl_ms,
            },
        );
    }

    pub fn invalidate(&self, key: &str) {
        self.entries.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expired_tokens_are_not_returned() {
        let cache = TokenCache::new();
        cache.put("rapidshyp", "tok-1".into(), -1);
        assert_eq!(cache.get("rapidshyp"), None);

        cache.put("rapidshyp", "tok-2".into(), 60_000);
        assert_eq!(cache.get("rapidshyp").as_deref(), Some("tok-2"));

        cache.invalidate("rapidshyp");
        assert_eq!(cache.get("rapidshyp"), None);
    }
}
