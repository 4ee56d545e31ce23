//! Process-wide response cache. Entries are keyed by a hash of the working
//! text plus mode, domain, and length, and expire on a TTL; nothing is
//! persisted and there is no explicit teardown.

use super::breaker::Clock;
use super::CheckResponse;
use crate::{Domain, Mode};
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::{Duration, Instant};

struct CacheEntry {
    value: CheckResponse,
    expires_at: Instant,
}

pub struct ResponseCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl ResponseCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            clock,
        }
    }

    pub fn get(&self, key: &str) -> Option<CheckResponse> {
        let now = self.clock.now();
        if let Some(entry) = self.entries.get(key) {
            if entry.expires_at > now {
                return Some(entry.value.clone());
            }
        }
        // Expired entries are dropped on access rather than by a sweeper.
        self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
        None
    }

    pub fn put(&self, key: String, value: CheckResponse) {
        let expires_at = self.clock.now() + self.ttl;
        self.entries.insert(key, CacheEntry { value, expires_at });
    }
}

/// Cache key for a request: truncated text hash, mode, domain, and char
/// length, so distinct requests cannot collide on hash alone.
pub fn cache_key(text: &str, mode: Mode, domain: Domain) -> String {
    let digest = Sha256::digest(text.as_bytes());
    let mut prefix = String::with_capacity(16);
    for byte in digest.iter().take(8) {
        prefix.push_str(&format!("{:02x}", byte));
    }
    format!("{}:{}:{}:{}", prefix, mode, domain, text.chars().count())
}

#[cfg(test)]
mod tests {
    use super::super::breaker::test_support::ManualClock;
    use super::*;

    fn empty_response() -> CheckResponse {
        CheckResponse::empty_for("텍스트", Mode::Balanced, "trace".to_string())
    }

    #[test]
    fn test_key_varies_by_mode_domain_and_text() {
        let a = cache_key("텍스트", Mode::Balanced, Domain::General);
        let b = cache_key("텍스트", Mode::Fast, Domain::General);
        let c = cache_key("텍스트", Mode::Balanced, Domain::Music);
        let d = cache_key("텍스트!", Mode::Balanced, Domain::General);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
        assert_eq!(a, cache_key("텍스트", Mode::Balanced, Domain::General));
    }

    #[test]
    fn test_hit_within_ttl() {
        let clock = Arc::new(ManualClock::new());
        let cache = ResponseCache::new(
            Duration::from_secs(300),
            Arc::clone(&clock) as Arc<dyn Clock>,
        );
        cache.put("k".into(), empty_response());
        assert!(cache.get("k").is_some());
    }

    #[test]
    fn test_expiry_after_ttl() {
        let clock = Arc::new(ManualClock::new());
        let cache = ResponseCache::new(
            Duration::from_secs(300),
            Arc::clone(&clock) as Arc<dyn Clock>,
        );
        cache.put("k".into(), empty_response());
        clock.advance(Duration::from_secs(301));
        assert!(cache.get("k").is_none());
    }
}
