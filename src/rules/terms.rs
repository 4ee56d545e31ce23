//! Remote custom-term source. Curators maintain from→to entries in an
//! external service; the engine refreshes them on a short TTL and tolerates
//! the source being empty or unreachable (negative cache on failure).

use super::lexicon::{build_custom_rules, DictionaryReplacement};
use super::RuleEntry;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

const TERMS_TTL: Duration = Duration::from_secs(5 * 60);
const NEGATIVE_TTL: Duration = Duration::from_secs(60);

struct CachedRules {
    rules: Arc<Vec<RuleEntry>>,
    expires_at: Instant,
}

pub struct CustomTermSource {
    endpoint: Option<String>,
    client: reqwest::Client,
    cache: Mutex<Option<CachedRules>>,
}

impl CustomTermSource {
    pub fn new(endpoint: Option<String>) -> Self {
        Self {
            endpoint,
            client: reqwest::Client::new(),
            cache: Mutex::new(None),
        }
    }

    /// Current rule set, refreshed when the cache has expired. Never fails:
    /// an unreachable source yields an empty set held for the negative TTL.
    pub async fn rules(&self) -> Arc<Vec<RuleEntry>> {
        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.as_ref() {
            if cached.expires_at > Instant::now() {
                return Arc::clone(&cached.rules);
            }
        }

        let (rules, ttl) = match &self.endpoint {
            None => (Vec::new(), NEGATIVE_TTL),
            Some(endpoint) => match self.fetch(endpoint).await {
                Ok(entries) => (build_custom_rules(&entries), TERMS_TTL),
                Err(err) => {
                    log::warn!("custom term fetch failed: {}", err);
                    (Vec::new(), NEGATIVE_TTL)
                }
            },
        };

        let rules = Arc::new(rules);
        *cache = Some(CachedRules {
            rules: Arc::clone(&rules),
            expires_at: Instant::now() + ttl,
        });
        rules
    }

    async fn fetch(&self, endpoint: &str) -> anyhow::Result<Vec<DictionaryReplacement>> {
        let response = self.client.get(endpoint).send().await?;
        if !response.status().is_success() {
            anyhow::bail!("term source returned HTTP {}", response.status());
        }
        Ok(response.json().await?)
    }
}
