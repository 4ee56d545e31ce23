//! Network-backed provider speaking the fixed spellcheck service contract:
//! `POST endpoint {text, mode, domain}` with an optional shared-secret
//! header. Any transport or protocol failure degrades to `service_error`.

use super::{ProviderContext, ProviderResult, RawSuggestion, SpellcheckProvider};
use crate::rules::{clamp_confidence, classify_by_reason};
use crate::{Domain, Mode, SuggestionType};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const SECRET_HEADER: &str = "x-spellcheck-secret";

#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    text: &'a str,
    mode: Mode,
    domain: Domain,
}

#[derive(Debug, Deserialize)]
struct WireSuggestion {
    #[serde(default = "invalid_offset")]
    start: i64,
    #[serde(default = "invalid_offset")]
    end: i64,
    #[serde(default)]
    before: String,
    #[serde(default)]
    after: String,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default, rename = "type")]
    kind: Option<SuggestionType>,
}

fn invalid_offset() -> i64 {
    -1
}

fn default_ok() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default = "default_ok")]
    ok: bool,
    #[serde(default)]
    suggestions: Vec<WireSuggestion>,
    #[serde(default)]
    warnings: Vec<String>,
}

pub struct ExternalProvider {
    endpoint: Option<String>,
    shared_secret: Option<String>,
    client: reqwest::Client,
}

impl ExternalProvider {
    pub fn new(endpoint: Option<String>, shared_secret: Option<String>) -> Self {
        Self {
            endpoint: endpoint.map(|e| normalize_endpoint(&e)),
            shared_secret,
            client: reqwest::Client::new(),
        }
    }

    async fn call(
        &self,
        endpoint: &str,
        text: &str,
        ctx: &ProviderContext,
    ) -> anyhow::Result<WireResponse> {
        let mut request = self.client.post(endpoint).json(&WireRequest {
            text,
            mode: ctx.mode,
            domain: ctx.domain,
        });
        if let Some(secret) = &self.shared_secret {
            request = request.header(SECRET_HEADER, secret);
        }
        let response = request.send().await?;
        if !response.status().is_success() {
            anyhow::bail!("service returned HTTP {}", response.status());
        }
        Ok(response.json().await?)
    }
}

/// The service lives at `/spellcheck`; accept base URLs as configuration.
fn normalize_endpoint(endpoint: &str) -> String {
    if endpoint.ends_with("/spellcheck") {
        endpoint.to_string()
    } else if let Some(base) = endpoint.strip_suffix('/') {
        format!("{}/spellcheck", base)
    } else {
        format!("{}/spellcheck", endpoint)
    }
}

#[async_trait]
impl SpellcheckProvider for ExternalProvider {
    fn name(&self) -> &str {
        "external_api"
    }

    async fn check(&self, text: &str, ctx: &ProviderContext) -> ProviderResult {
        let endpoint = match &self.endpoint {
            Some(endpoint) => endpoint,
            None => return ProviderResult::degraded("service_unconfigured"),
        };

        let payload = match self.call(endpoint, text, ctx).await {
            Ok(payload) if payload.ok => payload,
            Ok(_) => return ProviderResult::degraded("service_error"),
            Err(err) => {
                log::warn!("external provider failed: {}", err);
                return ProviderResult::degraded("service_error");
            }
        };

        let suggestions = payload
            .suggestions
            .into_iter()
            .filter(|s| s.start >= 0 && s.end >= s.start)
            .filter_map(|s| {
                let start = s.start as usize;
                let end = s.end as usize;
                // Offsets must land on char boundaries of the text we sent;
                // anything else is a protocol violation and is dropped.
                if end > text.len() || !text.is_char_boundary(start) || !text.is_char_boundary(end)
                {
                    return None;
                }
                let reason = s.reason.unwrap_or_else(|| "external".to_string());
                Some(RawSuggestion {
                    start,
                    end,
                    kind: s.kind.unwrap_or_else(|| classify_by_reason(&reason)),
                    before: s.before,
                    after: s.after,
                    confidence: clamp_confidence(s.confidence, 0.7),
                    reason,
                    source: "external_api".to_string(),
                })
            })
            .collect();

        ProviderResult {
            suggestions,
            confidence: 0.85,
            warnings: payload.warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_normalization() {
        assert_eq!(
            normalize_endpoint("http://svc:8000"),
            "http://svc:8000/spellcheck"
        );
        assert_eq!(
            normalize_endpoint("http://svc:8000/"),
            "http://svc:8000/spellcheck"
        );
        assert_eq!(
            normalize_endpoint("http://svc:8000/spellcheck"),
            "http://svc:8000/spellcheck"
        );
    }

    #[tokio::test]
    async fn test_unconfigured_yields_warning() {
        let provider = ExternalProvider::new(None, None);
        let ctx = ProviderContext {
            mode: Mode::Balanced,
            domain: Domain::General,
        };
        let result = provider.check("텍스트", &ctx).await;
        assert!(result.suggestions.is_empty());
        assert_eq!(result.warnings, vec!["service_unconfigured".to_string()]);
    }

    #[tokio::test]
    async fn test_unreachable_service_degrades() {
        let provider = ExternalProvider::new(Some("http://127.0.0.1:9".into()), None);
        let ctx = ProviderContext {
            mode: Mode::Fast,
            domain: Domain::Music,
        };
        let result = provider.check("텍스트", &ctx).await;
        assert!(result.suggestions.is_empty());
        assert_eq!(result.warnings, vec!["service_error".to_string()]);
    }
}
