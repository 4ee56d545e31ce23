use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::{Domain, Mode};

/// Engine configuration. Loaded with priority: env overrides > local config
/// > global config > defaults. Everything is optional; an empty config runs
/// the engine fully local.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// External spellcheck service base URL (`/spellcheck` is appended).
    #[serde(default)]
    pub service_url: Option<String>,

    /// Shared secret sent to the external service.
    #[serde(default)]
    pub shared_secret: Option<String>,

    /// Custom-term source URL returning `{from, to, ...}` entries.
    #[serde(default)]
    pub terms_url: Option<String>,

    /// Extra protected terms beyond the embedded lexicon.
    #[serde(default)]
    pub protected_terms: Vec<String>,

    /// Default mode when a request does not specify one.
    #[serde(default)]
    pub mode: Option<Mode>,

    /// Default domain when a request does not specify one.
    #[serde(default)]
    pub domain: Option<Domain>,
}

impl Config {
    /// Load configuration with priority: env > local config > global config
    /// > defaults.
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                config = config.merge(Self::from_file(&global_path)?);
            }
        }

        let local_path = PathBuf::from(".hanchk.toml");
        if local_path.exists() {
            config = config.merge(Self::from_file(&local_path)?);
        }

        config.apply_env();
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn merge(mut self, other: Self) -> Self {
        if other.service_url.is_some() {
            self.service_url = other.service_url;
        }
        if other.shared_secret.is_some() {
            self.shared_secret = other.shared_secret;
        }
        if other.terms_url.is_some() {
            self.terms_url = other.terms_url;
        }
        if !other.protected_terms.is_empty() {
            self.protected_terms = other.protected_terms;
        }
        if other.mode.is_some() {
            self.mode = other.mode;
        }
        if other.domain.is_some() {
            self.domain = other.domain;
        }
        self
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("HANCHK_SERVICE_URL") {
            if !url.trim().is_empty() {
                self.service_url = Some(url);
            }
        }
        if let Ok(secret) = std::env::var("HANCHK_SHARED_SECRET") {
            if !secret.trim().is_empty() {
                self.shared_secret = Some(secret);
            }
        }
        if let Ok(url) = std::env::var("HANCHK_TERMS_URL") {
            if !url.trim().is_empty() {
                self.terms_url = Some(url);
            }
        }
        if let Ok(terms) = std::env::var("HANCHK_PROTECTED_TERMS") {
            let extra: Vec<String> = terms
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect();
            if !extra.is_empty() {
                self.protected_terms.extend(extra);
            }
        }
    }

    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "hanchk").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_local_only() {
        let config = Config::default();
        assert!(config.service_url.is_none());
        assert!(config.terms_url.is_none());
        assert!(config.protected_terms.is_empty());
    }

    #[test]
    fn test_merge_overrides_set_fields() {
        let base = Config::default();
        let overlay = Config {
            service_url: Some("http://svc:8000".into()),
            protected_terms: vec!["우리밴드".into()],
            mode: Some(Mode::Strict),
            ..Default::default()
        };
        let merged = base.merge(overlay);
        assert_eq!(merged.service_url.as_deref(), Some("http://svc:8000"));
        assert_eq!(merged.protected_terms, vec!["우리밴드".to_string()]);
        assert_eq!(merged.mode, Some(Mode::Strict));
        assert!(merged.shared_secret.is_none());
    }

    #[test]
    fn test_parse_toml() {
        let config: Config = toml::from_str(
            r#"
            service_url = "http://localhost:8000"
            protected_terms = ["타이틀곡", "데모"]
            mode = "fast"
            "#,
        )
        .unwrap();
        assert_eq!(config.mode, Some(Mode::Fast));
        assert_eq!(config.protected_terms.len(), 2);
    }
}
