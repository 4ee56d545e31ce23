pub mod cli;
pub mod config;
pub mod normalize;
pub mod pipeline;
pub mod profanity;
pub mod provider;
pub mod rules;

pub use config::Config;
pub use pipeline::{CheckRequest, CheckResponse, SpellcheckEngine};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How aggressively the pipeline accepts suggestions. The mode sets the
/// confidence floor applied by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Strict,
    Balanced,
    Fast,
}

impl Mode {
    /// Minimum confidence a suggestion needs to survive resolution.
    pub fn threshold(self) -> f64 {
        match self {
            Mode::Strict => 0.45,
            Mode::Balanced => 0.60,
            Mode::Fast => 0.75,
        }
    }
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Balanced
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(Mode::Strict),
            "balanced" => Ok(Mode::Balanced),
            "fast" => Ok(Mode::Fast),
            _ => Err(format!("Unknown mode: {}", s)),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Strict => write!(f, "strict"),
            Mode::Balanced => write!(f, "balanced"),
            Mode::Fast => write!(f, "fast"),
        }
    }
}

/// Vocabulary domain of the input text. Music widens the protected-term set
/// with release/format jargon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    General,
    Music,
}

impl Default for Domain {
    fn default() -> Self {
        Domain::General
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "general" => Ok(Domain::General),
            "music" => Ok(Domain::Music),
            _ => Err(format!("Unknown domain: {}", s)),
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::General => write!(f, "general"),
            Domain::Music => write!(f, "music"),
        }
    }
}

/// Classification of a correction, used for protected-span exemptions and
/// display grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionType {
    Spacing,
    Orthography,
    Punctuation,
    Foreign,
    Style,
    Custom,
}

/// A resolved, externally visible correction. `start`/`end` are byte offsets
/// into the (possibly truncated) working text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: String,
    pub start: usize,
    pub end: usize,
    pub original: String,
    pub replacement: String,
    #[serde(rename = "type")]
    pub kind: SuggestionType,
    pub confidence: f64,
    pub message: String,
    pub source: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_thresholds() {
        assert_eq!(Mode::Strict.threshold(), 0.45);
        assert_eq!(Mode::Balanced.threshold(), 0.60);
        assert_eq!(Mode::Fast.threshold(), 0.75);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("strict".parse::<Mode>().unwrap(), Mode::Strict);
        assert_eq!("BALANCED".parse::<Mode>().unwrap(), Mode::Balanced);
        assert!("loose".parse::<Mode>().is_err());
    }

    #[test]
    fn test_domain_parsing() {
        assert_eq!("music".parse::<Domain>().unwrap(), Domain::Music);
        assert_eq!(Domain::default(), Domain::General);
    }
}
