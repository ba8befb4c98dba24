use std::path::PathBuf;

use serde::Deserialize;

use crate::error::CanonError;
use crate::rank::DEFAULT_LIMIT;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchConfig {
    #[serde(default)]
    pub thresholds: Thresholds,
    /// Candidates offered per input.
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub key_mode: KeyMode,
    /// Extra prompts allowed after an out-of-range selection.
    #[serde(default = "default_max_reprompts")]
    pub max_reprompts: usize,
    /// Vocabulary file, relative to the config file's directory.
    #[serde(default)]
    pub vocabulary: Option<PathBuf>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            limit: DEFAULT_LIMIT,
            key_mode: KeyMode::default(),
            max_reprompts: default_max_reprompts(),
            vocabulary: None,
        }
    }
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

fn default_max_reprompts() -> usize {
    3
}

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Similarity tiers. `>= auto` applies without asking, `>= ask` asks for
/// confirmation, anything lower goes straight to selection.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Thresholds {
    #[serde(default = "default_auto")]
    pub auto: f64,
    #[serde(default = "default_ask")]
    pub ask: f64,
}

pub const AUTO_THRESHOLD: f64 = 0.85;
pub const ASK_THRESHOLD: f64 = 0.60;

fn default_auto() -> f64 {
    AUTO_THRESHOLD
}

fn default_ask() -> f64 {
    ASK_THRESHOLD
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            auto: AUTO_THRESHOLD,
            ask: ASK_THRESHOLD,
        }
    }
}

// ---------------------------------------------------------------------------
// Memo key mode
// ---------------------------------------------------------------------------

/// How raw inputs are compared when deduplicating within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyMode {
    #[default]
    CaseSensitive,
    /// Unicode lowercase folding. No effect on CJK text.
    CaseInsensitive,
}

impl KeyMode {
    pub fn key(&self, trimmed: &str) -> String {
        match self {
            Self::CaseSensitive => trimmed.to_string(),
            Self::CaseInsensitive => trimmed.to_lowercase(),
        }
    }
}

impl std::fmt::Display for KeyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CaseSensitive => write!(f, "case_sensitive"),
            Self::CaseInsensitive => write!(f, "case_insensitive"),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl MatchConfig {
    pub fn from_toml(input: &str) -> Result<Self, CanonError> {
        let config: MatchConfig =
            toml::from_str(input).map_err(|e| CanonError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CanonError> {
        let Thresholds { auto, ask } = self.thresholds;

        for (name, value) in [("auto", auto), ("ask", ask)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(CanonError::ConfigValidation(format!(
                    "thresholds.{name} must be within 0.0..=1.0, got {value}"
                )));
            }
        }

        if ask > auto {
            return Err(CanonError::ConfigValidation(format!(
                "thresholds.ask ({ask}) must not exceed thresholds.auto ({auto})"
            )));
        }

        if self.limit == 0 {
            return Err(CanonError::ConfigValidation("limit must be at least 1".into()));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
