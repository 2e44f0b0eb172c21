//! Scheduler configuration.
//!
//! Defaults match the behaviour of the study app; a config file (TOML or JSON)
//! or `VOCAB_*` environment variables can override individual values.

use crate::error::{Result, SchedulerError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Preference key under which the repository stores the chosen session size.
pub const SESSION_SIZE_KEY: &str = "session_size";

/// Number of words in one practice session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(try_from = "usize", into = "usize")]
pub enum SessionSize {
    #[default]
    Short,
    Long,
}

impl SessionSize {
    pub fn count(self) -> usize {
        match self {
            SessionSize::Short => 25,
            SessionSize::Long => 50,
        }
    }
}

impl TryFrom<usize> for SessionSize {
    type Error = SchedulerError;

    fn try_from(value: usize) -> Result<Self> {
        match value {
            25 => Ok(SessionSize::Short),
            50 => Ok(SessionSize::Long),
            other => Err(SchedulerError::Configuration(format!(
                "session size must be 25 or 50, got {other}"
            ))),
        }
    }
}

impl From<SessionSize> for usize {
    fn from(size: SessionSize) -> usize {
        size.count()
    }
}

impl FromStr for SessionSize {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self> {
        let value: usize = s
            .trim()
            .parse()
            .map_err(|_| SchedulerError::Configuration(format!("not a session size: {s:?}")))?;
        SessionSize::try_from(value)
    }
}

impl fmt::Display for SessionSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.count())
    }
}

/// Which memory model updates words that are still in the legacy shape.
/// Rich states always go through the FSRS-style model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerKind {
    #[default]
    Fsrs,
    Legacy,
}

/// How far ahead (in queue positions) a missed word is re-inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequeueOffset {
    pub min: usize,
    pub max: usize,
}

impl Default for RequeueOffset {
    fn default() -> Self {
        Self { min: 2, max: 8 }
    }
}

/// Response-time boundaries used to turn a correct answer into a rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingThresholds {
    /// Correct answers faster than this are `Easy`.
    pub easy_ms: u64,
    /// Correct answers faster than this (but not easy) are `Good`, slower ones `Hard`.
    pub good_ms: u64,
}

impl Default for RatingThresholds {
    fn default() -> Self {
        Self {
            easy_ms: 2000,
            good_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Used when no session size preference has been stored yet.
    pub session_size: SessionSize,
    /// Sessions are refused below this many usable words.
    pub min_session_items: usize,
    pub requeue_offset: RequeueOffset,
    /// Lifetime of the cached (all words, due words) pair.
    pub cache_ttl_secs: u64,
    pub max_interval_days: u32,
    pub rating_thresholds: RatingThresholds,
    pub scheduler: SchedulerKind,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            session_size: SessionSize::default(),
            min_session_items: 3,
            requeue_offset: RequeueOffset::default(),
            cache_ttl_secs: 300,
            max_interval_days: 36500,
            rating_thresholds: RatingThresholds::default(),
            scheduler: SchedulerKind::default(),
        }
    }
}

impl SchedulerConfig {
    /// Load configuration from a `.toml` or `.json` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        let config: Self = match ext {
            Some("toml") => toml::from_str(&content)
                .map_err(|e| SchedulerError::Configuration(e.to_string()))?,
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| SchedulerError::Configuration(e.to_string()))?,
            _ => {
                return Err(SchedulerError::Configuration(
                    "Unsupported config file format. Use .toml or .json".to_string(),
                ));
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `VOCAB_SESSION_SIZE`, `VOCAB_MIN_ITEMS` and
    /// `VOCAB_CACHE_TTL_SECS`. Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(size) = std::env::var("VOCAB_SESSION_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            config.session_size = size;
        }
        if let Some(min) = std::env::var("VOCAB_MIN_ITEMS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            config.min_session_items = min;
        }
        if let Some(ttl) = std::env::var("VOCAB_CACHE_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            config.cache_ttl_secs = ttl;
        }

        config
    }

    pub fn validate(&self) -> Result<()> {
        if self.requeue_offset.min == 0 || self.requeue_offset.min > self.requeue_offset.max {
            return Err(SchedulerError::Configuration(format!(
                "requeue offset range {}..={} is invalid",
                self.requeue_offset.min, self.requeue_offset.max
            )));
        }
        if self.min_session_items == 0 {
            return Err(SchedulerError::Configuration(
                "min_session_items must be at least 1".to_string(),
            ));
        }
        if self.rating_thresholds.easy_ms > self.rating_thresholds.good_ms {
            return Err(SchedulerError::Configuration(
                "easy_ms must not exceed good_ms".to_string(),
            ));
        }
        if self.max_interval_days == 0 {
            return Err(SchedulerError::Configuration(
                "max_interval_days must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
