//! Per-word review state in its two interchangeable shapes.
//!
//! Words imported from the old ease-factor scheduler still carry a
//! [`LegacyState`]; everything reviewed since then carries a [`RichState`].
//! Conversion only goes from legacy to rich.

use super::legacy::convert_legacy_to_rich;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MIN_EASE_FACTOR: f64 = 1.3;
pub const MAX_EASE_FACTOR: f64 = 3.0;
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;
pub const MAX_LEGACY_INTERVAL: u32 = 365;

pub const MIN_STABILITY: f64 = 0.1;
pub const MAX_STABILITY: f64 = 36500.0;
pub const MIN_DIFFICULTY: f64 = 1.0;
pub const MAX_DIFFICULTY: f64 = 10.0;
pub const DEFAULT_DIFFICULTY: f64 = 5.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LegacyState {
    pub interval: u32,
    pub ease_factor: f64,
    pub reps: u32,
    pub correct: u32,
    pub next_review: Option<DateTime<Utc>>,
}

impl Default for LegacyState {
    fn default() -> Self {
        Self {
            interval: 0,
            ease_factor: DEFAULT_EASE_FACTOR,
            reps: 0,
            correct: 0,
            next_review: None,
        }
    }
}

/// Stability/difficulty state. `stability == 0` means the word has never
/// been reviewed under this model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RichState {
    pub stability: f64,
    pub difficulty: f64,
    pub elapsed_days: u32,
    pub scheduled_days: u32,
    pub reps: u32,
    pub lapses: u32,
    pub last_review: Option<DateTime<Utc>>,
    pub next_review: Option<DateTime<Utc>>,
}

impl Default for RichState {
    fn default() -> Self {
        Self {
            stability: 0.0,
            difficulty: DEFAULT_DIFFICULTY,
            elapsed_days: 0,
            scheduled_days: 0,
            reps: 0,
            lapses: 0,
            last_review: None,
            next_review: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "lowercase")]
pub enum ReviewState {
    Legacy(LegacyState),
    Rich(RichState),
}

impl Default for ReviewState {
    fn default() -> Self {
        ReviewState::Rich(RichState::default())
    }
}

impl ReviewState {
    pub fn reps(&self) -> u32 {
        match self {
            ReviewState::Legacy(s) => s.reps,
            ReviewState::Rich(s) => s.reps,
        }
    }

    pub fn next_review(&self) -> Option<DateTime<Utc>> {
        match self {
            ReviewState::Legacy(s) => s.next_review,
            ReviewState::Rich(s) => s.next_review,
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, ReviewState::Legacy(_))
    }

    /// Rich view of this state. Converting an already rich state is a no-op.
    pub fn to_rich(&self) -> RichState {
        match self {
            ReviewState::Legacy(s) => convert_legacy_to_rich(s),
            ReviewState::Rich(s) => s.clone(),
        }
    }

    pub fn into_rich(self) -> ReviewState {
        match self {
            ReviewState::Legacy(s) => ReviewState::Rich(convert_legacy_to_rich(&s)),
            rich => rich,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_rich_and_unreviewed() {
        let state = ReviewState::default();
        assert!(!state.is_legacy());
        assert_eq!(state.reps(), 0);
        assert_eq!(state.next_review(), None);
    }

    #[test]
    fn test_into_rich_is_idempotent() {
        let legacy = ReviewState::Legacy(LegacyState {
            interval: 10,
            ease_factor: 2.3,
            reps: 4,
            correct: 3,
            next_review: None,
        });

        let once = legacy.into_rich();
        let twice = once.clone().into_rich();
        assert!(!once.is_legacy());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_serde_tagging() {
        let json = serde_json::to_string(&ReviewState::Legacy(LegacyState::default())).unwrap();
        assert!(json.contains(r#""model":"legacy""#));

        let back: ReviewState = serde_json::from_str(&json).unwrap();
        assert!(back.is_legacy());
    }
}
