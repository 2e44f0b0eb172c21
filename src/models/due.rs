//! Due-date classification for status displays.

use super::ReviewState;
use chrono::{DateTime, Utc};
use serde::Serialize;

const MS_PER_DAY: f64 = 86_400_000.0;
const MASTERED_STABILITY: f64 = 21.0;
const MASTERED_INTERVAL: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WordStatus {
    New,
    Learning,
    Mastered,
    Overdue,
}

/// "Due in N days" badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "days", rename_all = "lowercase")]
pub enum DueBadge {
    /// Never scheduled.
    New,
    Overdue(u32),
    Today,
    Upcoming(u32),
}

pub fn is_due(state: &ReviewState, now: DateTime<Utc>) -> bool {
    match state.next_review() {
        None => true,
        Some(next) => next <= now,
    }
}

/// Whole days until the next review, rounded up. Negative when overdue.
fn days_until(next: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let ms = (next - now).num_milliseconds() as f64;
    (ms / MS_PER_DAY).ceil() as i64
}

pub fn classify(state: &ReviewState, now: DateTime<Utc>) -> WordStatus {
    if state.reps() == 0 {
        return WordStatus::New;
    }

    if is_due(state, now) {
        if let Some(next) = state.next_review() {
            if days_until(next, now) < 0 {
                return WordStatus::Overdue;
            }
        }
    }

    let interval = match state {
        ReviewState::Rich(rich) if rich.stability > 0.0 => {
            return if rich.stability >= MASTERED_STABILITY {
                WordStatus::Mastered
            } else {
                WordStatus::Learning
            };
        }
        ReviewState::Rich(rich) => rich.scheduled_days,
        ReviewState::Legacy(legacy) => legacy.interval,
    };

    if interval >= MASTERED_INTERVAL {
        WordStatus::Mastered
    } else {
        WordStatus::Learning
    }
}

pub fn due_badge(state: &ReviewState, now: DateTime<Utc>) -> DueBadge {
    let Some(next) = state.next_review() else {
        return DueBadge::New;
    };

    let days = days_until(next, now);
    if days < 0 {
        DueBadge::Overdue(days.unsigned_abs() as u32)
    } else if days == 0 {
        DueBadge::Today
    } else {
        DueBadge::Upcoming(days as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LegacyState, RichState};
    use chrono::Duration;

    fn rich(stability: f64, reps: u32, next_review: Option<DateTime<Utc>>) -> ReviewState {
        ReviewState::Rich(RichState {
            stability,
            reps,
            next_review,
            ..Default::default()
        })
    }

    #[test]
    fn test_unreviewed_is_new() {
        let now = Utc::now();
        assert_eq!(classify(&ReviewState::default(), now), WordStatus::New);
        assert_eq!(due_badge(&ReviewState::default(), now), DueBadge::New);
        assert!(is_due(&ReviewState::default(), now));
    }

    #[test]
    fn test_high_stability_is_mastered() {
        let now = Utc::now();
        let state = rich(25.0, 5, Some(now + Duration::days(20)));
        assert_eq!(classify(&state, now), WordStatus::Mastered);
        assert!(!is_due(&state, now));
    }

    #[test]
    fn test_low_stability_is_learning() {
        let now = Utc::now();
        let state = rich(4.0, 2, Some(now + Duration::days(4)));
        assert_eq!(classify(&state, now), WordStatus::Learning);
    }

    #[test]
    fn test_yesterday_is_overdue() {
        let now = Utc::now();
        let state = rich(25.0, 5, Some(now - Duration::days(1)));

        assert!(is_due(&state, now));
        assert_eq!(due_badge(&state, now), DueBadge::Overdue(1));
        assert_eq!(classify(&state, now), WordStatus::Overdue);
    }

    #[test]
    fn test_due_earlier_today_is_not_overdue() {
        let now = Utc::now();
        let state = rich(3.0, 2, Some(now - Duration::hours(5)));

        assert!(is_due(&state, now));
        assert_eq!(due_badge(&state, now), DueBadge::Today);
        assert_eq!(classify(&state, now), WordStatus::Learning);
    }

    #[test]
    fn test_upcoming_badge_rounds_up() {
        let now = Utc::now();
        let state = rich(3.0, 2, Some(now + Duration::hours(30)));
        assert_eq!(due_badge(&state, now), DueBadge::Upcoming(2));
    }

    #[test]
    fn test_legacy_fallback() {
        let now = Utc::now();
        let long = ReviewState::Legacy(LegacyState {
            interval: 45,
            reps: 6,
            correct: 6,
            next_review: Some(now + Duration::days(45)),
            ..Default::default()
        });
        let short = ReviewState::Legacy(LegacyState {
            interval: 12,
            reps: 4,
            correct: 4,
            next_review: Some(now + Duration::days(12)),
            ..Default::default()
        });

        assert_eq!(classify(&long, now), WordStatus::Mastered);
        assert_eq!(classify(&short, now), WordStatus::Learning);
    }
}
