//! Legacy ease-factor scheduler and its one-way conversion to the
//! stability/difficulty model.
//!
//! - The first correct answer schedules the word for tomorrow
//! - The second correct answer schedules it 3 days out
//! - After that the interval grows by the ease factor, capped at a year; a
//!   word coming back from a lapse grows from one day
//! - A wrong answer makes the word due immediately and lowers the ease factor

use super::review_state::{
    DEFAULT_DIFFICULTY, DEFAULT_EASE_FACTOR, LegacyState, MAX_EASE_FACTOR, MAX_LEGACY_INTERVAL,
    MIN_EASE_FACTOR, RichState,
};
use chrono::{DateTime, Duration, Utc};

const EASE_BONUS: f64 = 0.1;
const EASE_PENALTY: f64 = 0.2;

/// Applies one answer to a legacy state.
pub fn update_legacy(state: &LegacyState, correct: bool, now: DateTime<Utc>) -> LegacyState {
    let ease = if state.ease_factor.is_finite() {
        state.ease_factor.clamp(MIN_EASE_FACTOR, MAX_EASE_FACTOR)
    } else {
        DEFAULT_EASE_FACTOR
    };
    let interval = state.interval.min(MAX_LEGACY_INTERVAL);

    let (new_interval, new_ease) = if correct {
        let next = match state.correct {
            0 => 1,
            1 => 3,
            _ => ((interval.max(1) as f64 * ease).round() as u32).min(MAX_LEGACY_INTERVAL),
        };
        (next, (ease + EASE_BONUS).min(MAX_EASE_FACTOR))
    } else {
        (0, (ease - EASE_PENALTY).max(MIN_EASE_FACTOR))
    };

    let reps = state.reps.saturating_add(1);
    let correct_count = if correct {
        state.correct.saturating_add(1)
    } else {
        state.correct
    };

    LegacyState {
        interval: new_interval,
        ease_factor: new_ease,
        reps,
        correct: correct_count.min(reps),
        next_review: Some(now + Duration::days(new_interval as i64)),
    }
}

/// Maps a legacy state onto the rich model. Used once per word, the first
/// time it is reviewed after the migration.
pub fn convert_legacy_to_rich(legacy: &LegacyState) -> RichState {
    let interval = legacy.interval.min(MAX_LEGACY_INTERVAL);
    let correct = legacy.correct.min(legacy.reps);

    let stability = match legacy.reps {
        0 => 0.0,
        1 => (interval as f64 * 0.8).max(1.0),
        _ => (interval as f64 * 0.9).max(1.0),
    };

    let difficulty = if legacy.reps == 0 {
        DEFAULT_DIFFICULTY
    } else {
        let accuracy = correct as f64 / legacy.reps as f64;
        if accuracy > 0.9 {
            3.0
        } else if accuracy > 0.7 {
            5.0
        } else if accuracy > 0.5 {
            7.0
        } else {
            9.0
        }
    };

    RichState {
        stability,
        difficulty,
        elapsed_days: interval,
        scheduled_days: interval,
        reps: legacy.reps,
        lapses: legacy.reps - correct,
        last_review: legacy
            .next_review
            .map(|next| next - Duration::days(interval as i64)),
        next_review: legacy.next_review,
    }
}
