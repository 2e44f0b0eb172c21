//! Stability/difficulty memory model (FSRS-style).
//!
//! Each review moves a word's stability (days until recall probability
//! falls to 90%) and difficulty (1-10) according to the rating, and the next
//! interval is derived from the new stability:
//! - Again: stability collapses, interval is a quarter of it
//! - Hard: stability grows slowly
//! - Good / Easy: stability grows, more slowly for difficult words
//!
//! Reviews that happen well after their due date get a forgetting correction
//! on the interval.

use super::review_state::{
    DEFAULT_DIFFICULTY, MAX_DIFFICULTY, MAX_STABILITY, MIN_DIFFICULTY, MIN_STABILITY, RichState,
};
use crate::config::{RatingThresholds, SchedulerConfig};
use crate::error::SchedulerError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_INTERVAL_DAYS: u32 = 36500;
pub const DEFAULT_RETENTION: f64 = 0.9;

/// Model weights.
pub const WEIGHTS: [f64; 17] = [
    0.4,   // w0: Again stability base
    0.6,   // w1: Again stability exponent
    0.1,   // w2: Again difficulty effect
    1.2,   // w3: Hard stability multiplier
    2.5,   // w4: Good stability multiplier
    0.05,  // w5: Good difficulty effect
    3.5,   // w6: Easy stability multiplier
    0.05,  // w7: Easy difficulty effect
    1.0,   // w8: Again difficulty delta
    0.5,   // w9: Hard difficulty delta
    -0.25, // w10: Good difficulty delta
    -1.0,  // w11: Easy difficulty delta
    0.9,   // w12: overdue interval factor
    0.02,  // w13: overdue growth per day
    1.0,   // w14: stability assumed for a word never reviewed
    5.0,   // w15: difficulty assumed when the stored one is unusable
    0.25,  // w16: share of stability used as the interval after Again
];

/// Recall quality, derived from correctness and response time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Rating {
    Again = 1,
    Hard = 2,
    Good = 3,
    Easy = 4,
}

impl Rating {
    fn index(self) -> usize {
        self as usize - 1
    }
}

impl TryFrom<u8> for Rating {
    type Error = SchedulerError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Rating::Again),
            2 => Ok(Rating::Hard),
            3 => Ok(Rating::Good),
            4 => Ok(Rating::Easy),
            other => Err(SchedulerError::InvalidRating(other)),
        }
    }
}

/// Weights, rating thresholds and interval cap bundled together.
#[derive(Debug, Clone, PartialEq)]
pub struct Scheduler {
    pub weights: [f64; 17],
    pub max_interval_days: u32,
    pub thresholds: RatingThresholds,
}

const DEFAULT_SCHEDULER: Scheduler = Scheduler {
    weights: WEIGHTS,
    max_interval_days: MAX_INTERVAL_DAYS,
    thresholds: RatingThresholds {
        easy_ms: 2000,
        good_ms: 5000,
    },
};

impl Default for Scheduler {
    fn default() -> Self {
        DEFAULT_SCHEDULER
    }
}

impl Scheduler {
    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self {
            weights: WEIGHTS,
            max_interval_days: config.max_interval_days.min(MAX_INTERVAL_DAYS),
            thresholds: config.rating_thresholds,
        }
    }

    pub fn determine_rating(&self, correct: bool, response_time_ms: u64) -> Rating {
        if !correct {
            Rating::Again
        } else if response_time_ms < self.thresholds.easy_ms {
            Rating::Easy
        } else if response_time_ms < self.thresholds.good_ms {
            Rating::Good
        } else {
            Rating::Hard
        }
    }

    pub fn calculate_stability(&self, stability: f64, difficulty: f64, rating: Rating) -> f64 {
        let w = &self.weights;
        let s = sanitize_stability(stability);
        let d = sanitize_difficulty(difficulty, w[15]);

        let next = match rating {
            Rating::Again => w[0] * s.powf(w[1]) * ((1.0 - d) * w[2]).exp(),
            Rating::Hard => s * w[3],
            Rating::Good => s * w[4] * ((1.0 - d) * w[5]).exp(),
            Rating::Easy => s * w[6] * ((1.0 - d) * w[7]).exp(),
        };

        if next.is_nan() {
            return MIN_STABILITY;
        }
        next.clamp(MIN_STABILITY, MAX_STABILITY)
    }

    pub fn calculate_difficulty(&self, difficulty: f64, rating: Rating) -> f64 {
        let d = sanitize_difficulty(difficulty, self.weights[15]);
        (d + self.weights[8 + rating.index()]).clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
    }

    /// Applies one review at `now` and returns the resulting state.
    pub fn calculate_next_review(
        &self,
        state: &RichState,
        rating: Rating,
        now: DateTime<Utc>,
    ) -> RichState {
        let w = &self.weights;

        let prior_stability = if state.stability.is_finite() && state.stability > 0.0 {
            state.stability
        } else {
            w[14]
        };
        let prior_difficulty = sanitize_difficulty(state.difficulty, w[15]);

        let stability = self.calculate_stability(prior_stability, prior_difficulty, rating);
        let difficulty = self.calculate_difficulty(prior_difficulty, rating);

        let mut interval = if rating == Rating::Again {
            (stability * w[16]).round()
        } else {
            stability.round()
        };

        let elapsed = match state.last_review {
            Some(last) => (now - last).num_days().max(0) as u32,
            None => state.elapsed_days,
        };
        if state.scheduled_days > 0 && elapsed > state.scheduled_days {
            let overdue = (elapsed - state.scheduled_days) as f64;
            interval = (interval * w[12] * (overdue * w[13]).exp()).round();
        }

        let interval = if interval.is_finite() {
            interval.clamp(0.0, self.max_interval_days as f64) as u32
        } else {
            self.max_interval_days
        };

        let reps = state.reps.saturating_add(1);
        let lapses = if rating == Rating::Again {
            state.lapses.saturating_add(1)
        } else {
            state.lapses
        };

        RichState {
            stability,
            difficulty,
            elapsed_days: interval,
            scheduled_days: interval,
            reps,
            lapses: lapses.min(reps),
            last_review: Some(now),
            next_review: Some(now + Duration::days(interval as i64)),
        }
    }

    /// Days until recall probability falls to `target_retention`.
    pub fn get_optimal_interval(&self, stability: f64, target_retention: f64) -> u32 {
        if !stability.is_finite() || stability <= 0.0 {
            return 1;
        }
        let target = if target_retention.is_finite() {
            target_retention.clamp(0.01, 0.99)
        } else {
            DEFAULT_RETENTION
        };

        let days = stability * target.ln() / DEFAULT_RETENTION.ln();
        days.round().clamp(1.0, self.max_interval_days as f64) as u32
    }
}

fn sanitize_stability(stability: f64) -> f64 {
    if stability.is_nan() {
        MIN_STABILITY
    } else {
        stability.clamp(0.0, MAX_STABILITY)
    }
}

fn sanitize_difficulty(difficulty: f64, fallback: f64) -> f64 {
    if difficulty.is_finite() {
        difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
    } else if fallback.is_finite() {
        fallback
    } else {
        DEFAULT_DIFFICULTY
    }
}

pub fn determine_rating(correct: bool, response_time_ms: u64) -> Rating {
    DEFAULT_SCHEDULER.determine_rating(correct, response_time_ms)
}

pub fn calculate_stability(stability: f64, difficulty: f64, rating: Rating) -> f64 {
    DEFAULT_SCHEDULER.calculate_stability(stability, difficulty, rating)
}

pub fn calculate_difficulty(difficulty: f64, rating: Rating) -> f64 {
    DEFAULT_SCHEDULER.calculate_difficulty(difficulty, rating)
}

pub fn calculate_next_review(state: &RichState, rating: Rating, now: DateTime<Utc>) -> RichState {
    DEFAULT_SCHEDULER.calculate_next_review(state, rating, now)
}

pub fn get_optimal_interval(stability: f64, target_retention: f64) -> u32 {
    DEFAULT_SCHEDULER.get_optimal_interval(stability, target_retention)
}

/// Probability of recall after `elapsed_days` for a word with `stability`.
/// Analytics only; scheduling never consults it.
pub fn calculate_retention_probability(stability: f64, elapsed_days: f64) -> f64 {
    if stability.is_nan() || stability <= 0.0 || !elapsed_days.is_finite() {
        return 0.0;
    }
    (DEFAULT_RETENTION.ln() * elapsed_days.max(0.0) / stability)
        .exp()
        .clamp(0.0, 1.0)
}
