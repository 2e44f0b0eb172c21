//! Practice session state machine.
//!
//! The learner sees a word's definition and types the word. A correct answer
//! retires that queue entry; a wrong one puts a copy of the word back a few
//! positions ahead. The session ends once the queue is exhausted and every
//! word it started with has been answered correctly at least once.

use super::fsrs::{Rating, Scheduler};
use super::legacy::update_legacy;
use super::progress::Progress;
use super::{ReviewState, Word, normalize};
use crate::config::{RequeueOffset, SchedulerConfig, SchedulerKind};
use crate::error::{Result, SchedulerError};
use crate::persistence::{ReviewUpdate, ReviewWriter};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Presenting { index: usize },
    Completed,
    /// Queue ran out with unmastered words left. Requeueing prevents this
    /// for sessions driven only through `submit_answer`/`advance`.
    Exhausted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub rating: Rating,
    /// The term that was expected, as stored.
    pub expected: String,
    pub review: ReviewState,
    /// First correct answer for this word in the session.
    pub newly_mastered: bool,
    /// Queue position of the re-inserted copy after a miss.
    pub requeued_at: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionResults {
    pub mastered_count: usize,
    pub correct_count: u32,
    pub total_attempts: u32,
    pub accuracy: f64,
}

pub struct QuizSession<R = StdRng> {
    words: Vec<Word>,
    queue: Vec<usize>,
    index: usize,
    mastered_terms: HashSet<String>,
    correct_count: u32,
    total_attempts: u32,
    start_snapshot: HashSet<String>,
    initialized: bool,
    scheduler: Scheduler,
    kind: SchedulerKind,
    requeue: RequeueOffset,
    rng: R,
    writer: Option<ReviewWriter>,
}

impl QuizSession<StdRng> {
    pub fn new(config: &SchedulerConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }
}

impl<R: Rng> QuizSession<R> {
    pub fn with_rng(config: &SchedulerConfig, rng: R) -> Self {
        Self {
            words: Vec::new(),
            queue: Vec::new(),
            index: 0,
            mastered_terms: HashSet::new(),
            correct_count: 0,
            total_attempts: 0,
            start_snapshot: HashSet::new(),
            initialized: false,
            scheduler: Scheduler::from_config(config),
            kind: config.scheduler,
            requeue: config.requeue_offset,
            rng,
            writer: None,
        }
    }

    /// Review outcomes are handed to `writer` as they happen.
    pub fn attach_writer(&mut self, writer: ReviewWriter) {
        self.writer = Some(writer);
    }

    /// Starts over with `words`, discarding any previous queue and counters.
    /// Words with a blank term are dropped.
    pub fn initialize(&mut self, words: Vec<Word>) {
        self.words = words.into_iter().filter(|w| !w.is_malformed()).collect();
        self.queue = (0..self.words.len()).collect();
        self.index = 0;
        self.mastered_terms.clear();
        self.correct_count = 0;
        self.total_attempts = 0;
        self.start_snapshot = self.words.iter().map(Word::key).collect();
        self.initialized = true;

        info!(
            words = self.words.len(),
            distinct = self.start_snapshot.len(),
            "quiz session initialized"
        );
    }

    pub fn current_question(&self) -> Option<&Word> {
        self.queue.get(self.index).map(|&slot| &self.words[slot])
    }

    pub fn submit_answer(&mut self, raw_input: &str, elapsed_ms: u64) -> Result<AnswerOutcome> {
        self.submit_answer_at(raw_input, elapsed_ms, Utc::now())
    }

    pub fn submit_answer_at(
        &mut self,
        raw_input: &str,
        elapsed_ms: u64,
        now: DateTime<Utc>,
    ) -> Result<AnswerOutcome> {
        let slot = *self
            .queue
            .get(self.index)
            .ok_or(SchedulerError::NoActiveQuestion)?;

        let key = self.words[slot].key();
        let correct = normalize(raw_input) == key;
        self.total_attempts += 1;

        let rating = self.scheduler.determine_rating(correct, elapsed_ms);
        let review = self.next_review_state(&self.words[slot].review, correct, rating, now);
        self.words[slot].review = review.clone();

        let expected = self.words[slot].term.clone();
        if let Some(writer) = &self.writer {
            writer.submit(ReviewUpdate {
                term: expected.clone(),
                state: review.clone(),
            });
        }

        let mut newly_mastered = false;
        let mut requeued_at = None;
        if correct {
            newly_mastered = self.mastered_terms.insert(key);
            self.correct_count += 1;
        } else {
            requeued_at = Some(self.requeue_current(slot));
        }
        self.index += 1;

        debug!(term = %expected, correct, ?rating, ?requeued_at, "answer submitted");

        Ok(AnswerOutcome {
            correct,
            rating,
            expected,
            review,
            newly_mastered,
            requeued_at,
        })
    }

    /// Skips the current word without grading it. The word comes back later
    /// exactly as after a miss.
    pub fn advance(&mut self) -> Result<()> {
        let slot = *self
            .queue
            .get(self.index)
            .ok_or(SchedulerError::NoActiveQuestion)?;
        self.requeue_current(slot);
        self.index += 1;
        Ok(())
    }

    fn requeue_current(&mut self, slot: usize) -> usize {
        let low = self.requeue.min;
        let step = self.rng.random_range(low..=self.requeue.max.max(low));
        let position = (self.index + step).min(self.queue.len());
        self.queue.insert(position, slot);
        position
    }

    fn next_review_state(
        &self,
        state: &ReviewState,
        correct: bool,
        rating: Rating,
        now: DateTime<Utc>,
    ) -> ReviewState {
        match (self.kind, state) {
            (SchedulerKind::Legacy, ReviewState::Legacy(legacy)) => {
                ReviewState::Legacy(update_legacy(legacy, correct, now))
            }
            _ => ReviewState::Rich(
                self.scheduler
                    .calculate_next_review(&state.to_rich(), rating, now),
            ),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.initialized
            && self.index >= self.queue.len()
            && self.start_snapshot.is_subset(&self.mastered_terms)
    }

    pub fn status(&self) -> SessionStatus {
        if !self.initialized {
            SessionStatus::Idle
        } else if self.index < self.queue.len() {
            SessionStatus::Presenting { index: self.index }
        } else if self.is_complete() {
            SessionStatus::Completed
        } else {
            SessionStatus::Exhausted
        }
    }

    pub fn results(&self) -> SessionResults {
        let accuracy = if self.total_attempts > 0 {
            self.correct_count as f64 / self.total_attempts as f64
        } else {
            0.0
        };
        SessionResults {
            mastered_count: self.mastered_terms.len(),
            correct_count: self.correct_count,
            total_attempts: self.total_attempts,
            accuracy,
        }
    }

    pub fn progress(&self) -> Progress {
        Progress::new(
            self.index,
            self.queue.len(),
            self.mastered_terms.len(),
            self.start_snapshot.len(),
        )
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Terms in queue order, including requeued copies.
    pub fn queued_terms(&self) -> Vec<&str> {
        self.queue
            .iter()
            .map(|&slot| self.words[slot].term.as_str())
            .collect()
    }

    pub fn mastered_terms(&self) -> &HashSet<String> {
        &self.mastered_terms
    }

    /// Words of this session with their latest in-session review state.
    pub fn words(&self) -> &[Word] {
        &self.words
    }
}
