//! Display counters derived from a quiz session.
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// 1-based position of the current question, 0 for an empty session.
    pub current: usize,
    /// Live queue length, requeued copies included.
    pub total: usize,
    /// Questions left, the current one included.
    pub remaining: usize,
    pub mastered: usize,
    /// Distinct words the session started with.
    pub target: usize,
}

impl Progress {
    pub fn new(index: usize, total: usize, mastered: usize, target: usize) -> Self {
        Self {
            current: (index + 1).min(total),
            total,
            remaining: total.saturating_sub(index),
            mastered,
            target,
        }
    }

    pub fn phase_message(&self) -> String {
        format!(
            "Question {}/{} ({} of {} words mastered)",
            self.current, self.total, self.mastered, self.target
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_session() {
        let progress = Progress::new(0, 0, 0, 0);
        assert_eq!(progress.current, 0);
        assert_eq!(progress.remaining, 0);
    }

    #[test]
    fn test_finished_session() {
        let progress = Progress::new(7, 7, 5, 5);
        assert_eq!(progress.current, 7);
        assert_eq!(progress.remaining, 0);
        assert_eq!(progress.phase_message(), "Question 7/7 (5 of 5 words mastered)");
    }
}
