//! Detached persistence of review outcomes.
//!
//! A quiz session hands each new review state to a [`ReviewWriter`] and moves
//! on; a single background task drains the channel into the repository.
//! Failed writes are logged and dropped. The writer counts what it was given
//! and what the task has handled, so callers can tell when stored states
//! have moved on and wait for the backlog with [`ReviewWriter::flush`].

use crate::models::ReviewState;
use crate::repository::Repository;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewUpdate {
    pub term: String,
    pub state: ReviewState,
}

/// Tally returned by the writer task once every sender is gone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterStats {
    pub written: usize,
    /// Repository answered but had no such word.
    pub missing: usize,
    pub failed: usize,
}

#[derive(Debug, Clone)]
pub struct ReviewWriter {
    tx: mpsc::UnboundedSender<ReviewUpdate>,
    submitted: Arc<AtomicUsize>,
    processed: watch::Receiver<usize>,
}

impl ReviewWriter {
    /// Spawns the writer task on the current Tokio runtime.
    pub fn spawn<R>(repo: Arc<R>) -> (Self, JoinHandle<WriterStats>)
    where
        R: Repository + ?Sized + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let (processed_tx, processed) = watch::channel(0);
        let handle = tokio::spawn(drain(repo, rx, processed_tx));
        (Self::from_parts(tx, processed), handle)
    }

    /// Writer whose updates land in the returned receiver instead of a repository.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ReviewUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (_, processed) = watch::channel(0);
        (Self::from_parts(tx, processed), rx)
    }

    fn from_parts(
        tx: mpsc::UnboundedSender<ReviewUpdate>,
        processed: watch::Receiver<usize>,
    ) -> Self {
        Self {
            tx,
            submitted: Arc::new(AtomicUsize::new(0)),
            processed,
        }
    }

    /// Updates accepted so far, across all clones of this writer.
    pub fn submitted(&self) -> usize {
        self.submitted.load(Ordering::SeqCst)
    }

    /// Waits until the writer task has handled every update submitted so
    /// far. Returns immediately when there is no task behind the writer.
    pub async fn flush(&self) {
        let target = self.submitted();
        let mut processed = self.processed.clone();
        let _ = processed.wait_for(|done| *done >= target).await;
    }

    /// Queues an update without waiting. Returns false if the writer task is gone.
    pub fn submit(&self, update: ReviewUpdate) -> bool {
        match self.tx.send(update) {
            Ok(()) => {
                self.submitted.fetch_add(1, Ordering::SeqCst);
                true
            }
            Err(err) => {
                warn!(term = %err.0.term, "review writer stopped, dropping update");
                false
            }
        }
    }
}

async fn drain<R>(
    repo: Arc<R>,
    mut rx: mpsc::UnboundedReceiver<ReviewUpdate>,
    processed: watch::Sender<usize>,
) -> WriterStats
where
    R: Repository + ?Sized,
{
    let mut stats = WriterStats::default();

    while let Some(update) = rx.recv().await {
        match repo.record_review(&update.term, &update.state).await {
            Ok(true) => {
                stats.written += 1;
                debug!(term = %update.term, "review recorded");
            }
            Ok(false) => {
                stats.missing += 1;
                warn!(term = %update.term, "review not recorded: word not found");
            }
            Err(e) => {
                stats.failed += 1;
                warn!(term = %update.term, error = %e, "failed to record review");
            }
        }
        processed.send_replace(stats.written + stats.missing + stats.failed);
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RichState, Word};
    use crate::repository::MemoryRepository;

    fn update(term: &str) -> ReviewUpdate {
        ReviewUpdate {
            term: term.to_string(),
            state: ReviewState::Rich(RichState {
                reps: 1,
                ..Default::default()
            }),
        }
    }

    #[tokio::test]
    async fn test_writer_records_reviews() {
        let repo = Arc::new(MemoryRepository::new(vec![Word::new("hello", "")]));
        let (writer, handle) = ReviewWriter::spawn(repo.clone());

        assert!(writer.submit(update("hello")));
        assert!(writer.submit(update("nope")));
        drop(writer);

        let stats = handle.await.unwrap();
        assert_eq!(stats.written, 1);
        assert_eq!(stats.missing, 1);
        assert_eq!(repo.word("hello").await.unwrap().review.reps(), 1);
    }

    #[tokio::test]
    async fn test_writer_survives_repository_failure() {
        let repo = Arc::new(MemoryRepository::new(vec![Word::new("hello", "")]));
        repo.set_unavailable(true);
        let (writer, handle) = ReviewWriter::spawn(repo.clone());

        writer.submit(update("hello"));
        writer.submit(update("hello"));
        drop(writer);

        let stats = handle.await.unwrap();
        assert_eq!(stats.failed, 2);
        assert_eq!(stats.written, 0);
    }

    #[tokio::test]
    async fn test_flush_waits_for_backlog() {
        let repo = Arc::new(MemoryRepository::new(vec![Word::new("hello", "")]));
        let (writer, _handle) = ReviewWriter::spawn(repo.clone());

        writer.submit(update("hello"));
        writer.clone().submit(update("missing"));
        assert_eq!(writer.submitted(), 2);

        writer.flush().await;
        assert_eq!(repo.word("hello").await.unwrap().review.reps(), 1);
    }

    #[tokio::test]
    async fn test_flush_without_task_returns() {
        let (writer, _rx) = ReviewWriter::channel();
        writer.submit(update("hello"));
        writer.flush().await;
    }

    #[test]
    fn test_submit_after_receiver_dropped() {
        let (writer, rx) = ReviewWriter::channel();
        drop(rx);
        assert!(!writer.submit(update("hello")));
    }
}
