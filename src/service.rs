//! Session composition on top of a [`Repository`].
//!
//! `ReviewService` owns the short-lived word cache and the review writer, so
//! a host keeps one per learner and drives it from a single task.

use crate::config::{SESSION_SIZE_KEY, SchedulerConfig, SessionSize};
use crate::error::{Result, SchedulerError};
use crate::models::{QuizSession, Word, select_session_words};
use crate::persistence::{ReviewWriter, WriterStats};
use crate::repository::Repository;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Words chosen for one session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionPlan {
    pub words: Vec<Word>,
    /// Words left out because they have no term.
    pub skipped: usize,
    /// Due words available when the plan was made.
    pub due_count: usize,
}

/// `(all, due)` snapshot, always replaced as a whole.
struct SessionCache {
    all: Vec<Word>,
    due: Vec<Word>,
    fetched_at: Instant,
    /// Writer submissions seen when the snapshot was taken.
    reviews_seen: usize,
}

impl SessionCache {
    /// Stale once it expires or once reviews were submitted after it was filled.
    fn is_fresh(&self, ttl: Duration, reviews_submitted: usize) -> bool {
        self.fetched_at.elapsed() < ttl && self.reviews_seen == reviews_submitted
    }
}

pub struct ReviewService<R: Repository + ?Sized> {
    repo: Arc<R>,
    config: SchedulerConfig,
    cache: Option<SessionCache>,
    writer: Option<(ReviewWriter, JoinHandle<WriterStats>)>,
}

impl<R: Repository + ?Sized + 'static> ReviewService<R> {
    pub fn new(repo: Arc<R>, config: SchedulerConfig) -> Self {
        Self {
            repo,
            config,
            cache: None,
            writer: None,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repo
    }

    /// Stored session size, or the configured default when none is stored
    /// or the stored value can't be read.
    pub async fn session_size(&self) -> SessionSize {
        match self.repo.read_preference(SESSION_SIZE_KEY).await {
            Ok(Some(value)) => value.parse().unwrap_or_else(|e| {
                warn!(value = %value, error = %e, "ignoring stored session size");
                self.config.session_size
            }),
            Ok(None) => self.config.session_size,
            Err(e) => {
                warn!(error = %e, "could not read session size preference");
                self.config.session_size
            }
        }
    }

    pub async fn set_session_size(&self, size: SessionSize) -> Result<()> {
        self.repo
            .write_preference(SESSION_SIZE_KEY, &size.to_string())
            .await
    }

    /// Forces the next session to refetch words.
    pub fn invalidate_cache(&mut self) {
        self.cache = None;
    }

    async fn load_words(&mut self, now: DateTime<Utc>) -> Result<(Vec<Word>, Vec<Word>)> {
        let ttl = Duration::from_secs(self.config.cache_ttl_secs);
        let submitted = self.reviews_submitted();
        if let Some(cache) = self.cache.as_ref().filter(|c| c.is_fresh(ttl, submitted)) {
            debug!(words = cache.all.len(), "using cached word lists");
            return Ok((cache.all.clone(), cache.due.clone()));
        }

        // Pending review writes must land before refetching.
        if let Some((writer, _)) = &self.writer {
            writer.flush().await;
        }

        let all = self.repo.fetch_all_items().await?;
        let due = self.repo.fetch_due_items(now).await?;
        debug!(words = all.len(), due = due.len(), "fetched word lists");

        self.cache = Some(SessionCache {
            all: all.clone(),
            due: due.clone(),
            fetched_at: Instant::now(),
            reviews_seen: submitted,
        });
        Ok((all, due))
    }

    fn reviews_submitted(&self) -> usize {
        self.writer
            .as_ref()
            .map_or(0, |(writer, _)| writer.submitted())
    }

    /// Picks the words for a session of `size` (or the stored preference).
    pub async fn build_session(&mut self, size: Option<SessionSize>) -> Result<SessionPlan> {
        let size = match size {
            Some(size) => size,
            None => self.session_size().await,
        };
        let now = Utc::now();
        let (all, due) = self.load_words(now).await?;
        let mut rng = StdRng::from_os_rng();
        self.plan(all, due, size, &mut rng)
    }

    /// [`build_session`](Self::build_session) with a caller-supplied clock and
    /// random source.
    pub async fn build_session_with<G: Rng + Send>(
        &mut self,
        size: SessionSize,
        now: DateTime<Utc>,
        rng: &mut G,
    ) -> Result<SessionPlan> {
        let (all, due) = self.load_words(now).await?;
        self.plan(all, due, size, rng)
    }

    fn plan<G: Rng + ?Sized>(
        &self,
        all: Vec<Word>,
        due: Vec<Word>,
        size: SessionSize,
        rng: &mut G,
    ) -> Result<SessionPlan> {
        let (all, skipped): (Vec<Word>, Vec<Word>) =
            all.into_iter().partition(|w| !w.is_malformed());
        let due: Vec<Word> = due.into_iter().filter(|w| !w.is_malformed()).collect();
        if !skipped.is_empty() {
            warn!(skipped = skipped.len(), "skipping words without a term");
        }

        let available = all.iter().map(Word::key).collect::<HashSet<_>>().len();
        if available < self.config.min_session_items {
            return Err(SchedulerError::InsufficientItems {
                available,
                required: self.config.min_session_items,
            });
        }

        let words = select_session_words(&all, &due, size.count(), rng);
        info!(
            words = words.len(),
            due = due.len(),
            size = size.count(),
            "session composed"
        );

        Ok(SessionPlan {
            words,
            skipped: skipped.len(),
            due_count: due.len(),
        })
    }

    /// Writer feeding the repository; spawned on first use.
    pub fn writer(&mut self) -> ReviewWriter {
        let (writer, _) = self
            .writer
            .get_or_insert_with(|| ReviewWriter::spawn(self.repo.clone()));
        writer.clone()
    }

    /// Builds a plan and returns a session over it, wired to the writer.
    pub async fn start_session(&mut self, size: Option<SessionSize>) -> Result<QuizSession> {
        let plan = self.build_session(size).await?;
        let mut session = QuizSession::new(&self.config);
        session.attach_writer(self.writer());
        session.initialize(plan.words);
        Ok(session)
    }

    /// Waits for queued review writes to finish. Sessions holding a writer
    /// must be dropped first or this waits for them.
    pub async fn shutdown(mut self) -> WriterStats {
        match self.writer.take() {
            Some((writer, handle)) => {
                drop(writer);
                handle.await.unwrap_or_else(|e| {
                    warn!(error = %e, "review writer task failed");
                    WriterStats::default()
                })
            }
            None => WriterStats::default(),
        }
    }
}
