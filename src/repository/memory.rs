//! In-process repository. Used by hosts without a database and by tests,
//! which can switch it to failing mode with [`MemoryRepository::set_unavailable`].

use super::Repository;
use crate::error::{Result, SchedulerError};
use crate::models::{ReviewState, Word, due, normalize};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryRepository {
    words: RwLock<Vec<Word>>,
    preferences: RwLock<HashMap<String, String>>,
    unavailable: AtomicBool,
    fetches: AtomicUsize,
}

impl MemoryRepository {
    pub fn new(words: Vec<Word>) -> Self {
        Self {
            words: RwLock::new(words),
            ..Default::default()
        }
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of `fetch_all_items` calls served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub async fn insert(&self, word: Word) {
        self.words.write().await.push(word);
    }

    pub async fn word(&self, term: &str) -> Option<Word> {
        let key = normalize(term);
        self.words
            .read()
            .await
            .iter()
            .find(|w| w.key() == key)
            .cloned()
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(SchedulerError::RepositoryUnavailable(
                "memory repository switched off".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn fetch_all_items(&self) -> Result<Vec<Word>> {
        self.check_available()?;
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.words.read().await.clone())
    }

    async fn fetch_due_items(&self, now: DateTime<Utc>) -> Result<Vec<Word>> {
        self.check_available()?;
        let mut due_words: Vec<Word> = self
            .words
            .read()
            .await
            .iter()
            .filter(|w| due::is_due(&w.review, now))
            .cloned()
            .collect();
        due_words.sort_by_key(|w| w.review.next_review());
        Ok(due_words)
    }

    async fn record_review(&self, term: &str, state: &ReviewState) -> Result<bool> {
        self.check_available()?;
        let key = normalize(term);
        let mut words = self.words.write().await;
        match words.iter_mut().find(|w| w.key() == key) {
            Some(word) => {
                word.review = state.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn read_preference(&self, key: &str) -> Result<Option<String>> {
        self.check_available()?;
        Ok(self.preferences.read().await.get(key).cloned())
    }

    async fn write_preference(&self, key: &str, value: &str) -> Result<()> {
        self.check_available()?;
        self.preferences
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
