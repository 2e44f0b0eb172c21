//! Storage collaborator.
//!
//! The scheduling core never creates or deletes words; it reads them through
//! this trait and proposes new review states back.

mod memory;

pub use memory::MemoryRepository;

use crate::error::Result;
use crate::models::{ReviewState, Word};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait Repository: Send + Sync {
    async fn fetch_all_items(&self) -> Result<Vec<Word>>;

    /// Words due at `now`, earliest due first, never-scheduled words first of all.
    async fn fetch_due_items(&self, now: DateTime<Utc>) -> Result<Vec<Word>>;

    /// Stores a review outcome. `Ok(false)` means no word with that term exists.
    async fn record_review(&self, term: &str, state: &ReviewState) -> Result<bool>;

    async fn read_preference(&self, key: &str) -> Result<Option<String>>;

    async fn write_preference(&self, key: &str, value: &str) -> Result<()>;
}
