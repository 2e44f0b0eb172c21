//! SQLite storage for words, their review state and preferences
//!
//! Words are keyed on their normalized term (`term_key`), so lookups ignore
//! case for any script. Review states are stored as JSON next to a
//! `next_review` column (Unix milliseconds, NULL for never-scheduled words)
//! that due queries sort on.

use crate::error::{Result, SchedulerError};
use crate::models::{ReviewState, Word, normalize};
use crate::repository::Repository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

/// Creates the tables if they don't exist yet
pub fn init_database(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS words (
            term_key TEXT PRIMARY KEY,
            term TEXT NOT NULL,
            definition TEXT NOT NULL DEFAULT '',
            example TEXT,
            review_state TEXT NOT NULL,
            next_review INTEGER
        )",
        (),
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_words_next_review ON words(next_review)",
        (),
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS preferences (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

/// Adds a word with its current review state
///
/// Returns false if a word with the same term (ignoring case) already exists.
pub fn add_word(word: &Word, conn: &Connection) -> Result<bool> {
    let review_state = serde_json::to_string(&word.review)?;
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO words
            (term_key, term, definition, example, review_state, next_review)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            word.key(),
            word.term.trim(),
            word.definition,
            word.example,
            review_state,
            word.review.next_review().map(|t| t.timestamp_millis())
        ],
    )?;
    Ok(inserted > 0)
}

pub fn word_count(conn: &Connection) -> Result<usize> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM words", [], |row| row.get(0))?;
    Ok(count as usize)
}

type WordRow = (String, String, Option<String>, String);

fn rows_to_words(rows: Vec<WordRow>) -> Result<Vec<Word>> {
    rows.into_iter()
        .map(|(term, definition, example, review_state)| {
            Ok(Word {
                term,
                definition,
                example,
                review: serde_json::from_str(&review_state)?,
            })
        })
        .collect()
}

/// Retrieves all words in insertion order
pub fn get_all_words(conn: &Connection) -> Result<Vec<Word>> {
    let mut stmt =
        conn.prepare("SELECT term, definition, example, review_state FROM words ORDER BY rowid")?;

    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)))?
        .collect::<rusqlite::Result<Vec<WordRow>>>()?;

    rows_to_words(rows)
}

/// Retrieves words due at `now`
///
/// Never-scheduled words come first, then the rest ordered by next_review
/// (oldest first).
pub fn get_words_due_for_review(now: DateTime<Utc>, conn: &Connection) -> Result<Vec<Word>> {
    let mut stmt = conn.prepare(
        "SELECT term, definition, example, review_state
         FROM words
         WHERE next_review IS NULL OR next_review <= ?1
         ORDER BY next_review IS NOT NULL, next_review ASC",
    )?;

    let rows = stmt
        .query_map(params![now.timestamp_millis()], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })?
        .collect::<rusqlite::Result<Vec<WordRow>>>()?;

    rows_to_words(rows)
}

pub fn get_word(term: &str, conn: &Connection) -> Result<Option<Word>> {
    let row: Option<WordRow> = conn
        .query_row(
            "SELECT term, definition, example, review_state FROM words WHERE term_key = ?1",
            params![normalize(term)],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )
        .optional()?;

    Ok(rows_to_words(row.into_iter().collect())?.pop())
}

/// Stores the review state of a word after an answer
pub fn update_review_state(term: &str, state: &ReviewState, conn: &Connection) -> Result<bool> {
    let review_state = serde_json::to_string(state)?;
    let updated = conn.execute(
        "UPDATE words SET review_state = ?1, next_review = ?2 WHERE term_key = ?3",
        params![
            review_state,
            state.next_review().map(|t| t.timestamp_millis()),
            normalize(term)
        ],
    )?;
    Ok(updated > 0)
}

pub fn get_preference(key: &str, conn: &Connection) -> Result<Option<String>> {
    let value = conn
        .query_row(
            "SELECT value FROM preferences WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value)
}

pub fn set_preference(key: &str, value: &str, conn: &Connection) -> Result<()> {
    conn.execute(
        "INSERT INTO preferences (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )?;
    Ok(())
}

/// [`Repository`] backed by a single SQLite connection.
#[derive(Clone)]
pub struct SqliteRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRepository {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        init_database(&conn)?;
        info!(path = %path.as_ref().display(), "opened word database");
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        init_database(&conn)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| {
            SchedulerError::RepositoryUnavailable("database connection poisoned".to_string())
        })
    }

    pub fn add_word(&self, word: &Word) -> Result<bool> {
        let conn = self.lock()?;
        add_word(word, &conn)
    }

    pub fn word_count(&self) -> Result<usize> {
        let conn = self.lock()?;
        word_count(&conn)
    }

    pub fn get_word(&self, term: &str) -> Result<Option<Word>> {
        let conn = self.lock()?;
        get_word(term, &conn)
    }
}

#[async_trait]
impl Repository for SqliteRepository {
    async fn fetch_all_items(&self) -> Result<Vec<Word>> {
        let conn = self.lock()?;
        get_all_words(&conn)
    }

    async fn fetch_due_items(&self, now: DateTime<Utc>) -> Result<Vec<Word>> {
        let conn = self.lock()?;
        get_words_due_for_review(now, &conn)
    }

    async fn record_review(&self, term: &str, state: &ReviewState) -> Result<bool> {
        let conn = self.lock()?;
        update_review_state(term, state, &conn)
    }

    async fn read_preference(&self, key: &str) -> Result<Option<String>> {
        let conn = self.lock()?;
        get_preference(key, &conn)
    }

    async fn write_preference(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.lock()?;
        set_preference(key, value, &conn)
    }
}
