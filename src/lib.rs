pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod persistence;
pub mod repository;
pub mod service;

pub use config::{SchedulerConfig, SessionSize};
pub use error::{Result, SchedulerError};
pub use models::{QuizSession, Rating, ReviewState, Word};
pub use repository::Repository;
pub use service::{ReviewService, SessionPlan};
