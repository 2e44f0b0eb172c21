pub mod due;
pub mod fsrs;
pub mod legacy;
pub mod progress;
pub mod quiz_session;
pub mod review_state;
pub mod session_builder;
pub mod word;

pub use due::{DueBadge, WordStatus};
pub use fsrs::{Rating, Scheduler};
pub use progress::Progress;
pub use quiz_session::{AnswerOutcome, QuizSession, SessionResults, SessionStatus};
pub use review_state::{LegacyState, ReviewState, RichState};
pub use session_builder::select_session_words;
pub use word::{Word, normalize};
