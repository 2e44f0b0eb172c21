use anyhow::Context;
use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;
use vocab_core::database::SqliteRepository;
use vocab_core::models::due;
use vocab_core::*;

/// Practice vocabulary with spaced repetition.
#[derive(Parser)]
#[command(name = "vocab-drill", version)]
struct Cli {
    /// Word database
    #[arg(long, default_value = "vocab.sqlite3")]
    db: PathBuf,

    /// Session size (25 or 50); stored as the new default
    #[arg(long)]
    size: Option<SessionSize>,

    /// Scheduler config file (.toml or .json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// List every word with its status and due date instead of quizzing
    #[arg(long)]
    status: bool,
}

const SAMPLE_WORDS: [(&str, &str, &str); 5] = [
    ("ephemeral", "lasting for a very short time", "Fame in the age of memes is ephemeral."),
    ("ubiquitous", "present or found everywhere", "Phones have become ubiquitous."),
    ("laconic", "using very few words", "His laconic reply ended the debate."),
    ("candid", "truthful and straightforward", "She gave a candid account of events."),
    ("meticulous", "showing great attention to detail", "He kept meticulous notes."),
];

fn seed_sample_words(repo: &SqliteRepository) -> anyhow::Result<()> {
    for (term, definition, example) in SAMPLE_WORDS {
        repo.add_word(&Word::new(term, definition).with_example(example))?;
    }
    println!("Sample words created!");
    Ok(())
}

async fn print_status(repo: &SqliteRepository) -> anyhow::Result<()> {
    let now = chrono::Utc::now();
    for word in repo.fetch_all_items().await? {
        let status = due::classify(&word.review, now);
        let badge = match due::due_badge(&word.review, now) {
            models::DueBadge::New => "new".to_string(),
            models::DueBadge::Today => "due today".to_string(),
            models::DueBadge::Overdue(days) => format!("overdue by {days} day(s)"),
            models::DueBadge::Upcoming(days) => format!("due in {days} day(s)"),
        };
        println!("  - {:<20} {:<9} {}", word.term, format!("{status:?}"), badge);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::WARN.into()))
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let config = match &cli.config {
        Some(path) => SchedulerConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => SchedulerConfig::from_env(),
    };

    let repo = Arc::new(SqliteRepository::open(&cli.db).context("opening word database")?);
    if repo.word_count()? == 0 {
        seed_sample_words(&repo)?;
    }

    if cli.status {
        return print_status(&repo).await;
    }

    let mut service = ReviewService::new(repo.clone(), config);
    if let Some(size) = cli.size {
        service.set_session_size(size).await?;
    }

    let mut session = service.start_session(None).await?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(word) = session.current_question().cloned() {
        println!();
        println!("{}", session.progress().phase_message());
        println!("Definition: {}", word.definition);
        if let Some(example) = &word.example {
            println!("Example: {}", example.replace(&word.term, "_____"));
        }

        let asked_at = Instant::now();
        let Some(answer) = lines.next_line().await? else {
            break;
        };
        let elapsed_ms = asked_at.elapsed().as_millis() as u64;

        let outcome = session.submit_answer(&answer, elapsed_ms)?;
        if outcome.correct {
            println!("Correct! ({:?})", outcome.rating);
        } else {
            println!("Not quite, it was '{}'. It will come back soon.", outcome.expected);
        }
    }

    let results = session.results();
    println!();
    println!(
        "Mastered {} word(s), {}/{} correct ({:.0}% accuracy)",
        results.mastered_count,
        results.correct_count,
        results.total_attempts,
        results.accuracy * 100.0
    );

    drop(session);
    let stats = service.shutdown().await;
    info!(written = stats.written, failed = stats.failed, "review writes finished");

    Ok(())
}
