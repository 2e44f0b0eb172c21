use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use vocab_core::database::SqliteRepository;
use vocab_core::models::{LegacyState, WordStatus, due};
use vocab_core::*;

fn seeded_repo(terms: &[&str]) -> Arc<SqliteRepository> {
    let repo = SqliteRepository::open_in_memory().unwrap();
    for term in terms {
        repo.add_word(&Word::new(*term, format!("meaning of {term}")))
            .unwrap();
    }
    Arc::new(repo)
}

#[tokio::test]
async fn test_full_session_persists_reviews() {
    let repo = seeded_repo(&["hello", "world", "test"]);
    let mut service = ReviewService::new(repo.clone(), SchedulerConfig::default());

    let mut session = service.start_session(Some(SessionSize::Short)).await.unwrap();
    assert_eq!(session.queue_len(), 3);

    let mut missed_once = false;
    while let Some(word) = session.current_question().cloned() {
        if !missed_once {
            session.submit_answer("wrong", 9000).unwrap();
            missed_once = true;
        } else {
            session.submit_answer(&word.term, 3000).unwrap();
        }
    }

    assert!(session.is_complete());
    let results = session.results();
    assert_eq!(results.mastered_count, 3);
    assert_eq!(results.total_attempts, 4);
    assert!((results.accuracy - 0.75).abs() < 1e-9);

    drop(session);
    let stats = service.shutdown().await;
    assert_eq!(stats.written, 4);
    assert_eq!(stats.failed, 0);

    let now = chrono::Utc::now();
    for word in repo.fetch_all_items().await.unwrap() {
        assert!(word.review.reps() >= 1);
        assert_ne!(due::classify(&word.review, now), WordStatus::New);
    }
}

#[tokio::test]
async fn test_due_words_lead_the_session() {
    let repo = seeded_repo(&[]);
    let now = chrono::Utc::now();
    let future = now + chrono::Duration::days(30);

    for i in 0..40 {
        let state = LegacyState {
            interval: 30,
            reps: 3,
            correct: 3,
            next_review: Some(future),
            ..Default::default()
        };
        let word = Word::new(format!("later{i}"), "").with_review(ReviewState::Legacy(state));
        repo.add_word(&word).unwrap();
    }
    for i in 0..5 {
        repo.add_word(&Word::new(format!("due{i}"), "")).unwrap();
    }

    let mut service = ReviewService::new(repo, SchedulerConfig::default());
    let mut rng = StdRng::seed_from_u64(42);
    let plan = service
        .build_session_with(SessionSize::Short, now, &mut rng)
        .await
        .unwrap();

    assert_eq!(plan.words.len(), 25);
    assert_eq!(plan.due_count, 5);
    let front: Vec<&str> = plan.words[..13].iter().map(|w| w.term.as_str()).collect();
    for i in 0..5 {
        assert!(front.contains(&format!("due{i}").as_str()));
    }
}
