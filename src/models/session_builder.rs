//! Composes the word list for one practice session.
//!
//! Due words come first (earliest due first), the rest of the session is
//! filled with a uniform random sample of other words. Each half of the
//! result is then shuffled on its own, so due words still tend to appear
//! before filler without the order being predictable.

use super::Word;
use rand::Rng;
use rand::seq::{SliceRandom, index};
use std::collections::HashSet;

/// `due` must be sorted earliest-due first; `all` may include the due words.
pub fn select_session_words<R: Rng + ?Sized>(
    all: &[Word],
    due: &[Word],
    session_size: usize,
    rng: &mut R,
) -> Vec<Word> {
    let mut seen = HashSet::new();
    let mut selection: Vec<Word> = Vec::with_capacity(session_size);

    for word in due {
        if selection.len() >= session_size {
            break;
        }
        if seen.insert(word.key()) {
            selection.push(word.clone());
        }
    }

    if selection.len() < session_size {
        // Distinct words not selected yet; also covers the nothing-due case.
        let candidates: Vec<&Word> = all
            .iter()
            .filter(|word| seen.insert(word.key()))
            .collect();

        let needed = (session_size - selection.len()).min(candidates.len());
        for i in index::sample(rng, candidates.len(), needed) {
            selection.push(candidates[i].clone());
        }
    }

    selection.truncate(session_size);
    split_shuffle(&mut selection, rng);
    selection
}

/// Shuffles the first `ceil(len / 2)` items and the remainder independently.
pub fn split_shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    let mid = items.len().div_ceil(2);
    let (front, back) = items.split_at_mut(mid);
    front.shuffle(rng);
    back.shuffle(rng);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn words(terms: &[&str]) -> Vec<Word> {
        terms.iter().map(|t| Word::new(*t, format!("def of {t}"))).collect()
    }

    fn keys(words: &[Word]) -> Vec<String> {
        words.iter().map(Word::key).collect()
    }

    #[test]
    fn test_small_deck_nothing_due() {
        let all = words(&["hello", "world", "test"]);
        let mut rng = StdRng::seed_from_u64(7);

        let selected = select_session_words(&all, &[], 25, &mut rng);

        assert_eq!(selected.len(), 3);
        let mut sorted = keys(&selected);
        sorted.sort();
        assert_eq!(sorted, vec!["hello", "test", "world"]);
    }

    #[test]
    fn test_enough_due_words_fill_session() {
        let all: Vec<Word> = (0..100).map(|i| Word::new(format!("w{i}"), "")).collect();
        let due: Vec<Word> = all[..30].to_vec();
        let due_keys: HashSet<String> = due.iter().map(Word::key).collect();
        let mut rng = StdRng::seed_from_u64(1);

        let selected = select_session_words(&all, &due, 25, &mut rng);

        assert_eq!(selected.len(), 25);
        assert!(selected.iter().all(|w| due_keys.contains(&w.key())));
        // Earliest-due words are the ones kept.
        let expected: HashSet<String> = due[..25].iter().map(Word::key).collect();
        let got: HashSet<String> = selected.iter().map(Word::key).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_filler_never_duplicates_due_words() {
        let mut all = words(&["Alpha", "beta", "gamma", "delta", "epsilon", "zeta"]);
        all.push(Word::new("BETA", "shouty duplicate"));
        let due = words(&["alpha", "beta"]);

        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let selected = select_session_words(&all, &due, 5, &mut rng);

            assert_eq!(selected.len(), 5);
            let unique: HashSet<String> = selected.iter().map(Word::key).collect();
            assert_eq!(unique.len(), selected.len());
            assert!(unique.contains("alpha") && unique.contains("beta"));
        }
    }

    #[test]
    fn test_due_words_stay_in_front_half() {
        let all: Vec<Word> = (0..20).map(|i| Word::new(format!("w{i}"), "")).collect();
        let due = all[..2].to_vec();

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let selected = select_session_words(&all, &due, 4, &mut rng);
            let front: HashSet<String> = selected[..2].iter().map(Word::key).collect();
            assert!(front.contains("w0") && front.contains("w1"));
        }
    }

    #[test]
    fn test_output_never_exceeds_session_size() {
        let all: Vec<Word> = (0..60).map(|i| Word::new(format!("w{i}"), "")).collect();
        let mut rng = StdRng::seed_from_u64(3);

        assert_eq!(select_session_words(&all, &[], 50, &mut rng).len(), 50);
        assert_eq!(select_session_words(&all, &all[..10], 25, &mut rng).len(), 25);
        assert!(select_session_words(&[], &[], 25, &mut rng).is_empty());
    }

    #[test]
    fn test_split_shuffle_keeps_halves() {
        let mut items: Vec<u32> = (0..9).collect();
        let mut rng = StdRng::seed_from_u64(11);
        split_shuffle(&mut items, &mut rng);

        let mut front = items[..5].to_vec();
        let mut back = items[5..].to_vec();
        front.sort();
        back.sort();
        assert_eq!(front, vec![0, 1, 2, 3, 4]);
        assert_eq!(back, vec![5, 6, 7, 8]);
    }

    #[test]
    fn test_shuffle_is_not_identity_every_time() {
        let all: Vec<Word> = (0..20).map(|i| Word::new(format!("w{i}"), "")).collect();
        let orders: HashSet<Vec<String>> = (0..10)
            .map(|seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                keys(&select_session_words(&all, &all, 20, &mut rng))
            })
            .collect();
        assert!(orders.len() > 1);
    }
}
