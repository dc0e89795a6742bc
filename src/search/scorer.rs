//! Fuzzy Scoring Strategies
//!
//! A scorer compares a query with one candidate string and returns a `Rank`.
//! A rank of `0` always means "no match"; any positive value is a match, and larger is better.

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::types::Rank;

/// Similarity function used by the ranking engine.
///
/// Implementations must be pure and deterministic: the same inputs always produce the same
/// rank, and the scorer is shared by every in-flight request.
pub trait FuzzyScorer: Send + Sync {
    fn score(&self, query: &str, candidate: &str) -> Rank;

    /// Short identifier used in logs.
    fn name(&self) -> &'static str;
}

/// Points for every query character found in the candidate.
pub const MATCH_SCORE: Rank = 10;
/// Extra points when a matched character directly follows the previous match.
pub const ADJACENCY_BONUS: Rank = 15;
/// Extra points when a matched character starts a word.
pub const BOUNDARY_BONUS: Rank = 8;
/// Base bonus for a contiguous (substring) match, on top of `BOUNDARY_BONUS` per character.
pub const EXACT_BONUS: Rank = 16;

/// Case-insensitive subsequence scorer.
///
/// The query matches when its characters appear in the candidate in order. Substring
/// occurrences are scored at every position and the best one wins; otherwise the leftmost
/// greedy alignment is scored. The substring bonus is sized so that a contiguous match
/// always outranks a scattered one for the same query.
#[derive(Debug, Default, Clone, Copy)]
pub struct SubsequenceScorer;

impl SubsequenceScorer {
    pub fn new() -> Self {
        Self
    }
}

impl FuzzyScorer for SubsequenceScorer {
    fn score(&self, query: &str, candidate: &str) -> Rank {
        let query: Vec<char> = query.to_lowercase().chars().collect();
        if query.is_empty() {
            return 0;
        }
        let candidate: Vec<char> = candidate.to_lowercase().chars().collect();
        if query.len() > candidate.len() {
            return 0;
        }

        let substring_rank = substring_starts(&query, &candidate)
            .map(|start| {
                let positions: Vec<usize> = (start..start + query.len()).collect();
                alignment_rank(&positions, &candidate) + contiguous_bonus(query.len())
            })
            .max();

        if let Some(rank) = substring_rank {
            return rank;
        }

        match greedy_alignment(&query, &candidate) {
            Some(positions) => alignment_rank(&positions, &candidate),
            None => 0,
        }
    }

    fn name(&self) -> &'static str {
        "subsequence"
    }
}

fn contiguous_bonus(query_len: usize) -> Rank {
    BOUNDARY_BONUS.saturating_mul(query_len as Rank).saturating_add(EXACT_BONUS)
}

fn substring_starts<'a>(
    query: &'a [char],
    candidate: &'a [char],
) -> impl Iterator<Item = usize> + 'a {
    candidate
        .windows(query.len())
        .enumerate()
        .filter(move |(_, window)| *window == query)
        .map(|(start, _)| start)
}

fn greedy_alignment(query: &[char], candidate: &[char]) -> Option<Vec<usize>> {
    let mut positions = Vec::with_capacity(query.len());
    let mut from = 0;

    for q in query {
        let offset = candidate[from..].iter().position(|c| c == q)?;
        positions.push(from + offset);
        from += offset + 1;
    }

    Some(positions)
}

fn alignment_rank(positions: &[usize], candidate: &[char]) -> Rank {
    let mut rank: Rank = 0;
    let mut previous: Option<usize> = None;

    for &pos in positions {
        rank = rank.saturating_add(MATCH_SCORE);
        if previous.is_some_and(|prev| prev + 1 == pos) {
            rank = rank.saturating_add(ADJACENCY_BONUS);
        }
        if pos == 0 || !candidate[pos - 1].is_alphanumeric() {
            rank = rank.saturating_add(BOUNDARY_BONUS);
        }
        previous = Some(pos);
    }

    rank
}

/// Scorer backed by the skim V2 algorithm from `fuzzy-matcher`, in ignore-case mode.
pub struct SkimScorer {
    matcher: SkimMatcherV2,
}

impl SkimScorer {
    pub fn new() -> Self {
        Self {
            matcher: SkimMatcherV2::default().ignore_case(),
        }
    }
}

impl Default for SkimScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl FuzzyScorer for SkimScorer {
    fn score(&self, query: &str, candidate: &str) -> Rank {
        if query.is_empty() {
            return 0;
        }
        // A match is never ranked 0, which means "no match".
        match self.matcher.fuzzy_match(candidate, query) {
            Some(score) => Rank::try_from(score.max(1)).unwrap_or(Rank::MAX),
            None => 0,
        }
    }

    fn name(&self) -> &'static str {
        "skim"
    }
}
