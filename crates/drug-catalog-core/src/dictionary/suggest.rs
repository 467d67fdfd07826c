//! Fuzzy name autocomplete.

use serde::{Deserialize, Serialize};
use strsim::{jaro_winkler, normalized_levenshtein};

/// Candidates scoring below this are dropped.
pub const MIN_SUGGESTION_SCORE: f64 = 0.7;

/// A ranked autocomplete candidate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Suggestion {
    pub name: String,
    pub score: f64,
}

/// Rank `candidates` against `query`, best first, without case-insensitive duplicates.
///
/// Prefix matches score 1.0 and substring matches 0.9; everything else is
/// scored by string similarity.
pub fn suggest<'a, I>(query: &str, candidates: I, limit: usize) -> Vec<Suggestion>
where
    I: IntoIterator<Item = &'a str>,
{
    let query = query.trim().to_lowercase();
    if query.is_empty() || limit == 0 {
        return Vec::new();
    }

    let mut seen = Vec::new();
    let mut ranked: Vec<Suggestion> = candidates
        .into_iter()
        .filter_map(|name| {
            let name = name.trim();
            let lower = name.to_lowercase();
            if lower.is_empty() || seen.contains(&lower) {
                return None;
            }
            let score = score_candidate(&query, &lower);
            seen.push(lower);
            (score >= MIN_SUGGESTION_SCORE).then(|| Suggestion {
                name: name.to_string(),
                score,
            })
        })
        .collect();

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
    ranked.truncate(limit);
    ranked
}

fn score_candidate(query: &str, candidate: &str) -> f64 {
    if candidate.starts_with(query) {
        1.0
    } else if candidate.contains(query) {
        0.9
    } else {
        fuzzy_match(query, candidate)
    }
}

/// Combined string similarity in `[0, 1]`.
pub fn fuzzy_match(a: &str, b: &str) -> f64 {
    // Jaro-Winkler favours shared prefixes, Levenshtein overall edits
    let jw = jaro_winkler(a, b);
    let lev = normalized_levenshtein(a, b);
    jw * 0.6 + lev * 0.4
}
