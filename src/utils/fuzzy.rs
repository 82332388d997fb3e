//! Fuzzy matching utilities
//!
//! Suggests detectable object names close to a misheard one.

use strsim::normalized_levenshtein;

/// Candidate with its similarity score
#[derive(Debug, Clone)]
struct FuzzyMatch {
    value: String,
    score: f64,
}

/// Suggestions for an unknown object name
///
/// Candidates sharing the first three letters always qualify; anything else
/// must score at least `cutoff`. Ordered by similarity.
pub fn suggest(name: &str, candidates: &[String], n: usize, cutoff: f64) -> Vec<String> {
    let name = name.to_lowercase();
    let prefix: String = name.chars().take(3).collect();

    let mut scored: Vec<FuzzyMatch> = candidates
        .iter()
        .filter_map(|candidate| {
            let lower = candidate.to_lowercase();
            let score = normalized_levenshtein(&name, &lower);
            let shares_prefix = !prefix.is_empty() && lower.starts_with(&prefix);
            (shares_prefix || score >= cutoff).then(|| FuzzyMatch {
                value: candidate.clone(),
                score,
            })
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(n);
    scored.into_iter().map(|m| m.value).collect()
}
