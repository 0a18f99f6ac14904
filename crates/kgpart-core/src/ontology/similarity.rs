//! Lexical similarity between a candidate type and a master ontology.
//!
//! Scores use the Ratcliff/Obershelp "gestalt" ratio: the longest common
//! block is found, then the same search recurses on the unmatched pieces to
//! its left and right. With `M` matched characters the ratio is
//! `2 * M / (|a| + |b|)`.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;

use super::master::{find_by_type, MasterElement};
use crate::config::SimilarityConfig;

/// Sequences at least this long have their most frequent characters
/// excluded from block seeding.
const POPULAR_MIN_LEN: usize = 200;

/// What an agent should do with a candidate ontology type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    /// Reuse an existing master type.
    UseExisting,
    /// Inspect the listed candidates before creating a new type.
    ReviewSimilar,
    /// Nothing close exists.
    CreateNew,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::UseExisting => "USE_EXISTING",
            Recommendation::ReviewSimilar => "REVIEW_SIMILAR",
            Recommendation::CreateNew => "CREATE_NEW",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A master element scored against the candidate.
#[derive(Debug, Clone, Serialize)]
pub struct SimilarMatch {
    #[serde(rename = "type")]
    pub type_name: String,
    pub description: String,
    pub source_partitions: Vec<u32>,
    /// Weighted combination of the two component scores.
    pub similarity_score: f64,
    pub type_similarity: f64,
    pub description_similarity: f64,
}

/// Result of checking a candidate type against a master ontology.
#[derive(Debug, Clone, Serialize)]
pub struct SimilarityReport {
    pub recommendation: Recommendation,
    /// Set when a master type matches the candidate case-insensitively.
    pub exact_match: Option<MasterElement>,
    /// Candidates at or above the threshold, best first.
    pub similar_elements: Vec<SimilarMatch>,
    pub message: String,
}

impl SimilarityReport {
    pub fn is_exact(&self) -> bool {
        self.exact_match.is_some()
    }

    /// Best scored candidate, if any.
    pub fn best(&self) -> Option<&SimilarMatch> {
        self.similar_elements.first()
    }
}

/// Recommends reusing or creating ontology types.
#[derive(Debug, Clone)]
pub struct SimilarityMatcher {
    threshold: f64,
    strong_match: f64,
    type_weight: f64,
}

impl Default for SimilarityMatcher {
    fn default() -> Self {
        Self::new(&SimilarityConfig::default())
    }
}

impl SimilarityMatcher {
    pub fn new(config: &SimilarityConfig) -> Self {
        Self {
            threshold: config.threshold,
            strong_match: config.strong_match,
            type_weight: config.type_weight,
        }
    }

    /// Overrides the inclusion threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Scores a candidate against one master element.
    pub fn score(
        &self,
        type_name: &str,
        description: &str,
        element: &MasterElement,
    ) -> SimilarMatch {
        let type_similarity = similarity_ratio(type_name, &element.type_name);
        let description_similarity = if description.is_empty() || element.description.is_empty() {
            0.0
        } else {
            similarity_ratio(description, &element.description)
        };

        SimilarMatch {
            type_name: element.type_name.clone(),
            description: element.description.clone(),
            source_partitions: element.source_partitions.clone(),
            similarity_score: self.type_weight * type_similarity
                + (1.0 - self.type_weight) * description_similarity,
            type_similarity,
            description_similarity,
        }
    }

    /// Checks a candidate type against the master elements.
    pub fn check(
        &self,
        type_name: &str,
        description: &str,
        elements: &[MasterElement],
    ) -> SimilarityReport {
        if let Some(exact) = find_by_type(elements, type_name) {
            return SimilarityReport {
                recommendation: Recommendation::UseExisting,
                message: format!("Exact match found: '{}'", exact.type_name),
                exact_match: Some(exact.clone()),
                similar_elements: Vec::new(),
            };
        }

        let mut similar: Vec<SimilarMatch> = elements
            .iter()
            .map(|e| self.score(type_name, description, e))
            .filter(|m| m.similarity_score >= self.threshold)
            .collect();
        similar.sort_by(|a, b| b.similarity_score.total_cmp(&a.similarity_score));

        let (recommendation, message) = match similar.first() {
            Some(best) if best.similarity_score > self.strong_match => (
                Recommendation::UseExisting,
                format!(
                    "Very similar element found: '{}' (score: {:.2})",
                    best.type_name, best.similarity_score
                ),
            ),
            Some(_) => (
                Recommendation::ReviewSimilar,
                "Similar elements found. Review before creating new.".to_string(),
            ),
            None => (
                Recommendation::CreateNew,
                "No similar elements found. Safe to create new element.".to_string(),
            ),
        };

        SimilarityReport {
            recommendation,
            exact_match: None,
            similar_elements: similar,
            message,
        }
    }
}

/// Case-insensitive gestalt similarity of two strings in `[0, 1]`.
///
/// Two empty strings are identical (1.0).
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    2.0 * matching_characters(&a, &b) as f64 / total as f64
}

/// Total size of the recursively found common blocks of `a` and `b`.
fn matching_characters(a: &[char], b: &[char]) -> usize {
    let popular = popular_characters(b);
    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, k) = longest_block(a, b, &popular, (alo, ahi), (blo, bhi));
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            pending.push((i + k, ahi, j + k, bhi));
        }
    }

    matched
}

/// Characters of a long `b` occurring in more than 1% of its positions.
fn popular_characters(b: &[char]) -> HashSet<char> {
    if b.len() < POPULAR_MIN_LEN {
        return HashSet::new();
    }

    let limit = b.len() / 100 + 1;
    let mut counts: HashMap<char, usize> = HashMap::new();
    for c in b {
        *counts.entry(*c).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .filter(|(_, n)| *n > limit)
        .map(|(c, _)| c)
        .collect()
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]` as `(i, j, len)`.
///
/// Ties go to the block starting earliest in `a`, then in `b`. Popular
/// characters never seed a block but may extend one at either end.
fn longest_block(
    a: &[char],
    b: &[char],
    popular: &HashSet<char>,
    (alo, ahi): (usize, usize),
    (blo, bhi): (usize, usize),
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_len) = (alo, blo, 0);

    // run[j - blo + 1] = length of the block ending at (i - 1, j)
    let mut run = vec![0usize; bhi - blo + 1];
    for i in alo..ahi {
        let mut next = vec![0usize; bhi - blo + 1];
        for j in blo..bhi {
            if a[i] != b[j] || popular.contains(&b[j]) {
                continue;
            }
            let len = run[j - blo] + 1;
            next[j - blo + 1] = len;
            if len > best_len {
                best_i = i + 1 - len;
                best_j = j + 1 - len;
                best_len = len;
            }
        }
        run = next;
    }

    while best_i > alo && best_j > blo && a[best_i - 1] == b[best_j - 1] {
        best_i -= 1;
        best_j -= 1;
        best_len += 1;
    }
    while best_i + best_len < ahi
        && best_j + best_len < bhi
        && a[best_i + best_len] == b[best_j + best_len]
    {
        best_len += 1;
    }

    (best_i, best_j, best_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_ratio_basics() {
        assert!(approx(similarity_ratio("", ""), 1.0));
        assert!(approx(similarity_ratio("abc", ""), 0.0));
        assert!(approx(similarity_ratio("Service", "SERVICE"), 1.0));
        assert!(approx(similarity_ratio("abcd", "abce"), 0.75));
        assert!(approx(similarity_ratio("abc", "xyz"), 0.0));
    }

    #[test]
    fn test_ratio_recurses_on_both_sides() {
        // "ab" + "yz" both match around the differing middle.
        assert!(approx(similarity_ratio("abXyz", "abQyz"), 0.8));
    }

    #[test]
    fn test_ratio_is_order_sensitive_like_gestalt_matching() {
        // Blocks may not cross, so "ba" against "ab" keeps only one char.
        assert!(approx(similarity_ratio("ab", "ba"), 0.5));
    }

    #[test]
    fn test_popular_characters_only_for_long_sequences() {
        let short: Vec<char> = "aaaa".chars().collect();
        assert!(popular_characters(&short).is_empty());

        let long: Vec<char> = "a".repeat(150).chars().chain("b".repeat(60).chars()).collect();
        let popular = popular_characters(&long);
        assert!(popular.contains(&'a'));
        assert!(popular.contains(&'b'));
    }
}
