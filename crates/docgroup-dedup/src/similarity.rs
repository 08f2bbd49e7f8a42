//! Group name similarity
//!
//! Scores are banded so that callers can reason about them without knowing
//! the formula:
//!
//! | Match                                  | Score        |
//! |----------------------------------------|--------------|
//! | Exact after normalisation              | 1.0          |
//! | Same tokens, different order           | 0.95         |
//! | `Name` vs `Name (Qualifier)`           | 0.9          |
//! | Same base, different qualifiers        | 0.75         |
//! | Token prefix containment               | [0.8, 0.9)   |
//! | Token run containment                  | [0.7, 0.8)   |
//! | Otherwise, token Jaccard × 0.6         | [0.0, 0.6]   |
//!
//! Every number in the table is a field of [`SimilarityConfig`].

use crate::error::DedupError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Debug;

/// Trailing parenthesised qualifier: `Name (Qualifier)`
static QUALIFIER_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^\s*(.*?)\s*\(\s*([^()]*?)\s*\)\s*$").ok());

/// Runs of anything that is not a letter or digit
static SEPARATOR_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"[^\p{L}\p{N}]+").ok());

/// Default reporting threshold
pub const DUPLICATE_THRESHOLD: f64 = 0.7;

/// Scoring weights and reporting threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    /// Minimum score reported as a duplicate candidate
    pub threshold: f64,
    /// Identical normalised names
    pub exact: f64,
    /// Same token set in a different order
    pub reordered: f64,
    /// One side adds a parenthesised qualifier
    pub qualifier_match: f64,
    /// Same base with two different qualifiers
    pub qualifier_conflict: f64,
    /// Lower bound for token prefix containment
    pub prefix_floor: f64,
    /// Upper bound (exclusive) for token prefix containment
    pub prefix_ceiling: f64,
    /// Lower bound for token run containment
    pub substring_floor: f64,
    /// Upper bound (exclusive) for token run containment
    pub substring_ceiling: f64,
    /// Multiplier applied to token Jaccard for unrelated names
    pub jaccard_weight: f64,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            threshold: DUPLICATE_THRESHOLD,
            exact: 1.0,
            reordered: 0.95,
            qualifier_match: 0.9,
            qualifier_conflict: 0.75,
            prefix_floor: 0.8,
            prefix_ceiling: 0.9,
            substring_floor: 0.7,
            substring_ceiling: 0.8,
            jaccard_weight: 0.6,
        }
    }
}

impl SimilarityConfig {
    /// Set reporting threshold
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Check all weights lie in `[0, 1]` and every band is well formed
    ///
    /// # Errors
    /// Returns [`DedupError::InvalidConfig`] naming the offending field
    pub fn validate(&self) -> Result<(), DedupError> {
        let fields = [
            ("threshold", self.threshold),
            ("exact", self.exact),
            ("reordered", self.reordered),
            ("qualifier_match", self.qualifier_match),
            ("qualifier_conflict", self.qualifier_conflict),
            ("prefix_floor", self.prefix_floor),
            ("prefix_ceiling", self.prefix_ceiling),
            ("substring_floor", self.substring_floor),
            ("substring_ceiling", self.substring_ceiling),
            ("jaccard_weight", self.jaccard_weight),
        ];
        for (name, value) in fields {
            if !(0.0..=1.0).contains(&value) {
                return Err(DedupError::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if self.prefix_floor > self.prefix_ceiling {
            return Err(DedupError::InvalidConfig(
                "prefix_floor exceeds prefix_ceiling".to_string(),
            ));
        }
        if self.substring_floor > self.substring_ceiling {
            return Err(DedupError::InvalidConfig(
                "substring_floor exceeds substring_ceiling".to_string(),
            ));
        }
        Ok(())
    }

    /// Check if `score` is reportable
    #[inline]
    #[must_use]
    pub fn is_duplicate(&self, score: f64) -> bool {
        score >= self.threshold
    }
}

/// Which rule produced a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Identical after normalisation
    Exact,
    /// Same tokens, different order
    Reordered,
    /// One name is the other plus a qualifier
    Qualifier,
    /// Same base, different qualifiers
    QualifierConflict,
    /// Token prefix containment
    Prefix,
    /// Token run containment
    Substring,
    /// Token overlap only
    TokenOverlap,
    /// Produced by a caller-supplied scorer
    Custom,
}

/// Similarity of two names
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityScore {
    /// Score in `[0, 1]`
    pub value: f64,
    /// Rule that produced it
    pub kind: MatchKind,
}

impl SimilarityScore {
    /// Create score
    #[inline]
    #[must_use]
    pub fn new(value: f64, kind: MatchKind) -> Self {
        Self { value, kind }
    }
}

/// Scores the similarity of two group names
///
/// Implementations must be symmetric and return values in `[0, 1]`, higher
/// meaning more shared structure.
pub trait SimilarityScorer: Send + Sync + Debug {
    /// Score two raw names
    fn score(&self, a: &str, b: &str) -> SimilarityScore;
}

/// Banded heuristic scorer
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicScorer {
    config: SimilarityConfig,
}

impl HeuristicScorer {
    /// Create scorer with default weights
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create scorer with explicit weights
    #[inline]
    #[must_use]
    pub fn with_config(config: SimilarityConfig) -> Self {
        Self { config }
    }

    /// Weights in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SimilarityConfig {
        &self.config
    }
}

impl SimilarityScorer for HeuristicScorer {
    fn score(&self, a: &str, b: &str) -> SimilarityScore {
        let c = &self.config;
        let (na, nb) = (normalize(a), normalize(b));
        if na.is_empty() || nb.is_empty() {
            return SimilarityScore::new(0.0, MatchKind::TokenOverlap);
        }
        if na == nb {
            return SimilarityScore::new(c.exact, MatchKind::Exact);
        }

        let (ta, tb) = (tokens(&na), tokens(&nb));
        let (set_a, set_b): (BTreeSet<&str>, BTreeSet<&str>) =
            (ta.iter().copied().collect(), tb.iter().copied().collect());
        if set_a == set_b {
            return SimilarityScore::new(c.reordered, MatchKind::Reordered);
        }

        let (qa, qb) = (split_qualifier(a), split_qualifier(b));
        if !qa.base.is_empty() && qa.base == qb.base {
            match (&qa.qualifier, &qb.qualifier) {
                (Some(_), None) | (None, Some(_)) => {
                    return SimilarityScore::new(c.qualifier_match, MatchKind::Qualifier);
                }
                (Some(_), Some(_)) => {
                    return SimilarityScore::new(c.qualifier_conflict, MatchKind::QualifierConflict);
                }
                (None, None) => {}
            }
        }

        let (short, long) = if ta.len() <= tb.len() { (&ta, &tb) } else { (&tb, &ta) };
        #[allow(clippy::cast_precision_loss)]
        let ratio = short.len() as f64 / long.len() as f64;
        if long.starts_with(short) {
            return SimilarityScore::new(
                band(c.prefix_floor, c.prefix_ceiling, ratio),
                MatchKind::Prefix,
            );
        }
        if long.windows(short.len()).any(|w| w == short.as_slice()) {
            return SimilarityScore::new(
                band(c.substring_floor, c.substring_ceiling, ratio),
                MatchKind::Substring,
            );
        }

        SimilarityScore::new(
            jaccard(&set_a, &set_b) * c.jaccard_weight,
            MatchKind::TokenOverlap,
        )
    }
}

/// Interpolate within `[floor, ceiling)`; `ratio` is strictly below 1 here
fn band(floor: f64, ceiling: f64, ratio: f64) -> f64 {
    floor + (ceiling - floor) * ratio.clamp(0.0, 1.0) * 0.999
}

/// Jaccard index of two token sets
///
/// J(A, B) = |A ∩ B| / |A ∪ B|, 0.0 when both are empty
#[must_use]
pub fn jaccard(a: &BTreeSet<&str>, b: &BTreeSet<&str>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let score = a.intersection(b).count() as f64 / union as f64;
    score
}

/// Normalise a group name for comparison
///
/// Lowercases, turns every run of punctuation or whitespace into a single
/// space and trims, so `"ABC Medical, LLC"` and `"abc  medical llc"` agree.
#[must_use]
pub fn normalize(name: &str) -> String {
    let lowered = name.to_lowercase();
    match SEPARATOR_RE.as_ref() {
        Some(re) => re.replace_all(&lowered, " ").trim().to_string(),
        None => lowered.split_whitespace().collect::<Vec<_>>().join(" "),
    }
}

fn tokens(normalized: &str) -> Vec<&str> {
    normalized.split(' ').filter(|t| !t.is_empty()).collect()
}

/// Name split into base and optional trailing qualifier, both normalised
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName {
    /// Name without the qualifier
    pub base: String,
    /// Text inside the trailing parentheses
    pub qualifier: Option<String>,
}

/// Split `Name (Qualifier)` into its parts
#[must_use]
pub fn split_qualifier(name: &str) -> QualifiedName {
    let captures = QUALIFIER_RE.as_ref().and_then(|re| re.captures(name));
    match captures {
        Some(caps) => {
            let base = caps.get(1).map_or("", |m| m.as_str());
            let qualifier = caps.get(2).map_or("", |m| m.as_str());
            let qualifier = normalize(qualifier);
            QualifiedName {
                base: normalize(base),
                qualifier: (!qualifier.is_empty()).then_some(qualifier),
            }
        }
        None => QualifiedName {
            base: normalize(name),
            qualifier: None,
        },
    }
}
