//! Multi-attribute similarity scoring and ranking.
//!
//! Similarity is the complement of the mean relative deviation over the
//! scorable attributes present in the query. Relative deviation is used
//! because radius and orbital period span orders of magnitude across the
//! catalog.

use std::cmp::Ordering;

use serde::Serialize;
use tracing::debug;

use crate::errors::{ExocatError, ExocatResult};
use crate::models::{NumericAttribute, PlanetRecord, QueryVector, SimilarPlanet};
use crate::query::guards::{
    clamp_limit, DEFAULT_SIMILARITY_LIMIT, DEFAULT_SIMILAR_PLANETS, MAX_SIMILARITY_LIMIT,
};
use crate::random::RandomSource;

/// Attributes that participate in similarity math, equally weighted.
pub const SCORABLE_ATTRIBUTES: &[NumericAttribute] = &[
    NumericAttribute::RadiusEarth,
    NumericAttribute::OrbitalPeriodDays,
];

/// A record paired with its similarity to a query. Produced fresh per call.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityResult<'a> {
    pub record: &'a PlanetRecord,
    pub score: f64,
}

impl SimilarityResult<'_> {
    pub fn to_similar_planet(&self) -> SimilarPlanet {
        SimilarPlanet {
            record: self.record.clone(),
            similarity_score: self.score,
        }
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Collect the scorable `(attribute, target)` pairs of `query`.
///
/// Fails with `InvalidQuery` when a present target is zero or non-finite and
/// with `InsufficientQuery` when no scorable attribute is present.
pub fn scorable_targets(query: &QueryVector) -> ExocatResult<Vec<(NumericAttribute, f64)>> {
    let mut targets = Vec::with_capacity(SCORABLE_ATTRIBUTES.len());
    for attribute in SCORABLE_ATTRIBUTES {
        if let Some(target) = query.get(*attribute) {
            if target == 0.0 || !target.is_finite() {
                return Err(ExocatError::InvalidQuery {
                    attribute: attribute.name().to_string(),
                });
            }
            targets.push((*attribute, target));
        }
    }
    if targets.is_empty() {
        return Err(ExocatError::InsufficientQuery);
    }
    Ok(targets)
}

fn score_targets(targets: &[(NumericAttribute, f64)], record: &PlanetRecord) -> f64 {
    let total: f64 = targets
        .iter()
        .map(|(attribute, target)| (attribute.value_of(record) - target).abs() / target.abs())
        .sum();
    let mean = total / targets.len() as f64;
    (1.0 - mean).max(0.0)
}

/// Similarity of `record` to `query`, in `[0, 1]`.
pub fn score(query: &QueryVector, record: &PlanetRecord) -> ExocatResult<f64> {
    let targets = scorable_targets(query)?;
    Ok(score_targets(&targets, record))
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
pub struct RankOptions {
    /// Records farther than this are dropped before scoring.
    pub max_distance_ly: Option<f64>,
    /// Records scoring below this are dropped after scoring.
    pub min_similarity: f64,
    pub limit: usize,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            max_distance_ly: None,
            min_similarity: 0.0,
            limit: DEFAULT_SIMILARITY_LIMIT,
        }
    }
}

fn sort_descending(results: &mut [SimilarityResult<'_>]) {
    // `sort_by` is stable, so equal scores keep catalog order.
    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
}

/// Rank `records` against `query`, best match first.
pub fn rank_similar<'a, I>(
    query: &QueryVector,
    records: I,
    options: &RankOptions,
) -> ExocatResult<Vec<SimilarityResult<'a>>>
where
    I: IntoIterator<Item = &'a PlanetRecord>,
{
    let targets = scorable_targets(query)?;
    let limit = clamp_limit(options.limit, MAX_SIMILARITY_LIMIT);

    let mut results: Vec<SimilarityResult<'a>> = records
        .into_iter()
        .filter(|record| match options.max_distance_ly {
            Some(max_distance) => record.distance_ly <= max_distance,
            None => true,
        })
        .map(|record| SimilarityResult {
            record,
            score: score_targets(&targets, record),
        })
        .filter(|result| result.score >= options.min_similarity)
        .collect();

    sort_descending(&mut results);
    results.truncate(limit);
    debug!(
        matches = results.len(),
        limit,
        min_similarity = options.min_similarity,
        "ranked similar records"
    );
    Ok(results)
}

/// What to compare against when looking for confirmed look-alikes.
#[derive(Clone, Debug)]
pub enum SimilarityAnchor<'a> {
    Record(&'a PlanetRecord),
    Query(QueryVector),
}

impl<'a> From<&'a PlanetRecord> for SimilarityAnchor<'a> {
    fn from(record: &'a PlanetRecord) -> Self {
        SimilarityAnchor::Record(record)
    }
}

impl From<QueryVector> for SimilarityAnchor<'_> {
    fn from(query: QueryVector) -> Self {
        SimilarityAnchor::Query(query)
    }
}

/// The `n` most similar CONFIRMED records. A record anchor never matches
/// itself.
pub fn top_confirmed_similar<'a, 'b, I>(
    anchor: impl Into<SimilarityAnchor<'b>>,
    records: I,
    n: usize,
) -> ExocatResult<Vec<SimilarityResult<'a>>>
where
    I: IntoIterator<Item = &'a PlanetRecord>,
{
    let anchor = anchor.into();
    let (query, exclude_id) = match &anchor {
        SimilarityAnchor::Record(record) => (QueryVector::from(*record), Some(record.id.as_str())),
        SimilarityAnchor::Query(query) => (query.clone(), None),
    };
    let confirmed = records
        .into_iter()
        .filter(|record| record.is_confirmed())
        .filter(|record| Some(record.id.as_str()) != exclude_id);
    let options = RankOptions {
        limit: n,
        ..RankOptions::default()
    };
    rank_similar(&query, confirmed, &options)
}

/// [`top_confirmed_similar`] with the default count of three.
pub fn top_confirmed_similar_default<'a, 'b, I>(
    anchor: impl Into<SimilarityAnchor<'b>>,
    records: I,
) -> ExocatResult<Vec<SimilarityResult<'a>>>
where
    I: IntoIterator<Item = &'a PlanetRecord>,
{
    top_confirmed_similar(anchor, records, DEFAULT_SIMILAR_PLANETS)
}

// ---------------------------------------------------------------------------
// Batch comparison
// ---------------------------------------------------------------------------

/// A record paired with its batch comparison score in `[0, 100)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult<'a> {
    pub record: &'a PlanetRecord,
    pub comparison_score: f64,
}

/// Score every record with one `uniform(0, 100)` draw, in input order, and
/// keep the `n` best. Equal scores keep input order.
pub fn batch_compare<'a, I>(
    records: I,
    rng: &mut dyn RandomSource,
    n: usize,
) -> Vec<ComparisonResult<'a>>
where
    I: IntoIterator<Item = &'a PlanetRecord>,
{
    let mut results: Vec<ComparisonResult<'a>> = records
        .into_iter()
        .map(|record| ComparisonResult {
            record,
            comparison_score: rng.uniform(0.0, 100.0),
        })
        .collect();
    let compared = results.len();
    results.sort_by(|a, b| {
        b.comparison_score
            .partial_cmp(&a.comparison_score)
            .unwrap_or(Ordering::Equal)
    });
    results.truncate(n);
    debug!(compared, kept = results.len(), "batch comparison");
    results
}
