//! Summary counts over a record set.

use serde::{Deserialize, Serialize};

use crate::models::{PlanetClassification, PlanetRecord};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSummary {
    pub total: usize,
    pub confirmed: usize,
    pub candidates: usize,
    pub false_positives: usize,
    /// Mean distance of the summarized records; `None` for an empty set.
    pub average_distance_ly: Option<f64>,
}

pub fn summarize<'a, I>(records: I) -> CatalogSummary
where
    I: IntoIterator<Item = &'a PlanetRecord>,
{
    let mut summary = CatalogSummary::default();
    let mut total_distance = 0.0;
    for record in records {
        summary.total += 1;
        total_distance += record.distance_ly;
        match record.classification {
            PlanetClassification::Confirmed => summary.confirmed += 1,
            PlanetClassification::Candidate => summary.candidates += 1,
            PlanetClassification::FalsePositive => summary.false_positives += 1,
        }
    }
    if summary.total > 0 {
        summary.average_distance_ly = Some(total_distance / summary.total as f64);
    }
    summary
}
