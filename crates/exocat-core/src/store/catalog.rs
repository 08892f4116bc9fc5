//! Immutable in-memory planet catalog.
//!
//! The catalog is populated once from a caller-supplied record sequence and
//! exposes read-only access afterwards. Insertion order is preserved and is the
//! tie-breaking order used by every ranking in the query layer.

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::errors::{ExocatError, ExocatResult};
use crate::models::PlanetRecord;
use crate::store::sample::SAMPLE_CATALOG_JSON;

#[derive(Clone, Debug, Default)]
pub struct CatalogStore {
    records: IndexMap<String, PlanetRecord>,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn invalid(record: &PlanetRecord, reason: &str) -> ExocatError {
    ExocatError::InvalidRecord {
        id: record.id.clone(),
        reason: reason.to_string(),
    }
}

fn validate_record(record: &PlanetRecord) -> ExocatResult<()> {
    if record.id.trim().is_empty() {
        return Err(invalid(record, "id must not be empty"));
    }
    let non_negative = [
        ("distanceLy", record.distance_ly),
        ("transitDepthPpm", record.transit_depth_ppm),
    ];
    for (name, value) in non_negative {
        if !value.is_finite() || value < 0.0 {
            return Err(invalid(record, &format!("{name} must be >= 0")));
        }
    }
    let positive = [
        ("radiusEarth", record.radius_earth),
        ("orbitalPeriodDays", record.orbital_period_days),
        ("stellarTempK", record.stellar_temp_k),
    ];
    for (name, value) in positive {
        if !value.is_finite() || value <= 0.0 {
            return Err(invalid(record, &format!("{name} must be > 0")));
        }
    }
    if !(0.0..=10.0).contains(&record.habitability_score) {
        return Err(invalid(record, "habitabilityScore must be within 0-10"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CatalogStore
// ---------------------------------------------------------------------------

impl CatalogStore {
    /// Build a catalog from `records`, rejecting duplicate ids and records
    /// that violate the data-model ranges.
    pub fn new<I>(records: I) -> ExocatResult<Self>
    where
        I: IntoIterator<Item = PlanetRecord>,
    {
        let mut map = IndexMap::new();
        for record in records {
            validate_record(&record)?;
            if map.contains_key(&record.id) {
                return Err(ExocatError::DuplicateId(record.id));
            }
            map.insert(record.id.clone(), record);
        }
        info!(records = map.len(), "catalog loaded");
        Ok(Self { records: map })
    }

    /// Load a catalog from a JSON array of planet records.
    pub fn from_json_str(json: &str) -> ExocatResult<Self> {
        let records: Vec<PlanetRecord> = serde_json::from_str(json)?;
        Self::new(records)
    }

    /// The reference dataset bundled with the browser.
    pub fn sample() -> ExocatResult<Self> {
        Self::from_json_str(SAMPLE_CATALOG_JSON)
    }

    /// All records in insertion order.
    pub fn all_records(&self) -> Vec<&PlanetRecord> {
        self.records.values().collect()
    }

    pub fn records(&self) -> impl Iterator<Item = &PlanetRecord> + '_ {
        self.records.values()
    }

    pub fn find_by_id(&self, id: &str) -> ExocatResult<&PlanetRecord> {
        self.records.get(id).ok_or_else(|| {
            debug!(id, "catalog lookup missed");
            ExocatError::NotFound(id.to_string())
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlanetClassification;

    fn record(id: &str) -> PlanetRecord {
        PlanetRecord {
            id: id.to_string(),
            name: format!("Planet {id}"),
            classification: PlanetClassification::Candidate,
            discovery_date: "2020-01-01".parse().unwrap(),
            distance_ly: 10.0,
            radius_earth: 1.0,
            orbital_period_days: 10.0,
            stellar_temp_k: 5000.0,
            transit_depth_ppm: 100.0,
            habitability_score: 5.0,
            discovery_mission: "TESS".to_string(),
        }
    }

    #[test]
    fn test_sample_preserves_insertion_order() {
        let catalog = CatalogStore::sample().unwrap();
        let ids: Vec<&str> = catalog.all_records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["KEP-452b", "TRAPPIST-1e", "TOI-715b", "K2-18b", "LHS-1140b"]
        );
        assert_eq!(catalog.len(), 5);
        assert!(!catalog.is_empty());
    }

    #[test]
    fn test_find_by_id_hit() {
        let catalog = CatalogStore::sample().unwrap();
        let planet = catalog.find_by_id("K2-18b").unwrap();
        assert_eq!(planet.name, "K2-18 b");
        assert_eq!(planet.habitability_score, 8.7);
    }

    #[test]
    fn test_find_by_id_missing_is_not_found() {
        let catalog = CatalogStore::sample().unwrap();
        let err = catalog.find_by_id("KOI-9999").unwrap_err();
        assert!(matches!(err, ExocatError::NotFound(ref id) if id == "KOI-9999"));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let err = CatalogStore::new(vec![record("a"), record("b"), record("a")]).unwrap_err();
        assert!(matches!(err, ExocatError::DuplicateId(ref id) if id == "a"));
    }

    #[test]
    fn test_invalid_radius_rejected() {
        let mut bad = record("zero-radius");
        bad.radius_earth = 0.0;
        let err = CatalogStore::new(vec![bad]).unwrap_err();
        assert!(matches!(err, ExocatError::InvalidRecord { ref id, .. } if id == "zero-radius"));
    }

    #[test]
    fn test_habitability_out_of_range_rejected() {
        let mut bad = record("too-habitable");
        bad.habitability_score = 10.5;
        assert!(CatalogStore::new(vec![bad]).is_err());
    }

    #[test]
    fn test_from_json_accepts_legacy_snake_case_keys() {
        let json = r#"[{
            "id": "KEP-452b",
            "name": "Kepler-452b",
            "classification": "CONFIRMED",
            "discovery_date": "2015-07-23",
            "distance_ly": 1402,
            "radius_earth": 1.6,
            "orbital_period_days": 385.0,
            "stellar_temp_k": 5757,
            "transit_depth_ppm": 115,
            "habitability_score": 8.2,
            "similarity_match": 0.94,
            "discovery_mission": "Kepler"
        }]"#;
        let catalog = CatalogStore::from_json_str(json).unwrap();
        let planet = catalog.find_by_id("KEP-452b").unwrap();
        assert_eq!(planet.distance_ly, 1402.0);
        assert_eq!(planet.discovery_date.to_string(), "2015-07-23");
    }

    #[test]
    fn test_from_json_malformed() {
        let err = CatalogStore::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, ExocatError::Json(_)));
    }
}
