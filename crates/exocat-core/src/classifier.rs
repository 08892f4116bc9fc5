//! Heuristic classification simulator.
//!
//! Stands in for a real inference service. The verdict is a deterministic
//! function of the request, the factor table, the catalog and the injected
//! [`RandomSource`]; draws happen in a fixed order:
//!
//! 1. base accuracy, `98.5 - uniform(0, 2)`
//! 2. random factor, `uniform(0, 1)`
//! 3. insufficient-data roll, `uniform(0, 1) < 0.2`
//! 4. one observed score per detection factor, `uniform(0.7, 1.0)`
//! 5. processing time, `uniform(1, 3)` rounded to one decimal
//! 6. reference dataset, `floor(uniform(0, 1) * datasets)`

use std::cmp::Ordering;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::errors::{ExocatError, ExocatResult};
use crate::models::{
    AnalysisParameter, ClassificationVerdict, DataSource, DatasetDescriptor, DetectionFactor,
    FactorScore, PlanetRecord, QueryVector, SimilarPlanet, VerdictLabel,
};
use crate::query::guards::DEFAULT_SIMILAR_PLANETS;
use crate::query::similarity::{scorable_targets, top_confirmed_similar};
use crate::random::RandomSource;
use crate::store::catalog::CatalogStore;

pub const ALLOWED_UPLOAD_EXTENSIONS: &[&str] = &["csv", "fits"];

const INSUFFICIENT_DATA_RATE: f64 = 0.2;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Opaque handle to an uploaded light-curve file. Content is never read here;
/// a parsing collaborator may attach extracted parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadHandle {
    file_name: String,
    #[serde(default)]
    parameters: Option<QueryVector>,
}

impl UploadHandle {
    /// Accepts `.csv` and `.fits` files, case-insensitively.
    pub fn new(file_name: impl Into<String>) -> ExocatResult<Self> {
        let file_name = file_name.into();
        let extension = Path::new(&file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        match extension {
            Some(ext) if ALLOWED_UPLOAD_EXTENSIONS.contains(&ext.as_str()) => Ok(Self {
                file_name,
                parameters: None,
            }),
            _ => Err(ExocatError::UnsupportedUpload(file_name)),
        }
    }

    pub fn with_parameters(mut self, parameters: QueryVector) -> Self {
        self.parameters = Some(parameters);
        self
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn parameters(&self) -> Option<&QueryVector> {
        self.parameters.as_ref()
    }
}

/// Parameters typed in by hand. Plausibility is not checked.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ManualParameters {
    pub orbital_period_days: Option<f64>,
    pub transit_duration_hours: Option<f64>,
    pub radius_earth: Option<f64>,
    pub stellar_temp_k: Option<f64>,
    pub transit_depth_ppm: Option<f64>,
}

impl ManualParameters {
    pub fn to_query_vector(&self) -> QueryVector {
        QueryVector {
            radius_earth: self.radius_earth,
            orbital_period_days: self.orbital_period_days,
            distance_ly: None,
            transit_depth_ppm: self.transit_depth_ppm,
            stellar_temp_k: self.stellar_temp_k,
        }
    }
}

/// One analysis invocation. At least one of the two inputs must be present;
/// an upload takes precedence as the data source.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisRequest {
    pub upload: Option<UploadHandle>,
    pub manual: Option<ManualParameters>,
}

impl AnalysisRequest {
    pub fn from_upload(upload: UploadHandle) -> Self {
        Self {
            upload: Some(upload),
            manual: None,
        }
    }

    pub fn from_manual(manual: ManualParameters) -> Self {
        Self {
            upload: None,
            manual: Some(manual),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.upload.is_none() && self.manual.is_none()
    }

    pub fn data_source(&self) -> Option<DataSource> {
        if self.upload.is_some() {
            Some(DataSource::FileUpload)
        } else if self.manual.is_some() {
            Some(DataSource::ManualInput)
        } else {
            None
        }
    }

    /// Upload parameters when a collaborator supplied them, otherwise the
    /// manual vector, otherwise an empty query.
    pub fn query_vector(&self) -> QueryVector {
        if let Some(parameters) = self.upload.as_ref().and_then(UploadHandle::parameters) {
            return parameters.clone();
        }
        self.manual
            .as_ref()
            .map(ManualParameters::to_query_vector)
            .unwrap_or_default()
    }

    fn transit_duration_hours(&self) -> Option<f64> {
        let upload_has_parameters = self
            .upload
            .as_ref()
            .is_some_and(|upload| upload.parameters.is_some());
        if upload_has_parameters {
            return None;
        }
        self.manual.as_ref().and_then(|m| m.transit_duration_hours)
    }

    /// The analysed values, for display alongside the verdict.
    pub fn analysis_parameters(&self) -> Vec<AnalysisParameter> {
        let query = self.query_vector();
        let fields = [
            ("Orbital Period", query.orbital_period_days, "days"),
            ("Transit Depth", query.transit_depth_ppm, "ppm"),
            ("Transit Duration", self.transit_duration_hours(), "hours"),
            ("Planet Radius", query.radius_earth, "Earth radii"),
            ("Stellar Temperature", query.stellar_temp_k, "K"),
            ("Distance", query.distance_ly, "light-years"),
        ];
        fields
            .into_iter()
            .filter_map(|(name, value, unit)| {
                value.map(|value| AnalysisParameter {
                    name: name.to_string(),
                    value,
                    unit: unit.to_string(),
                })
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Static tables
// ---------------------------------------------------------------------------

fn factor(
    name: &str,
    importance: f64,
    description: &str,
    scientific_basis: &str,
) -> DetectionFactor {
    DetectionFactor {
        name: name.to_string(),
        importance,
        description: description.to_string(),
        scientific_basis: scientific_basis.to_string(),
    }
}

/// The explanatory factors reported with every verdict.
pub fn default_detection_factors() -> Vec<DetectionFactor> {
    vec![
        factor(
            "Transit Depth Consistency",
            0.28,
            "Measures consistency of light dimming across multiple transits",
            "Planetary transits show consistent depth while stellar activity varies",
        ),
        factor(
            "Orbital Period Stability",
            0.24,
            "Evaluates regularity of transit timing intervals",
            "Planets maintain stable orbits while stellar phenomena are irregular",
        ),
        factor(
            "Signal-to-Noise Ratio",
            0.19,
            "Assesses signal strength above background noise level",
            "Strong, clear signals indicate genuine astrophysical phenomena",
        ),
        factor(
            "Stellar Activity Assessment",
            0.16,
            "Rules out stellar variability as the signal source",
            "Stellar activity patterns differ from planetary transit signatures",
        ),
        factor(
            "Multi-Transit Detection",
            0.13,
            "Confirms multiple transit events with consistent parameters",
            "Multiple consistent transits strongly support planetary hypothesis",
        ),
    ]
}

fn dataset(name: &str, description: &str, size: &str) -> DatasetDescriptor {
    DatasetDescriptor {
        name: name.to_string(),
        description: description.to_string(),
        size: size.to_string(),
    }
}

pub fn default_reference_datasets() -> Vec<DatasetDescriptor> {
    vec![
        dataset(
            "Kepler DR25 Catalog",
            "Comprehensive catalog of Kepler mission transit candidates with validated parameters",
            "34,032 targets",
        ),
        dataset(
            "TESS Input Catalog v8.2",
            "Latest TESS mission data with high-precision photometry",
            "468,087 targets",
        ),
        dataset(
            "Gaia DR3 Stellar Parameters",
            "Precise stellar characterization from Gaia mission",
            "1.8 billion stars",
        ),
    ]
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// The decision table: first matching row wins.
pub fn decide(base_accuracy: f64, random_factor: f64) -> (VerdictLabel, f64) {
    if base_accuracy > 96.0 && random_factor > 0.3 {
        (VerdictLabel::Confirmed, base_accuracy)
    } else if base_accuracy > 93.0 || (base_accuracy > 90.0 && random_factor > 0.5) {
        (VerdictLabel::Candidate, base_accuracy * 0.9)
    } else {
        (VerdictLabel::FalsePositive, base_accuracy * 0.8)
    }
}

fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// ---------------------------------------------------------------------------
// Simulator
// ---------------------------------------------------------------------------

pub struct ClassificationSimulator<'a> {
    catalog: &'a CatalogStore,
    clock: Arc<dyn Clock>,
    datasets: Vec<DatasetDescriptor>,
    similar_count: usize,
}

impl<'a> ClassificationSimulator<'a> {
    pub fn new(catalog: &'a CatalogStore, clock: Arc<dyn Clock>) -> Self {
        Self {
            catalog,
            clock,
            datasets: default_reference_datasets(),
            similar_count: DEFAULT_SIMILAR_PLANETS,
        }
    }

    /// Replace the reference datasets. An empty list keeps the defaults.
    pub fn with_datasets(mut self, datasets: Vec<DatasetDescriptor>) -> Self {
        if datasets.is_empty() {
            warn!("empty reference dataset list ignored");
        } else {
            self.datasets = datasets;
        }
        self
    }

    pub fn with_similar_count(mut self, similar_count: usize) -> Self {
        self.similar_count = similar_count;
        self
    }

    pub fn classify(
        &self,
        request: &AnalysisRequest,
        factors: &[DetectionFactor],
        rng: &mut dyn RandomSource,
    ) -> ExocatResult<ClassificationVerdict> {
        let data_source = request.data_source().ok_or(ExocatError::NoInput)?;

        let base_accuracy = 98.5 - rng.uniform(0.0, 2.0);
        let random_factor = rng.uniform(0.0, 1.0);
        let (label, confidence) = decide(base_accuracy, random_factor);
        let insufficient_data = rng.uniform(0.0, 1.0) < INSUFFICIENT_DATA_RATE;

        let mut scored: Vec<FactorScore> = factors
            .iter()
            .map(|factor| FactorScore {
                name: factor.name.clone(),
                importance: factor.importance,
                observed_score: rng.uniform(0.7, 1.0),
            })
            .collect();
        scored.sort_by(|a, b| {
            b.importance
                .partial_cmp(&a.importance)
                .unwrap_or(Ordering::Equal)
        });

        let query = request.query_vector();
        let similar_planets = self.similar_planets(&query)?;

        let processing_time_seconds = round_tenths(rng.uniform(1.0, 3.0));
        let dataset = self.pick_dataset(rng);

        info!(
            label = %label,
            confidence,
            insufficient_data,
            similar = similar_planets.len(),
            "classification complete"
        );

        Ok(ClassificationVerdict {
            label,
            confidence,
            factors: scored,
            parameters: request.analysis_parameters(),
            dataset,
            similar_planets,
            insufficient_data,
            processing_time_seconds,
            data_source,
            created_at: self.clock.now(),
        })
    }

    fn similar_planets(&self, query: &QueryVector) -> ExocatResult<Vec<SimilarPlanet>> {
        match scorable_targets(query) {
            Ok(_) => Ok(top_confirmed_similar(
                query.clone(),
                self.catalog.records(),
                self.similar_count,
            )?
            .iter()
            .map(|result| result.to_similar_planet())
            .collect()),
            Err(ExocatError::InsufficientQuery) => {
                debug!("no scorable input, falling back to lowest-id confirmed records");
                Ok(self.fallback_similar())
            }
            Err(err) => Err(err),
        }
    }

    fn fallback_similar(&self) -> Vec<SimilarPlanet> {
        let mut confirmed: Vec<&PlanetRecord> = self
            .catalog
            .records()
            .filter(|record| record.is_confirmed())
            .collect();
        confirmed.sort_by(|a, b| a.id.cmp(&b.id));
        confirmed
            .into_iter()
            .take(self.similar_count)
            .map(|record| SimilarPlanet {
                record: record.clone(),
                similarity_score: 0.0,
            })
            .collect()
    }

    fn pick_dataset(&self, rng: &mut dyn RandomSource) -> DatasetDescriptor {
        let count = self.datasets.len();
        let index = ((rng.uniform(0.0, 1.0) * count as f64) as usize).min(count - 1);
        self.datasets[index].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::random::ScriptedRandom;

    fn clock() -> Arc<dyn Clock> {
        Arc::new(ManualClock::new("2025-10-04T14:32:00Z".parse().unwrap()))
    }

    fn manual_request() -> AnalysisRequest {
        AnalysisRequest::from_manual(ManualParameters {
            orbital_period_days: Some(24.7),
            transit_duration_hours: Some(3.2),
            radius_earth: Some(1.4),
            stellar_temp_k: Some(5778.0),
            transit_depth_ppm: Some(156.0),
        })
    }

    #[test]
    fn test_classify_pinned_draws() {
        let catalog = CatalogStore::sample().unwrap();
        let simulator = ClassificationSimulator::new(&catalog, clock());
        // base, factor, insufficient, five factor scores, processing, dataset
        let mut rng =
            ScriptedRandom::new([0.5, 0.6, 0.8, 0.0, 0.5, 1.0 / 3.0, 0.0, 0.0, 0.75, 0.5]);
        let verdict = simulator
            .classify(&manual_request(), &default_detection_factors(), &mut rng)
            .unwrap();

        assert_eq!(verdict.label, VerdictLabel::Confirmed);
        assert_eq!(verdict.confidence, 97.5);
        assert!(!verdict.insufficient_data);
        assert_eq!(verdict.processing_time_seconds, 2.5);
        assert_eq!(verdict.dataset.name, "TESS Input Catalog v8.2");
        assert_eq!(verdict.data_source, DataSource::ManualInput);
        assert_eq!(verdict.created_at.to_rfc3339(), "2025-10-04T14:32:00+00:00");

        let names: Vec<&str> = verdict.factors.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Transit Depth Consistency",
                "Orbital Period Stability",
                "Signal-to-Noise Ratio",
                "Stellar Activity Assessment",
                "Multi-Transit Detection",
            ]
        );
        assert_eq!(verdict.factors[0].observed_score, 0.7);
        assert!((verdict.factors[1].observed_score - 0.85).abs() < 1e-12);
        for factor in &verdict.factors {
            assert!((0.7..=1.0).contains(&factor.observed_score));
        }

        let similar: Vec<&str> = verdict
            .similar_planets
            .iter()
            .map(|p| p.record.id.as_str())
            .collect();
        assert_eq!(similar[0], "LHS-1140b");
        assert_eq!(verdict.similar_planets.len(), 3);
        assert!(verdict.similar_planets.iter().all(|p| p.record.is_confirmed()));
    }

    #[test]
    fn test_classify_low_random_factor_is_candidate() {
        let catalog = CatalogStore::sample().unwrap();
        let simulator = ClassificationSimulator::new(&catalog, clock());
        let mut rng = ScriptedRandom::new([0.0, 0.2, 0.1]);
        let verdict = simulator
            .classify(&manual_request(), &default_detection_factors(), &mut rng)
            .unwrap();
        assert_eq!(verdict.label, VerdictLabel::Candidate);
        assert_eq!(verdict.confidence, 98.5 * 0.9);
        assert!(verdict.insufficient_data);
    }

    #[test]
    fn test_decision_table_rows() {
        assert_eq!(decide(97.0, 0.31), (VerdictLabel::Confirmed, 97.0));
        assert_eq!(decide(97.0, 0.3), (VerdictLabel::Candidate, 97.0 * 0.9));
        assert_eq!(decide(92.0, 0.6), (VerdictLabel::Candidate, 92.0 * 0.9));
        assert_eq!(decide(92.0, 0.5), (VerdictLabel::FalsePositive, 92.0 * 0.8));
        assert_eq!(decide(89.0, 0.9), (VerdictLabel::FalsePositive, 89.0 * 0.8));
    }

    #[test]
    fn test_classify_without_input_fails() {
        let catalog = CatalogStore::sample().unwrap();
        let simulator = ClassificationSimulator::new(&catalog, clock());
        let mut rng = ScriptedRandom::new([0.5]);
        let err = simulator
            .classify(&AnalysisRequest::default(), &default_detection_factors(), &mut rng)
            .unwrap_err();
        assert!(matches!(err, ExocatError::NoInput));
    }

    #[test]
    fn test_upload_without_parameters_falls_back_to_lowest_ids() {
        let catalog = CatalogStore::sample().unwrap();
        let simulator = ClassificationSimulator::new(&catalog, clock());
        let upload = UploadHandle::new("lightcurve.FITS").unwrap();
        let mut rng = ScriptedRandom::new([0.5, 0.6, 0.8]);
        let verdict = simulator
            .classify(&AnalysisRequest::from_upload(upload), &default_detection_factors(), &mut rng)
            .unwrap();
        let similar: Vec<&str> = verdict
            .similar_planets
            .iter()
            .map(|p| p.record.id.as_str())
            .collect();
        assert_eq!(similar, vec!["K2-18b", "KEP-452b", "LHS-1140b"]);
        assert!(verdict.similar_planets.iter().all(|p| p.similarity_score == 0.0));
        assert_eq!(verdict.data_source, DataSource::FileUpload);
        assert!(verdict.parameters.is_empty());
    }

    #[test]
    fn test_upload_parameters_take_precedence() {
        let catalog = CatalogStore::sample().unwrap();
        let simulator = ClassificationSimulator::new(&catalog, clock()).with_similar_count(1);
        let upload = UploadHandle::new("k2.csv")
            .unwrap()
            .with_parameters(QueryVector::radius_period(2.3, 33.0));
        let request = AnalysisRequest {
            upload: Some(upload),
            manual: manual_request().manual,
        };
        let mut rng = ScriptedRandom::new([0.5]);
        let verdict = simulator
            .classify(&request, &default_detection_factors(), &mut rng)
            .unwrap();
        assert_eq!(verdict.similar_planets.len(), 1);
        assert_eq!(verdict.similar_planets[0].record.id, "K2-18b");
        let names: Vec<&str> = verdict.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Orbital Period", "Planet Radius"]);
    }

    #[test]
    fn test_zero_valued_input_is_rejected() {
        let catalog = CatalogStore::sample().unwrap();
        let simulator = ClassificationSimulator::new(&catalog, clock());
        let request = AnalysisRequest::from_manual(ManualParameters {
            radius_earth: Some(0.0),
            ..ManualParameters::default()
        });
        let mut rng = ScriptedRandom::new([0.5]);
        let err = simulator
            .classify(&request, &default_detection_factors(), &mut rng)
            .unwrap_err();
        assert!(matches!(err, ExocatError::InvalidQuery { .. }));
    }

    #[test]
    fn test_manual_parameters_echoed() {
        let params = manual_request().analysis_parameters();
        let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Orbital Period",
                "Transit Depth",
                "Transit Duration",
                "Planet Radius",
                "Stellar Temperature",
            ]
        );
        assert_eq!(params[2].value, 3.2);
        assert_eq!(params[2].unit, "hours");
    }

    #[test]
    fn test_upload_extension_checked() {
        assert!(UploadHandle::new("curve.csv").is_ok());
        assert!(UploadHandle::new("curve.Fits").is_ok());
        assert!(matches!(
            UploadHandle::new("curve.txt"),
            Err(ExocatError::UnsupportedUpload(_))
        ));
        assert!(UploadHandle::new("noextension").is_err());
    }

    #[test]
    fn test_same_seed_same_verdict() {
        use crate::random::SeededRandom;

        let catalog = CatalogStore::sample().unwrap();
        let simulator = ClassificationSimulator::new(&catalog, clock());
        let factors = default_detection_factors();
        let a = simulator
            .classify(&manual_request(), &factors, &mut SeededRandom::from_seed(7))
            .unwrap();
        let b = simulator
            .classify(&manual_request(), &factors, &mut SeededRandom::from_seed(7))
            .unwrap();
        assert_eq!(a, b);
        assert!((0.0..=100.0).contains(&a.confidence));
    }
}
