//! Shared typed models used across the catalog, query, classifier and history
//! layers.
//!
//! Every model serializes with camelCase field names so exported documents keep
//! the catalog's native vocabulary (`distanceLy`, `radiusEarth`, ...).
//! Timestamps serialize as RFC 3339 strings via chrono.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ExocatError;

// ---------------------------------------------------------------------------
// 1. PlanetClassification
// ---------------------------------------------------------------------------

/// Catalog-level disposition of a planetary record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanetClassification {
    Confirmed,
    Candidate,
    FalsePositive,
}

impl PlanetClassification {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanetClassification::Confirmed => "CONFIRMED",
            PlanetClassification::Candidate => "CANDIDATE",
            PlanetClassification::FalsePositive => "FALSE_POSITIVE",
        }
    }
}

impl fmt::Display for PlanetClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanetClassification {
    type Err = ExocatError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "CONFIRMED" => Ok(PlanetClassification::Confirmed),
            "CANDIDATE" => Ok(PlanetClassification::Candidate),
            "FALSE_POSITIVE" => Ok(PlanetClassification::FalsePositive),
            _ => Err(ExocatError::InvalidFilter(format!(
                "unknown classification '{value}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// 2. PlanetRecord
// ---------------------------------------------------------------------------

/// A single catalog entry. Records are loaded once and never mutated.
///
/// Deserialization also accepts the snake_case keys of legacy dataset dumps.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanetRecord {
    pub id: String,
    pub name: String,
    pub classification: PlanetClassification,
    #[serde(alias = "discovery_date")]
    pub discovery_date: NaiveDate,
    #[serde(alias = "distance_ly")]
    pub distance_ly: f64,
    #[serde(alias = "radius_earth")]
    pub radius_earth: f64,
    #[serde(alias = "orbital_period_days")]
    pub orbital_period_days: f64,
    #[serde(alias = "stellar_temp_k")]
    pub stellar_temp_k: f64,
    #[serde(alias = "transit_depth_ppm")]
    pub transit_depth_ppm: f64,
    #[serde(alias = "habitability_score")]
    pub habitability_score: f64,
    #[serde(alias = "discovery_mission")]
    pub discovery_mission: String,
}

impl PlanetRecord {
    pub fn is_confirmed(&self) -> bool {
        self.classification == PlanetClassification::Confirmed
    }
}

// ---------------------------------------------------------------------------
// 3. Attributes
// ---------------------------------------------------------------------------

/// Numeric record attributes addressable by range predicates and queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NumericAttribute {
    DistanceLy,
    RadiusEarth,
    OrbitalPeriodDays,
    StellarTempK,
    TransitDepthPpm,
    HabitabilityScore,
}

impl NumericAttribute {
    pub fn name(&self) -> &'static str {
        match self {
            NumericAttribute::DistanceLy => "distanceLy",
            NumericAttribute::RadiusEarth => "radiusEarth",
            NumericAttribute::OrbitalPeriodDays => "orbitalPeriodDays",
            NumericAttribute::StellarTempK => "stellarTempK",
            NumericAttribute::TransitDepthPpm => "transitDepthPpm",
            NumericAttribute::HabitabilityScore => "habitabilityScore",
        }
    }

    pub fn value_of(&self, record: &PlanetRecord) -> f64 {
        match self {
            NumericAttribute::DistanceLy => record.distance_ly,
            NumericAttribute::RadiusEarth => record.radius_earth,
            NumericAttribute::OrbitalPeriodDays => record.orbital_period_days,
            NumericAttribute::StellarTempK => record.stellar_temp_k,
            NumericAttribute::TransitDepthPpm => record.transit_depth_ppm,
            NumericAttribute::HabitabilityScore => record.habitability_score,
        }
    }
}

impl fmt::Display for NumericAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NumericAttribute {
    type Err = ExocatError;

    /// Accepts both the camelCase export names and snake_case spellings.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized: String = value
            .trim()
            .chars()
            .filter(|c| *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "distancely" => Ok(NumericAttribute::DistanceLy),
            "radiusearth" => Ok(NumericAttribute::RadiusEarth),
            "orbitalperioddays" => Ok(NumericAttribute::OrbitalPeriodDays),
            "stellartempk" => Ok(NumericAttribute::StellarTempK),
            "transitdepthppm" => Ok(NumericAttribute::TransitDepthPpm),
            "habitabilityscore" => Ok(NumericAttribute::HabitabilityScore),
            _ => Err(ExocatError::InvalidFilter(format!(
                "unknown numeric attribute '{value}'"
            ))),
        }
    }
}

/// String-valued record attributes addressable by equality predicates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CategoricalAttribute {
    Classification,
    DiscoveryMission,
}

impl CategoricalAttribute {
    pub fn value_of<'a>(&self, record: &'a PlanetRecord) -> &'a str {
        match self {
            CategoricalAttribute::Classification => record.classification.as_str(),
            CategoricalAttribute::DiscoveryMission => &record.discovery_mission,
        }
    }
}

impl FromStr for CategoricalAttribute {
    type Err = ExocatError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "classification" => Ok(CategoricalAttribute::Classification),
            "discoveryMission" | "discovery_mission" | "mission" => {
                Ok(CategoricalAttribute::DiscoveryMission)
            }
            _ => Err(ExocatError::InvalidFilter(format!(
                "unknown categorical attribute '{value}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// 4. QueryVector
// ---------------------------------------------------------------------------

/// Partial parameter set used for similarity scoring and classification.
///
/// Unset fields are excluded from scoring; they are never treated as zero.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryVector {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius_earth: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orbital_period_days: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_ly: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transit_depth_ppm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stellar_temp_k: Option<f64>,
}

impl QueryVector {
    /// Query on radius and orbital period, the two scorable attributes.
    pub fn radius_period(radius_earth: f64, orbital_period_days: f64) -> Self {
        Self {
            radius_earth: Some(radius_earth),
            orbital_period_days: Some(orbital_period_days),
            ..Self::default()
        }
    }

    pub fn get(&self, attribute: NumericAttribute) -> Option<f64> {
        match attribute {
            NumericAttribute::RadiusEarth => self.radius_earth,
            NumericAttribute::OrbitalPeriodDays => self.orbital_period_days,
            NumericAttribute::DistanceLy => self.distance_ly,
            NumericAttribute::TransitDepthPpm => self.transit_depth_ppm,
            NumericAttribute::StellarTempK => self.stellar_temp_k,
            NumericAttribute::HabitabilityScore => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.radius_earth.is_none()
            && self.orbital_period_days.is_none()
            && self.distance_ly.is_none()
            && self.transit_depth_ppm.is_none()
            && self.stellar_temp_k.is_none()
    }
}

impl From<&PlanetRecord> for QueryVector {
    fn from(record: &PlanetRecord) -> Self {
        Self {
            radius_earth: Some(record.radius_earth),
            orbital_period_days: Some(record.orbital_period_days),
            distance_ly: Some(record.distance_ly),
            transit_depth_ppm: Some(record.transit_depth_ppm),
            stellar_temp_k: Some(record.stellar_temp_k),
        }
    }
}

// ---------------------------------------------------------------------------
// 5. Classification verdict
// ---------------------------------------------------------------------------

/// Label produced by the classification simulator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerdictLabel {
    Confirmed,
    Candidate,
    FalsePositive,
}

impl VerdictLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictLabel::Confirmed => "confirmed",
            VerdictLabel::Candidate => "candidate",
            VerdictLabel::FalsePositive => "false-positive",
        }
    }
}

impl fmt::Display for VerdictLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static explanatory factor metadata. Importance is fixed, not computed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionFactor {
    pub name: String,
    pub importance: f64,
    pub description: String,
    pub scientific_basis: String,
}

/// A detection factor with the score observed for one analysis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorScore {
    pub name: String,
    pub importance: f64,
    pub observed_score: f64,
}

/// Reference dataset the simulated analysis claims to have matched against.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetDescriptor {
    pub name: String,
    pub description: String,
    pub size: String,
}

/// One analysed input value, echoed back for display.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisParameter {
    pub name: String,
    pub value: f64,
    pub unit: String,
}

/// Where an analysis input came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    FileUpload,
    ManualInput,
}

/// Owned similarity match carried inside a verdict.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarPlanet {
    pub record: PlanetRecord,
    pub similarity_score: f64,
}

/// Output of one classification run. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationVerdict {
    pub label: VerdictLabel,
    pub confidence: f64,
    pub factors: Vec<FactorScore>,
    pub parameters: Vec<AnalysisParameter>,
    pub dataset: DatasetDescriptor,
    pub similar_planets: Vec<SimilarPlanet>,
    pub insufficient_data: bool,
    pub processing_time_seconds: f64,
    pub data_source: DataSource,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// 6. History entries
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    InProgress,
    Completed,
}

/// Discriminant of [`ActivityEvent`], used for filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Analysis,
    Search,
    Export,
}

impl FromStr for EntryKind {
    type Err = ExocatError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "analysis" => Ok(EntryKind::Analysis),
            "search" => Ok(EntryKind::Search),
            "export" => Ok(EntryKind::Export),
            other => Err(ExocatError::InvalidFilter(format!(
                "unknown history entry type '{other}'"
            ))),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<DataSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<VerdictLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time_seconds: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEvent {
    pub query: String,
    pub result_count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEvent {
    pub description: String,
}

/// Type-specific payload of a history entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActivityEvent {
    Analysis(AnalysisEvent),
    Search(SearchEvent),
    Export(ExportEvent),
}

impl ActivityEvent {
    pub fn kind(&self) -> EntryKind {
        match self {
            ActivityEvent::Analysis(_) => EntryKind::Analysis,
            ActivityEvent::Search(_) => EntryKind::Search,
            ActivityEvent::Export(_) => EntryKind::Export,
        }
    }

    pub fn search(query: impl Into<String>, result_count: usize) -> Self {
        ActivityEvent::Search(SearchEvent {
            query: query.into(),
            result_count,
        })
    }

    pub fn export(description: impl Into<String>) -> Self {
        ActivityEvent::Export(ExportEvent {
            description: description.into(),
        })
    }
}

/// One logged user action.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub status: EntryStatus,
    #[serde(flatten)]
    pub event: ActivityEvent,
}

impl HistoryEntry {
    pub fn kind(&self) -> EntryKind {
        self.event.kind()
    }
}
