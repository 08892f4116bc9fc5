//! Composable catalog filters.
//!
//! A [`FilterSpec`] is a conjunction of independent predicates. Evaluation
//! preserves the input order, and an empty spec matches everything. Named
//! presets are expanded into range predicates every time a spec is applied.

use std::fmt;
use std::str::FromStr;

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{ExocatError, ExocatResult};
use crate::models::{CategoricalAttribute, NumericAttribute, PlanetRecord};
use crate::query::guards::truncate_query;

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// Inclusive numeric range; an absent bound is unconstrained.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangePredicate {
    pub attribute: NumericAttribute,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl RangePredicate {
    pub fn between(attribute: NumericAttribute, min: f64, max: f64) -> Self {
        Self {
            attribute,
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn at_least(attribute: NumericAttribute, min: f64) -> Self {
        Self {
            attribute,
            min: Some(min),
            max: None,
        }
    }

    pub fn at_most(attribute: NumericAttribute, max: f64) -> Self {
        Self {
            attribute,
            min: None,
            max: Some(max),
        }
    }

    pub fn matches(&self, record: &PlanetRecord) -> bool {
        let value = self.attribute.value_of(record);
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

/// Exact string equality on a categorical attribute.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoricalPredicate {
    pub attribute: CategoricalAttribute,
    pub value: String,
}

impl CategoricalPredicate {
    pub fn new(attribute: CategoricalAttribute, value: impl Into<String>) -> Self {
        Self {
            attribute,
            value: value.into(),
        }
    }

    pub fn matches(&self, record: &PlanetRecord) -> bool {
        self.attribute.value_of(record) == self.value
    }
}

/// Inclusive range of discovery years, written `"2015-2020"` or `"2015"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub fn matches(&self, record: &PlanetRecord) -> bool {
        let year = record.discovery_date.year();
        year >= self.start && year <= self.end
    }
}

impl FromStr for YearRange {
    type Err = ExocatError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parse_year = |part: &str| {
            part.trim()
                .parse::<i32>()
                .map_err(|_| ExocatError::InvalidFilter(format!("bad year range '{value}'")))
        };
        let (start, end) = match value.split_once('-') {
            Some((start, end)) => (parse_year(start)?, parse_year(end)?),
            None => {
                let year = parse_year(value)?;
                (year, year)
            }
        };
        if start > end {
            return Err(ExocatError::InvalidFilter(format!(
                "year range '{value}' starts after it ends"
            )));
        }
        Ok(Self { start, end })
    }
}

/// Planet size buckets used by the explorer view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeClass {
    /// Under 2 Earth radii.
    Small,
    /// 2 Earth radii and up.
    Large,
    /// 10 Earth radii and up.
    Giant,
}

impl SizeClass {
    pub fn matches(&self, record: &PlanetRecord) -> bool {
        match self {
            SizeClass::Small => record.radius_earth < 2.0,
            SizeClass::Large => record.radius_earth >= 2.0,
            SizeClass::Giant => record.radius_earth >= 10.0,
        }
    }
}

impl FromStr for SizeClass {
    type Err = ExocatError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "small" => Ok(SizeClass::Small),
            "large" => Ok(SizeClass::Large),
            "giant" => Ok(SizeClass::Giant),
            other => Err(ExocatError::InvalidFilter(format!("unknown size class '{other}'"))),
        }
    }
}

/// Habitability buckets used by the explorer view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitabilityBand {
    /// Above 8.
    High,
    /// Above 5, up to 8.
    Medium,
    /// 5 and below.
    Low,
}

impl HabitabilityBand {
    pub fn matches(&self, record: &PlanetRecord) -> bool {
        let score = record.habitability_score;
        match self {
            HabitabilityBand::High => score > 8.0,
            HabitabilityBand::Medium => score > 5.0 && score <= 8.0,
            HabitabilityBand::Low => score <= 5.0,
        }
    }
}

impl FromStr for HabitabilityBand {
    type Err = ExocatError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "high" => Ok(HabitabilityBand::High),
            "medium" => Ok(HabitabilityBand::Medium),
            "low" => Ok(HabitabilityBand::Low),
            other => Err(ExocatError::InvalidFilter(format!(
                "unknown habitability band '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Presets
// ---------------------------------------------------------------------------

/// Named quick filters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    EarthLike,
    HotJupiter,
    Habitable,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::EarthLike, Preset::HotJupiter, Preset::Habitable];

    pub fn name(&self) -> &'static str {
        match self {
            Preset::EarthLike => "earth-like",
            Preset::HotJupiter => "hot-jupiter",
            Preset::Habitable => "habitable",
        }
    }

    /// The predicate bundle this preset stands for.
    pub fn predicates(&self) -> Vec<RangePredicate> {
        match self {
            Preset::EarthLike => vec![
                RangePredicate::between(NumericAttribute::RadiusEarth, 0.5, 2.0),
                RangePredicate::at_least(NumericAttribute::HabitabilityScore, 7.0),
            ],
            Preset::HotJupiter => vec![
                RangePredicate::at_least(NumericAttribute::RadiusEarth, 8.0),
                RangePredicate::at_most(NumericAttribute::OrbitalPeriodDays, 10.0),
            ],
            Preset::Habitable => vec![RangePredicate::at_least(
                NumericAttribute::HabitabilityScore,
                8.0,
            )],
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = ExocatError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|preset| preset.name() == value)
            .ok_or_else(|| ExocatError::UnknownPreset(value.to_string()))
    }
}

// ---------------------------------------------------------------------------
// FilterSpec
// ---------------------------------------------------------------------------

/// AND-combination of independent predicates.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSpec {
    pub ranges: Vec<RangePredicate>,
    pub categorical: Vec<CategoricalPredicate>,
    pub presets: Vec<Preset>,
    /// Case-insensitive substring over name, id and discovery mission.
    pub text: Option<String>,
    pub discovery_years: Option<YearRange>,
    pub size_class: Option<SizeClass>,
    pub habitability_band: Option<HabitabilityBand>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_range(mut self, predicate: RangePredicate) -> Self {
        self.ranges.push(predicate);
        self
    }

    pub fn with_categorical(mut self, predicate: CategoricalPredicate) -> Self {
        self.categorical.push(predicate);
        self
    }

    pub fn with_preset(mut self, preset: Preset) -> Self {
        self.presets.push(preset);
        self
    }

    pub fn with_preset_name(self, name: &str) -> ExocatResult<Self> {
        Ok(self.with_preset(name.parse()?))
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_discovery_years(mut self, years: YearRange) -> Self {
        self.discovery_years = Some(years);
        self
    }

    pub fn with_size_class(mut self, size_class: SizeClass) -> Self {
        self.size_class = Some(size_class);
        self
    }

    pub fn with_habitability_band(mut self, band: HabitabilityBand) -> Self {
        self.habitability_band = Some(band);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
            && self.categorical.is_empty()
            && self.presets.is_empty()
            && self.normalized_text().is_none()
            && self.discovery_years.is_none()
            && self.size_class.is_none()
            && self.habitability_band.is_none()
    }

    /// Lowercased, trimmed text query; `None` when blank.
    fn normalized_text(&self) -> Option<String> {
        self.text
            .as_deref()
            .map(truncate_query)
            .filter(|text| !text.is_empty())
            .map(|text| text.to_lowercase())
    }
}

/// Case-insensitive substring match over `name`, `id` and `discovery_mission`.
/// `needle` must already be lowercase.
pub fn matches_text(record: &PlanetRecord, needle: &str) -> bool {
    record.name.to_lowercase().contains(needle)
        || record.id.to_lowercase().contains(needle)
        || record.discovery_mission.to_lowercase().contains(needle)
}

/// Records from `records` satisfying every predicate in `spec`, in input order.
pub fn apply<'a, I>(records: I, spec: &FilterSpec) -> Vec<&'a PlanetRecord>
where
    I: IntoIterator<Item = &'a PlanetRecord>,
{
    let mut ranges: Vec<RangePredicate> = spec.ranges.clone();
    ranges.extend(spec.presets.iter().flat_map(|preset| preset.predicates()));
    let text = spec.normalized_text();

    let matched: Vec<&'a PlanetRecord> = records
        .into_iter()
        .filter(|record| ranges.iter().all(|p| p.matches(record)))
        .filter(|record| spec.categorical.iter().all(|p| p.matches(record)))
        .filter(|record| text.as_deref().map_or(true, |t| matches_text(record, t)))
        .filter(|record| spec.discovery_years.map_or(true, |y| y.matches(record)))
        .filter(|record| spec.size_class.map_or(true, |s| s.matches(record)))
        .filter(|record| spec.habitability_band.map_or(true, |b| b.matches(record)))
        .collect();
    debug!(
        matches = matched.len(),
        ranges = ranges.len(),
        categorical = spec.categorical.len(),
        "filter applied"
    );
    matched
}

/// Apply the preset named `preset_name` on its own.
pub fn apply_quick_filter<'a, I>(
    records: I,
    preset_name: &str,
) -> ExocatResult<Vec<&'a PlanetRecord>>
where
    I: IntoIterator<Item = &'a PlanetRecord>,
{
    let preset: Preset = preset_name.parse()?;
    Ok(apply(records, &FilterSpec::new().with_preset(preset)))
}

/// Text search on its own; blank queries match everything.
pub fn text_search<'a, I>(records: I, query: &str) -> Vec<&'a PlanetRecord>
where
    I: IntoIterator<Item = &'a PlanetRecord>,
{
    apply(records, &FilterSpec::new().with_text(query))
}

/// Fewest query characters before suggestions are offered.
pub const MIN_SUGGEST_CHARS: usize = 2;
pub const MAX_SUGGESTIONS: usize = 5;

/// Autocomplete: records whose name contains `query`, case-insensitively, in
/// input order. Queries shorter than [`MIN_SUGGEST_CHARS`] suggest nothing.
pub fn suggest<'a, I>(records: I, query: &str) -> Vec<&'a PlanetRecord>
where
    I: IntoIterator<Item = &'a PlanetRecord>,
{
    let needle = truncate_query(query).to_lowercase();
    if needle.chars().count() < MIN_SUGGEST_CHARS {
        return Vec::new();
    }
    records
        .into_iter()
        .filter(|record| record.name.to_lowercase().contains(&needle))
        .take(MAX_SUGGESTIONS)
        .collect()
}
