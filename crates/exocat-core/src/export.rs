//! Downloadable JSON documents: analysis results, activity history and
//! single catalog records.
//!
//! Top-level keys use snake_case to match the files users already have on
//! disk; nested values keep their own camelCase wire names.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::ExocatResult;
use crate::models::{
    AnalysisParameter, ClassificationVerdict, DataSource, DatasetDescriptor, FactorScore,
    HistoryEntry, PlanetRecord, SimilarPlanet, VerdictLabel,
};

/// Shared JSON plumbing for every export document.
pub trait ExportDocument: Serialize + DeserializeOwned {
    /// Suggested file name for a download.
    fn file_name(&self) -> String;

    fn to_json(&self) -> ExocatResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn from_json(json: &str) -> ExocatResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the document to `path`, overwriting any existing file.
    fn write_json(&self, path: &Path) -> ExocatResult<()> {
        fs::write(path, self.to_json()?)?;
        info!(path = %path.display(), "export written");
        Ok(())
    }

    /// Write the document into `dir` under [`ExportDocument::file_name`].
    fn write_into(&self, dir: &Path) -> ExocatResult<PathBuf> {
        let path = dir.join(self.file_name());
        self.write_json(&path)?;
        Ok(path)
    }
}

// ---------------------------------------------------------------------------
// Analysis results
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VerdictExport {
    pub timestamp: DateTime<Utc>,
    pub classification: VerdictLabel,
    pub confidence: f64,
    pub parameters: Vec<AnalysisParameter>,
    pub dataset: DatasetDescriptor,
    pub key_factors: Vec<FactorScore>,
    pub similar_planets: Vec<SimilarPlanet>,
    pub insufficient_data: bool,
    pub processing_time: f64,
    pub data_source: DataSource,
}

impl From<&ClassificationVerdict> for VerdictExport {
    fn from(verdict: &ClassificationVerdict) -> Self {
        Self {
            timestamp: verdict.created_at,
            classification: verdict.label,
            confidence: verdict.confidence,
            parameters: verdict.parameters.clone(),
            dataset: verdict.dataset.clone(),
            key_factors: verdict.factors.clone(),
            similar_planets: verdict.similar_planets.clone(),
            insufficient_data: verdict.insufficient_data,
            processing_time: verdict.processing_time_seconds,
            data_source: verdict.data_source,
        }
    }
}

/// Rebuild the verdict a downloaded document was exported from.
impl From<VerdictExport> for ClassificationVerdict {
    fn from(export: VerdictExport) -> Self {
        Self {
            label: export.classification,
            confidence: export.confidence,
            factors: export.key_factors,
            parameters: export.parameters,
            dataset: export.dataset,
            similar_planets: export.similar_planets,
            insufficient_data: export.insufficient_data,
            processing_time_seconds: export.processing_time,
            data_source: export.data_source,
            created_at: export.timestamp,
        }
    }
}

impl ExportDocument for VerdictExport {
    fn file_name(&self) -> String {
        format!("exocat_analysis_{}.json", self.timestamp.timestamp_millis())
    }
}

// ---------------------------------------------------------------------------
// Activity history
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryExport {
    pub export_timestamp: DateTime<Utc>,
    pub total_items: usize,
    pub history: Vec<HistoryEntry>,
}

impl HistoryExport {
    pub fn new(history: Vec<HistoryEntry>, export_timestamp: DateTime<Utc>) -> Self {
        Self {
            export_timestamp,
            total_items: history.len(),
            history,
        }
    }
}

impl ExportDocument for HistoryExport {
    fn file_name(&self) -> String {
        format!("exocat_history_{}.json", self.export_timestamp.format("%Y-%m-%d"))
    }
}

// ---------------------------------------------------------------------------
// Single record
// ---------------------------------------------------------------------------

/// One catalog record, serialized exactly as the record itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordExport {
    pub record: PlanetRecord,
}

impl ExportDocument for RecordExport {
    fn file_name(&self) -> String {
        format!("{}_data.json", self.record.id)
    }
}
