//! Python bindings for the session facade.
//!
//! Inputs arrive as plain Python objects and outputs are handed back the
//! same way: values cross the boundary as JSON and are rebuilt with the
//! standard `json` module on the Python side.

use pyo3::prelude::*;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::classifier::{AnalysisRequest, ManualParameters, UploadHandle};
use crate::config::EngineConfig;
use crate::errors::ExocatError;
use crate::export::ExportDocument;
use crate::history::{parse_kind_filter, HistoryWindow};
use crate::models::{ClassificationVerdict, PlanetClassification, QueryVector};
use crate::query::filter::FilterSpec;
use crate::query::similarity::SimilarityResult;
use crate::session::CatalogSession;
use crate::store::catalog::CatalogStore;

fn to_py<T: Serialize + ?Sized>(py: Python<'_>, value: &T) -> PyResult<PyObject> {
    let json = serde_json::to_string(value).map_err(ExocatError::from)?;
    Ok(py.import("json")?.call_method1("loads", (json,))?.unbind())
}

fn from_py<T: DeserializeOwned>(value: &Bound<'_, PyAny>) -> PyResult<T> {
    let json: String = value
        .py()
        .import("json")?
        .call_method1("dumps", (value,))?
        .extract()?;
    Ok(serde_json::from_str(&json).map_err(ExocatError::from)?)
}

fn results_to_py(py: Python<'_>, results: &[SimilarityResult<'_>]) -> PyResult<PyObject> {
    let planets: Vec<_> = results.iter().map(SimilarityResult::to_similar_planet).collect();
    to_py(py, &planets)
}

#[pyclass(name = "CatalogSession")]
pub struct PyCatalogSession {
    inner: CatalogSession,
}

#[pymethods]
impl PyCatalogSession {
    #[new]
    #[pyo3(signature = (catalog_json=None, seed=None))]
    fn new(catalog_json: Option<&str>, seed: Option<u64>) -> PyResult<Self> {
        let mut config = EngineConfig::from_env();
        if let Some(seed) = seed {
            config = config.with_seed(seed);
        }
        let catalog = match catalog_json {
            Some(json) => CatalogStore::from_json_str(json)?,
            None => CatalogStore::sample()?,
        };
        Ok(Self {
            inner: CatalogSession::new(catalog, config),
        })
    }

    fn records(&self, py: Python<'_>) -> PyResult<PyObject> {
        to_py(py, &self.inner.catalog().all_records())
    }

    fn find_by_id(&self, py: Python<'_>, id: &str) -> PyResult<PyObject> {
        to_py(py, self.inner.catalog().find_by_id(id)?)
    }

    #[pyo3(signature = (text, classification=None))]
    fn search(
        &self,
        py: Python<'_>,
        text: &str,
        classification: Option<&str>,
    ) -> PyResult<PyObject> {
        let classification = classification
            .map(str::parse::<PlanetClassification>)
            .transpose()?;
        to_py(py, &self.inner.search(text, classification))
    }

    fn suggest(&self, py: Python<'_>, text: &str) -> PyResult<PyObject> {
        to_py(py, &self.inner.suggest(text))
    }

    fn batch_compare(&self, py: Python<'_>) -> PyResult<PyObject> {
        to_py(py, &self.inner.batch_compare())
    }

    fn filter(&self, py: Python<'_>, spec: &Bound<'_, PyAny>) -> PyResult<PyObject> {
        let spec: FilterSpec = from_py(spec)?;
        to_py(py, &self.inner.filter(&spec))
    }

    fn quick_filter(&self, py: Python<'_>, name: &str) -> PyResult<PyObject> {
        to_py(py, &self.inner.quick_filter(name)?)
    }

    #[pyo3(signature = (query, limit=None, max_distance_ly=None, min_similarity=0.0))]
    fn find_similar(
        &self,
        py: Python<'_>,
        query: &Bound<'_, PyAny>,
        limit: Option<usize>,
        max_distance_ly: Option<f64>,
        min_similarity: f64,
    ) -> PyResult<PyObject> {
        let query: QueryVector = from_py(query)?;
        let mut options = self.inner.rank_options();
        if let Some(limit) = limit {
            options.limit = limit;
        }
        options.max_distance_ly = max_distance_ly;
        options.min_similarity = min_similarity;
        let results = self.inner.find_similar(&query, &options)?;
        results_to_py(py, &results)
    }

    fn similar_to(&self, py: Python<'_>, id: &str) -> PyResult<PyObject> {
        let results = self.inner.similar_to(id)?;
        results_to_py(py, &results)
    }

    #[pyo3(signature = (file_name=None, manual=None, upload_parameters=None))]
    fn analyze(
        &self,
        py: Python<'_>,
        file_name: Option<&str>,
        manual: Option<&Bound<'_, PyAny>>,
        upload_parameters: Option<&Bound<'_, PyAny>>,
    ) -> PyResult<PyObject> {
        let upload = match file_name {
            Some(name) => {
                let mut handle = UploadHandle::new(name)?;
                if let Some(parameters) = upload_parameters {
                    handle = handle.with_parameters(from_py(parameters)?);
                }
                Some(handle)
            }
            None => None,
        };
        let manual: Option<ManualParameters> = manual.map(from_py).transpose()?;
        let verdict = self.inner.analyze(&AnalysisRequest { upload, manual })?;
        to_py(py, &verdict)
    }

    /// Export a verdict previously returned by `analyze`, as a JSON string.
    fn export_verdict(&self, verdict: &Bound<'_, PyAny>) -> PyResult<String> {
        let verdict: ClassificationVerdict = from_py(verdict)?;
        Ok(self.inner.export_verdict(&verdict).to_json()?)
    }

    fn export_history(&self) -> PyResult<String> {
        Ok(self.inner.export_history().to_json()?)
    }

    fn export_record(&self, id: &str) -> PyResult<String> {
        Ok(self.inner.export_record(id)?.to_json()?)
    }

    #[pyo3(signature = (kind=None, window=None))]
    fn history(
        &self,
        py: Python<'_>,
        kind: Option<&str>,
        window: Option<&str>,
    ) -> PyResult<PyObject> {
        let kind = parse_kind_filter(kind)?;
        let window = window
            .map(str::parse::<HistoryWindow>)
            .transpose()?
            .unwrap_or_default();
        to_py(py, &self.inner.history_window(kind, window))
    }

    fn clear_history(&self) {
        self.inner.clear_history();
    }

    fn summary(&self, py: Python<'_>) -> PyResult<PyObject> {
        to_py(py, &self.inner.summary())
    }
}
