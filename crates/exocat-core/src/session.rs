//! Session facade: one catalog plus the mutable state a browsing session
//! accumulates (activity history and the classifier's random stream).
//!
//! Every user-facing operation is reported to the history here, so the
//! engines underneath stay free of logging side effects.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::classifier::{
    default_detection_factors, default_reference_datasets, AnalysisRequest,
    ClassificationSimulator,
};
use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::errors::{ExocatError, ExocatResult};
use crate::export::{HistoryExport, RecordExport, VerdictExport};
use crate::history::{HistoryFilter, HistoryWindow, SharedHistory};
use crate::models::{
    ActivityEvent, AnalysisEvent, CategoricalAttribute, ClassificationVerdict, DatasetDescriptor,
    DetectionFactor, EntryKind, EntryStatus, HistoryEntry, PlanetClassification, PlanetRecord,
    QueryVector,
};
use crate::query::filter::{self, CategoricalPredicate, FilterSpec, Preset};
use crate::query::guards::truncate_query;
use crate::query::similarity::{
    batch_compare, rank_similar, scorable_targets, top_confirmed_similar, ComparisonResult,
    RankOptions, SimilarityResult,
};
use crate::query::stats::{summarize, CatalogSummary};
use crate::random::{RandomSource, SeededRandom};
use crate::store::catalog::CatalogStore;

pub struct CatalogSession {
    catalog: CatalogStore,
    history: SharedHistory,
    rng: Mutex<Box<dyn RandomSource + Send>>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
    factors: Vec<DetectionFactor>,
    datasets: Vec<DatasetDescriptor>,
}

impl CatalogSession {
    /// Session on the system clock, seeded from `config.seed` when set.
    pub fn new(catalog: CatalogStore, config: EngineConfig) -> Self {
        let rng: Box<dyn RandomSource + Send> = match config.seed {
            Some(seed) => Box::new(SeededRandom::from_seed(seed)),
            None => Box::new(SeededRandom::from_entropy()),
        };
        Self::with_parts(catalog, config, Arc::new(SystemClock), rng)
    }

    pub fn with_parts(
        catalog: CatalogStore,
        config: EngineConfig,
        clock: Arc<dyn Clock>,
        rng: Box<dyn RandomSource + Send>,
    ) -> Self {
        info!(
            records = catalog.len(),
            seeded = config.seed.is_some(),
            "catalog session started"
        );
        Self {
            history: SharedHistory::new(Arc::clone(&clock)),
            catalog,
            rng: Mutex::new(rng),
            clock,
            config,
            factors: default_detection_factors(),
            datasets: default_reference_datasets(),
        }
    }

    /// Session over the bundled sample catalog.
    pub fn sample(config: EngineConfig) -> ExocatResult<Self> {
        Ok(Self::new(CatalogStore::sample()?, config))
    }

    pub fn with_detection_factors(mut self, factors: Vec<DetectionFactor>) -> Self {
        self.factors = factors;
        self
    }

    pub fn with_datasets(mut self, datasets: Vec<DatasetDescriptor>) -> Self {
        self.datasets = datasets;
        self
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn detection_factors(&self) -> &[DetectionFactor] {
        &self.factors
    }

    fn log_search(&self, query: String, result_count: usize) {
        self.history
            .append(ActivityEvent::search(query, result_count), EntryStatus::Completed);
    }

    // -- Read side ----------------------------------------------------------

    /// Text search, optionally narrowed to one classification. Non-blank
    /// queries are logged.
    pub fn search(
        &self,
        text: &str,
        classification: Option<PlanetClassification>,
    ) -> Vec<&PlanetRecord> {
        let query = truncate_query(text).to_lowercase();
        let mut spec = FilterSpec::new().with_text(query.clone());
        if let Some(classification) = classification {
            spec = spec.with_categorical(CategoricalPredicate::new(
                CategoricalAttribute::Classification,
                classification.as_str(),
            ));
        }
        let results = filter::apply(self.catalog.records(), &spec);
        if !query.is_empty() {
            self.log_search(query, results.len());
        }
        results
    }

    /// Autocomplete suggestions for a partially typed planet name. Not logged.
    pub fn suggest(&self, text: &str) -> Vec<&PlanetRecord> {
        filter::suggest(self.catalog.records(), text)
    }

    pub fn filter(&self, spec: &FilterSpec) -> Vec<&PlanetRecord> {
        let results = filter::apply(self.catalog.records(), spec);
        self.log_search(format!("Advanced Filter ({} results)", results.len()), results.len());
        results
    }

    pub fn quick_filter(&self, name: &str) -> ExocatResult<Vec<&PlanetRecord>> {
        let preset: Preset = name.parse()?;
        let results = filter::apply(self.catalog.records(), &FilterSpec::new().with_preset(preset));
        self.log_search(format!("Quick Filter: {preset}"), results.len());
        Ok(results)
    }

    /// Rank options seeded with the configured result limit.
    pub fn rank_options(&self) -> RankOptions {
        RankOptions {
            limit: self.config.similarity_limit,
            ..RankOptions::default()
        }
    }

    pub fn find_similar(
        &self,
        query: &QueryVector,
        options: &RankOptions,
    ) -> ExocatResult<Vec<SimilarityResult<'_>>> {
        let results = rank_similar(query, self.catalog.records(), options)?;
        self.log_search(
            format!("Similarity Search ({} results)", results.len()),
            results.len(),
        );
        Ok(results)
    }

    /// Confirmed look-alikes of the record `id`, excluding the record itself.
    pub fn similar_to(&self, id: &str) -> ExocatResult<Vec<SimilarityResult<'_>>> {
        let record = self.catalog.find_by_id(id)?;
        top_confirmed_similar(record, self.catalog.records(), self.config.similar_planets)
    }

    /// Randomized comparison across the whole catalog, drawing from the
    /// session's random stream.
    pub fn batch_compare(&self) -> Vec<ComparisonResult<'_>> {
        let mut rng = self.rng.lock();
        batch_compare(
            self.catalog.records(),
            &mut **rng,
            self.config.similar_planets,
        )
    }

    pub fn summary(&self) -> CatalogSummary {
        summarize(self.catalog.records())
    }

    // -- Classification -----------------------------------------------------

    /// Run the classifier. Logs an in-progress entry before classifying and a
    /// completed entry stamped with the verdict time afterwards. Rejected
    /// requests log nothing.
    pub fn analyze(&self, request: &AnalysisRequest) -> ExocatResult<ClassificationVerdict> {
        let data_source = request.data_source().ok_or(ExocatError::NoInput)?;
        match scorable_targets(&request.query_vector()) {
            Ok(_) | Err(ExocatError::InsufficientQuery) => {}
            Err(err) => return Err(err),
        }
        self.history.append(
            ActivityEvent::Analysis(AnalysisEvent {
                data_source: Some(data_source),
                ..AnalysisEvent::default()
            }),
            EntryStatus::InProgress,
        );

        let simulator = ClassificationSimulator::new(&self.catalog, Arc::clone(&self.clock))
            .with_datasets(self.datasets.clone())
            .with_similar_count(self.config.similar_planets);
        let verdict = {
            let mut rng = self.rng.lock();
            simulator.classify(request, &self.factors, &mut **rng)?
        };

        self.history.append_at(
            ActivityEvent::Analysis(AnalysisEvent {
                data_source: Some(data_source),
                classification: Some(verdict.label),
                confidence: Some(verdict.confidence.round()),
                processing_time_seconds: Some(verdict.processing_time_seconds),
            }),
            EntryStatus::Completed,
            verdict.created_at,
        );
        Ok(verdict)
    }

    // -- Export -------------------------------------------------------------

    pub fn export_verdict(&self, verdict: &ClassificationVerdict) -> VerdictExport {
        self.history.append(
            ActivityEvent::export("Analysis results exported to JSON"),
            EntryStatus::Completed,
        );
        VerdictExport::from(verdict)
    }

    pub fn export_history(&self) -> HistoryExport {
        HistoryExport::new(self.history.list(&HistoryFilter::all()), self.clock.now())
    }

    pub fn export_record(&self, id: &str) -> ExocatResult<RecordExport> {
        let record = self.catalog.find_by_id(id)?.clone();
        debug!(id, "record exported");
        Ok(RecordExport { record })
    }

    // -- History ------------------------------------------------------------

    pub fn history(&self, filter: &HistoryFilter) -> Vec<HistoryEntry> {
        self.history.list(filter)
    }

    pub fn history_window(
        &self,
        kind: Option<EntryKind>,
        window: HistoryWindow,
    ) -> Vec<HistoryEntry> {
        self.history.list_window(kind, window)
    }

    pub fn clear_history(&self) {
        self.history.clear();
    }
}
