//! Criterion benchmarks for exocat-core.
//!
//! The catalog is tiny in production, so the benches scale it up with
//! synthetic records to keep the numbers meaningful.
//!
//! ## Benchmark groups
//!
//! 1. **similarity**: Ranking, confirmed look-alike lookup and batch comparison.
//! 2. **filter**: Presets, text search, suggestions and combined specs.
//! 3. **classify**: One full simulated classification.
//! 4. **history**: Append under the capacity bound and filtered listing.
//!
//! ## Running
//!
//! ```sh
//! cargo bench --manifest-path crates/exocat-core/Cargo.toml
//! # Run only the similarity group:
//! cargo bench --manifest-path crates/exocat-core/Cargo.toml -- similarity
//! ```

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use exocat_core::classifier::{
    default_detection_factors, AnalysisRequest, ClassificationSimulator, ManualParameters,
};
use exocat_core::clock::{Clock, ManualClock};
use exocat_core::history::{ActivityHistory, HistoryFilter};
use exocat_core::models::{
    ActivityEvent, EntryKind, EntryStatus, PlanetClassification, PlanetRecord, QueryVector,
};
use exocat_core::query::filter::{
    apply, apply_quick_filter, suggest, text_search, FilterSpec, SizeClass, YearRange,
};
use exocat_core::query::similarity::{
    batch_compare, rank_similar, top_confirmed_similar, RankOptions,
};
use exocat_core::random::SeededRandom;
use exocat_core::store::catalog::CatalogStore;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a catalog of `n` synthetic records with spread-out attributes.
fn synthetic_catalog(n: usize) -> CatalogStore {
    let records = (0..n).map(|i| {
        let f = i as f64;
        PlanetRecord {
            id: format!("SYN-{i:05}"),
            name: format!("Synthetic {i}"),
            classification: match i % 3 {
                0 => PlanetClassification::Confirmed,
                1 => PlanetClassification::Candidate,
                _ => PlanetClassification::FalsePositive,
            },
            discovery_date: chrono::NaiveDate::from_ymd_opt(2009 + (i % 16) as i32, 1, 1)
                .unwrap(),
            distance_ly: 10.0 + (f * 7.3) % 2000.0,
            radius_earth: 0.5 + (f * 0.37) % 15.0,
            orbital_period_days: 1.0 + (f * 3.1) % 500.0,
            stellar_temp_k: 3000.0 + (f * 11.0) % 4000.0,
            transit_depth_ppm: (f * 13.0) % 5000.0,
            habitability_score: (f * 0.7) % 10.0,
            discovery_mission: ["Kepler", "K2", "TESS"][i % 3].to_string(),
        }
    });
    CatalogStore::new(records).unwrap()
}

fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(ManualClock::new("2025-10-04T14:32:00Z".parse().unwrap()))
}

// ---------------------------------------------------------------------------
// 1. Similarity
// ---------------------------------------------------------------------------

fn bench_similarity(c: &mut Criterion) {
    let mut group = c.benchmark_group("similarity");
    let query = QueryVector::radius_period(1.4, 24.7);

    for size in [5usize, 1_000, 10_000] {
        let catalog = synthetic_catalog(size);
        group.bench_with_input(
            BenchmarkId::new("rank_similar", size),
            &catalog,
            |b, catalog| {
                b.iter(|| {
                    rank_similar(black_box(&query), catalog.records(), &RankOptions::default())
                        .unwrap()
                })
            },
        );
        group.bench_with_input(
            BenchmarkId::new("top_confirmed_similar", size),
            &catalog,
            |b, catalog| {
                b.iter(|| {
                    top_confirmed_similar(black_box(query.clone()), catalog.records(), 3).unwrap()
                })
            },
        );
        group.bench_with_input(
            BenchmarkId::new("batch_compare", size),
            &catalog,
            |b, catalog| {
                let mut rng = SeededRandom::from_seed(7);
                b.iter(|| batch_compare(catalog.records(), &mut rng, black_box(3)))
            },
        );
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// 2. Filter
// ---------------------------------------------------------------------------

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");
    let catalog = synthetic_catalog(10_000);

    group.bench_function("quick_filter_habitable", |b| {
        b.iter(|| apply_quick_filter(catalog.records(), black_box("habitable")).unwrap())
    });

    group.bench_function("text_search", |b| {
        b.iter(|| text_search(catalog.records(), black_box("tess")))
    });

    group.bench_function("suggest", |b| {
        b.iter(|| suggest(catalog.records(), black_box("synthetic 12")))
    });

    let spec = FilterSpec::new()
        .with_preset_name("earth-like")
        .unwrap()
        .with_size_class(SizeClass::Small)
        .with_discovery_years(YearRange { start: 2015, end: 2020 })
        .with_text("kepler");
    group.bench_function("combined_spec", |b| {
        b.iter(|| apply(catalog.records(), black_box(&spec)))
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// 3. Classify
// ---------------------------------------------------------------------------

fn bench_classify(c: &mut Criterion) {
    let catalog = CatalogStore::sample().unwrap();
    let simulator = ClassificationSimulator::new(&catalog, fixed_clock());
    let factors = default_detection_factors();
    let request = AnalysisRequest::from_manual(ManualParameters {
        orbital_period_days: Some(24.7),
        radius_earth: Some(1.4),
        transit_depth_ppm: Some(156.0),
        ..ManualParameters::default()
    });
    let mut rng = SeededRandom::from_seed(42);

    c.bench_function("classify/manual_input", |b| {
        b.iter(|| {
            simulator
                .classify(black_box(&request), &factors, &mut rng)
                .unwrap()
        })
    });
}

// ---------------------------------------------------------------------------
// 4. History
// ---------------------------------------------------------------------------

fn bench_history(c: &mut Criterion) {
    let mut group = c.benchmark_group("history");

    group.bench_function("append_at_capacity", |b| {
        let mut history = ActivityHistory::new(fixed_clock());
        b.iter(|| {
            history.append(
                black_box(ActivityEvent::search("Quick Filter: habitable", 3)),
                EntryStatus::Completed,
            )
        })
    });

    let mut history = ActivityHistory::new(fixed_clock());
    for i in 0..50 {
        let event = if i % 2 == 0 {
            ActivityEvent::search(format!("q{i}"), i)
        } else {
            ActivityEvent::export("Analysis results exported to JSON")
        };
        history.append(event, EntryStatus::Completed);
    }
    let filter = HistoryFilter::of_kind(EntryKind::Search);
    group.bench_function("list_by_kind", |b| {
        b.iter(|| history.list(black_box(&filter)))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_similarity,
    bench_filter,
    bench_classify,
    bench_history
);
criterion_main!(benches);
