//! Exocat core library: similarity, filtering and classification engine for a
//! small exoplanet catalog.
//!
//! The crate provides the catalog store, the read-side query engines, a
//! deterministic classification simulator and a bounded activity log, tied
//! together by [`session::CatalogSession`].  With the `python` feature it is
//! also compiled as a Python extension module (`exocat_core`) via PyO3.

pub mod classifier;
pub mod clock;
pub mod config;
pub mod errors;
pub mod export;
pub mod history;
pub mod models;
pub mod query;
pub mod random;
pub mod session;
pub mod store;

#[cfg(feature = "python")]
mod python;

#[cfg(feature = "python")]
use pyo3::prelude::*;

// ---------------------------------------------------------------------------
// Top-level Python module: exocat_core
// ---------------------------------------------------------------------------

#[cfg(feature = "python")]
#[pymodule]
fn exocat_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // -- Session facade -----------------------------------------------------
    m.add_class::<python::PyCatalogSession>()?;

    // -- Query guards -------------------------------------------------------
    m.add("MAX_QUERY_LENGTH", query::guards::MAX_QUERY_LENGTH)?;
    m.add(
        "DEFAULT_SIMILARITY_LIMIT",
        query::guards::DEFAULT_SIMILARITY_LIMIT,
    )?;
    m.add("MAX_SIMILARITY_LIMIT", query::guards::MAX_SIMILARITY_LIMIT)?;
    m.add(
        "DEFAULT_SIMILAR_PLANETS",
        query::guards::DEFAULT_SIMILAR_PLANETS,
    )?;
    m.add("MAX_HISTORY_ENTRIES", query::guards::MAX_HISTORY_ENTRIES)?;

    // -- Quick filter names -------------------------------------------------
    let presets: Vec<&str> = query::filter::Preset::ALL
        .iter()
        .map(|preset| preset.name())
        .collect();
    m.add("QUICK_FILTERS", presets)?;

    Ok(())
}
