//! Error types for the exocat core library.

#[cfg(feature = "python")]
use pyo3::exceptions::{PyIOError, PyKeyError, PyValueError};
#[cfg(feature = "python")]
use pyo3::PyErr;

/// Top-level error enum for the exocat core library.
#[derive(Debug, thiserror::Error)]
pub enum ExocatError {
    #[error("No planet record with id '{0}'")]
    NotFound(String),

    #[error("Invalid query: {attribute} must be a finite, non-zero value")]
    InvalidQuery { attribute: String },

    #[error("Query has no scorable attributes (radiusEarth, orbitalPeriodDays)")]
    InsufficientQuery,

    #[error("Unknown quick filter preset '{0}'")]
    UnknownPreset(String),

    #[error("No analysis input: supply an uploaded file or manual parameters")]
    NoInput,

    #[error("Duplicate planet id '{0}' in catalog")]
    DuplicateId(String),

    #[error("Invalid planet record '{id}': {reason}")]
    InvalidRecord { id: String, reason: String },

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Unsupported upload '{0}': expected a .csv or .fits file")]
    UnsupportedUpload(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(feature = "python")]
impl From<ExocatError> for PyErr {
    fn from(err: ExocatError) -> PyErr {
        match &err {
            ExocatError::NotFound(_) => PyKeyError::new_err(err.to_string()),
            ExocatError::Io(_) => PyIOError::new_err(err.to_string()),
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}

pub type ExocatResult<T> = Result<T, ExocatError>;
