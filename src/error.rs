//! Error types for artifact loading and per-request classification.
//!
//! Only `LoadError` is fatal. Everything a single classification request can
//! hit is wrapped in `RequestError`, which the caller reports and moves on.

use std::path::PathBuf;
use thiserror::Error;

use crate::data::observation::Field;
use crate::data::scaler::ScalerGroup;

/// Fatal start-up failure: the classifier could not be brought up.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read classifier artifact {path}: {source}")]
    ClassifierUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode classifier artifact {path}: {source}")]
    ClassifierCorrupt {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },

    #[error("classifier artifact is malformed: {0}")]
    InvalidClassifier(String),

    #[error("classifier expects {found} input features, the pipeline produces {expected}")]
    FeatureCountMismatch { expected: usize, found: usize },

    #[error("classifier predicts {found} classes, the label table has {expected}")]
    ClassCountMismatch { expected: usize, found: usize },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Input rejected before any model work happens.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ObservationError {
    #[error("fill in every parameter before classifying, missing: {}", field_list(.0))]
    Missing(Vec<Field>),

    #[error("{field} must be a finite number, got {value}")]
    NonFinite { field: Field, value: f64 },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: Field,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("select the most frequent wind direction")]
    NoDirection,

    #[error("unknown wind direction '{0}', expected one of the 8 compass points")]
    UnknownCompass(String),
}

fn field_list(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|f| f.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Failure while applying a fitted scaler to one feature group.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScaleError {
    #[error("{group} scaler is unavailable")]
    Unavailable { group: ScalerGroup },

    #[error("scaler expects {expected} columns, got {found}")]
    ShapeMismatch { expected: usize, found: usize },

    #[error("column {column} is not finite after scaling ({value})")]
    NonFinite { column: usize, value: f64 },
}

/// Failure inside the classifier itself.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("classifier expects {expected} features, got {found}")]
    ShapeMismatch { expected: usize, found: usize },

    #[error("tree {tree} is malformed at node {node}")]
    BrokenTree { tree: usize, node: usize },

    #[error("classifier produced a non-finite score")]
    NonFiniteOutput,

    #[error("Kategori Tidak Diketahui (class id {0})")]
    UnknownClass(usize),
}

/// Everything that can stop one classification request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RequestError {
    #[error(transparent)]
    Validation(#[from] ObservationError),

    #[error("normalization failed: {0}")]
    Scaling(#[from] ScaleError),

    #[error("prediction failed: {0}")]
    Model(#[from] ModelError),
}

impl RequestError {
    /// Validation problems are warnings the user fixes in the form; the rest
    /// are errors.
    pub fn is_validation(&self) -> bool {
        matches!(self, RequestError::Validation(_))
    }

    pub fn hint(&self) -> &'static str {
        match self {
            RequestError::Validation(ObservationError::Missing(_)) => {
                "Values must not be zero or left empty."
            }
            RequestError::Validation(_) => {
                "Enter values within the documented range for each parameter."
            }
            RequestError::Scaling(ScaleError::Unavailable { .. }) => {
                "Scaler artifacts are required by the current configuration."
            }
            RequestError::Scaling(_) | RequestError::Model(_) => {
                "Make sure every input has been filled in correctly."
            }
        }
    }
}
