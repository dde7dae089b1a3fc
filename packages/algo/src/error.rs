//! Engine error taxonomy
//!
//! Fallback widening (recency relaxation, wider difficulty bands) is handled
//! inside the selectors; only conditions the caller has to decide on end up here.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("catalog is empty")]
    EmptyCatalog,

    #[error("duplicate item identifier: {id}")]
    DuplicateItem { id: String },

    #[error("unknown item identifier: {id}")]
    UnknownItem { id: String },

    #[error("no item available for selection")]
    NoItemAvailable,

    #[error("insufficient distractors: requested {requested}, available {available}")]
    InsufficientDistractors { requested: usize, available: usize },

    #[error("calibration ladder needs at least 2 levels, got {len}")]
    DegenerateLadder { len: usize },

    #[error("non-finite value for {field}: {value}")]
    NonFiniteInput { field: &'static str, value: f64 },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    CatalogParse(#[from] serde_json::Error),
}
