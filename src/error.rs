use thiserror::Error;

// ---------------------------------------------------------------------------
// Query-engine error taxonomy
// ---------------------------------------------------------------------------

/// Every way a query can fail. All variants are fail-fast: nothing is
/// retried and no partial result is ever returned.
#[derive(Debug, Error, PartialEq)]
pub enum QueryError {
    /// Argument counts disagree after broadcasting, e.g.
    /// "2 parameters for 3 conditions".
    #[error("{left_count} {left} for {right_count} {right}")]
    ShapeMismatch {
        left_count: usize,
        left: &'static str,
        right_count: usize,
        right: &'static str,
    },

    /// A condition / modifier / statistic token is not in its registry.
    #[error("unknown {slot} token: {token:?}")]
    UnknownToken { slot: &'static str, token: String },

    /// A parameter names a field the dataset does not have.
    #[error("unknown field: {0:?}")]
    UnknownField(String),

    /// `nearest forward` found no entry at or above the target value.
    #[error("no forward-nearest match exists")]
    NoForwardMatch,

    /// `nearest backward` found no entry at or below the target value.
    #[error("no backward-nearest match exists")]
    NoBackwardMatch,

    /// `apply_to` is neither `all` nor `any`.
    #[error("invalid apply_to mode: {0:?}")]
    InvalidMode(String),

    /// The combined mask is false everywhere. An empty selection is an
    /// error state, never a silent result.
    #[error("no matches found")]
    EmptySelection,

    /// An operation was asked of a column type that cannot support it,
    /// e.g. `cumulative sum` over a text column.
    #[error("field {field:?} does not support {operation}")]
    TypeMismatch {
        field: String,
        operation: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, QueryError>;
