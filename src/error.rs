//! Error types for the filtering pipeline

use thiserror::Error;

/// Reasons a filtering run can be rejected.
///
/// Every variant aborts the run; no partially filtered corpus is ever returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// The corpus is not a well-formed table
    #[error("corpus must be a well-formed table: {0}")]
    InvalidInputType(String),

    /// The selected column does not exist
    #[error("'{column}' column doesn't exist in the corpus. Columns present: {available:?}")]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    /// `contains` and `not_contain` share at least one value
    #[error("'contains' and 'not_contain' must not share common values: {shared:?}")]
    ConflictingFilters { shared: Vec<String> },

    /// A filter parameter has the wrong type or shape
    #[error("'{param}' must be {expected}. {found} given")]
    InvalidParameterType {
        param: &'static str,
        expected: &'static str,
        found: String,
    },

    /// An `nth_letters` entry is not a `[rank, letter]` pair
    #[error("each element of 'nth_letters' must be [rank (int >= 1), 1 letter (str)], got {0}")]
    InvalidNthLettersShape(String),
}

impl FilterError {
    pub(crate) fn invalid_param(
        param: &'static str,
        expected: &'static str,
        found: impl Into<String>,
    ) -> Self {
        Self::InvalidParameterType {
            param,
            expected,
            found: found.into(),
        }
    }
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, FilterError>;
