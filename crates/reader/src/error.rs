//! Reader error types

use thiserror::Error;

use crate::store::StoreError;

/// Errors surfaced by the read path
///
/// Decode problems in individual cells are not errors at this level; the
/// scanner logs them and keeps going.
#[derive(Debug, Error)]
pub enum ReaderError {
    /// No UID matches the metric name
    #[error("unknown metric {0:?}")]
    UnknownMetric(String),

    /// More than one UID matches the metric name
    #[error("ambiguous metric {metric:?}: {count} UIDs match")]
    AmbiguousMetric {
        /// The name as queried
        metric: String,
        /// Number of matching UID rows
        count: usize,
    },

    /// The underlying store failed
    #[error(transparent)]
    Store(#[from] StoreError),
}
