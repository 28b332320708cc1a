//! Storage seam - the wide-column operations the reader depends on
//!
//! The reader never talks RPC itself; it asks a [`Store`] implementation for
//! row ranges and single rows. Production wires this to an HBase client, the
//! tests to [`crate::test::MemoryStore`].

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Table holding time-series rows
pub const DATA_TABLE: &str = "tsdb";

/// Table holding UID-to-name and name-to-UID mappings
pub const UID_TABLE: &str = "tsdb-uid";

/// One cell of a row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Column qualifier
    pub qualifier: Vec<u8>,

    /// Cell value
    pub value: Vec<u8>,
}

/// One scanned row with its cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Row key
    pub key: Vec<u8>,

    /// Cells in store order
    pub cells: Vec<Cell>,
}

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum StoreError {
    /// A scan could not be issued or completed
    #[error("scan failed: {0}")]
    Scan(String),

    /// A single-row get failed
    #[error("get failed: {0}")]
    Get(String),

    /// The scan deadline elapsed before the scan finished
    #[error("scan deadline exceeded")]
    DeadlineExceeded,
}

/// Wide-column store operations
#[async_trait]
pub trait Store: Send + Sync {
    /// Scan the half-open key range `[start_key, end_key)`.
    ///
    /// Implementations must give up with [`StoreError::DeadlineExceeded`]
    /// once `deadline` has elapsed.
    async fn scan_range(
        &self,
        table: &str,
        start_key: &[u8],
        end_key: &[u8],
        deadline: Duration,
    ) -> Result<Vec<Row>, StoreError>;

    /// Scan rows whose key starts with `prefix`, keeping only cells whose
    /// qualifier equals `qualifier`. Rows left without cells are omitted.
    async fn scan_prefix(
        &self,
        table: &str,
        prefix: &[u8],
        qualifier: &[u8],
    ) -> Result<Vec<Row>, StoreError>;

    /// Fetch every cell of one row; an absent row is an empty vector
    async fn get(&self, table: &str, key: &[u8]) -> Result<Vec<Cell>, StoreError>;
}
