//! OpenTSDB Reader - scan and decode the wide-column storage layout
//!
//! Reads time series straight out of the store OpenTSDB writes to, without
//! going through the query API:
//!
//! ```text
//! [Reader] --scan [uid | hour-aligned ts] range--> [Store impl]
//!     |                                                |
//!     |  per cell: qualifier walk + value decode       |
//!     |  per row:  tag UIDs -> names (cached)          |
//!     v                                                v
//!  Vec<DataPoint>                               HBase / test map
//! ```
//!
//! The actual RPC transport stays behind the [`Store`] trait; anything that
//! can scan a key range and get a row can back a [`Reader`]. The `test`
//! module ships a sorted-map implementation.
//!
//! # Example
//!
//! ```ignore
//! use opentsdb_reader::Reader;
//! use opentsdb_protocol::Tags;
//!
//! let reader = Reader::new(store);
//! let mut filter = Tags::new();
//! filter.insert("script", "General.php");
//!
//! let points = reader
//!     .get_datapoints(1419966000, 1419976800, "php.requests.rps", &filter)
//!     .await?;
//! ```

mod error;
mod scanner;
mod store;
mod uid;

pub mod test;

pub use error::ReaderError;
pub use scanner::{Reader, SCAN_DEADLINE};
pub use store::{Cell, Row, Store, StoreError, DATA_TABLE, UID_TABLE};
pub use uid::{UidKind, UidResolver};

/// Result type for reader operations
pub type Result<T> = std::result::Result<T, ReaderError>;
