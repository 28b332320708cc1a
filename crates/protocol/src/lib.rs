//! OpenTSDB Protocol - Data model and storage-format codecs
//!
//! This crate provides the types shared by the write and read paths:
//! - `DataPoint` - one `(metric, timestamp, value, tags)` sample
//! - `Value` - integer or floating-point sample value
//! - `Tags` - key-sorted tag map with OpenTSDB character sanitization
//! - `qualifier` - bit-level decoder for HBase column qualifiers
//! - `value` - cell value decoder (integers, floats, legacy float fix)
//! - `rowkey` - row-key layout and scan-bound computation
//!
//! # Storage format
//!
//! The read path decodes the OpenTSDB v2 wide-column layout:
//!
//! ```text
//! row key:   [metric UID: 3][base timestamp: 4, BE][tag pairs: N x 6]
//! qualifier: 2 bytes (seconds) or 4 bytes (milliseconds), low bits carry
//!            a float flag and a 3-bit value-length field
//! value:     1/2/4/8 bytes per point; compacted cells concatenate several
//!            qualifier records and value records plus one metadata byte
//! ```
//!
//! All multi-byte fields are big-endian. See the `qualifier` module for the
//! exact bit assignments.

mod datapoint;
mod error;

pub mod qualifier;
pub mod rowkey;
pub mod value;

pub use datapoint::{sanitize, DataPoint, Tags, Value};
pub use error::ProtocolError;
pub use qualifier::CellPoint;
pub use rowkey::RowKey;

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Width of a UID in bytes (metric, tag key, tag value)
pub const UID_LEN: usize = 3;

/// Seconds covered by one row (base timestamps are hour-aligned)
pub const ROW_SPAN_SECS: i64 = 3600;

#[cfg(test)]
mod qualifier_test;
