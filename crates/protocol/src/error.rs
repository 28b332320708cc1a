//! Protocol error types
//!
//! Errors that can occur when decoding the on-disk cell format.

use thiserror::Error;

/// Errors that can occur during protocol operations
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Qualifier is too short for the record at the given offset
    #[error("qualifier too short: need {needed} bytes at offset {offset}, have {actual}")]
    QualifierTooShort {
        needed: usize,
        offset: usize,
        actual: usize,
    },

    /// Qualifier ends with a partial record
    #[error("qualifier has {0} dangling bytes after the last record")]
    DanglingQualifier(usize),

    /// Cell value is shorter than the qualifier records require
    #[error("cell value too short: records need {needed} bytes, have {actual}")]
    ValueTooShort { needed: usize, actual: usize },

    /// Single-record cell whose value length disagrees with its qualifier
    #[error("cell value is {actual} bytes, qualifier declares {declared}")]
    ValueLengthMismatch { declared: usize, actual: usize },

    /// Compacted cell whose value bytes do not line up with its records
    #[error(
        "compacted cell consumed {consumed} value bytes, cell holds {actual} \
         (one trailing metadata byte expected)"
    )]
    CompactedValueMismatch { consumed: usize, actual: usize },

    /// Integer value on an unsupported width
    #[error("integer value on {0} bytes, must be 1, 2, 4 or 8")]
    IntegerWidth(usize),

    /// Floating point value on an unsupported width
    #[error("floating point value on {0} bytes, must be 4 or 8")]
    FloatWidth(usize),

    /// Legacy 8-byte float whose leading pad bytes are not zero
    #[error("corrupt legacy float: leading 4 bytes are {0:02x?}, expected zeros")]
    CorruptLegacyFloat([u8; 4]),

    /// Row key shorter than the fixed prefix
    #[error("row key too short: need at least {needed} bytes, have {actual}")]
    RowKeyTooShort { needed: usize, actual: usize },

    /// Row key tag section is not whole tag pairs
    #[error("row key tag section is {0} bytes, not a multiple of 6")]
    RowKeyTagSection(usize),
}

impl ProtocolError {
    /// Create a qualifier-too-short error
    #[inline]
    pub fn qualifier_too_short(needed: usize, offset: usize, actual: usize) -> Self {
        Self::QualifierTooShort {
            needed,
            offset,
            actual,
        }
    }

    /// Create a value-too-short error
    #[inline]
    pub fn value_too_short(needed: usize, actual: usize) -> Self {
        Self::ValueTooShort { needed, actual }
    }

    /// Check if the error describes a corrupt cell (as opposed to misuse)
    ///
    /// The scanner treats corrupt cells as skippable and keeps scanning.
    pub fn is_corrupt_cell(&self) -> bool {
        !matches!(
            self,
            Self::RowKeyTooShort { .. } | Self::RowKeyTagSection(_)
        )
    }
}
