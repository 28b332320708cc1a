//! Qualifier codec - bit-level decoding of HBase column qualifiers
//!
//! Each data point inside a row is addressed by a qualifier that packs the
//! offset from the row's base timestamp together with value flags:
//!
//! ```text
//! seconds (2 bytes):       oooooooo oooo FLLL
//! milliseconds (4 bytes):  1111 oooooooo oooooooo oooooo FLLL
//! ```
//!
//! `o` bits are the offset, `F` is the float flag, `LLL` encodes the value
//! length minus one. A first byte with all four high bits set marks the
//! millisecond variant; second-resolution offsets never reach that range
//! because rows span one hour.
//!
//! Compacted cells concatenate several qualifier records; their value bytes
//! are concatenated in the same order with one trailing metadata byte.

use crate::error::ProtocolError;
use crate::value::decode_value;
use crate::{Result, Value};

/// Low bits of a second-resolution qualifier reserved for flags
pub const FLAG_BITS: u32 = 4;

/// Low bits of a millisecond-resolution qualifier reserved for flags
pub const MS_FLAG_BITS: u32 = 6;

/// When set, the value is floating point; otherwise it is an integer
pub const FLAG_FLOAT: u8 = 0x08;

/// Mask selecting the value-length field from the flag bits
pub const LENGTH_MASK: u8 = 0x07;

/// First-byte mask marking the millisecond qualifier variant
pub const MS_BYTE_FLAG: u8 = 0xF0;

/// Mask selecting all flag bits (float flag + length field)
pub const FLAGS_MASK: u8 = FLAG_FLOAT | LENGTH_MASK;

/// True if a qualifier starting with `first` is in milliseconds
#[inline]
pub const fn in_milliseconds(first: u8) -> bool {
    first & MS_BYTE_FLAG == MS_BYTE_FLAG
}

/// Length in bytes of the qualifier record at `offset`: 2 or 4
pub fn qualifier_len(qualifier: &[u8], offset: usize) -> Result<usize> {
    let first = byte_at(qualifier, offset)?;
    let len = if in_milliseconds(first) { 4 } else { 2 };
    if offset + len > qualifier.len() {
        return Err(ProtocolError::qualifier_too_short(
            len,
            offset,
            qualifier.len(),
        ));
    }
    Ok(len)
}

/// Flag bits (float flag + length field) of the record at `offset`
pub fn flags(qualifier: &[u8], offset: usize) -> Result<u8> {
    let first = byte_at(qualifier, offset)?;
    let flag_byte = if in_milliseconds(first) {
        byte_at(qualifier, offset + 3)?
    } else {
        byte_at(qualifier, offset + 1)?
    };
    Ok(flag_byte & FLAGS_MASK)
}

/// True if the record at `offset` holds a floating point value
pub fn is_float(qualifier: &[u8], offset: usize) -> Result<bool> {
    Ok(flags(qualifier, offset)? & FLAG_FLOAT != 0)
}

/// Length in bytes of the value for the record at `offset`: 1 to 8
pub fn value_len(qualifier: &[u8], offset: usize) -> Result<usize> {
    Ok((flags(qualifier, offset)? & LENGTH_MASK) as usize + 1)
}

/// Offset in seconds from the row base timestamp for the record at `offset`
///
/// Millisecond offsets are divided down to seconds, truncating toward zero.
pub fn offset_sec(qualifier: &[u8], offset: usize) -> Result<u32> {
    let first = byte_at(qualifier, offset)?;
    if in_milliseconds(first) {
        if offset + 4 > qualifier.len() {
            return Err(ProtocolError::qualifier_too_short(
                4,
                offset,
                qualifier.len(),
            ));
        }
        let raw = u32::from_be_bytes([
            qualifier[offset],
            qualifier[offset + 1],
            qualifier[offset + 2],
            qualifier[offset + 3],
        ]);
        Ok(((raw & 0x0FFF_FFC0) >> MS_FLAG_BITS) / 1000)
    } else {
        if offset + 2 > qualifier.len() {
            return Err(ProtocolError::qualifier_too_short(
                2,
                offset,
                qualifier.len(),
            ));
        }
        let raw = u16::from_be_bytes([qualifier[offset], qualifier[offset + 1]]);
        Ok(u32::from(raw >> FLAG_BITS))
    }
}

/// One decoded point from a cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellPoint {
    /// Seconds past the row's base timestamp
    pub offset_sec: u32,

    /// Decoded sample value
    pub value: Value,
}

/// Decode every point in a cell, single or compacted.
///
/// The qualifier is walked record by record; value bytes are consumed in
/// lock-step. Single-record cells must carry exactly the declared value
/// length (the legacy 8-bytes-for-a-binary32 form is tolerated, see
/// [`decode_value`]). Compacted cells must consume every value byte except
/// the one trailing metadata byte.
pub fn decode_cell(qualifier: &[u8], value: &[u8]) -> Result<Vec<CellPoint>> {
    if qualifier.len() < 2 {
        return Err(ProtocolError::qualifier_too_short(2, 0, qualifier.len()));
    }

    // (offset_sec, flags, value_len) per record
    let mut records: Vec<(u32, u8, usize)> = Vec::with_capacity(qualifier.len() / 2);
    let mut qoff = 0;
    while qoff < qualifier.len() {
        if qualifier.len() - qoff == 1 {
            return Err(ProtocolError::DanglingQualifier(1));
        }
        let qlen = qualifier_len(qualifier, qoff)?;
        let record_flags = flags(qualifier, qoff)?;
        let vlen = (record_flags & LENGTH_MASK) as usize + 1;
        let offset = offset_sec(qualifier, qoff)?;
        records.push((offset, record_flags, vlen));
        qoff += qlen;
    }

    if records.len() == 1 {
        // Single point: the whole cell value belongs to this record. An
        // 8-byte value against a 4-byte float declaration is the legacy
        // encoding and is resolved inside decode_value.
        let (offset, record_flags, declared) = records[0];
        let legacy_float =
            record_flags & FLAG_FLOAT != 0 && declared == 4 && value.len() == 8;
        if value.len() != declared && !legacy_float {
            return Err(ProtocolError::ValueLengthMismatch {
                declared,
                actual: value.len(),
            });
        }
        return Ok(vec![CellPoint {
            offset_sec: offset,
            value: decode_value(record_flags, value)?,
        }]);
    }

    let mut points = Vec::with_capacity(records.len());
    let mut vidx = 0;
    for (offset, record_flags, vlen) in records {
        let end = vidx + vlen;
        if end > value.len() {
            return Err(ProtocolError::value_too_short(end, value.len()));
        }
        points.push(CellPoint {
            offset_sec: offset,
            value: decode_value(record_flags, &value[vidx..end])?,
        });
        vidx = end;
    }

    // Compacted cells carry exactly one trailing metadata byte.
    if vidx != value.len().saturating_sub(1) {
        return Err(ProtocolError::CompactedValueMismatch {
            consumed: vidx,
            actual: value.len(),
        });
    }

    Ok(points)
}

#[inline]
fn byte_at(qualifier: &[u8], offset: usize) -> Result<u8> {
    qualifier
        .get(offset)
        .copied()
        .ok_or(ProtocolError::QualifierTooShort {
            needed: 1,
            offset,
            actual: qualifier.len(),
        })
}
