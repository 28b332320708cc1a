//! Row-key layout and scan-bound computation
//!
//! ```text
//! [metric UID: 3][base timestamp: 4, BE u32][tagk UID: 3][tagv UID: 3]...
//! ```
//!
//! Base timestamps are hour-aligned; every point in a row is addressed by a
//! qualifier offset from that base. Scans over a time range widen to whole
//! hours and rely on a timestamp post-filter in the caller.

use crate::error::ProtocolError;
use crate::{Result, ROW_SPAN_SECS, UID_LEN};

/// Byte offset of the base timestamp inside a row key
const TS_OFFSET: usize = UID_LEN;

/// Byte offset of the first tag pair inside a row key
const TAGS_OFFSET: usize = UID_LEN + 4;

/// Bytes per `[tagk UID][tagv UID]` pair
const TAG_PAIR_LEN: usize = 2 * UID_LEN;

/// Borrowed view over a validated row key
#[derive(Debug, Clone, Copy)]
pub struct RowKey<'a> {
    key: &'a [u8],
}

impl<'a> RowKey<'a> {
    /// Validate and wrap a raw row key.
    ///
    /// The key must hold the 7-byte fixed prefix and whole 6-byte tag pairs.
    pub fn parse(key: &'a [u8]) -> Result<Self> {
        if key.len() < TAGS_OFFSET {
            return Err(ProtocolError::RowKeyTooShort {
                needed: TAGS_OFFSET,
                actual: key.len(),
            });
        }
        let tag_section = key.len() - TAGS_OFFSET;
        if tag_section % TAG_PAIR_LEN != 0 {
            return Err(ProtocolError::RowKeyTagSection(tag_section));
        }
        Ok(Self { key })
    }

    /// The 3-byte metric UID
    #[inline]
    pub fn metric_uid(&self) -> &'a [u8] {
        &self.key[..UID_LEN]
    }

    /// Hour-aligned base timestamp in seconds
    #[inline]
    pub fn base_timestamp(&self) -> i64 {
        let raw = u32::from_be_bytes([
            self.key[TS_OFFSET],
            self.key[TS_OFFSET + 1],
            self.key[TS_OFFSET + 2],
            self.key[TS_OFFSET + 3],
        ]);
        i64::from(raw)
    }

    /// Number of tag pairs in the key
    #[inline]
    pub fn tag_count(&self) -> usize {
        (self.key.len() - TAGS_OFFSET) / TAG_PAIR_LEN
    }

    /// Iterate `(tagk UID, tagv UID)` pairs in key order
    pub fn tag_pairs(&self) -> impl Iterator<Item = (&'a [u8], &'a [u8])> {
        self.key[TAGS_OFFSET..]
            .chunks_exact(TAG_PAIR_LEN)
            .map(|pair| (&pair[..UID_LEN], &pair[UID_LEN..]))
    }
}

/// Row-key bounds covering `[start, end]` for a metric, widened to hours.
///
/// The start key rounds down to the containing hour; the end key rounds up
/// past the next hour boundary, so the half-open scan `[start_key, end_key)`
/// over-covers the range by up to an hour on each side. Callers filter
/// decoded points back to the requested range.
pub fn scan_bounds(metric_uid: &[u8], start: i64, end: i64) -> (Vec<u8>, Vec<u8>) {
    let start_ts = start - start.rem_euclid(ROW_SPAN_SECS);
    let end_ts = end - end.rem_euclid(ROW_SPAN_SECS) + ROW_SPAN_SECS + 1;
    (key_prefix(metric_uid, start_ts), key_prefix(metric_uid, end_ts))
}

/// Row-key bounds for tag discovery: the raw range widened by one second.
pub fn tag_scan_bounds(metric_uid: &[u8], start: i64, end: i64) -> (Vec<u8>, Vec<u8>) {
    (key_prefix(metric_uid, start - 1), key_prefix(metric_uid, end + 1))
}

fn key_prefix(metric_uid: &[u8], ts: i64) -> Vec<u8> {
    let mut key = Vec::with_capacity(metric_uid.len() + 4);
    key.extend_from_slice(metric_uid);
    key.extend_from_slice(&(ts as u32).to_be_bytes());
    key
}
