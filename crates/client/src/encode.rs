//! Wire encoding for `/api/put` request bodies
//!
//! A batch is framed as a JSON array of data points followed by a single
//! newline, then gzip-compressed. Tag maps serialize key-sorted (they are
//! `BTreeMap`-backed), so the body is byte-stable for a given batch.

use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;
use opentsdb_protocol::DataPoint;

use crate::error::EncodeError;

/// Encode a batch into `buf`, replacing its contents.
///
/// The buffer keeps its capacity across calls; the Postman reuses one scratch
/// buffer for its lifetime.
pub(crate) fn encode_batch_into(
    batch: &[DataPoint],
    buf: &mut Vec<u8>,
) -> Result<(), EncodeError> {
    buf.clear();
    let mut encoder = GzEncoder::new(buf, Compression::default());
    serde_json::to_writer(&mut encoder, batch)?;
    encoder.write_all(b"\n")?;
    encoder.finish()?;
    Ok(())
}

/// Encode a batch into a fresh gzip-compressed JSON body
pub fn encode_batch(batch: &[DataPoint]) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    encode_batch_into(batch, &mut buf)?;
    Ok(buf)
}

#[cfg(test)]
#[path = "encode_test.rs"]
mod encode_test;
