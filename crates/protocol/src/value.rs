//! Cell value decoding
//!
//! Values are big-endian and 1, 2, 4 or 8 bytes wide. Integers are signed;
//! floats are IEEE-754 binary32 (4 bytes) or binary64 (8 bytes).
//!
//! # Legacy float fix
//!
//! Early OpenTSDB versions wrote binary32 floats on 8 bytes: the qualifier
//! declares 4 bytes (length field `0x3`) but the cell holds four zero pad
//! bytes followed by the binary32 payload. Such values decode by dropping
//! the pad; non-zero pad bytes mean the cell is corrupt.

use crate::error::ProtocolError;
use crate::qualifier::{FLAG_FLOAT, LENGTH_MASK};
use crate::{Result, Value};

/// Decode a value slice according to its qualifier flag bits.
///
/// `flags` is the masked flag nibble of the owning qualifier record (float
/// flag plus 3-bit length field); `bytes` is the value slice for this point.
pub fn decode_value(flags: u8, bytes: &[u8]) -> Result<Value> {
    if flags & FLAG_FLOAT != 0 {
        decode_float(flags, bytes)
    } else {
        decode_int(bytes)
    }
}

fn decode_float(flags: u8, bytes: &[u8]) -> Result<Value> {
    match bytes.len() {
        4 => {
            let raw = [bytes[0], bytes[1], bytes[2], bytes[3]];
            Ok(Value::Float(f64::from(f32::from_be_bytes(raw))))
        }
        8 if flags & LENGTH_MASK == 0x3 => {
            // Legacy 8-bytes-for-binary32 encoding.
            let pad = [bytes[0], bytes[1], bytes[2], bytes[3]];
            if pad != [0, 0, 0, 0] {
                return Err(ProtocolError::CorruptLegacyFloat(pad));
            }
            let raw = [bytes[4], bytes[5], bytes[6], bytes[7]];
            Ok(Value::Float(f64::from(f32::from_be_bytes(raw))))
        }
        8 => {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(bytes);
            Ok(Value::Float(f64::from_be_bytes(raw)))
        }
        n => Err(ProtocolError::FloatWidth(n)),
    }
}

fn decode_int(bytes: &[u8]) -> Result<Value> {
    let v = match bytes.len() {
        1 => i64::from(bytes[0] as i8),
        2 => i64::from(i16::from_be_bytes([bytes[0], bytes[1]])),
        4 => i64::from(i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])),
        8 => {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(bytes);
            i64::from_be_bytes(raw)
        }
        n => return Err(ProtocolError::IntegerWidth(n)),
    };
    Ok(Value::Int(v))
}
