use super::qualifier::*;
use super::{ProtocolError, Value};

// =============================================================================
// Bit-field extraction tests
// =============================================================================

#[test]
fn test_offset_seconds() {
    assert_eq!(offset_sec(&[0x00, 0x37], 0).unwrap(), 3);
    assert_eq!(offset_sec(&[0x00, 0x47], 0).unwrap(), 4);
    // Largest second offset: 0xFFF0 >> 4
    assert_eq!(offset_sec(&[0xEF, 0xF0], 0).unwrap(), 0x0EFF);
}

#[test]
fn test_offset_milliseconds_truncates_to_seconds() {
    // 8 ms past the hour truncates to 0 seconds
    assert_eq!(offset_sec(&[0xF0, 0x00, 0x02, 0x07], 0).unwrap(), 0);
    // 2000 ms -> 2 s (offset field 2000 << 6 = 0x01F400)
    assert_eq!(offset_sec(&[0xF0, 0x01, 0xF4, 0x07], 0).unwrap(), 2);
}

#[test]
fn test_in_milliseconds() {
    assert!(in_milliseconds(0xF0));
    assert!(in_milliseconds(0xFF));
    assert!(!in_milliseconds(0x00));
    assert!(!in_milliseconds(0xE0));
}

#[test]
fn test_qualifier_len() {
    assert_eq!(qualifier_len(&[0x00, 0x37], 0).unwrap(), 2);
    assert_eq!(qualifier_len(&[0xF0, 0x00, 0x02, 0x07], 0).unwrap(), 4);

    let qual = [0x00, 0x37, 0xF0, 0x00, 0x02, 0x07, 0x00, 0x47];
    assert_eq!(qualifier_len(&qual, 2).unwrap(), 4);
    assert_eq!(qualifier_len(&qual, 6).unwrap(), 2);
}

#[test]
fn test_qualifier_len_truncated_ms_record() {
    let err = qualifier_len(&[0xF0, 0x00], 0).unwrap_err();
    assert!(matches!(err, ProtocolError::QualifierTooShort { .. }));
}

#[test]
fn test_value_len_integers() {
    assert_eq!(value_len(&[0, 0x07], 0).unwrap(), 8);
    assert_eq!(value_len(&[0, 0x0F], 0).unwrap(), 8);
    assert_eq!(value_len(&[0, 0x00], 0).unwrap(), 1);
    assert_eq!(value_len(&[0, 0x4B], 0).unwrap(), 4);
}

#[test]
fn test_value_len_floats() {
    assert_eq!(value_len(&[0, 0x0B], 0).unwrap(), 4);
    assert_eq!(value_len(&[0, 0x1B], 0).unwrap(), 4);
    assert_eq!(value_len(&[0, 0x1F], 0).unwrap(), 8);
}

#[test]
fn test_value_len_ms_variant() {
    assert_eq!(value_len(&[0xF0, 0x00, 0x02, 0x07], 0).unwrap(), 8);
}

#[test]
fn test_flags() {
    assert_eq!(flags(&[0x00, 0x37], 0).unwrap(), 0x07);
    assert_eq!(flags(&[0x00, 0x1B], 0).unwrap(), 0x0B);
    assert_eq!(flags(&[0xF0, 0x00, 0x02, 0x0B], 0).unwrap(), 0x0B);
}

#[test]
fn test_is_float() {
    assert!(!is_float(&[0x00, 0x37], 0).unwrap());
    assert!(is_float(&[0x00, 0x1B], 0).unwrap());
}

// =============================================================================
// Cell decoding tests
// =============================================================================

#[test]
fn test_decode_cell_single_int() {
    let qual = [0x00, 0x37];
    let value = 5i64.to_be_bytes();

    let points = decode_cell(&qual, &value).unwrap();
    assert_eq!(
        points,
        vec![CellPoint {
            offset_sec: 3,
            value: Value::Int(5),
        }]
    );
}

#[test]
fn test_decode_cell_single_float() {
    let qual = [0x00, 0x1B];
    let value = 0.25f32.to_be_bytes();

    let points = decode_cell(&qual, &value).unwrap();
    assert_eq!(points[0].value, Value::Float(0.25));
}

#[test]
fn test_decode_cell_single_legacy_float() {
    // Qualifier declares a 4-byte float, cell carries 4 zero pad bytes
    // followed by the binary32 payload.
    let qual = [0x00, 0x0B];
    let mut value = vec![0, 0, 0, 0];
    value.extend_from_slice(&1.5f32.to_be_bytes());

    let points = decode_cell(&qual, &value).unwrap();
    assert_eq!(points[0].value, Value::Float(1.5));
}

#[test]
fn test_decode_cell_single_length_mismatch() {
    let qual = [0x00, 0x37]; // declares 8 bytes
    let value = [0u8; 4];

    let err = decode_cell(&qual, &value).unwrap_err();
    assert!(matches!(
        err,
        ProtocolError::ValueLengthMismatch {
            declared: 8,
            actual: 4,
        }
    ));
}

#[test]
fn test_decode_cell_compacted_seconds() {
    // Two 8-byte integers at offsets 0 and 4, one trailing metadata byte.
    let qual = [0x00, 0x07, 0x00, 0x47];
    let mut value = Vec::new();
    value.extend_from_slice(&10i64.to_be_bytes());
    value.extend_from_slice(&(-20i64).to_be_bytes());
    value.push(0);

    let points = decode_cell(&qual, &value).unwrap();
    assert_eq!(
        points,
        vec![
            CellPoint {
                offset_sec: 0,
                value: Value::Int(10),
            },
            CellPoint {
                offset_sec: 4,
                value: Value::Int(-20),
            },
        ]
    );
}

#[test]
fn test_decode_cell_compacted_mixed_resolution() {
    // A second-resolution int followed by a millisecond-resolution int.
    let qual = [0x00, 0x27, 0xF0, 0x01, 0xF4, 0x07];
    let mut value = Vec::new();
    value.extend_from_slice(&1i64.to_be_bytes());
    value.extend_from_slice(&2i64.to_be_bytes());
    value.push(0);

    let points = decode_cell(&qual, &value).unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].offset_sec, 2);
    assert_eq!(points[1].offset_sec, 2);
    assert_eq!(points[1].value, Value::Int(2));
}

#[test]
fn test_decode_cell_compacted_mixed_widths_and_kinds() {
    // 1-byte int at offset 1, 4-byte float at offset 2.
    let qual = [0x00, 0x10, 0x00, 0x2B];
    let mut value = vec![7u8];
    value.extend_from_slice(&0.5f32.to_be_bytes());
    value.push(0);

    let points = decode_cell(&qual, &value).unwrap();
    assert_eq!(points[0].value, Value::Int(7));
    assert_eq!(points[0].offset_sec, 1);
    assert_eq!(points[1].value, Value::Float(0.5));
    assert_eq!(points[1].offset_sec, 2);
}

#[test]
fn test_decode_cell_dangling_qualifier_byte() {
    let qual = [0x00, 0x07, 0x00];
    let mut value = 1i64.to_be_bytes().to_vec();
    value.push(0);

    let err = decode_cell(&qual, &value).unwrap_err();
    assert!(matches!(err, ProtocolError::DanglingQualifier(1)));
}

#[test]
fn test_decode_cell_compacted_missing_metadata_byte() {
    let qual = [0x00, 0x07, 0x00, 0x47];
    let mut value = Vec::new();
    value.extend_from_slice(&1i64.to_be_bytes());
    value.extend_from_slice(&2i64.to_be_bytes());
    // no trailing metadata byte

    let err = decode_cell(&qual, &value).unwrap_err();
    assert!(matches!(
        err,
        ProtocolError::CompactedValueMismatch { consumed: 16, .. }
    ));
}

#[test]
fn test_decode_cell_compacted_value_truncated() {
    let qual = [0x00, 0x07, 0x00, 0x47];
    let value = 1i64.to_be_bytes(); // second record has no bytes

    let err = decode_cell(&qual, &value).unwrap_err();
    assert!(matches!(err, ProtocolError::ValueTooShort { .. }));
}

#[test]
fn test_decode_cell_empty_qualifier() {
    let err = decode_cell(&[], &[]).unwrap_err();
    assert!(matches!(err, ProtocolError::QualifierTooShort { .. }));
}
