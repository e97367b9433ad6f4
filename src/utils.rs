//! A collection of utilities for serializing numbers, strings and signatures,
//! and a few numeric helpers.

/// A collection of signatures for the different artifact kinds.
pub mod signatures {
    /// Signatures for the different sections of an artifact.
    pub const MODEL_SIG: [u8; 4] = [0x52, 0x46, 0x17, 0x42];
    pub const TREE_SIG: [u8; 2] = [0x54, 0x52];
    pub const ENCODERS_SIG: [u8; 4] = [0x4c, 0x45, 0x17, 0x42];
    pub const COLUMN_SIG: [u8; 2] = [0x43, 0x4c];
    pub const MODEL_EXTENSION: &str = ".rfm";
    pub const ENCODERS_EXTENSION: &str = ".lenc";

    /// Return True if 'input' starts with 'signature'.
    pub fn match_signature(input: &[u8], signature: &[u8]) -> bool {
        input.starts_with(signature)
    }
}

/// Implements encoding and decoding of regular numbers. All numbers are
/// written in big-endian order.
pub mod number_encoding {
    pub fn encode32(num: u32, stream: &mut Vec<u8>) -> usize {
        stream.extend_from_slice(&num.to_be_bytes());
        4
    }

    pub fn decode32(stream: &[u8]) -> Option<(usize, u32)> {
        let bytes: [u8; 4] = stream.get(0..4)?.try_into().ok()?;
        Some((4, u32::from_be_bytes(bytes)))
    }

    pub fn encode_f64(num: f64, stream: &mut Vec<u8>) -> usize {
        stream.extend_from_slice(&num.to_bits().to_be_bytes());
        8
    }

    pub fn decode_f64(stream: &[u8]) -> Option<(usize, f64)> {
        let bytes: [u8; 8] = stream.get(0..8)?.try_into().ok()?;
        Some((8, f64::from_bits(u64::from_be_bytes(bytes))))
    }
}

/// Implements encoding and decoding of utf-8 strings and lists of strings.
/// A string is written as its length in bytes followed by the bytes.
pub mod string_encoding {
    use super::number_encoding;

    /// Encode 'val' and return the number of bytes written.
    pub fn encode(val: &str, stream: &mut Vec<u8>) -> usize {
        number_encoding::encode32(val.len() as u32, stream);
        stream.extend_from_slice(val.as_bytes());
        4 + val.len()
    }

    /// Decode a string and return the number of bytes read and the string.
    pub fn decode(stream: &[u8]) -> Option<(usize, String)> {
        let (read, len) = number_encoding::decode32(stream)?;
        let end = read.checked_add(len as usize)?;
        let bytes = stream.get(read..end)?;
        let val = std::str::from_utf8(bytes).ok()?;
        Some((end, val.to_string()))
    }

    // Encode the array and return the number of bytes written.
    pub fn encode_array(array: &[String], stream: &mut Vec<u8>) -> usize {
        let mut written = number_encoding::encode32(array.len() as u32, stream);
        for val in array {
            written += encode(val, stream);
        }
        written
    }

    // Decode the array and return the number of bytes that were read.
    pub fn decode_array(
        stream: &[u8],
        array: &mut Vec<String>,
    ) -> Option<usize> {
        let (mut cursor, len) = number_encoding::decode32(stream)?;
        for _ in 0..len {
            let (read, val) = decode(stream.get(cursor..)?)?;
            cursor += read;
            array.push(val);
        }
        Some(cursor)
    }
}

/// Round 'val' to two decimal places, the precision scores are displayed in.
pub fn round2(val: f64) -> f64 {
    (val * 100.0).round() / 100.0
}

/// Returns the arithmetic mean of 'values', or None for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

#[test]
fn test_string_round_trip() {
    let mut stream = Vec::new();
    let names = vec!["Age".to_string(), String::new(), "جێندەر".to_string()];
    let written = string_encoding::encode_array(&names, &mut stream);
    assert_eq!(written, stream.len());

    let mut decoded = Vec::new();
    let read = string_encoding::decode_array(&stream, &mut decoded).unwrap();
    assert_eq!(read, written);
    assert_eq!(decoded, names);
}

#[test]
fn test_truncated_input() {
    let mut stream = Vec::new();
    string_encoding::encode("StudyHours", &mut stream);
    for len in 0..stream.len() {
        assert!(string_encoding::decode(&stream[..len]).is_none());
    }
    assert!(number_encoding::decode_f64(&[1, 2, 3]).is_none());
}

#[test]
fn test_round2() {
    assert_eq!(round2(88.499), 88.5);
    assert_eq!(round2(59.994), 59.99);
    assert_eq!(round2(59.996), 60.0);
    assert_eq!(mean(&[]), None);
    assert_eq!(mean(&[1.0, 2.0, 6.0]), Some(3.0));
}
