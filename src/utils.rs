//! Utility functions and helpers
//!
//! Logging setup plus the small byte/hex helpers shared by the template and
//! share code.

use crate::{Error, Result};
use tracing_subscriber::EnvFilter;

/// Initialize logging based on configuration
pub fn init_logging(level: &str, format: &str) {
    let env_filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
    }
}

/// Check that `s` is an even-length string of hex digit pairs.
///
/// Case is ignored. The empty string is accepted.
pub fn is_hex_string(s: &str) -> bool {
    s.len() % 2 == 0 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Decode a hex string that must fit into `width` bytes and left-pad it with
/// zeros to exactly `width` bytes.
pub fn decode_hex_padded(field: &str, hex_str: &str, width: usize) -> Result<Vec<u8>> {
    let cleaned = hex_str
        .strip_prefix("0x")
        .or_else(|| hex_str.strip_prefix("0X"))
        .unwrap_or(hex_str);
    let normalized = if cleaned.len() % 2 == 1 {
        format!("0{}", cleaned)
    } else {
        cleaned.to_string()
    };
    let bytes = hex::decode(&normalized)
        .map_err(|e| Error::template(format!("{} is not valid hex: {}", field, e)))?;

    if bytes.len() > width {
        return Err(Error::template(format!(
            "{} is {} bytes, field holds {}",
            field,
            bytes.len(),
            width
        )));
    }

    let mut out = vec![0u8; width - bytes.len()];
    out.extend_from_slice(&bytes);
    Ok(out)
}

/// Return a byte-reversed copy of `bytes`
pub fn reverse_bytes(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().rev().copied().collect()
}

/// Bitcoin-style variable length integer (CompactSize)
pub fn var_int(n: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(9);
    match n {
        0..=0xfc => out.push(n as u8),
        0xfd..=0xffff => {
            out.push(0xfd);
            out.extend_from_slice(&(n as u16).to_le_bytes());
        }
        0x1_0000..=0xffff_ffff => {
            out.push(0xfe);
            out.extend_from_slice(&(n as u32).to_le_bytes());
        }
        _ => {
            out.push(0xff);
            out.extend_from_slice(&n.to_le_bytes());
        }
    }
    out
}

/// Decode a varint from the front of `bytes`, returning the value and the
/// number of bytes consumed
#[cfg(test)]
pub(crate) fn read_var_int(bytes: &[u8]) -> Option<(u64, usize)> {
    let (&tag, rest) = bytes.split_first()?;
    match tag {
        0xfd => Some((u16::from_le_bytes(rest.get(..2)?.try_into().ok()?) as u64, 3)),
        0xfe => Some((u32::from_le_bytes(rest.get(..4)?.try_into().ok()?) as u64, 5)),
        0xff => Some((u64::from_le_bytes(rest.get(..8)?.try_into().ok()?), 9)),
        n => Some((n as u64, 1)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", true)]
    #[case("00ff", true)]
    #[case("AbCdEf", true)]
    #[case("abc", false)]
    #[case("0g", false)]
    #[case("zz11", false)]
    #[case("0x00", false)]
    fn test_is_hex_string(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(is_hex_string(input), expected);
    }

    #[test]
    fn test_decode_hex_padded() {
        assert_eq!(decode_hex_padded("f", "0102", 4).unwrap(), vec![0, 0, 1, 2]);
        assert_eq!(decode_hex_padded("f", "0x102", 4).unwrap(), vec![0, 0, 1, 2]);
        assert!(decode_hex_padded("f", "0102030405", 4).is_err());
        assert!(decode_hex_padded("f", "xyz0", 4).is_err());
    }

    #[test]
    fn test_reverse_bytes() {
        assert_eq!(reverse_bytes(&[1, 2, 3]), vec![3, 2, 1]);
        assert!(reverse_bytes(&[]).is_empty());
    }

    #[rstest]
    #[case(0, vec![0x00])]
    #[case(0xfc, vec![0xfc])]
    #[case(0xfd, vec![0xfd, 0xfd, 0x00])]
    #[case(1408, vec![0xfd, 0x80, 0x05])]
    #[case(0x1_0000, vec![0xfe, 0x00, 0x00, 0x01, 0x00])]
    fn test_var_int(#[case] n: u64, #[case] expected: Vec<u8>) {
        assert_eq!(var_int(n), expected);
        assert_eq!(read_var_int(&expected), Some((n, expected.len())));
    }

    #[test]
    fn test_read_var_int_truncated() {
        assert_eq!(read_var_int(&[]), None);
        assert_eq!(read_var_int(&[0xfd, 0x01]), None);
    }
}
