//! 256-bit mining targets and difficulty arithmetic

use crate::error::{Error, Result};
use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Difficulty-1 target: `0x00000000ffff0000...0000`
pub static DIFF1: Lazy<BigUint> = Lazy::new(|| BigUint::from(0xffffu32) << 208u32);

/// Difficulty-1 as a float, the numerator of every difficulty ratio
pub fn diff1_f64() -> f64 {
    DIFF1.to_f64().unwrap_or(f64::MAX)
}

/// Represents a 256-bit unsigned mining target (big-endian semantics)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target(BigUint);

impl Target {
    /// Create a Target from 32 big-endian bytes
    pub fn from_be_bytes(bytes: &[u8; 32]) -> Self {
        Self(BigUint::from_bytes_be(bytes))
    }

    /// Parse a big-endian hex target, with or without `0x` prefix
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let cleaned = hex_str.trim_start_matches("0x").trim_start_matches("0X");
        if cleaned.is_empty() {
            return Err(Error::target("empty target"));
        }
        let value = BigUint::parse_bytes(cleaned.as_bytes(), 16)
            .ok_or_else(|| Error::target(format!("Invalid hex: {}", hex_str)))?;
        Self::from_biguint(value)
    }

    /// Decode a compact-bits target given as 8 hex characters (`1d00ffff`).
    ///
    /// The high byte is the exponent `e`, the low three bytes the mantissa
    /// `m`; the target is `m * 256^(e - 3)`.
    pub fn from_compact_hex(bits_hex: &str) -> Result<Self> {
        let bits = u32::from_str_radix(bits_hex, 16)
            .map_err(|e| Error::target(format!("Invalid compact bits {}: {}", bits_hex, e)))?;
        Self::from_compact(bits)
    }

    /// Decode a compact-bits target
    pub fn from_compact(bits: u32) -> Result<Self> {
        let exponent = bits >> 24;
        let mantissa = BigUint::from(bits & 0x00ff_ffff);
        let value = if exponent <= 3 {
            mantissa >> (8 * (3 - exponent))
        } else {
            mantissa << (8 * (exponent - 3))
        };
        Self::from_biguint(value)
    }

    fn from_biguint(value: BigUint) -> Result<Self> {
        if value.bits() > 256 {
            return Err(Error::target("Value exceeds 256 bits"));
        }
        Ok(Self(value))
    }

    /// Whether the target is zero (no hash can meet it)
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Underlying integer
    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    /// 32 big-endian bytes
    pub fn to_be_bytes(&self) -> [u8; 32] {
        let bytes = self.0.to_bytes_be();
        let mut out = [0u8; 32];
        out[32 - bytes.len()..].copy_from_slice(&bytes);
        out
    }

    /// 64-character lowercase hex, zero padded
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_be_bytes())
    }

    /// Compare a hash, read as a big-endian 256-bit integer, with the target
    pub fn cmp_hash(&self, hash: &[u8]) -> Ordering {
        BigUint::from_bytes_be(hash).cmp(&self.0)
    }

    /// True when `hash <= target`
    pub fn is_met_by(&self, hash: &[u8]) -> bool {
        self.cmp_hash(hash) != Ordering::Greater
    }

    /// Network difficulty: `diff1 / target`, rounded to 9 decimal places
    pub fn difficulty(&self) -> f64 {
        let raw = diff1_f64() / self.0.to_f64().unwrap_or(f64::MAX);
        round_to(raw, 9)
    }
}

/// Difficulty of a hash read as a big-endian integer, scaled by `multiplier`
pub fn hash_difficulty(hash: &[u8], multiplier: f64) -> f64 {
    let value = BigUint::from_bytes_be(hash).to_f64().unwrap_or(f64::MAX);
    diff1_f64() / value * multiplier
}

/// Round through decimal formatting so the result matches a fixed-point
/// rendering of the same value.
pub fn round_to(value: f64, decimals: usize) -> f64 {
    format!("{:.*}", decimals, value)
        .parse()
        .unwrap_or(value)
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Target {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Target {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}
