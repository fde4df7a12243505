//! Core types for the pool engine
//!
//! Nonce allocation, 256-bit targets and the algorithm registry.

pub mod algorithm;
mod nonce;
mod target;

pub use algorithm::{
    Algorithm, AlgorithmRegistry, BlockHasher, CoinbaseHasher, HashKind, HeaderOnlyVerifier,
    PowVerifier, ResolvedAlgorithm,
};
pub use nonce::{ExtraNonceCounter, JobCounter};
pub use target::{diff1_f64, hash_difficulty, round_to, Target, DIFF1};

/// Byte layout of the block header and submitted fields
pub mod constants {
    /// Width of every 32-byte hash field
    pub const HASH_SIZE: usize = 32;
    /// Logs bloom width
    pub const LOGS_BLOOM_SIZE: usize = 256;
    /// Header difficulty field width
    pub const DIFFICULTY_SIZE: usize = 16;
    /// Width of the timestamp, block number and energy fields
    pub const U64_FIELD_SIZE: usize = 8;
    /// Extra data field width
    pub const EXTRA_DATA_SIZE: usize = 32;
    /// Miner nonce width
    pub const NONCE_SIZE: usize = 32;
    /// Miner nTime width
    pub const NTIME_SIZE: usize = 8;
    /// Equihash (210,9) solution width
    pub const SOLUTION_SIZE: usize = 1408;
    /// Length prefix carried in front of a submitted solution
    pub const SOLUTION_PREFIX_SIZE: usize = 3;

    /// Fields shared by both header layouts, parent hash through extra data
    pub const HEADER_PREFIX_SIZE: usize = 5 * HASH_SIZE
        + LOGS_BLOOM_SIZE
        + DIFFICULTY_SIZE
        + 2 * U64_FIELD_SIZE
        + EXTRA_DATA_SIZE;

    /// Header without solution, as fed to the proof-of-work verifier
    pub const HEADER_SIZE: usize = HEADER_PREFIX_SIZE + 2 * U64_FIELD_SIZE + NONCE_SIZE;

    /// Header with solution, as hashed for the target comparison
    pub const HEADER_TARGET_SIZE: usize =
        HEADER_PREFIX_SIZE + NONCE_SIZE + SOLUTION_SIZE + 2 * U64_FIELD_SIZE;

    /// Hex length of a submitted nTime
    pub const NTIME_HEX_LEN: usize = NTIME_SIZE * 2;
    /// Hex length of a submitted nonce
    pub const NONCE_HEX_LEN: usize = NONCE_SIZE * 2;
    /// Hex length of a submitted solution, prefix included
    pub const SOLUTION_HEX_LEN: usize = (SOLUTION_PREFIX_SIZE + SOLUTION_SIZE) * 2;
}


#[cfg(test)]
mod tests_property;
