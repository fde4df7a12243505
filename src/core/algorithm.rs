//! Mining algorithm registry
//!
//! Each configured coin names an algorithm. The registry maps that name to
//! its share multiplier, its proof-of-work verifier and the hash primitive
//! used for header digests. Coinbase and block hashers are then chosen from a
//! fixed per-family table, see [`AlgorithmRegistry::resolve`].

use crate::config::{CoinConfig, RewardType};
use crate::error::{Error, Result};
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use sha2::Sha256;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type Blake2b256 = Blake2b<U32>;

/// Hash primitives available to the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashKind {
    /// Single SHA-256
    Sha256,
    /// SHA-256 applied twice
    Sha256d,
    /// Blake2b with a 32-byte digest
    Blake2b256,
}

impl HashKind {
    /// Hash `data` with this primitive
    pub fn digest(self, data: &[u8]) -> [u8; 32] {
        match self {
            HashKind::Sha256 => Sha256::digest(data).into(),
            HashKind::Sha256d => Sha256::digest(Sha256::digest(data)).into(),
            HashKind::Blake2b256 => Blake2b256::digest(data).into(),
        }
    }
}

/// Proof-of-work verification primitive.
///
/// Given the serialized header (without solution) and the raw solution
/// bytes, report whether the solution is valid for that header.
pub trait PowVerifier: Send + Sync {
    /// Verify `solution` against `header`
    fn verify(&self, header: &[u8], solution: &[u8]) -> bool;
}

impl<F> PowVerifier for F
where
    F: Fn(&[u8], &[u8]) -> bool + Send + Sync,
{
    fn verify(&self, header: &[u8], solution: &[u8]) -> bool {
        self(header, solution)
    }
}

/// Verifier for header-only algorithms that carry no separate solution.
///
/// Acceptance is left entirely to the target comparison.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeaderOnlyVerifier;

impl PowVerifier for HeaderOnlyVerifier {
    fn verify(&self, _header: &[u8], _solution: &[u8]) -> bool {
        true
    }
}

/// One registry entry
#[derive(Clone)]
pub struct Algorithm {
    /// Share difficulty multiplier
    pub multiplier: f64,
    /// Primitive used for header digests
    pub digest: HashKind,
    /// Proof-of-work verifier
    pub verifier: Arc<dyn PowVerifier>,
}

impl Algorithm {
    /// Create an entry with multiplier 1
    pub fn new(digest: HashKind, verifier: Arc<dyn PowVerifier>) -> Self {
        Self {
            multiplier: 1.0,
            digest,
            verifier,
        }
    }
}

impl fmt::Debug for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Algorithm")
            .field("multiplier", &self.multiplier)
            .field("digest", &self.digest)
            .finish_non_exhaustive()
    }
}

/// How the coinbase transaction is hashed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoinbaseHasher {
    /// Single SHA-256
    Sha256,
    /// Double SHA-256
    Sha256d,
}

impl CoinbaseHasher {
    /// Hash a serialized coinbase transaction
    pub fn hash(self, coinbase: &[u8]) -> [u8; 32] {
        match self {
            CoinbaseHasher::Sha256 => HashKind::Sha256.digest(coinbase),
            CoinbaseHasher::Sha256d => HashKind::Sha256d.digest(coinbase),
        }
    }
}

/// How the display block hash is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockHasher {
    /// Byte-reversed double SHA-256
    ReversedSha256d,
    /// Byte-reversed algorithm digest
    ReversedDigest(HashKind),
}

impl BlockHasher {
    /// Hash `data` and reverse the byte order for display
    pub fn hash(self, data: &[u8]) -> [u8; 32] {
        let mut out = match self {
            BlockHasher::ReversedSha256d => HashKind::Sha256d.digest(data),
            BlockHasher::ReversedDigest(kind) => kind.digest(data),
        };
        out.reverse();
        out
    }
}

/// Everything the job manager needs for one coin configuration
#[derive(Debug, Clone)]
pub struct ResolvedAlgorithm {
    /// Algorithm name as configured
    pub name: String,
    /// Registry entry
    pub algorithm: Algorithm,
    /// Selected coinbase hasher
    pub coinbase_hasher: CoinbaseHasher,
    /// Selected block hasher
    pub block_hasher: BlockHasher,
}

impl ResolvedAlgorithm {
    /// Share difficulty multiplier
    pub fn multiplier(&self) -> f64 {
        self.algorithm.multiplier
    }

    /// Digest `data` with the algorithm's hash primitive
    pub fn digest(&self, data: &[u8]) -> [u8; 32] {
        self.algorithm.digest.digest(data)
    }

    /// Run the proof-of-work verifier
    pub fn verify(&self, header: &[u8], solution: &[u8]) -> bool {
        self.algorithm.verifier.verify(header, solution)
    }
}

/// Algorithm name to entry mapping, supplied at construction time
#[derive(Debug, Clone, Default)]
pub struct AlgorithmRegistry {
    entries: HashMap<String, Algorithm>,
}

impl AlgorithmRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the pool's standard entries: `sha256` (header-only,
    /// SHA-256d digest) and `equihash` (blake2b-256 digest, checked by the
    /// supplied Equihash verifier).
    pub fn standard(equihash: Arc<dyn PowVerifier>) -> Self {
        let mut registry = Self::new();
        registry.register(
            "sha256",
            Algorithm::new(HashKind::Sha256d, Arc::new(HeaderOnlyVerifier)),
        );
        registry.register("equihash", Algorithm::new(HashKind::Blake2b256, equihash));
        registry
    }

    /// Add or replace an entry
    pub fn register(&mut self, name: impl Into<String>, algorithm: Algorithm) {
        self.entries.insert(name.into(), algorithm);
    }

    /// Look up an entry by name
    pub fn get(&self, name: &str) -> Option<&Algorithm> {
        self.entries.get(name)
    }

    /// Resolve the entry and hashers for a coin configuration
    pub fn resolve(&self, coin: &CoinConfig) -> Result<ResolvedAlgorithm> {
        let algorithm = self
            .get(&coin.algorithm)
            .cloned()
            .ok_or_else(|| Error::algorithm(format!("unknown algorithm: {}", coin.algorithm)))?;

        let coinbase_hasher = select_coinbase_hasher(&coin.algorithm, coin.normal_hashing);
        let block_hasher = select_block_hasher(&coin.algorithm, coin.reward, algorithm.digest);

        Ok(ResolvedAlgorithm {
            name: coin.algorithm.clone(),
            algorithm,
            coinbase_hasher,
            block_hasher,
        })
    }
}

fn select_coinbase_hasher(algorithm: &str, normal_hashing: bool) -> CoinbaseHasher {
    match algorithm {
        "keccak" | "blake" | "fugue" | "groestl" if !normal_hashing => CoinbaseHasher::Sha256,
        _ => CoinbaseHasher::Sha256d,
    }
}

fn select_block_hasher(algorithm: &str, reward: RewardType, digest: HashKind) -> BlockHasher {
    match algorithm {
        "scrypt" | "scrypt-og" | "scrypt-jane" if reward == RewardType::Pos => {
            BlockHasher::ReversedDigest(digest)
        }
        "scrypt" | "scrypt-og" | "scrypt-jane" | "scrypt-n" | "sha1" => {
            BlockHasher::ReversedSha256d
        }
        _ => BlockHasher::ReversedDigest(digest),
    }
}
