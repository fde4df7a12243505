//! Share submissions and their outcomes

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::net::IpAddr;
use thiserror::Error;

/// A share as submitted by a miner over the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareSubmission {
    pub job_id: String,
    /// Difficulty the miner held before the last retarget
    pub previous_difficulty: Option<f64>,
    /// Difficulty currently assigned to the miner
    pub difficulty: f64,
    pub extra_nonce1: String,
    pub extra_nonce2: String,
    pub n_time: String,
    pub nonce: String,
    pub ip: IpAddr,
    pub port: u16,
    pub worker: String,
    /// Length-prefixed Equihash solution, hex encoded
    pub solution: String,
}

/// Field named in a size or hex rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareField {
    ExtraNonce1,
    ExtraNonce2,
    NTime,
    Nonce,
    Solution,
}

impl ShareField {
    /// Name as it appears in rejection messages
    pub fn as_str(&self) -> &'static str {
        match self {
            ShareField::ExtraNonce1 => "extraNonce1",
            ShareField::ExtraNonce2 => "extraNonce2",
            ShareField::NTime => "ntime",
            ShareField::Nonce => "nonce",
            ShareField::Solution => "solution",
        }
    }
}

impl std::fmt::Display for ShareField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reason a share was rejected. Each variant maps to a wire error code.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShareRejection {
    #[error("job not found")]
    JobNotFound,

    #[error("incorrect size of {0}")]
    IncorrectSize(ShareField),

    #[error("invalid hex in {0}")]
    InvalidHex(ShareField),

    #[error("duplicate share")]
    DuplicateShare,

    #[error("invalid solution")]
    InvalidSolution,

    #[error("Header hash larger than target")]
    HashAboveTarget,

    #[error("low difficulty share of {0}")]
    LowDifficulty(f64),
}

impl ShareRejection {
    /// Wire error code
    pub fn code(&self) -> u32 {
        match self {
            ShareRejection::JobNotFound => 21,
            ShareRejection::DuplicateShare => 22,
            ShareRejection::LowDifficulty(_) => 23,
            ShareRejection::IncorrectSize(_)
            | ShareRejection::InvalidHex(_)
            | ShareRejection::InvalidSolution
            | ShareRejection::HashAboveTarget => 20,
        }
    }

    /// Wire error pair `[code, message]`
    pub fn to_wire(&self) -> (u32, String) {
        (self.code(), self.to_string())
    }
}

/// Returned to the caller for a share that met the network target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockCandidate {
    /// Byte-reversed header hash, hex encoded
    pub block_hash: String,
    /// Serialized block ready for submission
    pub block_hex: String,
}

/// Details of a share that passed every validation gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptedShare {
    pub height: u64,
    /// Reward as given by the daemon template
    pub block_reward: Option<Value>,
    /// Share difficulty with eight decimals
    pub share_diff: String,
    /// Network difficulty scaled by the algorithm multiplier
    pub block_diff: f64,
    /// Network difficulty of the job
    pub block_diff_actual: f64,
    /// Hex digest of the target buffer
    pub block_hash: String,
    /// Serialized block
    pub block_hex: String,
    /// Digest of the spliced coinbase transaction
    pub coinbase_hash: String,
    pub n_time: String,
    pub nonce: String,
    /// Solution without its length prefix
    pub solution: String,
    /// Daemon-side header hash of the job, if known
    pub header_hash: Option<String>,
}
