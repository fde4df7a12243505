//! Job id and extranonce allocation
//!
//! - [`JobCounter`]: monotonic hex job identifiers, one per template
//! - [`ExtraNonceCounter`]: per-subscriber extranonce1 values, disjoint across
//!   pool instances sharing a daemon

use crate::error::{Error, Result};
use std::sync::atomic::{AtomicI32, Ordering};

/// Job ids wrap back to 1 whenever the counter reaches a multiple of this.
const JOB_ID_WRAP: u32 = 0xffff;

/// Instance id bits are placed above this shift in the extranonce counter.
const INSTANCE_SHIFT: u32 = 27;

/// Generates a new job id for every accepted block template
#[derive(Debug, Clone, Default)]
pub struct JobCounter {
    counter: u32,
}

impl JobCounter {
    /// Create a counter that has not issued any id yet
    pub fn new() -> Self {
        Self { counter: 0 }
    }

    /// Advance the counter and return the new job id
    pub fn next(&mut self) -> String {
        self.counter += 1;
        if self.counter % JOB_ID_WRAP == 0 {
            self.counter = 1;
        }
        self.current()
    }

    /// Current job id as lowercase hex, without advancing
    pub fn current(&self) -> String {
        format!("{:x}", self.counter)
    }
}

/// Allocates a unique extranonce1 for each subscriber
#[derive(Debug)]
pub struct ExtraNonceCounter {
    instance_id: u32,
    counter: AtomicI32,
}

impl ExtraNonceCounter {
    /// Extranonce1 width in bytes
    pub const SIZE: usize = 4;

    /// Create a counter seeded from `instance_id`, or from 4 random bytes
    /// when none is configured (a zero id counts as none).
    pub fn new(instance_id: Option<u32>) -> Result<Self> {
        let instance_id = match instance_id {
            Some(id) if id != 0 => id,
            _ => random_instance_id()?,
        };
        Ok(Self::with_instance_id(instance_id))
    }

    /// Create a counter for a known instance id
    pub fn with_instance_id(instance_id: u32) -> Self {
        let seed = (instance_id << INSTANCE_SHIFT) as i32;
        Self {
            instance_id,
            counter: AtomicI32::new(seed),
        }
    }

    /// Instance id the counter was seeded with
    pub fn instance_id(&self) -> u32 {
        self.instance_id
    }

    /// Return the next extranonce1 as 8 lowercase hex characters.
    ///
    /// The counter is a 32-bit signed integer that wraps on overflow; the
    /// value handed out is the absolute value of the pre-increment counter.
    pub fn next(&self) -> String {
        let value = self.counter.fetch_add(1, Ordering::Relaxed);
        hex::encode(value.unsigned_abs().to_be_bytes())
    }

    /// Extranonce1 width in bytes
    pub fn size(&self) -> usize {
        Self::SIZE
    }
}

fn random_instance_id() -> Result<u32> {
    let mut bytes = [0u8; 4];
    getrandom::fill(&mut bytes)
        .map_err(|e| Error::random(format!("failed to draw instance id: {}", e)))?;
    Ok(u32::from_le_bytes(bytes))
}
