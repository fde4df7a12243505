//! Aion Pool Core
//!
//! Job and share engine for an Equihash (210,9) mining pool:
//! - Job id and extranonce allocation
//! - Block template modeling with byte-exact header, coinbase and block serialization
//! - Ordered share validation with duplicate detection and wire error codes
//! - Typed job and share notifications over a tokio channel

pub mod config;
pub mod core;
pub mod error;
pub mod job;
pub mod utils;

pub use config::Config;
pub use error::{Error, Result};
pub use job::{JobEvent, JobManager, JobManagerOptions, ShareRejection, ShareSubmission};

/// Application information
pub const APP_NAME: &str = "aion-pool-core";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
