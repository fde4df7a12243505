//! Configuration management for the pool job engine
//!
//! Supports configuration via command line arguments, environment variables,
//! and configuration files (YAML/JSON) with validation and defaults.

use crate::job::JobManagerOptions;
use crate::{Error, Result};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Block reward scheme of the coin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
pub enum RewardType {
    /// Proof of work
    #[default]
    #[serde(rename = "POW")]
    #[value(name = "POW", alias = "pow")]
    Pow,
    /// Proof of stake; blocks carry a trailing signature placeholder byte
    #[serde(rename = "POS")]
    #[value(name = "POS", alias = "pos")]
    Pos,
}

impl fmt::Display for RewardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RewardType::Pow => write!(f, "POW"),
            RewardType::Pos => write!(f, "POS"),
        }
    }
}

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Filter directive understood by `EnvFilter`
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Coin section of the pool configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinConfig {
    /// Coin name
    #[serde(default = "default_coin_name")]
    pub name: String,

    /// Ticker symbol
    #[serde(default = "default_coin_symbol")]
    pub symbol: String,

    /// Algorithm name, looked up in the algorithm registry
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// Reward scheme
    #[serde(default)]
    pub reward: RewardType,

    /// Use double SHA-256 for the coinbase even on single-hash families
    #[serde(default, rename = "normalHashing")]
    pub normal_hashing: bool,
}

impl Default for CoinConfig {
    fn default() -> Self {
        Self {
            name: default_coin_name(),
            symbol: default_coin_symbol(),
            algorithm: default_algorithm(),
            reward: RewardType::Pow,
            normal_hashing: false,
        }
    }
}

/// File representation of the pool configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    /// Coin section
    #[serde(default)]
    pub coin: Option<CoinConfig>,

    /// Pool instance id for extranonce partitioning
    #[serde(default, rename = "instanceId")]
    pub instance_id: Option<u32>,

    /// Retention bound for share-eligible jobs
    #[serde(default, rename = "maxValidJobs")]
    pub max_valid_jobs: Option<usize>,
}

/// Complete configuration for the pool job engine
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(
    name = "aion-pool-core",
    version = env!("CARGO_PKG_VERSION"),
    about = "Mining pool job and share engine",
    long_about = "Builds miner jobs from daemon block templates and validates submitted Equihash shares"
)]
pub struct Config {
    /// Configuration file path (YAML or JSON)
    #[arg(long, value_name = "FILE")]
    #[serde(skip)]
    pub config_file: Option<PathBuf>,

    /// Coin name
    #[arg(long, default_value = "aion")]
    #[serde(default = "default_coin_name")]
    pub coin_name: String,

    /// Coin ticker symbol
    #[arg(long, default_value = "AION")]
    #[serde(default = "default_coin_symbol")]
    pub coin_symbol: String,

    /// Mining algorithm
    #[arg(long, default_value = "equihash")]
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// Reward scheme of the coin
    #[arg(long, value_enum, default_value = "POW")]
    #[serde(default)]
    pub reward: RewardType,

    /// Hash the coinbase with double SHA-256 on single-hash families
    #[arg(long)]
    #[serde(default)]
    pub normal_hashing: bool,

    /// Pool instance id (random when unset)
    #[arg(long, env = "POOL_INSTANCE_ID")]
    pub instance_id: Option<u32>,

    /// Maximum number of jobs kept for share validation (0 = unbounded)
    #[arg(long, default_value = "0")]
    #[serde(default)]
    pub max_valid_jobs: usize,

    /// Log level
    #[arg(short = 'l', long, value_enum, default_value = "info")]
    #[serde(default = "default_log_level")]
    pub log_level: LogLevel,

    /// Log format (plain, json)
    #[arg(long, default_value = "plain")]
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Daemon block template (JSON) to build a job from
    #[arg(short = 't', long, value_name = "FILE")]
    #[serde(skip)]
    pub template_file: Option<PathBuf>,

    /// Print the effective configuration and exit
    #[arg(long)]
    #[serde(skip)]
    pub print_config: bool,
}

impl Config {
    /// Parse the command line, merge the config file if one is given and
    /// validate the result
    pub fn load() -> Result<Self> {
        let mut config = Self::parse();

        if let Some(config_file) = config.config_file.clone() {
            let file_config = Self::load_from_file(&config_file)?;
            config = config.merge_with_file(file_config);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file
    pub fn load_from_file(path: &Path) -> Result<FileConfig> {
        let content = std::fs::read_to_string(path)?;

        if path.extension().and_then(|s| s.to_str()) == Some("json") {
            serde_json::from_str(&content).map_err(Error::from)
        } else {
            // Default to YAML
            serde_yaml::from_str(&content).map_err(Error::from)
        }
    }

    /// Merge file values into the CLI config. File values override CLI
    /// defaults; an instance id given on the command line wins.
    pub fn merge_with_file(mut self, file_config: FileConfig) -> Self {
        if let Some(coin) = file_config.coin {
            self.coin_name = coin.name;
            self.coin_symbol = coin.symbol;
            self.algorithm = coin.algorithm;
            self.reward = coin.reward;
            self.normal_hashing = coin.normal_hashing;
        }

        if self.instance_id.is_none() {
            self.instance_id = file_config.instance_id;
        }

        if let Some(max) = file_config.max_valid_jobs {
            self.max_valid_jobs = max;
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.algorithm.trim().is_empty() {
            return Err(Error::config("Algorithm must not be empty"));
        }

        if self.coin_name.trim().is_empty() {
            return Err(Error::config("Coin name must not be empty"));
        }

        if !matches!(self.log_format.as_str(), "plain" | "json") {
            return Err(Error::config(format!(
                "Unknown log format: {}",
                self.log_format
            )));
        }

        Ok(())
    }

    /// Coin section as a standalone value
    pub fn coin(&self) -> CoinConfig {
        CoinConfig {
            name: self.coin_name.clone(),
            symbol: self.coin_symbol.clone(),
            algorithm: self.algorithm.clone(),
            reward: self.reward,
            normal_hashing: self.normal_hashing,
        }
    }

    /// Options for constructing a [`crate::job::JobManager`]
    pub fn job_manager_options(&self) -> JobManagerOptions {
        JobManagerOptions {
            coin: self.coin(),
            instance_id: self.instance_id,
            max_valid_jobs: self.max_valid_jobs,
        }
    }
}

// Default value functions for serde
fn default_coin_name() -> String { "aion".to_string() }
fn default_coin_symbol() -> String { "AION".to_string() }
fn default_algorithm() -> String { "equihash".to_string() }
fn default_log_level() -> LogLevel { LogLevel::Info }
fn default_log_format() -> String { "plain".to_string() }
