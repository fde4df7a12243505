//! Aion Pool Core - Main Application
//!
//! Loads the pool configuration and builds a job from a daemon block
//! template file, printing what miners would receive for it.

use aion_pool_core::{
    core::{AlgorithmRegistry, PowVerifier},
    job::{BlockTemplate, JobEvent, RawTemplate},
    utils::init_logging,
    Config, Error, JobManager, Result, APP_DESCRIPTION, APP_NAME, APP_VERSION,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// The binary only builds jobs; no share ever reaches a verifier.
struct NoSolutionVerifier;

impl PowVerifier for NoSolutionVerifier {
    fn verify(&self, _header: &[u8], _solution: &[u8]) -> bool {
        false
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    init_logging(config.log_level.as_str(), &config.log_format);

    if config.print_config {
        print_configuration(&config)?;
        return Ok(());
    }

    info!("Starting {} v{}", APP_NAME, APP_VERSION);

    let Some(template_file) = config.template_file.clone() else {
        println!("{} v{}", APP_NAME, APP_VERSION);
        println!("{}", APP_DESCRIPTION);
        println!();
        println!("Pass --template-file to build a job from a daemon block template.");
        return Ok(());
    };

    let registry = AlgorithmRegistry::standard(Arc::new(NoSolutionVerifier));
    let (manager, mut events) = JobManager::channel(config.job_manager_options(), &registry)?;

    let raw = load_template(&template_file)?;
    if !manager.process_template(raw)? {
        return Err(Error::invalid_state("template did not produce a job"));
    }

    while let Ok(event) = events.try_recv() {
        if let JobEvent::NewBlock(job) = event {
            debug!(job_id = %job.job_id(), "Received new block event");
            print_job(&manager, &job)?;
        }
    }

    Ok(())
}

/// Read a daemon template from a JSON file
fn load_template(path: &Path) -> Result<RawTemplate> {
    let content = std::fs::read_to_string(path)?;
    RawTemplate::from_json(&content)
}

/// Print the job as broadcast to miners, plus its header bytes with a zero
/// nTime and nonce
fn print_job(manager: &JobManager, job: &BlockTemplate) -> Result<()> {
    println!("job id:       {}", job.job_id());
    println!("height:       {}", job.height());
    println!("algorithm:    {}", manager.algorithm().name);
    println!("target:       {}", job.target());
    println!("difficulty:   {}", job.difficulty());
    println!("extranonce2:  {} bytes", manager.extra_nonce2_size());
    println!("transactions: {}", job.raw().transactions.len());
    println!();
    println!("job params:");
    println!("{}", serde_json::to_string_pretty(job.job_params())?);
    println!();
    println!("header:");
    println!("{}", hex::encode(job.serialize_header(&[0; 8], &[0; 32])));
    Ok(())
}

/// Print current configuration
fn print_configuration(config: &Config) -> Result<()> {
    let config_yaml = serde_yaml::to_string(config)?;
    println!("{}", config_yaml);
    Ok(())
}
