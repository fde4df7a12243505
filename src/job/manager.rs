//! Job lifecycle and share validation
//!
//! The [`JobManager`] turns daemon templates into jobs and runs every
//! submitted share through an ordered series of gates. The first gate that
//! fails decides the rejection code:
//!
//! 1. job lookup (21)
//! 2. nTime, nonce and solution sizes (20)
//! 3. hex encoding, extraNonce2 first (20)
//! 4. duplicate fingerprint (22)
//! 5. proof-of-work verification (20)
//! 6. network target (20)
//!
//! A share that passes them all is a block candidate.

use super::events::{JobEvent, ShareEvent, ShareOutcome};
use super::share::{AcceptedShare, BlockCandidate, ShareField, ShareRejection, ShareSubmission};
use super::template::{BlockTemplate, RawTemplate};
use crate::config::{CoinConfig, RewardType};
use crate::core::constants::{
    NONCE_HEX_LEN, NONCE_SIZE, NTIME_HEX_LEN, NTIME_SIZE, SOLUTION_HEX_LEN, SOLUTION_PREFIX_SIZE,
    SOLUTION_SIZE,
};
use crate::core::{
    hash_difficulty, AlgorithmRegistry, ExtraNonceCounter, JobCounter, ResolvedAlgorithm,
};
use crate::error::Result;
use crate::utils::{is_hex_string, reverse_bytes};
use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, trace, warn};

/// Placeholder the daemon leaves in the generation transaction for the two
/// extranonces
pub const EXTRA_NONCE_PLACEHOLDER: [u8; 8] = [0xf0, 0x00, 0x00, 0x0f, 0xf1, 0x11, 0x11, 0x1f];

/// Options for constructing a [`JobManager`]
#[derive(Debug, Clone, Default)]
pub struct JobManagerOptions {
    /// Coin the jobs are built for
    pub coin: CoinConfig,
    /// Pool instance id; random when unset
    pub instance_id: Option<u32>,
    /// Maximum number of jobs kept for share validation, 0 for no limit
    pub max_valid_jobs: usize,
}

#[derive(Debug, Default)]
struct JobState {
    current_job: Option<Arc<BlockTemplate>>,
    valid_jobs: HashMap<String, Arc<BlockTemplate>>,
    job_counter: JobCounter,
    /// Job ids in insertion order, for eviction. Empty when retention is
    /// unbounded.
    retention: VecDeque<String>,
}

/// Builds jobs from block templates and validates shares against them
#[derive(Debug)]
pub struct JobManager {
    algorithm: ResolvedAlgorithm,
    reward: RewardType,
    extra_nonce_counter: ExtraNonceCounter,
    max_valid_jobs: usize,
    state: RwLock<JobState>,
    events: UnboundedSender<JobEvent>,
}

impl JobManager {
    /// Create a job manager that reports to `events`.
    ///
    /// Fails if the coin's algorithm is not in `registry` or no random
    /// instance id can be drawn.
    pub fn new(
        options: JobManagerOptions,
        registry: &AlgorithmRegistry,
        events: UnboundedSender<JobEvent>,
    ) -> Result<Self> {
        let algorithm = registry.resolve(&options.coin)?;
        let extra_nonce_counter = ExtraNonceCounter::new(options.instance_id)?;

        info!(
            coin = %options.coin.name,
            algorithm = %algorithm.name,
            reward = %options.coin.reward,
            instance_id = extra_nonce_counter.instance_id(),
            max_valid_jobs = options.max_valid_jobs,
            "Job manager ready"
        );

        Ok(Self {
            algorithm,
            reward: options.coin.reward,
            extra_nonce_counter,
            max_valid_jobs: options.max_valid_jobs,
            state: RwLock::new(JobState::default()),
            events,
        })
    }

    /// Create a job manager together with the receiving end of its event
    /// channel
    pub fn channel(
        options: JobManagerOptions,
        registry: &AlgorithmRegistry,
    ) -> Result<(Self, UnboundedReceiver<JobEvent>)> {
        let (tx, rx) = mpsc::unbounded_channel();
        Ok((Self::new(options, registry, tx)?, rx))
    }

    /// Counter handing out extraNonce1 values to new subscribers
    pub fn extra_nonce_counter(&self) -> &ExtraNonceCounter {
        &self.extra_nonce_counter
    }

    pub fn extra_nonce_placeholder(&self) -> &'static [u8] {
        &EXTRA_NONCE_PLACEHOLDER
    }

    /// Width in bytes of the miner-chosen extraNonce2
    pub fn extra_nonce2_size(&self) -> usize {
        EXTRA_NONCE_PLACEHOLDER.len() - self.extra_nonce_counter.size()
    }

    pub fn algorithm(&self) -> &ResolvedAlgorithm {
        &self.algorithm
    }

    pub fn current_job(&self) -> Option<Arc<BlockTemplate>> {
        self.state.read().current_job.clone()
    }

    /// Look up a job that still accepts shares
    pub fn job(&self, job_id: &str) -> Option<Arc<BlockTemplate>> {
        self.state.read().valid_jobs.get(job_id).cloned()
    }

    pub fn valid_job_count(&self) -> usize {
        self.state.read().valid_jobs.len()
    }

    /// Accept `raw` as a new job if it builds on a different block than the
    /// current job. Returns `true` when a job was created.
    ///
    /// A template for a new block at a lower height than the current job is
    /// treated as stale and ignored. Nothing changes when the template is
    /// rejected or fails validation.
    pub fn process_template(&self, raw: RawTemplate) -> Result<bool> {
        let mut state = self.state.write();

        if let Some(current) = &state.current_job {
            if current.previous_block_hash() == raw.previous_block_hash {
                trace!(height = raw.height, "Template builds on current block");
                return Ok(false);
            }
            if raw.height < current.height() {
                warn!(
                    height = raw.height,
                    current_height = current.height(),
                    previous_block_hash = %raw.previous_block_hash,
                    "Ignoring stale block template"
                );
                return Ok(false);
            }
        }

        let job = self.install_job(&mut state, raw)?;

        info!(
            job_id = %job.job_id(),
            height = job.height(),
            difficulty = job.difficulty(),
            "New block"
        );
        // Sent under the write lock so events stay in job id order
        self.emit(JobEvent::NewBlock(job));
        drop(state);
        Ok(true)
    }

    /// Replace the current job with one built from `raw`, without any
    /// novelty check
    pub fn update_current_job(&self, raw: RawTemplate) -> Result<Arc<BlockTemplate>> {
        let mut state = self.state.write();
        let job = self.install_job(&mut state, raw)?;

        info!(job_id = %job.job_id(), height = job.height(), "Updated block");
        self.emit(JobEvent::UpdatedBlock {
            job: job.clone(),
            clean_jobs: true,
        });
        drop(state);
        Ok(job)
    }

    fn install_job(&self, state: &mut JobState, raw: RawTemplate) -> Result<Arc<BlockTemplate>> {
        let mut counter = state.job_counter.clone();
        let job_id = counter.next();
        let job = Arc::new(BlockTemplate::new(
            job_id.clone(),
            raw,
            &EXTRA_NONCE_PLACEHOLDER,
            self.reward,
        )?);

        state.job_counter = counter;
        state.current_job = Some(job.clone());
        state.valid_jobs.insert(job_id.clone(), job.clone());
        if self.max_valid_jobs > 0 {
            state.retention.push_back(job_id);
            self.evict(state);
        }

        Ok(job)
    }

    fn evict(&self, state: &mut JobState) {
        while state.retention.len() > self.max_valid_jobs {
            let Some(evicted) = state.retention.pop_front() else {
                break;
            };
            // A wrapped job counter can reuse an id still queued further back
            if state.retention.contains(&evicted) {
                continue;
            }
            state.valid_jobs.remove(&evicted);
            warn!(job_id = %evicted, "Evicted job from share validation");
        }
    }

    /// Validate a submitted share.
    ///
    /// Every outcome is also reported as a [`JobEvent::Share`]. On success
    /// the caller receives the block hash and the serialized block for
    /// submission to the daemon.
    pub fn process_share(
        &self,
        share: ShareSubmission,
    ) -> std::result::Result<BlockCandidate, ShareRejection> {
        let result = self.check_share(&share);

        let outcome = match &result {
            Ok((candidate, accepted)) => {
                info!(
                    job_id = %share.job_id,
                    worker = %share.worker,
                    height = accepted.height,
                    block_hash = %candidate.block_hash,
                    "Block candidate found"
                );
                ShareOutcome::Accepted(Box::new(accepted.clone()))
            }
            Err(rejection) => {
                debug!(
                    job_id = %share.job_id,
                    worker = %share.worker,
                    ip = %share.ip,
                    code = rejection.code(),
                    "Share rejected: {}",
                    rejection
                );
                let (code, message) = rejection.to_wire();
                ShareOutcome::Rejected { code, message }
            }
        };

        self.emit(JobEvent::Share(ShareEvent {
            job_id: share.job_id.clone(),
            ip: share.ip,
            port: share.port,
            worker: share.worker.clone(),
            difficulty: share.difficulty,
            outcome,
        }));

        result.map(|(candidate, _)| candidate)
    }

    fn check_share(
        &self,
        share: &ShareSubmission,
    ) -> std::result::Result<(BlockCandidate, AcceptedShare), ShareRejection> {
        let job = self.job(&share.job_id).ok_or(ShareRejection::JobNotFound)?;

        if share.n_time.len() != NTIME_HEX_LEN {
            return Err(ShareRejection::IncorrectSize(ShareField::NTime));
        }
        if share.nonce.len() != NONCE_HEX_LEN {
            return Err(ShareRejection::IncorrectSize(ShareField::Nonce));
        }
        if share.solution.len() != SOLUTION_HEX_LEN {
            return Err(ShareRejection::IncorrectSize(ShareField::Solution));
        }

        if !is_hex_string(&share.extra_nonce2) {
            return Err(ShareRejection::InvalidHex(ShareField::ExtraNonce2));
        }
        let extra_nonce1 = decode_hex(ShareField::ExtraNonce1, &share.extra_nonce1)?;
        let extra_nonce2 = decode_hex(ShareField::ExtraNonce2, &share.extra_nonce2)?;
        let n_time: [u8; NTIME_SIZE] = decode_fixed(ShareField::NTime, &share.n_time)?;
        let nonce: [u8; NONCE_SIZE] = decode_fixed(ShareField::Nonce, &share.nonce)?;
        let solution = decode_hex(ShareField::Solution, &share.solution)?;
        let payload: [u8; SOLUTION_SIZE] = solution[SOLUTION_PREFIX_SIZE..]
            .try_into()
            .map_err(|_| ShareRejection::IncorrectSize(ShareField::Solution))?;

        if !job.register_submit(
            &share.extra_nonce1.to_lowercase(),
            &share.extra_nonce2.to_lowercase(),
            &share.n_time,
            &share.nonce,
        ) {
            return Err(ShareRejection::DuplicateShare);
        }

        let header = job.serialize_header(&n_time, &nonce);
        let mut header_solution = Vec::with_capacity(header.len() + payload.len());
        header_solution.extend_from_slice(&header);
        header_solution.extend_from_slice(&payload);

        let header_hash = self.algorithm.digest(&header_solution);
        trace!(
            job_id = %share.job_id,
            display_hash = %hex::encode(self.algorithm.block_hasher.hash(&header_solution)),
            "Share header hashed"
        );

        let multiplier = self.algorithm.multiplier();
        let share_diff = hash_difficulty(&header_hash, multiplier);
        let block_diff = job.difficulty() * multiplier;
        trace!(
            job_id = %share.job_id,
            share_diff,
            block_diff,
            difficulty = share.difficulty,
            previous_difficulty = ?share.previous_difficulty,
            "Share difficulty"
        );

        if !self.algorithm.verify(&header, &payload) {
            return Err(ShareRejection::InvalidSolution);
        }

        let target_buffer = job.serialize_header_target(&nonce, &payload, &n_time);
        let target_hash = self.algorithm.digest(&target_buffer);
        if !job.target().is_met_by(&target_hash) {
            return Err(ShareRejection::HashAboveTarget);
        }

        let coinbase = job.serialize_coinbase(&extra_nonce1, &extra_nonce2);
        let coinbase_hash = self.algorithm.coinbase_hasher.hash(&coinbase);
        let mut full_header = header;
        full_header.extend_from_slice(&solution);
        let block_hex = hex::encode(job.serialize_block(&full_header, &coinbase));

        let candidate = BlockCandidate {
            block_hash: hex::encode(reverse_bytes(&header_hash)),
            block_hex: block_hex.clone(),
        };
        let accepted = AcceptedShare {
            height: job.height(),
            block_reward: job.raw().reward.clone(),
            share_diff: format!("{:.8}", share_diff),
            block_diff,
            block_diff_actual: job.difficulty(),
            block_hash: hex::encode(target_hash),
            block_hex,
            coinbase_hash: hex::encode(coinbase_hash),
            n_time: share.n_time.clone(),
            nonce: share.nonce.clone(),
            solution: hex::encode(payload),
            header_hash: job.header_hash().map(str::to_string),
        };

        Ok((candidate, accepted))
    }

    fn emit(&self, event: JobEvent) {
        if self.events.send(event).is_err() {
            trace!("Job event receiver closed");
        }
    }
}

fn decode_hex(field: ShareField, value: &str) -> std::result::Result<Vec<u8>, ShareRejection> {
    hex::decode(value).map_err(|_| ShareRejection::InvalidHex(field))
}

fn decode_fixed<const N: usize>(
    field: ShareField,
    value: &str,
) -> std::result::Result<[u8; N], ShareRejection> {
    decode_hex(field, value)?
        .try_into()
        .map_err(|_| ShareRejection::IncorrectSize(field))
}
