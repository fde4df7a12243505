//! Notifications emitted by the job manager

use super::share::AcceptedShare;
use super::template::BlockTemplate;
use std::net::IpAddr;
use std::sync::Arc;

/// Event delivered to the pool front end
#[derive(Debug, Clone)]
pub enum JobEvent {
    /// A template for a new block height became the current job
    NewBlock(Arc<BlockTemplate>),
    /// The current job was replaced at the same height
    UpdatedBlock {
        job: Arc<BlockTemplate>,
        clean_jobs: bool,
    },
    /// A share was processed
    Share(ShareEvent),
}

/// Outcome of a single share submission
#[derive(Debug, Clone, PartialEq)]
pub struct ShareEvent {
    pub job_id: String,
    pub ip: IpAddr,
    pub port: u16,
    pub worker: String,
    pub difficulty: f64,
    pub outcome: ShareOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShareOutcome {
    Rejected { code: u32, message: String },
    Accepted(Box<AcceptedShare>),
}

impl ShareEvent {
    pub fn is_accepted(&self) -> bool {
        matches!(self.outcome, ShareOutcome::Accepted(_))
    }

    /// Wire error pair of a rejected share
    pub fn rejection(&self) -> Option<(u32, &str)> {
        match &self.outcome {
            ShareOutcome::Rejected { code, message } => Some((*code, message.as_str())),
            ShareOutcome::Accepted(_) => None,
        }
    }
}
