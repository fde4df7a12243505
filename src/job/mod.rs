//! Jobs, shares and the job manager

pub mod events;
pub mod manager;
pub mod share;
pub mod template;

pub use events::{JobEvent, ShareEvent, ShareOutcome};
pub use manager::{JobManager, JobManagerOptions, EXTRA_NONCE_PLACEHOLDER};
pub use share::{AcceptedShare, BlockCandidate, ShareField, ShareRejection, ShareSubmission};
pub use template::{
    BlockTemplate, GenerationTransaction, HeaderFields, HeaderLayout, HeaderValue, RawTemplate,
    TemplateTransaction,
};
