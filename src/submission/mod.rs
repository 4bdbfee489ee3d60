pub mod builder;
pub mod client;
pub mod pacing;
pub mod runner;

pub use builder::{build, Answer, AnswerSelection, Payload};
pub use client::{HttpSubmitter, SubmitResponse, Submitter};
pub use pacing::{
    DelayRange, RunSettings, DEFAULT_COUNT, DEFAULT_DELAY_MAX_SECS, DEFAULT_DELAY_MIN_SECS,
};
pub use runner::{Outcome, RunSummary, SubmissionResult};
