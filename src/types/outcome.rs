//! Terminal results of the wait loop.
//!
//! A wait ends either with a `WaitOutcome` (the run may proceed) or with an
//! `AbortReason` (the run must fail).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ids::RunId;

/// How a wait finished successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WaitOutcome {
    /// The continue-after ceiling was reached while older runs were still in flight.
    ForceContinued { elapsed_secs: u64 },

    /// No older run is in flight, so nothing is reported beyond the marker.
    Clear,
}

impl WaitOutcome {
    /// The value written to the `force_continued` output for this outcome.
    pub fn marker(&self) -> &'static str {
        match self {
            WaitOutcome::ForceContinued { .. } => "1",
            WaitOutcome::Clear => "",
        }
    }

    /// Seconds waited, reported only on the force-continue path.
    pub fn elapsed_secs(&self) -> Option<u64> {
        match self {
            WaitOutcome::ForceContinued { elapsed_secs } => Some(*elapsed_secs),
            WaitOutcome::Clear => None,
        }
    }
}

/// Why a wait was aborted.
///
/// Neither reason is retried: both end the invocation with a failure.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum AbortReason {
    /// The abort-after ceiling was reached before the older runs finished.
    #[error("Aborted after waiting {elapsed_secs} seconds")]
    Timeout { elapsed_secs: u64 },

    /// A run newer than this one is already queued or running.
    #[error("Aborted because newer run {url} was detected.")]
    NewerRun { run: RunId, url: String },
}
