//! Workflow run snapshots.
//!
//! A `Run` is what the run lister returns for each sibling run. Snapshots are
//! fetched fresh on every poll tick and dropped once that tick has decided.

use serde::{Deserialize, Serialize};

use super::ids::RunId;

/// Lifecycle status of a workflow run, as reported by the Actions API.
///
/// Only `Queued` and `InProgress` runs are "in flight"; the lister never asks
/// for anything else, but the API may report other states for runs that
/// complete between pages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    /// Any other status string (`completed`, `waiting`, `requested`, ...).
    Other(String),
}

impl RunStatus {
    /// Returns the Actions API status filter string for this status.
    pub fn as_api_str(&self) -> &str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::Other(s) => s,
        }
    }

    /// Parses an Actions API status string.
    pub fn from_api_str(s: &str) -> Self {
        match s {
            "queued" => RunStatus::Queued,
            "in_progress" => RunStatus::InProgress,
            other => RunStatus::Other(other.to_string()),
        }
    }
}

/// One execution of a workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    /// Monotonically increasing run identifier.
    pub id: RunId,
    /// Browser URL for the run, used in notices and abort messages.
    pub html_url: String,
    pub status: RunStatus,
    /// Branch the run was triggered for. Filtering by branch happens remotely;
    /// the wait loop never re-checks this.
    pub head_branch: String,
}

impl Run {
    pub fn new(
        id: impl Into<RunId>,
        html_url: impl Into<String>,
        status: RunStatus,
        head_branch: impl Into<String>,
    ) -> Self {
        Run {
            id: id.into(),
            html_url: html_url.into(),
            status,
            head_branch: head_branch.into(),
        }
    }
}
