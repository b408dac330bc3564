//! Core domain types for the run serializer.
//!
//! Identifiers, run snapshots, and the terminal results of a wait.

pub mod ids;
pub mod outcome;
pub mod run;

// Re-export commonly used types at the module level
pub use ids::{RepoId, RunId, WorkflowId};
pub use outcome::{AbortReason, WaitOutcome};
pub use run::{Run, RunStatus};
