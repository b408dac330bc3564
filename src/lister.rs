//! Query seams between the wait loop and the Actions API.
//!
//! The wait loop only needs two read-only questions answered: "which workflow
//! is this?" (once, at startup) and "which runs of it are in flight?" (on every
//! poll tick). Both are traits so tests can answer them from memory.
//!
//! # Example (in-memory lister for testing)
//!
//! ```ignore
//! struct FixedLister(Vec<Run>);
//!
//! impl RunLister for FixedLister {
//!     type Error = std::convert::Infallible;
//!
//!     fn list_runs(
//!         &self,
//!         _repo: &RepoId,
//!         _branch: Option<&str>,
//!         _workflow: WorkflowId,
//!     ) -> impl Future<Output = Result<Vec<Run>, Self::Error>> + Send {
//!         let runs = self.0.clone();
//!         async move { Ok(runs) }
//!     }
//! }
//! ```

use std::future::Future;

use crate::types::{RepoId, Run, WorkflowId};

/// Lists the in-flight runs of a workflow.
pub trait RunLister {
    /// The error type returned by this lister.
    type Error;

    /// Returns every queued or in-progress run of `workflow` in `repo`.
    ///
    /// When `branch` is given only runs for that branch are returned. The
    /// result is a snapshot in no particular order; callers sort it themselves.
    fn list_runs(
        &self,
        repo: &RepoId,
        branch: Option<&str>,
        workflow: WorkflowId,
    ) -> impl Future<Output = Result<Vec<Run>, Self::Error>> + Send;
}

/// Resolves a workflow name to its numeric ID.
pub trait WorkflowResolver {
    /// The error type returned by this resolver.
    type Error;

    /// Returns the ID of the first workflow in `repo` named `name`, if any.
    fn find_workflow(
        &self,
        repo: &RepoId,
        name: &str,
    ) -> impl Future<Output = Result<Option<WorkflowId>, Self::Error>> + Send;
}

impl<T: RunLister + ?Sized> RunLister for &T {
    type Error = T::Error;

    fn list_runs(
        &self,
        repo: &RepoId,
        branch: Option<&str>,
        workflow: WorkflowId,
    ) -> impl Future<Output = Result<Vec<Run>, Self::Error>> + Send {
        (**self).list_runs(repo, branch, workflow)
    }
}
