//! Shared test utilities: fixtures, in-memory seams, and proptest generators.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use proptest::prelude::*;
use thiserror::Error;

use crate::config::WaitContext;
use crate::lister::RunLister;
use crate::types::{RepoId, Run, RunId, RunStatus, WorkflowId};
use crate::wait::{Reporter, Sleeper};

pub fn run_url(id: u64) -> String {
    format!("https://github.com/octo-org/deploy/actions/runs/{}", id)
}

/// An in-progress run on `main`.
pub fn run(id: u64) -> Run {
    Run::new(id, run_url(id), RunStatus::InProgress, "main")
}

/// A snapshot containing a run for each ID.
pub fn runs(ids: &[u64]) -> Vec<Run> {
    ids.iter().copied().map(run).collect()
}

/// A context for run `self_id` with a 10 second interval and no ceilings.
pub fn context(self_id: u64) -> WaitContext {
    WaitContext {
        repo: RepoId::new("octo-org", "deploy"),
        workflow: WorkflowId(4242),
        run_id: RunId(self_id),
        branch: "main".to_string(),
        same_branch_only: true,
        abort_on_newer_run: false,
        continue_after_seconds: None,
        abort_after_seconds: None,
        poll_interval_seconds: 10,
    }
}

/// A snapshot of distinct run IDs plus a self ID that may or may not be in it.
pub fn arb_snapshot() -> impl Strategy<Value = (Vec<Run>, RunId)> {
    (
        prop::collection::btree_set(1u64..60, 0..12),
        1u64..60,
        any::<bool>(),
    )
        .prop_map(|(ids, self_id, include_self)| {
            let mut snapshot: Vec<Run> = ids
                .into_iter()
                .filter(|id| *id != self_id)
                .map(run)
                .collect();
            if include_self {
                snapshot.push(run(self_id));
            }
            (snapshot, RunId(self_id))
        })
}

/// Error returned by `ScriptedLister` once its script runs out, or on demand.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("scripted lister: {0}")]
pub struct ListerError(pub String);

/// A query the scripted lister received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedQuery {
    pub repo: RepoId,
    pub branch: Option<String>,
    pub workflow: WorkflowId,
}

/// A run lister that replays a fixed sequence of responses, one per call.
///
/// Calls beyond the end of the script fail with "script exhausted", which is
/// how tests bound an otherwise endless wait.
#[derive(Default)]
pub struct ScriptedLister {
    responses: Mutex<VecDeque<Result<Vec<Run>, ListerError>>>,
    queries: Mutex<Vec<RecordedQuery>>,
}

impl ScriptedLister {
    pub fn new(responses: impl IntoIterator<Item = Result<Vec<Run>, ListerError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// A lister that returns each snapshot once, in order.
    pub fn snapshots(snapshots: impl IntoIterator<Item = Vec<Run>>) -> Self {
        Self::new(snapshots.into_iter().map(Ok))
    }

    /// A lister that returns the same snapshot `times` times.
    pub fn repeating(snapshot: Vec<Run>, times: usize) -> Self {
        Self::snapshots(std::iter::repeat_n(snapshot, times))
    }

    pub fn queries(&self) -> Vec<RecordedQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

impl RunLister for ScriptedLister {
    type Error = ListerError;

    fn list_runs(
        &self,
        repo: &RepoId,
        branch: Option<&str>,
        workflow: WorkflowId,
    ) -> impl Future<Output = Result<Vec<Run>, Self::Error>> + Send {
        self.queries.lock().unwrap().push(RecordedQuery {
            repo: repo.clone(),
            branch: branch.map(str::to_string),
            workflow,
        });
        let response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ListerError("script exhausted".to_string())));
        async move { response }
    }
}

/// A reporter that records everything it is told.
#[derive(Default)]
pub struct RecordingReporter {
    markers: Mutex<Vec<String>>,
    notices: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn markers(&self) -> Vec<String> {
        self.markers.lock().unwrap().clone()
    }

    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().unwrap().clone()
    }
}

impl Reporter for RecordingReporter {
    fn set_marker(&self, value: &str) {
        self.markers.lock().unwrap().push(value.to_string());
    }

    fn notify(&self, message: &str) {
        self.notices.lock().unwrap().push(message.to_string());
    }
}

/// A sleeper that returns immediately and records each requested duration.
#[derive(Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        self.sleeps.lock().unwrap().push(duration);
        std::future::ready(())
    }
}
