//! The wait loop.
//!
//! One `Waiter` drives one invocation: it checks the elapsed-time ceilings,
//! takes a fresh snapshot of in-flight runs, and either returns, aborts, or
//! sleeps one poll interval and goes around again.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::WaitContext;
use crate::lister::RunLister;
use crate::types::{AbortReason, WaitOutcome};

use super::decision::{Ceiling, TickDecision, check_ceilings, evaluate};
use super::report::{Reporter, Sleeper};

/// Errors that end a wait unsuccessfully.
#[derive(Debug, Error)]
pub enum WaitError<E> {
    /// The wait policy decided to fail the run.
    #[error("{0}")]
    Aborted(AbortReason),

    /// Listing sibling runs failed. Passed through untouched.
    #[error("failed to list workflow runs: {0}")]
    Query(#[source] E),
}

impl<E> WaitError<E> {
    /// Returns the abort reason, if the wait was aborted by policy.
    pub fn abort_reason(&self) -> Option<&AbortReason> {
        match self {
            WaitError::Aborted(reason) => Some(reason),
            WaitError::Query(_) => None,
        }
    }
}

/// Polls sibling runs until the waiting run may proceed.
pub struct Waiter<L, R, S> {
    context: WaitContext,
    lister: L,
    reporter: R,
    sleeper: S,
}

impl<L, R, S> Waiter<L, R, S>
where
    L: RunLister,
    R: Reporter,
    S: Sleeper,
{
    pub fn new(context: WaitContext, lister: L, reporter: R, sleeper: S) -> Self {
        Self {
            context,
            lister,
            reporter,
            sleeper,
        }
    }

    /// Waits from a standing start.
    pub async fn wait(&self) -> Result<WaitOutcome, WaitError<L::Error>> {
        self.wait_from(0).await
    }

    /// Waits as if `elapsed_secs` had already been spent waiting.
    ///
    /// Each unsuccessful tick adds exactly one poll interval to the elapsed
    /// count before the next tick runs.
    pub async fn wait_from(&self, elapsed_secs: u64) -> Result<WaitOutcome, WaitError<L::Error>> {
        let ctx = &self.context;
        let mut elapsed_secs = elapsed_secs;

        loop {
            match check_ceilings(ctx, elapsed_secs) {
                Some(Ceiling::ForceContinue) => {
                    let outcome = WaitOutcome::ForceContinued { elapsed_secs };
                    self.reporter.notify("🤙Exceeded wait seconds. Continuing...");
                    self.reporter.set_marker(outcome.marker());
                    info!(run = %ctx.run_id, elapsed_secs, "Force-continuing after ceiling");
                    return Ok(outcome);
                }
                Some(Ceiling::ForceAbort) => {
                    self.reporter.notify("🛑Exceeded wait seconds. Aborting...");
                    self.reporter.set_marker(WaitOutcome::Clear.marker());
                    warn!(run = %ctx.run_id, elapsed_secs, "Aborting after ceiling");
                    return Err(WaitError::Aborted(AbortReason::Timeout { elapsed_secs }));
                }
                None => {}
            }

            let runs = self
                .lister
                .list_runs(&ctx.repo, ctx.branch_filter(), ctx.workflow)
                .await
                .map_err(WaitError::Query)?;

            match evaluate(&runs, ctx.run_id, ctx.abort_on_newer_run) {
                TickDecision::Proceed => {
                    let outcome = WaitOutcome::Clear;
                    self.reporter.set_marker(outcome.marker());
                    info!(run = %ctx.run_id, elapsed_secs, "No earlier runs in flight");
                    return Ok(outcome);
                }
                TickDecision::NewerRun(newer) => {
                    self.reporter
                        .notify(&format!("🛑Newer run {} detected. Aborting...", newer.html_url));
                    warn!(run = %ctx.run_id, newer = %newer.id, "Newer run detected");
                    return Err(WaitError::Aborted(AbortReason::NewerRun {
                        run: newer.id,
                        url: newer.html_url.clone(),
                    }));
                }
                TickDecision::Await(target) => {
                    self.reporter
                        .notify(&format!("✋Awaiting run {} ...", target.html_url));
                    debug!(
                        run = %ctx.run_id,
                        target = %target.id,
                        elapsed_secs,
                        "Waiting on earlier run"
                    );
                }
            }

            self.sleeper.sleep(ctx.poll_interval()).await;
            elapsed_secs = elapsed_secs.saturating_add(ctx.poll_interval_seconds);
        }
    }
}
