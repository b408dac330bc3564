//! Pure per-tick decisions.
//!
//! Everything here is a function of the wait context, the elapsed time, and
//! one run snapshot. No I/O happens in this module; the loop in `waiter`
//! performs the side effects each decision calls for.
//!
//! # Ordering
//!
//! Runs are ordered by descending `RunId`. IDs are the only notion of "older"
//! and "newer" used anywhere: start times are never consulted.

use crate::config::WaitContext;
use crate::types::{Run, RunId};

/// A ceiling that ends the wait before any query is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ceiling {
    /// `continue_after_seconds` reached: succeed.
    ForceContinue,
    /// `abort_after_seconds` reached: fail.
    ForceAbort,
}

/// Checks the elapsed-time ceilings.
///
/// Force-continue wins when both ceilings are reached at once.
pub fn check_ceilings(ctx: &WaitContext, elapsed_secs: u64) -> Option<Ceiling> {
    if ctx
        .continue_after_seconds
        .is_some_and(|ceiling| elapsed_secs >= ceiling)
    {
        return Some(Ceiling::ForceContinue);
    }
    if ctx
        .abort_after_seconds
        .is_some_and(|ceiling| elapsed_secs >= ceiling)
    {
        return Some(Ceiling::ForceAbort);
    }
    None
}

/// Where the waiting run sits in a snapshot ordered by descending ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelfPosition {
    /// Index of the waiting run; every run before it is newer.
    Found(usize),
    /// The snapshot does not contain the waiting run (e.g. the listing raced
    /// with the run's own status change). The newer-run check is skipped.
    NotFound,
}

/// What one poll tick decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickDecision<'a> {
    /// No older run is in flight.
    Proceed,
    /// A newer run is in flight and the context asks to abort on it.
    NewerRun(&'a Run),
    /// The closest older run is still in flight; wait on it.
    Await(&'a Run),
}

/// Sorts a snapshot by descending ID and drops duplicate IDs.
pub fn order_descending(runs: &[Run]) -> Vec<&Run> {
    let mut ordered: Vec<&Run> = runs.iter().collect();
    ordered.sort_by(|a, b| b.id.cmp(&a.id));
    ordered.dedup_by_key(|run| run.id);
    ordered
}

/// The runs older than `self_id`, newest first.
pub fn previous_runs<'a>(ordered: &[&'a Run], self_id: RunId) -> Vec<&'a Run> {
    ordered
        .iter()
        .copied()
        .filter(|run| run.id < self_id)
        .collect()
}

/// Locates `self_id` in a descending snapshot.
pub fn self_position(ordered: &[&Run], self_id: RunId) -> SelfPosition {
    match ordered.iter().position(|run| run.id == self_id) {
        Some(index) => SelfPosition::Found(index),
        None => SelfPosition::NotFound,
    }
}

/// Decides what to do with one snapshot.
///
/// The checks run in a fixed order: an empty set of previous runs proceeds
/// even when newer runs exist, and the newer-run abort is only considered
/// while there is still something to wait on.
pub fn evaluate(runs: &[Run], self_id: RunId, abort_on_newer_run: bool) -> TickDecision<'_> {
    let ordered = order_descending(runs);
    let previous = previous_runs(&ordered, self_id);

    let Some(&target) = previous.first() else {
        return TickDecision::Proceed;
    };

    if abort_on_newer_run {
        if let SelfPosition::Found(index) = self_position(&ordered, self_id) {
            if index > 0 {
                return TickDecision::NewerRun(ordered[index - 1]);
            }
        }
    }

    TickDecision::Await(target)
}
