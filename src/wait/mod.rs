//! Waiting for earlier runs of the same workflow.
//!
//! A run that starts while older runs of its workflow are still queued or in
//! progress waits here until they are gone. The loop is split into:
//!
//! - `decision`: pure functions from (context, elapsed, snapshot) to a verdict
//! - `waiter`: the loop that queries, applies verdicts, and sleeps
//! - `report`: the `Reporter` and `Sleeper` seams and their runner-backed
//!   implementations
//!
//! # Ordering guarantee
//!
//! Only best-effort: a higher run ID waits on lower run IDs it can see. Two
//! runs that start at nearly the same instant may see different snapshots.

pub mod decision;
pub mod report;
pub mod waiter;


pub use decision::{Ceiling, SelfPosition, TickDecision};
pub use report::{
    ActionsReporter, FORCE_CONTINUED_OUTPUT, Reporter, Sleeper, TokioSleeper, escape_command_data,
};
pub use waiter::{WaitError, Waiter};
