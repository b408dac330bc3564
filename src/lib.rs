//! Turnstile - serializes GitHub Actions workflow runs per branch.
//!
//! A run started while older runs of the same workflow are still queued or in
//! progress polls the Actions API and waits until they are gone, optionally
//! giving up (or pushing on) after a configured time.

pub mod config;
pub mod github;
pub mod lister;
pub mod types;
pub mod wait;

#[cfg(test)]
mod test_utils;
