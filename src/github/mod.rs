//! GitHub Actions API client.
//!
//! This module answers the run lister and workflow resolver queries via the
//! octocrab library.
//!
//! Key features:
//! - Exponential backoff retry for transient failures
//! - Distinguishes transient vs permanent errors
//! - Paginated, de-duplicated in-flight run listings

mod client;
mod error;
mod retry;
mod runs;

pub use client::GitHubClient;
pub use error::{GitHubApiError, GitHubErrorKind};
pub use retry::{RetryConfig, retry_with_backoff};
