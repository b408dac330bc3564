//! Octocrab client wrapper.
//!
//! `GitHubClient` wraps an `Octocrab` instance together with the retry
//! settings used for every Actions API query made through it.

use octocrab::Octocrab;

use super::retry::RetryConfig;

/// A GitHub API client for Actions queries.
#[derive(Clone)]
pub struct GitHubClient {
    /// The underlying octocrab client.
    client: Octocrab,

    /// Backoff schedule for transient failures.
    retry_config: RetryConfig,
}

impl GitHubClient {
    /// Creates a new client with the default retry behaviour.
    pub fn new(client: Octocrab) -> Self {
        Self {
            client,
            retry_config: RetryConfig::DEFAULT,
        }
    }

    /// Creates a client from a token and an API base URL.
    ///
    /// The base URL is `https://api.github.com` on github.com and
    /// `https://<host>/api/v3` on GitHub Enterprise Server.
    pub fn from_token(token: impl Into<String>, api_url: &str) -> Result<Self, octocrab::Error> {
        let client = Octocrab::builder()
            .personal_token(token.into())
            .base_uri(api_url)?
            .build()?;
        Ok(Self::new(client))
    }

    /// Returns a reference to the underlying octocrab client.
    pub fn inner(&self) -> &Octocrab {
        &self.client
    }

    pub fn retry_config(&self) -> RetryConfig {
        self.retry_config
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("retry_config", &self.retry_config)
            .finish_non_exhaustive()
    }
}
