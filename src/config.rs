//! Action inputs loaded from the GitHub Actions environment.
//!
//! The runner exposes repository and run metadata as `GITHUB_*` variables and
//! the step's `with:` inputs as `INPUT_<NAME>` variables (name upper-cased,
//! dashes kept). `WaitInput::from_env` reads both; `WaitInput::from_lookup`
//! takes any lookup function so parsing can be tested without touching the
//! process environment.
//!
//! # Defaults
//!
//! - **Poll interval**: 60 seconds
//! - **Same branch only**: true
//! - **Abort on newer run**: false
//! - **Ceilings**: none (`0` also means none)
//!
//! Empty values are treated as unset, because the runner exports every
//! declared input even when the workflow leaves it blank.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::types::{RepoId, RunId, WorkflowId};

/// Default interval between polls (60 seconds).
const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

/// Default public API endpoint.
const DEFAULT_API_URL: &str = "https://api.github.com";

/// Errors from reading the action environment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is absent or empty.
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    /// A variable is present but could not be parsed.
    #[error("invalid value {value:?} for {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Everything the action reads from its environment.
///
/// Constructed once per invocation and read-only afterwards.
#[derive(Clone)]
pub struct WaitInput {
    /// Repository whose runs are inspected.
    pub repo: RepoId,

    /// Name of the running workflow (`GITHUB_WORKFLOW`), resolved to an ID later.
    pub workflow_name: String,

    /// The run executing this step.
    pub run_id: RunId,

    /// Branch of the running workflow.
    pub branch: String,

    /// Only consider runs on `branch`.
    pub same_branch_only: bool,

    /// Fail when a newer run of the same workflow is queued or in progress.
    ///
    /// Only checked while an older run is still being awaited: a run with
    /// nothing older in flight proceeds regardless of newer ones.
    pub abort_on_newer_run: bool,

    /// Stop waiting and succeed after this many seconds. Never `Some(0)`.
    pub continue_after_seconds: Option<u64>,

    /// Stop waiting and fail after this many seconds. Never `Some(0)`.
    pub abort_after_seconds: Option<u64>,

    /// Seconds between polls. Always greater than zero.
    pub poll_interval_seconds: u64,

    /// Token used for API calls.
    pub token: String,

    /// REST API base URL (differs on GitHub Enterprise Server).
    pub api_url: String,

    /// File the runner reads step outputs from, if the runner provides one.
    pub output_path: Option<PathBuf>,
}

impl WaitInput {
    /// Reads the input from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the input through `lookup`, which returns a variable's value if set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values are indistinguishable from unset ones on the runner.
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let slug = get("GITHUB_REPOSITORY").ok_or(ConfigError::Missing("GITHUB_REPOSITORY"))?;
        let repo = RepoId::parse(&slug).ok_or_else(|| ConfigError::Invalid {
            name: "GITHUB_REPOSITORY",
            value: slug.clone(),
            reason: "expected owner/repo",
        })?;

        let workflow_name = get("GITHUB_WORKFLOW").ok_or(ConfigError::Missing("GITHUB_WORKFLOW"))?;

        let run_id = RunId(parse_u64(
            "GITHUB_RUN_ID",
            get("GITHUB_RUN_ID").ok_or(ConfigError::Missing("GITHUB_RUN_ID"))?,
        )?);

        // Pull request events carry the source branch in GITHUB_HEAD_REF; for
        // everything else the branch is the tail of GITHUB_REF.
        let branch = match get("GITHUB_HEAD_REF") {
            Some(head_ref) => head_ref,
            None => {
                let git_ref = get("GITHUB_REF").ok_or(ConfigError::Missing("GITHUB_REF"))?;
                branch_from_ref(&git_ref).to_string()
            }
        };

        let token = get("INPUT_TOKEN")
            .or_else(|| get("GITHUB_TOKEN"))
            .ok_or(ConfigError::Missing("GITHUB_TOKEN"))?;

        let poll_interval_seconds = match get("INPUT_POLL-INTERVAL-SECONDS") {
            Some(v) => parse_u64("INPUT_POLL-INTERVAL-SECONDS", v)?,
            None => DEFAULT_POLL_INTERVAL_SECS,
        };
        if poll_interval_seconds == 0 {
            return Err(ConfigError::Invalid {
                name: "INPUT_POLL-INTERVAL-SECONDS",
                value: "0".to_string(),
                reason: "must be greater than zero",
            });
        }

        Ok(WaitInput {
            repo,
            workflow_name,
            run_id,
            branch,
            same_branch_only: get("INPUT_SAME-BRANCH-ONLY")
                .map(|v| parse_bool("INPUT_SAME-BRANCH-ONLY", v))
                .transpose()?
                .unwrap_or(true),
            abort_on_newer_run: get("INPUT_ABORT-ON-NEWER-RUN")
                .map(|v| parse_bool("INPUT_ABORT-ON-NEWER-RUN", v))
                .transpose()?
                .unwrap_or(false),
            continue_after_seconds: parse_ceiling(
                "INPUT_CONTINUE-AFTER-SECONDS",
                get("INPUT_CONTINUE-AFTER-SECONDS"),
            )?,
            abort_after_seconds: parse_ceiling(
                "INPUT_ABORT-AFTER-SECONDS",
                get("INPUT_ABORT-AFTER-SECONDS"),
            )?,
            poll_interval_seconds,
            token,
            api_url: get("GITHUB_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            output_path: get("GITHUB_OUTPUT").map(PathBuf::from),
        })
    }

    /// Builds the wait context once the workflow name has been resolved.
    pub fn context(&self, workflow: WorkflowId) -> WaitContext {
        WaitContext {
            repo: self.repo.clone(),
            workflow,
            run_id: self.run_id,
            branch: self.branch.clone(),
            same_branch_only: self.same_branch_only,
            abort_on_newer_run: self.abort_on_newer_run,
            continue_after_seconds: self.continue_after_seconds,
            abort_after_seconds: self.abort_after_seconds,
            poll_interval_seconds: self.poll_interval_seconds,
        }
    }
}

impl std::fmt::Debug for WaitInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaitInput")
            .field("repo", &self.repo)
            .field("workflow_name", &self.workflow_name)
            .field("run_id", &self.run_id)
            .field("branch", &self.branch)
            .field("same_branch_only", &self.same_branch_only)
            .field("abort_on_newer_run", &self.abort_on_newer_run)
            .field("continue_after_seconds", &self.continue_after_seconds)
            .field("abort_after_seconds", &self.abort_after_seconds)
            .field("poll_interval_seconds", &self.poll_interval_seconds)
            .field("api_url", &self.api_url)
            .field("output_path", &self.output_path)
            .finish_non_exhaustive()
    }
}

/// The immutable configuration one wait loop runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitContext {
    pub repo: RepoId,
    pub workflow: WorkflowId,
    /// The run doing the waiting. Fixed for the whole loop.
    pub run_id: RunId,
    pub branch: String,
    pub same_branch_only: bool,
    pub abort_on_newer_run: bool,
    pub continue_after_seconds: Option<u64>,
    pub abort_after_seconds: Option<u64>,
    pub poll_interval_seconds: u64,
}

impl WaitContext {
    /// The branch filter to hand to the run lister.
    pub fn branch_filter(&self) -> Option<&str> {
        self.same_branch_only.then_some(self.branch.as_str())
    }

    /// The poll interval as a `Duration`.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }
}

/// Strips `refs/heads/` from a git ref. Other refs (tags, pull merge refs) are
/// returned unchanged.
fn branch_from_ref(git_ref: &str) -> &str {
    git_ref.strip_prefix("refs/heads/").unwrap_or(git_ref)
}

fn parse_u64(name: &'static str, value: String) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value,
        reason: "expected a non-negative integer",
    })
}

/// A ceiling of zero disables it, the same as leaving it unset.
fn parse_ceiling(name: &'static str, value: Option<String>) -> Result<Option<u64>, ConfigError> {
    Ok(value
        .map(|v| parse_u64(name, v))
        .transpose()?
        .filter(|&secs| secs > 0))
}

fn parse_bool(name: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value,
            reason: "expected true or false",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("GITHUB_REPOSITORY", "octo-org/deploy"),
            ("GITHUB_WORKFLOW", "Deploy"),
            ("GITHUB_RUN_ID", "100"),
            ("GITHUB_REF", "refs/heads/main"),
            ("GITHUB_TOKEN", "ghs_secret"),
        ])
    }

    fn load(env: &HashMap<&'static str, &'static str>) -> Result<WaitInput, ConfigError> {
        WaitInput::from_lookup(|name| env.get(name).map(|v| v.to_string()))
    }

    #[test]
    fn defaults_apply_when_inputs_are_absent() {
        let input = load(&base_env()).unwrap();

        assert_eq!(input.repo, RepoId::new("octo-org", "deploy"));
        assert_eq!(input.workflow_name, "Deploy");
        assert_eq!(input.run_id, RunId(100));
        assert_eq!(input.branch, "main");
        assert!(input.same_branch_only);
        assert!(!input.abort_on_newer_run);
        assert_eq!(input.continue_after_seconds, None);
        assert_eq!(input.abort_after_seconds, None);
        assert_eq!(input.poll_interval_seconds, 60);
        assert_eq!(input.api_url, "https://api.github.com");
        assert_eq!(input.output_path, None);
    }

    #[test]
    fn explicit_inputs_override_defaults() {
        let mut env = base_env();
        env.insert("INPUT_POLL-INTERVAL-SECONDS", "15");
        env.insert("INPUT_SAME-BRANCH-ONLY", "FALSE");
        env.insert("INPUT_ABORT-ON-NEWER-RUN", "true");
        env.insert("INPUT_CONTINUE-AFTER-SECONDS", "300");
        env.insert("INPUT_ABORT-AFTER-SECONDS", "600");
        env.insert("GITHUB_OUTPUT", "/tmp/out");
        env.insert("GITHUB_API_URL", "https://ghe.example.com/api/v3");

        let input = load(&env).unwrap();

        assert_eq!(input.poll_interval_seconds, 15);
        assert!(!input.same_branch_only);
        assert!(input.abort_on_newer_run);
        assert_eq!(input.continue_after_seconds, Some(300));
        assert_eq!(input.abort_after_seconds, Some(600));
        assert_eq!(input.output_path, Some(PathBuf::from("/tmp/out")));
        assert_eq!(input.api_url, "https://ghe.example.com/api/v3");
    }

    #[test]
    fn blank_inputs_count_as_unset() {
        let mut env = base_env();
        env.insert("INPUT_CONTINUE-AFTER-SECONDS", "");
        env.insert("INPUT_POLL-INTERVAL-SECONDS", "  ");

        let input = load(&env).unwrap();

        assert_eq!(input.continue_after_seconds, None);
        assert_eq!(input.poll_interval_seconds, 60);
    }

    #[test]
    fn zero_ceilings_are_disabled() {
        let mut env = base_env();
        env.insert("INPUT_CONTINUE-AFTER-SECONDS", "0");
        env.insert("INPUT_ABORT-AFTER-SECONDS", " 0 ");

        let input = load(&env).unwrap();

        assert_eq!(input.continue_after_seconds, None);
        assert_eq!(input.abort_after_seconds, None);
        assert_eq!(input.context(WorkflowId(7)).continue_after_seconds, None);
    }

    #[test]
    fn head_ref_wins_over_ref() {
        let mut env = base_env();
        env.insert("GITHUB_HEAD_REF", "feature/login");
        env.insert("GITHUB_REF", "refs/pull/42/merge");

        assert_eq!(load(&env).unwrap().branch, "feature/login");
    }

    #[test]
    fn branch_keeps_slashes_after_prefix() {
        let mut env = base_env();
        env.insert("GITHUB_REF", "refs/heads/release/1.x");

        assert_eq!(load(&env).unwrap().branch, "release/1.x");
    }

    #[test]
    fn input_token_takes_precedence() {
        let mut env = base_env();
        env.insert("INPUT_TOKEN", "pat_override");

        assert_eq!(load(&env).unwrap().token, "pat_override");
    }

    #[test]
    fn missing_required_variable_is_reported() {
        let mut env = base_env();
        env.remove("GITHUB_RUN_ID");

        assert_eq!(load(&env).unwrap_err(), ConfigError::Missing("GITHUB_RUN_ID"));
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let mut env = base_env();
        env.insert("INPUT_POLL-INTERVAL-SECONDS", "0");

        assert!(matches!(
            load(&env).unwrap_err(),
            ConfigError::Invalid {
                name: "INPUT_POLL-INTERVAL-SECONDS",
                ..
            }
        ));
    }

    #[test]
    fn malformed_values_are_rejected() {
        let mut env = base_env();
        env.insert("INPUT_ABORT-AFTER-SECONDS", "ten");
        assert!(matches!(
            load(&env).unwrap_err(),
            ConfigError::Invalid {
                name: "INPUT_ABORT-AFTER-SECONDS",
                ..
            }
        ));

        let mut env = base_env();
        env.insert("INPUT_SAME-BRANCH-ONLY", "yes");
        assert!(matches!(
            load(&env).unwrap_err(),
            ConfigError::Invalid {
                name: "INPUT_SAME-BRANCH-ONLY",
                ..
            }
        ));

        let mut env = base_env();
        env.insert("GITHUB_REPOSITORY", "not-a-slug");
        assert!(matches!(
            load(&env).unwrap_err(),
            ConfigError::Invalid {
                name: "GITHUB_REPOSITORY",
                ..
            }
        ));
    }

    #[test]
    fn debug_output_hides_token() {
        let input = load(&base_env()).unwrap();
        assert!(!format!("{:?}", input).contains("ghs_secret"));
    }

    #[test]
    fn context_branch_filter_follows_flag() {
        let input = load(&base_env()).unwrap();
        let ctx = input.context(WorkflowId(7));
        assert_eq!(ctx.branch_filter(), Some("main"));
        assert_eq!(ctx.poll_interval(), Duration::from_secs(60));

        let ctx = WaitContext {
            same_branch_only: false,
            ..ctx
        };
        assert_eq!(ctx.branch_filter(), None);
    }
}
