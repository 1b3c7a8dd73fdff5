// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: GitHub API access for the report job (GraphQL member activity, REST file contents) behind a retrying transport
// role: github/integration
// inputs: API base URL, bearer token, organization login, DateWindow
// outputs: Organization id, ActivityRecord pages, committed report file
// side_effects: Network calls to the configured GitHub API host
// invariants:
// - Every outbound call goes through RetryPolicy exactly once per logical request
// - No partial results escape a failed fetch
// errors: ApiError (typed) wrapped in anyhow with operation context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod github_api;
pub mod member_activity;
pub mod retry;
pub mod transport;

use thiserror::Error;

pub use github_api::{build_api, GithubApi};

/// Failures surfaced by the transport and retry layers.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("network error talking to GitHub: {0}")]
  Transport(String),

  #[error("GitHub rate limit still exceeded after retry (HTTP {status}): {message}")]
  RateLimited { status: u16, message: String },

  #[error("GitHub secondary rate limit triggered (HTTP {status}): {message}")]
  Abuse { status: u16, message: String },

  #[error("GitHub API returned HTTP {status}: {message}")]
  Status { status: u16, message: String },

  #[error("GitHub GraphQL error: {0}")]
  GraphQl(String),

  #[error("unexpected GitHub response: {0}")]
  Decode(String),
}
