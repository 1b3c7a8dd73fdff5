// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Name, encode and commit the CSV report into the target repository
// role: persistence/publish
// inputs: CSV text, RepoSlug, organization login, run instant, DateWindow, Committer
// outputs: One create-or-update file contents call
// side_effects: Network call through GithubApi
// invariants:
// - path is reports/<org>-<YYYY-MM-DDTHH:MM:SS>-<window file label>.csv (UTC run instant)
// - content is standard base64 of the exact CSV bytes
// errors: Host errors surfaced as-is with the target path in context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};

use crate::github::GithubApi;
use crate::model::{Committer, FileCommit};
use crate::window::DateWindow;

/// `owner/repo` of the repository receiving the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
  pub owner: String,
  pub repo: String,
}

impl FromStr for RepoSlug {
  type Err = anyhow::Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().split_once('/') {
      Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => Ok(Self {
        owner: owner.to_string(),
        repo: repo.to_string(),
      }),
      _ => bail!("invalid repository {:?}, expected OWNER/REPO", s),
    }
  }
}

impl fmt::Display for RepoSlug {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.owner, self.repo)
  }
}

pub fn report_path(org: &str, run_at: DateTime<Utc>, window: &DateWindow) -> String {
  format!(
    "reports/{}-{}-{}.csv",
    org,
    run_at.format("%Y-%m-%dT%H:%M:%S"),
    window.file_label
  )
}

pub fn commit_message(run_at: DateTime<Utc>) -> String {
  format!("{} Member contribution report", run_at.format("%Y-%m-%d"))
}

pub fn encode_content(csv: &str) -> String {
  STANDARD.encode(csv.as_bytes())
}

/// Commit `csv` at `path` in `target`.
pub fn publish_report(
  api: &dyn GithubApi,
  target: &RepoSlug,
  path: &str,
  csv: &str,
  committer: &Committer,
  run_at: DateTime<Utc>,
) -> Result<()> {
  let commit = FileCommit {
    owner: target.owner.clone(),
    repo: target.repo.clone(),
    path: path.to_string(),
    message: commit_message(run_at),
    content: encode_content(csv),
    committer: committer.clone(),
  };

  tracing::info!(path, repository = %target, "writing report to repository");
  api.create_or_update_file(&commit)?;
  tracing::info!(path, "report pushed to the repository");

  Ok(())
}
