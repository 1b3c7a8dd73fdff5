// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the member activity model, sortable metrics, and the publish payload shared by fetch, render and publish
// role: model/types
// outputs: ActivityRecord, SortField, MembersPage, FileCommit, Committer
// invariants: ActivityRecord field order == CSV column order; SortField covers exactly the nine metrics
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One organization member's contributions over the window. Keyed by `login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
  pub login: String,
  pub has_contributions: bool,
  pub commits: u64,
  pub issues: u64,
  pub pull_requests: u64,
  pub pull_request_reviews: u64,
  /// Spread counters: distinct repositories per contribution kind.
  pub repos_with_issues: u64,
  pub repos_with_commits: u64,
  pub repos_with_pull_requests: u64,
  pub repos_with_pull_request_reviews: u64,
}

/// Comparable value of a metric; booleans order `false < true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MetricValue {
  Flag(bool),
  Count(u64),
}

/// The nine metrics a report can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
  Active,
  #[default]
  Commits,
  Issues,
  PullRequests,
  PullRequestReviews,
  IssueSpread,
  CommitSpread,
  PullRequestSpread,
  PullRequestReviewSpread,
}

impl SortField {
  pub const ALL: [SortField; 9] = [
    SortField::Active,
    SortField::Commits,
    SortField::Issues,
    SortField::PullRequests,
    SortField::PullRequestReviews,
    SortField::IssueSpread,
    SortField::CommitSpread,
    SortField::PullRequestSpread,
    SortField::PullRequestReviewSpread,
  ];

  /// Name accepted by `--sort`; these match the action's historical column keys.
  pub fn as_str(self) -> &'static str {
    match self {
      SortField::Active => "activeContrib",
      SortField::Commits => "commitContrib",
      SortField::Issues => "issueContrib",
      SortField::PullRequests => "prContrib",
      SortField::PullRequestReviews => "prreviewContrib",
      SortField::IssueSpread => "repoIssueContrib",
      SortField::CommitSpread => "repoCommitContrib",
      SortField::PullRequestSpread => "repoPullRequestContrib",
      SortField::PullRequestReviewSpread => "repoPullRequestReviewContrib",
    }
  }

  pub fn value_of(self, r: &ActivityRecord) -> MetricValue {
    match self {
      SortField::Active => MetricValue::Flag(r.has_contributions),
      SortField::Commits => MetricValue::Count(r.commits),
      SortField::Issues => MetricValue::Count(r.issues),
      SortField::PullRequests => MetricValue::Count(r.pull_requests),
      SortField::PullRequestReviews => MetricValue::Count(r.pull_request_reviews),
      SortField::IssueSpread => MetricValue::Count(r.repos_with_issues),
      SortField::CommitSpread => MetricValue::Count(r.repos_with_commits),
      SortField::PullRequestSpread => MetricValue::Count(r.repos_with_pull_requests),
      SortField::PullRequestReviewSpread => MetricValue::Count(r.repos_with_pull_request_reviews),
    }
  }
}

impl fmt::Display for SortField {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for SortField {
  type Err = anyhow::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let needle = s.trim();

    SortField::ALL
      .into_iter()
      .find(|f| f.as_str().eq_ignore_ascii_case(needle))
      .ok_or_else(|| {
        let accepted: Vec<&str> = SortField::ALL.iter().map(|f| f.as_str()).collect();
        anyhow::anyhow!("unknown sort field {:?}; expected one of: {}", needle, accepted.join(", "))
      })
  }
}

/// One page of the organization members query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembersPage {
  pub records: Vec<ActivityRecord>,
  pub has_next_page: bool,
  pub end_cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Committer {
  pub name: String,
  pub email: String,
}

impl Default for Committer {
  fn default() -> Self {
    Self {
      name: "github-actions".into(),
      email: "github-actions@github.com".into(),
    }
  }
}

/// A create-or-update file request; `content` is already base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCommit {
  pub owner: String,
  pub repo: String,
  pub path: String,
  pub message: String,
  pub content: String,
  pub committer: Committer,
}
