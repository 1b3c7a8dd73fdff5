// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: GitHub API seam used by the report job (org id lookup, member activity page, file contents commit)
// role: github/api
// inputs: Organization login/id, DateWindow, cursor; FileCommit for publishing
// outputs: Organization node id, MembersPage, unit on successful commit
// side_effects: GraphQL POSTs and REST PUTs through the retrying transport
// invariants:
// - Each method is one logical request wrapped once by RetryPolicy
// - GraphQL `errors` envelopes become terminal errors even on HTTP 200
// errors: anyhow errors carrying ApiError with operation context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::ext::serde_json::JsonFetch;
use crate::github::retry::RetryPolicy;
use crate::github::transport::{HttpRequest, Method, Transport, UreqTransport};
use crate::github::ApiError;
use crate::model::{ActivityRecord, FileCommit, MembersPage};
use crate::window::DateWindow;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Members requested per page of `membersWithRole`.
pub const MEMBERS_PAGE_SIZE: u32 = 25;

const ORG_ID_QUERY: &str = r#"query ($org: String!) {
  organization(login: $org) { id }
}"#;

const MEMBER_ACTIVITY_QUERY: &str = r#"query ($org: String!, $orgid: ID, $first: Int!, $cursorID: String, $from: DateTime, $to: DateTime) {
  organization(login: $org) {
    membersWithRole(first: $first, after: $cursorID) {
      nodes {
        login
        contributionsCollection(organizationID: $orgid, from: $from, to: $to) {
          hasAnyContributions
          totalCommitContributions
          totalIssueContributions
          totalPullRequestContributions
          totalPullRequestReviewContributions
          totalRepositoriesWithContributedIssues
          totalRepositoriesWithContributedCommits
          totalRepositoriesWithContributedPullRequests
          totalRepositoriesWithContributedPullRequestReviews
        }
      }
      pageInfo {
        hasNextPage
        endCursor
      }
    }
  }
}"#;

// --- Trait seam for GitHub API ---
pub trait GithubApi {
  fn organization_id(&self, org: &str) -> Result<String>;
  fn members_page(&self, org: &str, org_id: &str, window: &DateWindow, cursor: Option<&str>) -> Result<MembersPage>;
  fn create_or_update_file(&self, commit: &FileCommit) -> Result<()>;
}

// GraphQL response shapes for the member activity query.

#[derive(Debug, Deserialize)]
struct MembersData {
  organization: Option<OrganizationMembers>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrganizationMembers {
  members_with_role: MemberConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MemberConnection {
  nodes: Vec<MemberNode>,
  page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
  has_next_page: bool,
  end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MemberNode {
  login: String,
  contributions_collection: ContributionsCollection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContributionsCollection {
  has_any_contributions: bool,
  total_commit_contributions: u64,
  total_issue_contributions: u64,
  total_pull_request_contributions: u64,
  total_pull_request_review_contributions: u64,
  total_repositories_with_contributed_issues: u64,
  total_repositories_with_contributed_commits: u64,
  total_repositories_with_contributed_pull_requests: u64,
  total_repositories_with_contributed_pull_request_reviews: u64,
}

impl From<MemberNode> for ActivityRecord {
  fn from(node: MemberNode) -> Self {
    let c = node.contributions_collection;

    ActivityRecord {
      login: node.login,
      has_contributions: c.has_any_contributions,
      commits: c.total_commit_contributions,
      issues: c.total_issue_contributions,
      pull_requests: c.total_pull_request_contributions,
      pull_request_reviews: c.total_pull_request_review_contributions,
      repos_with_issues: c.total_repositories_with_contributed_issues,
      repos_with_commits: c.total_repositories_with_contributed_commits,
      repos_with_pull_requests: c.total_repositories_with_contributed_pull_requests,
      repos_with_pull_request_reviews: c.total_repositories_with_contributed_pull_request_reviews,
    }
  }
}

/// HTTP-backed implementation; one instance per run, shared by reference.
pub struct GithubHttpApi {
  transport: Box<dyn Transport>,
  retry: RetryPolicy,
  token: String,
  api_url: String,
}

impl GithubHttpApi {
  pub fn new(transport: Box<dyn Transport>, retry: RetryPolicy, token: &str, api_url: &str) -> Self {
    Self {
      transport,
      retry,
      token: token.to_string(),
      api_url: api_url.trim_end_matches('/').to_string(),
    }
  }

  fn send(&self, label: &str, method: Method, url: String, body: serde_json::Value) -> Result<serde_json::Value> {
    let req = HttpRequest {
      method,
      url,
      token: self.token.clone(),
      body,
    };

    let resp = self.retry.execute(label, || self.transport.send(&req))?;

    if resp.body.trim().is_empty() {
      return Ok(serde_json::Value::Null);
    }

    Ok(resp.json()?)
  }

  /// POST a GraphQL document and return its `data` object.
  fn graphql(&self, label: &str, query: &str, variables: serde_json::Value) -> Result<serde_json::Value> {
    let url = format!("{}/graphql", self.api_url);
    let v = self.send(label, Method::Post, url, serde_json::json!({ "query": query, "variables": variables }))?;

    if let Some(message) = v.fetch("errors.0.message").to::<String>() {
      return Err(ApiError::GraphQl(message).into());
    }

    let data = v.fetch("data");

    if !data.is_present() {
      return Err(ApiError::Decode("GraphQL response has no data".into()).into());
    }

    Ok(data.to_or_default::<serde_json::Value>())
  }
}

impl GithubApi for GithubHttpApi {
  fn organization_id(&self, org: &str) -> Result<String> {
    let data = self
      .graphql("organization id", ORG_ID_QUERY, serde_json::json!({ "org": org }))
      .with_context(|| format!("looking up organization id for {}", org))?;

    data
      .fetch("organization.id")
      .to::<String>()
      .with_context(|| format!("organization {:?} not found or not visible to this token", org))
  }

  fn members_page(&self, org: &str, org_id: &str, window: &DateWindow, cursor: Option<&str>) -> Result<MembersPage> {
    let variables = serde_json::json!({
      "org": org,
      "orgid": org_id,
      "first": MEMBERS_PAGE_SIZE,
      "from": window.from_iso(),
      "to": window.to_iso(),
      "cursorID": cursor,
    });

    let data = self.graphql("member activity", MEMBER_ACTIVITY_QUERY, variables)?;
    let parsed: MembersData =
      serde_json::from_value(data).map_err(|e| ApiError::Decode(format!("member activity page: {}", e)))?;

    let org_members = parsed
      .organization
      .with_context(|| format!("organization {:?} not found or not visible to this token", org))?;
    let conn = org_members.members_with_role;

    Ok(MembersPage {
      records: conn.nodes.into_iter().map(ActivityRecord::from).collect(),
      has_next_page: conn.page_info.has_next_page,
      end_cursor: conn.page_info.end_cursor,
    })
  }

  fn create_or_update_file(&self, commit: &FileCommit) -> Result<()> {
    let url = format!(
      "{}/repos/{}/{}/contents/{}",
      self.api_url, commit.owner, commit.repo, commit.path
    );
    let body = serde_json::json!({
      "message": commit.message,
      "content": commit.content,
      "committer": commit.committer,
    });

    self
      .send("create or update file", Method::Put, url, body)
      .with_context(|| format!("writing {} to {}/{}", commit.path, commit.owner, commit.repo))?;

    Ok(())
  }
}

/// Production client: ureq transport with the default retry policy.
pub fn build_api(token: &str, api_url: &str) -> GithubHttpApi {
  GithubHttpApi::new(Box::new(UreqTransport::new()), RetryPolicy::default(), token, api_url)
}
