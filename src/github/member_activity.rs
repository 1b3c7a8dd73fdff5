// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Walk the organization member pages and accumulate one ActivityRecord per member
// role: github/pagination
// inputs: &dyn GithubApi, organization login and node id, DateWindow
// outputs: Vec<ActivityRecord> in fetch order
// side_effects: One info log line per member processed
// invariants:
// - Pages are requested strictly one after another, each with the previous page's endCursor
// - A login is recorded once; repeats across pages are dropped with a warning
// - Any page failure aborts the whole fetch; nothing accumulated so far is returned
// errors: Page failures with page number context; missing/repeated cursor is a terminal error
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::HashSet;

use anyhow::{bail, Context, Result};

use crate::github::GithubApi;
use crate::model::ActivityRecord;
use crate::window::DateWindow;

/// Resolve the organization's GraphQL node id (needed to scope contributions).
pub fn lookup_organization_id(api: &dyn GithubApi, org: &str) -> Result<String> {
  let id = api.organization_id(org)?;
  tracing::info!(org, id = %id, "resolved organization id");
  Ok(id)
}

pub fn fetch_member_activity(
  api: &dyn GithubApi,
  org: &str,
  org_id: &str,
  window: &DateWindow,
) -> Result<Vec<ActivityRecord>> {
  let mut records: Vec<ActivityRecord> = Vec::new();
  let mut seen: HashSet<String> = HashSet::new();
  let mut cursor: Option<String> = None;
  let mut page_no = 0usize;

  loop {
    page_no += 1;

    let page = api
      .members_page(org, org_id, window, cursor.as_deref())
      .with_context(|| format!("fetching member page {} for {}", page_no, org))?;

    for record in page.records {
      if !seen.insert(record.login.clone()) {
        tracing::warn!(login = %record.login, page = page_no, "member already seen on an earlier page; skipping");
        continue;
      }

      tracing::info!(
        login = %record.login,
        has_contributions = record.has_contributions,
        commits = record.commits,
        "member activity"
      );
      records.push(record);
    }

    if !page.has_next_page {
      break;
    }

    match page.end_cursor {
      Some(next) if cursor.as_deref() == Some(next.as_str()) => {
        bail!("member page {} for {} repeated cursor {:?}; refusing to loop", page_no, org, next)
      }
      Some(next) => cursor = Some(next),
      None => bail!("member page {} for {} reports more pages but no end cursor", page_no, org),
    }
  }

  Ok(records)
}
