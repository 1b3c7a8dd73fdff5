// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Orchestrate one report run: resolve org id and window, fetch members, build CSV, publish or emit locally
// role: processing/orchestrator
// inputs: EffectiveConfig, &dyn GithubApi, resolved now instant, stdout sink
// outputs: RunOutcome (report path, member count, whether published); CSV on stdout for dry runs without --out
// side_effects: Network calls through GithubApi; optional local file write; stdout for dry runs
// invariants:
// - Publish happens at most once and only after every page was fetched
// - dry_run never publishes; --out always receives the exact bytes that are (or would be) published
// - Any fetch failure aborts before the CSV is built
// errors: Propagates lookup/fetch/build/publish errors with context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::cli::EffectiveConfig;
use crate::github::member_activity::{fetch_member_activity, lookup_organization_id};
use crate::github::GithubApi;
use crate::publish::{publish_report, report_path};
use crate::render::build_report_csv;
use crate::util;
use crate::window::resolve_window;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
  /// Repository-relative path the report is (or would be) committed to.
  pub path: String,
  pub members: usize,
  pub published: bool,
}

pub fn run_report(
  cfg: &EffectiveConfig,
  api: &dyn GithubApi,
  now: DateTime<Utc>,
  stdout: &mut dyn Write,
) -> Result<RunOutcome> {
  let org_id = lookup_organization_id(api, &cfg.org)?;
  let window = resolve_window(&cfg.window, now);

  tracing::info!(org = %cfg.org, window = %window.log_label, sort = %cfg.sort, "Generating report");

  let records = fetch_member_activity(api, &cfg.org, &org_id, &window)?;
  let members = records.len();

  if members == 0 {
    tracing::warn!(org = %cfg.org, "organization returned no members; report will contain only the header");
  } else {
    tracing::info!(org = %cfg.org, members, "fetched member activity");
  }

  let csv = build_report_csv(records, cfg.sort, &window.column_label)?;
  let path = report_path(&cfg.org, now, &window);

  if let Some(out) = cfg.out.as_deref() {
    util::write_local_copy(out, &csv)?;
    tracing::info!(file = %out.display(), "wrote local copy of report");
  }

  if cfg.dry_run {
    if cfg.out.is_none() {
      stdout.write_all(csv.as_bytes()).context("writing report to stdout")?;
      stdout.flush().context("flushing stdout")?;
    }
    tracing::info!(path = %path, "dry run; report not published");

    return Ok(RunOutcome {
      path,
      members,
      published: false,
    });
  }

  let target = cfg
    .repository
    .as_ref()
    .context("no target repository configured (set --repository or GITHUB_REPOSITORY)")?;

  publish_report(api, target, &path, &csv, &cfg.committer, now)?;

  Ok(RunOutcome {
    path,
    members,
    published: true,
  })
}
