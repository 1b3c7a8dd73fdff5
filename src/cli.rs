use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use crate::ext::serde_json::JsonFetch;
use crate::github::github_api::DEFAULT_API_URL;
use crate::model::{Committer, SortField};
use crate::publish::RepoSlug;
use crate::window::{WindowSpec, DEFAULT_DAYS, MAX_DAYS};

// No Debug derive on Cli/EffectiveConfig: both carry the API token.
#[derive(Parser)]
#[command(
    name = "org-activity-report",
    version,
    about = "Report per-member GitHub organization contributions as CSV and commit it to a repository",
    long_about = None
)]
pub struct Cli {
  /// Organization login (default: organization of the triggering event)
  #[arg(long, env = "INPUT_ORG")]
  pub org: Option<String>,

  /// Token with read:org and repo scopes (falls back to GITHUB_TOKEN)
  #[arg(long, env = "INPUT_TOKEN", hide_env_values = true)]
  pub token: Option<String>,

  /// Window start, YYYY-MM-DD; must be paired with --todate
  #[arg(long, env = "INPUT_FROMDATE")]
  pub fromdate: Option<String>,

  /// Window end, YYYY-MM-DD; must be paired with --fromdate
  #[arg(long, env = "INPUT_TODATE")]
  pub todate: Option<String>,

  /// Days back from now when no explicit dates are given [default: 30]
  #[arg(long, env = "INPUT_DAYS")]
  pub days: Option<String>,

  /// Sort column, e.g. commitContrib, prContrib, activeContrib [default: commitContrib]
  #[arg(long, env = "INPUT_SORT")]
  pub sort: Option<String>,

  /// Committer name for the report commit [default: github-actions]
  #[arg(long, env = "INPUT_COMMITTER-NAME")]
  pub committer_name: Option<String>,

  /// Committer email for the report commit [default: github-actions@github.com]
  #[arg(long, env = "INPUT_COMMITTER-EMAIL")]
  pub committer_email: Option<String>,

  /// Repository receiving the report, OWNER/REPO
  #[arg(long, env = "GITHUB_REPOSITORY")]
  pub repository: Option<String>,

  /// GitHub API base URL (GitHub Enterprise: https://HOST/api/v3)
  #[arg(long, env = "GITHUB_API_URL")]
  pub api_url: Option<String>,

  /// Build the report but do not commit it; prints CSV to stdout unless --out is given
  #[arg(long)]
  pub dry_run: bool,

  /// Also write the CSV to this local file
  #[arg(long)]
  pub out: Option<PathBuf>,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,

  /// Override the "now" instant used for day windows and report naming (hidden; tests only)
  #[arg(long = "now-override", hide = true)]
  pub now_override: Option<String>,
}

pub struct EffectiveConfig {
  pub org: String,
  pub token: String,
  pub window: WindowSpec,
  pub sort: SortField,
  pub committer: Committer,
  pub repository: Option<RepoSlug>,
  pub api_url: String,
  pub dry_run: bool,
  pub out: Option<PathBuf>,
  pub now_override: Option<String>,
}

/// Actions passes unset inputs as empty strings.
fn present(v: Option<String>) -> Option<String> {
  v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn env_present(key: &str) -> Option<String> {
  present(std::env::var(key).ok())
}

/// Organization login of the event that triggered the workflow.
fn org_from_event(path: &Path) -> Result<Option<String>> {
  let raw = std::fs::read_to_string(path).with_context(|| format!("reading event payload {}", path.display()))?;
  let v: serde_json::Value =
    serde_json::from_str(&raw).with_context(|| format!("parsing event payload {}", path.display()))?;

  Ok(present(v.fetch("organization.login").to::<String>()))
}

fn parse_days(raw: Option<String>) -> Result<u32> {
  match present(raw) {
    None => Ok(DEFAULT_DAYS),
    Some(s) => match s.parse::<u32>() {
      Ok(n) if n > MAX_DAYS => bail!("invalid days {}: at most {} days are supported", n, MAX_DAYS),
      Ok(n) if n > 0 => Ok(n),
      _ => bail!("invalid days {:?}: expected a positive whole number", s),
    },
  }
}

pub fn normalize(cli: Cli) -> Result<EffectiveConfig> {
  let token = present(cli.token)
    .or_else(|| env_present("GITHUB_TOKEN"))
    .context("missing GitHub token: pass --token or set INPUT_TOKEN / GITHUB_TOKEN")?;

  let org = match present(cli.org) {
    Some(o) => o,
    None => {
      let from_event = match env_present("GITHUB_EVENT_PATH") {
        Some(p) => org_from_event(Path::new(&p))?,
        None => None,
      };
      from_event.context("missing organization: pass --org or run from an organization event")?
    }
  };

  let sort = match present(cli.sort) {
    Some(s) => s.parse::<SortField>()?,
    None => SortField::default(),
  };

  let defaults = Committer::default();
  let committer = Committer {
    name: present(cli.committer_name).unwrap_or(defaults.name),
    email: present(cli.committer_email).unwrap_or(defaults.email),
  };

  let repository = match present(cli.repository) {
    Some(r) => Some(r.parse::<RepoSlug>()?),
    None if cli.dry_run => None,
    None => bail!("missing target repository: pass --repository OWNER/REPO, set GITHUB_REPOSITORY, or use --dry-run"),
  };

  Ok(EffectiveConfig {
    org,
    token,
    window: WindowSpec {
      from_date: present(cli.fromdate),
      to_date: present(cli.todate),
      days: parse_days(cli.days)?,
    },
    sort,
    committer,
    repository,
    api_url: present(cli.api_url).unwrap_or_else(|| DEFAULT_API_URL.to_string()),
    dry_run: cli.dry_run,
    out: cli.out,
    now_override: present(cli.now_override),
  })
}
