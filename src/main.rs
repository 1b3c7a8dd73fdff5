use anyhow::Result;
use clap::Parser;

mod cli;
mod ext;
mod github;
mod model;
mod publish;
mod render;
mod report_runner;
mod util;
mod window;

use crate::cli::{normalize, Cli};

fn main() -> Result<()> {
  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  util::init_tracing();

  // Phase 1: normalize CLI
  let cfg = normalize(cli)?;

  // Phase 2: resolve now and build the single client for the run
  let now = util::effective_now(window::parse_now_override(cfg.now_override.as_deref()));
  let api = github::build_api(&cfg.token, &cfg.api_url);

  // Phase 3: fetch, build, publish
  let mut stdout = std::io::stdout().lock();
  let outcome = report_runner::run_report(&cfg, &api, now, &mut stdout)?;
  tracing::info!(path = %outcome.path, members = outcome.members, published = outcome.published, "done");

  Ok(())
}
