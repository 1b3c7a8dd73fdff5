use anyhow::{Context, Result};

use crate::model::{ActivityRecord, SortField};

/// Column titles, in record field order. Every title except `Member` carries the window label.
pub fn header_row(column_label: &str) -> Vec<String> {
  let titled = |name: &str| format!("{} ({})", name, column_label);

  vec![
    "Member".to_string(),
    titled("Has active contributions"),
    titled("Commits created"),
    titled("Issues opened"),
    titled("PRs opened"),
    titled("PR reviews"),
    titled("Issue spread"),
    titled("Commit spread"),
    titled("PR spread"),
    titled("PR review spread"),
  ]
}

fn flag(b: bool) -> String {
  if b { "TRUE".into() } else { "FALSE".into() }
}

fn record_row(r: &ActivityRecord) -> Vec<String> {
  vec![
    r.login.clone(),
    flag(r.has_contributions),
    r.commits.to_string(),
    r.issues.to_string(),
    r.pull_requests.to_string(),
    r.pull_request_reviews.to_string(),
    r.repos_with_issues.to_string(),
    r.repos_with_commits.to_string(),
    r.repos_with_pull_requests.to_string(),
    r.repos_with_pull_request_reviews.to_string(),
  ]
}

/// Descending by `field`; `sort_by` is stable so ties keep fetch order.
pub fn sort_records(records: &mut [ActivityRecord], field: SortField) {
  records.sort_by(|a, b| field.value_of(b).cmp(&field.value_of(a)));
}

/// Sort, prepend the header, and serialize as CSV text.
pub fn build_report_csv(mut records: Vec<ActivityRecord>, field: SortField, column_label: &str) -> Result<String> {
  sort_records(&mut records, field);

  let mut wtr = csv::WriterBuilder::new()
    .terminator(csv::Terminator::Any(b'\n'))
    .from_writer(Vec::new());

  wtr.write_record(header_row(column_label)).context("writing CSV header")?;

  for r in &records {
    wtr
      .write_record(record_row(r))
      .with_context(|| format!("writing CSV row for {}", r.login))?;
  }

  let bytes = wtr.into_inner().map_err(|e| anyhow::anyhow!("flushing CSV: {}", e.error()))?;

  String::from_utf8(bytes).context("CSV output is not UTF-8")
}
