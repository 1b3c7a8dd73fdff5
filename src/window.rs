use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

// Contribution-window types and resolution live here to keep main focused.

pub const DEFAULT_DAYS: u32 = 30;

/// Upper bound accepted for `--days` (about a century).
pub const MAX_DAYS: u32 = 36_500;

/// Raw window selection as supplied on the command line.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct WindowSpec {
  pub from_date: Option<String>,
  pub to_date: Option<String>,
  pub days: u32,
}

/// A resolved contribution window plus the labels used in file names, logs and CSV headers.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct DateWindow {
  pub from: DateTime<Utc>,
  pub to: DateTime<Utc>,
  pub file_label: String,
  pub log_label: String,
  pub column_label: String,
}

impl DateWindow {
  /// `from` rendered the way the GraphQL `DateTime` scalar expects it.
  pub fn from_iso(&self) -> String {
    self.from.to_rfc3339_opts(SecondsFormat::Millis, true)
  }

  pub fn to_iso(&self) -> String {
    self.to.to_rfc3339_opts(SecondsFormat::Millis, true)
  }
}

/// Parse a strict `YYYY-MM-DD` calendar date. Shape-valid but impossible dates yield None.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
  static RE_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

  let s = raw.trim();

  if !RE_DATE.is_match(s) {
    return None;
  }

  NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn utc_midnight(d: NaiveDate) -> DateTime<Utc> {
  d.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc()
}

/// Resolve a window: explicit dates when both parse, otherwise `days` back from `now`.
///
/// Malformed explicit dates are not an error; they downgrade to the day-count
/// window and a warning is logged.
pub fn resolve_window(spec: &WindowSpec, now: DateTime<Utc>) -> DateWindow {
  let from_raw = spec.from_date.as_deref().filter(|s| !s.trim().is_empty());
  let to_raw = spec.to_date.as_deref().filter(|s| !s.trim().is_empty());

  let explicit = match (from_raw, to_raw) {
    (Some(f), Some(t)) => match (parse_calendar_date(f), parse_calendar_date(t)) {
      (Some(fd), Some(td)) => Some((fd, td)),
      _ => {
        tracing::warn!(
          fromdate = f,
          todate = t,
          days = spec.days,
          "explicit dates are not valid YYYY-MM-DD; using day-count window"
        );
        None
      }
    },
    (None, None) => None,
    (f, t) => {
      tracing::warn!(
        fromdate = f.unwrap_or(""),
        todate = t.unwrap_or(""),
        days = spec.days,
        "only one explicit date supplied; using day-count window"
      );
      None
    }
  };

  match explicit {
    Some((fd, td)) => {
      let from_s = fd.format("%Y-%m-%d").to_string();
      let to_s = td.format("%Y-%m-%d").to_string();
      let spoken = format!("{} to {}", from_s, to_s);

      DateWindow {
        from: utc_midnight(fd),
        to: utc_midnight(td),
        file_label: format!("{}-to-{}", from_s, to_s),
        log_label: spoken.clone(),
        column_label: spoken,
      }
    }
    None => {
      let days = spec.days;

      DateWindow {
        from: Duration::try_days(i64::from(days))
          .and_then(|span| now.checked_sub_signed(span))
          .unwrap_or(DateTime::<Utc>::MIN_UTC),
        to: now,
        file_label: format!("{}-days", days),
        log_label: format!("{} days", days),
        column_label: format!("<{} days", days),
      }
    }
  }
}

/// Parse a `--now-override` string into a UTC instant.
/// Accepts RFC3339 (e.g. 2025-08-15T12:00:00Z) or a naive UTC timestamp
/// formatted as `%Y-%m-%dT%H:%M:%S`.
pub fn parse_now_override(s: Option<&str>) -> Option<DateTime<Utc>> {
  s.and_then(|raw| {
    DateTime::parse_from_rfc3339(raw)
      .ok()
      .map(|dt| dt.with_timezone(&Utc))
      .or_else(|| {
        chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
          .ok()
          .map(|ndt| ndt.and_utc())
      })
  })
}
