// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Bounded retry around one logical GitHub request (rate limits, transient failures, abuse detection)
// role: github/retry-policy
// inputs: A send closure performing one HTTP attempt; a request label for logs
// outputs: The first successful (2xx) response, or the terminal ApiError
// side_effects: Sleeps between attempts via the injected sleeper; logs retries and abuse warnings
// invariants:
// - At most one rate-limit retry per logical request, waiting the server-specified delay
// - A 2xx GraphQL envelope with a RATE_LIMITED error counts as a rate limit
// - At most `max_transient_retries` retries for transport errors and 5xx, backoff capped at the ceiling
// - Abuse/secondary-limit responses are logged and surfaced without retry; other 4xx surface immediately
// errors: ApiError::{RateLimited, Abuse, Status, Transport}
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::time::Duration;

use crate::ext::serde_json::JsonFetch;
use crate::github::transport::HttpResponse;
use crate::github::ApiError;

pub type Sleeper = Box<dyn Fn(Duration)>;

const DEFAULT_RATE_LIMIT_WAIT: Duration = Duration::from_secs(60);

/// How the policy reads one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
  Success,
  RateLimited(Duration),
  Abuse,
  Transient,
  Fatal,
}

pub struct RetryPolicy {
  pub max_transient_retries: u32,
  pub max_rate_limit_retries: u32,
  pub backoff_base: Duration,
  pub backoff_ceiling: Duration,
  sleeper: Sleeper,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      max_transient_retries: 3,
      max_rate_limit_retries: 1,
      backoff_base: Duration::from_secs(1),
      backoff_ceiling: Duration::from_secs(180),
      sleeper: Box::new(std::thread::sleep),
    }
  }
}

impl RetryPolicy {
  pub fn with_sleeper(mut self, sleeper: Sleeper) -> Self {
    self.sleeper = sleeper;
    self
  }

  /// Delay before transient retry number `attempt` (1-based): `base * attempt²`, capped.
  pub fn backoff(&self, attempt: u32) -> Duration {
    self
      .backoff_base
      .saturating_mul(attempt.saturating_mul(attempt))
      .min(self.backoff_ceiling)
  }

  /// Run one logical request, re-invoking `send` as the policy allows.
  pub fn execute<F>(&self, label: &str, mut send: F) -> Result<HttpResponse, ApiError>
  where
    F: FnMut() -> Result<HttpResponse, ApiError>,
  {
    let mut transient_retries = 0u32;
    let mut rate_limit_retries = 0u32;

    loop {
      let failure = match send() {
        Ok(resp) => match classify(&resp, now_epoch()) {
          Signal::Success => return Ok(resp),
          Signal::RateLimited(wait) => {
            tracing::warn!(request = label, status = resp.status, "rate limit hit");

            if rate_limit_retries < self.max_rate_limit_retries {
              rate_limit_retries += 1;
              tracing::info!(request = label, wait_secs = wait.as_secs(), "retrying after rate limit");
              (self.sleeper)(wait);
              continue;
            }

            return Err(ApiError::RateLimited {
              status: resp.status,
              message: resp.error_message(),
            });
          }
          Signal::Abuse => {
            tracing::warn!(request = label, status = resp.status, "abuse detection triggered");
            return Err(ApiError::Abuse {
              status: resp.status,
              message: resp.error_message(),
            });
          }
          Signal::Transient => ApiError::Status {
            status: resp.status,
            message: resp.error_message(),
          },
          Signal::Fatal => {
            return Err(ApiError::Status {
              status: resp.status,
              message: resp.error_message(),
            })
          }
        },
        Err(e @ ApiError::Transport(_)) => e,
        Err(e) => return Err(e),
      };

      if transient_retries >= self.max_transient_retries {
        return Err(failure);
      }

      transient_retries += 1;
      let wait = self.backoff(transient_retries);
      tracing::warn!(
        request = label,
        attempt = transient_retries,
        wait_ms = wait.as_millis() as u64,
        error = %failure,
        "transient failure; retrying"
      );
      (self.sleeper)(wait);
    }
  }
}

fn now_epoch() -> i64 {
  chrono::Utc::now().timestamp()
}

fn mentions_secondary_limit(body: &str) -> bool {
  let lower = body.to_ascii_lowercase();
  lower.contains("secondary rate limit") || lower.contains("abuse")
}

/// GraphQL reports its primary rate limit inside a 2xx envelope.
fn graphql_rate_limited(body: &str) -> bool {
  if !body.contains("RATE_LIMITED") {
    return false;
  }

  serde_json::from_str::<serde_json::Value>(body)
    .ok()
    .and_then(|v| v.get("errors").and_then(|e| e.as_array()).cloned())
    .is_some_and(|errors| {
      errors
        .iter()
        .any(|e| e.fetch("type").to::<String>().as_deref() == Some("RATE_LIMITED"))
    })
}

/// `retry-after`, else time until `x-ratelimit-reset`, else the default wait.
fn rate_limit_wait(resp: &HttpResponse, retry_after: Option<Duration>, now: i64) -> Duration {
  retry_after
    .or_else(|| {
      resp
        .header("x-ratelimit-reset")
        .and_then(|s| s.trim().parse::<i64>().ok())
        .map(|reset| Duration::from_secs(reset.saturating_sub(now).max(0) as u64))
    })
    .unwrap_or(DEFAULT_RATE_LIMIT_WAIT)
}

/// Classify a response. `now` is the current Unix time, used with `x-ratelimit-reset`.
pub fn classify(resp: &HttpResponse, now: i64) -> Signal {
  let retry_after = resp
    .header("retry-after")
    .and_then(|s| s.trim().parse::<u64>().ok())
    .map(Duration::from_secs);

  if resp.is_success() {
    if graphql_rate_limited(&resp.body) {
      return Signal::RateLimited(rate_limit_wait(resp, retry_after, now));
    }
    return Signal::Success;
  }

  match resp.status {
    403 | 429 => {
      if mentions_secondary_limit(&resp.body) {
        return Signal::Abuse;
      }

      let exhausted = resp.header("x-ratelimit-remaining").map(str::trim) == Some("0");
      if !exhausted && retry_after.is_none() {
        return Signal::Fatal;
      }

      Signal::RateLimited(rate_limit_wait(resp, retry_after, now))
    }
    s if s >= 500 => Signal::Transient,
    _ => Signal::Fatal,
  }
}
