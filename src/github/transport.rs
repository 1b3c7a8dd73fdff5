// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Single-request HTTP seam (ureq-backed in production, scripted in tests)
// role: github/transport
// inputs: HttpRequest (method, url, bearer token, JSON body)
// outputs: HttpResponse with status, lower-cased headers and raw body
// side_effects: One network round trip per send
// invariants:
// - Non-2xx statuses are returned as responses, never as transport errors
// - Header names are lower-cased so lookups are case-insensitive
// errors: ApiError::Transport for connect/DNS/timeout/IO failures
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeMap;
use std::time::Duration;

use crate::ext::serde_json::JsonFetch;
use crate::github::ApiError;

pub const USER_AGENT: &str = "org-activity-report";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
  Post,
  Put,
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
  pub method: Method,
  pub url: String,
  pub token: String,
  pub body: serde_json::Value,
}

#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
  pub status: u16,
  pub headers: BTreeMap<String, String>,
  pub body: String,
}

impl HttpResponse {
  pub fn header(&self, name: &str) -> Option<&str> {
    self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
  }

  pub fn is_success(&self) -> bool {
    (200..300).contains(&self.status)
  }

  pub fn json(&self) -> Result<serde_json::Value, ApiError> {
    serde_json::from_str(&self.body).map_err(|e| ApiError::Decode(format!("invalid JSON body: {}", e)))
  }

  /// Best human-readable error text: the API's `message` field, else the raw body.
  pub fn error_message(&self) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(&self.body)
      .ok()
      .and_then(|v| v.fetch("message").to::<String>().or_else(|| v.fetch("errors.0.message").to::<String>()));

    match from_json {
      Some(m) => m,
      None if self.body.trim().is_empty() => "<empty body>".to_string(),
      None => self.body.chars().take(300).collect(),
    }
  }
}

pub trait Transport {
  fn send(&self, req: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

pub struct UreqTransport {
  agent: ureq::Agent,
}

impl UreqTransport {
  pub fn new() -> Self {
    let agent: ureq::Agent = ureq::Agent::config_builder()
      .http_status_as_error(false)
      .timeout_global(Some(REQUEST_TIMEOUT))
      .build()
      .into();

    Self { agent }
  }
}

impl Default for UreqTransport {
  fn default() -> Self {
    Self::new()
  }
}

impl Transport for UreqTransport {
  fn send(&self, req: &HttpRequest) -> Result<HttpResponse, ApiError> {
    let builder = match req.method {
      Method::Post => self.agent.post(&req.url),
      Method::Put => self.agent.put(&req.url),
    };

    let mut resp = builder
      .header("Accept", "application/vnd.github+json")
      .header("User-Agent", USER_AGENT)
      .header("Authorization", format!("Bearer {}", req.token))
      .send_json(&req.body)
      .map_err(|e| ApiError::Transport(e.to_string()))?;

    let status = resp.status().as_u16();
    let headers = resp
      .headers()
      .iter()
      .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_ascii_lowercase(), v.to_string())))
      .collect();
    let body = resp
      .body_mut()
      .read_to_string()
      .map_err(|e| ApiError::Transport(e.to_string()))?;

    Ok(HttpResponse { status, headers, body })
  }
}

/// Transport that replays canned responses in order and records what was sent.
#[cfg(test)]
pub struct ScriptedTransport {
  replies: std::cell::RefCell<std::collections::VecDeque<Result<HttpResponse, ApiError>>>,
  sent: std::cell::RefCell<Vec<HttpRequest>>,
}

#[cfg(test)]
impl ScriptedTransport {
  pub fn new(replies: Vec<Result<HttpResponse, ApiError>>) -> Self {
    Self {
      replies: std::cell::RefCell::new(replies.into()),
      sent: std::cell::RefCell::new(Vec::new()),
    }
  }

  pub fn sent(&self) -> Vec<HttpRequest> {
    self.sent.borrow().clone()
  }
}

#[cfg(test)]
impl Transport for ScriptedTransport {
  fn send(&self, req: &HttpRequest) -> Result<HttpResponse, ApiError> {
    self.sent.borrow_mut().push(req.clone());
    self
      .replies
      .borrow_mut()
      .pop_front()
      .unwrap_or_else(|| Err(ApiError::Transport("script exhausted".into())))
  }
}

#[cfg(test)]
impl Transport for std::rc::Rc<ScriptedTransport> {
  fn send(&self, req: &HttpRequest) -> Result<HttpResponse, ApiError> {
    self.as_ref().send(req)
  }
}

/// Build a response for tests: status, JSON body and extra headers.
#[cfg(test)]
pub fn canned(status: u16, body: serde_json::Value, headers: &[(&str, &str)]) -> HttpResponse {
  HttpResponse {
    status,
    headers: headers
      .iter()
      .map(|(k, v)| (k.to_ascii_lowercase(), v.to_string()))
      .collect(),
    body: body.to_string(),
  }
}
