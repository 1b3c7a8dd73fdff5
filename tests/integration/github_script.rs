use std::time::{Duration, Instant};

use httpmock::prelude::*;
use httpmock::Mock;
use serde_json::json;
use test_support::read_fixture_text;

pub const BIN: &str = "org-activity-report";
pub const NOW: &str = "2025-08-15T12:00:00Z";
pub const TOKEN: &str = "t";
pub const SECOND_CURSOR: &str = "Y3Vyc29yOnYyOpHOAAAAAg==";

/// Report for the two fixture pages over the default 30-day window.
pub const THIRTY_DAY_REPORT: &str = "\
Member,Has active contributions (<30 days),Commits created (<30 days),Issues opened (<30 days),PRs opened (<30 days),PR reviews (<30 days),Issue spread (<30 days),Commit spread (<30 days),PR spread (<30 days),PR review spread (<30 days)
bravo,TRUE,10,0,3,4,0,3,2,2
alpha,TRUE,5,2,1,0,1,2,1,0
charlie,FALSE,0,0,0,0,0,0,0,0
";

const ORG_ID_LOOKUP: &str = "organization(login: $org) { id }";

/// The organization id lookup for `org`.
pub fn org_id<'a>(server: &'a MockServer, org: &str) -> Mock<'a> {
  server.mock(|when, then| {
    when
      .method(POST)
      .path("/graphql")
      .header("authorization", format!("Bearer {}", TOKEN))
      .body_contains(ORG_ID_LOOKUP)
      .json_body_partial(json!({ "variables": { "org": org } }).to_string());
    then
      .status(200)
      .header("content-type", "application/json")
      .body(read_fixture_text("github/org_id.json"));
  })
}

/// First member page: no cursor yet.
pub fn page_1<'a>(server: &'a MockServer, org: &str) -> Mock<'a> {
  members_page(server, json!({ "org": org, "orgid": "O_kgDOBacme", "first": 25, "cursorID": null }), "github/members_page_1.json")
}

/// Second member page, requested with the first page's end cursor.
pub fn page_2<'a>(server: &'a MockServer, org: &str) -> Mock<'a> {
  members_page(server, json!({ "org": org, "cursorID": SECOND_CURSOR }), "github/members_page_2.json")
}

/// A member page whose variables must include `variables`.
pub fn members_page<'a>(server: &'a MockServer, variables: serde_json::Value, fixture: &str) -> Mock<'a> {
  server.mock(|when, then| {
    when
      .method(POST)
      .path("/graphql")
      .header("authorization", format!("Bearer {}", TOKEN))
      .json_body_partial(json!({ "variables": variables }).to_string());
    then
      .status(200)
      .header("content-type", "application/json")
      .body(read_fixture_text(fixture));
  })
}

/// The contents PUT for `path` (e.g. `/repos/acme/reports/contents/reports/x.csv`).
pub fn contents_created<'a>(server: &'a MockServer, path: &str) -> Mock<'a> {
  server.mock(|when, then| {
    when
      .method(PUT)
      .path(path)
      .header("authorization", format!("Bearer {}", TOKEN));
    then
      .status(201)
      .header("content-type", "application/json")
      .body(read_fixture_text("github/contents_created.json"));
  })
}

/// The contents PUT for `path`, matched only when its JSON body includes `partial`.
pub fn contents_created_with<'a>(server: &'a MockServer, path: &str, partial: serde_json::Value) -> Mock<'a> {
  server.mock(|when, then| {
    when
      .method(PUT)
      .path(path)
      .header("authorization", format!("Bearer {}", TOKEN))
      .json_body_partial(partial.to_string());
    then
      .status(201)
      .header("content-type", "application/json")
      .body(read_fixture_text("github/contents_created.json"));
  })
}

pub fn encode_content(csv: &str) -> String {
  use base64::Engine as _;

  base64::engine::general_purpose::STANDARD.encode(csv.as_bytes())
}

/// Block until `mock` has answered once, then remove it so the client's next
/// identical request falls through to a later mock.
pub fn retire_after_first_hit(mut mock: Mock<'_>) {
  let deadline = Instant::now() + Duration::from_secs(15);
  while mock.hits() == 0 {
    assert!(Instant::now() < deadline, "first request never reached the mock server");
    std::thread::sleep(Duration::from_millis(20));
  }
  assert_eq!(mock.hits(), 1);
  mock.delete();
}
