use httpmock::prelude::*;
use predicates::prelude::*;
use test_support::cmd_bin;

use crate::github_script::{contents_created, org_id, page_1, BIN, NOW, SECOND_CURSOR, TOKEN};

const REPORT_PATH: &str = "/repos/acme/reports/contents/reports/acme-2025-08-15T12:00:00-30-days.csv";

fn publish_args(api_url: &str) -> Vec<String> {
  ["--org", "acme", "--token", TOKEN, "--repository", "acme/reports", "--api-url", api_url, "--now-override", NOW]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[test]
fn second_page_failure_publishes_nothing() {
  let server = MockServer::start();
  let lookup = org_id(&server, "acme");
  let first = page_1(&server, "acme");
  let second = server.mock(|when, then| {
    when
      .method(POST)
      .path("/graphql")
      .json_body_partial(serde_json::json!({ "variables": { "cursorID": SECOND_CURSOR } }).to_string());
    then
      .status(401)
      .header("content-type", "application/json")
      .body(r#"{"message":"Bad credentials","documentation_url":"https://docs.github.com/rest"}"#);
  });
  let put = contents_created(&server, REPORT_PATH);

  cmd_bin(BIN)
    .args(publish_args(&server.base_url()))
    .assert()
    .failure()
    .stdout(predicate::str::is_empty())
    .stderr(predicate::str::contains("Error:").and(predicate::str::contains("Bad credentials").count(1)));

  lookup.assert_hits(1);
  first.assert_hits(1);
  second.assert_hits(1);
  put.assert_hits(0);
}

#[test]
fn host_rejection_of_the_commit_is_surfaced() {
  let server = MockServer::start();
  let _lookup = org_id(&server, "acme");
  let _first = page_1(&server, "acme");
  let _second = crate::github_script::page_2(&server, "acme");
  let put = server.mock(|when, then| {
    when.method(PUT).path(REPORT_PATH);
    then
      .status(422)
      .header("content-type", "application/json")
      .body(r#"{"message":"Invalid request.\n\n\"sha\" wasn't supplied.","documentation_url":"https://docs.github.com/rest"}"#);
  });

  cmd_bin(BIN)
    .args(publish_args(&server.base_url()))
    .assert()
    .failure()
    .stderr(predicate::str::contains("HTTP 422").and(predicate::str::contains("wasn't supplied")));

  put.assert_hits(1);
}

#[test]
fn unknown_organization_is_terminal() {
  let server = MockServer::start();
  let lookup = server.mock(|when, then| {
    when.method(POST).path("/graphql");
    then.status(200).header("content-type", "application/json").body(
      r#"{"data":{"organization":null},"errors":[{"type":"NOT_FOUND","message":"Could not resolve to an Organization with the login of 'nope'."}]}"#,
    );
  });

  cmd_bin(BIN)
    .args(["--org", "nope", "--token", TOKEN, "--dry-run", "--api-url", &server.base_url()])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Could not resolve to an Organization"));

  lookup.assert_hits(1);
}
