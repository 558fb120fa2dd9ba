// ABOUTME: Integration tests for the scanlate CLI binary.
// ABOUTME: Runs source commands against a mock server through --base-url and checks the JSON output.

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::cargo::CommandCargoExt;
use httpmock::prelude::*;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

const LATEST_PAGE: &str = r#"<html><body>
<div class="uk-panel">
  <div class="uk-overflow-hidden"><img src="/wp-content/uploads/son.webp"></div>
  <h3 class="uk-h5"><a href="/manga/son/">Son</a></h3>
</div>
<ul class="uk-pagination"><li class="uk-disabled"><span>Sonraki</span></li></ul>
</body></html>"#;

const ALL_SERIES_PAGE: &str = r#"<html><body>
<div class="series-grid">
  <a class="series-card" href="/series/son"><img src="/uploads/covers/son.webp"><div class="series-title">Son</div></a>
</div>
</body></html>"#;

fn scanlate_cmd() -> Command {
    Command::cargo_bin("scanlate").unwrap()
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

#[test]
fn info_reports_base_url_override() {
    let info = stdout_json(
        scanlate_cmd()
            .arg("sadscans")
            .arg("info")
            .arg("--base-url")
            .arg("http://mirror.test/"),
    );
    assert_eq!(info["id"], "sadscans");
    assert_eq!(info["lang"], "tr");
    assert_eq!(info["base_url"], "http://mirror.test");
}

#[test]
fn unknown_source_fails() {
    scanlate_cmd()
        .arg("mangasite")
        .arg("info")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unknown source 'mangasite'"))
        .stderr(predicate::str::contains("merlinscans"));
}

#[test]
fn compact_filters_listing() {
    scanlate_cmd()
        .arg("merlinscans")
        .arg("filters")
        .arg("--compact")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""param":"sort""#))
        .stdout(predicate::str::contains(r#""param":"status""#));
}

#[test]
fn resolve_turns_links_into_slug_queries() {
    let link = stdout_json(
        scanlate_cmd()
            .arg("merlinscans")
            .arg("resolve")
            .arg("https://www.merlinscans.com/series.php?slug=kara-kilic"),
    );
    assert_eq!(link["source"], "merlinscans");
    assert_eq!(link["query"], "slug:kara-kilic");

    scanlate_cmd()
        .arg("merlinscans")
        .arg("resolve")
        .arg("https://merlinscans.com/")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a series link"));
}

#[test]
fn latest_written_to_output_file() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/son-guncellenenler/page/2/");
        then.status(200)
            .header("content-type", "text/html; charset=utf-8")
            .body(LATEST_PAGE);
    });

    let temp_dir = TempDir::new().unwrap();
    let out = temp_dir.path().join("latest.json");

    scanlate_cmd()
        .arg("merlintoon")
        .arg("latest")
        .arg("--page")
        .arg("2")
        .arg("--base-url")
        .arg(server.base_url())
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    mock.assert();
    let page: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(page["has_next"], false);
    assert_eq!(page["series"][0]["url"], "/manga/son/");
    assert_eq!(page["series"][0]["title"], "Son");
}

#[test]
fn search_filters_become_query_parameters() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/all-series.php")
            .query_param("status", "completed")
            .query_param("sort", "views");
        then.status(200)
            .header("content-type", "text/html; charset=utf-8")
            .body(ALL_SERIES_PAGE);
    });

    let page = stdout_json(
        scanlate_cmd()
            .arg("merlinscans")
            .arg("--base-url")
            .arg(server.base_url())
            .arg("search")
            .arg("")
            .arg("--filter")
            .arg("status=completed"),
    );

    mock.assert();
    assert_eq!(page["series"][0]["url"], "/series/son");
}

#[test]
fn unknown_filter_option_fails_before_fetching() {
    scanlate_cmd()
        .arg("merlinscans")
        .arg("--base-url")
        .arg("http://127.0.0.1:9")
        .arg("search")
        .arg("")
        .arg("--filter")
        .arg("status=paused")
        .assert()
        .failure()
        .stderr(predicate::str::contains("has no option 'paused'"));
}

#[test]
fn error_status_exits_with_transport_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/son-guncellenenler/page/1/");
        then.status(503).body("busy");
    });

    scanlate_cmd()
        .arg("merlintoon")
        .arg("latest")
        .arg("--base-url")
        .arg(server.base_url())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("transport error"))
        .stderr(predicate::str::contains("503"));
}

#[test]
fn locked_chapter_reports_locked_content() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/kara-kilic/bolum-3/");
        then.status(200)
            .header("content-type", "text/html; charset=utf-8")
            .body(r#"<html><body><div class="uk-card"><h3 class="uk-card-title">Kilitli Bölüm</h3></div><div id="chapter-content"></div></body></html>"#);
    });

    scanlate_cmd()
        .arg("merlintoon")
        .arg("pages")
        .arg("/kara-kilic/bolum-3/")
        .arg("--base-url")
        .arg(server.base_url())
        .assert()
        .failure()
        .stderr(predicate::str::contains("locked content"));
}
