//! Integration tests for the audit pipeline
//!
//! These tests use wiremock to stand in for the sitemap host, the OAuth2 token
//! endpoint, the URL Inspection API, the CrUX API and the Indexing API, and run
//! the full audit cycle end-to-end.

use serde_json::{json, Value};
use sitepulse::config::{parse_config, Config};
use sitepulse::report::{
    render_csv, IndexingState, MetricValue, PerformanceProblems, ERROR_MESSAGE_COLUMN,
};
use sitepulse::sitemap::resolve;
use sitepulse::{run_audit, AuditError, Auditor};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FIXTURE_KEY: &str = include_str!("../fixtures/service_account.json");

/// Options that vary between test scenarios
struct Scenario {
    url_limit: usize,
    submit_unindexed: bool,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            url_limit: 100,
            submit_unindexed: false,
        }
    }
}

/// Writes the fixture key with its token endpoint pointed at the mock server
fn write_key_file(dir: &Path, server_uri: &str) -> String {
    let mut key: Value = serde_json::from_str(FIXTURE_KEY).expect("Fixture key is valid JSON");
    key["token_uri"] = Value::String(format!("{}/token", server_uri));

    let key_path = dir.join("service_account.json");
    std::fs::write(&key_path, key.to_string()).expect("Failed to write key file");
    key_path.display().to_string()
}

/// Creates a test configuration whose endpoints all live on the mock server
fn create_test_config(server_uri: &str, dir: &TempDir, scenario: Scenario) -> Config {
    let key_path = write_key_file(dir.path(), server_uri);
    let output_dir = dir.path().join("reports");

    let toml = format!(
        r#"
[audit]
domains = ["sc-domain:example.com"]
url-limit = {limit}
api-delay-ms = 0
submit-unindexed = {submit}

[credentials]
service-account-key = "{key}"
crux-api-key = "test-crux-key"

[output]
directory = "{output}"

[endpoints]
inspection = "{uri}/inspect"
crux = "{uri}/crux"
indexing = "{uri}/publish"

[[sitemap]]
match = "example.com"
url = "{uri}/sitemap.xml"
fallback-paths = ["", "/about"]
"#,
        limit = scenario.url_limit,
        submit = scenario.submit_unindexed,
        key = key_path,
        output = output_dir.display(),
        uri = server_uri,
    );

    parse_config(&toml, None).expect("Test config should be valid")
}

fn urlset(urls: &[&str]) -> String {
    let entries: String = urls
        .iter()
        .map(|url| format!("<url><loc>{}</loc></url>", url))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</urlset>"#,
        entries
    )
}

fn sitemap_index(children: &[String]) -> String {
    let entries: String = children
        .iter()
        .map(|child| format!("<sitemap><loc>{}</loc></sitemap>", child))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</sitemapindex>"#,
        entries
    )
}

fn inspection_body(state: &str) -> Value {
    json!({
        "inspectionResult": {
            "indexStatusResult": {
                "indexingState": state,
                "lastCrawlTime": "2024-05-01T10:00:00Z"
            },
            "mobileUsabilityResult": { "verdict": "PASS" }
        }
    })
}

/// CrUX record with every metric inside its threshold
fn healthy_crux_body() -> Value {
    json!({
        "record": {
            "metrics": {
                "largest_contentful_paint": { "percentiles": { "p75": 1800 } },
                "experimental_time_to_first_byte": { "percentiles": { "p75": 400 } },
                "cumulative_layout_shift": { "percentiles": { "p75": "0.05" } },
                "first_contentful_paint": { "percentiles": { "p75": 1200 } },
                "interaction_to_next_paint": { "percentiles": { "p75": 150 } }
            }
        }
    })
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "test-token",
            "expires_in": 3600,
            "token_type": "Bearer"
        })))
        .mount(server)
        .await;
}

async fn mount_sitemap(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "application/xml"),
        )
        .mount(server)
        .await;
}

async fn mount_inspection(server: &MockServer, url: &str, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/inspect"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_partial_json(json!({
            "inspectionUrl": url,
            "siteUrl": "sc-domain:example.com"
        })))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn mount_crux(server: &MockServer, url: &str, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/crux"))
        .and(query_param("key", "test-crux-key"))
        .and(body_partial_json(json!({ "url": url })))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_three_url_audit_puts_indexing_problem_first() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let dir = TempDir::new().expect("Failed to create temp dir");

    mount_token(&server).await;
    mount_sitemap(
        &server,
        "/sitemap.xml",
        urlset(&[
            "https://example.com/a",
            "https://example.com/b",
            "https://example.com/c",
        ]),
    )
    .await;

    for (url, state) in [
        ("https://example.com/a", "INDEXED"),
        ("https://example.com/b", "DISCOVERED_NOT_INDEXED"),
        ("https://example.com/c", "INDEXED"),
    ] {
        mount_inspection(
            &server,
            url,
            ResponseTemplate::new(200).set_body_json(inspection_body(state)),
        )
        .await;
        mount_crux(
            &server,
            url,
            ResponseTemplate::new(200).set_body_json(healthy_crux_body()),
        )
        .await;
    }

    let config = create_test_config(&uri, &dir, Scenario::default());
    let outcome = run_audit(config).await.expect("Audit should succeed");

    let urls: Vec<&str> = outcome.records.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://example.com/b",
            "https://example.com/a",
            "https://example.com/c"
        ]
    );

    let problems: Vec<bool> = outcome
        .records
        .iter()
        .map(|r| r.indexing_problem())
        .collect();
    assert_eq!(problems, vec![true, false, false]);

    for record in &outcome.records {
        assert_eq!(
            record.performance.problems,
            PerformanceProblems::Breaches(Vec::new())
        );
    }

    assert_eq!(outcome.summary.total_urls, 3);
    assert_eq!(outcome.summary.indexing_problems, 1);
    assert_eq!(outcome.summary.healthy, 2);

    // Report file
    assert!(outcome.report_path.exists());
    let file_name = outcome
        .report_path
        .file_name()
        .and_then(|n| n.to_str())
        .expect("Report has a file name");
    assert!(file_name.starts_with("gsc_inspection_report_"));
    assert!(file_name.ends_with(".csv"));

    let content = std::fs::read_to_string(&outcome.report_path).expect("Report is readable");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines[0],
        "url,indexing_state,crawl_status,mobile_usability,indexing_problem,lcp,ttfb,cls,fcp,inp,performance_problems"
    );
    assert!(lines[1].starts_with("https://example.com/b,DISCOVERED_NOT_INDEXED,"));
    assert!(!content.contains(ERROR_MESSAGE_COLUMN));
}

#[tokio::test]
async fn test_service_errors_become_sentinel_rows() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let dir = TempDir::new().expect("Failed to create temp dir");

    mount_token(&server).await;
    mount_sitemap(
        &server,
        "/sitemap.xml",
        urlset(&["https://example.com/denied", "https://example.com/quiet"]),
    )
    .await;

    mount_inspection(
        &server,
        "https://example.com/denied",
        ResponseTemplate::new(403).set_body_json(json!({
            "error": { "code": 403, "message": "The caller does not have permission" }
        })),
    )
    .await;
    mount_crux(
        &server,
        "https://example.com/denied",
        ResponseTemplate::new(500).set_body_string("upstream failure"),
    )
    .await;

    mount_inspection(
        &server,
        "https://example.com/quiet",
        ResponseTemplate::new(200).set_body_json(inspection_body("INDEXED")),
    )
    .await;
    mount_crux(
        &server,
        "https://example.com/quiet",
        ResponseTemplate::new(404).set_body_json(json!({
            "error": { "code": 404, "message": "chrome ux report data not found" }
        })),
    )
    .await;

    let config = create_test_config(&uri, &dir, Scenario::default());
    let outcome = run_audit(config).await.expect("Audit should succeed");
    assert_eq!(outcome.records.len(), 2);

    let denied = &outcome.records[0];
    assert_eq!(denied.url, "https://example.com/denied");
    assert_eq!(denied.indexing.indexing_state, IndexingState::Error(Some(403)));
    assert_eq!(denied.indexing.indexing_state.to_string(), "ERROR: 403");
    let message = denied
        .indexing
        .error_message
        .as_deref()
        .expect("Failed inspection carries a message");
    assert!(message.contains("The caller does not have permission"));
    assert!(message.contains("Owner role"));
    assert_eq!(denied.performance.lcp, MetricValue::Error);
    assert_eq!(denied.performance.problems, PerformanceProblems::Error);

    let quiet = &outcome.records[1];
    assert_eq!(quiet.indexing.indexing_state, IndexingState::Indexed);
    assert_eq!(quiet.performance.lcp, MetricValue::NoData);
    assert_eq!(quiet.performance.problems, PerformanceProblems::NoCruxData);

    let content = std::fs::read_to_string(&outcome.report_path).expect("Report is readable");
    let header_line = content.lines().next().expect("Report has a header");
    assert!(header_line.ends_with(",error_message"));
    assert!(content.contains("ERROR: 403"));
    assert!(content.contains("NO_DATA"));
    assert!(content.contains("No CrUX data"));
}

#[tokio::test]
async fn test_sitemap_index_is_expanded_in_order_and_truncated() {
    let server = MockServer::start().await;
    let uri = server.uri();

    mount_sitemap(
        &server,
        "/sitemap.xml",
        sitemap_index(&[format!("{}/first.xml", uri), format!("{}/second.xml", uri)]),
    )
    .await;
    mount_sitemap(
        &server,
        "/first.xml",
        urlset(&["https://example.com/1", "https://example.com/2"]),
    )
    .await;
    mount_sitemap(
        &server,
        "/second.xml",
        urlset(&[
            "https://example.com/3",
            "https://example.com/4",
            "https://example.com/5",
        ]),
    )
    .await;

    let client = reqwest::Client::new();
    let sitemap_url = format!("{}/sitemap.xml", uri);

    let all = resolve(&client, &sitemap_url, 100).await;
    assert_eq!(
        all,
        vec![
            "https://example.com/1",
            "https://example.com/2",
            "https://example.com/3",
            "https://example.com/4",
            "https://example.com/5",
        ]
    );

    let capped = resolve(&client, &sitemap_url, 3).await;
    assert_eq!(
        capped,
        vec![
            "https://example.com/1",
            "https://example.com/2",
            "https://example.com/3",
        ]
    );
}

#[tokio::test]
async fn test_limit_reached_skips_remaining_child_sitemaps() {
    let server = MockServer::start().await;
    let uri = server.uri();

    mount_sitemap(
        &server,
        "/sitemap.xml",
        sitemap_index(&[format!("{}/first.xml", uri), format!("{}/second.xml", uri)]),
    )
    .await;
    mount_sitemap(
        &server,
        "/first.xml",
        urlset(&["https://example.com/1", "https://example.com/2"]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/second.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(urlset(&["https://example.com/3"])))
        .expect(0)
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let urls = resolve(&client, &format!("{}/sitemap.xml", uri), 2).await;
    assert_eq!(urls, vec!["https://example.com/1", "https://example.com/2"]);
}

#[tokio::test]
async fn test_failing_child_sitemaps_are_skipped() {
    let server = MockServer::start().await;
    let uri = server.uri();

    mount_sitemap(
        &server,
        "/sitemap.xml",
        sitemap_index(&[
            format!("{}/broken.xml", uri),
            format!("{}/malformed.xml", uri),
            format!("{}/good.xml", uri),
        ]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/broken.xml"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_sitemap(
        &server,
        "/malformed.xml",
        "<urlset><url><loc>https://example.com/lost</url>".to_string(),
    )
    .await;
    mount_sitemap(&server, "/good.xml", urlset(&["https://example.com/g"])).await;

    let client = reqwest::Client::new();
    let urls = resolve(&client, &format!("{}/sitemap.xml", uri), 100).await;
    assert_eq!(urls, vec!["https://example.com/g"]);
}

#[tokio::test]
async fn test_malformed_top_level_sitemap_resolves_to_nothing() {
    let server = MockServer::start().await;

    mount_sitemap(&server, "/sitemap.xml", "not xml <<<".to_string()).await;

    let client = reqwest::Client::new();
    let urls = resolve(&client, &format!("{}/sitemap.xml", server.uri()), 100).await;
    assert!(urls.is_empty());
}

#[tokio::test]
async fn test_sitemap_failure_falls_back_to_configured_paths() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let dir = TempDir::new().expect("Failed to create temp dir");

    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    for url in ["https://example.com", "https://example.com/about"] {
        mount_inspection(
            &server,
            url,
            ResponseTemplate::new(200).set_body_json(inspection_body("INDEXED")),
        )
        .await;
        mount_crux(
            &server,
            url,
            ResponseTemplate::new(200).set_body_json(healthy_crux_body()),
        )
        .await;
    }

    let config = create_test_config(&uri, &dir, Scenario::default());
    let outcome = run_audit(config).await.expect("Audit should succeed");

    let urls: Vec<&str> = outcome.records.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls, vec!["https://example.com", "https://example.com/about"]);
}

#[tokio::test]
async fn test_rerun_produces_identical_report() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let dir = TempDir::new().expect("Failed to create temp dir");

    mount_token(&server).await;
    mount_sitemap(
        &server,
        "/sitemap.xml",
        urlset(&["https://example.com/x", "https://example.com/y"]),
    )
    .await;
    mount_inspection(
        &server,
        "https://example.com/x",
        ResponseTemplate::new(200).set_body_json(inspection_body("CRAWLED_NOT_INDEXED")),
    )
    .await;
    mount_inspection(
        &server,
        "https://example.com/y",
        ResponseTemplate::new(429).set_body_json(json!({
            "error": { "code": 429, "message": "Quota exceeded" }
        })),
    )
    .await;
    for url in ["https://example.com/x", "https://example.com/y"] {
        mount_crux(
            &server,
            url,
            ResponseTemplate::new(200).set_body_json(healthy_crux_body()),
        )
        .await;
    }

    let mut auditor = Auditor::new(create_test_config(&uri, &dir, Scenario::default()))
        .expect("Auditor should build");
    let first = sitepulse::assemble(auditor.collect().await.expect("First run"));
    let second = sitepulse::assemble(auditor.collect().await.expect("Second run"));

    assert_eq!(first, second);
    assert_eq!(render_csv(&first), render_csv(&second));
}

#[tokio::test]
async fn test_submit_unindexed_publishes_only_unindexed_pages() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let dir = TempDir::new().expect("Failed to create temp dir");

    mount_token(&server).await;
    mount_sitemap(
        &server,
        "/sitemap.xml",
        urlset(&["https://example.com/new", "https://example.com/old"]),
    )
    .await;
    mount_inspection(
        &server,
        "https://example.com/new",
        ResponseTemplate::new(200).set_body_json(inspection_body("DISCOVERED_NOT_INDEXED")),
    )
    .await;
    mount_inspection(
        &server,
        "https://example.com/old",
        ResponseTemplate::new(200).set_body_json(inspection_body("INDEXED")),
    )
    .await;
    for url in ["https://example.com/new", "https://example.com/old"] {
        mount_crux(
            &server,
            url,
            ResponseTemplate::new(200).set_body_json(healthy_crux_body()),
        )
        .await;
    }

    Mock::given(method("POST"))
        .and(path("/publish"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_partial_json(json!({
            "url": "https://example.com/new",
            "type": "URL_UPDATED"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let scenario = Scenario {
        submit_unindexed: true,
        ..Scenario::default()
    };
    let config = create_test_config(&uri, &dir, scenario);
    let outcome = run_audit(config).await.expect("Audit should succeed");
    assert_eq!(outcome.records.len(), 2);

    // Mock expectations are verified when the server drops
}

#[tokio::test]
async fn test_failed_token_exchange_is_fatal() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let dir = TempDir::new().expect("Failed to create temp dir");

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid JWT Signature."
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/inspect"))
        .respond_with(ResponseTemplate::new(200).set_body_json(inspection_body("INDEXED")))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(&uri, &dir, Scenario::default());
    let result = run_audit(config).await;

    assert!(matches!(result, Err(AuditError::Auth(_))));
    assert!(!dir.path().join("reports").exists());
}

#[tokio::test]
async fn test_missing_key_file_is_fatal() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("Failed to create temp dir");

    let mut config = create_test_config(&server.uri(), &dir, Scenario::default());
    config.credentials.service_account_key =
        dir.path().join("missing.json").display().to_string();

    let result = Auditor::new(config);
    assert!(matches!(result, Err(AuditError::Auth(_))));
}

#[tokio::test]
async fn test_url_limit_caps_inspected_pages() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let dir = TempDir::new().expect("Failed to create temp dir");

    mount_token(&server).await;
    mount_sitemap(
        &server,
        "/sitemap.xml",
        urlset(&[
            "https://example.com/1",
            "https://example.com/2",
            "https://example.com/3",
        ]),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/inspect"))
        .respond_with(ResponseTemplate::new(200).set_body_json(inspection_body("INDEXED")))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/crux"))
        .respond_with(ResponseTemplate::new(200).set_body_json(healthy_crux_body()))
        .expect(2)
        .mount(&server)
        .await;

    let scenario = Scenario {
        url_limit: 2,
        ..Scenario::default()
    };
    let config = create_test_config(&uri, &dir, scenario);
    let outcome = run_audit(config).await.expect("Audit should succeed");

    let urls: Vec<&str> = outcome.records.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls, vec!["https://example.com/1", "https://example.com/2"]);
}
