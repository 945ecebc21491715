//! End-to-end runs over HTTP
//!
//! These tests use wiremock to stand in for the search service and the
//! listing pages, and drive the real HTTP fetcher and Rightmove adapter.

use crate::support::{fast_config, property_page, SharedBuffer};
use prop_sieve::client::HttpFetcher;
use prop_sieve::config::{PipelineConfig, SearchConfig};
use prop_sieve::pipeline::Pipeline;
use prop_sieve::SieveError;
use std::time::Duration;
use wiremock::matchers::{header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEARCH_PATH: &str = "/api/property-search/listing/search";

/// Creates search settings pointing both services at the mock server
fn create_search(base_url: &str, keywords: &[&str]) -> SearchConfig {
    SearchConfig {
        postcode: "SE1 9SG".to_string(),
        radius: 1.0,
        min_bedrooms: 2,
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        tenure: vec![],
        root_url: base_url.to_string(),
        lookup_url: base_url.to_string(),
    }
}

fn create_pipeline(search: &SearchConfig, config: PipelineConfig) -> Pipeline<HttpFetcher> {
    Pipeline::for_search(search, config)
        .expect("Failed to build pipeline")
        .with_progress_sink(Box::new(SharedBuffer::default()))
}

async fn mount_typeahead(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/typeahead"))
        .and(query_param("query", "SE1 9SG"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_listing_page(server: &MockServer, index: u32, result_count: &str, urls: &[&str]) {
    let properties: Vec<String> = urls
        .iter()
        .map(|u| format!(r#"{{"propertyUrl":"{}"}}"#, u))
        .collect();
    let body = format!(
        r#"{{"resultCount":"{}","properties":[{}]}}"#,
        result_count,
        properties.join(",")
    );

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("index", index.to_string()))
        .and(query_param("locationIdentifier", "POSTCODE^1234"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "application/json"),
        )
        .mount(server)
        .await;
}

async fn mount_property(server: &MockServer, id: u32, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/properties/{}", id)))
        .and(header_exists("user-agent"))
        .respond_with(response)
        .mount(server)
        .await;
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

#[tokio::test]
async fn test_full_run_over_http() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_typeahead(&mock_server, r#"{"matches":[{"id":"1234","displayName":"SE1 9SG"}]}"#).await;
    mount_listing_page(
        &mock_server,
        0,
        "3",
        &["/properties/1#/?channel=RES_BUY", "/properties/2", "/properties/3"],
    )
    .await;
    mount_property(
        &mock_server,
        1,
        html(property_page("1 Union Street", "South facing garden", "1,023 sq ft")),
    )
    .await;
    mount_property(
        &mock_server,
        2,
        html(property_page("2 Union Street", "Balcony", "500 sq ft")),
    )
    .await;
    mount_property(&mock_server, 3, ResponseTemplate::new(429)).await;

    let search = create_search(&base_url, &["garden"]);
    let outcome = tokio::time::timeout(
        Duration::from_secs(30),
        create_pipeline(&search, fast_config()).run(),
    )
    .await
    .expect("pipeline did not terminate")
    .expect("run failed");

    assert_eq!(outcome.records.len(), 1);
    let record = &outcome.records[0];
    assert_eq!(record.url, format!("{}/properties/1", base_url));
    assert_eq!(record.street, "1 Union Street");
    assert_eq!(record.size, 1023);
    assert_eq!(record.price, 325_000);

    let report = &outcome.report;
    assert_eq!(report.result_count, 3);
    assert_eq!(report.filter.passed, 1);
    assert_eq!(report.filter.rejected, 1);
    assert_eq!(report.filter.throttled, 1);
    assert_eq!(report.progress.resolved, 3);
}

#[tokio::test]
async fn test_throttled_listing_page_is_skipped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_typeahead(&mock_server, r#"{"matches":[{"id":1234}]}"#).await;
    // Page 0 answers twice: once for the result count, once for discovery
    mount_listing_page(&mock_server, 0, "30", &["/properties/1"]).await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("index", "24"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;
    mount_property(
        &mock_server,
        1,
        html(property_page("1 Union Street", "garden", "900 sq ft")),
    )
    .await;

    let search = create_search(&base_url, &[]);
    let outcome = create_pipeline(&search, fast_config()).run().await.unwrap();

    assert_eq!(outcome.report.discovery.pages_planned, 2);
    assert_eq!(outcome.report.discovery.pages_failed, 1);
    assert_eq!(outcome.records.len(), 1);
}

#[tokio::test]
async fn test_unknown_postcode_is_setup_failure() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_typeahead(&mock_server, r#"{"matches":[]}"#).await;

    // Nothing beyond the lookup may be requested
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"resultCount":"0"}"#))
        .expect(0)
        .mount(&mock_server)
        .await;

    let search = create_search(&base_url, &[]);
    let result = create_pipeline(&search, fast_config()).run().await;

    assert!(matches!(result, Err(SieveError::Setup { .. })));
    mock_server.verify().await;
}

#[tokio::test]
async fn test_server_error_on_detail_page_is_absorbed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_typeahead(&mock_server, r#"{"matches":[{"id":"1234"}]}"#).await;
    mount_listing_page(&mock_server, 0, "2", &["/properties/1", "/properties/2"]).await;
    mount_property(&mock_server, 1, ResponseTemplate::new(503)).await;
    mount_property(
        &mock_server,
        2,
        html(property_page("2 Union Street", "garden", "Ask agent")),
    )
    .await;

    let search = create_search(&base_url, &["garden"]);
    let outcome = create_pipeline(&search, fast_config()).run().await.unwrap();

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].size, 0);
    assert_eq!(outcome.report.filter.network_errors, 1);
    assert!(outcome.report.is_balanced());
}

#[test]
fn test_malformed_service_url_is_parse_error() {
    let mut search = create_search("http://127.0.0.1:9", &[]);
    search.root_url = "not a url".to_string();

    let result = Pipeline::for_search(&search, fast_config());

    assert!(matches!(result, Err(SieveError::Parse(_))));
}
