//! Pipeline behaviour against an in-memory site

use crate::support::*;
use prop_sieve::client::RateAwareClient;
use prop_sieve::config::PipelineConfig;
use prop_sieve::pipeline::{Pipeline, PipelineOutcome};
use prop_sieve::site::{KeywordPredicate, ListingSource, PropertyPageExtractor};
use prop_sieve::ParseResult;
use prop_sieve::SieveError;
use std::collections::HashSet;
use std::time::{Duration, Instant};

const PAGE_LENGTH: u32 = 4;

/// Runs the pipeline with a bounded wall-clock budget
async fn run_pipeline(
    fetcher: MapFetcher,
    config: PipelineConfig,
    keywords: &[&str],
    sink: SharedBuffer,
) -> Result<PipelineOutcome, SieveError> {
    let client = RateAwareClient::new(fetcher, &config);
    let pipeline = Pipeline::new(
        config,
        client,
        LineSource {
            page_length: PAGE_LENGTH,
        },
        KeywordPredicate::new(keywords.iter().copied()),
        PropertyPageExtractor::new(),
    )
    .with_progress_sink(Box::new(sink));

    tokio::time::timeout(Duration::from_secs(20), pipeline.run())
        .await
        .expect("pipeline did not terminate")
}

/// Candidates alternating between garden and non-garden descriptions
fn mixed_details(count: usize) -> Vec<(String, String)> {
    (0..count)
        .map(|n| {
            let description = if n % 2 == 0 {
                "Lovely rear garden"
            } else {
                "Roof terrace"
            };
            (
                detail_locator(n),
                property_page(&format!("{} High Street", n), description, "900 sq ft"),
            )
        })
        .collect()
}

fn record_urls(outcome: &PipelineOutcome) -> HashSet<String> {
    outcome.records.iter().map(|r| r.url.clone()).collect()
}

#[tokio::test]
async fn test_garden_keyword_keeps_one_of_three() {
    let details = vec![
        (detail_locator(0), property_page("1 Elm Road", "Private garden to the rear", "700 sq ft")),
        (detail_locator(1), property_page("2 Elm Road", "Balcony with views", "650 sq ft")),
        (detail_locator(2), property_page("3 Elm Road", "Communal courtyard", "800 sq ft")),
    ];
    let fetcher = build_site(3, PAGE_LENGTH, &details);
    let sink = SharedBuffer::default();

    let outcome = run_pipeline(fetcher, fast_config(), &["garden"], sink.clone())
        .await
        .unwrap();

    assert_eq!(outcome.records.len(), 1);
    let record = &outcome.records[0];
    assert_eq!(record.url, detail_locator(0));
    assert_eq!(record.street, "1 Elm Road");
    assert_eq!(record.beds, 3);
    assert_eq!(record.size, 700);
    assert_eq!(record.tenure, "FREEHOLD");
    assert_eq!(record.price, 325_000);

    let report = &outcome.report;
    assert_eq!(report.candidates(), 3);
    assert_eq!(report.filter.passed, 1);
    assert_eq!(report.filter.rejected, 2);
    assert_eq!(report.extraction.extracted, 1);
    assert!(sink.contents().ends_with("3/3 (100%)\n"));
}

#[tokio::test]
async fn test_zero_results_terminates_cleanly() {
    let fetcher = build_site(0, PAGE_LENGTH, &[]);
    let calls = fetcher.calls();
    let sink = SharedBuffer::default();

    let outcome = run_pipeline(fetcher, fast_config(), &["garden"], sink.clone())
        .await
        .unwrap();

    assert!(outcome.records.is_empty());
    assert_eq!(outcome.report.candidates(), 0);
    assert_eq!(outcome.report.discovery.pages_planned, 0);
    assert_eq!(outcome.report.progress.total, 0);
    assert_eq!(outcome.report.filter_workers, 1);
    assert_eq!(sink.contents(), "");

    // Only the two resolution requests were made
    assert_eq!(calls.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_progress_advances_once_per_candidate() {
    // Two candidates fail in the filter stage
    let fetcher = build_site(30, PAGE_LENGTH, &mixed_details(30))
        .reply(detail_locator(5), Reply::Fail)
        .reply(detail_locator(11), Reply::Throttle);

    let sink = SharedBuffer::default();
    let outcome = run_pipeline(fetcher, fast_config(), &["garden"], sink.clone())
        .await
        .unwrap();
    let report = &outcome.report;

    assert_eq!(report.candidates(), 30);
    assert_eq!(report.progress.resolved, 30);
    assert_eq!(report.progress.current, report.progress.total);
    assert!(report.is_balanced());
    assert_eq!(report.filter.throttled, 1);
    assert_eq!(report.filter.network_errors, 1);

    // Bar line is closed exactly once
    assert_eq!(sink.contents().matches('\n').count(), 1);
}

#[tokio::test]
async fn test_records_are_unique_and_discovered() {
    let details = mixed_details(25);
    let discovered: HashSet<String> = details.iter().map(|(l, _)| l.clone()).collect();
    let fetcher = build_site(25, PAGE_LENGTH, &details);

    let outcome = run_pipeline(fetcher, fast_config(), &[], SharedBuffer::default())
        .await
        .unwrap();

    let urls = record_urls(&outcome);
    assert_eq!(urls.len(), outcome.records.len(), "duplicate records");
    assert!(urls.is_subset(&discovered));
    // No keywords: every candidate passes
    assert_eq!(urls, discovered);
}

#[tokio::test]
async fn test_same_records_across_pool_sizes() {
    let details = mixed_details(21);
    let mut results = Vec::new();

    for (filter_workers, extract_workers) in [(1, 1), (3, 2), (8, 8)] {
        let config = PipelineConfig {
            filter_workers,
            extract_workers,
            queue_capacity: 2,
            ..fast_config()
        };
        let fetcher = build_site(21, PAGE_LENGTH, &details);
        let outcome = run_pipeline(fetcher, config, &["garden"], SharedBuffer::default())
            .await
            .unwrap();
        results.push(record_urls(&outcome));
    }

    assert_eq!(results[0].len(), 11);
    assert_eq!(results[0], results[1]);
    assert_eq!(results[1], results[2]);
}

#[tokio::test]
async fn test_malformed_field_defaults_without_dropping_record() {
    let details = vec![(
        detail_locator(0),
        property_page("9 Mill Lane", "garden", "Ask agent"),
    )];
    let fetcher = build_site(1, PAGE_LENGTH, &details);

    let outcome = run_pipeline(fetcher, fast_config(), &["garden"], SharedBuffer::default())
        .await
        .unwrap();

    assert_eq!(outcome.records.len(), 1);
    let record = &outcome.records[0];
    assert_eq!(record.size, 0);
    assert_eq!(record.street, "9 Mill Lane");
    assert_eq!(record.baths, 2);
}

#[tokio::test]
async fn test_throttled_candidate_pauses_then_pipeline_continues() {
    let details = mixed_details(6);
    let fetcher = build_site(6, PAGE_LENGTH, &details).reply(detail_locator(2), Reply::Throttle);
    let config = PipelineConfig {
        cooldown: Duration::from_millis(300),
        ..fast_config()
    };

    let started = Instant::now();
    let outcome = run_pipeline(fetcher, config, &["garden"], SharedBuffer::default())
        .await
        .unwrap();

    assert!(started.elapsed() >= Duration::from_millis(300));
    assert_eq!(outcome.report.filter.throttled, 1);
    // Garden listings are 0, 2 and 4; 2 was lost to throttling
    assert_eq!(
        record_urls(&outcome),
        HashSet::from([detail_locator(0), detail_locator(4)])
    );
    assert!(outcome.report.is_balanced());
}

#[tokio::test]
async fn test_failed_listing_page_is_skipped() {
    let details = mixed_details(12);
    let fetcher = build_site(12, PAGE_LENGTH, &details).reply(search_page(4), Reply::Fail);
    let sink = SharedBuffer::default();

    let outcome = run_pipeline(fetcher, fast_config(), &[], sink.clone())
        .await
        .unwrap();
    let report = &outcome.report;

    assert_eq!(report.discovery.pages_planned, 3);
    assert_eq!(report.discovery.pages_fetched, 2);
    assert_eq!(report.discovery.pages_failed, 1);
    assert_eq!(report.candidates(), 8);
    assert_eq!(outcome.records.len(), 8);

    // Progress fell short of the announced total and was closed by finish()
    assert_eq!(report.progress.total, 12);
    assert_eq!(report.progress.current, 8);
    assert!(sink.contents().ends_with('\n'));
}

#[tokio::test]
async fn test_unreadable_first_page_is_setup_failure() {
    let details = mixed_details(8);
    let fetcher = build_site(8, PAGE_LENGTH, &details).reply(search_page(0), Reply::Throttle);

    let result = run_pipeline(fetcher, fast_config(), &[], SharedBuffer::default()).await;

    assert!(matches!(result, Err(SieveError::Setup { .. })));
}

#[tokio::test]
async fn test_all_listing_pages_failing_is_fatal() {
    let details = mixed_details(8);
    let fetcher = build_site(8, PAGE_LENGTH, &details);
    let config = fast_config();
    let client = RateAwareClient::new(fetcher, &config);
    let pipeline = Pipeline::new(
        config,
        client,
        LineSource {
            page_length: PAGE_LENGTH,
        },
        KeywordPredicate::new(Vec::<String>::new()),
        PropertyPageExtractor::new(),
    )
    .with_progress_sink(Box::new(SharedBuffer::default()));

    let mut plan = pipeline.resolve().await.unwrap();
    assert_eq!(plan.page_count, 2);
    // Listing pages of an unknown location all fail
    plan.location_id = "gone".to_string();

    let result = tokio::time::timeout(Duration::from_secs(20), pipeline.run_plan(plan))
        .await
        .expect("pipeline did not terminate");

    assert!(matches!(result, Err(SieveError::DiscoveryFailed { pages: 2 })));
}

#[tokio::test]
async fn test_setup_failure_starts_no_stage() {
    let fetcher = build_site(3, PAGE_LENGTH, &mixed_details(3)).body(LOOKUP, "   ");
    let calls = fetcher.calls();

    let result = run_pipeline(fetcher, fast_config(), &[], SharedBuffer::default()).await;

    match result {
        Err(SieveError::Setup { stage, .. }) => assert_eq!(stage, "resolving the search location"),
        other => panic!("expected setup failure, got {:?}", other.map(|o| o.report)),
    }
    assert_eq!(calls.lock().unwrap().as_slice(), [LOOKUP.to_string()]);
}

#[tokio::test]
async fn test_page_limit_caps_discovery() {
    let details = mixed_details(20);
    let fetcher = build_site(20, PAGE_LENGTH, &details);
    let config = PipelineConfig {
        max_pages: Some(2),
        ..fast_config()
    };

    let outcome = run_pipeline(fetcher, config, &[], SharedBuffer::default())
        .await
        .unwrap();

    assert_eq!(outcome.report.discovery.pages_planned, 2);
    assert_eq!(outcome.report.progress.total, 8);
    assert_eq!(outcome.records.len(), 8);
}

#[tokio::test]
async fn test_listing_pages_are_fetched_in_order_with_page_delay() {
    let page_delay = Duration::from_millis(150);
    let fetcher = build_site(12, PAGE_LENGTH, &mixed_details(12));
    let calls = fetcher.calls();
    let config = PipelineConfig {
        page_delay,
        ..fast_config()
    };

    let started = Instant::now();
    let outcome = run_pipeline(fetcher, config, &[], SharedBuffer::default())
        .await
        .unwrap();

    // Three pages means two pauses between them
    assert!(started.elapsed() >= page_delay * 2);
    assert_eq!(outcome.report.discovery.pages_fetched, 3);
    assert_eq!(outcome.records.len(), 12);

    let listing_calls: Vec<String> = calls
        .lock()
        .unwrap()
        .iter()
        .filter(|locator| locator.starts_with("mem://search/"))
        .cloned()
        .collect();
    // The first request reads the result count, the rest are discovery
    assert_eq!(
        listing_calls,
        vec![search_page(0), search_page(0), search_page(4), search_page(8)]
    );
}

/// Line source whose discovery crashes on the listing page holding `poisoned`
struct CrashingSource {
    inner: LineSource,
    poisoned: String,
}

impl ListingSource for CrashingSource {
    fn page_length(&self) -> u32 {
        self.inner.page_length()
    }

    fn location_lookup_url(&self) -> String {
        self.inner.location_lookup_url()
    }

    fn parse_location_id(&self, content: &str) -> ParseResult<String> {
        self.inner.parse_location_id(content)
    }

    fn search_url(&self, location_id: &str, index: u32) -> String {
        self.inner.search_url(location_id, index)
    }

    fn parse_result_count(&self, content: &str) -> ParseResult<u32> {
        self.inner.parse_result_count(content)
    }

    fn parse_candidates(&self, content: &str) -> ParseResult<Vec<String>> {
        if content.lines().any(|line| line.trim() == self.poisoned) {
            panic!("listing page parser crashed");
        }
        self.inner.parse_candidates(content)
    }
}

#[tokio::test]
async fn test_crashed_discovery_is_reported_after_stages_drain() {
    let fetcher = build_site(12, PAGE_LENGTH, &mixed_details(12));
    let calls = fetcher.calls();
    let config = fast_config();
    let client = RateAwareClient::new(fetcher, &config);
    let pipeline = Pipeline::new(
        config,
        client,
        CrashingSource {
            inner: LineSource {
                page_length: PAGE_LENGTH,
            },
            poisoned: detail_locator(4),
        },
        KeywordPredicate::new(Vec::<String>::new()),
        PropertyPageExtractor::new(),
    )
    .with_progress_sink(Box::new(SharedBuffer::default()));

    let result = tokio::time::timeout(Duration::from_secs(20), pipeline.run())
        .await
        .expect("pipeline did not terminate");
    assert!(matches!(result, Err(SieveError::Join(_))));

    // Candidates of the first page were fully processed before the error returned
    let settled = calls.lock().unwrap().len();
    for n in 0..4 {
        let visits = calls
            .lock()
            .unwrap()
            .iter()
            .filter(|locator| **locator == detail_locator(n))
            .count();
        assert_eq!(visits, 2, "candidate {} not filtered and extracted", n);
    }

    // No stage keeps working once the run has returned
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(calls.lock().unwrap().len(), settled);
}
