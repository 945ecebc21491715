//! Search resolution and listing-page discovery
//!
//! Resolution turns the configured search into a [`SearchPlan`]: the
//! location identifier, the advertised result count, and how many listing
//! pages to walk. Discovery then walks those pages one at a time and feeds
//! every candidate locator into the filter queue.

use crate::client::{Fetch, RateAwareClient};
use crate::config::PipelineConfig;
use crate::site::ListingSource;
use crate::SieveError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Everything discovery needs to know before it starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPlan {
    pub location_id: String,
    /// Result count advertised by the search service
    pub result_count: u32,
    pub page_length: u32,
    /// Listing pages discovery will request
    pub page_count: u32,
    /// Expected number of candidates, the progress total
    pub total: u64,
}

impl SearchPlan {
    /// Builds a plan from a result count
    ///
    /// Pages cover every result (`ceil(result_count / page_length)`), capped
    /// by `max_pages` when set. The total is what those pages can hold.
    pub fn new(
        location_id: impl Into<String>,
        result_count: u32,
        page_length: u32,
        max_pages: Option<u32>,
    ) -> Self {
        let page_length = page_length.max(1);
        let mut page_count = result_count.div_ceil(page_length);
        if let Some(limit) = max_pages {
            page_count = page_count.min(limit);
        }
        let total = u64::from(result_count).min(u64::from(page_count) * u64::from(page_length));

        Self {
            location_id: location_id.into(),
            result_count,
            page_length,
            page_count,
            total,
        }
    }

    /// Index parameter of each listing page, in request order
    pub fn page_indices(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.page_count).map(move |page| page * self.page_length)
    }
}

/// Resolves the location identifier and result count
///
/// Both requests go through the rate-aware client. Any failure here is
/// reported as [`SieveError::Setup`] and no pipeline stage is started.
pub async fn resolve_plan<F: Fetch>(
    client: &RateAwareClient<F>,
    source: &dyn ListingSource,
    config: &PipelineConfig,
) -> Result<SearchPlan, SieveError> {
    let lookup = source.location_lookup_url();
    tracing::debug!("Resolving search location via {}", lookup);

    let content = client.visit(&lookup).await.map_err(|e| SieveError::Setup {
        stage: "resolving the search location",
        message: e.to_string(),
    })?;
    let location_id = source
        .parse_location_id(&content)
        .map_err(|e| SieveError::Setup {
            stage: "resolving the search location",
            message: e.to_string(),
        })?;

    let first_page = source.search_url(&location_id, 0);
    let content = client.visit(&first_page).await.map_err(|e| SieveError::Setup {
        stage: "reading the result count",
        message: e.to_string(),
    })?;
    let result_count = source
        .parse_result_count(&content)
        .map_err(|e| SieveError::Setup {
            stage: "reading the result count",
            message: e.to_string(),
        })?;

    let plan = SearchPlan::new(location_id, result_count, source.page_length(), config.max_pages);
    tracing::info!(
        "Location {} has {} results across {} listing pages",
        plan.location_id,
        plan.result_count,
        plan.page_count
    );
    if plan.total < u64::from(plan.result_count) {
        tracing::info!("Page limit restricts this run to {} candidates", plan.total);
    }

    Ok(plan)
}

/// Counters kept by the discovery stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    pub pages_planned: u32,
    pub pages_fetched: u32,
    pub pages_failed: u32,
    /// Candidates handed to the filter queue
    pub candidates: u64,
}

/// Sequential walker over the planned listing pages
pub struct Discovery<F: Fetch> {
    client: Arc<RateAwareClient<F>>,
    source: Arc<dyn ListingSource>,
    page_delay: Duration,
}

impl<F: Fetch> Discovery<F> {
    pub fn new(
        client: Arc<RateAwareClient<F>>,
        source: Arc<dyn ListingSource>,
        page_delay: Duration,
    ) -> Self {
        Self {
            client,
            source,
            page_delay,
        }
    }

    /// Walks every planned page and enqueues its candidates
    ///
    /// Takes ownership of the only candidate sender and drops it once the
    /// last page is handled, which closes the filter queue. A page that
    /// cannot be fetched or parsed is logged and skipped. When every planned
    /// page fails the run has nothing to work on and an error is returned.
    pub async fn run(
        self,
        plan: SearchPlan,
        candidates: mpsc::Sender<String>,
    ) -> Result<DiscoveryReport, SieveError> {
        let mut report = DiscoveryReport {
            pages_planned: plan.page_count,
            ..DiscoveryReport::default()
        };

        'pages: for (page, index) in plan.page_indices().enumerate() {
            if page > 0 && !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }

            let locator = self.source.search_url(&plan.location_id, index);
            let content = match self.client.visit(&locator).await {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!("Skipping listing page {} (index {}): {}", page + 1, index, e);
                    report.pages_failed += 1;
                    continue;
                }
            };

            let found = match self.source.parse_candidates(&content) {
                Ok(found) => found,
                Err(e) => {
                    tracing::warn!("Unreadable listing page {} (index {}): {}", page + 1, index, e);
                    report.pages_failed += 1;
                    continue;
                }
            };

            report.pages_fetched += 1;
            tracing::debug!("Listing page {} yielded {} candidates", page + 1, found.len());

            for candidate in found {
                if candidates.send(candidate).await.is_err() {
                    tracing::warn!("Filter queue closed, discovery stopping early");
                    break 'pages;
                }
                report.candidates += 1;
            }
        }

        drop(candidates);
        tracing::info!(
            "Discovery finished: {} of {} pages fetched, {} candidates",
            report.pages_fetched,
            report.pages_planned,
            report.candidates
        );

        if report.pages_planned > 0 && report.pages_fetched == 0 {
            return Err(SieveError::DiscoveryFailed {
                pages: report.pages_planned,
            });
        }

        Ok(report)
    }
}
