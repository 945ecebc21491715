//! Shared fixtures: an in-memory fetcher, a line-based listing source and a
//! progress sink that can be inspected after a run

use prop_sieve::client::{Fetch, FetchFailure};
use prop_sieve::config::PipelineConfig;
use prop_sieve::site::ListingSource;
use prop_sieve::{ParseError, ParseResult};
use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const LOOKUP: &str = "mem://lookup";

/// How the in-memory site answers one locator
#[derive(Clone)]
pub enum Reply {
    Body(String),
    Throttle,
    Fail,
}

/// Fetcher serving a fixed map of locators and recording every request
#[derive(Clone, Default)]
pub struct MapFetcher {
    replies: HashMap<String, Reply>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MapFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, locator: impl Into<String>, reply: Reply) -> Self {
        self.replies.insert(locator.into(), reply);
        self
    }

    pub fn body(self, locator: impl Into<String>, body: impl Into<String>) -> Self {
        self.reply(locator, Reply::Body(body.into()))
    }

    /// Handle on the request log, usable after the fetcher was moved
    pub fn calls(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.calls)
    }
}

impl Fetch for MapFetcher {
    async fn fetch(&self, locator: &str, _user_agent: &str) -> Result<String, FetchFailure> {
        self.calls.lock().unwrap().push(locator.to_string());
        match self.replies.get(locator) {
            Some(Reply::Body(body)) => Ok(body.clone()),
            Some(Reply::Throttle) => Err(FetchFailure::Throttled),
            Some(Reply::Fail) | None => Err(FetchFailure::Network("HTTP 404".to_string())),
        }
    }
}

/// Listing source over a line format: `count=N` followed by one locator per line
pub struct LineSource {
    pub page_length: u32,
}

impl ListingSource for LineSource {
    fn page_length(&self) -> u32 {
        self.page_length
    }

    fn location_lookup_url(&self) -> String {
        LOOKUP.to_string()
    }

    fn parse_location_id(&self, content: &str) -> ParseResult<String> {
        let id = content.trim();
        if id.is_empty() {
            return Err(ParseError::NoLocationMatch);
        }
        Ok(id.to_string())
    }

    fn search_url(&self, location_id: &str, index: u32) -> String {
        format!("mem://search/{}/{}", location_id, index)
    }

    fn parse_result_count(&self, content: &str) -> ParseResult<u32> {
        let first = content.lines().next().unwrap_or_default();
        let count = first
            .strip_prefix("count=")
            .ok_or(ParseError::MissingField("count"))?;
        count.parse().map_err(|_| ParseError::InvalidNumber {
            field: "count",
            text: count.to_string(),
        })
    }

    fn parse_candidates(&self, content: &str) -> ParseResult<Vec<String>> {
        let mut lines = content.lines();
        match lines.next() {
            Some(first) if first.starts_with("count=") => Ok(lines
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from)
                .collect()),
            _ => Err(ParseError::MissingField("count")),
        }
    }
}

/// Locator of the listing page starting at `index` for location `loc`
pub fn search_page(index: u32) -> String {
    format!("mem://search/loc/{}", index)
}

pub fn listing_page(count: u32, candidates: &[String]) -> String {
    let mut page = format!("count={}\n", count);
    for candidate in candidates {
        page.push_str(candidate);
        page.push('\n');
    }
    page
}

pub fn detail_locator(n: usize) -> String {
    format!("mem://properties/{}", n)
}

/// Property page in the layout the extractor reads
pub fn property_page(street: &str, description: &str, size: &str) -> String {
    format!(
        r#"<html><body>
        <h1 itemprop="streetAddress">{street}</h1>
        <span data-testid="primaryPrice">£325,000</span>
        <dl data-test="infoReel">
            <div><dt>PROPERTY TYPE</dt><dd>Terraced</dd></div>
            <div><dt>BEDROOMS</dt><dd>x3</dd></div>
            <div><dt>BATHROOMS</dt><dd>x2</dd></div>
            <div><dt>SIZE</dt><dd>{size}</dd></div>
            <div><dt>TENURE</dt><dd>Freehold</dd></div>
        </dl>
        <p>{description}</p>
        </body></html>"#
    )
}

/// Builds an in-memory site: lookup resolves to `loc`, listing pages hold
/// `page_length` candidates each and every candidate has a detail page
pub fn build_site(result_count: u32, page_length: u32, details: &[(String, String)]) -> MapFetcher {
    let mut fetcher = MapFetcher::new().body(LOOKUP, "loc");
    let locators: Vec<String> = details.iter().map(|(l, _)| l.clone()).collect();

    let pages = locators.chunks(page_length.max(1) as usize);
    let mut index = 0;
    let mut any_page = false;
    for chunk in pages {
        fetcher = fetcher.body(search_page(index), listing_page(result_count, chunk));
        index += page_length;
        any_page = true;
    }
    if !any_page {
        fetcher = fetcher.body(search_page(0), listing_page(result_count, &[]));
    }

    for (locator, body) in details {
        fetcher = fetcher.body(locator.clone(), body.clone());
    }
    fetcher
}

/// Pipeline configuration without politeness delays
pub fn fast_config() -> PipelineConfig {
    PipelineConfig {
        min_delay: Duration::ZERO,
        max_delay: Duration::from_millis(2),
        cooldown: Duration::from_millis(20),
        page_delay: Duration::ZERO,
        request_timeout: Duration::from_secs(5),
        seed: Some(7),
        ..PipelineConfig::default()
    }
}

/// Cloneable in-memory progress sink
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
