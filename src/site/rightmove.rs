//! Rightmove search API adapter
//!
//! Resolves a postcode into a location identifier through the typeahead
//! service, builds paginated search API URLs, and reads result counts and
//! listing locators out of the JSON payloads.

use crate::config::SearchConfig;
use crate::locator::resolve_locator;
use crate::site::ListingSource;
use crate::ParseError;
use serde::Deserialize;
use url::Url;

/// Listings per search API page
pub const PAGE_LENGTH: u32 = 24;

const SEARCH_PATH: &str = "/api/property-search/listing/search";
const TYPEAHEAD_PATH: &str = "/typeahead";

#[derive(Debug, Deserialize)]
struct TypeaheadPayload {
    #[serde(default)]
    matches: Vec<LocationMatch>,
}

#[derive(Debug, Deserialize)]
struct LocationMatch {
    id: CountOrText,
}

#[derive(Debug, Deserialize)]
struct SearchPayload {
    #[serde(rename = "resultCount")]
    result_count: Option<CountOrText>,
    #[serde(default)]
    properties: Vec<ListingSummary>,
}

#[derive(Debug, Deserialize)]
struct ListingSummary {
    #[serde(rename = "propertyUrl")]
    property_url: Option<String>,
}

/// The API sends some numbers as strings ("1,234") and some as numbers
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CountOrText {
    Number(u64),
    Text(String),
}

impl CountOrText {
    fn into_text(self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s,
        }
    }
}

/// Search strategy for the Rightmove listing API
#[derive(Debug, Clone)]
pub struct RightmoveSearch {
    root: Url,
    lookup: Url,
    postcode: String,
    radius: f32,
    min_bedrooms: u32,
    tenure: Vec<String>,
}

impl RightmoveSearch {
    /// Builds the strategy from validated search settings
    pub fn new(search: &SearchConfig) -> Result<Self, ParseError> {
        let parse = |value: &str| {
            Url::parse(value).map_err(|e| ParseError::Locator(format!("{}: {}", value, e)))
        };

        Ok(Self {
            root: parse(&search.root_url)?,
            lookup: parse(&search.lookup_url)?,
            postcode: search.postcode.trim().to_string(),
            radius: search.radius,
            min_bedrooms: search.min_bedrooms,
            tenure: search
                .tenure
                .iter()
                .map(|t| t.trim().to_uppercase())
                .collect(),
        })
    }
}

impl ListingSource for RightmoveSearch {
    fn page_length(&self) -> u32 {
        PAGE_LENGTH
    }

    fn location_lookup_url(&self) -> String {
        let mut url = self.lookup.clone();
        url.set_path(TYPEAHEAD_PATH);
        url.query_pairs_mut().clear().append_pair("query", &self.postcode);
        url.into()
    }

    fn parse_location_id(&self, content: &str) -> Result<String, ParseError> {
        let payload: TypeaheadPayload = serde_json::from_str(content)?;
        payload
            .matches
            .into_iter()
            .next()
            .map(|m| m.id.into_text())
            .filter(|id| !id.trim().is_empty())
            .ok_or(ParseError::NoLocationMatch)
    }

    fn search_url(&self, location_id: &str, index: u32) -> String {
        let mut url = self.root.clone();
        url.set_path(SEARCH_PATH);
        {
            let mut query = url.query_pairs_mut();
            query
                .clear()
                .append_pair("searchLocation", &self.postcode)
                .append_pair("useLocationIdentifier", "true")
                .append_pair("locationIdentifier", &format!("POSTCODE^{}", location_id))
                .append_pair("radius", &format!("{:.1}", self.radius))
                .append_pair("minBedrooms", &self.min_bedrooms.to_string())
                .append_pair("_includeSSTC", "on")
                .append_pair("includeSSTC", "true")
                .append_pair("index", &index.to_string())
                .append_pair("sortType", "2")
                .append_pair("channel", "BUY")
                .append_pair("transactionType", "BUY")
                .append_pair("displayLocationIdentifier", "undefined");
            if !self.tenure.is_empty() {
                query.append_pair("tenureTypes", &self.tenure.join(","));
            }
        }
        url.into()
    }

    fn parse_result_count(&self, content: &str) -> Result<u32, ParseError> {
        let payload: SearchPayload = serde_json::from_str(content)?;
        let text = payload
            .result_count
            .ok_or(ParseError::MissingField("resultCount"))?
            .into_text();
        let digits: String = text.chars().filter(|c| *c != ',').collect();
        digits.trim().parse().map_err(|_| ParseError::InvalidNumber {
            field: "resultCount",
            text,
        })
    }

    fn parse_candidates(&self, content: &str) -> Result<Vec<String>, ParseError> {
        let payload: SearchPayload = serde_json::from_str(content)?;
        let mut candidates = Vec::with_capacity(payload.properties.len());

        for listing in payload.properties {
            let Some(href) = listing.property_url else {
                tracing::debug!("Listing without propertyUrl skipped");
                continue;
            };
            match resolve_locator(&self.root, &href) {
                Ok(locator) => candidates.push(locator),
                Err(e) => tracing::debug!("Unusable listing locator {}: {}", href, e),
            }
        }

        Ok(candidates)
    }
}
