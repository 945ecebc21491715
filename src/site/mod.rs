//! Site strategies plugged into the pipeline
//!
//! The pipeline only knows three collaborator traits:
//! - `ListingSource`: how to resolve a search and walk its listing pages
//! - `Predicate`: whether a fetched candidate is worth extracting
//! - `RecordExtractor`: how to turn a fetched listing into a `Record`
//!
//! Rightmove implementations are provided alongside a keyword predicate.

mod keywords;
mod property_page;
mod rightmove;
pub mod text;

use crate::model::Record;
use crate::ParseResult;

pub use keywords::KeywordPredicate;
pub use property_page::{normalize_tenure, PropertyPageExtractor};
pub use rightmove::{RightmoveSearch, PAGE_LENGTH};

/// Discovery strategy: metadata resolution and listing-page parsing
///
/// All methods are pure; fetching is done by the pipeline through its
/// rate-aware client.
pub trait ListingSource: Send + Sync {
    /// Number of candidates per listing page; page indices step by this value
    fn page_length(&self) -> u32;

    /// Locator resolving the configured search area
    fn location_lookup_url(&self) -> String;

    /// Reads the search-area identifier from the lookup response
    fn parse_location_id(&self, content: &str) -> ParseResult<String>;

    /// Locator of the listing page starting at `index`
    fn search_url(&self, location_id: &str, index: u32) -> String;

    /// Reads the total number of results from a listing page
    fn parse_result_count(&self, content: &str) -> ParseResult<u32>;

    /// Reads candidate locators from a listing page
    fn parse_candidates(&self, content: &str) -> ParseResult<Vec<String>>;
}

/// Decides whether a candidate's content passes the filter
pub trait Predicate: Send + Sync {
    fn matches(&self, content: &str) -> bool;
}

/// Builds a record from a passed item's content
///
/// Implementations substitute field defaults instead of failing.
pub trait RecordExtractor: Send + Sync {
    fn extract(&self, locator: &str, content: &str) -> Record;
}
