//! Locator handling for Prop-Sieve
//!
//! Listing payloads reference resources with site-relative paths; this module
//! resolves them against the service root and normalizes the result.

mod normalize;

use crate::ParseError;
use url::Url;

pub use normalize::normalize_locator;

/// Resolves `href` against `base` and normalizes it
///
/// # Examples
///
/// ```
/// use prop_sieve::locator::resolve_locator;
/// use url::Url;
///
/// let base = Url::parse("https://www.example.com").unwrap();
/// let url = resolve_locator(&base, "/properties/42#/?channel=RES_BUY").unwrap();
/// assert_eq!(url, "https://www.example.com/properties/42");
/// ```
pub fn resolve_locator(base: &Url, href: &str) -> Result<String, ParseError> {
    let href = href.trim();
    if href.is_empty() {
        return Err(ParseError::Locator("empty locator".to_string()));
    }
    let joined = base
        .join(href)
        .map_err(|e| ParseError::Locator(format!("{}: {}", href, e)))?;
    Ok(normalize_locator(joined.as_str())?.into())
}
