use crate::ParseError;
use url::Url;

/// Query parameters that carry no identity and are dropped from locators
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid", "ref", "source", "channel"];

/// Normalizes a locator so equal listings compare equal
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed or not HTTP(S)
/// 2. Normalize path: remove dot segments, duplicate and trailing slashes
/// 3. Remove fragment (listing links carry client-side routing there)
/// 4. Remove tracking query parameters, sort the rest, drop an empty query
///
/// Scheme and host are kept as given apart from the lowercasing `url` applies.
///
/// # Examples
///
/// ```
/// use prop_sieve::locator::normalize_locator;
///
/// let url = normalize_locator("https://www.example.com/properties/123/#/?channel=RES_BUY").unwrap();
/// assert_eq!(url.as_str(), "https://www.example.com/properties/123");
/// ```
pub fn normalize_locator(locator: &str) -> Result<Url, ParseError> {
    let mut url = Url::parse(locator).map_err(|e| ParseError::Locator(format!("{}: {}", locator, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ParseError::Locator(format!(
            "unsupported scheme '{}' in {}",
            url.scheme(),
            locator
        )));
    }
    if url.host_str().is_none() {
        return Err(ParseError::Locator(format!("missing host in {}", locator)));
    }

    let path = normalize_path(url.path());
    url.set_path(&path);

    url.set_fragment(None);

    if url.query().is_some() {
        let params = filter_and_sort_query_params(&url);
        if params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(params);
        }
    }

    Ok(url)
}

/// Normalizes a URL path by removing dot segments and trailing slashes
fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    if segments.is_empty() {
        return "/".to_string();
    }
    format!("/{}", segments.join("/"))
}

/// Filters out tracking parameters and sorts remaining query parameters
fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    params.sort_by(|a, b| a.0.cmp(&b.0));
    params
}

fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAMS.contains(&key) || key.starts_with("utm_")
}
