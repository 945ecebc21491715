//! Field extraction rules for listing detail pages
//!
//! Each field has its own rule. A rule that fails (missing element, placeholder
//! text, unparsable number) only costs that field its value: the default is
//! substituted and the rest of the record is kept.

use crate::model::Record;
use crate::site::text::{collapse_whitespace, first_count, first_number, is_unknown_value};
use crate::site::RecordExtractor;
use crate::ParseError;
use scraper::{ElementRef, Html, Selector};
use std::fmt::Display;

const STREET: &str = r#"h1[itemprop="streetAddress"]"#;
const PRICE: &str = r#"[data-testid="primaryPrice"]"#;
const REEL_ENTRY: &str = r#"dl[data-test="infoReel"] > div"#;

/// Extracts records from listing detail pages
///
/// Property type, bedrooms, bathrooms, size and tenure come from the
/// "info reel" (`dt` label / `dd` value pairs); street and price have
/// dedicated elements.
#[derive(Debug, Clone, Default)]
pub struct PropertyPageExtractor;

impl PropertyPageExtractor {
    pub fn new() -> Self {
        Self
    }

    fn text_of(&self, document: &Html, css: &str, field: &'static str) -> Result<String, ParseError> {
        let selector = selector(css, field)?;
        document
            .select(&selector)
            .next()
            .map(|element| collapse_whitespace(&element.text().collect::<String>()))
            .filter(|text| !text.is_empty())
            .ok_or(ParseError::MissingField(field))
    }

    /// Looks up the value of an info-reel entry by its label
    fn reel_value(&self, document: &Html, label: &'static str) -> Result<String, ParseError> {
        let field = label_field(label);
        let entries = selector(REEL_ENTRY, field)?;
        let dt = selector("dt", field)?;
        let dd = selector("dd", field)?;

        document
            .select(&entries)
            .find(|entry| first_text(entry, &dt).is_some_and(|text| text.eq_ignore_ascii_case(label)))
            .and_then(|entry| first_text(&entry, &dd))
            .ok_or(ParseError::MissingField(field))
    }

    fn street(&self, document: &Html) -> Result<String, ParseError> {
        self.text_of(document, STREET, "street")
    }

    fn price(&self, document: &Html) -> Result<u64, ParseError> {
        let text = self.text_of(document, PRICE, "price")?;
        first_number("price", &text)
    }

    fn property_type(&self, document: &Html) -> Result<String, ParseError> {
        let text = self.reel_value(document, "PROPERTY TYPE")?;
        if is_unknown_value(&text) {
            return Err(ParseError::Unknown("propertyType"));
        }
        Ok(text)
    }

    fn beds(&self, document: &Html) -> Result<u32, ParseError> {
        first_count("beds", &self.reel_value(document, "BEDROOMS")?)
    }

    fn baths(&self, document: &Html) -> Result<u32, ParseError> {
        first_count("baths", &self.reel_value(document, "BATHROOMS")?)
    }

    fn size(&self, document: &Html) -> Result<u32, ParseError> {
        first_count("size", &self.reel_value(document, "SIZE")?)
    }

    fn tenure(&self, document: &Html) -> Result<String, ParseError> {
        normalize_tenure(&self.reel_value(document, "TENURE")?)
    }
}

impl RecordExtractor for PropertyPageExtractor {
    fn extract(&self, locator: &str, content: &str) -> Record {
        let document = Html::parse_document(content);

        Record {
            url: locator.to_string(),
            street: or_default(locator, "street", self.street(&document)),
            property_type: or_default(locator, "propertyType", self.property_type(&document)),
            beds: or_default(locator, "beds", self.beds(&document)),
            baths: or_default(locator, "baths", self.baths(&document)),
            size: or_default(locator, "size", self.size(&document)),
            tenure: or_default(locator, "tenure", self.tenure(&document)),
            price: or_default(locator, "price", self.price(&document)),
        }
    }
}

/// Substitutes the field default for a failed rule
fn or_default<T: Default, E: Display>(locator: &str, field: &str, result: Result<T, E>) -> T {
    result.unwrap_or_else(|e| {
        tracing::debug!("Defaulting {} for {}: {}", field, locator, e);
        T::default()
    })
}

fn selector(css: &str, field: &'static str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|_| ParseError::MissingField(field))
}

fn first_text(entry: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    entry
        .select(selector)
        .next()
        .map(|e| collapse_whitespace(&e.text().collect::<String>()))
}

fn label_field(label: &'static str) -> &'static str {
    match label {
        "PROPERTY TYPE" => "propertyType",
        "BEDROOMS" => "beds",
        "BATHROOMS" => "baths",
        "SIZE" => "size",
        "TENURE" => "tenure",
        other => other,
    }
}

/// Maps displayed tenure text onto the search service's classification
///
/// `"Share of Freehold"` → `SHARE_OF_FREEHOLD`; unknown wording is upper-cased
/// with spaces replaced by underscores.
pub fn normalize_tenure(text: &str) -> Result<String, ParseError> {
    if is_unknown_value(text) {
        return Err(ParseError::Unknown("tenure"));
    }
    Ok(collapse_whitespace(text)
        .to_uppercase()
        .replace([' ', '-'], "_"))
}
