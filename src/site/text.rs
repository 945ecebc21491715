//! Text helpers shared by predicates and extraction rules

use crate::ParseError;
use scraper::{Html, Node};

/// Elements whose text never reaches the reader
const INVISIBLE_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Collects the visible text of an HTML document, whitespace collapsed
///
/// Plain text input comes back unchanged apart from whitespace collapsing.
pub fn page_text(content: &str) -> String {
    let document = Html::parse_document(content);
    let mut text = String::new();

    for node in document.root_element().descendants() {
        let Node::Text(fragment) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|e| INVISIBLE_ELEMENTS.contains(&e.name()))
        });
        if !hidden {
            text.push_str(fragment);
            text.push(' ');
        }
    }

    collapse_whitespace(&text)
}

/// Replaces line breaks and runs of whitespace with single spaces and trims
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Placeholders the site shows instead of a value
pub fn is_unknown_value(text: &str) -> bool {
    let t = text.trim().to_lowercase();
    t.is_empty() || t == "ask agent" || t == "ask developer"
}

/// Parses the first number in `text`, allowing thousands separators
///
/// `"1,023 sq ft / 95 sq m"` → 1023, `"£450,000"` → 450000.
pub fn first_number(field: &'static str, text: &str) -> Result<u64, ParseError> {
    if is_unknown_value(text) {
        return Err(ParseError::Unknown(field));
    }

    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit() || *c == ',')
        .filter(char::is_ascii_digit)
        .collect();

    digits.parse().map_err(|_| ParseError::InvalidNumber {
        field,
        text: text.to_string(),
    })
}

/// Like [`first_number`] for small counts
pub fn first_count(field: &'static str, text: &str) -> Result<u32, ParseError> {
    let value = first_number(field, text)?;
    u32::try_from(value).map_err(|_| ParseError::InvalidNumber {
        field,
        text: text.to_string(),
    })
}
