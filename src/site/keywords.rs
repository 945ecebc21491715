use crate::site::text::page_text;
use crate::site::Predicate;

/// Passes pages whose visible text mentions any configured keyword
///
/// Keywords are trimmed and compared case-insensitively; blank keywords are
/// ignored. With no keywords every page passes.
#[derive(Debug, Clone, Default)]
pub struct KeywordPredicate {
    keywords: Vec<String>,
}

impl KeywordPredicate {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Case-insensitive containment of any keyword in already extracted text
    pub fn matches_text(&self, text: &str) -> bool {
        if self.keywords.is_empty() {
            return true;
        }
        let haystack = text.to_lowercase();
        self.keywords.iter().any(|k| haystack.contains(k.as_str()))
    }
}

impl Predicate for KeywordPredicate {
    fn matches(&self, content: &str) -> bool {
        if self.keywords.is_empty() {
            return true;
        }
        self.matches_text(&page_text(content))
    }
}
