use serde::Serialize;

/// Column order of the exported records
pub const RECORD_COLUMNS: [&str; 8] = [
    "url",
    "street",
    "propertyType",
    "beds",
    "baths",
    "size",
    "tenure",
    "price",
];

/// A structured listing extracted from one passed locator
///
/// Field defaults (`""`, `0`) stand in for values the page did not disclose
/// or that could not be parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Locator the record was extracted from
    pub url: String,

    /// Display address, whitespace collapsed
    pub street: String,

    /// Property type as described by the listing
    pub property_type: String,

    pub beds: u32,
    pub baths: u32,

    /// Floor area in square feet
    pub size: u32,

    /// Tenure classification (`FREEHOLD`, `LEASEHOLD`, `SHARE_OF_FREEHOLD`, ...)
    pub tenure: String,

    /// Asking price in whole pounds
    pub price: u64,
}

impl Record {
    /// Creates an empty record for a locator
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}
