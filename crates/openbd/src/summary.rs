use serde::{Deserialize, Serialize};

/// Column names of the exported table, in output order.
pub const COLUMNS: [&str; 8] = [
    "isbn",
    "title",
    "volume",
    "series",
    "publisher",
    "pubdate",
    "cover",
    "author",
];

/// The `summary` part of an openBD record, the subset of a record exported as one row.
///
/// Fields are declared in [`COLUMNS`] order, which is also their serialization order. Fields the
/// API leaves out or sets to `null` are `None` and end up as empty cells.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Summary {
    /// ISBN-13 of the book, or ISBN-10 for older titles.
    pub isbn: Option<String>,
    /// Title.
    pub title: Option<String>,
    /// Volume number or label within a multi-volume work.
    pub volume: Option<String>,
    /// Series title.
    pub series: Option<String>,
    /// Publisher name.
    pub publisher: Option<String>,
    /// Publication date as given by the publisher, e.g. `20111104` or `1998-12`.
    pub pubdate: Option<String>,
    /// Url of the cover image, empty when openBD has none.
    pub cover: Option<String>,
    /// Authors with their roles, as one string.
    pub author: Option<String>,
}

/// A metadata record returned by the openBD `get` endpoint.
///
/// Only the `summary` member is kept; `onix` and `hanmoto` are skipped during deserialization.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Book {
    /// Summary of the record.
    pub summary: Summary,
}
