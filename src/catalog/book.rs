//! Canonical book record shared by every view
//!
//! Both upstream document shapes normalize into [`Book`]. A field that the
//! upstream did not supply (or supplied as an empty string) is `None`;
//! rendering a placeholder is left to the display layer.

use serde::Serialize;

/// Public site, used for preview links
pub const SITE_URL: &str = "https://openlibrary.org";

/// Cover image host
pub const COVERS_URL: &str = "https://covers.openlibrary.org";

/// Leading path segment on search-result work keys
pub const WORK_KEY_PREFIX: &str = "/works/";

/// Leading path segment on structured language keys
pub const LANGUAGE_KEY_PREFIX: &str = "/languages/";

/// Cover image size variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverSize {
    Small,
    Medium,
}

impl CoverSize {
    /// Size suffix used in the cover URL
    pub fn suffix(&self) -> &'static str {
        match self {
            CoverSize::Small => "S",
            CoverSize::Medium => "M",
        }
    }
}

/// Build the cover URL for a numeric cover id
pub fn cover_url(cover_id: i64, size: CoverSize) -> String {
    format!("{}/b/id/{}-{}.jpg", COVERS_URL, cover_id, size.suffix())
}

/// A book as every view consumes it, regardless of which endpoint produced it
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub small_thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratings_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_link: Option<String>,
}

impl Book {
    /// Best available cover, preferring the medium size
    pub fn cover(&self) -> Option<&str> {
        self.thumbnail
            .as_deref()
            .or(self.small_thumbnail.as_deref())
    }

    /// Year parsed from the first four characters of `published_date`
    ///
    /// All four must be ASCII digits. Returns `None` for absent or short
    /// dates and for text dates such as "June 5, 2001".
    pub fn published_year(&self) -> Option<i32> {
        let date = self.published_date.as_deref()?;
        let prefix = date.get(..4)?;
        if !prefix.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        prefix.parse().ok()
    }
}
