//! Upstream document shapes and their normalization into [`Book`]
//!
//! The search endpoint and the work endpoint describe a book with different
//! field names and nesting. Each shape is a variant of [`Document`] with its
//! own mapping; nothing downstream looks at the raw shapes.

use serde::Deserialize;

use super::book::{cover_url, Book, CoverSize, LANGUAGE_KEY_PREFIX, SITE_URL, WORK_KEY_PREFIX};

// ============================================================================
// Search endpoint
// ============================================================================

/// Body of `GET /search.json`
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "numFound", default)]
    pub num_found: u64,
    #[serde(default)]
    pub docs: Vec<SearchDoc>,
}

/// Single document from a search response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchDoc {
    pub key: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub author_name: Vec<String>,
    pub cover_i: Option<i64>,
    pub first_publish_year: Option<i32>,
    #[serde(default)]
    pub publisher: Vec<String>,
    #[serde(default)]
    pub subject: Vec<String>,
    #[serde(default)]
    pub language: Vec<String>,
}

// ============================================================================
// Work endpoint
// ============================================================================

/// Body of `GET /works/{id}.json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkDoc {
    pub key: Option<String>,
    pub title: Option<String>,
    pub description: Option<Description>,
    #[serde(default)]
    pub authors: Vec<Option<AuthorRole>>,
    pub first_publish_date: Option<String>,
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub subject_places: Vec<String>,
    #[serde(default)]
    pub subject_times: Vec<String>,
    #[serde(default)]
    pub covers: Vec<i64>,
    pub number_of_pages: Option<u32>,
    #[serde(default)]
    pub language: Vec<Option<LanguageRef>>,
    pub ratings_average: Option<f64>,
    pub ratings_count: Option<u64>,
    #[serde(default)]
    pub publishers: Vec<String>,
}

/// Work descriptions arrive either as a bare string or as a typed text object
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Description {
    Text(String),
    Wrapped { value: Option<String> },
}

impl Description {
    /// Plain text, whichever encoding was used
    pub fn into_text(self) -> Option<String> {
        match self {
            Description::Text(text) => Some(text),
            Description::Wrapped { value } => value,
        }
    }
}

/// Author wrapper on a work (`{"author": {"key": ..., "name": ...}}`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorRole {
    pub author: Option<AuthorRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorRef {
    pub name: Option<String>,
}

/// Structured language reference (`{"key": "/languages/eng"}`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LanguageRef {
    pub key: Option<String>,
}

/// Placeholder for a work author whose name the catalog did not inline
pub const UNKNOWN_AUTHOR: &str = "Unknown";

// ============================================================================
// Normalization
// ============================================================================

/// One upstream record, tagged by the endpoint it came from
#[derive(Debug, Clone)]
pub enum Document {
    /// Entry from a search result page
    Search(SearchDoc),
    /// Work detail; the id comes from the caller since the body only has a key path
    Work { id: String, doc: WorkDoc },
}

impl Document {
    /// Map the record onto the canonical [`Book`]
    ///
    /// Total over missing fields: every optional upstream field has a fallback.
    pub fn normalize(&self) -> Book {
        match self {
            Document::Search(doc) => normalize_search_doc(doc),
            Document::Work { id, doc } => normalize_work_doc(id, doc),
        }
    }
}

fn normalize_search_doc(doc: &SearchDoc) -> Book {
    let id = doc
        .key
        .as_deref()
        .map(|key| strip_prefix_or_keep(key, WORK_KEY_PREFIX))
        .unwrap_or_default();

    Book {
        id,
        title: doc.title.clone().unwrap_or_default(),
        authors: doc.author_name.clone(),
        thumbnail: doc.cover_i.map(|c| cover_url(c, CoverSize::Medium)),
        small_thumbnail: doc.cover_i.map(|c| cover_url(c, CoverSize::Small)),
        published_date: doc.first_publish_year.map(|y| y.to_string()),
        publisher: first_non_empty(&doc.publisher),
        categories: doc.subject.clone(),
        language: first_non_empty(&doc.language),
        ..Default::default()
    }
}

fn normalize_work_doc(id: &str, doc: &WorkDoc) -> Book {
    let authors = doc
        .authors
        .iter()
        .flatten()
        .map(|role| {
            role.author
                .as_ref()
                .and_then(|a| non_empty(a.name.clone()))
                .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string())
        })
        .collect();

    let categories = doc
        .subjects
        .iter()
        .chain(&doc.subject_places)
        .chain(&doc.subject_times)
        .cloned()
        .collect();

    let cover = doc.covers.first().copied();

    let language = doc
        .language
        .iter()
        .flatten()
        .next()
        .and_then(|l| l.key.as_deref())
        .map(|key| strip_prefix_or_keep(key, LANGUAGE_KEY_PREFIX))
        .filter(|code| !code.is_empty());

    Book {
        id: id.to_string(),
        title: doc.title.clone().unwrap_or_default(),
        authors,
        description: doc
            .description
            .clone()
            .and_then(Description::into_text)
            .filter(|d| !d.is_empty()),
        thumbnail: cover.map(|c| cover_url(c, CoverSize::Medium)),
        small_thumbnail: cover.map(|c| cover_url(c, CoverSize::Small)),
        published_date: non_empty(doc.first_publish_date.clone()),
        publisher: first_non_empty(&doc.publishers),
        page_count: doc.number_of_pages,
        categories,
        average_rating: doc.ratings_average,
        ratings_count: doc.ratings_count,
        language,
        preview_link: doc
            .key
            .as_deref()
            .filter(|k| !k.is_empty())
            .map(|key| format!("{}{}", SITE_URL, key)),
    }
}

fn strip_prefix_or_keep(value: &str, prefix: &str) -> String {
    value.strip_prefix(prefix).unwrap_or(value).to_string()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn first_non_empty(values: &[String]) -> Option<String> {
    non_empty(values.first().cloned())
}
