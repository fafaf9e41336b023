//! Facet extraction: the filter choices available in the loaded page
//!
//! Facets are computed from the books currently in memory, never from the
//! whole remote catalog. A language that only appears on page 3 is not
//! offered while page 1 is loaded.

use std::collections::BTreeSet;

use crate::catalog::Book;

/// Language choices offered to the user
pub const DISPLAY_LANGUAGES: usize = 5;

/// Subject choices offered to the user
pub const DISPLAY_SUBJECTS: usize = 8;

/// Distinct filter values present in a result set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Facets {
    pub languages: BTreeSet<String>,
    pub subjects: BTreeSet<String>,
}

impl Facets {
    /// Languages to offer, and how many were left out
    pub fn display_languages(&self) -> (Vec<&str>, usize) {
        truncate(&self.languages, DISPLAY_LANGUAGES)
    }

    /// Subjects to offer, and how many were left out
    pub fn display_subjects(&self) -> (Vec<&str>, usize) {
        truncate(&self.subjects, DISPLAY_SUBJECTS)
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty() && self.subjects.is_empty()
    }
}

fn truncate(values: &BTreeSet<String>, limit: usize) -> (Vec<&str>, usize) {
    let shown: Vec<&str> = values.iter().take(limit).map(String::as_str).collect();
    let hidden = values.len().saturating_sub(shown.len());
    (shown, hidden)
}

/// Collect distinct non-empty languages and subjects across `books`
pub fn extract_facets(books: &[Book]) -> Facets {
    let languages = books
        .iter()
        .filter_map(|b| b.language.as_deref())
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect();

    let subjects = books
        .iter()
        .flat_map(|b| b.categories.iter())
        .filter(|s| !s.is_empty())
        .cloned()
        .collect();

    Facets {
        languages,
        subjects,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(language: Option<&str>, categories: &[&str]) -> Book {
        Book {
            language: language.map(String::from),
            categories: categories.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_languages_deduplicated_and_absent_excluded() {
        let books = vec![
            book(Some("eng"), &[]),
            book(Some("eng"), &[]),
            book(Some("spa"), &[]),
            book(None, &[]),
        ];
        let facets = extract_facets(&books);
        let expected: BTreeSet<String> = ["eng", "spa"].iter().map(|s| s.to_string()).collect();
        assert_eq!(facets.languages, expected);
    }

    #[test]
    fn test_subjects_flattened_across_books() {
        let books = vec![
            book(None, &["Fantasy", "Dragons"]),
            book(None, &["Fantasy", ""]),
            book(None, &[]),
        ];
        let facets = extract_facets(&books);
        assert_eq!(
            facets.subjects.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["Dragons", "Fantasy"]
        );
    }

    #[test]
    fn test_empty_result_set() {
        assert!(extract_facets(&[]).is_empty());
    }

    #[test]
    fn test_display_truncation() {
        let books: Vec<Book> = (0..7)
            .map(|i| book(Some(format!("l{}", i).as_str()), &[]))
            .collect();
        let facets = extract_facets(&books);
        let (shown, hidden) = facets.display_languages();
        assert_eq!(shown, vec!["l0", "l1", "l2", "l3", "l4"]);
        assert_eq!(hidden, 2);

        let (subjects, hidden) = facets.display_subjects();
        assert!(subjects.is_empty());
        assert_eq!(hidden, 0);
    }
}
