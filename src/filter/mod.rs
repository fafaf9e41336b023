//! Client-side filtering of a loaded result set
//!
//! Checks are conjunctive across categories and disjunctive within one.
//! Every check is fail-open: a book whose language, subjects or date are
//! missing (or whose date has no numeric year) is never excluded by that
//! check.

mod facets;

pub use facets::{extract_facets, Facets};

use std::collections::BTreeSet;

use crate::catalog::Book;

/// Inclusive publication year bounds; an unset side is unconstrained
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct YearRange {
    pub min: Option<i32>,
    pub max: Option<i32>,
}

impl YearRange {
    pub fn new(min: Option<i32>, max: Option<i32>) -> Self {
        Self { min, max }
    }

    pub fn is_set(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }

    pub fn contains(&self, year: i32) -> bool {
        self.min.map_or(true, |min| year >= min) && self.max.map_or(true, |max| year <= max)
    }
}

/// Active filter state for one view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub languages: BTreeSet<String>,
    pub subjects: BTreeSet<String>,
    pub year_range: YearRange,
}

impl Filters {
    /// True when no check constrains anything
    pub fn is_empty(&self) -> bool {
        self.languages.is_empty() && self.subjects.is_empty() && !self.year_range.is_set()
    }

    /// Add the subject if absent, remove it if present
    pub fn toggle_subject(&mut self, subject: &str) {
        if !self.subjects.remove(subject) {
            self.subjects.insert(subject.to_string());
        }
    }

    /// Whether `book` passes all three checks
    pub fn matches(&self, book: &Book) -> bool {
        self.language_ok(book) && self.subject_ok(book) && self.year_ok(book)
    }

    fn language_ok(&self, book: &Book) -> bool {
        match book.language.as_deref() {
            Some(language) if !self.languages.is_empty() => self.languages.contains(language),
            _ => true,
        }
    }

    fn subject_ok(&self, book: &Book) -> bool {
        if self.subjects.is_empty() || book.categories.is_empty() {
            return true;
        }
        book.categories.iter().any(|c| self.subjects.contains(c))
    }

    fn year_ok(&self, book: &Book) -> bool {
        if !self.year_range.is_set() {
            return true;
        }
        book.published_year()
            .map_or(true, |year| self.year_range.contains(year))
    }
}

/// Books that passed the filters, plus the facets of the unfiltered set
#[derive(Debug)]
pub struct FilterOutcome<'a> {
    pub books: Vec<&'a Book>,
    pub facets: Facets,
}

/// Narrow `books` by `filters` and collect facets from the full set
pub fn apply_filters<'a>(books: &'a [Book], filters: &Filters) -> FilterOutcome<'a> {
    FilterOutcome {
        books: books.iter().filter(|b| filters.matches(b)).collect(),
        facets: extract_facets(books),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(id: &str, language: Option<&str>, categories: &[&str], date: Option<&str>) -> Book {
        Book {
            id: id.to_string(),
            language: language.map(String::from),
            categories: categories.iter().map(|s| s.to_string()).collect(),
            published_date: date.map(String::from),
            ..Default::default()
        }
    }

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn ids(outcome: &FilterOutcome) -> Vec<String> {
        outcome.books.iter().map(|b| b.id.clone()).collect()
    }

    fn sample() -> Vec<Book> {
        vec![
            book("a", Some("eng"), &["Fantasy", "Dragons"], Some("1999")),
            book("b", Some("spa"), &["Romance"], Some("2005")),
            book("c", None, &[], None),
            book("d", Some("fre"), &["Fantasy"], Some("June 1, 1970")),
        ]
    }

    #[test]
    fn test_empty_filters_is_identity() {
        let books = sample();
        let outcome = apply_filters(&books, &Filters::default());
        assert_eq!(outcome.books.len(), books.len());
        assert!(outcome.books.iter().zip(&books).all(|(a, b)| *a == b));
    }

    #[test]
    fn test_language_filter_is_disjunctive() {
        let books = sample();
        let filters = Filters {
            languages: set(&["eng", "spa"]),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(&books, &filters)), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_absent_language_never_excluded() {
        let books = vec![book("c", None, &[], None)];
        let filters = Filters {
            languages: set(&["ger"]),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(&books, &filters)), vec!["c"]);
    }

    #[test]
    fn test_subject_filter_any_overlap() {
        let books = sample();
        let filters = Filters {
            subjects: set(&["Dragons", "Romance"]),
            ..Default::default()
        };
        // "c" has no categories, so the check does not apply to it
        assert_eq!(ids(&apply_filters(&books, &filters)), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_year_filter_bounds() {
        let nineties = vec![book("x", None, &[], Some("1999"))];

        let from_2000 = Filters {
            year_range: YearRange::new(Some(2000), None),
            ..Default::default()
        };
        assert!(apply_filters(&nineties, &from_2000).books.is_empty());

        let in_range = Filters {
            year_range: YearRange::new(Some(1990), Some(2000)),
            ..Default::default()
        };
        assert_eq!(apply_filters(&nineties, &in_range).books.len(), 1);

        let until_1998 = Filters {
            year_range: YearRange::new(None, Some(1998)),
            ..Default::default()
        };
        assert!(apply_filters(&nineties, &until_1998).books.is_empty());
    }

    #[test]
    fn test_year_filter_unparsable_dates_pass() {
        let books = vec![
            book("empty", None, &[], Some("")),
            book("none", None, &[], None),
            book("text", None, &[], Some("June 1, 1970")),
        ];
        let filters = Filters {
            year_range: YearRange::new(Some(2000), Some(2010)),
            ..Default::default()
        };
        assert_eq!(
            ids(&apply_filters(&books, &filters)),
            vec!["empty", "none", "text"]
        );
    }

    #[test]
    fn test_checks_are_conjunctive() {
        let books = sample();
        let filters = Filters {
            languages: set(&["eng", "fre"]),
            subjects: set(&["Fantasy"]),
            year_range: YearRange::new(Some(1990), None),
        };
        // "d" passes language and subject, its text date is not excluded
        assert_eq!(ids(&apply_filters(&books, &filters)), vec!["a", "c", "d"]);

        let strict = Filters {
            languages: set(&["spa"]),
            subjects: set(&["Fantasy"]),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(&books, &strict)), vec!["c"]);
    }

    #[test]
    fn test_facets_come_from_unfiltered_set() {
        let books = sample();
        let filters = Filters {
            languages: set(&["eng"]),
            ..Default::default()
        };
        let outcome = apply_filters(&books, &filters);
        assert_eq!(outcome.facets.languages, set(&["eng", "fre", "spa"]));
    }

    #[test]
    fn test_toggle_subject() {
        let mut filters = Filters::default();
        filters.toggle_subject("Fantasy");
        assert!(filters.subjects.contains("Fantasy"));
        assert!(!filters.is_empty());
        filters.toggle_subject("Fantasy");
        assert!(filters.is_empty());
    }
}
