//! Terminal rendering for books, facets, and result pages

use colored::Colorize;

use crate::catalog::Book;
use crate::filter::{Facets, Filters};

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

pub const LOAD_FAILED: &str = "Failed to load books. Please try again later.";
pub const DETAIL_FAILED: &str = "Failed to load book details.";
pub const NO_RESULTS: &str = "No books found. Try another search.";
pub const NO_MATCHES: &str = "No books match your filter criteria. Try adjusting your filters.";

/// Human name for the common language codes, else the code itself
pub fn language_label(code: &str) -> &str {
    match code {
        "eng" => "English",
        "spa" => "Spanish",
        "fre" => "French",
        "ger" => "German",
        "ita" => "Italian",
        other => other,
    }
}

pub fn title(book: &Book) -> &str {
    if book.title.is_empty() {
        UNKNOWN_TITLE
    } else {
        &book.title
    }
}

pub fn authors(book: &Book) -> String {
    if book.authors.is_empty() {
        UNKNOWN_AUTHOR.to_string()
    } else {
        book.authors.join(", ")
    }
}

/// Five stars: full ones for the integer part, a half for a fraction of .5 or more
pub fn star_rating(rating: f64) -> String {
    let rating = rating.clamp(0.0, 5.0);
    let full = rating.floor() as usize;
    let half = rating.fract() >= 0.5;

    let mut stars = String::new();
    for i in 0..5 {
        if i < full {
            stars.push('★');
        } else if i == full && half {
            stars.push('½');
        } else {
            stars.push('☆');
        }
    }
    format!("{} {:.1}", stars, rating)
}

/// Simple text wrapping without external dependency
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current_line = String::new();

        for word in paragraph.split_whitespace() {
            if current_line.is_empty() {
                current_line = word.to_string();
            } else if current_line.len() + 1 + word.len() <= width {
                current_line.push(' ');
                current_line.push_str(word);
            } else {
                lines.push(current_line);
                current_line = word.to_string();
            }
        }

        if !current_line.is_empty() {
            lines.push(current_line);
        }
    }
    lines
}

fn print_field(label: &str, value: Option<&str>) {
    if let Some(v) = value {
        println!("{:>12}: {}", label.cyan(), v);
    }
}

/// Numbered list of books, numbering from `first_number`
pub fn print_book_list(books: &[&Book], first_number: usize) {
    for (i, book) in books.iter().enumerate() {
        println!(
            "{:>3}. {}",
            first_number + i,
            title(book).bold()
        );
        println!("     by {}", authors(book).cyan());

        let mut details = Vec::new();
        if let Some(date) = &book.published_date {
            details.push(date.clone());
        }
        if let Some(language) = &book.language {
            details.push(language_label(language).to_string());
        }
        if let Some(publisher) = &book.publisher {
            details.push(publisher.clone());
        }
        if !details.is_empty() {
            println!("     {}", details.join(" · ").yellow());
        }

        println!("     {}", format!("id: {}", book.id).dimmed());
        println!();
    }
}

/// Filter choices available on the loaded page
pub fn print_facets(facets: &Facets) {
    let (languages, hidden_languages) = facets.display_languages();
    if !languages.is_empty() {
        let labels: Vec<String> = languages
            .iter()
            .map(|code| format!("{} ({})", language_label(code), code))
            .collect();
        print!("{} {}", "Languages:".cyan(), labels.join(", "));
        if hidden_languages > 0 {
            print!(" {}", format!("+{} more", hidden_languages).dimmed());
        }
        println!();
    }

    let (subjects, hidden_subjects) = facets.display_subjects();
    if !subjects.is_empty() {
        print!("{} {}", "Subjects:".cyan(), subjects.join(", "));
        if hidden_subjects > 0 {
            print!(" {}", format!("+{} more", hidden_subjects).dimmed());
        }
        println!();
    }
}

/// One-line summary of the active filters, or None when nothing is set
pub fn describe_filters(filters: &Filters) -> Option<String> {
    if filters.is_empty() {
        return None;
    }

    let mut parts = Vec::new();
    if !filters.languages.is_empty() {
        let languages: Vec<&str> = filters.languages.iter().map(|l| language_label(l)).collect();
        parts.push(format!("language: {}", languages.join(" | ")));
    }
    if !filters.subjects.is_empty() {
        let subjects: Vec<&str> = filters.subjects.iter().map(String::as_str).collect();
        parts.push(format!("subject: {}", subjects.join(" | ")));
    }
    let range = filters.year_range;
    if range.is_set() {
        let from = range.min.map(|y| y.to_string()).unwrap_or_default();
        let to = range.max.map(|y| y.to_string()).unwrap_or_default();
        parts.push(format!("years: {}-{}", from, to));
    }
    Some(parts.join(", "))
}

/// Full detail view of a single work
pub fn print_book_detail(book: &Book, quiet: bool) {
    if !quiet {
        println!("{}", title(book).bold());
        println!("{}", "─".repeat(40));
    }

    print_field("Authors", Some(&authors(book)));
    if let Some(rating) = book.average_rating {
        let mut line = star_rating(rating);
        if let Some(count) = book.ratings_count {
            line.push_str(&format!(" ({} ratings)", count));
        }
        print_field("Rating", Some(&line));
    }
    print_field("Published", book.published_date.as_deref());
    print_field("Publisher", book.publisher.as_deref());
    if let Some(pages) = book.page_count {
        print_field("Pages", Some(&pages.to_string()));
    }
    print_field("Language", book.language.as_deref().map(language_label));
    print_field("Cover", book.cover());
    print_field("Preview", book.preview_link.as_deref());
    print_field("ID", Some(&book.id));

    if !book.categories.is_empty() {
        println!();
        println!("{}", "Subjects:".cyan());
        for line in wrap(&book.categories.join(", "), 78) {
            println!("  {}", line);
        }
    }

    if let Some(desc) = &book.description {
        println!();
        println!("{}", "Description:".cyan());
        for line in wrap(desc, 80) {
            println!("  {}", line);
        }
    }
}
