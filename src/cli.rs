use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::filter::{Filters, YearRange};

#[derive(Parser)]
#[command(name = "bookbrowse")]
#[command(about = "Search, filter, and browse books from the Open Library catalog")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase output verbosity
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to an alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Bypass the response cache for this run
    #[arg(long, global = true)]
    pub no_cache: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search the catalog and filter the returned page
    Search(SearchArgs),

    /// Show details for a single work
    Show {
        /// Work id (e.g. OL45804W or /works/OL45804W)
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Interactive session: search, page, and filter without restarting
    Browse {
        /// Initial search query (the configured default when omitted)
        query: Vec<String>,

        /// Results per page (uses config default if not specified)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
        limit: Option<u32>,
    },

    /// Inspect or clear the response cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Print the cache directory
    Path,

    /// Delete all cached responses
    Clear,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Search terms (uses the configured default query if empty)
    pub query: Vec<String>,

    /// Page number, starting at 1
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,

    /// Zero-based index of the first result; selects the page containing it
    #[arg(long, value_name = "INDEX", conflicts_with = "page")]
    pub start: Option<u32>,

    /// Results per page (uses config default if not specified)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub limit: Option<u32>,

    /// Keep books in these languages (repeatable or comma-separated, e.g. eng,spa)
    #[arg(long = "lang", value_name = "CODE", value_delimiter = ',')]
    pub languages: Vec<String>,

    /// Keep books with any of these subjects (repeatable)
    #[arg(long = "subject", value_name = "SUBJECT")]
    pub subjects: Vec<String>,

    /// Earliest publication year
    #[arg(long, value_name = "YEAR")]
    pub from: Option<i32>,

    /// Latest publication year
    #[arg(long, value_name = "YEAR")]
    pub to: Option<i32>,

    /// Also list the languages and subjects available on this page
    #[arg(long)]
    pub facets: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl SearchArgs {
    /// Search terms joined into one query string
    pub fn query(&self) -> Option<String> {
        if self.query.is_empty() {
            None
        } else {
            Some(self.query.join(" "))
        }
    }

    /// Filters described by the flags
    pub fn filters(&self) -> Result<Filters> {
        Ok(Filters {
            languages: collect_values(&self.languages),
            subjects: collect_values(&self.subjects),
            year_range: year_range(self.from, self.to)?,
        })
    }
}

fn collect_values(values: &[String]) -> BTreeSet<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(String::from)
        .collect()
}

/// Build a year range, rejecting one whose start is after its end
pub fn year_range(from: Option<i32>, to: Option<i32>) -> Result<YearRange> {
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            bail!("Invalid year range: {} is after {}", from, to);
        }
    }
    Ok(YearRange::new(from, to))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_args_parse() {
        let cli = Cli::parse_from([
            "bookbrowse",
            "search",
            "lord",
            "of",
            "the",
            "rings",
            "--lang",
            "eng,spa",
            "--subject",
            "Fantasy",
            "--from",
            "1950",
            "--limit",
            "10",
        ]);

        let Commands::Search(args) = cli.command else {
            panic!("expected search command");
        };
        assert_eq!(args.query().as_deref(), Some("lord of the rings"));
        assert_eq!(args.page, 1);
        assert_eq!(args.limit, Some(10));

        let filters = args.filters().unwrap();
        assert_eq!(
            filters.languages.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["eng", "spa"]
        );
        assert!(filters.subjects.contains("Fantasy"));
        assert_eq!(filters.year_range, YearRange::new(Some(1950), None));
    }

    #[test]
    fn test_empty_query_is_none() {
        let cli = Cli::parse_from(["bookbrowse", "search"]);
        let Commands::Search(args) = cli.command else {
            panic!("expected search command");
        };
        assert_eq!(args.query(), None);
        assert!(args.filters().unwrap().is_empty());
    }

    #[test]
    fn test_limit_out_of_range_rejected() {
        assert!(Cli::try_parse_from(["bookbrowse", "search", "x", "--limit", "0"]).is_err());
        assert!(Cli::try_parse_from(["bookbrowse", "search", "x", "--limit", "101"]).is_err());
        assert!(Cli::try_parse_from(["bookbrowse", "search", "x", "--page", "0"]).is_err());
        assert!(
            Cli::try_parse_from(["bookbrowse", "search", "x", "--page", "2", "--start", "8"])
                .is_err()
        );
    }

    #[test]
    fn test_inverted_year_range_rejected() {
        assert!(year_range(Some(2000), Some(1990)).is_err());
        assert!(year_range(Some(1990), Some(1990)).is_ok());
        assert!(year_range(None, Some(1990)).is_ok());
    }
}
