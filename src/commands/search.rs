//! Search command - fetch one page of results and filter it locally

use anyhow::{bail, Result};
use colored::Colorize;
use serde::Serialize;
use tracing::error;

use crate::catalog::{Book, SearchRequest};
use crate::cli::SearchArgs;
use crate::commands::{build_client, runtime};
use crate::config::Config;
use crate::display::{
    describe_filters, print_book_list, print_facets, LOAD_FAILED, NO_MATCHES, NO_RESULTS,
};
use crate::view::{Completion, Delivery, SearchView};

/// Run the search command
pub fn run(config: &Config, args: &SearchArgs, no_cache: bool, quiet: bool) -> Result<()> {
    let filters = args.filters()?;
    let query = config.query(args.query().as_deref());
    let limit = config.page_size(args.limit);
    let request = match args.start {
        Some(start) => SearchRequest::from_start_index(query, start, limit),
        None => SearchRequest::new(query, args.page, limit),
    };

    let client = build_client(config, no_cache)?;
    let rt = runtime()?;

    let mut view = SearchView::new();
    *view.filters_mut() = filters;
    let fetch = view.begin(request.clone());

    let result = rt.block_on(client.search(&request));
    let completion = Completion {
        fetch,
        request,
        result,
    };
    if let Delivery::Failed(e) = view.receive(completion) {
        error!(url = e.url(), "search failed: {}", e);
        bail!(LOAD_FAILED);
    }

    if args.json {
        print_json(&view, args.facets)
    } else {
        render_view(&view, args.facets, quiet);
        Ok(())
    }
}

/// Print the loaded page of a view: header, filtered books, and page position
pub fn render_view(view: &SearchView, show_facets: bool, quiet: bool) {
    let Some(request) = view.current() else {
        return;
    };
    let outcome = view.visible();

    if !quiet {
        println!();
        println!("{}", format!("Results for \"{}\"", request.query).bold());
        if let Some(active) = describe_filters(view.filters()) {
            println!("{} {}", "Filters:".cyan(), active);
        }
        println!();
    }

    if view.books().is_empty() {
        println!("{}", NO_RESULTS);
    } else if outcome.books.is_empty() {
        println!("{}", NO_MATCHES);
    } else {
        print_book_list(&outcome.books, 1);
    }

    if !quiet && !view.books().is_empty() {
        let first = request.start_index() + 1;
        let last = request.start_index() + view.books().len() as u64;
        println!(
            "{}",
            format!(
                "Showing {} of {} on this page · results {}-{} of {} · page {} of {}",
                outcome.books.len(),
                view.books().len(),
                first,
                last,
                view.total_items(),
                request.page,
                view.total_pages().max(request.page)
            )
            .dimmed()
        );
    }

    if show_facets && !outcome.facets.is_empty() {
        println!();
        print_facets(&outcome.facets);
    }
}

fn print_json(view: &SearchView, include_facets: bool) -> Result<()> {
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct JsonFacets<'a> {
        languages: Vec<&'a str>,
        subjects: Vec<&'a str>,
    }

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct JsonPage<'a> {
        query: &'a str,
        page: u32,
        limit: u32,
        total_items: u64,
        total_pages: u32,
        filtered_count: usize,
        items: Vec<&'a Book>,
        #[serde(skip_serializing_if = "Option::is_none")]
        facets: Option<JsonFacets<'a>>,
    }

    let Some(request) = view.current() else {
        return Ok(());
    };
    let outcome = view.visible();

    let facets = include_facets.then(|| JsonFacets {
        languages: outcome.facets.languages.iter().map(String::as_str).collect(),
        subjects: outcome.facets.subjects.iter().map(String::as_str).collect(),
    });

    let page = JsonPage {
        query: &request.query,
        page: request.page,
        limit: request.limit,
        total_items: view.total_items(),
        total_pages: view.total_pages(),
        filtered_count: outcome.books.len(),
        items: outcome.books.clone(),
        facets,
    };

    let json = serde_json::to_string_pretty(&page)?;
    println!("{}", json);

    Ok(())
}
