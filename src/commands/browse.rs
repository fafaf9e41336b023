//! Browse command - interactive search session over one view
//!
//! Searches run as background tasks and report back over a channel, so the
//! prompt stays responsive and a quick re-search does not wait for the
//! previous one. The view drops completions for superseded requests.

use anyhow::{Context, Result};
use colored::Colorize;
use std::io::{self, Write};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, error};

use crate::catalog::{CatalogClient, SearchRequest};
use crate::cli::year_range;
use crate::commands::search::render_view;
use crate::commands::show::show_work;
use crate::commands::{build_client, runtime};
use crate::config::Config;
use crate::display::{print_facets, LOAD_FAILED};
use crate::view::{Completion, Delivery, SearchView, ViewStatus};

const HELP: &str = "\
Commands:
  search [query]        start a new search; no query runs the default (alias: s)
  next | prev           move between pages (aliases: n, p)
  page <n>              jump to page n
  lang [codes...]       keep only these languages; no codes clears
  subject <name>        toggle a subject filter
  years <from> <to>     publication year range; use - for an open end
  clear                 remove all filters
  list                  show the current page again
  facets                languages and subjects on this page
  show <n|id>           details for result n or a work id
  help                  this text
  quit                  leave (alias: q)";

/// A parsed line of input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Search(String),
    Next,
    Prev,
    Page(u32),
    Languages(Vec<String>),
    Subject(String),
    Years(Option<i32>, Option<i32>),
    Clear,
    List,
    Facets,
    Show(String),
    Help,
    Quit,
    Nothing,
}

impl BrowseCommand {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_lowercase().as_str() {
            "" => BrowseCommand::Nothing,
            "search" | "s" => BrowseCommand::Search(rest.to_string()),
            "next" | "n" => BrowseCommand::Next,
            "prev" | "p" => BrowseCommand::Prev,
            "page" => {
                let page = rest
                    .parse::<u32>()
                    .map_err(|_| format!("Invalid page number: '{}'", rest))?;
                BrowseCommand::Page(page)
            }
            "lang" | "language" => BrowseCommand::Languages(
                rest.split(|c: char| c == ',' || c.is_whitespace())
                    .filter(|c| !c.is_empty())
                    .map(String::from)
                    .collect(),
            ),
            "subject" => {
                if rest.is_empty() {
                    return Err("Usage: subject <name>".to_string());
                }
                BrowseCommand::Subject(rest.to_string())
            }
            "years" => {
                let bounds: Vec<&str> = rest.split_whitespace().collect();
                let [from, to] = bounds.as_slice() else {
                    return Err("Usage: years <from|-> <to|->".to_string());
                };
                BrowseCommand::Years(parse_bound(from)?, parse_bound(to)?)
            }
            "clear" => BrowseCommand::Clear,
            "list" | "ls" => BrowseCommand::List,
            "facets" => BrowseCommand::Facets,
            "show" => {
                if rest.is_empty() {
                    return Err("Usage: show <n|id>".to_string());
                }
                BrowseCommand::Show(rest.to_string())
            }
            "help" | "?" => BrowseCommand::Help,
            "quit" | "q" | "exit" => BrowseCommand::Quit,
            other => return Err(format!("Unknown command: '{}'. Type 'help'.", other)),
        };

        Ok(command)
    }
}

fn parse_bound(value: &str) -> Result<Option<i32>, String> {
    if value == "-" {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| format!("Invalid year: '{}'", value))
}

pub fn run(
    config: &Config,
    initial_query: Option<String>,
    limit: Option<u32>,
    no_cache: bool,
) -> Result<()> {
    let client = Arc::new(build_client(config, no_cache)?);
    let limit = config.page_size(limit);
    let rt = runtime()?;

    rt.block_on(session(client, config, initial_query, limit))
}

struct Session {
    client: Arc<CatalogClient>,
    completions: UnboundedSender<Completion>,
    view: SearchView,
    default_query: String,
    limit: u32,
}

async fn session(
    client: Arc<CatalogClient>,
    config: &Config,
    initial_query: Option<String>,
    limit: u32,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut session = Session {
        client,
        completions: tx,
        view: SearchView::new(),
        default_query: config.query(None),
        limit,
    };

    println!("{}", "bookbrowse - type 'help' for commands".bold());
    session.search_for(initial_query.as_deref().unwrap_or_default());
    prompt()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    break;
                };
                match BrowseCommand::parse(&line) {
                    Ok(BrowseCommand::Quit) => break,
                    Ok(command) => session.handle(command).await,
                    Err(message) => println!("{}", message.red()),
                }
                prompt()?;
            }
            Some(completion) = rx.recv() => {
                session.deliver(completion);
                prompt()?;
            }
        }
    }

    Ok(())
}

fn prompt() -> Result<()> {
    print!("{} ", ">".cyan());
    io::stdout().flush()?;
    Ok(())
}

impl Session {
    /// New search from page 1; blank input runs the default query
    fn search_for(&mut self, query: &str) {
        let query = match query.trim() {
            "" => self.default_query.clone(),
            query => query.to_string(),
        };
        self.start_search(SearchRequest::new(query, 1, self.limit));
    }

    fn start_search(&mut self, request: SearchRequest) {
        println!(
            "Searching for \"{}\" (page {})...",
            request.query, request.page
        );
        let fetch = self.view.begin(request.clone());

        let client = Arc::clone(&self.client);
        let tx = self.completions.clone();
        tokio::spawn(async move {
            let result = client.search(&request).await;
            // The receiver is gone only once the session has ended
            let _ = tx.send(Completion {
                fetch,
                request,
                result,
            });
        });
    }

    fn deliver(&mut self, completion: Completion) {
        match self.view.receive(completion) {
            Delivery::Loaded => render_view(&self.view, false, false),
            Delivery::Failed(e) => {
                error!(url = e.url(), "search failed: {}", e);
                println!("{}", LOAD_FAILED.red());
            }
            Delivery::Stale => debug!("ignored late search result"),
        }
    }

    /// Re-render after a local change; filters never trigger a fetch
    fn refresh(&self) {
        match self.view.status() {
            ViewStatus::Idle => println!("Filters updated. Search for something to apply them."),
            ViewStatus::Loading => println!("Still loading; filters apply when results arrive."),
            ViewStatus::Loaded | ViewStatus::Failed => render_view(&self.view, false, false),
        }
    }

    async fn handle(&mut self, command: BrowseCommand) {
        match command {
            BrowseCommand::Search(query) => self.search_for(&query),
            BrowseCommand::Next => match self.view.next_page() {
                Some(request) => self.start_search(request),
                None => println!("Already on the last page."),
            },
            BrowseCommand::Prev => match self.view.prev_page() {
                Some(request) => self.start_search(request),
                None => println!("Already on the first page."),
            },
            BrowseCommand::Page(page) => match self.view.goto_page(page) {
                Some(request) => self.start_search(request),
                None => println!("Nothing loaded yet."),
            },
            BrowseCommand::Languages(codes) => {
                self.view.filters_mut().languages = codes.into_iter().collect();
                self.refresh();
            }
            BrowseCommand::Subject(subject) => {
                self.view.filters_mut().toggle_subject(&subject);
                self.refresh();
            }
            BrowseCommand::Years(from, to) => match year_range(from, to) {
                Ok(range) => {
                    self.view.filters_mut().year_range = range;
                    self.refresh();
                }
                Err(e) => println!("{}", e.to_string().red()),
            },
            BrowseCommand::Clear => {
                *self.view.filters_mut() = Default::default();
                self.refresh();
            }
            BrowseCommand::List => self.refresh(),
            BrowseCommand::Facets => {
                let facets = self.view.visible().facets;
                if facets.is_empty() {
                    println!("No filter choices on this page.");
                } else {
                    print_facets(&facets);
                }
            }
            BrowseCommand::Show(target) => {
                let id = self.resolve_target(&target);
                if let Err(e) = show_work(&self.client, &id, false, false).await {
                    println!("{}", e.to_string().red());
                }
            }
            BrowseCommand::Help => println!("{}", HELP),
            BrowseCommand::Quit | BrowseCommand::Nothing => {}
        }
    }

    /// A number picks from the visible results; anything else is a work id
    fn resolve_target(&self, target: &str) -> String {
        if let Ok(n) = target.parse::<usize>() {
            let visible = self.view.visible();
            if let Some(book) = n.checked_sub(1).and_then(|i| visible.books.get(i)) {
                return book.id.clone();
            }
        }
        target.to_string()
    }
}
