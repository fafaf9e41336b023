//! Show command - fetch and display a single work

use anyhow::{bail, Result};
use tracing::{error, warn};

use crate::catalog::CatalogClient;
use crate::commands::{build_client, runtime};
use crate::config::Config;
use crate::display::{print_book_detail, DETAIL_FAILED};

pub fn run(config: &Config, id: &str, json: bool, no_cache: bool, quiet: bool) -> Result<()> {
    let client = build_client(config, no_cache)?;
    let rt = runtime()?;
    rt.block_on(show_work(&client, id, json, quiet))
}

/// Fetch a work and print it; shared with the browse session
pub async fn show_work(client: &CatalogClient, id: &str, json: bool, quiet: bool) -> Result<()> {
    let book = match client.work(id).await {
        Ok(book) => book,
        Err(e) if e.is_not_found() => {
            warn!(url = e.url(), "no such work: {}", id);
            bail!(DETAIL_FAILED);
        }
        Err(e) => {
            error!(url = e.url(), "work fetch failed: {}", e);
            bail!(DETAIL_FAILED);
        }
    };

    if json {
        let json = serde_json::to_string_pretty(&book)?;
        println!("{}", json);
    } else {
        print_book_detail(&book, quiet);
    }

    Ok(())
}
