mod cache;
mod catalog;
mod cli;
mod commands;
mod config;
mod display;
mod filter;
mod view;

use anyhow::Result;
use clap::Parser;
use cli::{CacheCommands, Cli, Commands};
use config::Config;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Search(args) => {
            commands::search::run(&config, &args, cli.no_cache, cli.quiet)?;
        }
        Commands::Show { id, json } => {
            commands::show::run(&config, &id, json, cli.no_cache, cli.quiet)?;
        }
        Commands::Browse { query, limit } => {
            let query = (!query.is_empty()).then(|| query.join(" "));
            commands::browse::run(&config, query, limit, cli.no_cache)?;
        }
        Commands::Cache { command } => match command {
            CacheCommands::Path => commands::cache::path(&config)?,
            CacheCommands::Clear => commands::cache::clear(&config)?,
        },
    }

    Ok(())
}

/// Log to stderr; RUST_LOG overrides the verbosity flag
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "bookbrowse=debug"
    } else {
        "bookbrowse=warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}
