#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the seismo map catalog.
//!
//! Runs searches against the `PostGIS` catalog and prints the results, shows
//! the latest recorded event, or starts the HTTP server. Without a
//! subcommand it offers the same actions through an interactive menu.

mod args;
mod interactive;
mod output;

use std::collections::BTreeMap;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use seismo_map_database::db;
use seismo_map_database::query::QueryBuilder;
use seismo_map_database::search;
use seismo_map_database::store::{EventStore, PostgisEventStore};
use seismo_map_database_models::FilterCriteria;

use crate::args::SearchArgs;
use crate::interactive::Action;

#[derive(Parser)]
#[command(name = "seismo_map_cli", about = "Seismic event catalog search tool")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the catalog and print matching events
    Search(SearchArgs),
    /// Print the most recently recorded event
    Latest,
    /// Start the HTTP server
    Serve,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Seismo Map");
        println!();

        return match interactive::select_action()? {
            Action::Search => {
                let fields = interactive::prompt_fields()?;
                run_search(&fields, false).await
            }
            Action::Latest => run_latest().await,
            Action::Serve => {
                // The server uses actix-web's runtime, so we need to run it
                // in a blocking task to avoid nesting tokio runtimes.
                tokio::task::spawn_blocking(|| {
                    actix_web::rt::System::new().block_on(seismo_map_server::interactive::run())
                })
                .await??;
                Ok(())
            }
        };
    };

    match command {
        Commands::Search(args) => run_search(&args.to_fields(), args.json).await?,
        Commands::Latest => run_latest().await?,
        Commands::Serve => {
            tokio::task::spawn_blocking(|| {
                actix_web::rt::System::new().block_on(seismo_map_server::run_server())
            })
            .await??;
        }
    }

    Ok(())
}

async fn open_store() -> Result<PostgisEventStore, Box<dyn std::error::Error>> {
    let db = db::connect_from_env().await?;
    Ok(PostgisEventStore::new(Arc::from(db)))
}

async fn run_search(
    fields: &BTreeMap<String, String>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // Reject malformed input before connecting.
    let criteria = FilterCriteria::from_fields(fields)?;
    log::debug!("Searching with {} field(s)", fields.len());

    let store = open_store().await?;
    let builder = QueryBuilder::default();
    let results = search(&store, &builder, &criteria).await?;

    if json {
        println!(
            "{}",
            output::json(results, builder.spatial().radius_meters())?
        );
    } else {
        print!("{}", output::table(&results));
    }

    Ok(())
}

async fn run_latest() -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store().await?;

    match store.latest().await? {
        Some(event) => {
            print!("{}", output::header());
            println!("{}", output::row(&event));
        }
        None => println!("The catalog is empty."),
    }

    Ok(())
}
