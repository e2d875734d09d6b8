mod db;
mod plan;
mod quote;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use plan::StopArg;

#[derive(Debug, Parser)]
#[command(name = "tourdesk-cli")]
#[command(about = "Tourdesk command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Preview an itinerary built from the catalog file (no database needed)
    Plan {
        /// First day of the tour (YYYY-MM-DD)
        #[arg(long)]
        start_date: NaiveDate,
        /// A stop as `Location:nights`; repeat in travel order
        #[arg(long = "stop", required = true)]
        stops: Vec<StopArg>,
        /// Catalog file (defaults to `TOURDESK_CATALOG_PATH` or ./config/catalog.yaml)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Price a tour from its item costs
    Quote {
        /// Cost of one itinerary item; repeat for each item
        #[arg(long = "cost", required = true)]
        costs: Vec<Decimal>,
        /// Profit margin in percent
        #[arg(long, default_value = "0")]
        margin: Decimal,
        /// Fixed selling price; overrides the margin recommendation
        #[arg(long)]
        price: Option<Decimal>,
        /// Number of travellers
        #[arg(long, default_value_t = 0)]
        pax: i32,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check that the database is reachable
    Ping,
    /// Apply pending migrations
    Migrate,
    /// Upsert locations and routes from the catalog file
    Seed {
        /// Catalog file (defaults to `TOURDESK_CATALOG_PATH`)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Db { command }) => match command {
            DbCommands::Ping => db::run_db_ping().await?,
            DbCommands::Migrate => db::run_db_migrate().await?,
            DbCommands::Seed { catalog } => db::run_db_seed(catalog.as_deref()).await?,
        },
        Some(Commands::Plan {
            start_date,
            stops,
            catalog,
        }) => plan::run_plan(start_date, &stops, catalog.as_deref())?,
        Some(Commands::Quote {
            costs,
            margin,
            price,
            pax,
        }) => quote::run_quote(&costs, margin, price, pax)?,
        None => println!("tourdesk-cli: run with --help to list commands"),
    }

    Ok(())
}
