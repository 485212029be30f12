//! # Indicator Store CLI (`indicator`)
//!
//! ## Usage
//!
//! ```bash
//! indicator --config ./config/indicator.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `indicator init` | Create the SQLite database and schema |
//! | `indicator reset` | Drop both tables and all imported data |
//! | `indicator serve` | Start the REST API |
//! | `indicator import <indicator_id>` | Fetch and store an indicator |
//! | `indicator list [--order-by ..]` | List imported collections |
//! | `indicator get <id>` | Print a collection and its entries |
//! | `indicator entry <id> <year> <country>` | Print one value |
//! | `indicator top <id> <year> [--q ..]` | Top/bottom entries of a year |
//! | `indicator delete <id>` | Remove a collection |
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use indicator_store::config::{self, Config};
use indicator_store::fetcher::HttpIndicatorSource;
use indicator_store::server::{self, AppState};
use indicator_store::{commands, db, migrate, open_store};

/// Indicator Store: import remote statistical indicators once, query them locally.
#[derive(Parser)]
#[command(name = "indicator", version)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// When the file does not exist, built-in defaults are used.
    #[arg(long, global = true, default_value = "./config/indicator.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema. Safe to run repeatedly.
    Init,

    /// Drop all tables and imported data.
    Reset,

    /// Start the REST API on `[server].bind`.
    Serve,

    /// Fetch an indicator from the remote API and store it.
    Import {
        /// Remote indicator id, e.g. `SP.POP.TOTL`.
        indicator_id: String,
    },

    /// List imported collections.
    List {
        /// Comma-separated fields, `-` prefix for descending
        /// (e.g. `-indicator,+id`).
        #[arg(long, allow_hyphen_values = true)]
        order_by: Option<String>,
    },

    /// Print a collection with all of its entries.
    Get { id: i64 },

    /// Print the value for one country and year.
    Entry {
        id: i64,
        year: String,
        country: String,
    },

    /// Print the highest or lowest values of a year.
    Top {
        id: i64,
        year: String,
        /// `N` or `+N` for the top N, `-N` for the bottom N; omit for all.
        #[arg(long, allow_hyphen_values = true)]
        q: Option<String>,
    },

    /// Delete a collection and its entries.
    Delete { id: i64 },
}

fn load(path: &Path) -> anyhow::Result<Config> {
    if path.exists() {
        config::load_config(path)
    } else {
        tracing::warn!(
            "config file {} not found, using defaults",
            path.display()
        );
        Ok(Config::minimal())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = load(&cli.config)?;

    if let Commands::Reset = cli.command {
        let pool = db::connect(&cfg).await?;
        migrate::drop_schema(&pool).await?;
        pool.close().await;
        println!("Database reset.");
        return Ok(());
    }

    let store = open_store(&cfg).await?;

    match cli.command {
        Commands::Init => {
            println!("Database initialized at {}.", cfg.db.path.display());
        }
        Commands::Reset => {
            // Handled above (before the schema is created)
            unreachable!()
        }
        Commands::Serve => {
            let source = HttpIndicatorSource::new(&cfg.remote)?;
            let store = Arc::new(store);
            let state = AppState::new(store.clone(), Arc::new(source));
            server::run_server(&cfg, state).await?;
            store.close().await;
            return Ok(());
        }
        Commands::Import { indicator_id } => {
            let source = HttpIndicatorSource::new(&cfg.remote)?;
            commands::run_import(&store, &source, &indicator_id).await?;
        }
        Commands::List { order_by } => {
            commands::run_list(&store, order_by.as_deref()).await?;
        }
        Commands::Get { id } => {
            commands::run_get(&store, id).await?;
        }
        Commands::Entry { id, year, country } => {
            commands::run_entry(&store, id, &year, &country).await?;
        }
        Commands::Top { id, year, q } => {
            commands::run_top(&store, id, &year, q.as_deref()).await?;
        }
        Commands::Delete { id } => {
            commands::run_delete(&store, id).await?;
        }
    }

    store.close().await;
    Ok(())
}
