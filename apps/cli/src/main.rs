//! faire-sync: mirrors a store's Faire product catalog into SQLite.

mod commands;
mod config;
mod context;

use std::process::ExitCode;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::AppConfig;
use crate::context::ServiceContext;

#[derive(Parser, Debug)]
#[command(name = "faire-sync", version)]
#[command(about = "Mirror a Faire product catalog into a local SQLite database")]
#[command(long_about = r#"
Pages through the Faire external API and upserts every product and variant
for a store, recording each run in the sync log.

Running without a subcommand syncs the default store (FAIRE_STORE_CODE).

Example usage:
  faire-sync store set --code toyarina --name "Toyarina"
  faire-sync sync --store toyarina
  faire-sync logs --limit 5
"#)]
struct Cli {
    /// SQLite database file (overrides DATABASE_URL)
    #[arg(long, global = true)]
    db: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a product sync for a store
    Sync {
        /// Store code (defaults to FAIRE_STORE_CODE)
        #[arg(short, long)]
        store: Option<String>,

        /// Products requested per page
        #[arg(long)]
        page_limit: Option<u32>,

        /// Pause between page requests, in milliseconds
        #[arg(long)]
        page_delay_ms: Option<u64>,
    },

    /// Show recent sync runs
    Logs {
        /// Only show runs for this store
        #[arg(short, long)]
        store: Option<String>,

        /// Maximum number of runs to show
        #[arg(short, long, default_value_t = 20)]
        limit: i64,
    },

    /// Manage stores and their Faire credentials
    Store {
        #[command(subcommand)]
        command: StoreCommand,
    },

    /// Inspect mirrored products
    Products {
        #[command(subcommand)]
        command: ProductsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum StoreCommand {
    /// Create a store or update the one with the same code
    Set {
        #[arg(long)]
        code: String,

        #[arg(long)]
        name: String,

        /// Value for the X-FAIRE-APP-CREDENTIALS header
        #[arg(long)]
        app_credentials: Option<String>,

        /// Value for the X-FAIRE-OAUTH-ACCESS-TOKEN header
        #[arg(long)]
        access_token: Option<String>,
    },

    /// List configured stores
    List,
}

#[derive(Subcommand, Debug)]
enum ProductsCommand {
    /// List mirrored products
    List {
        #[arg(short, long)]
        store: Option<String>,
    },

    /// List products the last completed sync did not see
    Stale {
        #[arg(short, long)]
        store: Option<String>,

        /// Explicit cutoff (RFC 3339) instead of the last completed sync
        #[arg(long)]
        before: Option<DateTime<Utc>>,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let (page_limit, page_delay_ms) = match &cli.command {
        Some(Command::Sync {
            page_limit,
            page_delay_ms,
            ..
        }) => (*page_limit, *page_delay_ms),
        _ => (None, None),
    };
    let config = AppConfig::from_env().with_overrides(cli.db.clone(), page_limit, page_delay_ms);
    let ctx = ServiceContext::open(&config.database_url)?;

    match cli.command {
        None => {
            let result = commands::sync::run(&ctx, &config, &config.store_code).await?;
            return Ok(exit_code(result.success));
        }
        Some(Command::Sync { store, .. }) => {
            let store_code = config.store_code_or_default(store);
            let result = commands::sync::run(&ctx, &config, &store_code).await?;
            return Ok(exit_code(result.success));
        }
        Some(Command::Logs { store, limit }) => {
            commands::logs::run(&ctx, store.as_deref(), limit)?;
        }
        Some(Command::Store { command }) => match command {
            StoreCommand::Set {
                code,
                name,
                app_credentials,
                access_token,
            } => commands::store::set(&ctx, code, name, app_credentials, access_token).await?,
            StoreCommand::List => commands::store::list(&ctx)?,
        },
        Some(Command::Products { command }) => match command {
            ProductsCommand::List { store } => {
                commands::products::list(&ctx, &config.store_code_or_default(store))?
            }
            ProductsCommand::Stale { store, before } => {
                commands::products::stale(&ctx, &config.store_code_or_default(store), before)?
            }
        },
    }

    Ok(ExitCode::SUCCESS)
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
