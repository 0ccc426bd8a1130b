//! # Commons Search CLI (`ccs`)
//!
//! Administration and serving front end for the search service.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ccs status` | Show index and connection status |
//! | `ccs get <id>` | Fetch a document by id |
//! | `ccs delete <id>` | Delete a document (prompts) |
//! | `ccs delete-node <node>` | Delete all documents from a network node (prompts) |
//! | `ccs reset` | Delete and recreate the index (prompts) |
//! | `ccs search [flags]` | Search for documents |
//! | `ccs token` | Generate a fresh API token |
//! | `ccs serve` | Start the HTTP API server |
//!
//! All commands except `token` read the TOML config given by `--config`
//! (default `./config/ccs.toml`); secrets may instead come from `CCS_*`
//! environment variables.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commons_search::{commands, config, server};

/// Commons Search — HTTP and CLI front end for an OpenSearch-backed document
/// search service.
#[derive(Parser)]
#[command(
    name = "ccs",
    about = "Commons Search — admin CLI and API server for the document search service",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/ccs.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the status of the search service and its index.
    Status,

    /// Get a document by id.
    Get {
        /// The id of the document to get.
        id: String,
    },

    /// Delete a document by id. Prompts for confirmation.
    Delete {
        /// The id of the document to delete.
        id: String,
    },

    /// Delete all documents from a network node. Prompts for confirmation.
    DeleteNode {
        /// The network node to delete documents from.
        network_node: String,
    },

    /// Reset the search index, deleting all documents. Prompts for
    /// confirmation.
    Reset,

    /// Search for documents.
    Search {
        /// The free-text search query.
        #[arg(long)]
        query: Option<String>,

        /// Maximum number of results to return.
        #[arg(long)]
        limit: Option<i64>,

        /// Only documents with this username as a contributor.
        #[arg(long)]
        username: Option<String>,

        /// Only documents published on or after this date (YYYY-MM-DD).
        #[arg(long)]
        start_date: Option<String>,

        /// Only documents published on or before this date (YYYY-MM-DD).
        #[arg(long)]
        end_date: Option<String>,

        /// Only documents with exactly this title.
        #[arg(long)]
        title: Option<String>,

        /// Only documents with this content type.
        #[arg(long)]
        content_type: Option<String>,

        /// Only documents from this network node.
        #[arg(long)]
        network: Option<String>,
    },

    /// Generate a random API token and print it.
    Token {
        /// Token length in bytes (printed as hex, twice this many characters).
        #[arg(long, default_value_t = 32)]
        length: usize,
    },

    /// Start the HTTP API server.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Token generation needs no config.
    if let Commands::Token { length } = cli.command {
        commands::run_token(length);
        return Ok(());
    }

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Status => {
            commands::run_status(&cfg).await?;
        }
        Commands::Get { id } => {
            commands::run_get(&cfg, &id).await?;
        }
        Commands::Delete { id } => {
            commands::run_delete(&cfg, &id).await?;
        }
        Commands::DeleteNode { network_node } => {
            commands::run_delete_node(&cfg, &network_node).await?;
        }
        Commands::Reset => {
            commands::run_reset(&cfg).await?;
        }
        Commands::Search {
            query,
            limit,
            username,
            start_date,
            end_date,
            title,
            content_type,
            network,
        } => {
            let flags = commands::SearchFlags {
                query,
                limit,
                username,
                start_date,
                end_date,
                title,
                content_type,
                network,
            };
            commands::run_search(&cfg, flags).await?;
        }
        Commands::Serve => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| "info".into()),
                )
                .init();
            server::run_server(&cfg).await?;
        }
        Commands::Token { .. } => unreachable!(),
    }

    Ok(())
}
