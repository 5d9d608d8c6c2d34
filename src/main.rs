//! # Knowledge Hub CLI (`kb`)
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `kb init` | Create the SQLite database and tables |
//! | `kb serve` | Start the HTTP API |
//! | `kb search "<query>"` | Keyword search over titles and content |
//! | `kb submit` | Submit a knowledge record |
//! | `kb get <id>` | Show a record |
//! | `kb view <id>` | Count one view |
//! | `kb reflect --user <id>` | Save a daily reflection |
//! | `kb reflections <user>` | List a user's reflections |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use knowledge_hub::models::MetricsSnapshot;
use knowledge_hub::{config, knowledge, logging, migrate, rituals, search, server};

/// Knowledge Hub — submit, search, and view knowledge records.
#[derive(Parser)]
#[command(name = "kb", version, about = "Knowledge Hub — a knowledge-base service")]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/kb.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema. Safe to run repeatedly.
    Init,

    /// Start the HTTP server on `[server].bind`.
    Serve,

    /// Search knowledge records by keyword (case-sensitive substring).
    Search {
        /// Text that must appear in the title or content.
        query: String,
    },

    /// Submit a new knowledge record. It starts as `pending`.
    Submit {
        #[arg(long)]
        title: String,

        #[arg(long)]
        content: String,

        /// User id of the author.
        #[arg(long)]
        author: String,

        /// Tag to attach; repeat for several.
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// `public`, `internal`, or `private`.
        #[arg(long)]
        visibility: Option<String>,
    },

    /// Show a record without counting a view.
    Get { id: String },

    /// Count one view of a record.
    View { id: String },

    /// Save a daily reflection.
    Reflect {
        #[arg(long)]
        user: String,

        #[arg(long)]
        text: Option<String>,

        /// Reflection type; defaults to `contribution`.
        #[arg(long = "type")]
        reflection_type: Option<String>,

        #[arg(long, default_value_t = 0)]
        points: i64,

        #[arg(long, default_value_t = 0)]
        thanks: i64,

        #[arg(long, default_value_t = 0)]
        time_saved: i64,
    },

    /// List a user's reflections, newest first.
    Reflections { user: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;
    logging::init(&cfg.logging.filter);

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Search { query } => {
            search::run_search(&cfg, &query).await?;
        }
        Commands::Submit {
            title,
            content,
            author,
            tags,
            visibility,
        } => {
            knowledge::run_submit(&cfg, title, content, author, tags, visibility).await?;
        }
        Commands::Get { id } => {
            knowledge::run_get(&cfg, &id).await?;
        }
        Commands::View { id } => {
            knowledge::run_view(&cfg, &id).await?;
        }
        Commands::Reflect {
            user,
            text,
            reflection_type,
            points,
            thanks,
            time_saved,
        } => {
            let metrics = MetricsSnapshot {
                points,
                thanks,
                time_saved,
            };
            rituals::run_reflect(&cfg, user, text, reflection_type, metrics).await?;
        }
        Commands::Reflections { user } => {
            rituals::run_list(&cfg, &user).await?;
        }
    }

    Ok(())
}
