//! `coursehub` command-line entry point.
//!
//! # Responsibility
//! - Run the HTTP server.
//! - Offer offline maintenance commands (migrate, suggest) against a
//!   database file without starting the server.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use coursehub_core::repo::suggestion_repo::SqliteSuggestionSource;
use coursehub_core::{
    bootstrap, core_version, init_logging, open_db, ping, LogSettings, SuggestionService,
};
use coursehub_http::{start_server, Config};
use serde_json::json;
use std::path::PathBuf;

/// CourseHub - course management backend
#[derive(Parser)]
#[command(name = "coursehub")]
#[command(about = "Course catalog, enrollment and suggestion service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API until Ctrl+C or SIGTERM
    Serve,

    /// Create or upgrade the database schema and seed bootstrap data
    Migrate {
        /// Database file; defaults to COURSEHUB_DB_PATH
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Print course suggestions for a user as JSON
    Suggest {
        /// User to compute suggestions for
        #[arg(long)]
        user_id: i64,

        /// Database file; defaults to COURSEHUB_DB_PATH
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Check core linkage
    Ping,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ping => {
            println!("coursehub_core ping={}", ping());
            println!("coursehub_core version={}", core_version());
            Ok(())
        }
        Commands::Serve => {
            let config = load_config(true)?;
            println!("Serving on {}", config.address());
            start_server(config).await.context("server failed")
        }
        Commands::Migrate { db } => {
            let config = load_config(false)?;
            let path = db.unwrap_or_else(|| config.db_path.clone());
            let conn = open_db(&path)
                .with_context(|| format!("failed to open database {}", path.display()))?;
            let report =
                bootstrap(&conn, config.superuser.as_ref()).context("bootstrap failed")?;

            println!(
                "Migrated {} ({} default categories, superuser {})",
                path.display(),
                report.categories,
                if report.created_superuser.is_some() {
                    "created"
                } else {
                    "unchanged"
                }
            );
            Ok(())
        }
        Commands::Suggest { user_id, db } => {
            let config = load_config(false)?;
            let path = db.unwrap_or_else(|| config.db_path.clone());
            let conn = open_db(&path)
                .with_context(|| format!("failed to open database {}", path.display()))?;

            let suggestions = SuggestionService::new(SqliteSuggestionSource::new(&conn))
                .suggest_courses(user_id)
                .with_context(|| format!("no suggestions for user {user_id}"))?;
            let body = json!({ "suggested_courses": suggestions });
            println!("{}", serde_json::to_string_pretty(&body)?);
            Ok(())
        }
    }
}

/// Loads configuration, starts file logging, then logs the configuration
/// fallbacks; `echo_stderr` mirrors logs to the terminal.
fn load_config(echo_stderr: bool) -> Result<Config> {
    let config = Config::load().context("invalid configuration")?;
    init_logging(&LogSettings {
        level: config.log_level.clone(),
        log_dir: config.log_dir.clone(),
        echo_stderr,
    })
    .map_err(|message| anyhow!("failed to initialize logging: {message}"))?;
    config.log_notes();
    Ok(config)
}
