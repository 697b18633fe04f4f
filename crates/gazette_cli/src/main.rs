//! Operator CLI over `gazette_core`.
//!
//! # Responsibility
//! - Open the configured database and run one read or registry command.
//! - Print results as pretty JSON for scripting and smoke checks.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use gazette_core::db::open_db;
use gazette_core::{
    init_logging_from_config, AnnouncementService, FeedWindows, GazetteConfig,
    GovernmentService, NewGovernment, SpeechService, SqliteDocumentRepository,
    SqliteGovernmentRepository,
};
use log::info;
use rusqlite::Connection;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gazette")]
#[command(about = "Government publishing content core")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "GAZETTE_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database file (overrides `database.path`)
    #[arg(long, global = true, env = "GAZETTE_DB")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the announcements index: featured news, last 7 days, today
    Announcements {
        /// Evaluate the feeds as of this RFC 3339 instant instead of now
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },

    /// Government registry
    Governments {
        #[command(subcommand)]
        command: GovernmentCommands,
    },

    /// Published speeches
    Speeches {
        #[command(subcommand)]
        command: SpeechCommands,
    },
}

#[derive(Subcommand)]
enum GovernmentCommands {
    /// List all governments, earliest first
    List,
    /// Show the government currently in power
    Current,
    /// Show the government in power on a date (YYYY-MM-DD)
    OnDate { date: NaiveDate },
    /// Register a government
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        start_date: NaiveDate,
        #[arg(long)]
        end_date: Option<NaiveDate>,
        /// Pin the slug instead of deriving it from the name
        #[arg(long)]
        slug: Option<String>,
    },
    /// Rename a government; its slug does not change
    Rename { slug: String, name: String },
    /// Set the last day in power of a government
    Conclude { slug: String, end_date: NaiveDate },
}

#[derive(Subcommand)]
enum SpeechCommands {
    /// List published speeches, newest first
    List,
    /// Show one published speech with its related policies
    Show { slug: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match cli.config.as_deref() {
        Some(path) => GazetteConfig::load(path)
            .with_context(|| format!("loading config `{}`", path.display()))?,
        None => GazetteConfig::default(),
    };
    if let Some(db) = cli.db {
        config.database.path = db;
    }

    init_logging_from_config(&config.logging).map_err(anyhow::Error::msg)?;

    let conn = open_db(&config.database.path)
        .with_context(|| format!("opening database `{}`", config.database.path.display()))?;
    info!(
        "event=cli_start module=cli status=ok db_path={}",
        config.database.path.display()
    );

    match cli.command {
        Commands::Announcements { now } => {
            let repo = SqliteDocumentRepository::try_new(&conn)?;
            let service =
                AnnouncementService::with_windows(repo, FeedWindows::from(&config.feeds));
            print_json(&service.index(now.unwrap_or_else(Utc::now))?)
        }
        Commands::Governments { command } => run_government_command(&conn, command),
        Commands::Speeches { command } => {
            let service = SpeechService::new(SqliteDocumentRepository::try_new(&conn)?);
            match command {
                SpeechCommands::List => print_json(&service.index()?),
                SpeechCommands::Show { slug } => match service.show(&slug)? {
                    Some(page) => print_json(&page),
                    None => bail!("no published speech with slug `{slug}`"),
                },
            }
        }
    }
}

fn run_government_command(conn: &Connection, command: GovernmentCommands) -> Result<()> {
    let service = GovernmentService::new(SqliteGovernmentRepository::try_new(conn)?);
    match command {
        GovernmentCommands::List => print_json(&service.list()?),
        GovernmentCommands::Current => print_json(&service.current()?),
        GovernmentCommands::OnDate { date } => print_json(&service.on_date(date)?),
        GovernmentCommands::Create {
            name,
            start_date,
            end_date,
            slug,
        } => {
            let request = NewGovernment {
                name,
                start_date: Some(start_date),
                end_date,
                slug,
            };
            print_json(&service.create(request)?)
        }
        GovernmentCommands::Rename { slug, name } => {
            let Some(government) = service.find_by_slug(&slug)? else {
                bail!("no government with slug `{slug}`");
            };
            print_json(&service.rename(government.id, name)?)
        }
        GovernmentCommands::Conclude { slug, end_date } => {
            let Some(government) = service.find_by_slug(&slug)? else {
                bail!("no government with slug `{slug}`");
            };
            print_json(&service.conclude(government.id, end_date)?)
        }
    }
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
