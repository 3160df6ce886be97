//! quark_transfer CLI - Save shared Quark drive links into your own drive.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use quark_transfer::url_parser::ROOT_FOLDER_ID;
use quark_transfer::{parse_share_url, Config, Quark, RecordStore};

/// CLI tool for saving Quark share links into your drive.
#[derive(Parser)]
#[command(name = "quark_transfer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the JSON config file.
    #[arg(long, env = "QUARK_CONFIG")]
    config: Option<PathBuf>,

    /// Session cookie (overrides the config file).
    #[arg(long, env = "QUARK_COOKIE", hide_env_values = true)]
    cookie: Option<String>,

    /// Transfer record database (overrides the config file).
    #[arg(long)]
    db: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(long, short = 'v')]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Save share links into the drive and print the new share links.
    Store {
        /// Share links to save.
        #[arg(required = true)]
        urls: Vec<String>,

        /// Stop after this many new transfers.
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },

    /// List files in a drive folder.
    List {
        /// Folder id (defaults to the drive root).
        #[arg(default_value = ROOT_FOLDER_ID)]
        folder: String,
    },

    /// Search the drive by file name.
    Search {
        query: String,
    },

    /// Create a folder.
    Mkdir {
        name: String,

        /// Parent folder id.
        #[arg(long, short = 'p', default_value = ROOT_FOLDER_ID)]
        parent: String,
    },

    /// Find or create a save folder in the drive root and print its id.
    EnsureDir {
        name: String,
    },

    /// Show recorded transfers.
    Records {
        /// Look up the share link recorded for this file name.
        #[arg(long)]
        name: Option<String>,

        /// Maximum number of records to list.
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Show the share id, passcode and folder of a share link.
    Parse {
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => Config::default(),
    };
    if let Some(cookie) = cli.cookie {
        config.cookie = cookie;
    }
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    match cli.command {
        Commands::Parse { url } => {
            let share = parse_share_url(&url)?;
            println!("share id:  {}", share.share_id);
            println!("passcode:  {}", share.passcode);
            println!("folder id: {}", share.parent_folder_id);
        }

        Commands::Records { name, limit } => {
            let records = RecordStore::open(&config.db_path)
                .with_context(|| format!("Failed to open {:?}", config.db_path))?;

            if let Some(name) = name {
                match records.find_share_link(&name)? {
                    Some(link) => println!("{}\t{}", name, link),
                    None => println!("No record for {}", name),
                }
            } else {
                let rows = records.list(limit)?;
                if rows.is_empty() {
                    println!("No records.");
                }
                for row in rows {
                    let created = row
                        .created_at
                        .map(|t| t.to_string())
                        .unwrap_or_else(|| "-".to_string());
                    println!("{}\t{}\t{}\t{}", created, row.file_id, row.share_link, row.file_name);
                }
            }
        }

        Commands::Store { urls, limit } => {
            let quark = connect(&config)?;
            let total = urls.len();
            let outcomes = quark.store_batch(&urls, limit.unwrap_or(usize::MAX)).await;

            for outcome in &outcomes {
                let tag = if outcome.already_existed { "EXISTS" } else { "NEW" };
                println!("[{}] {}\t{}", tag, outcome.file_name, outcome.share_link);
                if let Some(err) = &outcome.store_error {
                    println!("    record not saved: {}", err);
                }
            }
            println!("Done ({} of {} link(s) resolved).", outcomes.len(), total);
        }

        Commands::List { folder } => {
            let quark = connect(&config)?;
            let files = quark
                .client()
                .list_dir(&folder)
                .await
                .with_context(|| format!("Failed to list folder: {}", folder))?;

            if files.is_empty() {
                println!("No files found.");
            } else {
                println!("{:<34} {:>10} {}", "ID", "SIZE", "NAME");
                println!("{}", "-".repeat(80));
                for file in files {
                    println!("{}", file);
                }
            }
        }

        Commands::Search { query } => {
            let quark = connect(&config)?;
            let files = quark
                .client()
                .search(&query)
                .await
                .with_context(|| format!("Failed to search for: {}", query))?;

            if files.is_empty() {
                println!("No files found.");
            }
            for file in files {
                println!("{}", file);
            }
        }

        Commands::Mkdir { name, parent } => {
            let quark = connect(&config)?;
            let fid = quark
                .client()
                .mkdir(&name, &parent)
                .await
                .with_context(|| format!("Failed to create folder: {}", name))?;
            println!("{}", fid);
        }

        Commands::EnsureDir { name } => {
            let quark = connect(&config)?;
            let fid = quark.ensure_save_dir(&name).await?;
            println!("{}", fid);
        }
    }

    Ok(())
}

fn connect(config: &Config) -> Result<Quark> {
    Quark::from_config(config).context("Failed to set up transfer client")
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
