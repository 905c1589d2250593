use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use log::info;
use patient_ingest::config::{DEFAULT_DATABASE_NAME, DEFAULT_INCOMING_DIR, DEFAULT_PROCESSED_DIR};
use patient_ingest::{DatabaseConfig, IngestConfig, IngestWorker, PatientStore};

/// Load C-CDA patient documents into the medical records database
#[derive(Debug, Parser)]
#[command(name = "patient-ingest", version, about)]
struct Cli {
    #[command(flatten)]
    database: DatabaseArgs,

    #[command(flatten)]
    ingest: IngestArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Args)]
struct DatabaseArgs {
    /// Database server host, optionally with ":port"
    #[arg(long, env = "DB_HOST", default_value = "localhost", global = true)]
    db_host: String,

    /// Database user
    #[arg(long, env = "DB_USER", default_value = "root", global = true)]
    db_user: String,

    /// Database password
    #[arg(long, env = "DB_PASSWORD", default_value = "", hide_env_values = true, global = true)]
    db_password: String,

    /// Database name
    #[arg(long, env = "DB_NAME", default_value = DEFAULT_DATABASE_NAME, global = true)]
    db_name: String,

    /// Full connection URL (e.g. sqlite://records.db?mode=rwc); overrides the settings above
    #[arg(long, env = "DATABASE_URL", hide_env_values = true, global = true)]
    database_url: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the database and its tables
    Setup,
    /// Ingest all documents waiting in the incoming directory (default)
    Ingest,
}

#[derive(Debug, Args)]
struct IngestArgs {
    /// Directory holding documents to ingest
    #[arg(long, env = "INCOMING_DIR", default_value = DEFAULT_INCOMING_DIR, global = true)]
    incoming: PathBuf,

    /// Directory receiving ingested documents
    #[arg(long, env = "PROCESSED_DIR", default_value = DEFAULT_PROCESSED_DIR, global = true)]
    processed: PathBuf,

    /// Parse documents and report what would be stored, without touching the database or files
    #[arg(long, global = true)]
    dry_run: bool,

    /// Print the run report as JSON on stdout
    #[arg(long, global = true)]
    json: bool,
}

impl From<DatabaseArgs> for DatabaseConfig {
    fn from(args: DatabaseArgs) -> Self {
        let config = DatabaseConfig::new()
            .with_host(args.db_host)
            .with_user(args.db_user)
            .with_password(args.db_password)
            .with_name(args.db_name);
        match args.database_url {
            Some(url) => config.with_url(url),
            None => config,
        }
    }
}

async fn run_setup(database: DatabaseConfig) -> anyhow::Result<()> {
    let store = PatientStore::setup(&database)
        .await
        .context("Database setup failed")?;
    store.close().await;
    info!("Database setup completed successfully");
    Ok(())
}

async fn run_ingest(database: DatabaseConfig, args: IngestArgs) -> anyhow::Result<()> {
    let mut config = IngestConfig::new()
        .with_database(database)
        .with_directories(&args.incoming, &args.processed)
        .with_progress(std::io::stderr().is_terminal());
    if args.dry_run {
        config = config.dry_run();
    }

    let worker = IngestWorker::connect(config)
        .await
        .context("Could not connect to the database")?;
    let report = worker.run().await.context("Ingestion run aborted")?;

    info!("{}", report.summary());
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Settings may come from a .env file next to the data directories
    dotenvy::dotenv().ok();

    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let database = DatabaseConfig::from(cli.database);

    match cli.command {
        Some(Command::Setup) => run_setup(database).await,
        Some(Command::Ingest) | None => run_ingest(database, cli.ingest).await,
    }
}
