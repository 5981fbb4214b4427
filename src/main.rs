//! Repopulse CLI - GitHub repository analytics over snapshot tables

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use repopulse::config::{self, RepopulseConfig};
use repopulse::server::{self, AppState};
use repopulse::storage::Database;
use repopulse::ui::{self, Icons};
use repopulse::{HeatmapMode, QueryEngine, SnapshotCatalog, SnapshotKind};

#[derive(Parser)]
#[command(name = "repopulse")]
#[command(version)]
#[command(about = "Read-only analytics API over dated GitHub repository snapshots")]
#[command(long_about = r#"
Repopulse serves aggregate views over a SQLite database of dated
repository, contributor and commit-activity snapshots:
  • Language, company and location distributions
  • Stars vs contributors / open issues scatter data
  • A 365-day commit activity calendar
  • Language trends across snapshots

Example usage:
  repopulse init
  repopulse serve --port 3001 --database github.db
  repopulse heatmap --repo tokio --mode weekly
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file (defaults to ./repopulse.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Path to the snapshot database
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// List snapshot tables found in the database
    Snapshots {
        /// Path to the snapshot database
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// Print the commit activity calendar
    Heatmap {
        /// Restrict to one repository
        #[arg(short, long)]
        repo: Option<String>,

        /// Aggregation mode (concat, weekly)
        #[arg(short, long)]
        mode: Option<HeatmapMode>,

        /// Path to the snapshot database
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// Show the language distribution of the latest snapshot
    Languages {
        /// Path to the snapshot database
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// Write a default config file
    Init {
        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ui::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let file_config = config::load_config(Some(&config_path))?;
    if file_config.is_some() {
        tracing::debug!("Loaded config from {}", config_path.display());
    }
    let cfg = file_config.unwrap_or_default();

    match cli.command {
        Commands::Serve { host, port, database } => {
            let host = host.unwrap_or_else(|| cfg.host().to_string());
            let port = port.unwrap_or_else(|| cfg.port());
            let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
            let db = open_database(database.as_deref(), &cfg)?;

            ui::header("Repopulse API");
            ui::info("Database", &db.path().display().to_string());
            ui::info("Listening", &format!("http://{}", addr));
            ui::info("Heatmap mode", cfg.heatmap_mode().as_str());

            server::start_server(addr, AppState::new(db, cfg.heatmap_mode())).await?;
        }

        Commands::Snapshots { database } => {
            let db = open_database(database.as_deref(), &cfg)?;
            let catalog = tokio::task::spawn_blocking(move || SnapshotCatalog::load(&db)).await??;

            ui::section(&format!("{} Snapshots", Icons::DATABASE));
            if catalog.is_empty() {
                ui::empty("No snapshot tables found");
                return Ok(());
            }
            let all: Vec<_> = catalog.iter().cloned().collect();
            println!("{}", ui::snapshots_table(&all));

            let latest: Vec<(&str, String)> = SnapshotKind::all()
                .iter()
                .map(|kind| {
                    let table = catalog
                        .latest(*kind)
                        .map(|s| s.table.to_string())
                        .unwrap_or_else(|| "-".to_string());
                    (kind.as_str(), table)
                })
                .collect();
            let rows: Vec<(&str, &str)> = latest.iter().map(|(kind, table)| (*kind, table.as_str())).collect();
            ui::section("Latest tables");
            println!("{}", ui::stats_table(&rows));
        }

        Commands::Heatmap { repo, mode, database } => {
            let mode = mode.unwrap_or_else(|| cfg.heatmap_mode());
            let db = open_database(database.as_deref(), &cfg)?;
            let today = chrono::Local::now().date_naive();
            let label = repo.clone().unwrap_or_else(|| "all repositories".to_string());

            let report = tokio::task::spawn_blocking(move || {
                QueryEngine::new(&db).activity_heatmap_report(repo.as_deref(), mode, today)
            })
            .await?;

            ui::section(&format!("{} Activity for {} ({})", Icons::CALENDAR, label, mode));
            if report.days.is_empty() {
                ui::empty("No activity data");
                return Ok(());
            }
            print!("{}", ui::render_heatmap(&report.days));

            let total = report.days.iter().fold(0u64, |sum, d| sum.saturating_add(d.count));
            ui::info("Commits", &total.to_string());
            ui::info("Rows used", &format!("{}/{}", report.rows - report.discarded.len(), report.rows));
            for err in &report.discarded {
                ui::warn(&format!("Skipped {}", err));
            }
        }

        Commands::Languages { database } => {
            let db = open_database(database.as_deref(), &cfg)?;
            let languages =
                tokio::task::spawn_blocking(move || QueryEngine::new(&db).language_distribution()).await?;

            ui::section(&format!("{} Languages", Icons::STATS));
            if languages.is_empty() {
                ui::empty("No repository snapshot found");
                return Ok(());
            }
            println!("{}", ui::languages_table(&languages));
        }

        Commands::Init { force } => {
            config::write_config(&config_path, &RepopulseConfig::template(), force)?;
            ui::success(&format!("Wrote {}", config_path.display()));
        }
    }

    Ok(())
}

fn open_database(flag: Option<&Path>, cfg: &RepopulseConfig) -> anyhow::Result<Database> {
    let path = flag.map(Path::to_path_buf).unwrap_or_else(|| cfg.database_path());
    if !path.exists() {
        tracing::warn!("Database {} does not exist yet", path.display());
    }
    Ok(Database::open(&path, cfg.pool_settings())?)
}
