//! Staff Performance Server
//!
//! Tracks staff objectives, outcomes, activities and tasks, and lets
//! supervisors review their reports.

use anyhow::Result;
use clap::Parser;
use staff_performance::actions::{bootstrap, staff};
use staff_performance::cli::{Cli, Command};
use staff_performance::config::Config;
use staff_performance::db::{Database, now_ms};
use staff_performance::web;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

fn init_logging(target: &str, verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    match target {
        "0" | "off" => {
            // No logging
        }
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            // Log to file (append mode)
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(filename)?;
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log, cli.verbose)?;

    let (mut config, config_path) = Config::discover(cli.config.as_deref().map(Path::new))?;

    // CLI overrides come last
    if let Some(db_path) = &cli.database {
        config.server.db_path = db_path.into();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    config.ensure_db_dir()?;
    let db = Database::open(&config.server.db_path)?;

    info!("Config: {:?}", config_path);
    info!("Database: {:?}", config.server.db_path);

    match cli.command {
        Some(Command::CreateUser(args)) => {
            let user = staff::provision_user(&db, &args.into())?;
            println!("Created {} '{}' (id {})", user.role, user.username, user.id);
            Ok(())
        }
        Some(Command::Serve) | None => {
            bootstrap::seed_admin(&db, &config.bootstrap)?;
            let purged = db.purge_expired_sessions(now_ms())?;
            if purged > 0 {
                info!(purged, "Removed expired sessions");
            }
            web::start_server(Arc::new(db), &config).await
        }
    }
}
