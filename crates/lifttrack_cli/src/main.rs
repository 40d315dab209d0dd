//! `lifttrack` maintenance CLI.
//!
//! # Responsibility
//! - Build storage and logging configuration from flags and environment.
//! - Run schema initialization or baseline seeding as one-shot actions.
//! - Map the outcome to a process exit status.

use clap::{Parser, Subcommand};
use lifttrack_core::config::{DEFAULT_DATABASE_URL, DEFAULT_POOL_SIZE};
use lifttrack_core::{
    default_dataset, default_log_level, init_logging, load_dataset, Engine, LoggingConfig,
    Seeder, StorageConfig,
};
use log::error;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "lifttrack", version, about = "Exercise catalog storage maintenance")]
struct Cli {
    /// Storage connection URL, e.g. `sqlite:///./lifttrack.db`.
    #[arg(long, env = "LIFTTRACK_DATABASE_URL", default_value = DEFAULT_DATABASE_URL, global = true)]
    database_url: String,

    /// Milliseconds to wait on a locked database before failing.
    #[arg(long, env = "LIFTTRACK_BUSY_TIMEOUT_MS", default_value_t = 5000, global = true)]
    busy_timeout_ms: u64,

    /// Upper bound on pooled storage connections.
    #[arg(long, env = "LIFTTRACK_POOL_SIZE", default_value_t = DEFAULT_POOL_SIZE, global = true)]
    pool_size: u32,

    #[arg(long, env = "LIFTTRACK_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Absolute directory for rotated log files; logs go to stderr when unset.
    #[arg(long, env = "LIFTTRACK_LOG_DIR", global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the exercise tables if they do not exist.
    Init,
    /// Replace all exercises with a baseline dataset.
    Seed {
        /// JSON dataset file; the bundled catalog is used when omitted.
        #[arg(long)]
        data: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let logging = LoggingConfig {
        level: cli
            .log_level
            .clone()
            .unwrap_or_else(|| default_log_level().to_string()),
        log_dir: cli.log_dir.clone(),
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("lifttrack: {err}");
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(message) => {
            println!("{message}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("event=cli_exit module=cli status=error error={err}");
            eprintln!("lifttrack: {}", error_chain(err.as_ref()));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<String, Box<dyn Error>> {
    let config = StorageConfig::from_url(&cli.database_url)?
        .with_busy_timeout(Duration::from_millis(cli.busy_timeout_ms))
        .with_pool_size(cli.pool_size);
    let engine = Engine::connect(&config)?;

    match &cli.command {
        Command::Init => {
            engine.initialize_schema()?;
            Ok(format!("schema ready at {}", engine.target()))
        }
        Command::Seed { data } => {
            let records = match data {
                Some(path) => load_dataset(path)?,
                None => default_dataset()?,
            };
            let report = Seeder::new(&engine).seed(&records)?;
            Ok(format!("Successfully seeded {} exercises", report.seeded))
        }
    }
}

fn error_chain(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        // Wrapper errors often repeat their source verbatim.
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
