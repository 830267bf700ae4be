//! farepass - travel pass registry
//!
//! This is the main entry point for the farepass command line.
//! It wires together all the components:
//! - Configuration loading (pass catalog and service settings)
//! - Store initialization
//! - The pass registry
//!
//! and then runs a single command against them.

mod demo;
mod report;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use farepass_api::PassSpec;
use farepass_config::{Catalog, load_config};
use farepass_core::PassRegistry;
use farepass_store::{SqliteStore, Store};
use farepass_util::{Clock, DATABASE_FILENAME, PassId, SystemClock, default_config_path};
use report::{describe_audit, describe_pass, status_message, write_consume};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// farepass - Issue and validate travel passes
#[derive(Parser, Debug)]
#[command(name = "farepass")]
#[command(about = "Issue and validate travel passes", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/farepass/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Data directory override (or set FAREPASS_DATA_DIR env var)
    #[arg(short, long, env = "FAREPASS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(flatten)]
    Pass(PassCommand),

    /// Run a scripted walkthrough against an in-memory registry
    Demo,
}

/// Commands that work against the on-disk registry
#[derive(Subcommand, Debug)]
enum PassCommand {
    /// Issue a new pass
    Issue {
        #[command(subcommand)]
        terms: IssueTerms,
    },

    /// Use one trip on a pass
    Consume { pass_id: PassId },

    /// Mark a pass active
    Activate { pass_id: PassId },

    /// Mark a pass inactive
    Deactivate { pass_id: PassId },

    /// List every issued pass
    List,

    /// Show recent audit events, newest first
    Audit {
        /// Only show events for this pass
        pass_id: Option<PassId>,

        /// Number of events to show (default from config)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
}

#[derive(Subcommand, Debug)]
enum IssueTerms {
    /// Pass with no trip or time limit
    Unlimited { owner: String },

    /// Pass valid until the start of a calendar day
    TimeBounded {
        owner: String,

        /// Expiration date, YYYY-MM-DD
        expires_on: String,
    },

    /// Pass with a fixed number of trips
    #[command(allow_negative_numbers = true)]
    CountBounded { owner: String, max_trips: i64 },
}

impl IssueTerms {
    fn into_spec(self) -> PassSpec {
        match self {
            IssueTerms::Unlimited { owner } => PassSpec::unlimited(owner),
            IssueTerms::TimeBounded { owner, expires_on } => {
                PassSpec::time_bounded(owner, expires_on)
            }
            IssueTerms::CountBounded { owner, max_trips } => {
                PassSpec::count_bounded(owner, max_trips)
            }
        }
    }
}

/// Load the catalog. A missing default config is not an error; an explicit one is.
fn load_catalog(explicit: Option<&Path>) -> Result<Catalog> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let path = default_config_path();
            if !path.exists() {
                debug!(config_path = %path.display(), "No config file, using defaults");
                return Ok(Catalog::default());
            }
            path
        }
    };

    let catalog = load_config(&path)
        .with_context(|| format!("Failed to load config from {:?}", path))?;

    info!(
        config_path = %path.display(),
        pass_count = catalog.passes.len(),
        "Configuration loaded"
    );

    Ok(catalog)
}

/// Open the on-disk store and rebuild the registry from it
///
/// The catalog is issued only when the store holds no passes yet.
fn open_registry(data_dir: Option<PathBuf>, catalog: &Catalog) -> Result<PassRegistry> {
    let data_dir = data_dir.unwrap_or_else(|| catalog.service.data_dir.clone());

    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

    let db_path = data_dir.join(DATABASE_FILENAME);
    let store: Arc<dyn Store> = Arc::new(
        SqliteStore::open(&db_path)
            .with_context(|| format!("Failed to open database {:?}", db_path))?,
    );

    if !store.is_healthy() {
        bail!("Database {:?} is not usable", db_path);
    }

    info!(db_path = %db_path.display(), "Store initialized");

    let mut registry = PassRegistry::restore(Arc::new(SystemClock), store)
        .context("Failed to restore passes from store")?;

    if registry.is_empty() && !catalog.passes.is_empty() {
        registry
            .issue_all(&catalog.passes)
            .context("Failed to issue configured passes")?;
    }

    Ok(registry)
}

fn run_command(
    registry: &mut PassRegistry,
    command: PassCommand,
    catalog: &Catalog,
    out: &mut impl Write,
) -> Result<ExitCode> {
    match command {
        PassCommand::Issue { terms } => {
            let pass_id = registry
                .issue(&terms.into_spec())
                .context("Failed to issue pass")?;
            writeln!(out, "Issued {}", describe_pass(&registry.info(pass_id)?))?;
        }

        PassCommand::Consume { pass_id } => {
            let outcome = registry.consume(pass_id)?;
            write_consume(out, &registry.info(pass_id)?, &outcome)?;
            if !outcome.result.is_consumed() {
                return Ok(ExitCode::from(1));
            }
        }

        PassCommand::Activate { pass_id } => {
            if let Some(message) = status_message(&registry.activate(pass_id)?) {
                writeln!(out, "{}", message)?;
            }
        }

        PassCommand::Deactivate { pass_id } => {
            if let Some(message) = status_message(&registry.deactivate(pass_id)?) {
                writeln!(out, "{}", message)?;
            }
        }

        PassCommand::List => {
            let passes = registry.list();
            if passes.is_empty() {
                writeln!(out, "No passes issued")?;
            }
            for info in &passes {
                writeln!(out, "{}", describe_pass(info))?;
            }
        }

        PassCommand::Audit { pass_id, limit } => {
            let limit = limit.unwrap_or(catalog.service.audit_limit);
            let events = match pass_id {
                Some(pass_id) => registry.pass_audits(pass_id, limit)?,
                None => registry.recent_audits(limit)?,
            };
            for event in &events {
                writeln!(out, "{}", describe_audit(event))?;
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Logs go to stderr so command output stays clean
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    debug!(version = env!("CARGO_PKG_VERSION"), "farepass starting");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match args.command {
        // The demo never touches the config or the on-disk store
        Command::Demo => {
            demo::run(&mut out, SystemClock.now())?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Pass(command) => {
            let catalog = load_catalog(args.config.as_deref())?;
            let mut registry = open_registry(args.data_dir, &catalog)?;
            run_command(&mut registry, command, &catalog, &mut out)
        }
    }
}
