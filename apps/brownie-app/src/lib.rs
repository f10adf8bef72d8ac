//! # Brownie Book Application Library
//!
//! Everything behind the `brownie` binary: configuration, the [`state::Ledger`]
//! controller and the command-line surface.
//!
//! ## Module Organization
//! ```text
//! brownie_app_lib/
//! ├── lib.rs          ◄─── You are here (CLI parsing, startup & run)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── config.rs   ◄─── AppConfig (toml + BROWNIE_* env)
//! │   ├── session.rs  ◄─── Signed-in owner
//! │   └── ledger.rs   ◄─── Snapshot + Record Store controller
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command enum, dispatch, output
//! │   ├── purchase.rs ◄─── purchase add|edit|delete|list
//! │   ├── sale.rs     ◄─── sale add|edit|delete|list
//! │   ├── customer.rs ◄─── customers, customer <NAME>
//! │   ├── report.rs   ◄─── dashboard, report
//! │   └── legacy.rs   ◄─── legacy status|migrate|detach
//! └── error.rs        ◄─── ApiError (code + message)
//! ```
//!
//! ## Startup Sequence
//! 1. Parse the command line
//! 2. Initialize tracing (stderr, `RUST_LOG`)
//! 3. Load configuration (file, environment, then `--db`/`--owner`)
//! 4. Connect to the database & run migrations
//! 5. Sign in as the configured owner, loading the snapshot
//! 6. Dispatch the command and print its output

pub mod commands;
pub mod error;
pub mod state;

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use brownie_db::{Database, DbConfig};
use commands::{dispatch, Command, Context};
use error::ApiError;
use state::{AppConfig, Ledger};

/// Brownie Book: purchases, sales and profit for a home brownie business.
#[derive(Debug, Parser)]
#[command(name = "brownie", version, about)]
pub struct Cli {
    /// Config file (default: brownie.toml in the platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database file, overriding config and BROWNIE_DB_PATH
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Owner id to sign in as, overriding config and BROWNIE_OWNER_ID
    #[arg(long, global = true)]
    pub owner: Option<String>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// File, then environment, then flags; validated once all three are in.
    fn load_config(&self) -> Result<AppConfig, ApiError> {
        let mut config = AppConfig::load(self.config.as_deref())?;
        self.apply_to(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Command-line flags win over file and environment.
    fn apply_to(&self, config: &mut AppConfig) {
        if let Some(path) = &self.db {
            config.store.database_path = Some(path.clone());
        }
        if let Some(owner) = &self.owner {
            config.session.owner_id = Some(owner.clone());
        }
    }
}

/// Runs the `brownie` binary.
///
/// Output goes to stdout, errors and logs to stderr.
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let as_json = cli.json;
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            report_error(&ApiError::internal(format!("Cannot start runtime: {}", e)), as_json);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(execute(cli)) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            report_error(&err, as_json);
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli) -> Result<String, ApiError> {
    let config = cli.load_config()?;

    let db_path = config.database_path()?;
    info!(path = %db_path.display(), "Using database");

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let ledger = Ledger::new(Arc::new(db.clone()));

    match config.owner()? {
        Some(owner) => ledger.sign_in(owner).await?,
        None => debug!("No owner configured, running signed out"),
    }

    let ctx = Context {
        ledger: &ledger,
        display: &config.display,
    };
    let result = dispatch(cli.command, &ctx).await;
    db.close().await;

    result?.render(cli.json)
}

fn report_error(err: &ApiError, as_json: bool) {
    if as_json {
        if let Ok(json) = serde_json::to_string_pretty(err) {
            eprintln!("{}", json);
            return;
        }
    }
    eprintln!("{}", err);
}

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG` env var takes precedence
/// - Default: `info,brownie=debug,sqlx=warn`
///
/// Logs go to stderr so command output stays clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,brownie=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
