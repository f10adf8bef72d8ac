//! # Commands Module
//!
//! Every subcommand of the `brownie` binary.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (dispatch + output)
//! ├── purchase.rs  ◄─── purchase add|edit|delete|list
//! ├── sale.rs      ◄─── sale add|edit|delete|list
//! ├── customer.rs  ◄─── customers [--search], customer <NAME>
//! ├── report.rs    ◄─── dashboard, report [--month]
//! └── legacy.rs    ◄─── legacy status|migrate|detach
//! ```
//!
//! ## How Commands Work
//! ```text
//! brownie sale add --customer Maria --quantity 5 --price 8,00
//!         │
//!         ▼
//! clap parses into Command::Sale(SaleCommand::Add(..))
//!         │
//!         ▼
//! dispatch() → sale::run(ctx, cmd)
//!         │      parse raw strings (dates, money) → SaleInput
//!         │      ctx.ledger.add_sale(input).await?
//!         ▼
//! Output { json, text } → stdout (text, or JSON with --json)
//! ```

pub mod customer;
pub mod legacy;
pub mod purchase;
pub mod report;
pub mod sale;

use clap::Subcommand;
use serde::Serialize;

use crate::error::ApiError;
use crate::state::{DisplayConfig, Ledger};

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Record and manage purchases (inventory investment)
    #[command(subcommand)]
    Purchase(purchase::PurchaseCommand),

    /// Record and manage sales
    #[command(subcommand)]
    Sale(sale::SaleCommand),

    /// List customers, biggest spenders first
    Customers(customer::CustomersArgs),

    /// Show one customer and their sales
    Customer(customer::CustomerArgs),

    /// Financial summary of all records
    Dashboard,

    /// Monthly performance and breakdowns
    Report(report::ReportArgs),

    /// Import or release records made before accounts existed
    #[command(subcommand)]
    Legacy(legacy::LegacyCommand),
}

/// What a command needs to run.
pub struct Context<'a> {
    pub ledger: &'a Ledger,
    pub display: &'a DisplayConfig,
}

/// Command result, rendered as text or JSON.
#[derive(Debug)]
pub struct Output {
    pub json: serde_json::Value,
    pub text: String,
}

impl Output {
    pub fn new<T: Serialize>(value: &T, text: impl Into<String>) -> Result<Self, ApiError> {
        let json = serde_json::to_value(value)
            .map_err(|e| ApiError::internal(format!("Cannot serialize output: {}", e)))?;
        Ok(Output {
            json,
            text: text.into(),
        })
    }

    pub fn render(&self, as_json: bool) -> Result<String, ApiError> {
        if as_json {
            serde_json::to_string_pretty(&self.json)
                .map_err(|e| ApiError::internal(format!("Cannot serialize output: {}", e)))
        } else {
            Ok(self.text.clone())
        }
    }
}

/// Runs one command against the ledger.
pub async fn dispatch(command: Command, ctx: &Context<'_>) -> Result<Output, ApiError> {
    match command {
        Command::Purchase(cmd) => purchase::run(ctx, cmd).await,
        Command::Sale(cmd) => sale::run(ctx, cmd).await,
        Command::Customers(args) => customer::list(ctx, args).await,
        Command::Customer(args) => customer::show(ctx, args).await,
        Command::Dashboard => report::dashboard(ctx).await,
        Command::Report(args) => report::report(ctx, args).await,
        Command::Legacy(cmd) => legacy::run(ctx, cmd).await,
    }
}

/// Today's date in the local time zone, the form default.
pub(crate) fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::sync::Arc;

    use brownie_core::OwnerId;
    use brownie_db::MemoryStore;

    use crate::state::{DisplayConfig, Ledger};

    pub fn owner() -> OwnerId {
        OwnerId::parse("11111111-1111-4111-8111-111111111111").unwrap()
    }

    pub async fn signed_in_ledger() -> (Arc<MemoryStore>, Ledger) {
        let store = Arc::new(MemoryStore::new());
        let ledger = Ledger::new(store.clone());
        ledger.sign_in(owner()).await.unwrap();
        (store, ledger)
    }

    pub fn display() -> DisplayConfig {
        DisplayConfig::default()
    }
}
