//! # Legacy Data Commands
//!
//! Records made before accounts existed have no owner.
//!
//! - `brownie legacy status`: how many are waiting
//! - `brownie legacy migrate`: import them into the signed-in owner's books
//! - `brownie legacy detach --yes`: hand the owner's records back

use clap::Subcommand;

use super::{Context, Output};
use crate::error::ApiError;

#[derive(Debug, Subcommand)]
pub enum LegacyCommand {
    /// Count unowned records
    Status,

    /// Import every unowned record into your books
    Migrate,

    /// Return all your records to the unowned pool
    Detach {
        /// Confirm; without it nothing is changed
        #[arg(long)]
        yes: bool,
    },
}

pub async fn run(ctx: &Context<'_>, command: LegacyCommand) -> Result<Output, ApiError> {
    match command {
        LegacyCommand::Status => {
            let counts = ctx.ledger.legacy_counts().await?;
            let text = if counts.is_empty() {
                "No legacy records".to_string()
            } else {
                format!(
                    "Legacy records waiting: {}\nRun `brownie legacy migrate` to import them",
                    counts
                )
            };
            Output::new(&counts, text)
        }
        LegacyCommand::Migrate => {
            let counts = ctx.ledger.migrate_legacy().await?;
            let text = if counts.is_empty() {
                "Nothing to import".to_string()
            } else {
                format!("Imported {}", counts)
            };
            Output::new(&counts, text)
        }
        LegacyCommand::Detach { yes } => {
            if !yes {
                return Err(ApiError::validation(
                    "detach moves all your records out of your account; pass --yes to confirm",
                ));
            }
            let counts = ctx.ledger.detach_to_legacy().await?;
            Output::new(&counts, format!("Detached {}", counts))
        }
    }
}
