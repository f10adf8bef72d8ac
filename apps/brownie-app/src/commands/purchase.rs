//! # Purchase Commands
//!
//! `brownie purchase add|edit|delete|list`
//!
//! Amounts and dates are taken as typed (`12,50`, `R$ 150,00`,
//! `10/03/2024`) and parsed by the core validators.

use clap::{Args, Subcommand};
use serde_json::json;
use std::fmt::Write;

use brownie_core::dates::{format_date_br, parse_date};
use brownie_core::validation::{parse_money, parse_quantity};
use brownie_core::{Purchase, PurchaseInput};

use super::{today, Context, Output};
use crate::error::ApiError;
use crate::state::DisplayConfig;

#[derive(Debug, Subcommand)]
pub enum PurchaseCommand {
    /// Record a purchase
    Add(PurchaseArgs),

    /// Change fields of a purchase; omitted fields keep their value
    Edit {
        id: String,
        #[command(flatten)]
        changes: PurchaseChanges,
    },

    /// Delete a purchase
    Delete { id: String },

    /// List purchases, newest first
    List,
}

#[derive(Debug, Args)]
pub struct PurchaseArgs {
    /// Purchase date (YYYY-MM-DD or DD/MM/YYYY), today if omitted
    #[arg(long)]
    pub date: Option<String>,

    /// Number of brownies
    #[arg(long, short)]
    pub quantity: String,

    /// Total paid (e.g. 150,00)
    #[arg(long, short)]
    pub total: String,

    #[arg(long)]
    pub supplier: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Debug, Args)]
pub struct PurchaseChanges {
    #[arg(long)]
    pub date: Option<String>,

    #[arg(long, short)]
    pub quantity: Option<String>,

    #[arg(long, short)]
    pub total: Option<String>,

    #[arg(long)]
    pub supplier: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,
}

impl PurchaseArgs {
    fn into_input(self) -> Result<PurchaseInput, ApiError> {
        let date = match self.date {
            Some(raw) => parse_date(&raw)?,
            None => today(),
        };

        Ok(PurchaseInput {
            date,
            quantity: parse_quantity(&self.quantity)?,
            total_value: parse_money(&self.total, "total value")?,
            supplier: self.supplier,
            notes: self.notes,
        })
    }
}

impl PurchaseChanges {
    /// Applies the given changes over an existing purchase.
    ///
    /// An empty `--supplier ""` or `--notes ""` clears the field.
    fn apply_to(self, current: &Purchase) -> Result<PurchaseInput, ApiError> {
        Ok(PurchaseInput {
            date: match self.date {
                Some(raw) => parse_date(&raw)?,
                None => current.date,
            },
            quantity: match self.quantity {
                Some(raw) => parse_quantity(&raw)?,
                None => current.quantity,
            },
            total_value: match self.total {
                Some(raw) => parse_money(&raw, "total value")?,
                None => current.total_value,
            },
            supplier: self.supplier.or_else(|| current.supplier.clone()),
            notes: self.notes.or_else(|| current.notes.clone()),
        })
    }
}

pub async fn run(ctx: &Context<'_>, command: PurchaseCommand) -> Result<Output, ApiError> {
    match command {
        PurchaseCommand::Add(args) => {
            let purchase = ctx.ledger.add_purchase(args.into_input()?).await?;
            let text = format!("Purchase recorded\n{}", purchase_line(&purchase, ctx.display));
            Output::new(&purchase, text)
        }
        PurchaseCommand::Edit { id, changes } => {
            let current = ctx.ledger.find_purchase(&id).await?;
            let input = changes.apply_to(&current)?;
            let purchase = ctx.ledger.update_purchase(&id, input).await?;
            let text = format!("Purchase updated\n{}", purchase_line(&purchase, ctx.display));
            Output::new(&purchase, text)
        }
        PurchaseCommand::Delete { id } => {
            ctx.ledger.delete_purchase(&id).await?;
            Output::new(&json!({ "deleted": id }), format!("Purchase {} deleted", id))
        }
        PurchaseCommand::List => {
            let purchases = ctx.ledger.purchases().await;
            Output::new(&purchases, render_list(&purchases, ctx.display))
        }
    }
}

fn purchase_line(purchase: &Purchase, display: &DisplayConfig) -> String {
    format!(
        "{}  {:>5} un  {:>14}  ({}/un)  {}  {}",
        format_date_br(purchase.date),
        purchase.quantity,
        display.format_currency(purchase.total_value),
        display.format_currency(purchase.unit_cost()),
        purchase.supplier.as_deref().unwrap_or("-"),
        purchase.id,
    )
}

fn render_list(purchases: &[Purchase], display: &DisplayConfig) -> String {
    if purchases.is_empty() {
        return "No purchases recorded".to_string();
    }

    let mut out = String::new();
    for purchase in purchases {
        let _ = writeln!(out, "{}", purchase_line(purchase, display));
    }
    let _ = write!(out, "{} purchases", purchases.len());
    out
}
