//! # Customer Commands
//!
//! `brownie customers [--search <TEXT>]` and `brownie customer <NAME>`.

use clap::Args;
use std::fmt::Write;

use brownie_core::dates::format_date_br;
use brownie_core::Customer;

use super::sale::sale_line;
use super::{Context, Output};
use crate::error::ApiError;
use crate::state::DisplayConfig;

#[derive(Debug, Args)]
pub struct CustomersArgs {
    /// Part of the name, ignoring case
    #[arg(long, short)]
    pub search: Option<String>,
}

#[derive(Debug, Args)]
pub struct CustomerArgs {
    /// Customer name, ignoring case
    pub name: String,
}

pub async fn list(ctx: &Context<'_>, args: CustomersArgs) -> Result<Output, ApiError> {
    let customers = ctx
        .ledger
        .customers(args.search.as_deref().unwrap_or(""))
        .await?;

    let text = if customers.is_empty() {
        match args.search {
            Some(query) => format!("No customers matching \"{}\"", query.trim()),
            None => "No customers yet".to_string(),
        }
    } else {
        let mut out = String::new();
        for customer in &customers {
            let _ = writeln!(out, "{}", customer_line(customer, ctx.display));
        }
        let _ = write!(out, "{} customers", customers.len());
        out
    };

    Output::new(&customers, text)
}

pub async fn show(ctx: &Context<'_>, args: CustomerArgs) -> Result<Output, ApiError> {
    let history = ctx.ledger.customer_history(&args.name).await?;

    let mut text = customer_line(&history.customer, ctx.display);
    for sale in &history.sales {
        let _ = write!(text, "\n  {}", sale_line(sale, ctx.display));
    }

    Output::new(&history, text)
}

fn customer_line(customer: &Customer, display: &DisplayConfig) -> String {
    format!(
        "{:<24}  {:>14}  {:>3} purchases  last {}",
        customer.name,
        display.format_currency(customer.total_spent),
        customer.total_purchases,
        customer
            .last_purchase_date
            .map(format_date_br)
            .unwrap_or_else(|| "-".to_string()),
    )
}
