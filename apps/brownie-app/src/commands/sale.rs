//! # Sale Commands
//!
//! `brownie sale add|edit|delete|list`
//!
//! Every sale change refreshes customers before the command returns, so a
//! following `brownie customers` already sees it.

use clap::{Args, Subcommand};
use serde_json::json;
use std::fmt::Write;

use brownie_core::customers::customer_sales;
use brownie_core::dates::{format_date_br, parse_date};
use brownie_core::validation::{parse_money, parse_quantity};
use brownie_core::{BrownieType, PaymentMethod, Sale, SaleInput};

use super::{today, Context, Output};
use crate::error::ApiError;
use crate::state::DisplayConfig;

#[derive(Debug, Subcommand)]
pub enum SaleCommand {
    /// Record a sale
    Add(SaleArgs),

    /// Change fields of a sale; omitted fields keep their value
    Edit {
        id: String,
        #[command(flatten)]
        changes: SaleChanges,
    },

    /// Delete a sale
    Delete { id: String },

    /// List sales, newest first
    List {
        /// Only sales to this customer (ignoring case)
        #[arg(long, short)]
        customer: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct SaleArgs {
    /// Sale date (YYYY-MM-DD or DD/MM/YYYY), today if omitted
    #[arg(long)]
    pub date: Option<String>,

    #[arg(long, short)]
    pub customer: String,

    /// Number of brownies
    #[arg(long, short)]
    pub quantity: String,

    /// Price per brownie (e.g. 8,00)
    #[arg(long, short)]
    pub price: String,

    /// cash, pix, card or other (dinheiro, cartao, outros also accepted)
    #[arg(long, default_value = "pix")]
    pub payment: String,

    /// doce-de-leite or ninho
    #[arg(long)]
    pub flavour: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Debug, Args)]
pub struct SaleChanges {
    #[arg(long)]
    pub date: Option<String>,

    #[arg(long, short)]
    pub customer: Option<String>,

    #[arg(long, short)]
    pub quantity: Option<String>,

    #[arg(long, short)]
    pub price: Option<String>,

    #[arg(long)]
    pub payment: Option<String>,

    #[arg(long)]
    pub flavour: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,
}

impl SaleArgs {
    fn into_input(self) -> Result<SaleInput, ApiError> {
        let date = match self.date {
            Some(raw) => parse_date(&raw)?,
            None => today(),
        };
        let brownie_type = match self.flavour {
            Some(raw) => raw.parse::<BrownieType>()?,
            None => BrownieType::default(),
        };

        Ok(SaleInput {
            date,
            customer_name: self.customer,
            quantity: parse_quantity(&self.quantity)?,
            unit_price: parse_money(&self.price, "unit price")?,
            payment_method: self.payment.parse::<PaymentMethod>()?,
            brownie_type,
            notes: self.notes,
        })
    }
}

impl SaleChanges {
    fn apply_to(self, current: &Sale) -> Result<SaleInput, ApiError> {
        Ok(SaleInput {
            date: match self.date {
                Some(raw) => parse_date(&raw)?,
                None => current.date,
            },
            customer_name: self.customer.unwrap_or_else(|| current.customer_name.clone()),
            quantity: match self.quantity {
                Some(raw) => parse_quantity(&raw)?,
                None => current.quantity,
            },
            unit_price: match self.price {
                Some(raw) => parse_money(&raw, "unit price")?,
                None => current.unit_price,
            },
            payment_method: match self.payment {
                Some(raw) => raw.parse()?,
                None => current.payment_method,
            },
            brownie_type: match self.flavour {
                Some(raw) => raw.parse()?,
                None => current.brownie_type,
            },
            notes: self.notes.or_else(|| current.notes.clone()),
        })
    }
}

pub async fn run(ctx: &Context<'_>, command: SaleCommand) -> Result<Output, ApiError> {
    match command {
        SaleCommand::Add(args) => {
            let sale = ctx.ledger.add_sale(args.into_input()?).await?;
            let text = format!("Sale recorded\n{}", sale_line(&sale, ctx.display));
            Output::new(&sale, text)
        }
        SaleCommand::Edit { id, changes } => {
            let current = ctx.ledger.find_sale(&id).await?;
            let input = changes.apply_to(&current)?;
            let sale = ctx.ledger.update_sale(&id, input).await?;
            let text = format!("Sale updated\n{}", sale_line(&sale, ctx.display));
            Output::new(&sale, text)
        }
        SaleCommand::Delete { id } => {
            ctx.ledger.delete_sale(&id).await?;
            Output::new(&json!({ "deleted": id }), format!("Sale {} deleted", id))
        }
        SaleCommand::List { customer } => {
            let all = ctx.ledger.sales().await;
            let sales: Vec<Sale> = match customer.as_deref() {
                Some(name) => customer_sales(&all, name).into_iter().cloned().collect(),
                None => all,
            };
            Output::new(&sales, render_list(&sales, ctx.display))
        }
    }
}

pub(crate) fn sale_line(sale: &Sale, display: &DisplayConfig) -> String {
    format!(
        "{}  {:<20}  {:>3} x {:>10} = {:>12}  {:<8}  {:<13}  {}",
        format_date_br(sale.date),
        sale.customer_name,
        sale.quantity,
        display.format_currency(sale.unit_price),
        display.format_currency(sale.total_value),
        sale.payment_method.label(),
        sale.brownie_type.label(),
        sale.id,
    )
}

fn render_list(sales: &[Sale], display: &DisplayConfig) -> String {
    if sales.is_empty() {
        return "No sales recorded".to_string();
    }

    let mut out = String::new();
    for sale in sales {
        let _ = writeln!(out, "{}", sale_line(sale, display));
    }
    let _ = write!(out, "{} sales", sales.len());
    out
}
