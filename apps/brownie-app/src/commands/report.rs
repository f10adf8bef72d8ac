//! # Dashboard & Report Commands
//!
//! `brownie dashboard` prints the all-time financial summary.
//! `brownie report [--month <DATE>]` adds the monthly rollup and the
//! payment, customer and flavour breakdowns.

use chrono::NaiveDate;
use clap::Args;
use std::fmt::Write;

use brownie_core::dates::parse_date;
use brownie_core::FinancialSummary;

use super::{today, Context, Output};
use crate::error::ApiError;
use crate::state::{DisplayConfig, Report};

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Any day of the month to report (YYYY-MM, YYYY-MM-DD or DD/MM/YYYY),
    /// current month if omitted
    #[arg(long, short)]
    pub month: Option<String>,
}

pub async fn dashboard(ctx: &Context<'_>) -> Result<Output, ApiError> {
    let summary = ctx.ledger.summary().await;
    Output::new(&summary, render_summary(&summary, ctx.display))
}

pub async fn report(ctx: &Context<'_>, args: ReportArgs) -> Result<Output, ApiError> {
    let reference = match args.month.as_deref() {
        Some(raw) => parse_month(raw)?,
        None => today(),
    };

    let report = ctx
        .ledger
        .report(reference, ctx.display.top_customers_limit)
        .await;
    Output::new(&report, render_report(&report, ctx.display))
}

/// Accepts a bare `YYYY-MM` on top of the usual date formats.
fn parse_month(raw: &str) -> Result<NaiveDate, ApiError> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{}-01", raw), "%Y-%m-%d") {
        return Ok(date);
    }
    Ok(parse_date(raw)?)
}

fn render_summary(summary: &FinancialSummary, display: &DisplayConfig) -> String {
    let money = |m| display.format_currency(m);
    let mut out = String::new();

    let _ = writeln!(out, "Investment         {:>16}", money(summary.total_investment));
    let _ = writeln!(out, "Revenue            {:>16}", money(summary.total_revenue));
    let _ = writeln!(out, "Net profit         {:>16}", money(summary.net_profit));
    let _ = writeln!(out, "Profit margin      {:>15.1}%", summary.profit_margin);
    let _ = writeln!(out, "Brownies sold      {:>16}", summary.total_brownies_sold);
    let _ = writeln!(out, "Brownies in stock  {:>16}", summary.total_brownies_stock);
    let _ = writeln!(out, "Avg cost/brownie   {:>16}", money(summary.average_cost_per_brownie));
    let _ = write!(out, "Avg price/brownie  {:>16}", money(summary.average_selling_price));
    out
}

fn render_report(report: &Report, display: &DisplayConfig) -> String {
    let money = |m| display.format_currency(m);
    let month = &report.month;
    let mut out = String::new();

    let _ = writeln!(out, "Performance {}", month.month.format("%m/%Y"));
    let _ = writeln!(
        out,
        "  Investment  {:>14}  ({} purchases)",
        money(month.investment),
        month.purchases_count
    );
    let _ = writeln!(
        out,
        "  Revenue     {:>14}  ({} sales)",
        money(month.revenue),
        month.sales_count
    );
    let _ = writeln!(out, "  Profit      {:>14}", money(month.profit));
    let _ = writeln!(out, "  Sold        {:>14}", month.brownies_sold);

    if !report.payment_methods.is_empty() {
        let _ = writeln!(out, "\nPayment methods");
        for share in &report.payment_methods {
            let _ = writeln!(
                out,
                "  {:<10}  {:>14}  {:>5.1}%",
                share.method.label(),
                money(share.total),
                share.percentage
            );
        }
    }

    if !report.top_customers.is_empty() {
        let _ = writeln!(out, "\nTop customers");
        for (rank, customer) in report.top_customers.iter().enumerate() {
            let _ = writeln!(
                out,
                "  {}. {:<22}  {:>14}",
                rank + 1,
                customer.name,
                money(customer.total)
            );
        }
    }

    if !report.brownie_types.is_empty() {
        let _ = writeln!(out, "\nFlavours");
        for share in &report.brownie_types {
            let _ = writeln!(
                out,
                "  {:<14}  {:>6} un  {:>5.1}%",
                share.brownie_type.label(),
                share.quantity,
                share.percentage
            );
        }
    }

    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::{display, signed_in_ledger};
    use brownie_core::{BrownieType, Money, PaymentMethod, PurchaseInput, SaleInput};

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    #[test]
    fn test_parse_month_formats() {
        assert_eq!(parse_month("2024-02").unwrap(), day(2, 1));
        assert_eq!(parse_month("2024-02-17").unwrap(), day(2, 17));
        assert_eq!(parse_month("17/02/2024").unwrap(), day(2, 17));
        assert!(parse_month("fevereiro").is_err());
    }

    #[tokio::test]
    async fn test_dashboard_example() {
        let (_store, ledger) = signed_in_ledger().await;
        ledger
            .add_purchase(PurchaseInput {
                date: day(3, 1),
                quantity: 50,
                total_value: Money::from_cents(15000),
                supplier: None,
                notes: None,
            })
            .await
            .unwrap();
        ledger
            .add_sale(SaleInput {
                date: day(3, 10),
                customer_name: "Maria".to_string(),
                quantity: 5,
                unit_price: Money::from_cents(800),
                payment_method: PaymentMethod::Pix,
                brownie_type: BrownieType::Ninho,
                notes: None,
            })
            .await
            .unwrap();
        let display = display();
        let ctx = Context {
            ledger: &ledger,
            display: &display,
        };

        let output = dashboard(&ctx).await.unwrap();
        assert!(output.text.contains("-R$ 110,00"));
        assert!(output.text.contains("-275.0%"));
        assert_eq!(output.json["total_brownies_stock"], 45);

        let output = report(
            &ctx,
            ReportArgs {
                month: Some("2024-03".to_string()),
            },
        )
        .await
        .unwrap();
        assert!(output.text.starts_with("Performance 03/2024"));
        assert!(output.text.contains("PIX"));
        assert!(output.text.contains("1. Maria"));
        assert_eq!(output.json["month"]["sales_count"], 1);
        // Only the flavour actually sold is broken down.
        assert_eq!(output.json["brownie_types"].as_array().map(Vec::len), Some(1));
        assert_eq!(output.json["brownie_types"][0]["brownie_type"], "ninho");
    }

    #[tokio::test]
    async fn test_empty_report_has_no_breakdowns() {
        let (_store, ledger) = signed_in_ledger().await;
        let display = display();
        let ctx = Context {
            ledger: &ledger,
            display: &display,
        };

        let output = report(&ctx, ReportArgs { month: None }).await.unwrap();
        assert!(!output.text.contains("Payment methods"));
        assert!(!output.text.contains("Flavours"));
    }
}
