//! # Reports
//!
//! Groupings behind the reports view: the current month, payment methods,
//! best customers and flavours.
//!
//! ## Grouping Keys
//! ```text
//! ┌──────────────────────────┬───────────────────────────┬─────────────────┐
//! │ Report                   │ Key                       │ Order           │
//! ├──────────────────────────┼───────────────────────────┼─────────────────┤
//! │ payment_method_breakdown │ PaymentMethod             │ first appearance│
//! │ top_customers            │ exact customer_name       │ total desc      │
//! │ brownie_type_breakdown   │ BrownieType               │ menu order      │
//! └──────────────────────────┴───────────────────────────┴─────────────────┘
//! ```
//!
//! `top_customers` groups by the name exactly as typed, so "Ana" and "ana"
//! are two rows here while the customer list merges them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::{in_month_of, month_bounds};
use crate::money::Money;
use crate::summary::compute_financial_summary;
use crate::types::{BrownieType, PaymentMethod, Purchase, Sale};

// =============================================================================
// Monthly Rollup
// =============================================================================

/// Totals for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyRollup {
    /// First day of the month covered.
    pub month: NaiveDate,
    pub investment: Money,
    pub revenue: Money,
    pub profit: Money,
    pub brownies_sold: i64,
    pub sales_count: usize,
    pub purchases_count: usize,
}

/// Restricts both collections to the month containing `reference` and reduces them.
pub fn monthly_rollup(purchases: &[Purchase], sales: &[Sale], reference: NaiveDate) -> MonthlyRollup {
    let month_purchases: Vec<Purchase> = purchases
        .iter()
        .filter(|p| in_month_of(p.date, reference))
        .cloned()
        .collect();
    let month_sales: Vec<Sale> = sales
        .iter()
        .filter(|s| in_month_of(s.date, reference))
        .cloned()
        .collect();

    let summary = compute_financial_summary(&month_purchases, &month_sales);

    MonthlyRollup {
        month: month_bounds(reference).0,
        investment: summary.total_investment,
        revenue: summary.total_revenue,
        profit: summary.net_profit,
        brownies_sold: summary.total_brownies_sold,
        sales_count: month_sales.len(),
        purchases_count: month_purchases.len(),
    }
}

// =============================================================================
// Payment Methods
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethodShare {
    pub method: PaymentMethod,
    pub total: Money,
    /// Share of `total_revenue`, 0 when there is no revenue.
    pub percentage: f64,
}

/// Revenue per payment method, in order of first appearance.
pub fn payment_method_breakdown(sales: &[Sale], total_revenue: Money) -> Vec<PaymentMethodShare> {
    let mut groups: Vec<(PaymentMethod, Money)> = Vec::new();

    for sale in sales {
        match groups.iter_mut().find(|(m, _)| *m == sale.payment_method) {
            Some((_, total)) => *total += sale.total_value,
            None => groups.push((sale.payment_method, sale.total_value)),
        }
    }

    groups
        .into_iter()
        .map(|(method, total)| PaymentMethodShare {
            method,
            total,
            percentage: total.percent_of(total_revenue),
        })
        .collect()
}

// =============================================================================
// Top Customers
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerTotal {
    pub name: String,
    pub total: Money,
}

/// Biggest buyers by revenue, grouped by the exact name on each sale.
///
/// Ties keep first-appearance order. At most `limit` rows.
pub fn top_customers(sales: &[Sale], limit: usize) -> Vec<CustomerTotal> {
    let mut groups: Vec<CustomerTotal> = Vec::new();

    for sale in sales {
        match groups.iter_mut().find(|g| g.name == sale.customer_name) {
            Some(group) => group.total += sale.total_value,
            None => groups.push(CustomerTotal {
                name: sale.customer_name.clone(),
                total: sale.total_value,
            }),
        }
    }

    groups.sort_by(|a, b| b.total.cmp(&a.total));
    groups.truncate(limit);
    groups
}

// =============================================================================
// Flavours
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrownieTypeShare {
    pub brownie_type: BrownieType,
    pub quantity: i64,
    pub percentage: f64,
}

/// Brownies sold per flavour.
///
/// Only flavours that appear in `sales` are listed, in the order they first
/// appear. Percentages are of all brownies sold.
pub fn brownie_type_breakdown(sales: &[Sale]) -> Vec<BrownieTypeShare> {
    let mut shares: Vec<BrownieTypeShare> = Vec::new();
    for sale in sales {
        match shares.iter_mut().find(|s| s.brownie_type == sale.brownie_type) {
            Some(share) => share.quantity += sale.quantity,
            None => shares.push(BrownieTypeShare {
                brownie_type: sale.brownie_type,
                quantity: sale.quantity,
                percentage: 0.0,
            }),
        }
    }

    let total: i64 = shares.iter().map(|s| s.quantity).sum();
    if total > 0 {
        for share in &mut shares {
            share.percentage = share.quantity as f64 / total as f64 * 100.0;
        }
    }
    shares
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PurchaseInput, SaleInput};
    use crate::TOP_CUSTOMERS_LIMIT;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn purchase_on(date: NaiveDate, quantity: i64, cents: i64) -> Purchase {
        Purchase::new(
            PurchaseInput {
                date,
                quantity,
                total_value: Money::from_cents(cents),
                supplier: None,
                notes: None,
            },
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        )
    }

    fn sale(name: &str, date: NaiveDate, quantity: i64, unit: i64, method: PaymentMethod) -> Sale {
        Sale::new(
            SaleInput {
                date,
                customer_name: name.to_string(),
                quantity,
                unit_price: Money::from_cents(unit),
                payment_method: method,
                brownie_type: BrownieType::DoceDeLeite,
                notes: None,
            },
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_monthly_rollup_uses_calendar_month() {
        let purchases = vec![
            purchase_on(d(2025, 3, 1), 50, 15000),
            purchase_on(d(2025, 2, 28), 10, 3000),
        ];
        let sales = vec![
            sale("Maria", d(2025, 3, 31), 5, 800, PaymentMethod::Pix),
            sale("Ana", d(2025, 4, 1), 2, 800, PaymentMethod::Cash),
        ];

        let rollup = monthly_rollup(&purchases, &sales, d(2025, 3, 15));
        assert_eq!(rollup.month, d(2025, 3, 1));
        assert_eq!(rollup.investment, Money::from_cents(15000));
        assert_eq!(rollup.revenue, Money::from_cents(4000));
        assert_eq!(rollup.profit, Money::from_cents(-11000));
        assert_eq!(rollup.brownies_sold, 5);
        assert_eq!(rollup.sales_count, 1);
        assert_eq!(rollup.purchases_count, 1);
    }

    #[test]
    fn test_payment_breakdown_first_appearance() {
        let sales = vec![
            sale("A", d(2025, 3, 1), 1, 1000, PaymentMethod::Card),
            sale("B", d(2025, 3, 1), 3, 1000, PaymentMethod::Pix),
            sale("C", d(2025, 3, 1), 1, 1000, PaymentMethod::Card),
        ];

        let shares = payment_method_breakdown(&sales, Money::from_cents(5000));
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].method, PaymentMethod::Card);
        assert_eq!(shares[0].total, Money::from_cents(2000));
        assert_eq!(shares[0].percentage, 40.0);
        assert_eq!(shares[1].method, PaymentMethod::Pix);
        assert_eq!(shares[1].percentage, 60.0);
    }

    #[test]
    fn test_payment_breakdown_zero_revenue() {
        let sales = vec![sale("A", d(2025, 3, 1), 1, 0, PaymentMethod::Other)];
        let shares = payment_method_breakdown(&sales, Money::zero());
        assert_eq!(shares[0].percentage, 0.0);
        assert!(payment_method_breakdown(&[], Money::zero()).is_empty());
    }

    #[test]
    fn test_top_customers_is_case_sensitive() {
        let sales = vec![
            sale("Ana", d(2025, 3, 1), 1, 1000, PaymentMethod::Pix),
            sale("ana", d(2025, 3, 2), 1, 1000, PaymentMethod::Pix),
        ];

        let top = top_customers(&sales, TOP_CUSTOMERS_LIMIT);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].name, "Ana");
        assert_eq!(top[1].name, "ana");
    }

    #[test]
    fn test_top_customers_sorted_and_truncated() {
        let sales: Vec<Sale> = ["A", "B", "C", "D", "E", "F", "B"]
            .iter()
            .enumerate()
            .map(|(i, name)| sale(name, d(2025, 3, 1), 1, 100 * (i as i64 + 1), PaymentMethod::Pix))
            .collect();

        let top = top_customers(&sales, 5);
        let names: Vec<&str> = top.iter().map(|t| t.name.as_str()).collect();
        // B: 200 + 700
        assert_eq!(names, vec!["B", "F", "E", "D", "C"]);
        assert_eq!(top[0].total, Money::from_cents(900));
    }

    #[test]
    fn test_brownie_type_breakdown() {
        let mut ninho = sale("A", d(2025, 3, 1), 3, 500, PaymentMethod::Pix);
        ninho.brownie_type = BrownieType::Ninho;
        let doce = sale("B", d(2025, 3, 1), 1, 500, PaymentMethod::Pix);

        let shares = brownie_type_breakdown(&[ninho.clone(), doce, ninho]);
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].brownie_type, BrownieType::Ninho);
        assert_eq!(shares[0].quantity, 6);
        assert_eq!(shares[0].percentage, 6.0 / 7.0 * 100.0);
        assert_eq!(shares[1].brownie_type, BrownieType::DoceDeLeite);
        assert_eq!(shares[1].quantity, 1);

        assert!(brownie_type_breakdown(&[]).is_empty());
    }

    #[test]
    fn test_brownie_type_breakdown_omits_unsold_flavours() {
        let doce = sale("B", d(2025, 3, 1), 4, 500, PaymentMethod::Pix);

        let shares = brownie_type_breakdown(&[doce]);
        assert_eq!(
            shares,
            vec![BrownieTypeShare {
                brownie_type: BrownieType::DoceDeLeite,
                quantity: 4,
                percentage: 100.0,
            }]
        );
    }

    proptest! {
        /// The monthly rollup equals the summary over the month's records.
        #[test]
        fn rollup_matches_summary_of_month(
            rows in prop::collection::vec((1u32..=12, 1u32..=28, 1i64..50, 0i64..2_000), 0..16),
            month in 1u32..=12,
        ) {
            let sales: Vec<Sale> = rows
                .iter()
                .map(|&(m, day, q, unit)| sale("X", d(2025, m, day), q, unit, PaymentMethod::Pix))
                .collect();
            let purchases: Vec<Purchase> = rows
                .iter()
                .map(|&(m, day, q, unit)| purchase_on(d(2025, m, day), q, unit * 10))
                .collect();

            let reference = d(2025, month, 10);
            let rollup = monthly_rollup(&purchases, &sales, reference);

            let month_sales: Vec<Sale> = sales.iter().filter(|s| in_month_of(s.date, reference)).cloned().collect();
            let month_purchases: Vec<Purchase> = purchases.iter().filter(|p| in_month_of(p.date, reference)).cloned().collect();
            let summary = compute_financial_summary(&month_purchases, &month_sales);

            prop_assert_eq!(rollup.revenue, summary.total_revenue);
            prop_assert_eq!(rollup.investment, summary.total_investment);
            prop_assert_eq!(rollup.profit, summary.net_profit);
            prop_assert_eq!(rollup.sales_count, month_sales.len());
        }
    }
}
