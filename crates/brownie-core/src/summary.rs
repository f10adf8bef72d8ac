//! # Financial Summary
//!
//! The dashboard's numbers, reduced from the purchase and sale collections.
//!
//! ## Reduction
//! ```text
//! purchases ──┬── Σ total_value ──► total_investment ──┐
//!             └── Σ quantity ─────► bought             │
//!                                                      ▼
//! sales ──────┬── Σ total_value ──► total_revenue ──► net_profit = revenue − investment
//!             └── Σ quantity ─────► sold                profit_margin = profit / revenue × 100
//!
//! stock       = max(0, bought − sold)
//! avg cost    = investment / bought   (0 when bought = 0)
//! avg price   = revenue / sold        (0 when sold = 0)
//! ```
//!
//! Nothing here fails: empty collections give an all-zero summary.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{Purchase, Sale};

/// Derived snapshot of business health. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialSummary {
    pub total_investment: Money,
    pub total_revenue: Money,
    /// Negative while revenue has not yet covered the investment.
    pub net_profit: Money,
    /// Percentage of revenue; 0 when there is no revenue.
    pub profit_margin: f64,
    pub total_brownies_sold: i64,
    /// Never negative, even when more was sold than recorded as bought.
    pub total_brownies_stock: i64,
    pub average_cost_per_brownie: Money,
    pub average_selling_price: Money,
}

impl Default for FinancialSummary {
    fn default() -> Self {
        compute_financial_summary(&[], &[])
    }
}

/// Reduces purchases and sales into a [`FinancialSummary`].
///
/// ## Example
/// ```rust
/// use brownie_core::summary::compute_financial_summary;
///
/// let summary = compute_financial_summary(&[], &[]);
/// assert_eq!(summary.total_brownies_stock, 0);
/// assert!(summary.average_selling_price.is_zero());
/// ```
pub fn compute_financial_summary(purchases: &[Purchase], sales: &[Sale]) -> FinancialSummary {
    let total_investment: Money = purchases.iter().map(|p| p.total_value).sum();
    let total_revenue: Money = sales.iter().map(|s| s.total_value).sum();
    let bought: i64 = purchases.iter().map(|p| p.quantity).sum();
    let sold: i64 = sales.iter().map(|s| s.quantity).sum();

    let net_profit = total_revenue - total_investment;

    FinancialSummary {
        total_investment,
        total_revenue,
        net_profit,
        profit_margin: net_profit.percent_of(total_revenue),
        total_brownies_sold: sold,
        total_brownies_stock: (bought - sold).max(0),
        average_cost_per_brownie: total_investment.per_unit(bought),
        average_selling_price: total_revenue.per_unit(sold),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
