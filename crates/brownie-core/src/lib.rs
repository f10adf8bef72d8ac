//! # brownie-core: Pure Business Logic for Brownie Book
//!
//! This crate is the **heart** of Brownie Book. It holds the domain records
//! and the aggregation engine as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Brownie Book Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              brownie-app (Ledger controller + CLI)              │   │
//! │  │    add_sale, update_purchase, dashboard, report, legacy ...     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ brownie-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  summary  │  │ customers │  │  reports  │  │   │
//! │  │   │ Purchase  │  │ Financial │  │  upsert   │  │  monthly  │  │   │
//! │  │   │   Sale    │  │  Summary  │  │ recompute │  │  top-N    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                brownie-db (Record Store layer)                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (Purchase, Sale, Customer, OwnerId)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`summary`] - FinancialSummary reduction
//! - [`customers`] - Customer upsert, recompute and search
//! - [`reports`] - Monthly rollup, payment/flavour breakdowns, top customers
//! - [`dates`] - Month bounds and Brazilian date formatting
//! - [`validation`] - Form input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use brownie_core::money::Money;
//! use brownie_core::summary::compute_financial_summary;
//!
//! let summary = compute_financial_summary(&[], &[]);
//! assert_eq!(summary.net_profit, Money::zero());
//! assert_eq!(summary.profit_margin, 0.0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod customers;
pub mod dates;
pub mod error;
pub mod money;
pub mod reports;
pub mod summary;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use summary::FinancialSummary;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum brownies on a single purchase or sale.
///
/// ## Business Reason
/// Catches typos such as 10000 instead of 100 before they skew the
/// stock and average-cost figures.
pub const MAX_QUANTITY: i64 = 100_000;

/// Largest amount accepted for a unit price or a purchase total
/// (R$ 1.000.000,00).
///
/// ## Business Reason
/// Keeps `unit price × MAX_QUANTITY` and every report sum well inside
/// the i64 centavo range.
pub const MAX_AMOUNT: Money = Money::from_cents(100_000_000);

/// Number of entries shown in the top-customers report.
pub const TOP_CUSTOMERS_LIMIT: usize = 5;
