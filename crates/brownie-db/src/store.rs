//! # Record Store
//!
//! The data-access seam between the application controller and storage.
//!
//! ## Owner Scoping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         RecordStore                                     │
//! │                                                                         │
//! │  owner A ──► list / update / delete ──► rows WHERE owner_id = A         │
//! │  owner B ──► update(A's id)          ──► NotFound (never touches A)     │
//! │                                                                         │
//! │  legacy rows (owner_id IS NULL)                                         │
//! │     │  migrate_legacy(A)   ─► owner_id = A      (one transaction)       │
//! │     ◄─ detach_to_legacy(A) ─  owner_id = NULL   (one transaction)       │
//! │                                                                         │
//! │  apply_sale_change(A, Insert/Update/Delete, customer diff)              │
//! │     sale row + customer rows ─► one transaction, or nothing at all      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Implemented by [`crate::Database`] (SQLite) and [`crate::MemoryStore`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use brownie_core::customers::CustomerDiff;
use brownie_core::{Customer, OwnerId, Purchase, Sale};

use crate::error::DbResult;

/// Rows touched per table by a legacy migration or detach.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationCounts {
    pub purchases: u64,
    pub sales: u64,
    pub customers: u64,
}

impl MigrationCounts {
    pub fn total(&self) -> u64 {
        self.purchases + self.sales + self.customers
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl fmt::Display for MigrationCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} purchases, {} sales, {} customers",
            self.purchases, self.sales, self.customers
        )
    }
}

/// A single sale write.
///
/// Handed to [`RecordStore::apply_sale_change`] together with the customer
/// diff the write causes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SaleChange<'a> {
    Insert(&'a Sale),
    Update(&'a Sale),
    Delete(&'a str),
}

impl SaleChange<'_> {
    /// Id of the sale being written.
    pub fn sale_id(&self) -> &str {
        match self {
            SaleChange::Insert(sale) | SaleChange::Update(sale) => &sale.id,
            SaleChange::Delete(id) => id,
        }
    }
}

/// Owner-scoped persistence for purchases, sales and customers.
///
/// Listings are ordered newest first (`created_at` descending). Updates and
/// deletes of a row the owner does not hold fail with `DbError::NotFound`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    // Purchases
    async fn insert_purchase(&self, owner: &OwnerId, purchase: &Purchase) -> DbResult<()>;
    async fn list_purchases(&self, owner: &OwnerId) -> DbResult<Vec<Purchase>>;
    async fn update_purchase(&self, owner: &OwnerId, purchase: &Purchase) -> DbResult<()>;
    async fn delete_purchase(&self, owner: &OwnerId, id: &str) -> DbResult<()>;

    // Sales
    async fn insert_sale(&self, owner: &OwnerId, sale: &Sale) -> DbResult<()>;
    async fn list_sales(&self, owner: &OwnerId) -> DbResult<Vec<Sale>>;
    async fn update_sale(&self, owner: &OwnerId, sale: &Sale) -> DbResult<()>;
    async fn delete_sale(&self, owner: &OwnerId, id: &str) -> DbResult<()>;

    // Customers
    async fn list_customers(&self, owner: &OwnerId) -> DbResult<Vec<Customer>>;

    /// Applies inserts, updates and deletes atomically.
    async fn apply_customer_diff(&self, owner: &OwnerId, diff: &CustomerDiff) -> DbResult<()>;

    /// Writes a sale and the customer diff it causes in one transaction.
    ///
    /// If either part fails, neither the sale nor any customer row changes.
    async fn apply_sale_change(
        &self,
        owner: &OwnerId,
        change: SaleChange<'_>,
        customers: &CustomerDiff,
    ) -> DbResult<()>;

    // Legacy data
    /// Assigns every unowned row to `owner` in one transaction.
    async fn migrate_legacy(&self, owner: &OwnerId) -> DbResult<MigrationCounts>;

    /// Returns every row of `owner` to the unowned pool in one transaction.
    async fn detach_to_legacy(&self, owner: &OwnerId) -> DbResult<MigrationCounts>;

    /// Counts unowned rows.
    async fn legacy_counts(&self) -> DbResult<MigrationCounts>;
}
