//! # In-Memory Record Store
//!
//! A [`RecordStore`] kept entirely in process, used by controller tests.
//!
//! ## Failure Injection
//! ```text
//! store.fail_next("timeout")             next call returns DbError::Unavailable, then recovers
//! store.fail_next_customer_write("full") next customer diff fails, after the call itself
//!                                        was accepted (mid-transaction failure)
//! store.set_offline(true)                every call returns DbError::Unavailable
//! ```
//!
//! Owner scoping and ordering follow the SQLite implementation: listings are
//! newest first, and writes to rows the owner does not hold are `NotFound`.

use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};
use tracing::warn;

use brownie_core::customers::CustomerDiff;
use brownie_core::{Customer, OwnerId, Purchase, Sale};

use crate::error::{DbError, DbResult};
use crate::store::{MigrationCounts, RecordStore, SaleChange};

#[derive(Debug, Clone)]
struct Row<T> {
    owner: Option<OwnerId>,
    record: T,
}

#[derive(Debug, Default)]
struct Tables {
    purchases: Vec<Row<Purchase>>,
    sales: Vec<Row<Sale>>,
    customers: Vec<Row<Customer>>,
    fail_next: Option<String>,
    fail_customer_write: Option<String>,
    offline: bool,
    calls: usize,
}

impl Tables {
    /// Counts the call and applies any injected failure.
    fn check(&mut self, operation: &str) -> DbResult<()> {
        self.calls += 1;
        if self.offline {
            warn!(operation, "Memory store offline");
            return Err(DbError::unavailable("store offline"));
        }
        if let Some(reason) = self.fail_next.take() {
            warn!(operation, %reason, "Injected memory store failure");
            return Err(DbError::unavailable(reason));
        }
        Ok(())
    }

    /// Applies `diff` to a copy of the customer table.
    fn customers_after(
        &mut self,
        owner: &OwnerId,
        diff: &CustomerDiff,
    ) -> DbResult<Vec<Row<Customer>>> {
        if let Some(reason) = self.fail_customer_write.take() {
            warn!(%reason, "Injected customer write failure");
            return Err(DbError::unavailable(reason));
        }

        let mut customers = self.customers.clone();
        for customer in &diff.inserted {
            insert(&mut customers, Some(owner), customer)?;
        }
        for customer in &diff.updated {
            replace(&mut customers, owner, customer, "Customer")?;
        }
        for id in &diff.removed {
            remove(&mut customers, owner, id, "Customer")?;
        }
        Ok(customers)
    }
}

/// Trait seam for anything with an id and a creation time.
trait Record: Clone {
    fn id(&self) -> &str;
    fn created_at(&self) -> chrono::DateTime<chrono::Utc>;
}

impl Record for Purchase {
    fn id(&self) -> &str {
        &self.id
    }
    fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.created_at
    }
}

impl Record for Sale {
    fn id(&self) -> &str {
        &self.id
    }
    fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.created_at
    }
}

impl Record for Customer {
    fn id(&self) -> &str {
        &self.id
    }
    fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.created_at
    }
}

fn insert<T: Record>(rows: &mut Vec<Row<T>>, owner: Option<&OwnerId>, record: &T) -> DbResult<()> {
    if rows.iter().any(|r| r.record.id() == record.id()) {
        return Err(DbError::UniqueViolation {
            field: "id".to_string(),
            value: record.id().to_string(),
        });
    }
    rows.push(Row {
        owner: owner.cloned(),
        record: record.clone(),
    });
    Ok(())
}

fn list<T: Record>(rows: &[Row<T>], owner: &OwnerId) -> Vec<T> {
    // Later insertions first among equal timestamps, like `rowid DESC`.
    let mut owned: Vec<T> = rows
        .iter()
        .rev()
        .filter(|r| r.owner.as_ref() == Some(owner))
        .map(|r| r.record.clone())
        .collect();
    owned.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
    owned
}

fn position<T: Record>(rows: &[Row<T>], owner: &OwnerId, id: &str) -> Option<usize> {
    rows.iter()
        .position(|r| r.record.id() == id && r.owner.as_ref() == Some(owner))
}

fn replace<T: Record>(rows: &mut [Row<T>], owner: &OwnerId, record: &T, entity: &str) -> DbResult<()> {
    let idx = position(rows, owner, record.id()).ok_or_else(|| DbError::not_found(entity, record.id()))?;
    rows[idx].record = record.clone();
    Ok(())
}

fn remove<T: Record>(rows: &mut Vec<Row<T>>, owner: &OwnerId, id: &str, entity: &str) -> DbResult<()> {
    let idx = position(rows, owner, id).ok_or_else(|| DbError::not_found(entity, id))?;
    rows.remove(idx);
    Ok(())
}

fn reassign<T>(rows: &mut [Row<T>], from: Option<&OwnerId>, to: Option<&OwnerId>) -> u64 {
    let mut moved = 0;
    for row in rows.iter_mut().filter(|r| r.owner.as_ref() == from) {
        row.owner = to.cloned();
        moved += 1;
    }
    moved
}

/// In-process Record Store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> DbResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| DbError::Internal("memory store lock poisoned".to_string()))
    }

    /// Makes the next store call fail with `DbError::Unavailable`.
    pub fn fail_next(&self, reason: impl Into<String>) -> DbResult<()> {
        self.tables()?.fail_next = Some(reason.into());
        Ok(())
    }

    /// Makes the next customer diff fail partway through its transaction.
    pub fn fail_next_customer_write(&self, reason: impl Into<String>) -> DbResult<()> {
        self.tables()?.fail_customer_write = Some(reason.into());
        Ok(())
    }

    /// Fails every call while offline.
    pub fn set_offline(&self, offline: bool) -> DbResult<()> {
        self.tables()?.offline = offline;
        Ok(())
    }

    /// Number of trait calls made so far, failed ones included.
    pub fn calls(&self) -> DbResult<usize> {
        Ok(self.tables()?.calls)
    }

    /// Adds an unowned purchase, as if recorded before accounts existed.
    pub fn seed_legacy_purchase(&self, purchase: Purchase) -> DbResult<()> {
        insert(&mut self.tables()?.purchases, None, &purchase)
    }

    /// Adds an unowned sale.
    pub fn seed_legacy_sale(&self, sale: Sale) -> DbResult<()> {
        insert(&mut self.tables()?.sales, None, &sale)
    }

    /// Adds an unowned customer.
    pub fn seed_legacy_customer(&self, customer: Customer) -> DbResult<()> {
        insert(&mut self.tables()?.customers, None, &customer)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert_purchase(&self, owner: &OwnerId, purchase: &Purchase) -> DbResult<()> {
        let mut t = self.tables()?;
        t.check("insert_purchase")?;
        insert(&mut t.purchases, Some(owner), purchase)
    }

    async fn list_purchases(&self, owner: &OwnerId) -> DbResult<Vec<Purchase>> {
        let mut t = self.tables()?;
        t.check("list_purchases")?;
        Ok(list(&t.purchases, owner))
    }

    async fn update_purchase(&self, owner: &OwnerId, purchase: &Purchase) -> DbResult<()> {
        let mut t = self.tables()?;
        t.check("update_purchase")?;
        replace(&mut t.purchases, owner, purchase, "Purchase")
    }

    async fn delete_purchase(&self, owner: &OwnerId, id: &str) -> DbResult<()> {
        let mut t = self.tables()?;
        t.check("delete_purchase")?;
        remove(&mut t.purchases, owner, id, "Purchase")
    }

    async fn insert_sale(&self, owner: &OwnerId, sale: &Sale) -> DbResult<()> {
        let mut t = self.tables()?;
        t.check("insert_sale")?;
        insert(&mut t.sales, Some(owner), sale)
    }

    async fn list_sales(&self, owner: &OwnerId) -> DbResult<Vec<Sale>> {
        let mut t = self.tables()?;
        t.check("list_sales")?;
        Ok(list(&t.sales, owner))
    }

    async fn update_sale(&self, owner: &OwnerId, sale: &Sale) -> DbResult<()> {
        let mut t = self.tables()?;
        t.check("update_sale")?;
        replace(&mut t.sales, owner, sale, "Sale")
    }

    async fn delete_sale(&self, owner: &OwnerId, id: &str) -> DbResult<()> {
        let mut t = self.tables()?;
        t.check("delete_sale")?;
        remove(&mut t.sales, owner, id, "Sale")
    }

    async fn list_customers(&self, owner: &OwnerId) -> DbResult<Vec<Customer>> {
        let mut t = self.tables()?;
        t.check("list_customers")?;
        Ok(list(&t.customers, owner))
    }

    async fn apply_customer_diff(&self, owner: &OwnerId, diff: &CustomerDiff) -> DbResult<()> {
        let mut t = self.tables()?;
        t.check("apply_customer_diff")?;

        // Work on a copy so a failing step leaves the table untouched.
        t.customers = t.customers_after(owner, diff)?;
        Ok(())
    }

    async fn apply_sale_change(
        &self,
        owner: &OwnerId,
        change: SaleChange<'_>,
        customers: &CustomerDiff,
    ) -> DbResult<()> {
        let mut t = self.tables()?;
        t.check("apply_sale_change")?;

        let mut sales = t.sales.clone();
        match change {
            SaleChange::Insert(sale) => insert(&mut sales, Some(owner), sale)?,
            SaleChange::Update(sale) => replace(&mut sales, owner, sale, "Sale")?,
            SaleChange::Delete(id) => remove(&mut sales, owner, id, "Sale")?,
        }
        let after = t.customers_after(owner, customers)?;

        t.sales = sales;
        t.customers = after;
        Ok(())
    }

    async fn migrate_legacy(&self, owner: &OwnerId) -> DbResult<MigrationCounts> {
        let mut t = self.tables()?;
        t.check("migrate_legacy")?;
        Ok(MigrationCounts {
            purchases: reassign(&mut t.purchases, None, Some(owner)),
            sales: reassign(&mut t.sales, None, Some(owner)),
            customers: reassign(&mut t.customers, None, Some(owner)),
        })
    }

    async fn detach_to_legacy(&self, owner: &OwnerId) -> DbResult<MigrationCounts> {
        let mut t = self.tables()?;
        t.check("detach_to_legacy")?;
        Ok(MigrationCounts {
            purchases: reassign(&mut t.purchases, Some(owner), None),
            sales: reassign(&mut t.sales, Some(owner), None),
            customers: reassign(&mut t.customers, Some(owner), None),
        })
    }

    async fn legacy_counts(&self) -> DbResult<MigrationCounts> {
        let mut t = self.tables()?;
        t.check("legacy_counts")?;
        Ok(MigrationCounts {
            purchases: t.purchases.iter().filter(|r| r.owner.is_none()).count() as u64,
            sales: t.sales.iter().filter(|r| r.owner.is_none()).count() as u64,
            customers: t.customers.iter().filter(|r| r.owner.is_none()).count() as u64,
        })
    }
}
