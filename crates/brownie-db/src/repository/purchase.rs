//! # Purchase Repository
//!
//! Database operations for purchases (the cost side of the book).

use sqlx::SqlitePool;
use tracing::debug;

use brownie_core::{OwnerId, Purchase};

use super::ensure_affected;
use crate::error::DbResult;

/// Repository for purchase database operations.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    /// Creates a new PurchaseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    /// Inserts a purchase. `None` writes a legacy (unowned) row.
    pub async fn insert(&self, owner: Option<&OwnerId>, purchase: &Purchase) -> DbResult<()> {
        debug!(id = %purchase.id, quantity = purchase.quantity, "Inserting purchase");

        sqlx::query(
            r#"
            INSERT INTO purchases (
                id, owner_id, date, quantity, total_value,
                supplier, notes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&purchase.id)
        .bind(owner.map(OwnerId::as_str))
        .bind(purchase.date)
        .bind(purchase.quantity)
        .bind(purchase.total_value)
        .bind(&purchase.supplier)
        .bind(&purchase.notes)
        .bind(purchase.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets one of the owner's purchases by ID.
    pub async fn get_by_id(&self, owner: &OwnerId, id: &str) -> DbResult<Option<Purchase>> {
        let purchase = sqlx::query_as::<_, Purchase>(
            r#"
            SELECT id, date, quantity, total_value, supplier, notes, created_at
            FROM purchases
            WHERE id = ?1 AND owner_id = ?2
            "#,
        )
        .bind(id)
        .bind(owner.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(purchase)
    }

    /// Lists the owner's purchases, newest first.
    pub async fn list_for_owner(&self, owner: &OwnerId) -> DbResult<Vec<Purchase>> {
        let purchases = sqlx::query_as::<_, Purchase>(
            r#"
            SELECT id, date, quantity, total_value, supplier, notes, created_at
            FROM purchases
            WHERE owner_id = ?1
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await?;

        debug!(owner = %owner, count = purchases.len(), "Listed purchases");
        Ok(purchases)
    }

    /// Replaces the editable fields of an owned purchase.
    ///
    /// `created_at` is never written by an update.
    pub async fn update(&self, owner: &OwnerId, purchase: &Purchase) -> DbResult<()> {
        debug!(id = %purchase.id, owner = %owner, "Updating purchase");

        let result = sqlx::query(
            r#"
            UPDATE purchases SET
                date = ?3,
                quantity = ?4,
                total_value = ?5,
                supplier = ?6,
                notes = ?7
            WHERE id = ?1 AND owner_id = ?2
            "#,
        )
        .bind(&purchase.id)
        .bind(owner.as_str())
        .bind(purchase.date)
        .bind(purchase.quantity)
        .bind(purchase.total_value)
        .bind(&purchase.supplier)
        .bind(&purchase.notes)
        .execute(&self.pool)
        .await?;

        ensure_affected(result, "Purchase", &purchase.id)
    }

    /// Deletes an owned purchase.
    pub async fn delete(&self, owner: &OwnerId, id: &str) -> DbResult<()> {
        debug!(id = %id, owner = %owner, "Deleting purchase");

        let result = sqlx::query("DELETE FROM purchases WHERE id = ?1 AND owner_id = ?2")
            .bind(id)
            .bind(owner.as_str())
            .execute(&self.pool)
            .await?;

        ensure_affected(result, "Purchase", id)
    }

    /// Counts purchases for an owner, or legacy rows when `owner` is `None`.
    pub async fn count(&self, owner: Option<&OwnerId>) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM purchases WHERE owner_id IS ?1")
            .bind(owner.map(OwnerId::as_str))
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
