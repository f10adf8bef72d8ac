//! # Sale Repository
//!
//! Database operations for sales.
//!
//! ## Stored Total
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sales.total_value is written on insert and on update, exactly as the  │
//! │  Sale carries it (quantity × unit_price, computed in brownie-core).    │
//! │  Reads return it untouched; nothing here recomputes it.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`SaleRepository::apply_change`] runs the sale statement and the customer
//! diff on one transaction, so customers never disagree with stored sales.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use brownie_core::customers::CustomerDiff;
use brownie_core::{OwnerId, Sale};

use super::{customer, ensure_affected, tx_error};
use crate::error::DbResult;
use crate::store::SaleChange;

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Inserts a sale. `None` writes a legacy (unowned) row.
    pub async fn insert(&self, owner: Option<&OwnerId>, sale: &Sale) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        insert_on(&mut conn, owner, sale).await
    }

    /// Gets one of the owner's sales by ID.
    pub async fn get_by_id(&self, owner: &OwnerId, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT
                id, date, customer_name,
                quantity, unit_price, total_value,
                payment_method, brownie_type, notes, created_at
            FROM sales
            WHERE id = ?1 AND owner_id = ?2
            "#,
        )
        .bind(id)
        .bind(owner.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Lists the owner's sales, newest first.
    pub async fn list_for_owner(&self, owner: &OwnerId) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT
                id, date, customer_name,
                quantity, unit_price, total_value,
                payment_method, brownie_type, notes, created_at
            FROM sales
            WHERE owner_id = ?1
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await?;

        debug!(owner = %owner, count = sales.len(), "Listed sales");
        Ok(sales)
    }

    /// Replaces the editable fields of an owned sale, including its stored total.
    pub async fn update(&self, owner: &OwnerId, sale: &Sale) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        update_on(&mut conn, owner, sale).await
    }

    /// Deletes an owned sale.
    pub async fn delete(&self, owner: &OwnerId, id: &str) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        delete_on(&mut conn, owner, id).await
    }

    /// Writes a sale and its customer diff in one transaction.
    ///
    /// A failed customer statement rolls the sale write back with it.
    pub async fn apply_change(
        &self,
        owner: &OwnerId,
        change: SaleChange<'_>,
        customers: &CustomerDiff,
    ) -> DbResult<()> {
        debug!(
            id = %change.sale_id(),
            owner = %owner,
            customers = customers.len(),
            "Applying sale change"
        );

        let mut tx = self.pool.begin().await.map_err(tx_error)?;

        match change {
            SaleChange::Insert(sale) => insert_on(&mut tx, Some(owner), sale).await?,
            SaleChange::Update(sale) => update_on(&mut tx, owner, sale).await?,
            SaleChange::Delete(id) => delete_on(&mut tx, owner, id).await?,
        }
        customer::apply_diff_on(&mut tx, owner, customers).await?;

        tx.commit().await.map_err(tx_error)?;
        Ok(())
    }

    /// Counts sales for an owner, or legacy rows when `owner` is `None`.
    pub async fn count(&self, owner: Option<&OwnerId>) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales WHERE owner_id IS ?1")
            .bind(owner.map(OwnerId::as_str))
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

async fn insert_on(conn: &mut SqliteConnection, owner: Option<&OwnerId>, sale: &Sale) -> DbResult<()> {
    debug!(id = %sale.id, customer = %sale.customer_name, "Inserting sale");

    sqlx::query(
        r#"
        INSERT INTO sales (
            id, owner_id, date, customer_name,
            quantity, unit_price, total_value,
            payment_method, brownie_type, notes, created_at
        ) VALUES (
            ?1, ?2, ?3, ?4,
            ?5, ?6, ?7,
            ?8, ?9, ?10, ?11
        )
        "#,
    )
    .bind(&sale.id)
    .bind(owner.map(OwnerId::as_str))
    .bind(sale.date)
    .bind(&sale.customer_name)
    .bind(sale.quantity)
    .bind(sale.unit_price)
    .bind(sale.total_value)
    .bind(sale.payment_method)
    .bind(sale.brownie_type)
    .bind(&sale.notes)
    .bind(sale.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

async fn update_on(conn: &mut SqliteConnection, owner: &OwnerId, sale: &Sale) -> DbResult<()> {
    debug!(id = %sale.id, owner = %owner, "Updating sale");

    let result = sqlx::query(
        r#"
        UPDATE sales SET
            date = ?3,
            customer_name = ?4,
            quantity = ?5,
            unit_price = ?6,
            total_value = ?7,
            payment_method = ?8,
            brownie_type = ?9,
            notes = ?10
        WHERE id = ?1 AND owner_id = ?2
        "#,
    )
    .bind(&sale.id)
    .bind(owner.as_str())
    .bind(sale.date)
    .bind(&sale.customer_name)
    .bind(sale.quantity)
    .bind(sale.unit_price)
    .bind(sale.total_value)
    .bind(sale.payment_method)
    .bind(sale.brownie_type)
    .bind(&sale.notes)
    .execute(conn)
    .await?;

    ensure_affected(result, "Sale", &sale.id)
}

async fn delete_on(conn: &mut SqliteConnection, owner: &OwnerId, id: &str) -> DbResult<()> {
    debug!(id = %id, owner = %owner, "Deleting sale");

    let result = sqlx::query("DELETE FROM sales WHERE id = ?1 AND owner_id = ?2")
        .bind(id)
        .bind(owner.as_str())
        .execute(conn)
        .await?;

    ensure_affected(result, "Sale", id)
}
