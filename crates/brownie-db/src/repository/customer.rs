//! # Customer Repository
//!
//! Customers are derived rows: the application recomputes them from sales
//! and hands this repository a [`CustomerDiff`] to apply.
//!
//! ## Diff Application
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │    INSERT  diff.inserted   (owner_id = owner)                           │
//! │    UPDATE  diff.updated    WHERE id = ? AND owner_id = owner            │
//! │    DELETE  diff.removed    WHERE id = ? AND owner_id = owner            │
//! │  COMMIT    ← any failure rolls the whole diff back                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use brownie_core::customers::CustomerDiff;
use brownie_core::{Customer, OwnerId};

use super::{ensure_affected, tx_error};
use crate::error::DbResult;

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Lists the owner's customers, newest first.
    pub async fn list_for_owner(&self, owner: &OwnerId) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT
                id, name, total_spent, total_purchases,
                last_purchase_date, created_at
            FROM customers
            WHERE owner_id = ?1
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Inserts a single customer. `None` writes a legacy (unowned) row.
    pub async fn insert(&self, owner: Option<&OwnerId>, customer: &Customer) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        insert_on(&mut conn, owner, customer).await
    }

    /// Applies a customer diff in one transaction.
    pub async fn apply_diff(&self, owner: &OwnerId, diff: &CustomerDiff) -> DbResult<()> {
        if diff.is_empty() {
            return Ok(());
        }

        debug!(
            owner = %owner,
            inserted = diff.inserted.len(),
            updated = diff.updated.len(),
            removed = diff.removed.len(),
            "Applying customer diff"
        );

        let mut tx = self.pool.begin().await.map_err(tx_error)?;
        apply_diff_on(&mut tx, owner, diff).await?;
        tx.commit().await.map_err(tx_error)?;
        Ok(())
    }

    /// Counts customers for an owner, or legacy rows when `owner` is `None`.
    pub async fn count(&self, owner: Option<&OwnerId>) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM customers WHERE owner_id IS ?1")
                .bind(owner.map(OwnerId::as_str))
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

/// Runs the diff's statements on `conn`; the caller owns the transaction.
pub(crate) async fn apply_diff_on(
    conn: &mut SqliteConnection,
    owner: &OwnerId,
    diff: &CustomerDiff,
) -> DbResult<()> {
    for customer in &diff.inserted {
        insert_on(conn, Some(owner), customer).await?;
    }

    for customer in &diff.updated {
        let result = sqlx::query(
            r#"
            UPDATE customers SET
                name = ?3,
                total_spent = ?4,
                total_purchases = ?5,
                last_purchase_date = ?6
            WHERE id = ?1 AND owner_id = ?2
            "#,
        )
        .bind(&customer.id)
        .bind(owner.as_str())
        .bind(&customer.name)
        .bind(customer.total_spent)
        .bind(customer.total_purchases)
        .bind(customer.last_purchase_date)
        .execute(&mut *conn)
        .await?;
        ensure_affected(result, "Customer", &customer.id)?;
    }

    for id in &diff.removed {
        let result = sqlx::query("DELETE FROM customers WHERE id = ?1 AND owner_id = ?2")
            .bind(id)
            .bind(owner.as_str())
            .execute(&mut *conn)
            .await?;
        ensure_affected(result, "Customer", id)?;
    }

    Ok(())
}

async fn insert_on(
    conn: &mut SqliteConnection,
    owner: Option<&OwnerId>,
    customer: &Customer,
) -> DbResult<()> {
    debug!(id = %customer.id, name = %customer.name, "Inserting customer");

    sqlx::query(
        r#"
        INSERT INTO customers (
            id, owner_id, name, total_spent, total_purchases,
            last_purchase_date, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&customer.id)
    .bind(owner.map(OwnerId::as_str))
    .bind(&customer.name)
    .bind(customer.total_spent)
    .bind(customer.total_purchases)
    .bind(customer.last_purchase_date)
    .bind(customer.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use crate::repository::fixtures::{owner_a, owner_b, sale};
    use brownie_core::customers::{diff_customers, recompute_customers};

    async fn repo() -> CustomerRepository {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.customers()
    }

    #[tokio::test]
    async fn test_apply_diff_round_trip() {
        let repo = repo().await;
        let owner = owner_a();

        let sales = vec![sale("Maria", 5, 800, 0), sale("Ana", 1, 800, 1)];
        let customers = recompute_customers(&[], &sales);
        repo.apply_diff(&owner, &diff_customers(&[], &customers))
            .await
            .unwrap();

        let stored = repo.list_for_owner(&owner).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored.iter().all(|c| customers.contains(c)));

        // Ana's sale goes away, Maria buys again.
        let sales = vec![sales[0].clone(), sale("maria", 1, 800, 2)];
        let next = recompute_customers(&stored, &sales);
        repo.apply_diff(&owner, &diff_customers(&stored, &next))
            .await
            .unwrap();

        let stored = repo.list_for_owner(&owner).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].name, "Maria");
        assert_eq!(stored[0].total_purchases, 2);
    }

    #[tokio::test]
    async fn test_diff_is_atomic() {
        let repo = repo().await;
        let owner = owner_a();

        let customers = recompute_customers(&[], &[sale("Maria", 5, 800, 0)]);
        let mut diff = diff_customers(&[], &customers);
        // A removal for a row this owner does not hold fails the whole diff.
        diff.removed.push("missing-id".to_string());

        let err = repo.apply_diff(&owner, &diff).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
        assert!(repo.list_for_owner(&owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_customers_are_owner_scoped() {
        let repo = repo().await;
        let customers = recompute_customers(&[], &[sale("Maria", 5, 800, 0)]);
        repo.apply_diff(&owner_a(), &diff_customers(&[], &customers))
            .await
            .unwrap();

        assert!(repo.list_for_owner(&owner_b()).await.unwrap().is_empty());
        assert_eq!(repo.count(Some(&owner_a())).await.unwrap(), 1);
    }
}
