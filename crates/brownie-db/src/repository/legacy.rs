//! # Legacy Repository
//!
//! Moves rows between the unowned (legacy) pool and an account.
//!
//! ## Legacy Data
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Rows written before accounts existed carry owner_id = NULL.           │
//! │                                                                         │
//! │   migrate(owner)   UPDATE .. SET owner_id = owner WHERE owner_id IS NULL│
//! │   detach(owner)    UPDATE .. SET owner_id = NULL  WHERE owner_id = owner│
//! │                                                                         │
//! │  All three tables move inside one transaction: either every row moves │
//! │  or none does.                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::info;

use brownie_core::OwnerId;

use super::tx_error;
use crate::error::DbResult;
use crate::store::MigrationCounts;

const TABLES: [&str; 3] = ["purchases", "sales", "customers"];

/// Repository for legacy-data operations.
#[derive(Debug, Clone)]
pub struct LegacyRepository {
    pool: SqlitePool,
}

impl LegacyRepository {
    /// Creates a new LegacyRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LegacyRepository { pool }
    }

    /// Assigns every unowned row to `owner`.
    pub async fn migrate(&self, owner: &OwnerId) -> DbResult<MigrationCounts> {
        let counts = self
            .reassign("UPDATE {table} SET owner_id = ?1 WHERE owner_id IS NULL", owner)
            .await?;
        info!(owner = %owner, %counts, "Legacy data migrated");
        Ok(counts)
    }

    /// Returns every row of `owner` to the unowned pool.
    pub async fn detach(&self, owner: &OwnerId) -> DbResult<MigrationCounts> {
        let counts = self
            .reassign("UPDATE {table} SET owner_id = NULL WHERE owner_id = ?1", owner)
            .await?;
        info!(owner = %owner, %counts, "Account data detached to legacy");
        Ok(counts)
    }

    /// Counts unowned rows per table.
    pub async fn counts(&self) -> DbResult<MigrationCounts> {
        let mut counts = [0u64; 3];
        for (slot, table) in counts.iter_mut().zip(TABLES) {
            let sql = format!("SELECT COUNT(*) FROM {table} WHERE owner_id IS NULL");
            let n: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
            *slot = n as u64;
        }

        Ok(MigrationCounts {
            purchases: counts[0],
            sales: counts[1],
            customers: counts[2],
        })
    }

    async fn reassign(&self, template: &str, owner: &OwnerId) -> DbResult<MigrationCounts> {
        let mut tx = self.pool.begin().await.map_err(tx_error)?;

        let mut counts = [0u64; 3];
        for (slot, table) in counts.iter_mut().zip(TABLES) {
            let sql = template.replace("{table}", table);
            let result = sqlx::query(&sql)
                .bind(owner.as_str())
                .execute(&mut *tx)
                .await?;
            *slot = result.rows_affected();
        }

        tx.commit().await.map_err(tx_error)?;

        Ok(MigrationCounts {
            purchases: counts[0],
            sales: counts[1],
            customers: counts[2],
        })
    }
}
