//! # Repository Module
//!
//! SQLite repository implementations for Brownie Book.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repositories behind the Record Store                 │
//! │                                                                         │
//! │  Ledger (brownie-app)                                                  │
//! │       │                                                                 │
//! │       │  store.update_sale(&owner, &sale)                              │
//! │       ▼                                                                 │
//! │  impl RecordStore for Database                                         │
//! │       │                                                                 │
//! │       │  db.sales().update(&owner, &sale)                              │
//! │       ▼                                                                 │
//! │  SaleRepository                                                        │
//! │  ├── insert(owner?, sale)                                              │
//! │  ├── list_for_owner(owner)                                             │
//! │  ├── update(owner, sale)       WHERE id = ? AND owner_id = ?           │
//! │  └── delete(owner, id)         WHERE id = ? AND owner_id = ?           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Inserts take `Option<&OwnerId>` so the seed tool can write legacy rows;
//! everything else requires an owner.
//!
//! ## Available Repositories
//!
//! - [`purchase::PurchaseRepository`] - Purchase CRUD
//! - [`sale::SaleRepository`] - Sale CRUD
//! - [`customer::CustomerRepository`] - Customer CRUD and diff application
//! - [`legacy::LegacyRepository`] - Migrate / detach unowned rows

pub mod customer;
pub mod legacy;
pub mod purchase;
pub mod sale;

use sqlx::sqlite::SqliteQueryResult;

use crate::error::{DbError, DbResult};

/// Turns "no row matched" into `NotFound` for owner-scoped writes.
pub(crate) fn ensure_affected(
    result: SqliteQueryResult,
    entity: &str,
    id: &str,
) -> DbResult<()> {
    if result.rows_affected() == 0 {
        return Err(DbError::not_found(entity, id));
    }
    Ok(())
}

/// Maps a failure to begin or commit a transaction.
pub(crate) fn tx_error(err: sqlx::Error) -> DbError {
    DbError::TransactionFailed(err.to_string())
}

/// Test fixtures shared by the repository tests.
#[cfg(test)]
pub(crate) mod fixtures {
    use brownie_core::{
        BrownieType, Money, OwnerId, PaymentMethod, Purchase, PurchaseInput, Sale, SaleInput,
    };
    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

    pub fn owner_a() -> OwnerId {
        OwnerId::parse("11111111-1111-4111-8111-111111111111").unwrap()
    }

    pub fn owner_b() -> OwnerId {
        OwnerId::parse("22222222-2222-4222-8222-222222222222").unwrap()
    }

    pub fn at(minute: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap() + Duration::minutes(minute)
    }

    pub fn purchase(quantity: i64, cents: i64, minute: i64) -> Purchase {
        Purchase::new(
            PurchaseInput {
                date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                quantity,
                total_value: Money::from_cents(cents),
                supplier: Some("Atacadão".to_string()),
                notes: None,
            },
            at(minute),
        )
    }

    pub fn sale(name: &str, quantity: i64, unit_cents: i64, minute: i64) -> Sale {
        Sale::new(
            SaleInput {
                date: NaiveDate::from_ymd_opt(2025, 3, 2).unwrap(),
                customer_name: name.to_string(),
                quantity,
                unit_price: Money::from_cents(unit_cents),
                payment_method: PaymentMethod::Pix,
                brownie_type: BrownieType::Ninho,
                notes: Some("retirada".to_string()),
            },
            at(minute),
        )
        .unwrap()
    }
}
