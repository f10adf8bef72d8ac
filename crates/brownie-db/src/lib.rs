//! # brownie-db: Record Store for Brownie Book
//!
//! This crate provides persistence for Brownie Book: the [`RecordStore`]
//! trait, a SQLite implementation and an in-memory one for tests.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Brownie Book Data Flow                            │
//! │                                                                         │
//! │  Ledger::add_sale (brownie-app)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    brownie-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │  RecordStore  │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │  (store.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ PurchaseRepo  │    │              │  │   │
//! │  │   │  Database ────┼───►│ SaleRepo      │    │ 001_init.sql │  │   │
//! │  │   │  MemoryStore  │    │ CustomerRepo  │    │              │  │   │
//! │  │   │               │    │ LegacyRepo    │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   ~/.local/share/brownie-book/brownie.db                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - The `RecordStore` trait and `MigrationCounts`
//! - [`pool`] - Connection pool and the SQLite `RecordStore`
//! - [`repository`] - Owner-scoped repositories (purchase, sale, customer, legacy)
//! - [`memory`] - In-memory `RecordStore` with failure injection
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Record Store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use brownie_db::{Database, DbConfig, RecordStore};
//!
//! let db = Database::new(DbConfig::new("brownie.db")).await?;
//! let store: Arc<dyn RecordStore> = Arc::new(db);
//! let sales = store.list_sales(&owner).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use memory::MemoryStore;
pub use pool::{Database, DbConfig};
pub use store::{MigrationCounts, RecordStore, SaleChange};

pub use repository::customer::CustomerRepository;
pub use repository::legacy::LegacyRepository;
pub use repository::purchase::PurchaseRepository;
pub use repository::sale::SaleRepository;
