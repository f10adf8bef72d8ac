//! # Ledger
//!
//! The application controller: one owner's books plus the Record Store
//! they are persisted in.
//!
//! ## Mutation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Ledger::update_sale                                │
//! │                                                                         │
//! │  validate_sale(input) ──► ValidationError? return, nothing attempted   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  session.require() ──► NotAuthenticated? return (logged as error)      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  edited sales list → recompute_customers → diff                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  store.apply_sale_change(Update, diff)  (one transaction)              │
//! │       │  DbError? return, store and snapshot untouched                 │
//! │       ▼                                                                 │
//! │  snapshot.sales + snapshot.customers swapped in, return               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The whole mutation runs under the write lock, so callers never observe
//! sales and customers out of step.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use brownie_core::customers::{
    customer_sales, diff_customers, filter_and_sort_customers, find_customer, recompute_customers,
};
use brownie_core::reports::{
    brownie_type_breakdown, monthly_rollup, payment_method_breakdown, top_customers,
    BrownieTypeShare, CustomerTotal, MonthlyRollup, PaymentMethodShare,
};
use brownie_core::summary::compute_financial_summary;
use brownie_core::validation::{validate_purchase, validate_sale, validate_search_query};
use brownie_core::{
    CoreError, Customer, FinancialSummary, OwnerId, Purchase, PurchaseInput, Sale, SaleInput,
};
use brownie_db::{MigrationCounts, RecordStore, SaleChange};

use crate::error::ApiError;
use crate::state::Session;

/// In-memory snapshot of one owner's records, newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Book {
    pub purchases: Vec<Purchase>,
    pub sales: Vec<Sale>,
    pub customers: Vec<Customer>,
}

/// Everything the reports view shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub summary: FinancialSummary,
    pub month: MonthlyRollup,
    pub payment_methods: Vec<PaymentMethodShare>,
    pub top_customers: Vec<CustomerTotal>,
    pub brownie_types: Vec<BrownieTypeShare>,
}

/// A customer together with their sales.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerHistory {
    pub customer: Customer,
    pub sales: Vec<Sale>,
}

#[derive(Debug, Default)]
struct LedgerState {
    session: Session,
    book: Book,
}

/// Application state: session, snapshot and the injected Record Store.
pub struct Ledger {
    store: Arc<dyn RecordStore>,
    state: RwLock<LedgerState>,
}

impl Ledger {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Ledger {
            store,
            state: RwLock::new(LedgerState::default()),
        }
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Signs in and loads the owner's records.
    ///
    /// On failure the previous session and snapshot are kept.
    pub async fn sign_in(&self, owner: OwnerId) -> Result<(), ApiError> {
        let book = self.load_book(&owner).await?;

        info!(
            owner = %owner,
            purchases = book.purchases.len(),
            sales = book.sales.len(),
            customers = book.customers.len(),
            "Signed in"
        );

        let mut state = self.state.write().await;
        state.session = Session::signed_in(owner);
        state.book = book;
        Ok(())
    }

    /// Clears the session and the snapshot.
    pub async fn sign_out(&self) {
        let mut state = self.state.write().await;
        if let Some(owner) = state.session.owner() {
            info!(owner = %owner, "Signed out");
        }
        *state = LedgerState::default();
    }

    /// Reloads the snapshot from the store.
    pub async fn reload(&self) -> Result<(), ApiError> {
        let mut state = self.state.write().await;
        let owner = state.session.require("reload")?.clone();
        state.book = self.load_book(&owner).await?;
        debug!(owner = %owner, "Snapshot reloaded");
        Ok(())
    }

    pub async fn owner(&self) -> Option<OwnerId> {
        self.state.read().await.session.owner().cloned()
    }

    /// A copy of the current snapshot.
    pub async fn book(&self) -> Book {
        self.state.read().await.book.clone()
    }

    async fn load_book(&self, owner: &OwnerId) -> Result<Book, ApiError> {
        let (purchases, sales, customers) = tokio::try_join!(
            self.store.list_purchases(owner),
            self.store.list_sales(owner),
            self.store.list_customers(owner),
        )?;

        Ok(Book {
            purchases,
            sales,
            customers,
        })
    }

    // =========================================================================
    // Purchases
    // =========================================================================

    pub async fn purchases(&self) -> Vec<Purchase> {
        self.state.read().await.book.purchases.clone()
    }

    pub async fn find_purchase(&self, id: &str) -> Result<Purchase, ApiError> {
        let state = self.state.read().await;
        state
            .book
            .purchases
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| ApiError::not_found("purchase", id))
    }

    pub async fn add_purchase(&self, input: PurchaseInput) -> Result<Purchase, ApiError> {
        let input = validate_purchase(input)?;

        let mut state = self.state.write().await;
        let owner = state.session.require("add_purchase")?.clone();

        let purchase = Purchase::new(input, Utc::now());
        debug!(id = %purchase.id, owner = %owner, "Adding purchase");
        self.store.insert_purchase(&owner, &purchase).await?;

        state.book.purchases.insert(0, purchase.clone());
        Ok(purchase)
    }

    pub async fn update_purchase(&self, id: &str, input: PurchaseInput) -> Result<Purchase, ApiError> {
        let input = validate_purchase(input)?;

        let mut state = self.state.write().await;
        let owner = state.session.require("update_purchase")?.clone();

        let idx = state
            .book
            .purchases
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| ApiError::not_found("purchase", id))?;

        let updated = state.book.purchases[idx].edited(input);
        debug!(id = %updated.id, owner = %owner, "Updating purchase");
        self.store.update_purchase(&owner, &updated).await?;

        state.book.purchases[idx] = updated.clone();
        Ok(updated)
    }

    pub async fn delete_purchase(&self, id: &str) -> Result<(), ApiError> {
        let mut state = self.state.write().await;
        let owner = state.session.require("delete_purchase")?.clone();

        debug!(id, owner = %owner, "Deleting purchase");
        self.store.delete_purchase(&owner, id).await?;

        state.book.purchases.retain(|p| p.id != id);
        Ok(())
    }

    // =========================================================================
    // Sales
    // =========================================================================

    pub async fn sales(&self) -> Vec<Sale> {
        self.state.read().await.book.sales.clone()
    }

    pub async fn find_sale(&self, id: &str) -> Result<Sale, ApiError> {
        let state = self.state.read().await;
        state
            .book
            .sales
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| ApiError::not_found("sale", id))
    }

    /// Records a sale and refreshes customers before returning.
    pub async fn add_sale(&self, input: SaleInput) -> Result<Sale, ApiError> {
        let input = validate_sale(input)?;

        let mut state = self.state.write().await;
        let owner = state.session.require("add_sale")?.clone();

        let sale = Sale::new(input, Utc::now())?;
        debug!(id = %sale.id, owner = %owner, customer = %sale.customer_name, "Adding sale");

        let mut sales = state.book.sales.clone();
        sales.insert(0, sale.clone());
        self.commit_sales(&owner, &mut state.book, SaleChange::Insert(&sale), sales)
            .await?;
        Ok(sale)
    }

    /// Edits a sale; a renamed customer moves the sale's totals across.
    pub async fn update_sale(&self, id: &str, input: SaleInput) -> Result<Sale, ApiError> {
        let input = validate_sale(input)?;

        let mut state = self.state.write().await;
        let owner = state.session.require("update_sale")?.clone();

        let idx = state
            .book
            .sales
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| ApiError::not_found("sale", id))?;

        let updated = state.book.sales[idx].edited(input)?;
        debug!(id = %updated.id, owner = %owner, "Updating sale");

        let mut sales = state.book.sales.clone();
        sales[idx] = updated.clone();
        self.commit_sales(&owner, &mut state.book, SaleChange::Update(&updated), sales)
            .await?;
        Ok(updated)
    }

    pub async fn delete_sale(&self, id: &str) -> Result<(), ApiError> {
        let mut state = self.state.write().await;
        let owner = state.session.require("delete_sale")?.clone();

        debug!(id, owner = %owner, "Deleting sale");

        let mut sales = state.book.sales.clone();
        sales.retain(|s| s.id != id);
        self.commit_sales(&owner, &mut state.book, SaleChange::Delete(id), sales)
            .await
    }

    /// Persists one sale write with the customer changes it causes.
    ///
    /// `sales` is the sale list after the write. The snapshot only moves to
    /// it, and to the recomputed customers, once the store has committed both.
    async fn commit_sales(
        &self,
        owner: &OwnerId,
        book: &mut Book,
        change: SaleChange<'_>,
        sales: Vec<Sale>,
    ) -> Result<(), ApiError> {
        let customers = recompute_customers(&book.customers, &sales);
        let diff = diff_customers(&book.customers, &customers);

        if let Err(e) = self.store.apply_sale_change(owner, change, &diff).await {
            warn!(owner = %owner, sale = %change.sale_id(), error = %e, "Sale change rejected");
            return Err(e.into());
        }

        book.sales = sales;
        book.customers = customers;
        Ok(())
    }

    /// Rebuilds customers from the snapshot's sales and persists the diff.
    async fn refresh_customers(&self, owner: &OwnerId, book: &mut Book) -> Result<(), ApiError> {
        let after = recompute_customers(&book.customers, &book.sales);
        let diff = diff_customers(&book.customers, &after);

        if diff.is_empty() {
            return Ok(());
        }

        debug!(
            owner = %owner,
            inserted = diff.inserted.len(),
            updated = diff.updated.len(),
            removed = diff.removed.len(),
            "Refreshing customers"
        );

        self.store.apply_customer_diff(owner, &diff).await?;
        book.customers = after;
        Ok(())
    }

    // =========================================================================
    // Customers & reports
    // =========================================================================

    /// Customers matching `query`, biggest spenders first.
    pub async fn customers(&self, query: &str) -> Result<Vec<Customer>, ApiError> {
        let query = validate_search_query(query)?;
        let state = self.state.read().await;
        Ok(filter_and_sort_customers(&state.book.customers, &query))
    }

    pub async fn customer_history(&self, name: &str) -> Result<CustomerHistory, ApiError> {
        let state = self.state.read().await;
        let customer = find_customer(&state.book.customers, name)
            .cloned()
            .ok_or_else(|| CoreError::CustomerNotFound(name.to_string()))?;

        let sales = customer_sales(&state.book.sales, &customer.name)
            .into_iter()
            .cloned()
            .collect();

        Ok(CustomerHistory { customer, sales })
    }

    pub async fn summary(&self) -> FinancialSummary {
        let state = self.state.read().await;
        compute_financial_summary(&state.book.purchases, &state.book.sales)
    }

    /// Monthly rollup for `reference`'s month plus all-time breakdowns.
    pub async fn report(&self, reference: NaiveDate, top_limit: usize) -> Report {
        let state = self.state.read().await;
        let book = &state.book;
        let summary = compute_financial_summary(&book.purchases, &book.sales);

        Report {
            month: monthly_rollup(&book.purchases, &book.sales, reference),
            payment_methods: payment_method_breakdown(&book.sales, summary.total_revenue),
            top_customers: top_customers(&book.sales, top_limit),
            brownie_types: brownie_type_breakdown(&book.sales),
            summary,
        }
    }

    // =========================================================================
    // Legacy data
    // =========================================================================

    /// Unowned rows waiting to be imported.
    pub async fn legacy_counts(&self) -> Result<MigrationCounts, ApiError> {
        Ok(self.store.legacy_counts().await?)
    }

    /// Imports every unowned row into the signed-in owner's books.
    ///
    /// Customers are then recomputed so a name present on both sides ends
    /// up as a single customer.
    pub async fn migrate_legacy(&self) -> Result<MigrationCounts, ApiError> {
        let mut state = self.state.write().await;
        let owner = state.session.require("migrate_legacy")?.clone();

        let counts = self.store.migrate_legacy(&owner).await?;
        info!(owner = %owner, %counts, "Legacy data migrated");

        if counts.is_empty() {
            return Ok(counts);
        }

        state.book = self.load_book(&owner).await?;
        self.refresh_customers(&owner, &mut state.book).await?;
        Ok(counts)
    }

    /// Returns every row of the signed-in owner to the unowned pool.
    pub async fn detach_to_legacy(&self) -> Result<MigrationCounts, ApiError> {
        let mut state = self.state.write().await;
        let owner = state.session.require("detach_to_legacy")?.clone();

        let counts = self.store.detach_to_legacy(&owner).await?;
        info!(owner = %owner, %counts, "Records detached to legacy");

        state.book = Book::default();
        Ok(counts)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use brownie_core::{BrownieType, Money, PaymentMethod};
    use brownie_db::{Database, DbConfig, MemoryStore};
    use chrono::Duration;

    fn owner() -> OwnerId {
        OwnerId::parse("11111111-1111-4111-8111-111111111111").unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn purchase_input(quantity: i64, total_cents: i64) -> PurchaseInput {
        PurchaseInput {
            date: day(1),
            quantity,
            total_value: Money::from_cents(total_cents),
            supplier: Some("Atacadão".to_string()),
            notes: None,
        }
    }

    fn sale_input(name: &str, quantity: i64, unit_cents: i64) -> SaleInput {
        SaleInput {
            date: day(10),
            customer_name: name.to_string(),
            quantity,
            unit_price: Money::from_cents(unit_cents),
            payment_method: PaymentMethod::Pix,
            brownie_type: BrownieType::Ninho,
            notes: None,
        }
    }

    async fn signed_in() -> (Arc<MemoryStore>, Ledger) {
        let store = Arc::new(MemoryStore::new());
        let ledger = Ledger::new(store.clone());
        ledger.sign_in(owner()).await.unwrap();
        (store, ledger)
    }

    #[tokio::test]
    async fn test_sign_in_loads_snapshot() {
        let store = Arc::new(MemoryStore::new());
        let sale = Sale::new(sale_input("Maria", 5, 800), Utc::now()).unwrap();
        store.insert_sale(&owner(), &sale).await.unwrap();

        let ledger = Ledger::new(store.clone());
        assert!(ledger.book().await.sales.is_empty());

        ledger.sign_in(owner()).await.unwrap();
        assert_eq!(ledger.sales().await, vec![sale]);
        assert_eq!(ledger.owner().await, Some(owner()));

        ledger.sign_out().await;
        assert_eq!(ledger.owner().await, None);
        assert_eq!(ledger.book().await, Book::default());
    }

    #[tokio::test]
    async fn test_failed_sign_in_keeps_session_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set_offline(true).unwrap();
        let ledger = Ledger::new(store.clone());

        let err = ledger.sign_in(owner()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::StoreError);
        assert_eq!(ledger.owner().await, None);
    }

    #[tokio::test]
    async fn test_unauthenticated_mutation_rejected() {
        let store = Arc::new(MemoryStore::new());
        let ledger = Ledger::new(store.clone());

        let err = ledger.add_sale(sale_input("Maria", 5, 800)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotAuthenticated);

        let err = ledger.add_purchase(purchase_input(50, 15000)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotAuthenticated);

        let err = ledger.migrate_legacy().await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotAuthenticated);

        assert_eq!(store.calls().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_store() {
        let (store, ledger) = signed_in().await;
        let calls = store.calls().unwrap();

        let err = ledger.add_sale(sale_input("   ", 5, 800)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = ledger.add_purchase(purchase_input(0, 15000)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        assert_eq!(store.calls().unwrap(), calls);
    }

    #[tokio::test]
    async fn test_remote_failure_leaves_snapshot_untouched() {
        let (store, ledger) = signed_in().await;
        ledger.add_purchase(purchase_input(50, 15000)).await.unwrap();
        ledger.add_sale(sale_input("Maria", 5, 800)).await.unwrap();
        let before = ledger.book().await;

        store.fail_next("network down").unwrap();
        let err = ledger.add_sale(sale_input("João", 2, 800)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::StoreError);
        assert_eq!(ledger.book().await, before);

        store.fail_next("network down").unwrap();
        let sale_id = before.sales[0].id.clone();
        assert!(ledger.delete_sale(&sale_id).await.is_err());
        assert_eq!(ledger.book().await, before);

        store.fail_next("network down").unwrap();
        let purchase_id = before.purchases[0].id.clone();
        assert!(ledger
            .update_purchase(&purchase_id, purchase_input(60, 18000))
            .await
            .is_err());
        assert_eq!(ledger.book().await, before);
    }

    #[tokio::test]
    async fn test_customer_write_failure_rolls_back_sale_change() {
        let (store, ledger) = signed_in().await;
        let sale = ledger.add_sale(sale_input("Maria", 5, 800)).await.unwrap();
        let before = ledger.book().await;

        store.fail_next_customer_write("disk full").unwrap();
        let err = ledger.add_sale(sale_input("João", 2, 800)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::StoreError);
        assert_eq!(ledger.book().await, before);
        assert_eq!(store.list_sales(&owner()).await.unwrap(), before.sales);

        store.fail_next_customer_write("disk full").unwrap();
        assert!(ledger
            .update_sale(&sale.id, sale_input("Joana", 1, 800))
            .await
            .is_err());
        assert_eq!(ledger.book().await, before);
        assert_eq!(store.list_sales(&owner()).await.unwrap(), before.sales);

        store.fail_next_customer_write("disk full").unwrap();
        assert!(ledger.delete_sale(&sale.id).await.is_err());
        assert_eq!(ledger.book().await, before);
        assert_eq!(store.list_sales(&owner()).await.unwrap(), before.sales);
        assert_eq!(store.list_customers(&owner()).await.unwrap(), before.customers);

        // The next attempt goes through and both sides move together.
        ledger.delete_sale(&sale.id).await.unwrap();
        assert!(store.list_sales(&owner()).await.unwrap().is_empty());
        assert!(store.list_customers(&owner()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_overflowing_sale_is_rejected() {
        let (store, ledger) = signed_in().await;
        let calls = store.calls().unwrap();

        let mut input = sale_input("Maria", brownie_core::MAX_QUANTITY, 0);
        input.unit_price = Money::from_cents(i64::MAX / 100);

        let err = ledger.add_sale(input).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(store.calls().unwrap(), calls);
    }

    #[tokio::test]
    async fn test_add_sale_upserts_customer_case_insensitively() {
        let (store, ledger) = signed_in().await;
        ledger.add_sale(sale_input("Maria", 5, 500)).await.unwrap();
        ledger.add_sale(sale_input("maria", 5, 500)).await.unwrap();

        let customers = ledger.customers("").await.unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].name, "Maria");
        assert_eq!(customers[0].total_purchases, 2);
        assert_eq!(customers[0].total_spent, Money::from_cents(5000));

        // Store and snapshot agree.
        assert_eq!(store.list_customers(&owner()).await.unwrap(), customers);
    }

    #[tokio::test]
    async fn test_customers_refreshed_after_sale_edit() {
        let (store, ledger) = signed_in().await;
        let sale = ledger.add_sale(sale_input("Maria", 5, 800)).await.unwrap();
        ledger.add_sale(sale_input("João", 1, 800)).await.unwrap();

        ledger
            .update_sale(&sale.id, sale_input("Joana", 3, 800))
            .await
            .unwrap();

        let customers = ledger.customers("").await.unwrap();
        let names: Vec<&str> = customers.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Joana", "João"]);
        assert_eq!(customers[0].total_spent, Money::from_cents(2400));

        let stored = store.list_customers(&owner()).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored.iter().all(|c| c.name != "Maria"));

        // Edits keep the original creation time.
        assert_eq!(ledger.find_sale(&sale.id).await.unwrap().created_at, sale.created_at);
    }

    #[tokio::test]
    async fn test_customers_refreshed_after_sale_delete() {
        let (store, ledger) = signed_in().await;
        let first = ledger.add_sale(sale_input("Maria", 5, 800)).await.unwrap();
        let second = ledger.add_sale(sale_input("maria", 1, 800)).await.unwrap();

        ledger.delete_sale(&second.id).await.unwrap();
        let customers = ledger.customers("").await.unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].total_purchases, 1);
        assert_eq!(customers[0].last_purchase_date, Some(first.date));

        ledger.delete_sale(&first.id).await.unwrap();
        assert!(ledger.customers("").await.unwrap().is_empty());
        assert!(store.list_customers(&owner()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_found() {
        let (_store, ledger) = signed_in().await;

        let err = ledger
            .update_purchase("missing", purchase_input(50, 15000))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = ledger.delete_sale("missing").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = ledger.customer_history("Ninguém").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_summary_and_report() {
        let (_store, ledger) = signed_in().await;
        ledger.add_purchase(purchase_input(50, 15000)).await.unwrap();
        ledger.add_sale(sale_input("Ana", 5, 800)).await.unwrap();
        ledger.add_sale(sale_input("ana", 1, 800)).await.unwrap();

        let summary = ledger.summary().await;
        assert_eq!(summary.total_revenue, Money::from_cents(4800));
        assert_eq!(summary.total_brownies_stock, 44);

        let report = ledger.report(day(20), 5).await;
        assert_eq!(report.month.sales_count, 2);
        assert_eq!(report.month.purchases_count, 1);
        assert_eq!(report.summary, summary);
        // Case-sensitive grouping in the report, merged in customers.
        assert_eq!(report.top_customers.len(), 2);
        assert_eq!(ledger.customers("").await.unwrap().len(), 1);

        let history = ledger.customer_history("ANA").await.unwrap();
        assert_eq!(history.sales.len(), 2);

        let other_month = ledger.report(day(1) - Duration::days(1), 5).await;
        assert_eq!(other_month.month.sales_count, 0);
    }

    #[tokio::test]
    async fn test_migrate_legacy_merges_customers() {
        let (store, ledger) = signed_in().await;

        let legacy_sale =
            Sale::new(sale_input("maria", 2, 500), Utc::now() - Duration::days(30)).unwrap();
        store.seed_legacy_sale(legacy_sale.clone()).unwrap();
        store.seed_legacy_customer(Customer::seeded_from(&legacy_sale)).unwrap();
        store
            .seed_legacy_purchase(Purchase::new(purchase_input(20, 6000), Utc::now()))
            .unwrap();

        ledger.add_sale(sale_input("Maria", 5, 800)).await.unwrap();

        let pending = ledger.legacy_counts().await.unwrap();
        assert_eq!(pending.total(), 3);

        let counts = ledger.migrate_legacy().await.unwrap();
        assert_eq!(counts, pending);
        assert!(ledger.legacy_counts().await.unwrap().is_empty());

        let book = ledger.book().await;
        assert_eq!(book.sales.len(), 2);
        assert_eq!(book.purchases.len(), 1);
        assert_eq!(book.customers.len(), 1);
        assert_eq!(book.customers[0].name, "Maria");
        assert_eq!(book.customers[0].total_purchases, 2);
        assert_eq!(book.customers[0].total_spent, Money::from_cents(5000));

        assert_eq!(store.list_customers(&owner()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_detach_to_legacy_empties_books() {
        let (_store, ledger) = signed_in().await;
        ledger.add_purchase(purchase_input(50, 15000)).await.unwrap();
        ledger.add_sale(sale_input("Maria", 5, 800)).await.unwrap();

        let counts = ledger.detach_to_legacy().await.unwrap();
        assert_eq!(counts.total(), 3);
        assert_eq!(ledger.book().await, Book::default());
        assert_eq!(ledger.legacy_counts().await.unwrap(), counts);

        // Still signed in: importing brings everything back.
        assert_eq!(ledger.migrate_legacy().await.unwrap(), counts);
        assert_eq!(ledger.book().await.sales.len(), 1);
    }

    #[tokio::test]
    async fn test_sqlite_store_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ledger = Ledger::new(Arc::new(db));
        ledger.sign_in(owner()).await.unwrap();

        ledger.add_purchase(purchase_input(50, 15000)).await.unwrap();
        let sale = ledger.add_sale(sale_input("Maria", 5, 800)).await.unwrap();
        ledger.add_sale(sale_input("João", 1, 900)).await.unwrap();
        ledger
            .update_sale(&sale.id, sale_input("maria", 4, 800))
            .await
            .unwrap();

        let snapshot = ledger.book().await;
        ledger.reload().await.unwrap();
        let reloaded = ledger.book().await;

        let ids = |sales: &[Sale]| sales.iter().map(|s| s.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&reloaded.sales), ids(&snapshot.sales));
        assert_eq!(reloaded.purchases.len(), 1);

        let before = filter_and_sort_customers(&snapshot.customers, "");
        let after = filter_and_sort_customers(&reloaded.customers, "");
        assert_eq!(after.len(), 2);
        assert!(before.iter().zip(&after).all(|(b, a)| b.id == a.id && b.same_aggregates(a)));
        assert_eq!(after[0].name, "Maria");
        assert_eq!(after[0].total_spent, Money::from_cents(3200));
    }
}
