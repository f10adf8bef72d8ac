//! # Customer Aggregation
//!
//! Customers are never entered directly: they are derived from sales and
//! matched by case-insensitive name.
//!
//! ## Lifecycle
//! ```text
//! add sale ─────────► upsert_customer_on_sale ─┐
//!                                              │
//! edit / delete sale ─► recompute_customers ───┼──► diff_customers ──► Record Store
//!                       (fold of upsert over   │    (insert / update / delete)
//!                        all sales, oldest     │
//!                        recorded first)       │
//!                                              ▼
//!                                   customers == reduction over sales
//! ```
//!
//! Because recompute is the same fold the incremental path performs, adding a
//! sale incrementally and recomputing from scratch always agree.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{same_customer, Customer, Sale};

/// Folds one sale into the customer list.
///
/// A case-insensitive name match adds to that customer's totals. Otherwise a
/// new customer seeded from the sale is placed at the front.
///
/// ## Example
/// ```rust
/// use brownie_core::customers::upsert_customer_on_sale;
/// # use brownie_core::{Money, PaymentMethod, BrownieType, Sale, SaleInput};
/// # use chrono::{NaiveDate, Utc};
/// # let sale = |name: &str| Sale::new(SaleInput {
/// #     date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
/// #     customer_name: name.to_string(),
/// #     quantity: 5,
/// #     unit_price: Money::from_cents(500),
/// #     payment_method: PaymentMethod::Pix,
/// #     brownie_type: BrownieType::Ninho,
/// #     notes: None,
/// # }, Utc::now()).unwrap();
///
/// let customers = upsert_customer_on_sale(Vec::new(), &sale("Maria"));
/// let customers = upsert_customer_on_sale(customers, &sale("maria"));
///
/// assert_eq!(customers.len(), 1);
/// assert_eq!(customers[0].total_purchases, 2);
/// assert_eq!(customers[0].total_spent, Money::from_cents(5000));
/// ```
pub fn upsert_customer_on_sale(mut customers: Vec<Customer>, sale: &Sale) -> Vec<Customer> {
    match customers
        .iter_mut()
        .find(|c| same_customer(&c.name, &sale.customer_name))
    {
        Some(customer) => customer.record_sale(sale),
        None => customers.insert(0, Customer::seeded_from(sale)),
    }
    customers
}

/// Rebuilds every customer from the current sales.
///
/// Sales are folded in recording order (`created_at` ascending, ties in input
/// order). Customers already known keep their id, `created_at` and name
/// spelling; customers left without sales disappear.
pub fn recompute_customers(existing: &[Customer], sales: &[Sale]) -> Vec<Customer> {
    let mut ordered: Vec<&Sale> = sales.iter().collect();
    ordered.sort_by_key(|s| s.created_at);

    let rebuilt = ordered
        .into_iter()
        .fold(Vec::new(), |acc, sale| upsert_customer_on_sale(acc, sale));

    rebuilt
        .into_iter()
        .map(|mut customer| {
            if let Some(known) = existing
                .iter()
                .find(|c| same_customer(&c.name, &customer.name))
            {
                customer.id = known.id.clone();
                customer.created_at = known.created_at;
                customer.name = known.name.clone();
            }
            customer
        })
        .collect()
}

/// Customers whose name contains `query` (ignoring case), biggest spenders first.
///
/// An empty query matches everyone. Equal totals keep their input order.
pub fn filter_and_sort_customers(customers: &[Customer], query: &str) -> Vec<Customer> {
    let needle = query.trim().to_lowercase();

    let mut matched: Vec<Customer> = customers
        .iter()
        .filter(|c| needle.is_empty() || c.name.to_lowercase().contains(&needle))
        .cloned()
        .collect();

    matched.sort_by(|a, b| b.total_spent.cmp(&a.total_spent));
    matched
}

/// A customer's sale history, in input order.
pub fn customer_sales<'a>(sales: &'a [Sale], name: &str) -> Vec<&'a Sale> {
    sales.iter().filter(|s| s.is_for_customer(name)).collect()
}

/// Looks a customer up by name, ignoring case.
pub fn find_customer<'a>(customers: &'a [Customer], name: &str) -> Option<&'a Customer> {
    customers.iter().find(|c| same_customer(&c.name, name))
}

// =============================================================================
// Diff
// =============================================================================

/// Row-level changes that turn one customer list into another.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerDiff {
    pub inserted: Vec<Customer>,
    pub updated: Vec<Customer>,
    /// Ids of customers that no longer exist.
    pub removed: Vec<String>,
}

impl CustomerDiff {
    /// Number of rows the diff touches.
    pub fn len(&self) -> usize {
        self.inserted.len() + self.updated.len() + self.removed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}

/// Compares two customer lists by id.
pub fn diff_customers(before: &[Customer], after: &[Customer]) -> CustomerDiff {
    let old: HashMap<&str, &Customer> = before.iter().map(|c| (c.id.as_str(), c)).collect();
    let mut diff = CustomerDiff::default();

    for customer in after {
        match old.get(customer.id.as_str()) {
            None => diff.inserted.push(customer.clone()),
            Some(previous) if *previous != customer => diff.updated.push(customer.clone()),
            Some(_) => {}
        }
    }

    diff.removed = before
        .iter()
        .filter(|c| !after.iter().any(|a| a.id == c.id))
        .map(|c| c.id.clone())
        .collect();

    diff
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{BrownieType, PaymentMethod, SaleInput};
    use chrono::{Duration, NaiveDate, TimeZone, Utc};
    use proptest::prelude::*;

    fn sale_at(name: &str, cents: i64, day: u32, minute: i64) -> Sale {
        let base = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
        Sale::new(
            SaleInput {
                date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
                customer_name: name.to_string(),
                quantity: 1,
                unit_price: Money::from_cents(cents),
                payment_method: PaymentMethod::Cash,
                brownie_type: BrownieType::DoceDeLeite,
                notes: None,
            },
            base + Duration::minutes(minute),
        )
        .unwrap()
    }

    fn incremental(sales: &[Sale]) -> Vec<Customer> {
        let mut ordered: Vec<&Sale> = sales.iter().collect();
        ordered.sort_by_key(|s| s.created_at);
        ordered
            .into_iter()
            .fold(Vec::new(), |acc, s| upsert_customer_on_sale(acc, s))
    }

    fn same_set(a: &[Customer], b: &[Customer]) -> bool {
        a.len() == b.len()
            && a.iter()
                .all(|x| b.iter().any(|y| x.same_aggregates(y)))
    }

    #[test]
    fn test_upsert_matches_case_insensitively() {
        let customers = upsert_customer_on_sale(Vec::new(), &sale_at("Maria", 2500, 1, 0));
        let customers = upsert_customer_on_sale(customers, &sale_at("maria", 2500, 2, 1));

        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].name, "Maria");
        assert_eq!(customers[0].total_spent, Money::from_cents(5000));
        assert_eq!(customers[0].total_purchases, 2);
        assert_eq!(customers[0].last_purchase_date, NaiveDate::from_ymd_opt(2025, 3, 2));
    }

    #[test]
    fn test_new_customers_go_first() {
        let customers = upsert_customer_on_sale(Vec::new(), &sale_at("Ana", 100, 1, 0));
        let customers = upsert_customer_on_sale(customers, &sale_at("Bruno", 100, 1, 1));
        assert_eq!(customers[0].name, "Bruno");
        assert_eq!(customers[1].name, "Ana");
    }

    #[test]
    fn test_recompute_keeps_identity_and_drops_empty() {
        let s1 = sale_at("Maria", 1000, 1, 0);
        let s2 = sale_at("Ana", 700, 2, 1);
        let s3 = sale_at("MARIA", 300, 3, 2);

        let customers = recompute_customers(&[], &[s1.clone(), s2.clone(), s3.clone()]);
        let maria = find_customer(&customers, "maria").unwrap().clone();
        assert_eq!(maria.total_spent, Money::from_cents(1300));

        // Ana's only sale is deleted, Maria's second sale is edited away.
        let customers = recompute_customers(&customers, &[s1.clone()]);
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].id, maria.id);
        assert_eq!(customers[0].created_at, maria.created_at);
        assert_eq!(customers[0].total_spent, Money::from_cents(1000));
        assert_eq!(customers[0].total_purchases, 1);
        assert_eq!(customers[0].last_purchase_date, Some(s1.date));
    }

    #[test]
    fn test_recompute_uses_recording_order() {
        // Listed newest first, as the store returns them.
        let newer = sale_at("Maria", 500, 1, 10);
        let older = sale_at("Maria", 500, 20, 0);

        let customers = recompute_customers(&[], &[newer.clone(), older]);
        assert_eq!(customers[0].last_purchase_date, Some(newer.date));
    }

    #[test]
    fn test_filter_and_sort() {
        let customers = recompute_customers(
            &[],
            &[
                sale_at("Ana Paula", 500, 1, 0),
                sale_at("Mariana", 900, 1, 1),
                sale_at("Paulo", 900, 1, 2),
                sale_at("Zé", 100, 1, 3),
            ],
        );

        let all = filter_and_sort_customers(&customers, "");
        let names: Vec<&str> = all.iter().map(|c| c.name.as_str()).collect();
        // Paulo was placed before Mariana by the upsert, ties keep that order.
        assert_eq!(names, vec!["Paulo", "Mariana", "Ana Paula", "Zé"]);

        let found = filter_and_sort_customers(&customers, "PAUL");
        let names: Vec<&str> = found.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Paulo", "Ana Paula"]);

        assert!(filter_and_sort_customers(&customers, "xyz").is_empty());
    }

    #[test]
    fn test_customer_sales() {
        let sales = vec![
            sale_at("Maria", 500, 1, 0),
            sale_at("Ana", 500, 1, 1),
            sale_at("maria", 500, 1, 2),
        ];
        assert_eq!(customer_sales(&sales, "MARIA").len(), 2);
        assert!(customer_sales(&sales, "Bruno").is_empty());
    }

    #[test]
    fn test_diff_customers() {
        let s1 = sale_at("Maria", 500, 1, 0);
        let s2 = sale_at("Ana", 500, 1, 1);
        let before = recompute_customers(&[], &[s1.clone(), s2]);

        let s3 = sale_at("Bruno", 800, 2, 2);
        let s4 = sale_at("maria", 100, 2, 3);
        let after = recompute_customers(&before, &[s1, s3, s4]);

        let diff = diff_customers(&before, &after);
        assert_eq!(diff.inserted.len(), 1);
        assert_eq!(diff.inserted[0].name, "Bruno");
        assert_eq!(diff.updated.len(), 1);
        assert_eq!(diff.updated[0].name, "Maria");
        let ana = find_customer(&before, "Ana").unwrap();
        assert_eq!(diff.removed, vec![ana.id.clone()]);
        assert_eq!(diff.len(), 3);

        assert!(diff_customers(&after, &after).is_empty());
    }

    fn arb_sales() -> impl Strategy<Value = Vec<Sale>> {
        let names = prop::sample::select(vec!["Maria", "maria", "Ana", "ANA", "Bruno"]);
        prop::collection::vec((names, 0i64..10_000, 1u32..28, 0i64..1_000), 1..12).prop_map(
            |rows| {
                rows.into_iter()
                    .map(|(name, cents, day, minute)| sale_at(name, cents, day, minute))
                    .collect()
            },
        )
    }

    proptest! {
        /// Incremental upserts and a full recompute produce the same customers.
        #[test]
        fn recompute_matches_incremental(sales in arb_sales()) {
            let recomputed = recompute_customers(&[], &sales);
            prop_assert!(same_set(&recomputed, &incremental(&sales)));
        }

        /// Deleting a sale and recomputing equals recomputing without it.
        #[test]
        fn delete_then_recompute_is_consistent(sales in arb_sales(), pick in any::<prop::sample::Index>()) {
            let existing = recompute_customers(&[], &sales);

            let removed = pick.index(sales.len());
            let remaining: Vec<Sale> = sales
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != removed)
                .map(|(_, s)| s.clone())
                .collect();

            let after_delete = recompute_customers(&existing, &remaining);
            let from_scratch = recompute_customers(&[], &remaining);

            prop_assert!(same_set(&after_delete, &from_scratch));
            prop_assert!(after_delete.iter().all(|c| c.total_purchases > 0));
        }

        /// Every customer's totals equal the reduction over their own sales.
        #[test]
        fn aggregates_match_customer_sales(sales in arb_sales()) {
            for customer in recompute_customers(&[], &sales) {
                let own = customer_sales(&sales, &customer.name);
                let spent: Money = own.iter().map(|s| s.total_value).sum();
                prop_assert_eq!(customer.total_spent, spent);
                prop_assert_eq!(customer.total_purchases, own.len() as i64);
            }
        }
    }
}
