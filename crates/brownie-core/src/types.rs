//! # Domain Types
//!
//! Core domain records used throughout Brownie Book.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Purchase     │   │      Sale       │   │    Customer     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  date           │   │  customer_name ─┼──►│  name (ci key)  │       │
//! │  │  quantity       │   │  quantity       │   │  total_spent    │       │
//! │  │  total_value    │   │  unit_price     │   │  total_purchases│       │
//! │  │  supplier?      │   │  total_value    │   │  last_purchase  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │      cost side            revenue side          derived from sales     │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ PaymentMethod   │   │  BrownieType    │   │    OwnerId      │       │
//! │  │  Cash, Pix,     │   │  DoceDeLeite,   │   │  authenticated  │       │
//! │  │  Card, Other    │   │  Ninho          │   │  account (UUID) │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Input vs. Record
//! `PurchaseInput` / `SaleInput` are what a form submits. Records add the
//! identity (`id`) and the immutable `created_at` at insertion time.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Owner
// =============================================================================

/// The authenticated account every record belongs to.
///
/// Issued by the external identity provider as a UUID. Records with no
/// owner are legacy data waiting to be migrated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    /// Parses an owner id, rejecting anything that is not a UUID.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ValidationError::required("owner id"));
        }
        let uuid = Uuid::parse_str(raw)
            .map_err(|_| ValidationError::invalid_format("owner id", "must be a valid UUID"))?;
        Ok(OwnerId(uuid.to_string()))
    }

    /// Returns the owner id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a customer paid for a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash ("dinheiro").
    Cash,
    /// Instant bank transfer.
    Pix,
    /// Debit or credit card.
    Card,
    /// Anything else (voucher, barter, ...).
    Other,
}

impl PaymentMethod {
    /// All payment methods, in form order.
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Pix,
        PaymentMethod::Cash,
        PaymentMethod::Card,
        PaymentMethod::Other,
    ];

    /// Label shown in reports.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Dinheiro",
            PaymentMethod::Pix => "PIX",
            PaymentMethod::Card => "Cartão",
            PaymentMethod::Other => "Outros",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    /// Accepts the English names and the Portuguese form values.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" | "dinheiro" => Ok(PaymentMethod::Cash),
            "pix" | "instant-transfer" | "instant_transfer" => Ok(PaymentMethod::Pix),
            "card" | "cartao" | "cartão" => Ok(PaymentMethod::Card),
            "other" | "outros" => Ok(PaymentMethod::Other),
            _ => Err(ValidationError::NotAllowed {
                field: "payment method".to_string(),
                allowed: vec![
                    "cash".to_string(),
                    "pix".to_string(),
                    "card".to_string(),
                    "other".to_string(),
                ],
            }),
        }
    }
}

// =============================================================================
// Brownie Type
// =============================================================================

/// The two brownie flavours on the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum BrownieType {
    /// Dulce de leche filling.
    DoceDeLeite,
    /// Powdered-milk ("Ninho") topping.
    Ninho,
}

impl BrownieType {
    pub const ALL: [BrownieType; 2] = [BrownieType::DoceDeLeite, BrownieType::Ninho];

    pub fn label(&self) -> &'static str {
        match self {
            BrownieType::DoceDeLeite => "Doce de leite",
            BrownieType::Ninho => "Ninho",
        }
    }
}

impl Default for BrownieType {
    fn default() -> Self {
        BrownieType::DoceDeLeite
    }
}

impl fmt::Display for BrownieType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BrownieType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "doce de leite" | "dulce de leche" => Ok(BrownieType::DoceDeLeite),
            "ninho" => Ok(BrownieType::Ninho),
            _ => Err(ValidationError::NotAllowed {
                field: "brownie type".to_string(),
                allowed: BrownieType::ALL
                    .iter()
                    .map(|t| t.label().to_string())
                    .collect(),
            }),
        }
    }
}

// =============================================================================
// Purchase
// =============================================================================

/// Form payload for a purchase (before it gets an identity).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseInput {
    pub date: NaiveDate,
    /// Units acquired.
    pub quantity: i64,
    /// What was paid for the whole batch.
    pub total_value: Money,
    pub supplier: Option<String>,
    pub notes: Option<String>,
}

/// A recorded inventory acquisition (cost side).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Purchase {
    /// Unique identifier (UUID v4).
    pub id: String,
    /// Calendar date of the purchase (no time component).
    pub date: NaiveDate,
    pub quantity: i64,
    pub total_value: Money,
    pub supplier: Option<String>,
    pub notes: Option<String>,
    /// Set once at insertion, never changed by edits.
    pub created_at: DateTime<Utc>,
}

impl Purchase {
    /// Builds a new record from form input with a fresh id.
    pub fn new(input: PurchaseInput, created_at: DateTime<Utc>) -> Self {
        Purchase {
            id: Uuid::new_v4().to_string(),
            date: input.date,
            quantity: input.quantity,
            total_value: input.total_value,
            supplier: input.supplier,
            notes: input.notes,
            created_at,
        }
    }

    /// Returns a copy with every editable field replaced by `input`.
    ///
    /// `id` and `created_at` survive the edit.
    pub fn edited(&self, input: PurchaseInput) -> Self {
        Purchase {
            id: self.id.clone(),
            created_at: self.created_at,
            ..Purchase::new(input, self.created_at)
        }
    }

    /// Cost of a single brownie in this batch.
    pub fn unit_cost(&self) -> Money {
        self.total_value.per_unit(self.quantity)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// Form payload for a sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleInput {
    pub date: NaiveDate,
    pub customer_name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub brownie_type: BrownieType,
    pub notes: Option<String>,
}

impl SaleInput {
    /// quantity × unit price, the value stored on the sale.
    ///
    /// Fails instead of wrapping when the product leaves the centavo range.
    pub fn total_value(&self) -> Result<Money, ValidationError> {
        self.unit_price
            .multiply_quantity(self.quantity)
            .ok_or_else(|| ValidationError::OutOfRange {
                field: "total value".to_string(),
                min: 0,
                max: i64::MAX,
            })
    }
}

/// A recorded revenue event tied to a customer.
///
/// ## Denormalized Total
/// `total_value` is computed when the sale is created or edited and stored.
/// Reads never recompute it, so a stored value is what every report sums.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    pub date: NaiveDate,
    /// Free text; natural key to [`Customer`] (case-insensitive).
    pub customer_name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub total_value: Money,
    pub payment_method: PaymentMethod,
    pub brownie_type: BrownieType,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Builds a new record from form input with a fresh id.
    pub fn new(input: SaleInput, created_at: DateTime<Utc>) -> Result<Self, ValidationError> {
        let total_value = input.total_value()?;
        Ok(Sale {
            id: Uuid::new_v4().to_string(),
            date: input.date,
            customer_name: input.customer_name,
            quantity: input.quantity,
            unit_price: input.unit_price,
            total_value,
            payment_method: input.payment_method,
            brownie_type: input.brownie_type,
            notes: input.notes,
            created_at,
        })
    }

    /// Returns a copy with every editable field replaced by `input`.
    pub fn edited(&self, input: SaleInput) -> Result<Self, ValidationError> {
        Ok(Sale {
            id: self.id.clone(),
            ..Sale::new(input, self.created_at)?
        })
    }

    /// True when the sale belongs to `name`, ignoring case.
    pub fn is_for_customer(&self, name: &str) -> bool {
        same_customer(&self.customer_name, name)
    }
}

/// Case-insensitive customer-name comparison used for every Customer join.
pub fn same_customer(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

// =============================================================================
// Customer
// =============================================================================

/// A buyer, derived from sales and keyed by case-insensitive name.
///
/// ## Invariant
/// `total_spent`, `total_purchases` and `last_purchase_date` always equal the
/// reduction over this customer's current sales. See
/// [`crate::customers::recompute_customers`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub total_spent: Money,
    /// Number of sales, not brownies.
    pub total_purchases: i64,
    pub last_purchase_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    /// A new customer seeded from their first sale.
    pub fn seeded_from(sale: &Sale) -> Self {
        Customer {
            id: Uuid::new_v4().to_string(),
            name: sale.customer_name.clone(),
            total_spent: sale.total_value,
            total_purchases: 1,
            last_purchase_date: Some(sale.date),
            created_at: sale.created_at,
        }
    }

    /// Folds one more sale into the aggregates.
    ///
    /// `last_purchase_date` takes the sale's date even when it is earlier
    /// than the current value: it tracks the most recently *recorded* sale.
    pub fn record_sale(&mut self, sale: &Sale) {
        self.total_spent += sale.total_value;
        self.total_purchases += 1;
        self.last_purchase_date = Some(sale.date);
    }

    /// Compares aggregates only, ignoring identity and creation time.
    pub fn same_aggregates(&self, other: &Customer) -> bool {
        same_customer(&self.name, &other.name)
            && self.total_spent == other.total_spent
            && self.total_purchases == other.total_purchases
            && self.last_purchase_date == other.last_purchase_date
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
