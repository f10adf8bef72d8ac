//! # Validation Module
//!
//! Input validation for purchase and sale forms.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Command line / form                                          │
//! │  ├── Raw strings: "12,50", "07/03/2025", "5"                           │
//! │  └── THIS MODULE: parse + business rule checks                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Aggregation engine                                           │
//! │  └── Assumes well-typed input, never fails                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Record Store                                                 │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── Owner scoping                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Anything rejected here never reaches the Record Store.
//!
//! ## Usage
//! ```rust
//! use brownie_core::validation::{parse_money, validate_quantity};
//!
//! assert_eq!(parse_money("R$ 12,50", "unit price").unwrap().cents(), 1250);
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{PurchaseInput, SaleInput};
use crate::{MAX_AMOUNT, MAX_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted customer name.
pub const MAX_NAME_LEN: usize = 120;

/// Longest accepted notes/supplier text.
pub const MAX_TEXT_LEN: usize = 500;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a customer name and returns it trimmed.
///
/// ## Rules
/// - Must not be empty
/// - At most 120 characters
pub fn validate_customer_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required("customer name"));
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "customer name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(name.to_string())
}

/// Normalizes an optional free-text field.
///
/// Blank text becomes `None`; otherwise the trimmed text, at most 500 chars.
pub fn normalize_optional_text(
    field: &str,
    text: Option<&str>,
) -> ValidationResult<Option<String>> {
    let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };

    if text.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TEXT_LEN,
        });
    }

    Ok(Some(text.to_string()))
}

/// Validates a search query.
///
/// Empty is allowed (matches everything). Returns the trimmed query.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a brownie quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_QUANTITY
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a money amount.
///
/// ## Rules
/// - Must not be negative (zero allows giveaways)
/// - Must not exceed MAX_AMOUNT
pub fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() || amount > MAX_AMOUNT {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT.cents(),
        });
    }

    Ok(())
}

/// Parses a quantity typed into a form.
pub fn parse_quantity(raw: &str) -> ValidationResult<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::required("quantity"));
    }

    let qty: i64 = raw
        .parse()
        .map_err(|_| ValidationError::invalid_format("quantity", "must be a whole number"))?;
    validate_quantity(qty)?;
    Ok(qty)
}

/// Parses a currency amount into [`Money`].
///
/// ## Accepted Forms
/// ```text
/// "12"        → 1200
/// "12.5"      → 1250
/// "12,50"     → 1250      (Brazilian decimal comma)
/// "R$ 1.234,56" → 123456  (thousands dot + decimal comma)
/// "1234.56"   → 123456
/// ```
/// More than two decimal places, signs and letters are rejected, and so
/// is anything above [`MAX_AMOUNT`].
pub fn parse_money(raw: &str, field: &str) -> ValidationResult<Money> {
    let cleaned = raw.trim().trim_start_matches("R$").trim();
    if cleaned.is_empty() {
        return Err(ValidationError::required(field));
    }

    let invalid = || ValidationError::invalid_format(field, "expected an amount such as 12,50");

    // With both separators present the last one is the decimal mark.
    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) => cleaned.replace(',', "."),
        _ => cleaned.to_string(),
    };

    let (whole, frac) = match normalized.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (normalized.as_str(), ""),
    };

    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    if frac.len() > 2 {
        return Err(ValidationError::invalid_format(
            field,
            "at most two decimal places",
        ));
    }

    let reais: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let cents: i64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
        _ => frac.parse().map_err(|_| invalid())?,
    };

    let amount = reais
        .checked_mul(100)
        .and_then(|v| v.checked_add(cents))
        .map(Money::from_cents)
        .ok_or_else(invalid)?;
    validate_amount(field, amount)?;
    Ok(amount)
}

// =============================================================================
// Form Validators
// =============================================================================

/// Validates a purchase form, normalizing its text fields.
pub fn validate_purchase(mut input: PurchaseInput) -> ValidationResult<PurchaseInput> {
    validate_quantity(input.quantity)?;
    validate_amount("total value", input.total_value)?;
    input.supplier = normalize_optional_text("supplier", input.supplier.as_deref())?;
    input.notes = normalize_optional_text("notes", input.notes.as_deref())?;
    Ok(input)
}

/// Validates a sale form, normalizing its text fields.
pub fn validate_sale(mut input: SaleInput) -> ValidationResult<SaleInput> {
    input.customer_name = validate_customer_name(&input.customer_name)?;
    validate_quantity(input.quantity)?;
    validate_amount("unit price", input.unit_price)?;
    input.total_value()?;
    input.notes = normalize_optional_text("notes", input.notes.as_deref())?;
    Ok(input)
}

// =============================================================================
// Unit Tests
// =============================================================================
