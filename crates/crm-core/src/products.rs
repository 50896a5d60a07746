use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Stock level strictly below which a product counts as low stock.
pub const LOW_STOCK_THRESHOLD: i32 = 10;

/// Largest price a `NUMERIC(10,2)` column holds.
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// Product creation payload. `price` arrives as a float from GraphQL and is
/// converted to a two-decimal `Decimal` through its string form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub stock: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Convert a float to a money amount without binary-float artifacts
/// (`0.1 + 0.2` style noise), rounded to cents.
#[must_use]
pub fn decimal_from_float(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_str(&value.to_string())
        .ok()
        .map(|d| d.round_dp(2))
}

/// Validate a product payload, reporting every failing rule.
///
/// # Errors
///
/// Returns the list of human-readable validation messages.
pub fn validate_product(input: &ProductInput) -> Result<NewProduct, Vec<String>> {
    let mut errors = Vec::new();

    let name = input.name.trim();
    if name.is_empty() {
        errors.push("Product name is required.".to_string());
    }

    let positive_float = input.price.is_finite() && input.price > 0.0;
    let price = match decimal_from_float(input.price) {
        Some(price) if price > Decimal::ZERO && price <= MAX_PRICE => Some(price),
        Some(price) if price > MAX_PRICE => {
            errors.push("Price is too large.".to_string());
            None
        }
        // Finite and positive but outside `Decimal`'s range.
        None if positive_float => {
            errors.push("Price is too large.".to_string());
            None
        }
        _ => {
            errors.push("Price must be positive.".to_string());
            None
        }
    };

    let stock = input.stock.unwrap_or(0);
    if stock < 0 {
        errors.push("Stock cannot be negative.".to_string());
    }

    match price {
        Some(price) if errors.is_empty() => Ok(NewProduct {
            name: name.to_owned(),
            price,
            stock,
        }),
        _ => Err(errors),
    }
}
