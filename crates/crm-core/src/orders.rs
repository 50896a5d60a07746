use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order creation payload with identifiers as submitted (GraphQL `ID`s are strings).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderInput {
    pub customer_id: String,
    pub product_ids: Vec<String>,
    #[serde(default)]
    pub order_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: i64,
    pub customer_id: i64,
    pub order_date: DateTime<Utc>,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parse a positive numeric identifier.
#[must_use]
pub fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|id| *id > 0)
}

/// Requested ids (as submitted) that are not in `found`, in request order,
/// each reported once.
#[must_use]
pub fn unknown_ids<'a>(requested: &'a [String], found: &HashSet<i64>) -> Vec<&'a str> {
    let mut reported = HashSet::new();
    requested
        .iter()
        .map(String::as_str)
        .filter(|raw| parse_id(raw).is_none_or(|id| !found.contains(&id)))
        .filter(|raw| reported.insert(*raw))
        .collect()
}

/// Largest total a `NUMERIC(12,2)` column holds.
pub const MAX_ORDER_TOTAL: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Sum of line prices.
#[must_use]
pub fn compute_total(prices: &[Decimal]) -> Decimal {
    prices.iter().copied().sum()
}
