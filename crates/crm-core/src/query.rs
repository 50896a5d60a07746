//! Listing filters, sort keys and pagination for customers, products and orders.
//!
//! Every supported filter is an explicit field; the database layer turns each
//! `Some` into one SQL predicate. Sort fields are closed enums so that only
//! known column names ever reach SQL.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::CoreError;

pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 200;

/// Clamp a requested page size to `1..=MAX_LIMIT`, defaulting to [`DEFAULT_LIMIT`].
#[must_use]
pub fn normalize_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    #[must_use]
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self {
            limit: normalize_limit(limit),
            offset: offset.unwrap_or(0).max(0),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerFilter {
    pub name_icontains: Option<String>,
    pub email_icontains: Option<String>,
    /// Inclusive: customers created on or after this day (UTC).
    pub created_at_gte: Option<NaiveDate>,
    /// Inclusive: customers created on or before this day (UTC).
    pub created_at_lte: Option<NaiveDate>,
    /// Prefix match when it starts with `+`, substring match otherwise.
    pub phone_pattern: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub name_icontains: Option<String>,
    pub price_gte: Option<Decimal>,
    pub price_lte: Option<Decimal>,
    pub stock_gte: Option<i32>,
    pub stock_lte: Option<i32>,
    /// Only products with stock below [`crate::products::LOW_STOCK_THRESHOLD`].
    pub low_stock: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub total_amount_gte: Option<Decimal>,
    pub total_amount_lte: Option<Decimal>,
    pub order_date_gte: Option<NaiveDate>,
    pub order_date_lte: Option<NaiveDate>,
    /// Substring match on the ordering customer's name.
    pub customer_name: Option<String>,
    /// Orders containing at least one product whose name matches.
    pub product_name: Option<String>,
    /// Orders containing this product.
    pub product_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// A column a listing may be ordered by.
pub trait SortField: Sized + Copy + 'static {
    /// Field names accepted in an `orderBy` string, paired with their variant.
    const FIELDS: &'static [(&'static str, Self)];

    /// Fully qualified SQL column for this field.
    fn column(self) -> &'static str;

    fn parse(name: &str) -> Option<Self> {
        Self::FIELDS
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| *value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey<F> {
    pub field: F,
    pub direction: SortDirection,
}

/// Parse a comma-separated `orderBy` string such as `"-created_at,name"`.
///
/// Blank segments are ignored; an empty string yields no keys.
///
/// # Errors
///
/// Returns [`CoreError::InvalidSortField`] for a name not in `F::FIELDS`.
pub fn parse_order_by<F: SortField>(raw: &str) -> Result<Vec<SortKey<F>>, CoreError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (direction, name) = match part.strip_prefix('-') {
                Some(rest) => (SortDirection::Desc, rest.trim()),
                None => (SortDirection::Asc, part),
            };
            F::parse(name)
                .map(|field| SortKey { field, direction })
                .ok_or_else(|| CoreError::InvalidSortField {
                    field: name.to_owned(),
                    allowed: F::FIELDS
                        .iter()
                        .map(|(field, _)| *field)
                        .collect::<Vec<_>>()
                        .join(", "),
                })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerSort {
    Id,
    Name,
    Email,
    CreatedAt,
    UpdatedAt,
}

impl SortField for CustomerSort {
    const FIELDS: &'static [(&'static str, Self)] = &[
        ("id", CustomerSort::Id),
        ("name", CustomerSort::Name),
        ("email", CustomerSort::Email),
        ("created_at", CustomerSort::CreatedAt),
        ("createdAt", CustomerSort::CreatedAt),
        ("updated_at", CustomerSort::UpdatedAt),
        ("updatedAt", CustomerSort::UpdatedAt),
    ];

    fn column(self) -> &'static str {
        match self {
            CustomerSort::Id => "c.id",
            CustomerSort::Name => "c.name",
            CustomerSort::Email => "c.email",
            CustomerSort::CreatedAt => "c.created_at",
            CustomerSort::UpdatedAt => "c.updated_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSort {
    Id,
    Name,
    Price,
    Stock,
    CreatedAt,
}

impl SortField for ProductSort {
    const FIELDS: &'static [(&'static str, Self)] = &[
        ("id", ProductSort::Id),
        ("name", ProductSort::Name),
        ("price", ProductSort::Price),
        ("stock", ProductSort::Stock),
        ("created_at", ProductSort::CreatedAt),
        ("createdAt", ProductSort::CreatedAt),
    ];

    fn column(self) -> &'static str {
        match self {
            ProductSort::Id => "p.id",
            ProductSort::Name => "p.name",
            ProductSort::Price => "p.price",
            ProductSort::Stock => "p.stock",
            ProductSort::CreatedAt => "p.created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSort {
    Id,
    OrderDate,
    TotalAmount,
    CreatedAt,
}

impl SortField for OrderSort {
    const FIELDS: &'static [(&'static str, Self)] = &[
        ("id", OrderSort::Id),
        ("order_date", OrderSort::OrderDate),
        ("orderDate", OrderSort::OrderDate),
        ("total_amount", OrderSort::TotalAmount),
        ("totalAmount", OrderSort::TotalAmount),
        ("created_at", OrderSort::CreatedAt),
        ("createdAt", OrderSort::CreatedAt),
    ];

    fn column(self) -> &'static str {
        match self {
            OrderSort::Id => "o.id",
            OrderSort::OrderDate => "o.order_date",
            OrderSort::TotalAmount => "o.total_amount",
            OrderSort::CreatedAt => "o.created_at",
        }
    }
}

/// Render sort keys as an `ORDER BY` clause body, always ending with the
/// id column so that pagination is stable.
#[must_use]
pub fn order_by_sql<F: SortField>(keys: &[SortKey<F>], id_column: &str) -> String {
    let mut parts: Vec<String> = keys
        .iter()
        .map(|k| format!("{} {}", k.field.column(), k.direction.as_sql()))
        .collect();
    if !keys.iter().any(|k| k.field.column() == id_column) {
        parts.push(format!("{id_column} ASC"));
    }
    parts.join(", ")
}

/// Escape `%`, `_` and `\` and wrap in `%` for a case-insensitive substring `ILIKE`.
#[must_use]
pub fn contains_pattern(needle: &str) -> String {
    format!("%{}%", escape_like(needle))
}

/// Escape and append `%` for a prefix `LIKE`.
#[must_use]
pub fn prefix_pattern(needle: &str) -> String {
    format!("{}%", escape_like(needle))
}

fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_limit_applies_defaults_and_bounds() {
        assert_eq!(normalize_limit(None), 50);
        assert_eq!(normalize_limit(Some(0)), 1);
        assert_eq!(normalize_limit(Some(1_000)), 200);
        assert_eq!(normalize_limit(Some(25)), 25);
    }

    #[test]
    fn page_clamps_negative_offset() {
        let page = Page::new(Some(10), Some(-4));
        assert_eq!(page, Page { limit: 10, offset: 0 });
    }

    #[test]
    fn parse_order_by_handles_direction_and_whitespace() {
        let keys = parse_order_by::<CustomerSort>(" -created_at , name ,").unwrap();
        assert_eq!(
            keys,
            vec![
                SortKey {
                    field: CustomerSort::CreatedAt,
                    direction: SortDirection::Desc
                },
                SortKey {
                    field: CustomerSort::Name,
                    direction: SortDirection::Asc
                },
            ]
        );
    }

    #[test]
    fn parse_order_by_accepts_camel_case_aliases() {
        let keys = parse_order_by::<OrderSort>("-totalAmount").unwrap();
        assert_eq!(keys[0].field, OrderSort::TotalAmount);
    }

    #[test]
    fn parse_order_by_rejects_unknown_fields() {
        let err = parse_order_by::<ProductSort>("price,password").unwrap_err();
        let CoreError::InvalidSortField { field, allowed } = err;
        assert_eq!(field, "password");
        assert!(allowed.contains("price"));
    }

    #[test]
    fn parse_order_by_empty_is_empty() {
        assert!(parse_order_by::<ProductSort>("").unwrap().is_empty());
    }

    #[test]
    fn order_by_sql_appends_id_tiebreaker() {
        let keys = parse_order_by::<CustomerSort>("-name").unwrap();
        assert_eq!(order_by_sql(&keys, "c.id"), "c.name DESC, c.id ASC");

        let keys = parse_order_by::<CustomerSort>("-id").unwrap();
        assert_eq!(order_by_sql(&keys, "c.id"), "c.id DESC");

        assert_eq!(order_by_sql::<CustomerSort>(&[], "c.id"), "c.id ASC");
    }

    #[test]
    fn like_patterns_escape_wildcards() {
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(prefix_pattern("+1"), "+1%");
    }
}
