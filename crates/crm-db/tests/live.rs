//! Postgres-backed checks for the CRM stores.
//!
//! Covers bulk intake (partial success, resubmission, and rollback when the
//! unique email index fires mid-batch), single-customer creation, customer
//! and product filters with sorting and paging, order totals over distinct
//! products, the reminder window query, and idempotent catalog seeding.
//! Every test runs against a freshly migrated database.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use crm_core::{
    bulk_create_customers, create_customer, parse_order_by, CandidateError, CustomerCandidate,
    CustomerFilter, CustomerSort, NewCustomer, NewProduct, OrderFilter, Page, ProductFilter,
};
use crm_db::{
    create_order, create_product, customer_email_exists, get_customer, get_order,
    insert_customers, list_customers, list_order_products, list_orders, list_orders_since,
    list_products, seed_catalog, DbError, PgCustomerStore,
};
use rust_decimal::Decimal;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_customer(name: &str, email: &str) -> NewCustomer {
    NewCustomer {
        name: name.to_string(),
        email: email.to_string(),
        phone: None,
    }
}

fn new_product(name: &str, cents: i64, stock: i32) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        price: Decimal::new(cents, 2),
        stock,
    }
}

async fn insert_customer(pool: &sqlx::PgPool, name: &str, email: &str) -> i64 {
    insert_customers(pool, &[new_customer(name, email)])
        .await
        .unwrap_or_else(|e| panic!("insert_customer failed for '{email}': {e}"))[0]
        .id
}

async fn count_customers(pool: &sqlx::PgPool) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM customers")
        .fetch_one(pool)
        .await
        .expect("count customers")
}

// ---------------------------------------------------------------------------
// Section 1: Bulk intake against Postgres
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn bulk_intake_creates_valid_subset_and_reports_rest(pool: sqlx::PgPool) {
    insert_customer(&pool, "Existing", "taken@x.com").await;
    let store = PgCustomerStore::new(pool.clone());

    let batch = [
        CustomerCandidate::new("Alice", "ALICE@x.com", Some("+1234567890")),
        CustomerCandidate::new("Alice again", "alice@x.com", None),
        CustomerCandidate::new("", "nobody@x.com", None),
        CustomerCandidate::new("Taken", "Taken@X.com", None),
        CustomerCandidate::new("Bob", "bob@x.com", Some("123-456-7890")),
    ];

    let result = bulk_create_customers(&store, &batch, 500)
        .await
        .expect("bulk intake failed");

    let emails: Vec<&str> = result.created.iter().map(|c| c.email.as_str()).collect();
    assert_eq!(emails, vec!["alice@x.com", "bob@x.com"]);
    assert_eq!(
        result.error_messages(),
        vec![
            "Item 2: Duplicate email in request: alice@x.com",
            "Item 3: Name is required.",
            "Item 4: Email already exists: taken@x.com",
        ]
    );
    assert_eq!(count_customers(&pool).await, 3);
}

#[sqlx::test(migrations = "../../migrations")]
async fn resubmitting_the_same_batch_creates_nothing(pool: sqlx::PgPool) {
    let store = PgCustomerStore::new(pool.clone());
    let batch = [
        CustomerCandidate::new("A", "a@x.com", None),
        CustomerCandidate::new("B", "b@x.com", None),
    ];

    let first = bulk_create_customers(&store, &batch, 500).await.unwrap();
    let second = bulk_create_customers(&store, &batch, 500).await.unwrap();

    assert_eq!(first.created.len(), 2);
    assert!(second.created.is_empty());
    assert_eq!(second.errors.len(), 2);
    assert_eq!(count_customers(&pool).await, 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn unique_index_rolls_back_the_whole_insert(pool: sqlx::PgPool) {
    insert_customer(&pool, "Existing", "dup@x.com").await;

    // Simulates a concurrent writer committing between validation and insert.
    let err = insert_customers(
        &pool,
        &[new_customer("Fresh", "fresh@x.com"), new_customer("Dup", "DUP@x.com")],
    )
    .await
    .expect_err("unique index must reject the duplicate");

    assert!(err.is_unique_violation());
    assert!(!customer_email_exists(&pool, "fresh@x.com").await.unwrap());
    assert_eq!(count_customers(&pool).await, 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn create_customer_reports_existing_email(pool: sqlx::PgPool) {
    insert_customer(&pool, "Zed", "zed@x.com").await;
    let store = PgCustomerStore::new(pool);

    let outcome = create_customer(&store, &CustomerCandidate::new("Zed", " ZED@x.com ", None))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        Err(CandidateError::EmailExists("zed@x.com".to_string()))
    );
}

// ---------------------------------------------------------------------------
// Section 2: Customer listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn list_customers_filters_sorts_and_pages(pool: sqlx::PgPool) {
    let mut alice = new_customer("Alice", "alice@example.com");
    alice.phone = Some("+15550001".to_string());
    let mut bob = new_customer("Bob", "bob@example.org");
    bob.phone = Some("555-000-1234".to_string());
    insert_customers(&pool, &[alice, bob, new_customer("Carol", "carol@example.com")])
        .await
        .unwrap();

    let sort = parse_order_by::<CustomerSort>("-name").unwrap();
    let all = list_customers(&pool, &CustomerFilter::default(), &sort, Page::default())
        .await
        .unwrap();
    let names: Vec<&str> = all.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Carol", "Bob", "Alice"]);

    let filter = CustomerFilter {
        email_icontains: Some("EXAMPLE.COM".to_string()),
        ..CustomerFilter::default()
    };
    let rows = list_customers(&pool, &filter, &[], Page::default())
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);

    let filter = CustomerFilter {
        phone_pattern: Some("+1555".to_string()),
        ..CustomerFilter::default()
    };
    let rows = list_customers(&pool, &filter, &[], Page::default())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Alice");

    let page = Page::new(Some(1), Some(1));
    let rows = list_customers(&pool, &CustomerFilter::default(), &[], page)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Bob");
}

#[sqlx::test(migrations = "../../migrations")]
async fn created_at_filters_are_inclusive_whole_days(pool: sqlx::PgPool) {
    let id = insert_customer(&pool, "Dated", "dated@x.com").await;
    sqlx::query("UPDATE customers SET created_at = $2 WHERE id = $1")
        .bind(id)
        .bind(Utc.with_ymd_and_hms(2026, 3, 15, 23, 30, 0).unwrap())
        .execute(&pool)
        .await
        .unwrap();

    let day = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
    let filter = CustomerFilter {
        created_at_gte: Some(day),
        created_at_lte: Some(day),
        ..CustomerFilter::default()
    };
    let rows = list_customers(&pool, &filter, &[], Page::default())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);

    let filter = CustomerFilter {
        created_at_gte: day.succ_opt(),
        ..CustomerFilter::default()
    };
    assert!(list_customers(&pool, &filter, &[], Page::default())
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
async fn get_customer_returns_none_for_unknown_id(pool: sqlx::PgPool) {
    assert!(get_customer(&pool, 404).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Section 3: Products and orders
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn list_products_low_stock_and_price_range(pool: sqlx::PgPool) {
    create_product(&pool, &new_product("Laptop", 99_999, 10)).await.unwrap();
    create_product(&pool, &new_product("Monitor", 19_999, 5)).await.unwrap();
    create_product(&pool, &new_product("Tablet", 39_999, 8)).await.unwrap();

    let filter = ProductFilter {
        low_stock: true,
        price_lte: Some(Decimal::new(30_000, 2)),
        ..ProductFilter::default()
    };
    let rows = list_products(&pool, &filter, &[], Page::default())
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Monitor");
}

#[sqlx::test(migrations = "../../migrations")]
async fn create_order_totals_distinct_products(pool: sqlx::PgPool) {
    let customer_id = insert_customer(&pool, "Buyer", "buyer@x.com").await;
    let laptop = create_product(&pool, &new_product("Laptop", 99_999, 10)).await.unwrap();
    let phones = create_product(&pool, &new_product("Headphones", 8_999, 20)).await.unwrap();

    let order = create_order(&pool, customer_id, &[laptop.id, phones.id, laptop.id], None)
        .await
        .expect("create_order failed");

    assert_eq!(order.total_amount, Decimal::new(108_998, 2));
    let products = list_order_products(&pool, order.id).await.unwrap();
    assert_eq!(products.len(), 2);
    let fetched = get_order(&pool, order.id).await.unwrap().expect("order exists");
    assert_eq!(fetched.customer_id, customer_id);
}

#[sqlx::test(migrations = "../../migrations")]
async fn create_order_with_unknown_product_writes_nothing(pool: sqlx::PgPool) {
    let customer_id = insert_customer(&pool, "Buyer", "buyer@x.com").await;
    let laptop = create_product(&pool, &new_product("Laptop", 99_999, 10)).await.unwrap();

    let err = create_order(&pool, customer_id, &[laptop.id, 9_999], None)
        .await
        .unwrap_err();

    assert!(matches!(err, DbError::NotFound));
    let orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(orders, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn list_orders_product_filters_do_not_duplicate(pool: sqlx::PgPool) {
    let customer_id = insert_customer(&pool, "Buyer", "buyer@x.com").await;
    let cable_a = create_product(&pool, &new_product("USB Cable", 999, 10)).await.unwrap();
    let cable_b = create_product(&pool, &new_product("HDMI Cable", 1_499, 10)).await.unwrap();
    let desk = create_product(&pool, &new_product("Desk", 25_000, 2)).await.unwrap();

    create_order(&pool, customer_id, &[cable_a.id, cable_b.id], None).await.unwrap();
    create_order(&pool, customer_id, &[desk.id], None).await.unwrap();

    let filter = OrderFilter {
        product_name: Some("cable".to_string()),
        ..OrderFilter::default()
    };
    let rows = list_orders(&pool, &filter, &[], Page::default()).await.unwrap();
    assert_eq!(rows.len(), 1);

    let filter = OrderFilter {
        product_id: Some(desk.id),
        customer_name: Some("buy".to_string()),
        ..OrderFilter::default()
    };
    let rows = list_orders(&pool, &filter, &[], Page::default()).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].total_amount, Decimal::new(25_000, 2));
}

#[sqlx::test(migrations = "../../migrations")]
async fn list_orders_since_skips_older_orders(pool: sqlx::PgPool) {
    let customer_id = insert_customer(&pool, "Buyer", "buyer@x.com").await;
    let pen = create_product(&pool, &new_product("Pen", 150, 100)).await.unwrap();
    let now = Utc::now();

    let recent = create_order(&pool, customer_id, &[pen.id], Some(now - Duration::days(2)))
        .await
        .unwrap();
    create_order(&pool, customer_id, &[pen.id], Some(now - Duration::days(30)))
        .await
        .unwrap();

    let rows = list_orders_since(&pool, now - Duration::days(7)).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].order_id, recent.id);
    assert_eq!(rows[0].customer_email, "buyer@x.com");
}

// ---------------------------------------------------------------------------
// Section 4: Seeding
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn seed_catalog_is_idempotent(pool: sqlx::PgPool) {
    let customers = [new_customer("Alice", "alice@example.com")];
    let products = [new_product("Laptop", 99_999, 10), new_product("Tablet", 39_999, 8)];

    let first = seed_catalog(&pool, &customers, &products).await.unwrap();
    let second = seed_catalog(&pool, &customers, &products).await.unwrap();

    assert_eq!(first.customers_created, 1);
    assert_eq!(first.products_created, 2);
    assert_eq!(second.customers_created, 0);
    assert_eq!(second.products_created, 0);
    assert_eq!(first.customer_ids, second.customer_ids);
    assert_eq!(first.product_ids, second.product_ids);
}
