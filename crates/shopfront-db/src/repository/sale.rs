//! # Sale Repository
//!
//! The sales ledger and the sale transaction.
//!
//! ## Sale Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       record_sale()                                     │
//! │                                                                         │
//! │  lock sale_lock                                                        │
//! │  BEGIN                                                                 │
//! │   │                                                                     │
//! │   ├── receipt_sequence.last_value += 1  ──► receipt_id                 │
//! │   │                                                                     │
//! │   ├── for each cart line (in order):                                   │
//! │   │     load device (store scoped)   ── missing ──► DeviceNotFound     │
//! │   │     check quantity <= available  ── short ────► InsufficientStock  │
//! │   │     conditional decrement        ── 0 rows ───► InsufficientStock  │
//! │   │     price the line                                                  │
//! │   │                                                                     │
//! │   ├── render receipt, total = Σ line totals                            │
//! │   ├── INSERT sales, INSERT sale_items                                  │
//! │   │                                                                     │
//! │  COMMIT            (any error above: ROLLBACK, nothing changed,        │
//! │                     receipt id not consumed)                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Receipt ids are global across stores and strictly increasing.

use std::sync::Arc;

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::device::{decrement_stock, fetch_scoped};
use shopfront_core::{
    CoreError, NewSale, PaymentStatus, PricedLine, Receipt, ReceiptFilter, Sale, SaleItem,
};

/// A committed sale with its line items.
#[derive(Debug, Clone)]
pub struct RecordedSale {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
    sale_lock: Arc<Mutex<()>>,
}

impl SaleRepository {
    /// Creates a new SaleRepository sharing `sale_lock` with every other
    /// repository handed out by the same [`crate::Database`].
    pub fn new(pool: SqlitePool, sale_lock: Arc<Mutex<()>>) -> Self {
        SaleRepository { pool, sale_lock }
    }

    /// Records a sale for `store_id` as a single all-or-nothing transaction.
    ///
    /// `sale` must already have passed `validate_new_sale`.
    ///
    /// ## Errors
    /// * `DbError::Domain(CoreError::DeviceNotFound)` - a line names a device
    ///   the store does not own
    /// * `DbError::Domain(CoreError::InsufficientStock)` - a line asks for more
    ///   than is available (after earlier lines of the same cart)
    /// * `DbError::Domain(CoreError::AmountOverflow)` - a line total or the
    ///   sale total does not fit in cents
    /// * any other `DbError` - storage failure
    ///
    /// On every error the transaction is rolled back.
    pub async fn record_sale(
        &self,
        store_id: i64,
        store_name: &str,
        sale: &NewSale,
    ) -> DbResult<RecordedSale> {
        let _guard = self.sale_lock.lock().await;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let receipt_id = next_receipt_id(&mut *tx).await?;
        debug!(store_id, receipt_id, lines = sale.cart.len(), "Recording sale");

        let mut lines = Vec::with_capacity(sale.cart.len());
        for line in &sale.cart {
            let device = fetch_scoped(&mut *tx, store_id, line.device_id)
                .await?
                .ok_or(CoreError::DeviceNotFound(line.device_id))?;

            let insufficient = || CoreError::InsufficientStock {
                model_name: device.model_name.clone(),
                available: device.quantity_available,
                requested: line.quantity,
            };

            if !device.has_stock(line.quantity) {
                return Err(insufficient().into());
            }
            if !decrement_stock(&mut *tx, store_id, device.id, line.quantity).await? {
                return Err(insufficient().into());
            }

            lines.push(PricedLine::new(&device, line)?);
        }

        let receipt = Receipt::new(
            receipt_id,
            sale.customer_name.trim(),
            store_name,
            sale.sale_attendant.trim(),
            lines,
        )?;

        let inserted = insert_sale(&mut *tx, store_id, sale, &receipt).await?;

        let mut items = Vec::with_capacity(receipt.lines.len());
        for line in &receipt.lines {
            items.push(insert_item(&mut *tx, inserted.id, line).await?);
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            store_id,
            receipt_id,
            total_cents = inserted.total_cents,
            "Sale recorded"
        );

        Ok(RecordedSale {
            sale: inserted,
            items,
        })
    }

    /// Lists every sale of a store in receipt order.
    pub async fn list(&self, store_id: i64) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT
                id, receipt_id, store_id, customer_name, customer_email,
                customer_address, customer_phone, sale_attendant,
                total_cents, payment_status, receipt, created_at
            FROM sales
            WHERE store_id = ?1
            ORDER BY receipt_id
            "#,
        )
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Gets a sale of a store by receipt id.
    pub async fn get_by_receipt_id(&self, store_id: i64, receipt_id: i64) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT
                id, receipt_id, store_id, customer_name, customer_email,
                customer_address, customer_phone, sale_attendant,
                total_cents, payment_status, receipt, created_at
            FROM sales
            WHERE receipt_id = ?1 AND store_id = ?2
            "#,
        )
        .bind(receipt_id)
        .bind(store_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets all line items of a sale, in cart order.
    pub async fn get_items(&self, sale_id: i64) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT
                id, sale_id, device_id, model_name, imei,
                quantity, unit_price_cents, line_total_cents
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY id
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Finds sales of a store matching every supplied filter.
    ///
    /// `imei` and `model_name` match when any line item of the sale matches.
    /// An empty filter returns every sale of the store.
    pub async fn recall(&self, store_id: i64, filter: &ReceiptFilter) -> DbResult<Vec<Sale>> {
        debug!(store_id, ?filter, "Recalling receipts");

        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT
                s.id, s.receipt_id, s.store_id, s.customer_name, s.customer_email,
                s.customer_address, s.customer_phone, s.sale_attendant,
                s.total_cents, s.payment_status, s.receipt, s.created_at
            FROM sales s
            WHERE s.store_id = ?1
              AND (?2 IS NULL OR s.customer_email = ?2)
              AND (?3 IS NULL OR EXISTS (
                    SELECT 1 FROM sale_items i WHERE i.sale_id = s.id AND i.imei = ?3))
              AND (?4 IS NULL OR EXISTS (
                    SELECT 1 FROM sale_items i WHERE i.sale_id = s.id AND i.model_name = ?4))
            ORDER BY s.receipt_id
            "#,
        )
        .bind(store_id)
        .bind(filter.customer_email.as_deref())
        .bind(filter.imei.as_deref())
        .bind(filter.model_name.as_deref())
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Returns the highest receipt id issued to any store, if any sale exists.
    pub async fn largest_receipt_id(&self) -> DbResult<Option<i64>> {
        let largest: Option<i64> = sqlx::query_scalar("SELECT MAX(receipt_id) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(largest)
    }
}

// =============================================================================
// Transaction steps
// =============================================================================

/// Atomically advances the global receipt counter.
async fn next_receipt_id(conn: &mut SqliteConnection) -> DbResult<i64> {
    let receipt_id: i64 = sqlx::query_scalar(
        "UPDATE receipt_sequence SET last_value = last_value + 1 WHERE id = 1 RETURNING last_value",
    )
    .fetch_one(&mut *conn)
    .await?;

    Ok(receipt_id)
}

async fn insert_sale(
    conn: &mut SqliteConnection,
    store_id: i64,
    sale: &NewSale,
    receipt: &Receipt,
) -> DbResult<Sale> {
    let inserted = sqlx::query_as::<_, Sale>(
        r#"
        INSERT INTO sales (
            receipt_id, store_id, customer_name, customer_email,
            customer_address, customer_phone, sale_attendant,
            total_cents, payment_status, receipt, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        RETURNING
            id, receipt_id, store_id, customer_name, customer_email,
            customer_address, customer_phone, sale_attendant,
            total_cents, payment_status, receipt, created_at
        "#,
    )
    .bind(receipt.receipt_id)
    .bind(store_id)
    .bind(&receipt.customer_name)
    .bind(sale.customer_email.trim())
    .bind(sale.customer_address.trim())
    .bind(sale.customer_phone.trim())
    .bind(&receipt.sale_attendant)
    .bind(receipt.total().cents())
    .bind(PaymentStatus::Completed)
    .bind(receipt.render())
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await?;

    Ok(inserted)
}

async fn insert_item(conn: &mut SqliteConnection, sale_id: i64, line: &PricedLine) -> DbResult<SaleItem> {
    let item = sqlx::query_as::<_, SaleItem>(
        r#"
        INSERT INTO sale_items (
            sale_id, device_id, model_name, imei,
            quantity, unit_price_cents, line_total_cents
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        RETURNING
            id, sale_id, device_id, model_name, imei,
            quantity, unit_price_cents, line_total_cents
        "#,
    )
    .bind(sale_id)
    .bind(line.device_id)
    .bind(&line.model_name)
    .bind(line.imei.as_deref().map(str::trim).filter(|imei| !imei.is_empty()))
    .bind(line.quantity)
    .bind(line.unit_price.cents())
    .bind(line.line_total.cents())
    .fetch_one(&mut *conn)
    .await?;

    Ok(item)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{new_device, seed_store};
    use crate::{Database, DbConfig};
    use shopfront_core::CartLine;

    fn sale_of(cart: Vec<CartLine>) -> NewSale {
        NewSale {
            customer_name: "Grace Hopper".to_string(),
            customer_email: "grace@example.com".to_string(),
            customer_address: "2 Harbor Rd".to_string(),
            customer_phone: "555-0199".to_string(),
            sale_attendant: "Sam".to_string(),
            cart,
        }
    }

    fn line(device_id: i64, quantity: i64) -> CartLine {
        CartLine {
            device_id,
            quantity,
            imei: None,
        }
    }

    async fn stock_of(db: &Database, store_id: i64, device_id: i64) -> i64 {
        db.devices()
            .get_by_id(store_id, device_id)
            .await
            .unwrap()
            .unwrap()
            .quantity_available
    }

    #[tokio::test]
    async fn test_sale_decrements_stock_and_totals() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = seed_store(&db, "a@example.com").await;
        let device = db
            .devices()
            .insert(store, &new_device("iPhone 15", 79_900, 5))
            .await
            .unwrap();

        let recorded = db
            .sales()
            .record_sale(store, "Gadget Hub", &sale_of(vec![line(device.id, 3)]))
            .await
            .unwrap();

        assert_eq!(stock_of(&db, store, device.id).await, 2);
        assert_eq!(recorded.sale.total_cents, 3 * 79_900);
        assert_eq!(recorded.sale.receipt_id, 1);
        assert_eq!(recorded.sale.payment_status, PaymentStatus::Completed);
        assert_eq!(recorded.items.len(), 1);
        assert_eq!(recorded.items[0].line_total_cents, 3 * 79_900);
        assert!(recorded.sale.receipt.contains(" - iPhone 15: 3 units, Total: $2397.00"));
        assert!(recorded.sale.receipt.ends_with("Sold by: Gadget Hub\nAttendant: Sam"));
    }

    #[tokio::test]
    async fn test_insufficient_stock_leaves_inventory_untouched() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = seed_store(&db, "a@example.com").await;
        let device = db
            .devices()
            .insert(store, &new_device("iPhone 15", 79_900, 5))
            .await
            .unwrap();

        let err = db
            .sales()
            .record_sale(store, "Gadget Hub", &sale_of(vec![line(device.id, 6)]))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock { available: 5, requested: 6, .. })
        ));
        assert_eq!(stock_of(&db, store, device.id).await, 5);
        assert!(db.sales().list(store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failing_line_rolls_back_earlier_lines() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = seed_store(&db, "a@example.com").await;
        let first = db
            .devices()
            .insert(store, &new_device("iPhone 15", 79_900, 5))
            .await
            .unwrap();

        let err = db
            .sales()
            .record_sale(
                store,
                "Gadget Hub",
                &sale_of(vec![line(first.id, 2), line(first.id + 100, 1)]),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Domain(CoreError::DeviceNotFound(_))));
        assert_eq!(stock_of(&db, store, first.id).await, 5);

        // The failed attempt did not consume a receipt id.
        let recorded = db
            .sales()
            .record_sale(store, "Gadget Hub", &sale_of(vec![line(first.id, 1)]))
            .await
            .unwrap();
        assert_eq!(recorded.sale.receipt_id, 1);
    }

    #[tokio::test]
    async fn test_repeated_lines_see_earlier_decrements() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = seed_store(&db, "a@example.com").await;
        let device = db
            .devices()
            .insert(store, &new_device("iPhone 15", 79_900, 5))
            .await
            .unwrap();

        let err = db
            .sales()
            .record_sale(
                store,
                "Gadget Hub",
                &sale_of(vec![line(device.id, 3), line(device.id, 3)]),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock { available: 2, requested: 3, .. })
        ));
        assert_eq!(stock_of(&db, store, device.id).await, 5);
    }

    #[tokio::test]
    async fn test_line_total_overflow_rolls_back() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = seed_store(&db, "a@example.com").await;
        let gold = db
            .devices()
            .insert(store, &new_device("Gold Phone", i64::MAX / 2 + 1, 5))
            .await
            .unwrap();

        let err = db
            .sales()
            .record_sale(store, "Gadget Hub", &sale_of(vec![line(gold.id, 2)]))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Domain(CoreError::AmountOverflow { .. })));
        assert_eq!(stock_of(&db, store, gold.id).await, 5);
        assert_eq!(db.sales().largest_receipt_id().await.unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_sales_never_oversell() {
        const STOCK: i64 = 3;
        const ATTEMPTS: usize = 8;

        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("shop.db")).max_connections(5))
            .await
            .unwrap();
        let store = seed_store(&db, "a@example.com").await;
        let device = db
            .devices()
            .insert(store, &new_device("iPhone 15", 79_900, STOCK))
            .await
            .unwrap();

        let handles: Vec<_> = (0..ATTEMPTS)
            .map(|_| {
                let db = db.clone();
                let sale = sale_of(vec![line(device.id, 1)]);
                tokio::spawn(async move { db.sales().record_sale(store, "Gadget Hub", &sale).await })
            })
            .collect();

        let mut receipt_ids = Vec::new();
        let mut rejected = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(recorded) => receipt_ids.push(recorded.sale.receipt_id),
                Err(DbError::Domain(CoreError::InsufficientStock { .. })) => rejected += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        receipt_ids.sort_unstable();
        assert_eq!(receipt_ids, (1..=STOCK).collect::<Vec<_>>());
        assert_eq!(rejected, ATTEMPTS - STOCK as usize);
        assert_eq!(stock_of(&db, store, device.id).await, 0);
        assert_eq!(db.sales().list(store).await.unwrap().len(), STOCK as usize);
    }

    #[tokio::test]
    async fn test_receipt_ids_are_global_and_increasing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store_a = seed_store(&db, "a@example.com").await;
        let store_b = seed_store(&db, "b@example.com").await;
        let device_a = db
            .devices()
            .insert(store_a, &new_device("iPhone 15", 79_900, 10))
            .await
            .unwrap();
        let device_b = db
            .devices()
            .insert(store_b, &new_device("Pixel 8", 69_900, 10))
            .await
            .unwrap();

        assert_eq!(db.sales().largest_receipt_id().await.unwrap(), None);

        let sales = db.sales();
        let first = sales
            .record_sale(store_a, "A", &sale_of(vec![line(device_a.id, 1)]))
            .await
            .unwrap();
        let second = sales
            .record_sale(store_b, "B", &sale_of(vec![line(device_b.id, 1)]))
            .await
            .unwrap();
        let third = sales
            .record_sale(store_a, "A", &sale_of(vec![line(device_a.id, 1)]))
            .await
            .unwrap();

        assert_eq!(
            [first.sale.receipt_id, second.sale.receipt_id, third.sale.receipt_id],
            [1, 2, 3]
        );
        assert_eq!(sales.largest_receipt_id().await.unwrap(), Some(3));

        // Another store's receipt is invisible.
        assert!(sales.get_by_receipt_id(store_b, 1).await.unwrap().is_none());
        assert!(sales.get_by_receipt_id(store_a, 1).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_recall_filters() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = seed_store(&db, "a@example.com").await;
        let phone = db
            .devices()
            .insert(store, &new_device("iPhone 15", 79_900, 10))
            .await
            .unwrap();
        let buds = db
            .devices()
            .insert(store, &new_device("AirPods Pro", 24_900, 10))
            .await
            .unwrap();

        let sales = db.sales();
        let mut with_imei = line(phone.id, 1);
        with_imei.imei = Some("356938035643809".to_string());
        sales
            .record_sale(store, "Gadget Hub", &sale_of(vec![with_imei, line(buds.id, 1)]))
            .await
            .unwrap();

        let mut other_customer = sale_of(vec![line(buds.id, 2)]);
        other_customer.customer_email = "linus@example.com".to_string();
        sales.record_sale(store, "Gadget Hub", &other_customer).await.unwrap();

        let by_imei = ReceiptFilter {
            imei: Some("356938035643809".to_string()),
            ..Default::default()
        };
        assert_eq!(sales.recall(store, &by_imei).await.unwrap().len(), 1);

        let by_model = ReceiptFilter {
            model_name: Some("AirPods Pro".to_string()),
            ..Default::default()
        };
        assert_eq!(sales.recall(store, &by_model).await.unwrap().len(), 2);

        let model_and_email = ReceiptFilter {
            model_name: Some("AirPods Pro".to_string()),
            customer_email: Some("linus@example.com".to_string()),
            ..Default::default()
        };
        let found = sales.recall(store, &model_and_email).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].receipt_id, 2);

        let no_match = ReceiptFilter {
            model_name: Some("Galaxy S24".to_string()),
            ..Default::default()
        };
        assert!(sales.recall(store, &no_match).await.unwrap().is_empty());

        let items = sales.get_items(found[0].id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);
    }
}
