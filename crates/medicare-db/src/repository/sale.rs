//! # Sale Repository
//!
//! Database operations for sales, including the checkout transaction.
//!
//! ## Checkout Commit
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    commit_checkout(plan)                                │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    for each StockDelta (one per medicine, in cart order):               │
//! │      UPDATE medicines SET quantity = quantity - :qty                    │
//! │       WHERE id = :id AND quantity >= :qty                               │
//! │        │                                                                │
//! │        ├── 1 row  → next delta                                          │
//! │        └── 0 rows → read current quantity (None if row is gone)         │
//! │                     ROLLBACK                                            │
//! │                     Err(CheckoutAborted { line_index, ... })            │
//! │                                                                         │
//! │    for each cart line:                                                  │
//! │      INSERT INTO sales (... shared receipt_number ...)                  │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  SQLite admits one writer at a time, so a racing checkout re-evaluates  │
//! │  `quantity >= :qty` against the committed value and aborts cleanly.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use medicare_core::validation::validate_sale_input;
use medicare_core::{CheckoutPlan, CoreError, DateRange, Money, PaymentMethod, Sale, SaleInput};

#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: i64,
    medicine_id: i64,
    medicine_name: Option<String>,
    quantity: i64,
    total_price_cents: i64,
    date: NaiveDate,
    employee_id: Option<i64>,
    receipt_number: Option<String>,
    payment_method: Option<PaymentMethod>,
    created_at: DateTime<Utc>,
}

impl From<SaleRow> for Sale {
    fn from(row: SaleRow) -> Self {
        Sale {
            id: row.id,
            medicine_id: row.medicine_id,
            medicine_name: row.medicine_name,
            quantity: row.quantity,
            total_price: Money::from_cents(row.total_price_cents),
            date: row.date,
            employee_id: row.employee_id,
            receipt_number: row.receipt_number,
            payment_method: row.payment_method,
            created_at: row.created_at,
        }
    }
}

/// Outcome of a committed checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct CommittedCheckout {
    pub receipt_number: String,
    /// One id per cart line, in line order.
    pub sale_ids: Vec<i64>,
    pub committed_at: DateTime<Utc>,
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Lists sales whose business date falls in `range`, oldest first.
    pub async fn list(&self, range: DateRange) -> DbResult<Vec<Sale>> {
        let rows = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT
                s.id,
                s.medicine_id,
                m.name AS medicine_name,
                s.quantity,
                s.total_price_cents,
                s.date,
                s.employee_id,
                s.receipt_number,
                s.payment_method,
                s.created_at
            FROM sales s
            LEFT JOIN medicines m ON m.id = s.medicine_id
            WHERE (?1 IS NULL OR s.date >= ?1)
              AND (?2 IS NULL OR s.date <= ?2)
            ORDER BY s.id
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Sale::from).collect())
    }

    /// Records a sale row directly, without touching stock.
    ///
    /// ## Errors
    /// - `Domain(Validation)` for a non-positive quantity or negative total
    /// - `NotFound` if the medicine does not exist
    pub async fn insert(&self, input: &SaleInput) -> DbResult<i64> {
        validate_sale_input(input).map_err(CoreError::from)?;

        let result = sqlx::query(
            r#"
            INSERT INTO sales (medicine_id, quantity, total_price_cents, date, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(input.medicine_id)
        .bind(input.quantity)
        .bind(input.total_price.cents())
        .bind(input.date)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::ForeignKeyViolation { .. } => {
                DbError::not_found("Medicine", input.medicine_id.to_string())
            }
            other => other,
        })?;

        let id = result.last_insert_rowid();
        debug!(id = id, medicine_id = input.medicine_id, "Recorded sale");
        Ok(id)
    }

    /// Applies a checkout plan atomically.
    ///
    /// Either every stock decrement and every sale row is written, or nothing
    /// is and the error names the first cart line of the failing medicine.
    pub async fn commit_checkout(
        &self,
        plan: &CheckoutPlan,
        employee_id: Option<i64>,
    ) -> DbResult<CommittedCheckout> {
        let committed_at = Utc::now();
        let business_date = committed_at.date_naive();
        let receipt_number = generate_receipt_number(committed_at);

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        for delta in &plan.deltas {
            let result = sqlx::query(
                r#"
                UPDATE medicines SET
                    quantity = quantity - ?2,
                    version = version + 1,
                    updated_at = ?3
                WHERE id = ?1 AND quantity >= ?2
                "#,
            )
            .bind(delta.medicine_id)
            .bind(delta.quantity)
            .bind(committed_at)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                let available: Option<i64> =
                    sqlx::query_scalar("SELECT quantity FROM medicines WHERE id = ?1")
                        .bind(delta.medicine_id)
                        .fetch_optional(&mut *tx)
                        .await?;

                tx.rollback()
                    .await
                    .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

                warn!(
                    medicine_id = delta.medicine_id,
                    requested = delta.quantity,
                    available = ?available,
                    line_index = delta.first_line_index,
                    "Checkout aborted, transaction rolled back"
                );
                return Err(CheckoutPlan::abort(delta, available).into());
            }
        }

        let mut sale_ids = Vec::with_capacity(plan.lines.len());
        for line in &plan.lines {
            let result = sqlx::query(
                r#"
                INSERT INTO sales (
                    medicine_id, quantity, total_price_cents, date,
                    employee_id, receipt_number, payment_method, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(line.medicine_id)
            .bind(line.quantity)
            .bind(line.line_total.cents())
            .bind(business_date)
            .bind(employee_id)
            .bind(&receipt_number)
            .bind(plan.payment_method)
            .bind(committed_at)
            .execute(&mut *tx)
            .await?;

            sale_ids.push(result.last_insert_rowid());
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            receipt_number = %receipt_number,
            lines = plan.lines.len(),
            total = %plan.total,
            payment_method = %plan.payment_method,
            "Checkout committed"
        );

        Ok(CommittedCheckout {
            receipt_number,
            sale_ids,
            committed_at,
        })
    }
}

/// Generates a receipt number in format: YYYYMMDD-XXXXXXXX
///
/// ## Format
/// - YYYYMMDD: Date of the commit
/// - XXXXXXXX: First 8 hex digits of a v4 UUID, upper case
///
/// ## Example
/// `20250314-9F2C41D0`
fn generate_receipt_number(now: DateTime<Utc>) -> String {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(8)
        .collect();

    format!("{}-{}", now.format("%Y%m%d"), suffix.to_uppercase())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use medicare_core::{Cart, Medicine, MedicineInput};

    use super::*;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn add_medicine(db: &Database, name: &str, price_major: i64, quantity: i64) -> Medicine {
        db.medicines()
            .insert(&MedicineInput {
                name: name.to_string(),
                manufacturer: "ABC Pharma".to_string(),
                expiry_date: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
                price: Money::from_major_minor(price_major, 0),
                quantity,
            })
            .await
            .unwrap()
    }

    async fn quantity_of(db: &Database, id: i64) -> i64 {
        db.medicines().get_by_id(id).await.unwrap().unwrap().quantity
    }

    #[tokio::test]
    async fn test_commit_decrements_stock_and_writes_sales() {
        let db = test_db().await;
        let paracetamol = add_medicine(&db, "Paracetamol", 500, 100).await;

        let mut cart = Cart::new();
        cart.add(&paracetamol, 5).unwrap();
        let plan = CheckoutPlan::from_cart(&cart, PaymentMethod::Cash).unwrap();

        let committed = db.sales().commit_checkout(&plan, None).await.unwrap();

        assert_eq!(committed.sale_ids.len(), 1);
        assert_eq!(quantity_of(&db, paracetamol.id).await, 95);

        let sales = db.sales().list(DateRange::unbounded()).await.unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].medicine_id, paracetamol.id);
        assert_eq!(sales[0].medicine_name.as_deref(), Some("Paracetamol"));
        assert_eq!(sales[0].quantity, 5);
        assert_eq!(sales[0].total_price, Money::from_major_minor(2500, 0));
        assert_eq!(sales[0].receipt_number.as_deref(), Some(committed.receipt_number.as_str()));
        assert_eq!(sales[0].payment_method, Some(PaymentMethod::Cash));
    }

    #[tokio::test]
    async fn test_commit_is_all_or_nothing() {
        let db = test_db().await;
        let paracetamol = add_medicine(&db, "Paracetamol", 500, 100).await;
        let ibuprofen = add_medicine(&db, "Ibuprofen", 800, 3).await;

        let mut cart = Cart::new();
        cart.add(&paracetamol, 10).unwrap();
        cart.add(&ibuprofen, 3).unwrap();
        let plan = CheckoutPlan::from_cart(&cart, PaymentMethod::Credit).unwrap();

        // Stock drops after the cart was built
        db.medicines().set_quantity(ibuprofen.id, 1).await.unwrap();

        let err = db.sales().commit_checkout(&plan, None).await.unwrap_err();
        match err {
            DbError::Domain(CoreError::CheckoutAborted {
                line_index,
                medicine_id,
                available,
                requested,
            }) => {
                assert_eq!(line_index, 1);
                assert_eq!(medicine_id, ibuprofen.id);
                assert_eq!(available, Some(1));
                assert_eq!(requested, 3);
            }
            other => panic!("unexpected error: {other}"),
        }

        assert_eq!(quantity_of(&db, paracetamol.id).await, 100);
        assert_eq!(quantity_of(&db, ibuprofen.id).await, 1);
        assert!(db.sales().list(DateRange::unbounded()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_commit_aborts_when_medicine_vanished() {
        let db = test_db().await;
        let amoxicillin = add_medicine(&db, "Amoxicillin", 1200, 50).await;

        let mut cart = Cart::new();
        cart.add(&amoxicillin, 2).unwrap();
        let plan = CheckoutPlan::from_cart(&cart, PaymentMethod::Mobile).unwrap();

        db.medicines().delete(amoxicillin.id).await.unwrap();

        let err = db.sales().commit_checkout(&plan, None).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::CheckoutAborted { available: None, .. })
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_checkouts_never_oversell() {
        let dir = tempfile::tempdir().unwrap();
        let config = DbConfig::new(dir.path().join("race.db")).max_connections(5);
        let db = Database::new(config).await.unwrap();
        let paracetamol = add_medicine(&db, "Paracetamol", 500, 100).await;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let db = db.clone();
            let paracetamol = paracetamol.clone();
            handles.push(tokio::spawn(async move {
                let mut cart = Cart::new();
                cart.add(&paracetamol, 30).unwrap();
                let plan = CheckoutPlan::from_cart(&cart, PaymentMethod::Cash).unwrap();
                db.sales().commit_checkout(&plan, None).await
            }));
        }

        let mut settled = 0;
        let mut aborted = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => settled += 1,
                Err(DbError::Domain(CoreError::CheckoutAborted {
                    line_index,
                    available,
                    requested,
                    ..
                })) => {
                    assert_eq!(line_index, 0);
                    assert_eq!(requested, 30);
                    assert_eq!(available, Some(10));
                    aborted += 1;
                }
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(settled, 3);
        assert_eq!(aborted, 5);
        assert_eq!(quantity_of(&db, paracetamol.id).await, 10);
        assert_eq!(db.sales().list(DateRange::unbounded()).await.unwrap().len(), 3);

        db.close().await;
    }

    #[tokio::test]
    async fn test_lines_of_same_medicine_share_receipt() {
        let db = test_db().await;
        let paracetamol = add_medicine(&db, "Paracetamol", 500, 10).await;

        let mut cart = Cart::new();
        cart.add(&paracetamol, 4).unwrap();
        cart.add(&paracetamol, 6).unwrap();
        let plan = CheckoutPlan::from_cart(&cart, PaymentMethod::Cash).unwrap();

        let committed = db.sales().commit_checkout(&plan, None).await.unwrap();

        assert_eq!(committed.sale_ids.len(), 2);
        assert_eq!(quantity_of(&db, paracetamol.id).await, 0);

        let sales = db.sales().list(DateRange::unbounded()).await.unwrap();
        assert!(sales
            .iter()
            .all(|s| s.receipt_number.as_deref() == Some(committed.receipt_number.as_str())));
    }

    #[tokio::test]
    async fn test_direct_insert_and_range_filter() {
        let db = test_db().await;
        let paracetamol = add_medicine(&db, "Paracetamol", 500, 100).await;

        for day in [10, 11, 12] {
            db.sales()
                .insert(&SaleInput {
                    medicine_id: paracetamol.id,
                    quantity: 1,
                    total_price: Money::from_major_minor(500, 0),
                    date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
                })
                .await
                .unwrap();
        }

        let range = DateRange::new(
            Some(NaiveDate::from_ymd_opt(2025, 3, 11).unwrap()),
            Some(NaiveDate::from_ymd_opt(2025, 3, 12).unwrap()),
        )
        .unwrap();
        assert_eq!(db.sales().list(range).await.unwrap().len(), 2);

        // Direct inserts do not touch stock
        assert_eq!(quantity_of(&db, paracetamol.id).await, 100);
    }

    #[tokio::test]
    async fn test_direct_insert_unknown_medicine() {
        let db = test_db().await;
        let err = db
            .sales()
            .insert(&SaleInput {
                medicine_id: 404,
                quantity: 1,
                total_price: Money::from_major_minor(1, 0),
                date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_medicine_with_sales_cannot_be_deleted() {
        let db = test_db().await;
        let paracetamol = add_medicine(&db, "Paracetamol", 500, 100).await;
        db.sales()
            .insert(&SaleInput {
                medicine_id: paracetamol.id,
                quantity: 1,
                total_price: Money::from_major_minor(500, 0),
                date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            })
            .await
            .unwrap();

        let err = db.medicines().delete(paracetamol.id).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[test]
    fn test_receipt_number_format() {
        let now = Utc::now();
        let number = generate_receipt_number(now);
        let (date, suffix) = number.split_once('-').unwrap();
        assert_eq!(date, now.format("%Y%m%d").to_string());
        assert_eq!(suffix.len(), 8);
    }
}
