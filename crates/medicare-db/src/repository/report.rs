//! # Report Repository
//!
//! Loads the rows a report needs and hands them to the pure builders in
//! `medicare_core::report`. Nothing is cached.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::medicine::MedicineRepository;
use medicare_core::report::build_report;
use medicare_core::{DateRange, Money, ReportKind, ReportTable, SaleFact};

#[derive(Debug, sqlx::FromRow)]
struct SaleFactRow {
    sale_id: i64,
    medicine_id: i64,
    medicine_name: Option<String>,
    quantity: i64,
    total_price_cents: i64,
    date: NaiveDate,
    employee_name: Option<String>,
    receipt_number: Option<String>,
}

impl From<SaleFactRow> for SaleFact {
    fn from(row: SaleFactRow) -> Self {
        SaleFact {
            sale_id: row.sale_id,
            medicine_id: row.medicine_id,
            medicine_name: row
                .medicine_name
                .unwrap_or_else(|| format!("Medicine #{}", row.medicine_id)),
            quantity: row.quantity,
            total_price: Money::from_cents(row.total_price_cents),
            date: row.date,
            employee_name: row.employee_name,
            receipt_number: row.receipt_number,
        }
    }
}

/// Repository for report queries.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Builds the `kind` report over `range`.
    pub async fn generate(
        &self,
        kind: ReportKind,
        range: DateRange,
        currency_prefix: &str,
    ) -> DbResult<ReportTable> {
        let medicines = match kind {
            ReportKind::Sales | ReportKind::EmployeeCollection => Vec::new(),
            ReportKind::Inventory | ReportKind::Dispensed => {
                MedicineRepository::new(self.pool.clone()).list().await?
            }
        };
        let facts = if kind.uses_sales() {
            self.sale_facts(range).await?
        } else {
            Vec::new()
        };

        debug!(
            kind = ?kind,
            medicines = medicines.len(),
            sales = facts.len(),
            "Generating report"
        );

        Ok(build_report(kind, &medicines, &facts, range, currency_prefix))
    }

    /// Sales in `range` joined with medicine and employee names.
    pub async fn sale_facts(&self, range: DateRange) -> DbResult<Vec<SaleFact>> {
        let rows = sqlx::query_as::<_, SaleFactRow>(
            r#"
            SELECT
                s.id AS sale_id,
                s.medicine_id,
                m.name AS medicine_name,
                s.quantity,
                s.total_price_cents,
                s.date,
                e.name AS employee_name,
                s.receipt_number
            FROM sales s
            LEFT JOIN medicines m ON m.id = s.medicine_id
            LEFT JOIN employees e ON e.id = s.employee_id
            WHERE (?1 IS NULL OR s.date >= ?1)
              AND (?2 IS NULL OR s.date <= ?2)
            ORDER BY s.id
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SaleFact::from).collect())
    }
}

/// The current UTC business date, used to resolve range presets.
pub fn today() -> NaiveDate {
    let now: DateTime<Utc> = Utc::now();
    now.date_naive()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use medicare_core::{Cart, CheckoutPlan, EmployeeInput, EmployeeRole, MedicineInput, PaymentMethod, SaleInput};

    use super::*;

    async fn seeded() -> (Database, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let employee = db
            .employees()
            .insert(&EmployeeInput {
                name: "Administrator".to_string(),
                role: EmployeeRole::Admin,
                username: "admin".to_string(),
                password: "admin".to_string(),
            })
            .await
            .unwrap();

        let paracetamol = db
            .medicines()
            .insert(&MedicineInput {
                name: "Paracetamol".to_string(),
                manufacturer: "ABC Pharma".to_string(),
                expiry_date: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
                price: Money::from_major_minor(500, 0),
                quantity: 100,
            })
            .await
            .unwrap();

        let mut cart = Cart::new();
        cart.add(&paracetamol, 5).unwrap();
        let plan = CheckoutPlan::from_cart(&cart, PaymentMethod::Cash).unwrap();
        db.sales()
            .commit_checkout(&plan, Some(employee.id))
            .await
            .unwrap();

        db.sales()
            .insert(&SaleInput {
                medicine_id: paracetamol.id,
                quantity: 2,
                total_price: Money::from_major_minor(1000, 0),
                date: today(),
            })
            .await
            .unwrap();

        (db, paracetamol.id)
    }

    #[tokio::test]
    async fn test_sales_report_from_store() {
        let (db, _) = seeded().await;

        let table = db
            .reports()
            .generate(ReportKind::Sales, DateRange::unbounded(), "Tsh.")
            .await
            .unwrap();

        assert_eq!(table.rows, vec![vec!["Paracetamol", "7", "Tsh. 3500.00"]]);
        assert_eq!(table.total, vec!["", "Total", "Tsh. 3500.00"]);
    }

    #[tokio::test]
    async fn test_employee_collection_from_store() {
        let (db, _) = seeded().await;

        let table = db
            .reports()
            .generate(ReportKind::EmployeeCollection, DateRange::unbounded(), "Tsh.")
            .await
            .unwrap();

        let date = today().to_string();
        assert_eq!(
            table.rows,
            vec![
                vec!["Administrator", "1", date.as_str(), "Tsh. 2500.00"],
                vec!["Unattributed", "1", date.as_str(), "Tsh. 1000.00"],
            ]
        );
    }

    #[tokio::test]
    async fn test_dispensed_from_store() {
        let (db, _) = seeded().await;

        let table = db
            .reports()
            .generate(ReportKind::Dispensed, DateRange::unbounded(), "Tsh.")
            .await
            .unwrap();

        // The direct sale did not decrement stock: 100 - 5 = 95 remain
        assert_eq!(table.rows[0], vec!["Paracetamol", "102", "7", "95"]);
    }

    #[tokio::test]
    async fn test_inventory_ignores_range() {
        let (db, _) = seeded().await;
        let far_past = DateRange::new(None, NaiveDate::from_ymd_opt(2000, 1, 1)).unwrap();

        let table = db
            .reports()
            .generate(ReportKind::Inventory, far_past, "Tsh.")
            .await
            .unwrap();

        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.total[4], "95");
    }
}
