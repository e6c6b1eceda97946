//! # Medicine Repository
//!
//! Database operations for the medicine catalog.
//!
//! ## Catalog Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Medicine Catalog                                     │
//! │                                                                         │
//! │  Inventory screen                                                       │
//! │  ├── list()             GET    /medicines          (id order)          │
//! │  ├── insert(input)      POST   /medicines                              │
//! │  ├── update(id, input)  PUT    /medicines/{id}     (full replace)      │
//! │  ├── set_quantity(id,q) PATCH  /medicines/{id}/quantity                │
//! │  ├── delete(id)         DELETE /medicines/{id}                         │
//! │  └── expiring_before(d) GET    /medicines/expiring?before=d            │
//! │                                                                         │
//! │  Sales screen                                                           │
//! │  └── get_by_id(id)      cart add (advisory stock check)                │
//! │                                                                         │
//! │  Every write bumps `version` and `updated_at`.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use medicare_core::validation::{validate_medicine_input, validate_stock_quantity};
use medicare_core::{CoreError, Medicine, MedicineInput, Money};

/// Row shape of the `medicines` table.
#[derive(Debug, sqlx::FromRow)]
struct MedicineRow {
    id: i64,
    name: String,
    manufacturer: String,
    expiry_date: NaiveDate,
    price_cents: i64,
    quantity: i64,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<MedicineRow> for Medicine {
    fn from(row: MedicineRow) -> Self {
        Medicine {
            id: row.id,
            name: row.name,
            manufacturer: row.manufacturer,
            expiry_date: row.expiry_date,
            price: Money::from_cents(row.price_cents),
            quantity: row.quantity,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const MEDICINE_COLUMNS: &str = r#"
    id, name, manufacturer, expiry_date, price_cents, quantity,
    version, created_at, updated_at
"#;

/// Repository for medicine database operations.
#[derive(Debug, Clone)]
pub struct MedicineRepository {
    pool: SqlitePool,
}

impl MedicineRepository {
    /// Creates a new MedicineRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MedicineRepository { pool }
    }

    /// Lists every medicine in insertion order.
    pub async fn list(&self) -> DbResult<Vec<Medicine>> {
        let sql = format!("SELECT {} FROM medicines ORDER BY id", MEDICINE_COLUMNS);
        let rows = sqlx::query_as::<_, MedicineRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Medicine::from).collect())
    }

    /// Gets a medicine by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Medicine>> {
        let sql = format!("SELECT {} FROM medicines WHERE id = ?1", MEDICINE_COLUMNS);
        let row = sqlx::query_as::<_, MedicineRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Medicine::from))
    }

    /// Medicines expiring on or before `date`, soonest first.
    pub async fn expiring_before(&self, date: NaiveDate) -> DbResult<Vec<Medicine>> {
        let sql = format!(
            "SELECT {} FROM medicines WHERE expiry_date <= ?1 ORDER BY expiry_date, id",
            MEDICINE_COLUMNS
        );
        let rows = sqlx::query_as::<_, MedicineRow>(&sql)
            .bind(date)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Medicine::from).collect())
    }

    /// Inserts a new medicine.
    ///
    /// ## Returns
    /// The stored medicine with its generated id.
    pub async fn insert(&self, input: &MedicineInput) -> DbResult<Medicine> {
        validate_medicine_input(input).map_err(CoreError::from)?;

        let now = Utc::now();
        let name = input.name.trim();
        let manufacturer = input.manufacturer.trim();

        let result = sqlx::query(
            r#"
            INSERT INTO medicines (
                name, manufacturer, expiry_date, price_cents, quantity,
                version, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)
            "#,
        )
        .bind(name)
        .bind(manufacturer)
        .bind(input.expiry_date)
        .bind(input.price.cents())
        .bind(input.quantity)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id = id, name = %name, "Inserted medicine");

        Ok(Medicine {
            id,
            name: name.to_string(),
            manufacturer: manufacturer.to_string(),
            expiry_date: input.expiry_date,
            price: input.price,
            quantity: input.quantity,
            version: 1,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replaces every mutable field of a medicine.
    ///
    /// ## Returns
    /// The updated row, or `NotFound` if `id` is absent.
    pub async fn update(&self, id: i64, input: &MedicineInput) -> DbResult<Medicine> {
        validate_medicine_input(input).map_err(CoreError::from)?;

        let result = sqlx::query(
            r#"
            UPDATE medicines SET
                name = ?2,
                manufacturer = ?3,
                expiry_date = ?4,
                price_cents = ?5,
                quantity = ?6,
                version = version + 1,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(input.manufacturer.trim())
        .bind(input.expiry_date)
        .bind(input.price.cents())
        .bind(input.quantity)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Medicine", id.to_string()));
        }

        debug!(id = id, "Updated medicine");

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Medicine", id.to_string()))
    }

    /// Sets the stock level directly (not a delta).
    pub async fn set_quantity(&self, id: i64, quantity: i64) -> DbResult<()> {
        validate_stock_quantity(quantity).map_err(CoreError::from)?;

        let result = sqlx::query(
            r#"
            UPDATE medicines SET
                quantity = ?2,
                version = version + 1,
                updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(quantity)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Medicine", id.to_string()));
        }

        debug!(id = id, quantity = quantity, "Set medicine quantity");
        Ok(())
    }

    /// Deletes a medicine.
    ///
    /// ## Errors
    /// - `NotFound` if `id` is absent
    /// - `ForeignKeyViolation` while sales still reference it
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM medicines WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Medicine", id.to_string()));
        }

        debug!(id = id, "Deleted medicine");
        Ok(())
    }

    /// Number of medicines in the catalog.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM medicines")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
