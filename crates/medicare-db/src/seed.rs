//! # Initial Data
//!
//! A fresh install needs one administrator to log in with. The sample
//! catalog is optional and only ever lands in an empty `medicines` table.

use chrono::NaiveDate;
use tracing::info;

use crate::error::DbResult;
use crate::pool::Database;
use medicare_core::{Employee, EmployeeInput, EmployeeRole, MedicineInput, Money};

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin";
pub const DEFAULT_ADMIN_NAME: &str = "Administrator";

/// (name, manufacturer, expiry y/m/d, price in major units, quantity)
const SAMPLE_MEDICINES: &[(&str, &str, (i32, u32, u32), i64, i64)] = &[
    ("Paracetamol", "ABC Pharma", (2025, 12, 31), 500, 100),
    ("Amoxicillin", "XYZ Labs", (2025, 6, 30), 1200, 50),
    ("Ibuprofen", "Health Corp", (2025, 9, 30), 800, 75),
];

/// Creates the default administrator when no employee exists yet.
///
/// ## Returns
/// The created employee, or `None` if the table already had rows.
pub async fn ensure_default_admin(db: &Database) -> DbResult<Option<Employee>> {
    if db.employees().count().await? > 0 {
        return Ok(None);
    }

    let admin = db
        .employees()
        .insert(&EmployeeInput {
            name: DEFAULT_ADMIN_NAME.to_string(),
            role: EmployeeRole::Admin,
            username: DEFAULT_ADMIN_USERNAME.to_string(),
            password: DEFAULT_ADMIN_PASSWORD.to_string(),
        })
        .await?;

    info!(
        employee_id = admin.id,
        username = %admin.username,
        "Created default administrator"
    );
    Ok(Some(admin))
}

/// Inserts the sample catalog into an empty `medicines` table.
///
/// ## Returns
/// How many medicines were inserted (0 when the catalog was not empty).
pub async fn insert_sample_medicines(db: &Database) -> DbResult<usize> {
    let existing = db.medicines().count().await?;
    if existing > 0 {
        info!(existing = existing, "Catalog not empty, skipping sample medicines");
        return Ok(0);
    }

    let mut inserted = 0;
    for &(name, manufacturer, (y, m, d), price, quantity) in SAMPLE_MEDICINES {
        let Some(expiry_date) = NaiveDate::from_ymd_opt(y, m, d) else {
            continue;
        };

        db.medicines()
            .insert(&MedicineInput {
                name: name.to_string(),
                manufacturer: manufacturer.to_string(),
                expiry_date,
                price: Money::from_major_minor(price, 0),
                quantity,
            })
            .await?;
        inserted += 1;
    }

    info!(inserted = inserted, "Inserted sample medicines");
    Ok(inserted)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::DbConfig;

    use super::*;

    #[tokio::test]
    async fn test_default_admin_created_once() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let admin = ensure_default_admin(&db).await.unwrap().unwrap();
        assert_eq!(admin.username, "admin");
        assert_eq!(admin.role, EmployeeRole::Admin);

        assert!(ensure_default_admin(&db).await.unwrap().is_none());
        assert_eq!(db.employees().count().await.unwrap(), 1);

        let logged_in = db.employees().authenticate("admin", "admin").await.unwrap();
        assert_eq!(logged_in.map(|e| e.id), Some(admin.id));
    }

    #[tokio::test]
    async fn test_sample_medicines_only_into_empty_catalog() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert_eq!(insert_sample_medicines(&db).await.unwrap(), 3);
        assert_eq!(insert_sample_medicines(&db).await.unwrap(), 0);

        let medicines = db.medicines().list().await.unwrap();
        assert_eq!(medicines.len(), 3);
        assert_eq!(medicines[0].name, "Paracetamol");
        assert_eq!(medicines[0].price, Money::from_cents(50_000));
        assert_eq!(medicines[1].quantity, 50);
    }
}
