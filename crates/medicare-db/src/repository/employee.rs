//! # Employee Repository
//!
//! Database operations for the employee roster and credential checks.
//!
//! Password hashes never leave this module: rows are read into
//! `EmployeeRow` and converted to [`Employee`], which has no hash field.
//!
//! `authenticate` runs exactly one argon2 verify per call whether or not the
//! username exists, so response time does not reveal the roster.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use medicare_core::password::{dummy_hash, hash_password, verify_password};
use medicare_core::validation::validate_employee_input;
use medicare_core::{CoreError, Employee, EmployeeInput, EmployeeRole};

#[derive(Debug, sqlx::FromRow)]
struct EmployeeRow {
    id: i64,
    name: String,
    role: EmployeeRole,
    username: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<EmployeeRow> for Employee {
    fn from(row: EmployeeRow) -> Self {
        Employee {
            id: row.id,
            name: row.name,
            role: row.role,
            username: row.username,
            created_at: row.created_at,
        }
    }
}

/// Repository for employee database operations.
#[derive(Debug, Clone)]
pub struct EmployeeRepository {
    pool: SqlitePool,
    verify: fn(&str, &str) -> bool,
}

impl EmployeeRepository {
    /// Creates a new EmployeeRepository.
    pub fn new(pool: SqlitePool) -> Self {
        EmployeeRepository {
            pool,
            verify: verify_password,
        }
    }

    /// Lists every employee in insertion order.
    pub async fn list(&self) -> DbResult<Vec<Employee>> {
        let rows = sqlx::query_as::<_, EmployeeRow>(
            r#"
            SELECT id, name, role, username, password_hash, created_at
            FROM employees
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Employee::from).collect())
    }

    /// Gets an employee by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Employee>> {
        let row = sqlx::query_as::<_, EmployeeRow>(
            r#"
            SELECT id, name, role, username, password_hash, created_at
            FROM employees
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Employee::from))
    }

    /// Checks a username/password pair.
    ///
    /// ## Returns
    /// - `Some(employee)` when the user exists and the password matches
    /// - `None` for an unknown user or a wrong password (indistinguishable)
    pub async fn authenticate(&self, username: &str, password: &str) -> DbResult<Option<Employee>> {
        let row = sqlx::query_as::<_, EmployeeRow>(
            r#"
            SELECT id, name, role, username, password_hash, created_at
            FROM employees
            WHERE username = ?1
            "#,
        )
        .bind(username.trim())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            if let Some(hash) = dummy_hash() {
                (self.verify)(password, hash);
            }
            debug!(username = %username, "Credentials rejected");
            return Ok(None);
        };

        if (self.verify)(password, &row.password_hash) {
            debug!(employee_id = row.id, "Credentials verified");
            Ok(Some(Employee::from(row)))
        } else {
            debug!(username = %username, "Credentials rejected");
            Ok(None)
        }
    }

    /// Creates an employee, hashing the password.
    ///
    /// ## Errors
    /// - `Domain(Validation)` for blank fields or a short password
    /// - `UniqueViolation` when the username is taken
    pub async fn insert(&self, input: &EmployeeInput) -> DbResult<Employee> {
        validate_employee_input(input).map_err(CoreError::from)?;

        let password_hash = hash_password(&input.password)?;
        let now = Utc::now();
        let name = input.name.trim();
        let username = input.username.trim();

        let result = sqlx::query(
            r#"
            INSERT INTO employees (name, role, username, password_hash, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(name)
        .bind(input.role)
        .bind(username)
        .bind(&password_hash)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, username),
            other => other,
        })?;

        let id = result.last_insert_rowid();
        info!(id = id, username = %username, role = %input.role, "Created employee");

        Ok(Employee {
            id,
            name: name.to_string(),
            role: input.role,
            username: username.to_string(),
            created_at: now,
        })
    }

    /// Deletes an employee. Their sales stay, unattributed.
    ///
    /// ## Errors
    /// - `NotFound` for an unknown id
    /// - `Domain(LastAdministrator)` when `id` is the only admin left
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        // One statement, so two admins deleting each other cannot both succeed
        let result = sqlx::query(
            r#"
            DELETE FROM employees
            WHERE id = ?1
              AND (role <> ?2
                   OR (SELECT COUNT(*) FROM employees WHERE role = ?2) > 1)
            "#,
        )
        .bind(id)
        .bind(EmployeeRole::Admin)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return match self.get_by_id(id).await? {
                Some(_) => Err(CoreError::LastAdministrator.into()),
                None => Err(DbError::not_found("Employee", id.to_string())),
            };
        }

        info!(id = id, "Deleted employee");
        Ok(())
    }

    /// Number of employees.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM employees")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
