//! # Session Repository
//!
//! Login sessions. A bearer token is only honoured while its session row
//! exists, has not expired and has not been revoked.
//!
//! ```text
//!   login ──► create() ──► row { issued_at, expires_at, revoked_at: NULL }
//!                              │
//!   request ──► find_active() ─┤ (expires_at > now AND revoked_at IS NULL)
//!                              │
//!   logout ──► revoke() ───────┘ revoked_at = now
//! ```

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;

/// A stored login session.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub employee_id: i64,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }
}

/// Repository for session database operations.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    /// Creates a new SessionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SessionRepository { pool }
    }

    /// Opens a session for `employee_id` lasting `ttl`.
    pub async fn create(&self, employee_id: i64, ttl: Duration) -> DbResult<Session> {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4().to_string(),
            employee_id,
            issued_at: now,
            expires_at: now + ttl,
            revoked_at: None,
        };

        sqlx::query(
            r#"
            INSERT INTO sessions (id, employee_id, issued_at, expires_at, revoked_at)
            VALUES (?1, ?2, ?3, ?4, NULL)
            "#,
        )
        .bind(&session.id)
        .bind(session.employee_id)
        .bind(session.issued_at)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await?;

        debug!(session_id = %session.id, employee_id = employee_id, "Session created");
        Ok(session)
    }

    /// Gets a session by ID regardless of state.
    pub async fn get(&self, id: &str) -> DbResult<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, employee_id, issued_at, expires_at, revoked_at
            FROM sessions
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Gets a session only if it is usable at `now`.
    pub async fn find_active(&self, id: &str, now: DateTime<Utc>) -> DbResult<Option<Session>> {
        Ok(self.get(id).await?.filter(|s| s.is_active(now)))
    }

    /// Revokes a session.
    ///
    /// ## Returns
    /// `true` if an active session was revoked, `false` if it was unknown or
    /// already revoked.
    pub async fn revoke(&self, id: &str) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE sessions SET revoked_at = ?2
            WHERE id = ?1 AND revoked_at IS NULL
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        debug!(session_id = %id, revoked = result.rows_affected() > 0, "Session revoke");
        Ok(result.rows_affected() > 0)
    }

    /// Deletes sessions that are revoked or expired at `now`.
    ///
    /// Timestamps are stored as RFC 3339 UTC text, which orders the same
    /// lexically and chronologically.
    pub async fn purge_inactive(&self, now: DateTime<Utc>) -> DbResult<u64> {
        let purged = sqlx::query(
            r#"
            DELETE FROM sessions
            WHERE revoked_at IS NOT NULL OR expires_at <= ?1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if purged > 0 {
            debug!(purged = purged, "Purged inactive sessions");
        }
        Ok(purged)
    }

    /// Ids of every session usable at `now`.
    pub async fn active_ids(&self, now: DateTime<Utc>) -> DbResult<HashSet<String>> {
        let ids: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT id FROM sessions
            WHERE revoked_at IS NULL AND expires_at > ?1
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use medicare_core::{EmployeeInput, EmployeeRole};

    use super::*;

    async fn db_with_employee() -> (Database, i64) {
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
        (db, employee.id)
    }

    #[tokio::test]
    async fn test_create_and_find_active() {
        let (db, employee_id) = db_with_employee().await;
        let repo = db.sessions();

        let session = repo.create(employee_id, Duration::hours(8)).await.unwrap();
        let found = repo.find_active(&session.id, Utc::now()).await.unwrap().unwrap();

        assert_eq!(found.employee_id, employee_id);
        assert!(found.revoked_at.is_none());
    }

    #[tokio::test]
    async fn test_revoked_session_is_inactive() {
        let (db, employee_id) = db_with_employee().await;
        let repo = db.sessions();
        let session = repo.create(employee_id, Duration::hours(8)).await.unwrap();

        assert!(repo.revoke(&session.id).await.unwrap());
        assert!(!repo.revoke(&session.id).await.unwrap());
        assert!(repo.find_active(&session.id, Utc::now()).await.unwrap().is_none());
        assert!(repo.get(&session.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_expired_session_is_inactive() {
        let (db, employee_id) = db_with_employee().await;
        let repo = db.sessions();
        let session = repo.create(employee_id, Duration::minutes(5)).await.unwrap();

        let later = Utc::now() + Duration::minutes(10);
        assert!(repo.find_active(&session.id, later).await.unwrap().is_none());

        assert_eq!(repo.purge_inactive(later).await.unwrap(), 1);
        assert!(repo.get(&session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_purge_keeps_only_active_sessions() {
        let (db, employee_id) = db_with_employee().await;
        let repo = db.sessions();
        let active = repo.create(employee_id, Duration::hours(8)).await.unwrap();
        let revoked = repo.create(employee_id, Duration::hours(8)).await.unwrap();
        let expired = repo.create(employee_id, Duration::seconds(-1)).await.unwrap();
        repo.revoke(&revoked.id).await.unwrap();

        let now = Utc::now();
        let ids = repo.active_ids(now).await.unwrap();
        assert_eq!(ids, HashSet::from([active.id.clone()]));

        assert_eq!(repo.purge_inactive(now).await.unwrap(), 2);
        assert!(repo.get(&active.id).await.unwrap().is_some());
        assert!(repo.get(&revoked.id).await.unwrap().is_none());
        assert!(repo.get(&expired.id).await.unwrap().is_none());
    }
}
