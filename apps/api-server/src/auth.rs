//! Session tokens and the request guards built on them.
//!
//! ```text
//!   Authorization: Bearer <jwt>
//!        │
//!        ▼
//!   JwtManager::validate_token ── signature + exp ──► Claims { sub, role, jti }
//!        │
//!        ▼
//!   sessions().find_active(jti) ── row exists, not expired, not revoked
//!        │
//!        ▼
//!   employees().get_by_id(sub) ──► AuthSession  (AdminSession adds a role check)
//! ```
//!
//! A valid signature alone is not enough: logout revokes the session row and
//! the token dies with it.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::ApiError;
use crate::state::AppState;
use medicare_core::{Employee, EmployeeRole};
use medicare_db::Session;

/// JWT claims structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Employee id
    pub sub: i64,

    /// Role at login time
    pub role: EmployeeRole,

    /// Session id
    pub jti: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// Signs and checks session tokens (HS256).
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtManager {
    pub fn new(secret: &str) -> Self {
        JwtManager {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issues the token for a freshly created session. The token expires
    /// with the session.
    pub fn issue(&self, employee: &Employee, session: &Session) -> Result<String, ApiError> {
        let claims = Claims {
            sub: employee.id,
            role: employee.role,
            jti: session.id.clone(),
            iat: session.issued_at.timestamp(),
            exp: session.expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "Failed to sign session token");
            ApiError::internal()
        })
    }

    /// Validate and decode a token.
    pub fn validate_token(&self, token: &str) -> Result<Claims, ApiError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "Rejected session token");
                ApiError::unauthorized("Invalid or expired session")
            })
    }
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

// =============================================================================
// Extractors
// =============================================================================

/// The authenticated caller of a request.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub employee: Employee,
    pub session_id: String,
}

impl FromRequestParts<AppState> for AuthSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;
        let token = extract_bearer_token(header)
            .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;

        let claims = state.jwt.validate_token(token)?;

        let session = state
            .db
            .sessions()
            .find_active(&claims.jti, Utc::now())
            .await?
            .filter(|s| s.employee_id == claims.sub)
            .ok_or_else(|| ApiError::unauthorized("Invalid or expired session"))?;

        let employee = state
            .db
            .employees()
            .get_by_id(session.employee_id)
            .await?
            .ok_or_else(|| ApiError::unauthorized("Invalid or expired session"))?;

        Ok(AuthSession {
            employee,
            session_id: session.id,
        })
    }
}

/// An authenticated administrator. The role is read from the store, not
/// from the token.
#[derive(Debug, Clone)]
pub struct AdminSession(pub AuthSession);

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = AuthSession::from_request_parts(parts, state).await?;
        if !session.employee.role.is_admin() {
            return Err(ApiError::forbidden("Administrator role required"));
        }
        Ok(AdminSession(session))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::error::ErrorCode;

    fn employee(role: EmployeeRole) -> Employee {
        Employee {
            id: 7,
            name: "Jane Doe".to_string(),
            role,
            username: "jane".to_string(),
            created_at: Utc::now(),
        }
    }

    fn session(ttl: Duration) -> Session {
        let now = Utc::now();
        Session {
            id: "0b6c3c1e-8f7a-4b55-9a55-6a2b7f5f5c11".to_string(),
            employee_id: 7,
            issued_at: now,
            expires_at: now + ttl,
            revoked_at: None,
        }
    }

    #[test]
    fn test_jwt_roundtrip() {
        let manager = JwtManager::new("test-secret");
        let token = manager
            .issue(&employee(EmployeeRole::Pharmacist), &session(Duration::hours(1)))
            .unwrap();

        let claims = manager.validate_token(&token).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.role, EmployeeRole::Pharmacist);
        assert_eq!(claims.jti, "0b6c3c1e-8f7a-4b55-9a55-6a2b7f5f5c11");
    }

    #[test]
    fn test_expired_token_rejected() {
        let manager = JwtManager::new("test-secret");
        let token = manager
            .issue(&employee(EmployeeRole::Cashier), &session(Duration::minutes(-5)))
            .unwrap();

        let err = manager.validate_token(&token).unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = JwtManager::new("one")
            .issue(&employee(EmployeeRole::Admin), &session(Duration::hours(1)))
            .unwrap();

        assert!(JwtManager::new("two").validate_token(&token).is_err());
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(extract_bearer_token("Bearer "), None);
        assert_eq!(extract_bearer_token("Basic abc"), None);
    }
}
