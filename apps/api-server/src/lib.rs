//! # Medicare API
//!
//! REST server for the pharmacy POS browser front end.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         medicare-api                                    │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  auth          │  │  routes        │  │  state                     ││
//! │  │                │  │                │  │                            ││
//! │  │ • JwtManager   │  │ • medicines    │  │ • Database (medicare-db)   ││
//! │  │ • AuthSession  │  │ • cart         │  │ • ServerConfig             ││
//! │  │ • AdminSession │  │ • reports ...  │  │ • CartStore (per session)  ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  error: DbError / CoreError ──► ApiError ──► { error, code } + status  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables (see [`config`]):
//! - `MEDICARE_PORT` - HTTP port (default: 3000)
//! - `MEDICARE_BIND_ADDR` - bind address (default: 0.0.0.0)
//! - `MEDICARE_DATABASE_PATH` - SQLite file (default: ./pharmacy.db)
//! - `MEDICARE_DB_MAX_CONNECTIONS` - pool size (default: 5)
//! - `MEDICARE_JWT_SECRET` - session token signing key
//! - `MEDICARE_SESSION_TTL_SECS` - session lifetime (default: 28800)
//! - `MEDICARE_SEED_SAMPLE_DATA` - sample catalog on an empty store (default: false)
//! - `MEDICARE_CURRENCY_PREFIX` - amount prefix (default: Tsh.)
//! - `MEDICARE_CONFIG` - optional TOML file with the same keys in snake_case

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

// Re-exports
pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use routes::router;
pub use state::AppState;
