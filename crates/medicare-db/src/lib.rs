//! # medicare-db: Database Layer for the Medicare POS
//!
//! SQLite storage for the pharmacy POS, accessed asynchronously with sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Medicare POS Data Flow                           │
//! │                                                                         │
//! │  axum handler (POST /api/cart/checkout)                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   medicare-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ MedicineRepo  │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ EmployeeRepo  │    │ 001_initial_ │  │   │
//! │  │   │               │    │ SaleRepo      │    │   schema.sql │  │   │
//! │  │   │               │    │ SessionRepo   │    │              │  │   │
//! │  │   │               │    │ ReportRepo    │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 SQLite Database (medicare.db)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//! - [`seed`] - Default administrator and sample catalog
//!
//! ## Usage
//!
//! ```rust,ignore
//! use medicare_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("medicare.db")).await?;
//! medicare_db::seed::ensure_default_admin(&db).await?;
//!
//! let expiring = db.medicines().expiring_before(today).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod seed;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::employee::EmployeeRepository;
pub use repository::medicine::MedicineRepository;
pub use repository::report::ReportRepository;
pub use repository::sale::{CommittedCheckout, SaleRepository};
pub use repository::session::{Session, SessionRepository};
