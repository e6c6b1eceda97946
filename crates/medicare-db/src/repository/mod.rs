//! # Repository Module
//!
//! One repository per table group. Each holds a clone of the pool and is
//! handed out by [`Database`](crate::Database).
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  axum handler                                                           │
//! │       │  state.db.medicines().list()                                    │
//! │       ▼                                                                 │
//! │  MedicineRepository   EmployeeRepository   SessionRepository            │
//! │  SaleRepository ──── commit_checkout (one transaction) ────┐            │
//! │  ReportRepository ── reads only, builds via medicare-core  │            │
//! │       │                                                    │            │
//! │       ▼                                                    ▼            │
//! │  SQLite (medicines, employees, sales, sessions)                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod employee;
pub mod medicine;
pub mod report;
pub mod sale;
pub mod session;
