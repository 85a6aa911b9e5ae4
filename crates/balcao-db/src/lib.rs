//! # balcao-db: Database Layer for Balcão
//!
//! This crate provides database access for the Balcão inventory ledger.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Balcão Data Flow                                │
//! │                                                                         │
//! │  Caller (product form, sale entry, stock screen, reports)              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     balcao-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (stock, sale, │    │  (embedded)  │  │   │
//! │  │   │               │    │  cost, ...)   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ StockMoveRepo │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │    │ SaleRepo      │    │ ...          │  │   │
//! │  │   │ Management    │    │ CostEngine    │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │              ./data/balcao.db (WAL mode)                        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (stock, sale, cost, ...)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use balcao_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./data/balcao.db")).await?;
//!
//! let overview = db.stock().stock_overview().await?;
//! let low = db.stock().low_stock().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::DbError;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::cost::CostEngine;
pub use repository::expense::ExpenseRepository;
pub use repository::product::ProductRepository;
pub use repository::reports::ReportsRepository;
pub use repository::sale::SaleRepository;
pub use repository::stock::StockMoveRepository;
pub use repository::variant::VariantRepository;
