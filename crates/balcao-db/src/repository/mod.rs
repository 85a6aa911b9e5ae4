//! # Repository Module
//!
//! Database repository implementations for Balcão.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Caller                                                                │
//! │       │                                                                 │
//! │       │  db.stock().record_movement(mv)                                 │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  StockMoveRepository                                                   │
//! │  ├── record_movement(&self, mv)                                        │
//! │  ├── current_stock(&self, variant_id)                                  │
//! │  ├── stock_overview(&self)                                             │
//! │  └── low_stock(&self)                                                  │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • Easy to test (in-memory database per test)                          │
//! │  • SQL is isolated in one place                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`category::CategoryRepository`] - Category CRUD with referential guard
//! - [`product::ProductRepository`] - Product CRUD and variant-mode handling
//! - [`variant::VariantRepository`] - SKU lookup, search, per-product listing
//! - [`stock::StockMoveRepository`] - The movement ledger and stock reads
//! - [`cost::CostEngine`] - Purchase-derived cost propagation
//! - [`sale::SaleRepository`] - Sale transaction, status, cancellation
//! - [`expense::ExpenseRepository`] - Expense CRUD
//! - [`reports::ReportsRepository`] - Period financial summary

pub mod category;
pub mod cost;
pub mod expense;
pub mod product;
pub mod reports;
pub mod sale;
pub mod stock;
pub mod variant;
