//! # balcao-core: Pure Business Logic for Balcão
//!
//! This crate is the **heart** of Balcão. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Balcão Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     Caller (UI / scripts)                       │   │
//! │  │    product forms ──► sale entry ──► stock screen ──► reports   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ balcao-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  pricing  │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │ LineFigs  │  │   rules   │  │   │
//! │  │   │ StockMove │  │  (cents)  │  │ SaleTotals│  │  sku_slug │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    balcao-db (Database Layer)                   │   │
//! │  │    SQLite ledger, sale transaction, cost engine, reports        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, ProductVariant, StockMove, Sale, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`pricing`] - Sale line math (gross/net/cost/profit)
//! - [`error`] - Domain error types
//! - [`validation`] - Field validators and SKU slug generation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use balcao_core::money::Money;
//! use balcao_core::pricing::LineFigures;
//!
//! // Create money from cents (never from floats!)
//! let price = Money::from_cents(1000); // R$ 10.00
//!
//! // 3 units, fees 1.00, discount 0.50, cost snapshot 4.00
//! let line = LineFigures::compute(
//!     3,
//!     price,
//!     Money::from_cents(100),
//!     Money::from_cents(50),
//!     Money::from_cents(400),
//! );
//!
//! assert_eq!(line.net.cents(), 2850);
//! assert_eq!(line.profit.cents(), 1650);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use balcao_core::Money` instead of
// `use balcao_core::money::Money`

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use pricing::{LineFigures, SaleTotals};
pub use types::*;
