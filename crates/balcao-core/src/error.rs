//! # Core Error Types
//!
//! Business-rule errors shared across the workspace. Storage-level failures
//! live in the database crate and wrap these.

use thiserror::Error;

/// Business-rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A line referenced no SKU (blank after trimming).
    #[error("missing SKU")]
    MissingSku,

    /// A quantity that must be strictly positive was not.
    #[error("invalid quantity: {qty}")]
    InvalidQuantity { qty: i64 },

    /// No variant carries this SKU.
    #[error("unknown SKU: {sku}")]
    VariantNotFound { sku: String },

    /// The SKU resolved to a deactivated variant.
    #[error("inactive SKU: {sku}")]
    InactiveVariant { sku: String },

    /// A sale was submitted with no lines.
    #[error("sale has no items")]
    EmptySale,

    /// Category deletion blocked while products still reference it.
    #[error("category {id} still has {product_count} product(s)")]
    CategoryInUse { id: i64, product_count: i64 },

    /// Field-level validation failure.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Field-level input validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("{field} must be positive")]
    MustBePositive { field: &'static str },

    #[error("{field} must not be negative")]
    NonNegative { field: &'static str },

    #[error("{field} has an invalid format: {detail}")]
    InvalidFormat { field: &'static str, detail: String },
}
