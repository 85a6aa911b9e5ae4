//! # Domain Types
//!
//! Core domain types used throughout Balcão.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │──►│ ProductVariant  │◄──│   StockMove     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  sku (unique)   │   │  variant_sku    │   │  move_type      │       │
//! │  │  cost_default   │   │  cost_override  │   │  qty, unit_cost │       │
//! │  │  stock_min      │   │  is_default     │   │  ref_type/id    │       │
//! │  └─────────────────┘   └────────▲────────┘   └─────────────────┘       │
//! │                                 │                                       │
//! │  ┌─────────────────┐   ┌────────┴────────┐                             │
//! │  │      Sale       │──►│    SaleItem     │                             │
//! │  │  six totals     │   │  cost snapshot  │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Variant-Only Addressing
//! Stock and sales NEVER reference a product directly. A product without
//! real variants owns exactly one synthetic default variant whose
//! `variant_sku` equals the product's own SKU.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Well-Known Ledger Tags
// =============================================================================

/// Movement reasons recorded in `stock_moves.reason`.
///
/// Free-form by schema, but these tags carry business meaning: `PURCHASE`
/// drives the cost engine and `SALE`/`CANCELLATION` tie the ledger to sales.
/// Comparison is always case-insensitive.
pub mod reason {
    /// Stock purchase; the only reason that qualifies for cost derivation.
    pub const PURCHASE: &str = "COMPRA";
    /// Debit posted by the sale transaction.
    pub const SALE: &str = "VENDA";
    /// Compensating entry posted by sale cancellation.
    pub const CANCELLATION: &str = "CANCELAMENTO";
    /// Packaging debit posted alongside a sale (never affects totals).
    pub const PACKAGING: &str = "EMBALAGEM";
    /// Opening balance recorded when a product is created with stock.
    pub const OPENING_STOCK: &str = "ESTOQUE_INICIAL";
    /// Manual correction.
    pub const ADJUSTMENT: &str = "AJUSTE";
    /// Customer return (IN).
    pub const RETURN: &str = "DEVOLUCAO";
    /// Breakage/loss (OUT).
    pub const LOSS: &str = "PERDA";
    /// Internal consumption (OUT).
    pub const CONSUMPTION: &str = "CONSUMO";
}

/// Back-reference tags recorded in `stock_moves.ref_type`.
pub mod ref_type {
    /// Movement created by a sale; `ref_id` is the sale id.
    pub const SALE: &str = "SALE";
    /// Inverse movement created by a cancellation; `ref_id` is the sale id.
    pub const SALE_CANCEL: &str = "SALE_CANCEL";
    /// Hand-entered movement.
    pub const MANUAL: &str = "MANUAL";
}

/// `variant_value` used for the synthetic default variant of a product
/// without real variants.
pub const DEFAULT_VARIANT_VALUE: &str = "Única";

/// Expense category excluded from expense summaries: stock purchases are
/// already captured through the ledger (IN + COMPRA movements).
pub const EXPENSE_CATEGORY_STOCK_PURCHASE: &str = "COMPRA_ESTOQUE";

// =============================================================================
// Movement Type
// =============================================================================

/// The type of a stock movement.
///
/// ## Sign Convention
/// ```text
/// IN   qty > 0, adds to stock
/// OUT  qty > 0, subtracts from stock (sign implied by type, not stored)
/// ADJ  qty is the literal signed delta (can be negative)
/// ```
/// This asymmetry comes from the source data and downstream aggregation
/// depends on it; do not normalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum MoveType {
    In,
    Out,
    Adj,
}

impl MoveType {
    /// Stable text tag, matching the stored column value.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MoveType::In => "IN",
            MoveType::Out => "OUT",
            MoveType::Adj => "ADJ",
        }
    }

    /// Applies the ledger sign convention to a stored quantity.
    ///
    /// `current_stock = Σ signed_qty` over a variant's movements.
    #[inline]
    pub const fn signed_qty(&self, qty: i64) -> i64 {
        match self {
            MoveType::In | MoveType::Adj => qty,
            MoveType::Out => -qty,
        }
    }

    /// Computes the exact inverse of a movement, for cancellation reversals.
    ///
    /// ## Rules
    /// - OUT becomes IN with the same qty
    /// - IN becomes OUT with the same qty
    /// - ADJ stays ADJ with qty negated
    #[inline]
    pub const fn inverted(&self, qty: i64) -> (MoveType, i64) {
        match self {
            MoveType::In => (MoveType::Out, qty),
            MoveType::Out => (MoveType::In, qty),
            MoveType::Adj => (MoveType::Adj, -qty),
        }
    }
}

impl std::fmt::Display for MoveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a sale.
///
/// ## State Machine
/// ```text
/// A_ENVIAR ──┐
/// ENVIADO  ──┼──cancel──► CANCELADO (terminal)
/// CONCLUIDO ─┘
/// ```
/// Forward transitions (A_ENVIAR→ENVIADO→CONCLUIDO) are plain field updates
/// with no side effects and no enforced ordering. Cancellation is the only
/// transition with ledger side effects; cancelling a CANCELADO sale is a
/// successful no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaleStatus {
    /// To ship.
    AEnviar,
    /// Shipped.
    Enviado,
    /// Done.
    Concluido,
    /// Cancelled (terminal).
    Cancelado,
}

impl SaleStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::AEnviar => "A_ENVIAR",
            SaleStatus::Enviado => "ENVIADO",
            SaleStatus::Concluido => "CONCLUIDO",
            SaleStatus::Cancelado => "CANCELADO",
        }
    }
}

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::AEnviar
    }
}

impl std::fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Category
// =============================================================================

/// A product category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub is_active: bool,
}

// =============================================================================
// Product
// =============================================================================

/// A product. Stock and sales go through its variants, never the product row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,

    /// Business identifier, globally unique.
    pub sku: String,

    pub name: String,

    pub category_id: i64,

    /// Label for the variant dimension (e.g. "Cor"); None for products that
    /// live behind their synthetic default variant.
    pub variant_attribute_name: Option<String>,

    pub brand: Option<String>,

    /// Cache of the most recent qualifying purchase cost across all the
    /// product's variants, maintained by the cost engine. Zero baseline.
    pub cost_default_cents: i64,

    /// List price in cents.
    pub price_default_cents: i64,

    /// Reorder threshold for the low-stock listing.
    pub stock_min: i64,

    /// Soft-delete flag.
    pub is_active: bool,
}

impl Product {
    #[inline]
    pub fn cost_default(&self) -> Money {
        Money::from_cents(self.cost_default_cents)
    }

    #[inline]
    pub fn price_default(&self) -> Money {
        Money::from_cents(self.price_default_cents)
    }
}

// =============================================================================
// Product Variant
// =============================================================================

/// A sellable variant of a product - the addressable unit for all stock and
/// sale operations.
///
/// ## Lifecycle Invariant
/// A variant is never deleted once it may have ledger history; switching a
/// product between variant modes soft-deactivates instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProductVariant {
    pub id: i64,
    pub product_id: i64,

    /// Globally unique. For the synthetic default variant this equals the
    /// product's SKU.
    pub variant_sku: String,

    /// The value along the product's variant dimension (e.g. "Preto").
    pub variant_value: String,

    /// True only for the synthetic single-variant case.
    pub is_default: bool,

    /// Last known purchase cost; None means "fall back to the product's
    /// cost_default".
    pub cost_override_cents: Option<i64>,

    pub price_override_cents: Option<i64>,

    pub is_active: bool,
}

/// Joined variant + product row returned by SKU lookup.
///
/// This is the primary cross-component read: both the sale transaction and
/// movement entry resolve a human-typed SKU to variant identity, active flag
/// and effective cost fields in one query.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct VariantLookup {
    pub variant_id: i64,
    pub variant_sku: String,
    pub variant_value: String,
    pub is_default: bool,
    pub cost_override_cents: Option<i64>,
    pub price_override_cents: Option<i64>,
    pub is_active: bool,
    pub product_id: i64,
    pub product_sku: String,
    pub product_name: String,
    pub cost_default_cents: i64,
    pub price_default_cents: i64,
    pub stock_min: i64,
    pub variant_attribute_name: Option<String>,
}

impl VariantLookup {
    /// Effective unit cost: variant override if present, else the product
    /// default. Snapshotted into sale items at sale time.
    #[inline]
    pub fn effective_cost(&self) -> Money {
        Money::from_cents(self.cost_override_cents.unwrap_or(self.cost_default_cents))
    }

    /// Effective unit price: variant override if present, else the product
    /// default. Suggestion only; the sale line carries the actual price.
    #[inline]
    pub fn effective_price(&self) -> Money {
        Money::from_cents(self.price_override_cents.unwrap_or(self.price_default_cents))
    }
}

// =============================================================================
// Stock Movement (the ledger)
// =============================================================================

/// One entry in the stock ledger.
///
/// Immutable in normal flow; the maintenance path may edit or delete it and
/// must re-derive cached costs afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockMove {
    pub id: i64,
    pub move_date: NaiveDate,
    pub variant_id: i64,
    pub move_type: MoveType,
    pub reason: String,
    /// Positive for IN/OUT; literal signed delta for ADJ.
    pub qty: i64,
    pub unit_cost_cents: i64,
    /// Loose back-reference to the originating entity (no FK).
    pub ref_type: Option<String>,
    pub ref_id: Option<i64>,
    pub notes: String,
}

impl StockMove {
    #[inline]
    pub fn unit_cost(&self) -> Money {
        Money::from_cents(self.unit_cost_cents)
    }

    /// Whether this movement informs the cost engine.
    pub fn is_qualifying_purchase(&self) -> bool {
        self.move_type == MoveType::In && self.reason.eq_ignore_ascii_case(reason::PURCHASE)
    }
}

/// Input for recording a movement.
#[derive(Debug, Clone)]
pub struct NewStockMove {
    pub move_date: NaiveDate,
    pub variant_id: i64,
    pub move_type: MoveType,
    pub reason: String,
    pub qty: i64,
    pub unit_cost: Money,
    pub ref_type: Option<String>,
    pub ref_id: Option<i64>,
    pub notes: String,
}

impl NewStockMove {
    /// Convenience constructor for hand-entered movements (ref_type MANUAL).
    pub fn manual(
        move_date: NaiveDate,
        variant_id: i64,
        move_type: MoveType,
        reason: impl Into<String>,
        qty: i64,
        unit_cost: Money,
    ) -> Self {
        NewStockMove {
            move_date,
            variant_id,
            move_type,
            reason: reason.into(),
            qty,
            unit_cost,
            ref_type: Some(ref_type::MANUAL.to_string()),
            ref_id: None,
            notes: String::new(),
        }
    }
}

/// Joined movement row for the movements listing (variant SKU attached).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockMoveRow {
    pub id: i64,
    pub move_date: NaiveDate,
    pub move_type: MoveType,
    pub reason: String,
    pub variant_sku: String,
    pub qty: i64,
    pub unit_cost_cents: i64,
}

// =============================================================================
// Stock Read Models
// =============================================================================

/// Per-variant computed stock level.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct VariantStockLevel {
    pub variant_id: i64,
    pub stock: i64,
}

/// Per-product computed stock level (active variants only).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProductStockLevel {
    pub product_id: i64,
    pub stock: i64,
}

/// Full row for the stock screen: one line per variant with its computed
/// stock and the owning product's reorder threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockOverviewRow {
    pub category_name: String,
    pub product_id: i64,
    pub product_sku: String,
    pub product_name: String,
    pub stock_min: i64,
    pub product_active: bool,
    pub variant_attribute_name: Option<String>,
    pub variant_id: i64,
    pub variant_sku: String,
    pub variant_value: String,
    pub is_default: bool,
    pub variant_active: bool,
    pub stock: i64,
}

/// Active product whose total stock fell below its reorder threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct LowStockRow {
    pub product_id: i64,
    pub sku: String,
    pub name: String,
    pub stock_min: i64,
    pub stock: i64,
}

// =============================================================================
// Sale
// =============================================================================

/// A persisted sale. Created atomically with its items and ledger entries;
/// mutated only via status transitions and cancellation; never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: i64,
    pub sale_date: NaiveDate,
    pub channel: String,
    pub status: SaleStatus,
    pub order_ref: String,
    pub customer_name: String,
    pub notes: String,
    pub packaging_enabled: bool,
    pub packaging_volumes: i64,
    pub packaging_box_variant_id: Option<i64>,
    pub packaging_env_variant_id: Option<i64>,
    pub total_gross_cents: i64,
    pub total_fees_cents: i64,
    pub total_discount_cents: i64,
    pub total_net_cents: i64,
    pub total_cost_cents: i64,
    pub total_profit_cents: i64,
}

impl Sale {
    #[inline]
    pub fn total_net(&self) -> Money {
        Money::from_cents(self.total_net_cents)
    }

    #[inline]
    pub fn total_profit(&self) -> Money {
        Money::from_cents(self.total_profit_cents)
    }
}

/// A line item of a sale. Immutable after creation; `unit_cost_cents` is the
/// cost snapshot taken when the sale was created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: i64,
    pub sale_id: i64,
    pub variant_id: i64,
    pub qty: i64,
    pub unit_price_cents: i64,
    pub unit_cost_cents: i64,
    pub fees_cents: i64,
    pub discount_cents: i64,
    pub net_cents: i64,
    pub profit_cents: i64,
}

/// One requested line of a new sale, as collected by the caller.
#[derive(Debug, Clone)]
pub struct SaleLine {
    /// Variant SKU typed by the operator.
    pub sku: String,
    pub qty: i64,
    pub unit_price: Money,
    pub fees: Money,
    pub discount: Money,
}

/// Optional packaging section of a new sale.
///
/// Packaging posts extra OUT movements (qty = `volumes`, unit_cost = 0) for
/// the supplied SKUs; it never affects the sale's financial totals.
#[derive(Debug, Clone)]
pub struct PackagingRequest {
    pub volumes: i64,
    pub box_sku: Option<String>,
    pub envelope_sku: Option<String>,
}

/// Input for the sale transaction.
#[derive(Debug, Clone)]
pub struct NewSale {
    pub sale_date: NaiveDate,
    pub channel: String,
    pub status: SaleStatus,
    pub order_ref: String,
    pub customer_name: String,
    pub notes: String,
    pub lines: Vec<SaleLine>,
    pub packaging: Option<PackagingRequest>,
}

// =============================================================================
// Product / Variant Inputs
// =============================================================================

/// One requested variant of a new product.
#[derive(Debug, Clone)]
pub struct NewVariantSpec {
    pub value: String,
    /// Explicit variant SKU; generated from the product SKU + value when None.
    pub sku: Option<String>,
    /// Opening balance, posted as an IN / ESTOQUE_INICIAL movement when > 0.
    pub initial_qty: i64,
}

/// Input for product creation.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    pub category_id: i64,
    pub variant_attribute_name: Option<String>,
    pub brand: Option<String>,
    pub cost_default: Money,
    pub price_default: Money,
    pub stock_min: i64,
    pub is_active: bool,
    /// Empty means "no real variants": a synthetic default variant is
    /// materialized with the product's own SKU.
    pub variants: Vec<NewVariantSpec>,
}

// =============================================================================
// Expense
// =============================================================================

/// A free-form expense entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Expense {
    pub id: i64,
    pub exp_date: NaiveDate,
    pub category: String,
    pub description: String,
    pub amount_cents: i64,
    pub payment_method: String,
    pub notes: String,
}

/// Input for recording an expense.
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub exp_date: NaiveDate,
    pub category: String,
    pub description: String,
    pub amount: Money,
    pub payment_method: String,
    pub notes: String,
}

/// Period financial summary.
///
/// `expenses` already folds in ledger purchases (IN + COMPRA movements) and
/// excludes COMPRA_ESTOQUE expense rows to avoid double counting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialSummary {
    pub revenue: Money,
    pub cost: Money,
    pub profit: Money,
    pub expenses: Money,
    /// profit − expenses.
    pub result: Money,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_type_signed_qty() {
        assert_eq!(MoveType::In.signed_qty(5), 5);
        assert_eq!(MoveType::Out.signed_qty(5), -5);
        assert_eq!(MoveType::Adj.signed_qty(5), 5);
        // ADJ keeps its literal sign
        assert_eq!(MoveType::Adj.signed_qty(-3), -3);
    }

    #[test]
    fn test_move_type_inverted() {
        assert_eq!(MoveType::Out.inverted(3), (MoveType::In, 3));
        assert_eq!(MoveType::In.inverted(3), (MoveType::Out, 3));
        assert_eq!(MoveType::Adj.inverted(3), (MoveType::Adj, -3));
        assert_eq!(MoveType::Adj.inverted(-3), (MoveType::Adj, 3));
    }

    #[test]
    fn test_sale_status_strings() {
        assert_eq!(SaleStatus::AEnviar.as_str(), "A_ENVIAR");
        assert_eq!(SaleStatus::Cancelado.as_str(), "CANCELADO");
        assert_eq!(SaleStatus::default(), SaleStatus::AEnviar);
    }

    #[test]
    fn test_effective_cost_fallback() {
        let mut lookup = VariantLookup {
            variant_id: 1,
            variant_sku: "CAM-PRETO".into(),
            variant_value: "Preto".into(),
            is_default: false,
            cost_override_cents: None,
            price_override_cents: None,
            is_active: true,
            product_id: 1,
            product_sku: "CAM".into(),
            product_name: "Camiseta".into(),
            cost_default_cents: 400,
            price_default_cents: 1000,
            stock_min: 0,
            variant_attribute_name: Some("Cor".into()),
        };

        // No override: falls back to the product default
        assert_eq!(lookup.effective_cost().cents(), 400);

        // Override supersedes the default
        lookup.cost_override_cents = Some(550);
        assert_eq!(lookup.effective_cost().cents(), 550);
    }

    #[test]
    fn test_qualifying_purchase_is_case_insensitive() {
        let mv = StockMove {
            id: 1,
            move_date: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
            variant_id: 1,
            move_type: MoveType::In,
            reason: "compra".into(),
            qty: 5,
            unit_cost_cents: 200,
            ref_type: None,
            ref_id: None,
            notes: String::new(),
        };
        assert!(mv.is_qualifying_purchase());

        let adj = StockMove {
            move_type: MoveType::Adj,
            ..mv.clone()
        };
        assert!(!adj.is_qualifying_purchase());

        let sale = StockMove {
            reason: reason::SALE.into(),
            ..mv
        };
        assert!(!sale.is_qualifying_purchase());
    }
}
