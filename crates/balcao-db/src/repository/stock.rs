//! # Stock Movement Repository
//!
//! The append-mostly movement ledger and every stock read derived from it.
//!
//! ## The Ledger Is the Truth
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Stock Is Always Computed                           │
//! │                                                                         │
//! │  stock_moves                                                           │
//! │  ┌──────┬─────────┬──────┬────────────────┬─────┐                      │
//! │  │ date │ variant │ type │ reason         │ qty │                      │
//! │  ├──────┼─────────┼──────┼────────────────┼─────┤                      │
//! │  │ 1/10 │ CAM     │ IN   │ COMPRA         │  50 │  +50                 │
//! │  │ 1/12 │ CAM     │ OUT  │ VENDA          │   5 │   -5                 │
//! │  │ 1/15 │ CAM     │ ADJ  │ AJUSTE         │  -2 │   -2                 │
//! │  └──────┴─────────┴──────┴────────────────┴─────┘                      │
//! │                                              Σ  =  43 = current stock  │
//! │                                                                         │
//! │  IN  → +qty      OUT → -qty      ADJ → qty (literal signed delta)      │
//! │                                                                         │
//! │  No stock column exists anywhere. Deleting or editing a movement       │
//! │  retroactively changes stock; that is the intended maintenance path.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Cost Engine Hook
//! Recording an IN + COMPRA movement triggers cost propagation; editing or
//! deleting any movement triggers a full recompute for the touched variants.
//! Both are best-effort: a cost failure is logged and never rolls back the
//! ledger write.

use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use crate::repository::cost::CostEngine;
use balcao_core::types::reason as reasons;
use balcao_core::{
    validation, CoreError, LowStockRow, MoveType, NewStockMove, ProductStockLevel, StockMove,
    StockMoveRow, VariantStockLevel,
};

/// The signed-sum expression shared by every stock aggregation.
const SIGNED_QTY_SUM: &str = r#"
    COALESCE(SUM(
        CASE
            WHEN sm.move_type = 'IN'  THEN sm.qty
            WHEN sm.move_type = 'OUT' THEN -sm.qty
            WHEN sm.move_type = 'ADJ' THEN sm.qty
            ELSE 0
        END
    ), 0)
"#;

/// Repository for the stock movement ledger.
#[derive(Debug, Clone)]
pub struct StockMoveRepository {
    pool: SqlitePool,
}

impl StockMoveRepository {
    /// Creates a new StockMoveRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockMoveRepository { pool }
    }

    /// Records a movement and returns its id.
    ///
    /// ## Validation
    /// - IN/OUT quantities must be strictly positive (the sign is implied by
    ///   the type and never stored)
    /// - ADJ quantity is a literal signed delta and may be negative
    /// - unit_cost must be non-negative
    /// - reason must be non-blank
    ///
    /// ## Cost Hook
    /// An IN + COMPRA movement propagates its unit cost to the variant
    /// override and the product default. Propagation failure is logged and
    /// does not undo the ledger write.
    pub async fn record_movement(&self, mv: NewStockMove) -> DbResult<i64> {
        let reason = validation::require_non_empty("reason", &mv.reason)?;
        validation::require_non_negative_money("unit_cost", mv.unit_cost)?;
        if matches!(mv.move_type, MoveType::In | MoveType::Out) && mv.qty <= 0 {
            return Err(DbError::Core(CoreError::InvalidQuantity { qty: mv.qty }));
        }

        debug!(
            variant_id = mv.variant_id,
            move_type = %mv.move_type,
            reason = %reason,
            qty = mv.qty,
            "Recording stock movement"
        );

        let result = sqlx::query(
            r#"
            INSERT INTO stock_moves (
                move_date, variant_id, move_type, reason,
                qty, unit_cost_cents, ref_type, ref_id, notes
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(mv.move_date)
        .bind(mv.variant_id)
        .bind(mv.move_type)
        .bind(&reason)
        .bind(mv.qty)
        .bind(mv.unit_cost.cents())
        .bind(mv.ref_type.as_deref())
        .bind(mv.ref_id)
        .bind(&mv.notes)
        .execute(&self.pool)
        .await?;

        let move_id = result.last_insert_rowid();

        if mv.move_type == MoveType::In && reason.eq_ignore_ascii_case(reasons::PURCHASE) {
            let engine = CostEngine::new(self.pool.clone());
            if let Err(e) = engine.apply_purchase(mv.variant_id, mv.unit_cost).await {
                warn!(
                    variant_id = mv.variant_id,
                    error = %e,
                    "Cost propagation failed after purchase; ledger entry kept"
                );
            }
        }

        Ok(move_id)
    }

    /// Updates an existing movement (the maintenance path).
    ///
    /// Costs are re-derived for the movement's old variant and, when the
    /// movement was re-pointed, for the new one as well. Recompute failures
    /// are logged without undoing the edit.
    pub async fn update_movement(&self, move_id: i64, mv: NewStockMove) -> DbResult<()> {
        let reason = validation::require_non_empty("reason", &mv.reason)?;
        validation::require_non_negative_money("unit_cost", mv.unit_cost)?;
        if matches!(mv.move_type, MoveType::In | MoveType::Out) && mv.qty <= 0 {
            return Err(DbError::Core(CoreError::InvalidQuantity { qty: mv.qty }));
        }

        let old_variant_id: Option<i64> =
            sqlx::query_scalar("SELECT variant_id FROM stock_moves WHERE id = ?1")
                .bind(move_id)
                .fetch_optional(&self.pool)
                .await?;

        let old_variant_id = old_variant_id.ok_or_else(|| DbError::not_found("StockMove", move_id))?;

        sqlx::query(
            r#"
            UPDATE stock_moves
               SET move_date = ?2,
                   variant_id = ?3,
                   move_type = ?4,
                   reason = ?5,
                   qty = ?6,
                   unit_cost_cents = ?7,
                   notes = ?8
             WHERE id = ?1
            "#,
        )
        .bind(move_id)
        .bind(mv.move_date)
        .bind(mv.variant_id)
        .bind(mv.move_type)
        .bind(&reason)
        .bind(mv.qty)
        .bind(mv.unit_cost.cents())
        .bind(&mv.notes)
        .execute(&self.pool)
        .await?;

        let engine = CostEngine::new(self.pool.clone());
        if let Err(e) = engine.recompute(old_variant_id).await {
            warn!(variant_id = old_variant_id, error = %e, "Cost recompute failed after edit");
        }
        if mv.variant_id != old_variant_id {
            if let Err(e) = engine.recompute(mv.variant_id).await {
                warn!(variant_id = mv.variant_id, error = %e, "Cost recompute failed after edit");
            }
        }

        Ok(())
    }

    /// Deletes a movement, retroactively changing stock, then re-derives the
    /// affected variant's costs.
    pub async fn delete_movement(&self, move_id: i64) -> DbResult<()> {
        let variant_id: Option<i64> =
            sqlx::query_scalar("SELECT variant_id FROM stock_moves WHERE id = ?1")
                .bind(move_id)
                .fetch_optional(&self.pool)
                .await?;

        let variant_id = variant_id.ok_or_else(|| DbError::not_found("StockMove", move_id))?;

        sqlx::query("DELETE FROM stock_moves WHERE id = ?1")
            .bind(move_id)
            .execute(&self.pool)
            .await?;

        debug!(move_id, variant_id, "Stock movement deleted");

        let engine = CostEngine::new(self.pool.clone());
        if let Err(e) = engine.recompute(variant_id).await {
            warn!(variant_id, error = %e, "Cost recompute failed after delete");
        }

        Ok(())
    }

    /// Gets a movement by id.
    pub async fn get_by_id(&self, move_id: i64) -> DbResult<Option<StockMove>> {
        let mv = sqlx::query_as::<_, StockMove>(
            r#"
            SELECT id, move_date, variant_id, move_type, reason,
                   qty, unit_cost_cents, ref_type, ref_id, notes
              FROM stock_moves
             WHERE id = ?1
            "#,
        )
        .bind(move_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(mv)
    }

    /// Current stock of one variant: the signed sum of its movements.
    /// A variant with no movements has stock 0.
    pub async fn current_stock(&self, variant_id: i64) -> DbResult<i64> {
        let sql = format!(
            "SELECT {SIGNED_QTY_SUM} AS stock FROM stock_moves sm WHERE sm.variant_id = ?1"
        );

        let stock: i64 = sqlx::query_scalar(&sql)
            .bind(variant_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(stock)
    }

    /// Current stock of a product: the signed sum over its ACTIVE variants.
    /// Deactivated variants keep their history but stop counting here.
    pub async fn current_stock_by_product(&self, product_id: i64) -> DbResult<i64> {
        let sql = format!(
            r#"
            SELECT {SIGNED_QTY_SUM} AS stock
              FROM product_variants v
         LEFT JOIN stock_moves sm ON sm.variant_id = v.id
             WHERE v.product_id = ?1 AND v.is_active = 1
            "#
        );

        let stock: i64 = sqlx::query_scalar(&sql)
            .bind(product_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(stock)
    }

    /// Stock level of every variant (active or not).
    pub async fn variant_stock_levels(&self) -> DbResult<Vec<VariantStockLevel>> {
        let sql = format!(
            r#"
            SELECT v.id AS variant_id,
                   {SIGNED_QTY_SUM} AS stock
              FROM product_variants v
         LEFT JOIN stock_moves sm ON sm.variant_id = v.id
          GROUP BY v.id
            "#
        );

        let levels = sqlx::query_as::<_, VariantStockLevel>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(levels)
    }

    /// Stock level of every product, summing active variants only.
    pub async fn product_stock_levels(&self) -> DbResult<Vec<ProductStockLevel>> {
        let sql = format!(
            r#"
            SELECT p.id AS product_id,
                   {SIGNED_QTY_SUM} AS stock
              FROM products p
              JOIN product_variants v ON v.product_id = p.id AND v.is_active = 1
         LEFT JOIN stock_moves sm ON sm.variant_id = v.id
          GROUP BY p.id
            "#
        );

        let levels = sqlx::query_as::<_, ProductStockLevel>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(levels)
    }

    /// Full rows for the stock screen: one line per variant with computed
    /// stock, ordered by product then default-first.
    pub async fn stock_overview(&self) -> DbResult<Vec<balcao_core::StockOverviewRow>> {
        let sql = format!(
            r#"
            SELECT
                c.name AS category_name,
                p.id AS product_id,
                p.sku AS product_sku,
                p.name AS product_name,
                p.stock_min,
                p.is_active AS product_active,
                p.variant_attribute_name,

                v.id AS variant_id,
                v.variant_sku,
                v.variant_value,
                v.is_default,
                v.is_active AS variant_active,

                {SIGNED_QTY_SUM} AS stock

            FROM products p
            JOIN categories c ON c.id = p.category_id
            JOIN product_variants v ON v.product_id = p.id
       LEFT JOIN stock_moves sm ON sm.variant_id = v.id
        GROUP BY v.id
        ORDER BY p.name, v.is_default DESC, v.variant_value
            "#
        );

        let rows = sqlx::query_as::<_, balcao_core::StockOverviewRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    /// Active products whose total stock (active variants) fell below their
    /// reorder threshold.
    pub async fn low_stock(&self) -> DbResult<Vec<LowStockRow>> {
        let sql = format!(
            r#"
            SELECT p.id AS product_id,
                   p.sku,
                   p.name,
                   p.stock_min,
                   {SIGNED_QTY_SUM} AS stock
              FROM products p
              JOIN product_variants v ON v.product_id = p.id AND v.is_active = 1
         LEFT JOIN stock_moves sm ON sm.variant_id = v.id
             WHERE p.is_active = 1
          GROUP BY p.id
            HAVING stock < p.stock_min
          ORDER BY p.name
            "#
        );

        let rows = sqlx::query_as::<_, LowStockRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    /// Most recent movements with their variant SKU, newest first.
    pub async fn list_recent(&self, limit: i64) -> DbResult<Vec<StockMoveRow>> {
        let rows = sqlx::query_as::<_, StockMoveRow>(
            r#"
            SELECT sm.id, sm.move_date, sm.move_type, sm.reason,
                   v.variant_sku, sm.qty, sm.unit_cost_cents
              FROM stock_moves sm
              JOIN product_variants v ON v.id = sm.variant_id
             ORDER BY sm.move_date DESC, sm.id DESC
             LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
