//! # Cost Engine
//!
//! Purchase-derived cost propagation.
//!
//! ## Two Paths
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cost Derivation                                  │
//! │                                                                         │
//! │  FAST PATH: apply_purchase(variant, cost)                              │
//! │    Called right after an IN + COMPRA movement is recorded.             │
//! │    The new purchase is by definition the latest one, so its cost       │
//! │    is written straight to:                                             │
//! │      product_variants.cost_override_cents  = cost                      │
//! │      products.cost_default_cents           = cost                      │
//! │                                                                         │
//! │  FULL RECOMPUTE: recompute(variant)                                    │
//! │    Called after a movement is edited or deleted. Re-derives from       │
//! │    the ledger ("latest" = move_date DESC, id DESC):                    │
//! │      variant override ← latest qualifying purchase of THE variant,     │
//! │                         or NULL when none remains                      │
//! │      product default  ← latest qualifying purchase across ALL the      │
//! │                         product's variants, or 0 when none remains     │
//! │                                                                         │
//! │  The asymmetry (NULL vs 0) is deliberate: NULL override falls back     │
//! │  to the product default; the default itself has a zero baseline.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Qualifying purchase: move_type = 'IN' AND UPPER(reason) = 'COMPRA'.
//! Sales and cancellations never qualify, so cancelling a sale never
//! disturbs costs.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use balcao_core::Money;

/// Derives and caches purchase costs on variants and products.
#[derive(Debug, Clone)]
pub struct CostEngine {
    pool: SqlitePool,
}

impl CostEngine {
    /// Creates a new CostEngine.
    pub fn new(pool: SqlitePool) -> Self {
        CostEngine { pool }
    }

    /// Propagates a just-recorded purchase cost to the variant override and
    /// the product default.
    ///
    /// A missing variant is a silent no-op: the ledger write already
    /// succeeded and must stand.
    pub async fn apply_purchase(&self, variant_id: i64, unit_cost: Money) -> DbResult<()> {
        let product_id: Option<i64> =
            sqlx::query_scalar("SELECT product_id FROM product_variants WHERE id = ?1")
                .bind(variant_id)
                .fetch_optional(&self.pool)
                .await?;

        let Some(product_id) = product_id else {
            return Ok(());
        };

        debug!(
            variant_id,
            product_id,
            cost = %unit_cost,
            "Applying purchase cost"
        );

        sqlx::query(
            r#"
            UPDATE products
               SET cost_default_cents = ?2,
                   updated_at = datetime('now')
             WHERE id = ?1
            "#,
        )
        .bind(product_id)
        .bind(unit_cost.cents())
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            UPDATE product_variants
               SET cost_override_cents = ?2,
                   updated_at = datetime('now')
             WHERE id = ?1
            "#,
        )
        .bind(variant_id)
        .bind(unit_cost.cents())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Re-derives costs for a variant and its product from the ledger.
    ///
    /// ## When To Call
    /// After any movement edit or deletion that may have removed or changed
    /// the latest qualifying purchase.
    pub async fn recompute(&self, variant_id: i64) -> DbResult<()> {
        let product_id: Option<i64> =
            sqlx::query_scalar("SELECT product_id FROM product_variants WHERE id = ?1")
                .bind(variant_id)
                .fetch_optional(&self.pool)
                .await?;

        let Some(product_id) = product_id else {
            return Ok(());
        };

        // Latest qualifying purchase of this variant
        let variant_cost: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT unit_cost_cents
              FROM stock_moves
             WHERE variant_id = ?1
               AND move_type = 'IN'
               AND UPPER(reason) = 'COMPRA'
             ORDER BY move_date DESC, id DESC
             LIMIT 1
            "#,
        )
        .bind(variant_id)
        .fetch_optional(&self.pool)
        .await?;

        // NULL override when no purchase remains
        sqlx::query(
            r#"
            UPDATE product_variants
               SET cost_override_cents = ?2,
                   updated_at = datetime('now')
             WHERE id = ?1
            "#,
        )
        .bind(variant_id)
        .bind(variant_cost)
        .execute(&self.pool)
        .await?;

        // Latest qualifying purchase across all the product's variants
        let product_cost: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT sm.unit_cost_cents
              FROM stock_moves sm
              JOIN product_variants v ON v.id = sm.variant_id
             WHERE v.product_id = ?1
               AND sm.move_type = 'IN'
               AND UPPER(sm.reason) = 'COMPRA'
             ORDER BY sm.move_date DESC, sm.id DESC
             LIMIT 1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        // Zero baseline when no purchase remains
        sqlx::query(
            r#"
            UPDATE products
               SET cost_default_cents = ?2,
                   updated_at = datetime('now')
             WHERE id = ?1
            "#,
        )
        .bind(product_id)
        .bind(product_cost.unwrap_or(0))
        .execute(&self.pool)
        .await?;

        debug!(
            variant_id,
            product_id,
            variant_cost = ?variant_cost,
            product_cost = product_cost.unwrap_or(0),
            "Costs recomputed"
        );

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use balcao_core::{Money, MoveType, NewProduct, NewStockMove, NewVariantSpec};
    use chrono::NaiveDate;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
    }

    async fn db_with_two_variants() -> (Database, i64, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cat = db.categories().create("Roupas", true).await.unwrap();
        db.products()
            .create(NewProduct {
                sku: "CAM".into(),
                name: "Camiseta".into(),
                category_id: cat,
                variant_attribute_name: Some("Cor".into()),
                brand: None,
                cost_default: Money::zero(),
                price_default: Money::from_cents(1000),
                stock_min: 0,
                is_active: true,
                variants: vec![
                    NewVariantSpec {
                        value: "Preto".into(),
                        sku: None,
                        initial_qty: 0,
                    },
                    NewVariantSpec {
                        value: "Azul".into(),
                        sku: None,
                        initial_qty: 0,
                    },
                ],
            })
            .await
            .unwrap();

        let preto = db.variants().get_by_sku("CAM-PRETO").await.unwrap().unwrap();
        let azul = db.variants().get_by_sku("CAM-AZUL").await.unwrap().unwrap();
        (db, preto.variant_id, azul.variant_id)
    }

    #[tokio::test]
    async fn test_latest_purchase_wins_by_date_then_id() {
        let (db, preto, _) = db_with_two_variants().await;

        // Later date wins regardless of insertion order
        db.stock()
            .record_movement(NewStockMove::manual(
                date(20),
                preto,
                MoveType::In,
                "COMPRA",
                5,
                Money::from_cents(1200),
            ))
            .await
            .unwrap();
        db.stock()
            .record_movement(NewStockMove::manual(
                date(10),
                preto,
                MoveType::In,
                "COMPRA",
                5,
                Money::from_cents(1000),
            ))
            .await
            .unwrap();

        // apply_purchase blindly took the last insert; recompute fixes it
        db.cost().recompute(preto).await.unwrap();

        let lookup = db.variants().get_by_sku("CAM-PRETO").await.unwrap().unwrap();
        assert_eq!(lookup.cost_override_cents, Some(1200));
        assert_eq!(lookup.cost_default_cents, 1200);
    }

    #[tokio::test]
    async fn test_product_default_spans_variants() {
        let (db, preto, azul) = db_with_two_variants().await;

        db.stock()
            .record_movement(NewStockMove::manual(
                date(10),
                preto,
                MoveType::In,
                "COMPRA",
                5,
                Money::from_cents(1000),
            ))
            .await
            .unwrap();
        db.stock()
            .record_movement(NewStockMove::manual(
                date(12),
                azul,
                MoveType::In,
                "COMPRA",
                5,
                Money::from_cents(1500),
            ))
            .await
            .unwrap();

        // Each variant keeps its own override
        let p = db.variants().get_by_sku("CAM-PRETO").await.unwrap().unwrap();
        let a = db.variants().get_by_sku("CAM-AZUL").await.unwrap().unwrap();
        assert_eq!(p.cost_override_cents, Some(1000));
        assert_eq!(a.cost_override_cents, Some(1500));

        // Product default follows the product-wide latest purchase
        assert_eq!(p.cost_default_cents, 1500);

        // Preto's effective cost stays its own override
        assert_eq!(p.effective_cost().cents(), 1000);
    }

    #[tokio::test]
    async fn test_recompute_on_unknown_variant_is_noop() {
        let (db, _, _) = db_with_two_variants().await;
        db.cost().recompute(9999).await.unwrap();
        db.cost()
            .apply_purchase(9999, Money::from_cents(100))
            .await
            .unwrap();
    }
}
