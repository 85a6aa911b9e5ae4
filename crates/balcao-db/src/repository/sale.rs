//! # Sale Repository
//!
//! The sale transaction, status transitions and cancellation.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. CREATE (atomic)                                                    │
//! │     └── create_sale() validates every line, snapshots costs,           │
//! │         writes header + items + OUT/VENDA moves + packaging moves      │
//! │         in one transaction — first bad line aborts everything          │
//! │                                                                         │
//! │  2. STATUS                                                             │
//! │     └── update_status() → A_ENVIAR / ENVIADO / CONCLUIDO               │
//! │         (plain field update, any order, no side effects)               │
//! │                                                                         │
//! │  3. CANCEL (atomic, idempotent)                                        │
//! │     └── cancel_sale() posts an exact inverse for every move tied to    │
//! │         the sale and flips status to CANCELADO; a second call is a     │
//! │         successful no-op                                               │
//! │                                                                         │
//! │  Sales are never deleted.                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::variant::lookup_by_sku;
use balcao_core::types::{reason, ref_type};
use balcao_core::{
    validation, CoreError, LineFigures, Money, NewSale, Sale, SaleItem, SaleStatus, SaleTotals,
    StockMove,
};

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Creates a sale atomically: header, items, stock debits and packaging
    /// debits all commit together or not at all.
    ///
    /// ## Per Line
    /// 1. Blank SKU → `MissingSku`; qty ≤ 0 → `InvalidQuantity`;
    ///    negative price/fees/discount → validation error
    /// 2. SKU resolves to a variant → `VariantNotFound` / `InactiveVariant`
    /// 3. unit_cost snapshot = variant override else product default,
    ///    evaluated now and never revisited
    /// 4. gross/net/cost/profit per line; six totals accumulate on the header
    ///
    /// Each line posts one OUT / VENDA movement (notes = order_ref,
    /// ref SALE/sale_id). Packaging posts one extra OUT / EMBALAGEM movement
    /// per supplied SKU with qty = volumes and unit_cost = 0 — stock only,
    /// never totals.
    ///
    /// ## Returns
    /// The new sale id.
    pub async fn create_sale(&self, input: NewSale) -> DbResult<i64> {
        if input.lines.is_empty() {
            return Err(DbError::Core(CoreError::EmptySale));
        }
        if let Some(pack) = &input.packaging {
            validation::require_positive("packaging_volumes", pack.volumes)?;
        }

        let mut tx = self.pool.begin().await?;

        // Resolve and price every line before writing anything
        struct ResolvedLine {
            variant_id: i64,
            qty: i64,
            unit_price: Money,
            unit_cost: Money,
            figures: LineFigures,
        }

        let mut totals = SaleTotals::new();
        let mut resolved: Vec<ResolvedLine> = Vec::with_capacity(input.lines.len());

        for line in &input.lines {
            let sku = line.sku.trim();
            if sku.is_empty() {
                return Err(DbError::Core(CoreError::MissingSku));
            }
            if line.qty <= 0 {
                return Err(DbError::Core(CoreError::InvalidQuantity { qty: line.qty }));
            }
            validation::require_non_negative_money("unit_price", line.unit_price)?;
            validation::require_non_negative_money("fees", line.fees)?;
            validation::require_non_negative_money("discount", line.discount)?;

            let lookup = lookup_by_sku(&mut *tx, sku)
                .await?
                .ok_or_else(|| CoreError::VariantNotFound { sku: sku.to_string() })?;
            if !lookup.is_active {
                return Err(DbError::Core(CoreError::InactiveVariant {
                    sku: sku.to_string(),
                }));
            }

            let unit_cost = lookup.effective_cost();
            let figures =
                LineFigures::compute(line.qty, line.unit_price, line.fees, line.discount, unit_cost);
            totals.add_line(&figures);

            resolved.push(ResolvedLine {
                variant_id: lookup.variant_id,
                qty: line.qty,
                unit_price: line.unit_price,
                unit_cost,
                figures,
            });
        }

        // Packaging SKUs must resolve too; a missing one aborts the sale
        let mut packaging_variants: Vec<i64> = Vec::new();
        let mut packaging_volumes = 0i64;
        let mut box_variant_id: Option<i64> = None;
        let mut env_variant_id: Option<i64> = None;

        if let Some(pack) = &input.packaging {
            packaging_volumes = pack.volumes;
            for (slot, sku) in [
                (&mut box_variant_id, pack.box_sku.as_deref()),
                (&mut env_variant_id, pack.envelope_sku.as_deref()),
            ] {
                if let Some(sku) = sku.map(str::trim).filter(|s| !s.is_empty()) {
                    let lookup = lookup_by_sku(&mut *tx, sku)
                        .await?
                        .ok_or_else(|| CoreError::VariantNotFound { sku: sku.to_string() })?;
                    *slot = Some(lookup.variant_id);
                    packaging_variants.push(lookup.variant_id);
                }
            }
        }

        let result = sqlx::query(
            r#"
            INSERT INTO sales (
                sale_date, channel, status, order_ref, customer_name, notes,
                packaging_enabled, packaging_volumes,
                packaging_box_variant_id, packaging_env_variant_id,
                total_gross_cents, total_fees_cents, total_discount_cents,
                total_net_cents, total_cost_cents, total_profit_cents
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
            "#,
        )
        .bind(input.sale_date)
        .bind(input.channel.trim())
        .bind(input.status)
        .bind(input.order_ref.trim())
        .bind(input.customer_name.trim())
        .bind(input.notes.trim())
        .bind(input.packaging.is_some())
        .bind(packaging_volumes)
        .bind(box_variant_id)
        .bind(env_variant_id)
        .bind(totals.gross.cents())
        .bind(totals.fees.cents())
        .bind(totals.discount.cents())
        .bind(totals.net.cents())
        .bind(totals.cost.cents())
        .bind(totals.profit.cents())
        .execute(&mut *tx)
        .await?;

        let sale_id = result.last_insert_rowid();
        let order_ref = input.order_ref.trim();

        for line in &resolved {
            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    sale_id, variant_id, qty, unit_price_cents, unit_cost_cents,
                    fees_cents, discount_cents, net_cents, profit_cents
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(sale_id)
            .bind(line.variant_id)
            .bind(line.qty)
            .bind(line.unit_price.cents())
            .bind(line.unit_cost.cents())
            .bind(line.figures.fees.cents())
            .bind(line.figures.discount.cents())
            .bind(line.figures.net.cents())
            .bind(line.figures.profit.cents())
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO stock_moves (
                    move_date, variant_id, move_type, reason,
                    qty, unit_cost_cents, ref_type, ref_id, notes
                )
                VALUES (?1, ?2, 'OUT', ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(input.sale_date)
            .bind(line.variant_id)
            .bind(reason::SALE)
            .bind(line.qty)
            .bind(line.unit_cost.cents())
            .bind(ref_type::SALE)
            .bind(sale_id)
            .bind(order_ref)
            .execute(&mut *tx)
            .await?;
        }

        // Packaging debits: stock only, zero cost
        for variant_id in &packaging_variants {
            sqlx::query(
                r#"
                INSERT INTO stock_moves (
                    move_date, variant_id, move_type, reason,
                    qty, unit_cost_cents, ref_type, ref_id, notes
                )
                VALUES (?1, ?2, 'OUT', ?3, ?4, 0, ?5, ?6, ?7)
                "#,
            )
            .bind(input.sale_date)
            .bind(variant_id)
            .bind(reason::PACKAGING)
            .bind(packaging_volumes)
            .bind(ref_type::SALE)
            .bind(sale_id)
            .bind(order_ref)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            sale_id,
            lines = resolved.len(),
            net = %totals.net,
            "Sale created"
        );
        Ok(sale_id)
    }

    /// Cancels a sale: posts an exact inverse for every ledger movement tied
    /// to it and flips the status to CANCELADO, atomically.
    ///
    /// ## Reversal Rules
    /// - OUT becomes IN (same qty), IN becomes OUT (same qty), ADJ negates qty
    /// - Inverses carry reason CANCELAMENTO, ref SALE_CANCEL/sale_id and a
    ///   note naming the original sale; originals are never touched
    /// - Costs are not recomputed: sale movements never qualify for the
    ///   cost engine
    ///
    /// Cancelling an already-cancelled sale is a successful no-op.
    pub async fn cancel_sale(&self, sale_id: i64) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let status: Option<SaleStatus> =
            sqlx::query_scalar("SELECT status FROM sales WHERE id = ?1")
                .bind(sale_id)
                .fetch_optional(&mut *tx)
                .await?;

        let status = status.ok_or_else(|| DbError::not_found("Sale", sale_id))?;
        if status == SaleStatus::Cancelado {
            debug!(sale_id, "Sale already cancelled; nothing to do");
            return Ok(());
        }

        let moves = sqlx::query_as::<_, StockMove>(
            r#"
            SELECT id, move_date, variant_id, move_type, reason,
                   qty, unit_cost_cents, ref_type, ref_id, notes
              FROM stock_moves
             WHERE ref_type = ?1 AND ref_id = ?2
             ORDER BY id
            "#,
        )
        .bind(ref_type::SALE)
        .bind(sale_id)
        .fetch_all(&mut *tx)
        .await?;

        let today = Utc::now().date_naive();
        let note = format!("Cancelamento da venda #{}", sale_id);

        for original in &moves {
            let (inverse_type, inverse_qty) = original.move_type.inverted(original.qty);

            sqlx::query(
                r#"
                INSERT INTO stock_moves (
                    move_date, variant_id, move_type, reason,
                    qty, unit_cost_cents, ref_type, ref_id, notes
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(today)
            .bind(original.variant_id)
            .bind(inverse_type)
            .bind(reason::CANCELLATION)
            .bind(inverse_qty)
            .bind(original.unit_cost_cents)
            .bind(ref_type::SALE_CANCEL)
            .bind(sale_id)
            .bind(&note)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            "UPDATE sales SET status = ?2, updated_at = datetime('now') WHERE id = ?1",
        )
        .bind(sale_id)
        .bind(SaleStatus::Cancelado)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(sale_id, reversals = moves.len(), "Sale cancelled");
        Ok(())
    }

    /// Sets a sale's status (forward transitions; no side effects, no
    /// enforced ordering). Use [`Self::cancel_sale`] for cancellation.
    pub async fn update_status(&self, sale_id: i64, status: SaleStatus) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE sales SET status = ?2, updated_at = datetime('now') WHERE id = ?1",
        )
        .bind(sale_id)
        .bind(status)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", sale_id));
        }

        Ok(())
    }

    /// Gets a sale by id.
    pub async fn get_by_id(&self, sale_id: i64) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, sale_date, channel, status, order_ref, customer_name, notes,
                   packaging_enabled, packaging_volumes,
                   packaging_box_variant_id, packaging_env_variant_id,
                   total_gross_cents, total_fees_cents, total_discount_cents,
                   total_net_cents, total_cost_cents, total_profit_cents
              FROM sales
             WHERE id = ?1
            "#,
        )
        .bind(sale_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets all items of a sale in insertion order.
    pub async fn get_items(&self, sale_id: i64) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT id, sale_id, variant_id, qty, unit_price_cents, unit_cost_cents,
                   fees_cents, discount_cents, net_cents, profit_cents
              FROM sale_items
             WHERE sale_id = ?1
             ORDER BY id
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Most recent sales, newest first.
    pub async fn list_recent(&self, limit: i64) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, sale_date, channel, status, order_ref, customer_name, notes,
                   packaging_enabled, packaging_volumes,
                   packaging_box_variant_id, packaging_env_variant_id,
                   total_gross_cents, total_fees_cents, total_discount_cents,
                   total_net_cents, total_cost_cents, total_profit_cents
              FROM sales
             ORDER BY sale_date DESC, id DESC
             LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use crate::DbError;
    use balcao_core::{
        CoreError, Money, MoveType, NewProduct, NewSale, NewStockMove, PackagingRequest, SaleLine,
        SaleStatus,
    };
    use chrono::NaiveDate;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, day).unwrap()
    }

    /// Seeds a product "CAM" (effective cost 4.00) with stock 50 and a box
    /// packaging product "CAIXA" with stock 30.
    async fn seeded_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cat = db.categories().create("Roupas", true).await.unwrap();

        for (sku, name) in [("CAM", "Camiseta"), ("CAIXA", "Caixa de envio")] {
            db.products()
                .create(NewProduct {
                    sku: sku.into(),
                    name: name.into(),
                    category_id: cat,
                    variant_attribute_name: None,
                    brand: None,
                    cost_default: Money::zero(),
                    price_default: Money::from_cents(1000),
                    stock_min: 0,
                    is_active: true,
                    variants: vec![],
                })
                .await
                .unwrap();
        }

        let cam = db.variants().get_by_sku("CAM").await.unwrap().unwrap();
        db.stock()
            .record_movement(NewStockMove::manual(
                date(1),
                cam.variant_id,
                MoveType::In,
                "COMPRA",
                50,
                Money::from_cents(400),
            ))
            .await
            .unwrap();

        let caixa = db.variants().get_by_sku("CAIXA").await.unwrap().unwrap();
        db.stock()
            .record_movement(NewStockMove::manual(
                date(1),
                caixa.variant_id,
                MoveType::In,
                "ESTOQUE_INICIAL",
                30,
                Money::zero(),
            ))
            .await
            .unwrap();

        db
    }

    fn sale_with_lines(lines: Vec<SaleLine>) -> NewSale {
        NewSale {
            sale_date: date(10),
            channel: "Shopee".into(),
            status: SaleStatus::AEnviar,
            order_ref: "PED-123".into(),
            customer_name: "Maria".into(),
            notes: String::new(),
            lines,
            packaging: None,
        }
    }

    fn line(sku: &str, qty: i64, price: i64, fees: i64, discount: i64) -> SaleLine {
        SaleLine {
            sku: sku.into(),
            qty,
            unit_price: Money::from_cents(price),
            fees: Money::from_cents(fees),
            discount: Money::from_cents(discount),
        }
    }

    #[tokio::test]
    async fn test_create_sale_figures_and_debit() {
        let db = seeded_db().await;

        // 3 × 10.00, fees 1.00, discount 0.50, effective cost 4.00
        let sale_id = db
            .sales()
            .create_sale(sale_with_lines(vec![line("CAM", 3, 1000, 100, 50)]))
            .await
            .unwrap();

        let items = db.sales().get_items(sale_id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].qty, 3);
        assert_eq!(items[0].unit_cost_cents, 400);
        assert_eq!(items[0].net_cents, 2850);
        assert_eq!(items[0].profit_cents, 1650);

        let sale = db.sales().get_by_id(sale_id).await.unwrap().unwrap();
        assert_eq!(sale.total_gross_cents, 3000);
        assert_eq!(sale.total_net_cents, 2850);
        assert_eq!(sale.total_cost_cents, 1200);
        assert_eq!(sale.total_profit_cents, 1650);
        assert_eq!(sale.status, SaleStatus::AEnviar);

        // One OUT of qty 3 posted against the variant
        let cam = db.variants().get_by_sku("CAM").await.unwrap().unwrap();
        assert_eq!(db.stock().current_stock(cam.variant_id).await.unwrap(), 47);

        let moves = db.stock().list_recent(10).await.unwrap();
        let sale_move = moves.iter().find(|m| m.reason == "VENDA").unwrap();
        assert_eq!(sale_move.qty, 3);
    }

    #[tokio::test]
    async fn test_unknown_sku_aborts_whole_sale() {
        let db = seeded_db().await;

        let err = db
            .sales()
            .create_sale(sale_with_lines(vec![
                line("CAM", 1, 1000, 0, 0),
                line("GHOST", 1, 500, 0, 0),
            ]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::VariantNotFound { .. })
        ));

        // Nothing written anywhere
        assert!(db.sales().list_recent(10).await.unwrap().is_empty());
        let cam = db.variants().get_by_sku("CAM").await.unwrap().unwrap();
        assert_eq!(db.stock().current_stock(cam.variant_id).await.unwrap(), 50);
        let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_items")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(items, 0);
    }

    #[tokio::test]
    async fn test_line_validation() {
        let db = seeded_db().await;

        let err = db.sales().create_sale(sale_with_lines(vec![])).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::EmptySale)));

        let err = db
            .sales()
            .create_sale(sale_with_lines(vec![line("   ", 1, 1000, 0, 0)]))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::MissingSku)));

        let err = db
            .sales()
            .create_sale(sale_with_lines(vec![line("CAM", 0, 1000, 0, 0)]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::InvalidQuantity { qty: 0 })
        ));
    }

    #[tokio::test]
    async fn test_inactive_variant_rejected() {
        let db = seeded_db().await;

        let cam = db.variants().get_by_sku("CAM").await.unwrap().unwrap();
        sqlx::query("UPDATE product_variants SET is_active = 0 WHERE id = ?1")
            .bind(cam.variant_id)
            .execute(db.pool())
            .await
            .unwrap();

        let err = db
            .sales()
            .create_sale(sale_with_lines(vec![line("CAM", 1, 1000, 0, 0)]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::InactiveVariant { .. })
        ));
    }

    #[tokio::test]
    async fn test_packaging_debits_stock_not_totals() {
        let db = seeded_db().await;

        let mut input = sale_with_lines(vec![line("CAM", 3, 1000, 100, 50)]);
        input.packaging = Some(PackagingRequest {
            volumes: 2,
            box_sku: Some("CAIXA".into()),
            envelope_sku: None,
        });
        let sale_id = db.sales().create_sale(input).await.unwrap();

        // Box stock debited by the volume count at zero cost
        let caixa = db.variants().get_by_sku("CAIXA").await.unwrap().unwrap();
        assert_eq!(db.stock().current_stock(caixa.variant_id).await.unwrap(), 28);

        let moves = db.stock().list_recent(10).await.unwrap();
        let pack_move = moves.iter().find(|m| m.reason == "EMBALAGEM").unwrap();
        assert_eq!(pack_move.qty, 2);
        assert_eq!(pack_move.unit_cost_cents, 0);

        // Totals identical to the packaging-free sale
        let sale = db.sales().get_by_id(sale_id).await.unwrap().unwrap();
        assert_eq!(sale.total_net_cents, 2850);
        assert_eq!(sale.total_cost_cents, 1200);
        assert_eq!(sale.total_profit_cents, 1650);
        assert!(sale.packaging_enabled);
        assert_eq!(sale.packaging_volumes, 2);
        assert_eq!(sale.packaging_box_variant_id, Some(caixa.variant_id));
    }

    #[tokio::test]
    async fn test_unknown_packaging_sku_aborts() {
        let db = seeded_db().await;

        let mut input = sale_with_lines(vec![line("CAM", 1, 1000, 0, 0)]);
        input.packaging = Some(PackagingRequest {
            volumes: 1,
            box_sku: Some("GHOST-BOX".into()),
            envelope_sku: None,
        });

        let err = db.sales().create_sale(input).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::VariantNotFound { .. })
        ));
        assert!(db.sales().list_recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_restores_stock_with_inverse_moves() {
        let db = seeded_db().await;

        let mut input = sale_with_lines(vec![line("CAM", 3, 1000, 0, 0)]);
        input.packaging = Some(PackagingRequest {
            volumes: 2,
            box_sku: Some("CAIXA".into()),
            envelope_sku: None,
        });
        let sale_id = db.sales().create_sale(input).await.unwrap();

        let cam = db.variants().get_by_sku("CAM").await.unwrap().unwrap();
        let caixa = db.variants().get_by_sku("CAIXA").await.unwrap().unwrap();
        assert_eq!(db.stock().current_stock(cam.variant_id).await.unwrap(), 47);
        assert_eq!(db.stock().current_stock(caixa.variant_id).await.unwrap(), 28);

        db.sales().cancel_sale(sale_id).await.unwrap();

        // Stock back to pre-sale values
        assert_eq!(db.stock().current_stock(cam.variant_id).await.unwrap(), 50);
        assert_eq!(db.stock().current_stock(caixa.variant_id).await.unwrap(), 30);

        // Exactly two IN reversals, qty 3 and qty 2
        let moves = db.stock().list_recent(20).await.unwrap();
        let mut reversal_qtys: Vec<i64> = moves
            .iter()
            .filter(|m| m.reason == "CANCELAMENTO")
            .map(|m| m.qty)
            .collect();
        reversal_qtys.sort();
        assert_eq!(reversal_qtys, vec![2, 3]);

        let sale = db.sales().get_by_id(sale_id).await.unwrap().unwrap();
        assert_eq!(sale.status, SaleStatus::Cancelado);
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent() {
        let db = seeded_db().await;

        let sale_id = db
            .sales()
            .create_sale(sale_with_lines(vec![line("CAM", 3, 1000, 0, 0)]))
            .await
            .unwrap();

        db.sales().cancel_sale(sale_id).await.unwrap();
        let after_first: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stock_moves")
            .fetch_one(db.pool())
            .await
            .unwrap();

        // Second cancel: successful no-op, no extra reversals
        db.sales().cancel_sale(sale_id).await.unwrap();
        let after_second: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stock_moves")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(after_first, after_second);

        let sale = db.sales().get_by_id(sale_id).await.unwrap().unwrap();
        assert_eq!(sale.status, SaleStatus::Cancelado);
    }

    #[tokio::test]
    async fn test_cancel_does_not_touch_costs() {
        let db = seeded_db().await;

        let sale_id = db
            .sales()
            .create_sale(sale_with_lines(vec![line("CAM", 3, 1000, 0, 0)]))
            .await
            .unwrap();
        db.sales().cancel_sale(sale_id).await.unwrap();

        // Effective cost still comes from the original purchase
        let cam = db.variants().get_by_sku("CAM").await.unwrap().unwrap();
        assert_eq!(cam.effective_cost().cents(), 400);
    }

    #[tokio::test]
    async fn test_status_transitions() {
        let db = seeded_db().await;

        let sale_id = db
            .sales()
            .create_sale(sale_with_lines(vec![line("CAM", 1, 1000, 0, 0)]))
            .await
            .unwrap();

        db.sales()
            .update_status(sale_id, SaleStatus::Enviado)
            .await
            .unwrap();
        db.sales()
            .update_status(sale_id, SaleStatus::Concluido)
            .await
            .unwrap();

        let sale = db.sales().get_by_id(sale_id).await.unwrap().unwrap();
        assert_eq!(sale.status, SaleStatus::Concluido);

        // Plain update: no ledger side effects
        let cam = db.variants().get_by_sku("CAM").await.unwrap().unwrap();
        assert_eq!(db.stock().current_stock(cam.variant_id).await.unwrap(), 49);

        let err = db
            .sales()
            .update_status(999, SaleStatus::Enviado)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_cancel_unknown_sale() {
        let db = seeded_db().await;
        let err = db.sales().cancel_sale(42).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
