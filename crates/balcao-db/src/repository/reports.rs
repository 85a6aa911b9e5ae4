//! # Reports Repository
//!
//! Period financial summary.
//!
//! ## Expense Folding
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Financial Summary (per period)                        │
//! │                                                                         │
//! │  revenue  = Σ sales.total_net                                          │
//! │  cost     = Σ sales.total_cost                                         │
//! │  profit   = Σ sales.total_profit                                       │
//! │                                                                         │
//! │  expenses = Σ expenses.amount  (category ≠ COMPRA_ESTOQUE)             │
//! │           + Σ (qty × unit_cost) of IN + COMPRA ledger movements        │
//! │                                                                         │
//! │  result   = profit − expenses                                          │
//! │                                                                         │
//! │  Stock purchases are counted ONCE, from the ledger; an expense row     │
//! │  categorized COMPRA_ESTOQUE is assumed to duplicate a ledger purchase  │
//! │  and is excluded.                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::error::DbResult;
use balcao_core::{FinancialSummary, Money};

/// Repository for report queries.
#[derive(Debug, Clone)]
pub struct ReportsRepository {
    pool: SqlitePool,
}

#[derive(Debug, sqlx::FromRow)]
struct SalesTotals {
    revenue: i64,
    cost: i64,
    profit: i64,
}

impl ReportsRepository {
    /// Creates a new ReportsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportsRepository { pool }
    }

    /// Computes the financial summary for an inclusive date range.
    pub async fn financial_summary(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DbResult<FinancialSummary> {
        let sales = sqlx::query_as::<_, SalesTotals>(
            r#"
            SELECT
                COALESCE(SUM(total_net_cents), 0) AS revenue,
                COALESCE(SUM(total_cost_cents), 0) AS cost,
                COALESCE(SUM(total_profit_cents), 0) AS profit
            FROM sales
            WHERE sale_date BETWEEN ?1 AND ?2
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        // Stock purchases don't count here; they come from the ledger below
        let expenses: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(amount_cents), 0)
            FROM expenses
            WHERE exp_date BETWEEN ?1 AND ?2
              AND UPPER(category) <> 'COMPRA_ESTOQUE'
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        let purchases: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(qty * unit_cost_cents), 0)
              FROM stock_moves
             WHERE move_type = 'IN'
               AND UPPER(reason) = 'COMPRA'
               AND move_date BETWEEN ?1 AND ?2
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        let expenses_total = Money::from_cents(expenses + purchases);
        let profit = Money::from_cents(sales.profit);

        Ok(FinancialSummary {
            revenue: Money::from_cents(sales.revenue),
            cost: Money::from_cents(sales.cost),
            profit,
            expenses: expenses_total,
            result: profit - expenses_total,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use balcao_core::{
        Money, MoveType, NewExpense, NewProduct, NewSale, NewStockMove, SaleLine, SaleStatus,
    };
    use chrono::NaiveDate;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, day).unwrap()
    }

    #[tokio::test]
    async fn test_financial_summary_folds_ledger_purchases() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cat = db.categories().create("Roupas", true).await.unwrap();
        db.products()
            .create(NewProduct {
                sku: "CAM".into(),
                name: "Camiseta".into(),
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
        let cam = db.variants().get_by_sku("CAM").await.unwrap().unwrap();

        // Purchase: 10 × 4.00 = 40.00 counted as expense via the ledger
        db.stock()
            .record_movement(NewStockMove::manual(
                date(1),
                cam.variant_id,
                MoveType::In,
                "COMPRA",
                10,
                Money::from_cents(400),
            ))
            .await
            .unwrap();

        // Sale: 2 × 10.00, cost 4.00 → net 20.00, cost 8.00, profit 12.00
        db.sales()
            .create_sale(NewSale {
                sale_date: date(10),
                channel: "Shopee".into(),
                status: SaleStatus::Concluido,
                order_ref: String::new(),
                customer_name: String::new(),
                notes: String::new(),
                lines: vec![SaleLine {
                    sku: "CAM".into(),
                    qty: 2,
                    unit_price: Money::from_cents(1000),
                    fees: Money::zero(),
                    discount: Money::zero(),
                }],
                packaging: None,
            })
            .await
            .unwrap();

        // Regular expense counts; COMPRA_ESTOQUE is excluded (ledger already
        // captured the purchase)
        db.expenses()
            .create(NewExpense {
                exp_date: date(5),
                category: "FRETE".into(),
                description: "Envio".into(),
                amount: Money::from_cents(500),
                payment_method: "PIX".into(),
                notes: String::new(),
            })
            .await
            .unwrap();
        db.expenses()
            .create(NewExpense {
                exp_date: date(5),
                category: "compra_estoque".into(),
                description: "Duplicada no razão".into(),
                amount: Money::from_cents(9999),
                payment_method: "PIX".into(),
                notes: String::new(),
            })
            .await
            .unwrap();

        let summary = db
            .reports()
            .financial_summary(date(1), date(30))
            .await
            .unwrap();

        assert_eq!(summary.revenue.cents(), 2000);
        assert_eq!(summary.cost.cents(), 800);
        assert_eq!(summary.profit.cents(), 1200);
        // 5.00 freight + 40.00 ledger purchases; 99.99 excluded
        assert_eq!(summary.expenses.cents(), 4500);
        assert_eq!(summary.result.cents(), 1200 - 4500);
    }

    #[tokio::test]
    async fn test_summary_respects_date_bounds() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        db.expenses()
            .create(NewExpense {
                exp_date: date(15),
                category: "FRETE".into(),
                description: "Dentro".into(),
                amount: Money::from_cents(100),
                payment_method: "PIX".into(),
                notes: String::new(),
            })
            .await
            .unwrap();

        let inside = db
            .reports()
            .financial_summary(date(15), date(15))
            .await
            .unwrap();
        assert_eq!(inside.expenses.cents(), 100);

        let outside = db
            .reports()
            .financial_summary(date(16), date(30))
            .await
            .unwrap();
        assert_eq!(outside.expenses.cents(), 0);
        assert_eq!(outside.result.cents(), 0);
    }
}
