//! # Product Repository
//!
//! Product CRUD plus the variant-mode rules that keep the ledger consistent.
//!
//! ## Variant Modes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Product Variant Modes                             │
//! │                                                                         │
//! │  WITHOUT variants                    WITH variants                     │
//! │  ─────────────────                   ─────────────                     │
//! │  products: CAM                       products: CAM (attr "Cor")        │
//! │       │                                   │                             │
//! │       ▼                                   ├──► CAM-PRETO  (active)     │
//! │  synthetic default variant               └──► CAM-AZUL   (active)     │
//! │  variant_sku = "CAM"                                                   │
//! │  variant_value = "Única"                                               │
//! │  is_default = 1                                                        │
//! │                                                                         │
//! │  Switching modes NEVER deletes variant rows: the abandoned side is     │
//! │  soft-deactivated so ledger history stays resolvable.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::variant::unique_variant_sku;
use balcao_core::types::{reason, ref_type, DEFAULT_VARIANT_VALUE};
use balcao_core::{validation, NewProduct, Product};

/// Product listing row: category name attached and the cost column derived
/// from the latest qualifying purchase across the product's variants,
/// falling back to the stored default.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductListRow {
    pub id: i64,
    pub sku: String,
    pub name: String,
    pub category_id: i64,
    pub category_name: String,
    pub variant_attribute_name: Option<String>,
    pub brand: Option<String>,
    pub cost_default_cents: i64,
    pub price_default_cents: i64,
    pub stock_min: i64,
    pub is_active: bool,
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Creates a product with its variants, atomically.
    ///
    /// ## What This Does
    /// 1. Validates the input (SKU, name, non-negative money, variant specs)
    /// 2. Inserts the product row
    /// 3. With variants: inserts each as an active non-default variant;
    ///    missing variant SKUs are generated as `<sku>-<slug>` with `-2`,
    ///    `-3`, ... on collision
    /// 4. Without variants: inserts the synthetic default variant
    ///    (variant_sku = product SKU, value "Única")
    /// 5. Posts an IN / ESTOQUE_INICIAL movement for every variant with an
    ///    opening quantity, costed at the product's default cost
    ///
    /// ## Returns
    /// The new product id.
    pub async fn create(&self, input: NewProduct) -> DbResult<i64> {
        let sku = validation::require_non_empty("sku", &input.sku)?;
        let name = validation::require_non_empty("name", &input.name)?;
        validation::require_non_negative_money("cost_default", input.cost_default)?;
        validation::require_non_negative_money("price_default", input.price_default)?;
        validation::require_non_negative("stock_min", input.stock_min)?;

        let attr_name = match &input.variant_attribute_name {
            Some(a) => Some(validation::require_non_empty("variant_attribute_name", a)?),
            None => None,
        };
        if !input.variants.is_empty() && attr_name.is_none() {
            return Err(balcao_core::ValidationError::Required {
                field: "variant_attribute_name",
            }
            .into());
        }

        debug!(sku = %sku, variants = input.variants.len(), "Creating product");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO products (
                sku, name, category_id, variant_attribute_name,
                brand, cost_default_cents, price_default_cents, stock_min, is_active
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&sku)
        .bind(&name)
        .bind(input.category_id)
        .bind(attr_name.as_deref().filter(|_| !input.variants.is_empty()))
        .bind(input.brand.as_deref().map(str::trim))
        .bind(input.cost_default.cents())
        .bind(input.price_default.cents())
        .bind(input.stock_min)
        .bind(input.is_active)
        .execute(&mut *tx)
        .await?;

        let product_id = result.last_insert_rowid();
        let today = Utc::now().date_naive();

        if input.variants.is_empty() {
            // Synthetic default variant; opening stock goes through the
            // movements screen instead.
            sqlx::query(
                r#"
                INSERT INTO product_variants (
                    product_id, variant_sku, variant_value, is_default, is_active
                )
                VALUES (?1, ?2, ?3, 1, 1)
                "#,
            )
            .bind(product_id)
            .bind(&sku)
            .bind(DEFAULT_VARIANT_VALUE)
            .execute(&mut *tx)
            .await?;
        } else {
            for spec in &input.variants {
                let value = validation::require_non_empty("variant_value", &spec.value)?;
                validation::require_non_negative("initial_qty", spec.initial_qty)?;

                let variant_sku = match spec.sku.as_deref().map(str::trim) {
                    Some(s) if !s.is_empty() => s.to_string(),
                    _ => unique_variant_sku(&mut tx, &sku, &value).await?,
                };

                let inserted = sqlx::query(
                    r#"
                    INSERT INTO product_variants (
                        product_id, variant_sku, variant_value, is_default, is_active
                    )
                    VALUES (?1, ?2, ?3, 0, 1)
                    "#,
                )
                .bind(product_id)
                .bind(&variant_sku)
                .bind(&value)
                .execute(&mut *tx)
                .await?;

                if spec.initial_qty > 0 {
                    sqlx::query(
                        r#"
                        INSERT INTO stock_moves (
                            move_date, variant_id, move_type, reason,
                            qty, unit_cost_cents, ref_type, ref_id, notes
                        )
                        VALUES (?1, ?2, 'IN', ?3, ?4, ?5, ?6, NULL, '')
                        "#,
                    )
                    .bind(today)
                    .bind(inserted.last_insert_rowid())
                    .bind(reason::OPENING_STOCK)
                    .bind(spec.initial_qty)
                    .bind(input.cost_default.cents())
                    .bind(ref_type::MANUAL)
                    .execute(&mut *tx)
                    .await?;
                }
            }
        }

        tx.commit().await?;

        debug!(product_id, sku = %sku, "Product created");
        Ok(product_id)
    }

    /// Updates a product and reconciles its variant mode.
    ///
    /// ## Variant Switching (history-safe)
    /// - All non-default variants are deactivated first
    /// - With variants in the input: the default variant is deactivated too
    ///   and the new variants are inserted active
    /// - Without variants: the default variant is reactivated (its SKU
    ///   re-synced to the product SKU), created if it never existed
    ///
    /// No variant row is ever deleted: ledger history must stay resolvable.
    pub async fn update(&self, product_id: i64, input: NewProduct) -> DbResult<()> {
        let sku = validation::require_non_empty("sku", &input.sku)?;
        let name = validation::require_non_empty("name", &input.name)?;
        validation::require_non_negative_money("cost_default", input.cost_default)?;
        validation::require_non_negative_money("price_default", input.price_default)?;
        validation::require_non_negative("stock_min", input.stock_min)?;

        let attr_name = match &input.variant_attribute_name {
            Some(a) => Some(validation::require_non_empty("variant_attribute_name", a)?),
            None => None,
        };
        if !input.variants.is_empty() && attr_name.is_none() {
            return Err(balcao_core::ValidationError::Required {
                field: "variant_attribute_name",
            }
            .into());
        }

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE products
               SET sku = ?2,
                   name = ?3,
                   category_id = ?4,
                   variant_attribute_name = ?5,
                   brand = ?6,
                   cost_default_cents = ?7,
                   price_default_cents = ?8,
                   stock_min = ?9,
                   is_active = ?10,
                   updated_at = datetime('now')
             WHERE id = ?1
            "#,
        )
        .bind(product_id)
        .bind(&sku)
        .bind(&name)
        .bind(input.category_id)
        .bind(attr_name.as_deref().filter(|_| !input.variants.is_empty()))
        .bind(input.brand.as_deref().map(str::trim))
        .bind(input.cost_default.cents())
        .bind(input.price_default.cents())
        .bind(input.stock_min)
        .bind(input.is_active)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", product_id));
        }

        // Deactivate all non-default variants; the kept side is re-added
        // or re-activated below.
        sqlx::query(
            "UPDATE product_variants SET is_active = 0, updated_at = datetime('now') WHERE product_id = ?1 AND is_default = 0",
        )
        .bind(product_id)
        .execute(&mut *tx)
        .await?;

        if !input.variants.is_empty() {
            sqlx::query(
                "UPDATE product_variants SET is_active = 0, updated_at = datetime('now') WHERE product_id = ?1 AND is_default = 1",
            )
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

            for spec in &input.variants {
                let value = validation::require_non_empty("variant_value", &spec.value)?;

                let variant_sku = match spec.sku.as_deref().map(str::trim) {
                    Some(s) if !s.is_empty() => s.to_string(),
                    _ => unique_variant_sku(&mut tx, &sku, &value).await?,
                };

                sqlx::query(
                    r#"
                    INSERT INTO product_variants (
                        product_id, variant_sku, variant_value, is_default, is_active
                    )
                    VALUES (?1, ?2, ?3, 0, 1)
                    "#,
                )
                .bind(product_id)
                .bind(&variant_sku)
                .bind(&value)
                .execute(&mut *tx)
                .await?;
            }
        } else {
            let existing_default: Option<i64> = sqlx::query_scalar(
                "SELECT id FROM product_variants WHERE product_id = ?1 AND is_default = 1",
            )
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await?;

            match existing_default {
                Some(variant_id) => {
                    sqlx::query(
                        "UPDATE product_variants SET is_active = 1, variant_sku = ?2, updated_at = datetime('now') WHERE id = ?1",
                    )
                    .bind(variant_id)
                    .bind(&sku)
                    .execute(&mut *tx)
                    .await?;
                }
                None => {
                    sqlx::query(
                        r#"
                        INSERT INTO product_variants (
                            product_id, variant_sku, variant_value, is_default, is_active
                        )
                        VALUES (?1, ?2, ?3, 1, 1)
                        "#,
                    )
                    .bind(product_id)
                    .bind(&sku)
                    .bind(DEFAULT_VARIANT_VALUE)
                    .execute(&mut *tx)
                    .await?;
                }
            }
        }

        tx.commit().await?;

        debug!(product_id, "Product updated");
        Ok(())
    }

    /// Soft-deletes a product (is_active = 0). History stays intact.
    pub async fn soft_delete(&self, product_id: i64) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE products SET is_active = 0, updated_at = datetime('now') WHERE id = ?1",
        )
        .bind(product_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", product_id));
        }

        Ok(())
    }

    /// Gets a product by id.
    pub async fn get_by_id(&self, product_id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, sku, name, category_id, variant_attribute_name, brand,
                   cost_default_cents, price_default_cents, stock_min, is_active
              FROM products
             WHERE id = ?1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its own SKU (not variant SKUs).
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, sku, name, category_id, variant_attribute_name, brand,
                   cost_default_cents, price_default_cents, stock_min, is_active
              FROM products
             WHERE sku = ?1
            "#,
        )
        .bind(sku.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists all products for the products screen.
    ///
    /// The cost column shows the latest qualifying purchase (IN + COMPRA,
    /// newest by move_date then id) across the product's variants, falling
    /// back to the stored default when no purchase exists.
    pub async fn list_rows(&self) -> DbResult<Vec<ProductListRow>> {
        let rows = sqlx::query_as::<_, ProductListRow>(
            r#"
            SELECT
                p.id, p.sku, p.name, p.category_id, c.name AS category_name,
                p.variant_attribute_name,
                p.brand,
                COALESCE(
                    (
                        SELECT sm.unit_cost_cents
                          FROM stock_moves sm
                          JOIN product_variants v ON v.id = sm.variant_id
                         WHERE v.product_id = p.id
                           AND sm.move_type = 'IN'
                           AND UPPER(sm.reason) = 'COMPRA'
                         ORDER BY sm.move_date DESC, sm.id DESC
                         LIMIT 1
                    ),
                    p.cost_default_cents
                ) AS cost_default_cents,
                p.price_default_cents, p.stock_min, p.is_active
              FROM products p
              JOIN categories c ON c.id = p.category_id
             ORDER BY p.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use crate::DbError;
    use balcao_core::{Money, NewProduct, NewVariantSpec};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn simple_product(sku: &str, category_id: i64) -> NewProduct {
        NewProduct {
            sku: sku.into(),
            name: format!("Produto {}", sku),
            category_id,
            variant_attribute_name: None,
            brand: None,
            cost_default: Money::from_cents(400),
            price_default: Money::from_cents(1000),
            stock_min: 0,
            is_active: true,
            variants: vec![],
        }
    }

    #[tokio::test]
    async fn test_create_without_variants_materializes_default() {
        let db = test_db().await;
        let cat = db.categories().create("Roupas", true).await.unwrap();

        let id = db.products().create(simple_product("CAM", cat)).await.unwrap();

        let variants = db.variants().list_by_product(id, false).await.unwrap();
        assert_eq!(variants.len(), 1);
        assert!(variants[0].is_default);
        assert_eq!(variants[0].variant_sku, "CAM");
        assert_eq!(variants[0].variant_value, "Única");

        // The synthetic variant is addressable like any other
        let lookup = db.variants().get_by_sku("CAM").await.unwrap().unwrap();
        assert_eq!(lookup.product_id, id);
    }

    #[tokio::test]
    async fn test_create_with_variants_and_opening_stock() {
        let db = test_db().await;
        let cat = db.categories().create("Roupas", true).await.unwrap();

        let mut input = simple_product("CAM", cat);
        input.variant_attribute_name = Some("Cor".into());
        input.variants = vec![
            NewVariantSpec {
                value: "Preto".into(),
                sku: None,
                initial_qty: 7,
            },
            NewVariantSpec {
                value: "Azul".into(),
                sku: Some("CAM-AZ".into()),
                initial_qty: 0,
            },
        ];

        let id = db.products().create(input).await.unwrap();

        let preto = db.variants().get_by_sku("CAM-PRETO").await.unwrap().unwrap();
        assert_eq!(
            db.stock().current_stock(preto.variant_id).await.unwrap(),
            7
        );
        // Opening movement carries the product's default cost
        let moves = db.stock().list_recent(10).await.unwrap();
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].reason, "ESTOQUE_INICIAL");
        assert_eq!(moves[0].unit_cost_cents, 400);

        // Explicit SKU respected, no opening movement for qty 0
        let azul = db.variants().get_by_sku("CAM-AZ").await.unwrap().unwrap();
        assert_eq!(db.stock().current_stock(azul.variant_id).await.unwrap(), 0);

        assert_eq!(db.variants().list_by_product(id, true).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_product_sku_rejected() {
        let db = test_db().await;
        let cat = db.categories().create("Roupas", true).await.unwrap();

        db.products().create(simple_product("CAM", cat)).await.unwrap();
        let err = db
            .products()
            .create(simple_product("CAM", cat))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_generated_sku_dedup_suffix() {
        let db = test_db().await;
        let cat = db.categories().create("Roupas", true).await.unwrap();

        let mut input = simple_product("CAM", cat);
        input.variant_attribute_name = Some("Cor".into());
        input.variants = vec![
            NewVariantSpec {
                value: "Azul Céu".into(),
                sku: None,
                initial_qty: 0,
            },
            // slugs to the same base as the first
            NewVariantSpec {
                value: "azul/ceu".into(),
                sku: None,
                initial_qty: 0,
            },
        ];

        db.products().create(input).await.unwrap();

        assert!(db.variants().sku_exists("CAM-AZUL-CEU").await.unwrap());
        assert!(db.variants().sku_exists("CAM-AZUL-CEU-2").await.unwrap());
    }

    #[tokio::test]
    async fn test_update_switch_to_variants_deactivates_default() {
        let db = test_db().await;
        let cat = db.categories().create("Roupas", true).await.unwrap();
        let id = db.products().create(simple_product("CAM", cat)).await.unwrap();

        let mut input = simple_product("CAM", cat);
        input.variant_attribute_name = Some("Cor".into());
        input.variants = vec![NewVariantSpec {
            value: "Preto".into(),
            sku: None,
            initial_qty: 0,
        }];
        db.products().update(id, input).await.unwrap();

        let all = db.variants().list_by_product(id, false).await.unwrap();
        assert_eq!(all.len(), 2);

        let default = all.iter().find(|v| v.is_default).unwrap();
        assert!(!default.is_active, "default variant soft-deactivated, not deleted");

        let active = db.variants().list_by_product(id, true).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].variant_sku, "CAM-PRETO");
    }

    #[tokio::test]
    async fn test_update_switch_back_reactivates_default() {
        let db = test_db().await;
        let cat = db.categories().create("Roupas", true).await.unwrap();
        let id = db.products().create(simple_product("CAM", cat)).await.unwrap();

        let mut with_variants = simple_product("CAM", cat);
        with_variants.variant_attribute_name = Some("Cor".into());
        with_variants.variants = vec![NewVariantSpec {
            value: "Preto".into(),
            sku: None,
            initial_qty: 0,
        }];
        db.products().update(id, with_variants).await.unwrap();

        // Back to single-variant mode
        db.products().update(id, simple_product("CAM", cat)).await.unwrap();

        let active = db.variants().list_by_product(id, true).await.unwrap();
        assert_eq!(active.len(), 1);
        assert!(active[0].is_default);
        assert_eq!(active[0].variant_sku, "CAM");

        // The real variant survives, deactivated
        let all = db.variants().list_by_product(id, false).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_list_rows_derives_cost_from_latest_purchase() {
        use balcao_core::{MoveType, NewStockMove};
        use chrono::NaiveDate;

        let db = test_db().await;
        let cat = db.categories().create("Roupas", true).await.unwrap();
        db.products().create(simple_product("CAM", cat)).await.unwrap();

        let rows = db.products().list_rows().await.unwrap();
        assert_eq!(rows[0].cost_default_cents, 400);
        assert_eq!(rows[0].category_name, "Roupas");

        let v = db.variants().get_by_sku("CAM").await.unwrap().unwrap();
        db.stock()
            .record_movement(NewStockMove::manual(
                NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
                v.variant_id,
                MoveType::In,
                "COMPRA",
                10,
                Money::from_cents(550),
            ))
            .await
            .unwrap();

        let rows = db.products().list_rows().await.unwrap();
        assert_eq!(rows[0].cost_default_cents, 550);
    }

    #[tokio::test]
    async fn test_soft_delete() {
        let db = test_db().await;
        let cat = db.categories().create("Roupas", true).await.unwrap();
        let id = db.products().create(simple_product("CAM", cat)).await.unwrap();

        db.products().soft_delete(id).await.unwrap();

        let product = db.products().get_by_id(id).await.unwrap().unwrap();
        assert!(!product.is_active);
    }
}
