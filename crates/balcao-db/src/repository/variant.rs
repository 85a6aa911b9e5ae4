//! # Variant Repository
//!
//! SKU resolution and variant listings. Every stock or sale operation starts
//! here: a human-typed SKU resolves to a [`VariantLookup`] carrying variant
//! identity, active flag and the effective cost/price fields in one joined
//! query.

use sqlx::{SqliteConnection, SqlitePool};

use crate::error::DbResult;
use balcao_core::{validation, ProductVariant, VariantLookup};

/// Autocomplete suggestion row for SKU entry fields.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VariantSuggestion {
    pub variant_id: i64,
    pub variant_sku: String,
    pub product_name: String,
    pub attr_name: String,
    pub variant_value: String,
}

/// Repository for variant database operations.
#[derive(Debug, Clone)]
pub struct VariantRepository {
    pool: SqlitePool,
}

impl VariantRepository {
    /// Creates a new VariantRepository.
    pub fn new(pool: SqlitePool) -> Self {
        VariantRepository { pool }
    }

    /// Resolves a variant SKU to the joined variant + product row.
    ///
    /// Returns `None` for an unknown SKU; callers decide whether that is an
    /// error (sales, movements) or a soft miss (autocomplete).
    pub async fn get_by_sku(&self, variant_sku: &str) -> DbResult<Option<VariantLookup>> {
        lookup_by_sku(&self.pool, variant_sku).await
    }

    /// Lists a product's variants, default variant first.
    pub async fn list_by_product(
        &self,
        product_id: i64,
        only_active: bool,
    ) -> DbResult<Vec<ProductVariant>> {
        let sql = if only_active {
            r#"
            SELECT id, product_id, variant_sku, variant_value, is_default,
                   cost_override_cents, price_override_cents, is_active
              FROM product_variants
             WHERE product_id = ?1 AND is_active = 1
             ORDER BY is_default DESC, variant_value
            "#
        } else {
            r#"
            SELECT id, product_id, variant_sku, variant_value, is_default,
                   cost_override_cents, price_override_cents, is_active
              FROM product_variants
             WHERE product_id = ?1
             ORDER BY is_default DESC, variant_value
            "#
        };

        let variants = sqlx::query_as::<_, ProductVariant>(sql)
            .bind(product_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(variants)
    }

    /// Searches variants for SKU-entry autocomplete.
    ///
    /// Matches the query against variant SKU, product name and variant value;
    /// SKU-prefix matches rank first. An empty query returns nothing. With a
    /// category name the results are restricted to that category,
    /// case-insensitively.
    pub async fn search(
        &self,
        query: &str,
        limit: i64,
        category: Option<&str>,
    ) -> DbResult<Vec<VariantSuggestion>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let like = format!("%{}%", query);
        let prefix = format!("{}%", query);
        let category = category.map(str::trim).filter(|c| !c.is_empty());

        let suggestions = sqlx::query_as::<_, VariantSuggestion>(
            r#"
            SELECT
              v.id AS variant_id,
              v.variant_sku,
              p.name AS product_name,
              COALESCE(p.variant_attribute_name, 'Variação') AS attr_name,
              v.variant_value
            FROM product_variants v
            JOIN products p ON p.id = v.product_id
            JOIN categories c ON c.id = p.category_id
            WHERE (?4 IS NULL OR LOWER(c.name) = LOWER(?4))
              AND (v.variant_sku LIKE ?1
               OR p.name LIKE ?1
               OR v.variant_value LIKE ?1)
            ORDER BY
              CASE WHEN v.variant_sku LIKE ?2 THEN 0 ELSE 1 END,
              v.variant_sku
            LIMIT ?3
            "#,
        )
        .bind(&like)
        .bind(&prefix)
        .bind(limit)
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        Ok(suggestions)
    }

    /// Checks whether any variant carries the given SKU (globally).
    pub async fn sku_exists(&self, variant_sku: &str) -> DbResult<bool> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM product_variants WHERE variant_sku = ?1 LIMIT 1")
                .bind(variant_sku.trim())
                .fetch_optional(&self.pool)
                .await?;

        Ok(found.is_some())
    }
}

/// SKU lookup on an arbitrary executor, shared with the sale transaction
/// (resolution must happen on the transaction's connection).
pub(crate) async fn lookup_by_sku<'e, E>(
    executor: E,
    variant_sku: &str,
) -> DbResult<Option<VariantLookup>>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let lookup = sqlx::query_as::<_, VariantLookup>(
        r#"
        SELECT
            v.id AS variant_id,
            v.variant_sku,
            v.variant_value,
            v.is_default,
            v.cost_override_cents,
            v.price_override_cents,
            v.is_active,
            p.id AS product_id,
            p.sku AS product_sku,
            p.name AS product_name,
            p.cost_default_cents,
            p.price_default_cents,
            p.stock_min,
            p.variant_attribute_name
          FROM product_variants v
          JOIN products p ON p.id = v.product_id
         WHERE v.variant_sku = ?1
        "#,
    )
    .bind(variant_sku.trim())
    .fetch_optional(executor)
    .await?;

    Ok(lookup)
}

/// Generates a variant SKU unique across all products, on the supplied
/// transaction connection: `<product_sku>-<slug>` with `-2`, `-3`, ...
/// appended until free.
pub(crate) async fn unique_variant_sku(
    conn: &mut SqliteConnection,
    product_sku: &str,
    variant_value: &str,
) -> DbResult<String> {
    let base = validation::variant_sku_base(product_sku, variant_value);
    let mut candidate = base.clone();
    let mut n = 2;

    loop {
        let taken: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM product_variants WHERE variant_sku = ?1 LIMIT 1")
                .bind(&candidate)
                .fetch_optional(&mut *conn)
                .await?;

        if taken.is_none() {
            return Ok(candidate);
        }

        candidate = format!("{}-{}", base, n);
        n += 1;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
