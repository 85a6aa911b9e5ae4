//! # Category Repository
//!
//! CRUD for product categories. Deletion is guarded: a category that still
//! has products (active or not) cannot be removed, only renamed or
//! deactivated.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use balcao_core::{validation, Category, CoreError};

/// Repository for category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Creates a category and returns its id.
    pub async fn create(&self, name: &str, is_active: bool) -> DbResult<i64> {
        let name = validation::require_non_empty("name", name)?;

        debug!(name = %name, "Creating category");

        let result = sqlx::query("INSERT INTO categories (name, is_active) VALUES (?1, ?2)")
            .bind(&name)
            .bind(is_active)
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    /// Updates a category's name and active flag.
    pub async fn update(&self, id: i64, name: &str, is_active: bool) -> DbResult<()> {
        let name = validation::require_non_empty("name", name)?;

        let result = sqlx::query(
            r#"
            UPDATE categories
               SET name = ?2,
                   is_active = ?3,
                   updated_at = datetime('now')
             WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&name)
        .bind(is_active)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        Ok(())
    }

    /// Deletes a category.
    ///
    /// ## Referential Guard
    /// Blocked while any product (active or inactive) references the
    /// category; deactivate instead of deleting in that case.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let product_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE category_id = ?1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        if product_count > 0 {
            return Err(DbError::Core(CoreError::CategoryInUse { id, product_count }));
        }

        let result = sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        debug!(id, "Category deleted");
        Ok(())
    }

    /// Gets a category by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, is_active FROM categories WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Lists categories ordered by name.
    ///
    /// ## Arguments
    /// * `only_active` - Restrict to active categories (for pickers)
    pub async fn list(&self, only_active: bool) -> DbResult<Vec<Category>> {
        let sql = if only_active {
            "SELECT id, name, is_active FROM categories WHERE is_active = 1 ORDER BY name"
        } else {
            "SELECT id, name, is_active FROM categories ORDER BY name"
        };

        let categories = sqlx::query_as::<_, Category>(sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(categories)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
