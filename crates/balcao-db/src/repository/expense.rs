//! # Expense Repository
//!
//! CRUD for free-form expense entries. The COMPRA_ESTOQUE category is
//! special only at report time: stock purchases already flow through the
//! ledger, so the financial summary skips those expense rows.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use balcao_core::{validation, Expense, NewExpense};

/// Repository for expense database operations.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
}

impl ExpenseRepository {
    /// Creates a new ExpenseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ExpenseRepository { pool }
    }

    /// Records an expense and returns its id.
    pub async fn create(&self, input: NewExpense) -> DbResult<i64> {
        let category = validation::require_non_empty("category", &input.category)?;
        let description = validation::require_non_empty("description", &input.description)?;
        validation::require_non_negative_money("amount", input.amount)?;

        debug!(category = %category, amount = %input.amount, "Recording expense");

        let result = sqlx::query(
            r#"
            INSERT INTO expenses (exp_date, category, description, amount_cents, payment_method, notes)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(input.exp_date)
        .bind(&category)
        .bind(&description)
        .bind(input.amount.cents())
        .bind(input.payment_method.trim())
        .bind(input.notes.trim())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Deletes an expense.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Expense", id));
        }

        Ok(())
    }

    /// Most recent expenses, newest first.
    pub async fn list_recent(&self, limit: i64) -> DbResult<Vec<Expense>> {
        let expenses = sqlx::query_as::<_, Expense>(
            r#"
            SELECT id, exp_date, category, description, amount_cents, payment_method, notes
              FROM expenses
             ORDER BY exp_date DESC, id DESC
             LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(expenses)
    }

    /// Lists expenses in a period (inclusive), newest first.
    pub async fn list_period(
        &self,
        from: chrono::NaiveDate,
        to: chrono::NaiveDate,
    ) -> DbResult<Vec<Expense>> {
        let expenses = sqlx::query_as::<_, Expense>(
            r#"
            SELECT id, exp_date, category, description, amount_cents, payment_method, notes
              FROM expenses
             WHERE exp_date BETWEEN ?1 AND ?2
             ORDER BY exp_date DESC, id DESC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(expenses)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
