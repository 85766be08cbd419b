// src/db/billing_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::{expenses::OneOffExpense, receipts::Receipt},
};

#[derive(Clone)]
pub struct BillingRepository {
    #[allow(dead_code)]
    pool: PgPool,
}

impl BillingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  RECEBIMENTOS
    // =========================================================================

    /// Recebimentos com primeiro pagamento a partir de `cutoff`. O corte fica
    /// bem atrás da janela exibida porque parcelas antigas ainda caem em
    /// meses recentes.
    pub async fn receipts_since<'e, E>(
        &self,
        executor: E,
        cutoff: NaiveDate,
    ) -> Result<Vec<Receipt>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let receipts = sqlx::query_as::<_, Receipt>(
            r#"
            SELECT id, visit_id, total_value, paid_value, method, status,
                   installment_total, installments_received, payment_date
            FROM receipts
            WHERE payment_date >= $1
            ORDER BY payment_date ASC
            "#,
        )
        .bind(cutoff)
        .fetch_all(executor)
        .await?;

        Ok(receipts)
    }

    // =========================================================================
    //  DESPESAS AVULSAS
    // =========================================================================

    pub async fn create_expense<'e, E>(
        &self,
        executor: E,
        description: &str,
        total_value: Decimal,
        category: &str,
        first_installment: NaiveDate,
        installment_count: i32,
    ) -> Result<OneOffExpense, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let expense = sqlx::query_as::<_, OneOffExpense>(
            r#"
            INSERT INTO one_off_expenses
                (description, total_value, category, first_installment, installment_count)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, description, total_value, category,
                      first_installment, installment_count, created_at
            "#,
        )
        .bind(description)
        .bind(total_value)
        .bind(category)
        .bind(first_installment)
        .bind(installment_count)
        .fetch_one(executor)
        .await?;

        Ok(expense)
    }

    pub async fn list_expenses<'e, E>(&self, executor: E) -> Result<Vec<OneOffExpense>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let expenses = sqlx::query_as::<_, OneOffExpense>(
            "SELECT id, description, total_value, category,
                    first_installment, installment_count, created_at
             FROM one_off_expenses
             ORDER BY first_installment DESC",
        )
        .fetch_all(executor)
        .await?;

        Ok(expenses)
    }
}
