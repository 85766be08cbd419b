// src/db/costs_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::costs::{
        ApplicationMode, Cost, CostFrequency, CostKind, CostPayment, CostPaymentStatus,
        CostServiceLink,
    },
};

#[derive(Clone)]
pub struct CostRepository {
    #[allow(dead_code)]
    pool: PgPool,
}

impl CostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CUSTOS (Catálogo)
    // =========================================================================

    pub async fn create_cost<'e, E>(
        &self,
        executor: E,
        name: &str,
        amount: Decimal,
        kind: CostKind,
        frequency: CostFrequency,
        note: Option<&str>,
    ) -> Result<Cost, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let cost = sqlx::query_as::<_, Cost>(
            r#"
            INSERT INTO costs (name, amount, kind, frequency, note)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, amount, kind, frequency, is_active, note, created_at
            "#,
        )
        .bind(name)
        .bind(amount)
        .bind(kind)
        .bind(frequency)
        .bind(note)
        .fetch_one(executor)
        .await?;

        Ok(cost)
    }

    pub async fn list_active<'e, E>(
        &self,
        executor: E,
        kind: Option<CostKind>,
        frequency: Option<CostFrequency>,
    ) -> Result<Vec<Cost>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let costs = sqlx::query_as::<_, Cost>(
            r#"
            SELECT id, name, amount, kind, frequency, is_active, note, created_at
            FROM costs
            WHERE is_active = TRUE
              AND ($1::cost_kind IS NULL OR kind = $1)
              AND ($2::cost_frequency IS NULL OR frequency = $2)
            ORDER BY name ASC
            "#,
        )
        .bind(kind)
        .bind(frequency)
        .fetch_all(executor)
        .await?;

        Ok(costs)
    }

    pub async fn get_cost<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Cost>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let cost = sqlx::query_as::<_, Cost>(
            "SELECT id, name, amount, kind, frequency, is_active, note, created_at
             FROM costs WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(cost)
    }

    // Soft delete: o custo sai das listagens e dos totais, mas as linhas de
    // confirmação antigas continuam apontando para ele.
    pub async fn deactivate<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("UPDATE costs SET is_active = FALSE WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    // =========================================================================
    //  VÍNCULOS CUSTO ↔ SERVIÇO (Rateio)
    // =========================================================================

    pub async fn insert_link<'e, E>(
        &self,
        executor: E,
        cost_id: Uuid,
        service_id: Uuid,
        mode: ApplicationMode,
        percentage: Decimal,
    ) -> Result<CostServiceLink, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let link = sqlx::query_as::<_, CostServiceLink>(
            r#"
            INSERT INTO cost_service_links (cost_id, service_id, mode, percentage)
            VALUES ($1, $2, $3, $4)
            RETURNING id, cost_id, service_id, mode, percentage
            "#,
        )
        .bind(cost_id)
        .bind(service_id)
        .bind(mode)
        .bind(percentage)
        .fetch_one(executor)
        .await?;

        Ok(link)
    }

    pub async fn list_links<'e, E>(&self, executor: E) -> Result<Vec<CostServiceLink>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let links = sqlx::query_as::<_, CostServiceLink>(
            "SELECT id, cost_id, service_id, mode, percentage FROM cost_service_links",
        )
        .fetch_all(executor)
        .await?;

        Ok(links)
    }

    // =========================================================================
    //  CONFIRMAÇÕES (CostPayment, 1 linha por custo/mês)
    // =========================================================================

    pub async fn upsert_payment<'e, E>(
        &self,
        executor: E,
        cost_id: Uuid,
        month_reference: NaiveDate,
        paid_amount: Decimal,
        payment_date: NaiveDate,
        status: CostPaymentStatus,
    ) -> Result<CostPayment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // A chave (cost_id, month_reference) é única: re-salvar o mesmo mês
        // atualiza a linha existente, o mês de referência nunca muda.
        let payment = sqlx::query_as::<_, CostPayment>(
            r#"
            INSERT INTO cost_payments (cost_id, month_reference, paid_amount, payment_date, status)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (cost_id, month_reference)
            DO UPDATE SET paid_amount = EXCLUDED.paid_amount,
                          payment_date = EXCLUDED.payment_date,
                          status = EXCLUDED.status
            RETURNING id, cost_id, month_reference, paid_amount, payment_date, status, created_at
            "#,
        )
        .bind(cost_id)
        .bind(month_reference)
        .bind(paid_amount)
        .bind(payment_date)
        .bind(status)
        .fetch_one(executor)
        .await?;

        Ok(payment)
    }

    /// Confirmações com mês de referência dentro de [from, to] (inclusivo).
    pub async fn payments_in_range<'e, E>(
        &self,
        executor: E,
        from_month: NaiveDate,
        to_month: NaiveDate,
    ) -> Result<Vec<CostPayment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payments = sqlx::query_as::<_, CostPayment>(
            r#"
            SELECT id, cost_id, month_reference, paid_amount, payment_date, status, created_at
            FROM cost_payments
            WHERE month_reference >= $1 AND month_reference <= $2
            ORDER BY month_reference ASC
            "#,
        )
        .bind(from_month)
        .bind(to_month)
        .fetch_all(executor)
        .await?;

        Ok(payments)
    }
}
