// src/db/settings_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::settings::{ClinicSettings, UpdateSettingsRequest},
};

#[derive(Clone)]
pub struct SettingsRepository {
    #[allow(dead_code)]
    pool: PgPool,
}

impl SettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Clínica recém-criada ainda não tem linha de configuração: devolve o
    /// default (taxas zeradas) em vez de erro.
    pub async fn get_settings<'e, E>(&self, executor: E) -> Result<ClinicSettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let settings = sqlx::query_as::<_, ClinicSettings>(
            "SELECT credit_card_fee_pct, debit_card_fee_pct, tax_rate_pct, updated_at
             FROM clinic_settings
             LIMIT 1",
        )
        .fetch_optional(executor)
        .await?;

        Ok(settings.unwrap_or_default())
    }

    pub async fn update_settings<'e, E>(
        &self,
        executor: E,
        payload: UpdateSettingsRequest,
    ) -> Result<ClinicSettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Tabela de linha única; COALESCE mantém o valor atual quando o
        // campo não veio no payload.
        let settings = sqlx::query_as::<_, ClinicSettings>(
            r#"
            INSERT INTO clinic_settings (singleton, credit_card_fee_pct, debit_card_fee_pct, tax_rate_pct, updated_at)
            VALUES (TRUE, COALESCE($1, 0), COALESCE($2, 0), COALESCE($3, 0), NOW())
            ON CONFLICT (singleton)
            DO UPDATE SET
                credit_card_fee_pct = COALESCE($1, clinic_settings.credit_card_fee_pct),
                debit_card_fee_pct  = COALESCE($2, clinic_settings.debit_card_fee_pct),
                tax_rate_pct        = COALESCE($3, clinic_settings.tax_rate_pct),
                updated_at          = NOW()
            RETURNING credit_card_fee_pct, debit_card_fee_pct, tax_rate_pct, updated_at
            "#,
        )
        .bind(payload.credit_card_fee_pct)
        .bind(payload.debit_card_fee_pct)
        .bind(payload.tax_rate_pct)
        .fetch_one(executor)
        .await?;

        Ok(settings)
    }
}
