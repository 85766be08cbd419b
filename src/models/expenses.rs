// src/models/expenses.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Despesa avulsa. O valor total é dividido igualmente em
// `installment_count` meses consecutivos a partir da primeira parcela.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OneOffExpense {
    pub id: Uuid,

    #[schema(example = "Cadeira odontológica")]
    pub description: String,

    #[schema(example = "4800.00")]
    pub total_value: Decimal,

    #[schema(example = "Equipamento")]
    pub category: String,

    #[schema(value_type = String, format = Date, example = "2026-09-01")]
    pub first_installment: NaiveDate,

    // Entre 1 e 48 por política; validado na borda, nunca ajustado
    // silenciosamente dentro do cálculo.
    #[schema(example = 12)]
    pub installment_count: i32,

    pub created_at: Option<DateTime<Utc>>,
}
