// src/models/settings.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClinicSettings {
    // Taxas de cartão em percentual (ex.: 3.5 = 3,5%)
    #[schema(example = "3.50")]
    pub credit_card_fee_pct: Decimal,

    #[schema(example = "1.80")]
    pub debit_card_fee_pct: Decimal,

    // Alíquota simplificada aplicada sobre a receita para estimar o líquido
    #[schema(example = "6.00")]
    pub tax_rate_pct: Decimal,

    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for ClinicSettings {
    fn default() -> Self {
        Self {
            credit_card_fee_pct: Decimal::ZERO,
            debit_card_fee_pct: Decimal::ZERO,
            tax_rate_pct: Decimal::ZERO,
            updated_at: None,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    #[schema(example = "3.50")]
    pub credit_card_fee_pct: Option<Decimal>,

    #[schema(example = "1.80")]
    pub debit_card_fee_pct: Option<Decimal>,

    #[schema(example = "6.00")]
    pub tax_rate_pct: Option<Decimal>,
}
