// src/models/costs.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "cost_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "snake_case")]
pub enum CostKind {
    Fixed,    // Custo fixo (aluguel, equipe)
    Variable, // Custo variável (insumos por atendimento)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "cost_frequency", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "snake_case")]
pub enum CostFrequency {
    Monthly,    // Recorrente mensal
    PerVisit,   // Incide por atendimento
    Occasional, // Avulso, fora dos totais recorrentes
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "application_mode", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "snake_case")]
pub enum ApplicationMode {
    Full,     // O serviço responde por 100% do custo
    Prorated, // Rateio parcial (percentual)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "cost_payment_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "snake_case")]
pub enum CostPaymentStatus {
    Pending,
    Paid,
    Estimated,
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Cost {
    pub id: Uuid,

    #[schema(example = "Aluguel da sala")]
    pub name: String,

    #[schema(example = "3000.00")]
    pub amount: Decimal,

    pub kind: CostKind,
    pub frequency: CostFrequency,

    // Soft delete: custos nunca são removidos, apenas desativados,
    // para preservar o histórico de confirmações.
    pub is_active: bool,

    pub note: Option<String>,

    pub created_at: Option<DateTime<Utc>>,
}

// Vínculo custo ↔ serviço. Criado uma única vez no cadastro do custo
// (snapshot); não é re-derivado dos serviços ativos na leitura.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CostServiceLink {
    pub id: Uuid,
    pub cost_id: Uuid,
    pub service_id: Uuid,

    pub mode: ApplicationMode,

    // Percentual de responsabilidade do serviço sobre o custo (0 a 100).
    // Modo Full implica 100.
    #[schema(example = "100.00")]
    pub percentage: Decimal,
}

// No máximo uma linha por (custo, mês de referência). O mês de referência
// é sempre o dia 1 e nunca muda depois de criado; re-salvar atualiza a
// mesma linha.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CostPayment {
    pub id: Uuid,
    pub cost_id: Uuid,

    #[schema(value_type = String, format = Date, example = "2026-08-01")]
    pub month_reference: NaiveDate,

    #[schema(example = "2950.00")]
    pub paid_amount: Decimal,

    #[schema(value_type = String, format = Date, example = "2026-08-05")]
    pub payment_date: NaiveDate,

    pub status: CostPaymentStatus,

    pub created_at: Option<DateTime<Utc>>,
}

impl Cost {
    /// Custo recorrente mensal (entra nos totais fixos/variáveis do fluxo).
    pub fn is_recurring(&self) -> bool {
        self.is_active && self.frequency == CostFrequency::Monthly
    }
}
