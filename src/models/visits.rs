// src/models/visits.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "visit_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "snake_case")]
pub enum VisitStatus {
    Pending,
    Confirmed,
    Done,
    NoShow,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub id: Uuid,
    pub service_id: Uuid,

    pub scheduled_at: DateTime<Utc>,

    pub status: VisitStatus,

    // Flag independente do status: um atendimento cancelado sai das
    // contagens financeiras mesmo que o status ainda não reflita isso.
    pub cancelled: bool,

    // Valor do atendimento; quando nulo, vale o preço do serviço.
    pub value: Option<Decimal>,
}

impl Visit {
    /// Atendimento que conta para o financeiro: realizado e não cancelado.
    pub fn counts_for_finance(&self) -> bool {
        self.status == VisitStatus::Done && !self.cancelled
    }
}
