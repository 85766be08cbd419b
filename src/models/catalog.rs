// src/models/catalog.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Catálogo de serviços da clínica. A rentabilidade e o mix de atendimentos
// são calculados em cima deste id/nome.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceType {
    pub id: Uuid,

    #[schema(example = "Consulta de avaliação")]
    pub name: String,

    #[schema(example = "200.00")]
    pub price: Decimal,

    pub is_active: bool,

    pub created_at: Option<DateTime<Utc>>,
}
