// src/handlers/costs.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::{validate_not_negative, validate_percentage},
    models::{
        costs::{Cost, CostFrequency, CostKind, CostPayment, CostServiceLink},
        reports::{BatchConfirmOutcome, MonthLedger},
    },
    services::cost_catalog::CostApplicability,
};

// ---
// Payload: CreateCost
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCostPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(custom(function = validate_not_negative))]
    #[schema(example = "3000.00")]
    pub amount: Decimal,

    pub kind: CostKind,
    pub frequency: CostFrequency,

    pub note: Option<String>,

    // Regra de aplicabilidade; omitida = todos os serviços ativos (snapshot)
    pub applicability: Option<CostApplicability>,
}

impl CreateCostPayload {
    // Percentuais da lista explícita também passam pela borda: o motor de
    // cálculo nunca recebe rateio fora de [0, 100].
    fn validate_applicability(&self) -> Result<(), ValidationError> {
        if let Some(CostApplicability::Services { services }) = &self.applicability {
            for spec in services {
                if let Some(pct) = spec.percentage {
                    validate_percentage(&pct)?;
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedCostResponse {
    pub cost: Cost,
    pub links: Vec<CostServiceLink>,
}

// POST /api/costs
#[utoipa::path(
    post,
    path = "/api/costs",
    tag = "Custos",
    request_body = CreateCostPayload,
    responses(
        (status = 201, description = "Custo cadastrado com vínculos de rateio", body = CreatedCostResponse),
        (status = 400, description = "Payload inválido"),
        (status = 404, description = "Serviço da lista de aplicabilidade não encontrado")
    )
)]
pub async fn create_cost(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateCostPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    payload.validate_applicability().map_err(|e| {
        let mut errors = validator::ValidationErrors::new();
        errors.add("applicability", e);
        AppError::ValidationError(errors)
    })?;

    let applicability = payload.applicability.unwrap_or(CostApplicability::All);

    let (cost, links) = app_state
        .cost_catalog_service
        .create_cost(
            &app_state.db_pool,
            &payload.name,
            payload.amount,
            payload.kind,
            payload.frequency,
            payload.note.as_deref(),
            applicability,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(CreatedCostResponse { cost, links })))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListCostsQuery {
    pub kind: Option<CostKind>,
    pub frequency: Option<CostFrequency>,
}

// GET /api/costs
#[utoipa::path(
    get,
    path = "/api/costs",
    tag = "Custos",
    params(
        ("kind" = Option<CostKind>, Query, description = "Filtra por tipo"),
        ("frequency" = Option<CostFrequency>, Query, description = "Filtra por frequência")
    ),
    responses(
        (status = 200, description = "Custos ativos", body = Vec<Cost>)
    )
)]
pub async fn list_costs(
    State(app_state): State<AppState>,
    Query(query): Query<ListCostsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let costs = app_state
        .cost_catalog_service
        .list_costs(&app_state.db_pool, query.kind, query.frequency)
        .await?;

    Ok((StatusCode::OK, Json(costs)))
}

// DELETE /api/costs/{id}
#[utoipa::path(
    delete,
    path = "/api/costs/{id}",
    tag = "Custos",
    params(("id" = Uuid, Path, description = "ID do custo")),
    responses(
        (status = 204, description = "Custo desativado"),
        (status = 404, description = "Custo não encontrado")
    )
)]
pub async fn deactivate_cost(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .cost_catalog_service
        .deactivate_cost(&app_state.db_pool, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ---
// Payload: RecordPayment
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaymentPayload {
    #[schema(value_type = String, format = Date, example = "2026-08-01")]
    pub month: NaiveDate,

    #[validate(custom(function = validate_not_negative))]
    #[schema(example = "2950.00")]
    pub amount: Decimal,

    #[schema(value_type = String, format = Date, example = "2026-08-05")]
    pub payment_date: NaiveDate,
}

// POST /api/costs/{id}/payments
#[utoipa::path(
    post,
    path = "/api/costs/{id}/payments",
    tag = "Custos",
    params(("id" = Uuid, Path, description = "ID do custo")),
    request_body = RecordPaymentPayload,
    responses(
        (status = 200, description = "Pagamento registrado (upsert por custo/mês)", body = CostPayment),
        (status = 404, description = "Custo não encontrado")
    )
)]
pub async fn record_payment(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecordPaymentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let payment = app_state
        .cost_ledger_service
        .record_payment(
            &app_state.db_pool,
            id,
            payload.month,
            payload.amount,
            payload.payment_date,
        )
        .await?;

    Ok((StatusCode::OK, Json(payment)))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmMonthPayload {
    #[schema(value_type = String, format = Date, example = "2026-08-01")]
    pub month: NaiveDate,
}

// POST /api/costs/confirm-month
#[utoipa::path(
    post,
    path = "/api/costs/confirm-month",
    tag = "Custos",
    request_body = ConfirmMonthPayload,
    responses(
        (status = 200, description = "Placar da confirmação em lote (melhor-esforço)", body = BatchConfirmOutcome)
    )
)]
pub async fn confirm_month(
    State(app_state): State<AppState>,
    Json(payload): Json<ConfirmMonthPayload>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = app_state
        .cost_ledger_service
        .confirm_all_pending(&app_state.db_pool, payload.month)
        .await?;

    Ok((StatusCode::OK, Json(outcome)))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerQuery {
    #[schema(value_type = String, format = Date, example = "2026-08-01")]
    pub month: NaiveDate,
}

// GET /api/costs/ledger?month=2026-08-01
#[utoipa::path(
    get,
    path = "/api/costs/ledger",
    tag = "Custos",
    params(("month" = String, Query, description = "Mês de referência (dia 1)")),
    responses(
        (status = 200, description = "Ledger do mês: confirmados × pendentes", body = MonthLedger)
    )
)]
pub async fn month_ledger(
    State(app_state): State<AppState>,
    Query(query): Query<LedgerQuery>,
) -> Result<impl IntoResponse, AppError> {
    let ledger = app_state
        .cost_ledger_service
        .month_ledger(&app_state.db_pool, query.month)
        .await?;

    Ok((StatusCode::OK, Json(ledger)))
}
