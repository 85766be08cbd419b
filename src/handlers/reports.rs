// src/handlers/reports.rs
//
// Superfície fina sobre o motor de cálculo: busca, valida a borda e devolve
// os objetos de relatório como vieram do motor.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::validate_not_negative,
    models::reports::{
        CashFlowReport, GoalSimulation, ProfitabilityReport, RealizedPeriodReport,
        YearCompensation,
    },
    services::goal::MonthlyActual,
};

// GET /api/reports/profitability
#[utoipa::path(
    get,
    path = "/api/reports/profitability",
    tag = "Relatórios",
    responses(
        (status = 200, description = "Economia unitária por serviço (rateio flat)", body = ProfitabilityReport)
    )
)]
pub async fn profitability(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let report = app_state
        .profitability_service
        .report(&app_state.db_pool)
        .await?;

    Ok((StatusCode::OK, Json(report)))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RealizedQuery {
    #[schema(value_type = String, format = Date, example = "2026-06-01")]
    pub start: NaiveDate,
    #[schema(value_type = String, format = Date, example = "2026-08-31")]
    pub end: NaiveDate,
}

// GET /api/reports/realized?start=&end=
#[utoipa::path(
    get,
    path = "/api/reports/realized",
    tag = "Relatórios",
    params(
        ("start" = String, Query, description = "Início da janela"),
        ("end" = String, Query, description = "Fim da janela (inclusivo)")
    ),
    responses(
        (status = 200, description = "Economia realizada no período, rateio por participação", body = RealizedPeriodReport),
        (status = 400, description = "Janela inválida")
    )
)]
pub async fn realized_period(
    State(app_state): State<AppState>,
    Query(query): Query<RealizedQuery>,
) -> Result<impl IntoResponse, AppError> {
    let report = app_state
        .realized_service
        .report(&app_state.db_pool, query.start, query.end)
        .await?;

    Ok((StatusCode::OK, Json(report)))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowQuery {
    // 3, 6 ou 12 meses retroativos
    pub months_back: Option<u32>,
    pub months_forward: Option<u32>,
}

// GET /api/reports/cash-flow?monthsBack=6&monthsForward=3
#[utoipa::path(
    get,
    path = "/api/reports/cash-flow",
    tag = "Relatórios",
    params(
        ("monthsBack" = Option<u32>, Query, description = "Janela retroativa: 3, 6 ou 12 (default 3)"),
        ("monthsForward" = Option<u32>, Query, description = "Projeção à frente (default 3)")
    ),
    responses(
        (status = 200, description = "Fluxo de caixa mensal realizado × projetado", body = CashFlowReport),
        (status = 400, description = "Janela inválida")
    )
)]
pub async fn cash_flow(
    State(app_state): State<AppState>,
    Query(query): Query<CashFlowQuery>,
) -> Result<impl IntoResponse, AppError> {
    let report = app_state
        .cashflow_service
        .report(
            &app_state.db_pool,
            query.months_back.unwrap_or(3),
            query.months_forward.unwrap_or(3),
        )
        .await?;

    Ok((StatusCode::OK, Json(report)))
}

// ---
// Payload: GoalSimulation
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GoalSimulationPayload {
    #[validate(custom(function = validate_not_negative))]
    #[schema(example = "10000.00")]
    pub goal: Decimal,

    // Realizado mês a mês do ano corrente, para o cálculo da meta ajustada
    pub monthly_actuals: Option<Vec<MonthlyActual>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GoalSimulationResponse {
    pub simulation: GoalSimulation,
    pub year_compensation: Option<YearCompensation>,
}

// POST /api/reports/goal-simulation
#[utoipa::path(
    post,
    path = "/api/reports/goal-simulation",
    tag = "Relatórios",
    request_body = GoalSimulationPayload,
    responses(
        (status = 200, description = "Distribuição de volume por serviço para a meta", body = GoalSimulationResponse),
        (status = 400, description = "Payload inválido")
    )
)]
pub async fn goal_simulation(
    State(app_state): State<AppState>,
    Json(payload): Json<GoalSimulationPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let (simulation, year_compensation) = app_state
        .goal_service
        .simulate(&app_state.db_pool, payload.goal, payload.monthly_actuals)
        .await?;

    Ok((
        StatusCode::OK,
        Json(GoalSimulationResponse { simulation, year_compensation }),
    ))
}

// GET /api/reports/break-even
#[utoipa::path(
    get,
    path = "/api/reports/break-even",
    tag = "Relatórios",
    responses(
        (status = 200, description = "Distribuição de equilíbrio (meta zero)", body = GoalSimulation)
    )
)]
pub async fn break_even(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let simulation = app_state.goal_service.break_even(&app_state.db_pool).await?;

    Ok((StatusCode::OK, Json(simulation)))
}
