// src/handlers/expenses.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError, config::AppState, handlers::validate_not_negative,
    models::expenses::OneOffExpense,
};

// ---
// Payload: CreateExpense
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpensePayload {
    #[validate(length(min = 1, message = "A descrição é obrigatória."))]
    pub description: String,

    #[validate(custom(function = validate_not_negative))]
    #[schema(example = "4800.00")]
    pub total_value: Decimal,

    #[validate(length(min = 1, message = "A categoria é obrigatória."))]
    pub category: String,

    #[schema(value_type = String, format = Date, example = "2026-09-01")]
    pub first_installment: NaiveDate,

    // Rejeitado na borda, nunca ajustado dentro do cálculo
    #[validate(range(min = 1, max = 48, message = "Parcelamento deve ficar entre 1 e 48 meses."))]
    #[schema(example = 12)]
    pub installment_count: i32,
}

// POST /api/expenses
#[utoipa::path(
    post,
    path = "/api/expenses",
    tag = "Despesas",
    request_body = CreateExpensePayload,
    responses(
        (status = 201, description = "Despesa avulsa cadastrada", body = OneOffExpense),
        (status = 400, description = "Payload inválido")
    )
)]
pub async fn create_expense(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateExpensePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let expense = app_state
        .billing_repo
        .create_expense(
            &app_state.db_pool,
            &payload.description,
            payload.total_value,
            &payload.category,
            payload.first_installment,
            payload.installment_count,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(expense)))
}

// GET /api/expenses
#[utoipa::path(
    get,
    path = "/api/expenses",
    tag = "Despesas",
    responses(
        (status = 200, description = "Despesas avulsas", body = Vec<OneOffExpense>)
    )
)]
pub async fn list_expenses(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let expenses = app_state.billing_repo.list_expenses(&app_state.db_pool).await?;

    Ok((StatusCode::OK, Json(expenses)))
}
