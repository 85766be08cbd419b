// src/handlers/catalog.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError, config::AppState, handlers::validate_not_negative,
    models::catalog::ServiceType,
};

// ---
// Payload: CreateService
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateServicePayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(custom(function = validate_not_negative))]
    #[schema(example = "200.00")]
    pub price: Decimal,
}

// POST /api/services
#[utoipa::path(
    post,
    path = "/api/services",
    tag = "Catálogo",
    request_body = CreateServicePayload,
    responses(
        (status = 201, description = "Serviço cadastrado", body = ServiceType),
        (status = 400, description = "Payload inválido")
    )
)]
pub async fn create_service(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateServicePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let service = app_state
        .catalog_repo
        .create_service(&app_state.db_pool, &payload.name, payload.price)
        .await?;

    Ok((StatusCode::CREATED, Json(service)))
}

// GET /api/services
#[utoipa::path(
    get,
    path = "/api/services",
    tag = "Catálogo",
    responses(
        (status = 200, description = "Serviços ativos", body = Vec<ServiceType>)
    )
)]
pub async fn list_services(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let services = app_state
        .catalog_repo
        .list_active_services(&app_state.db_pool)
        .await?;

    Ok((StatusCode::OK, Json(services)))
}
