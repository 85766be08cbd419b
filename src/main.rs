// src/main.rs

use axum::{
    Router,
    routing::{delete, get, post},
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod models;
mod services;

use crate::config::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Catálogo de serviços da clínica
    let catalog_routes = Router::new().route(
        "/",
        post(handlers::catalog::create_service).get(handlers::catalog::list_services),
    );

    // Catálogo de custos, ledger de confirmação e pagamentos
    let cost_routes = Router::new()
        .route(
            "/",
            post(handlers::costs::create_cost).get(handlers::costs::list_costs),
        )
        .route("/ledger", get(handlers::costs::month_ledger))
        .route("/confirm-month", post(handlers::costs::confirm_month))
        .route("/{id}", delete(handlers::costs::deactivate_cost))
        .route("/{id}/payments", post(handlers::costs::record_payment));

    let expense_routes = Router::new().route(
        "/",
        post(handlers::expenses::create_expense).get(handlers::expenses::list_expenses),
    );

    // Motor de relatórios: economia, período realizado, caixa e metas
    let report_routes = Router::new()
        .route("/profitability", get(handlers::reports::profitability))
        .route("/realized", get(handlers::reports::realized_period))
        .route("/cash-flow", get(handlers::reports::cash_flow))
        .route("/goal-simulation", post(handlers::reports::goal_simulation))
        .route("/break-even", get(handlers::reports::break_even));

    let settings_routes = Router::new().route(
        "/",
        get(handlers::settings::get_settings).put(handlers::settings::update_settings),
    );

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/services", catalog_routes)
        .nest("/api/costs", cost_routes)
        .nest("/api/expenses", expense_routes)
        .nest("/api/reports", report_routes)
        .nest("/api/settings", settings_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
