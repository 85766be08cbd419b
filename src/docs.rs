// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Catálogo ---
        handlers::catalog::create_service,
        handlers::catalog::list_services,

        // --- Custos ---
        handlers::costs::create_cost,
        handlers::costs::list_costs,
        handlers::costs::deactivate_cost,
        handlers::costs::record_payment,
        handlers::costs::confirm_month,
        handlers::costs::month_ledger,

        // --- Despesas ---
        handlers::expenses::create_expense,
        handlers::expenses::list_expenses,

        // --- Relatórios ---
        handlers::reports::profitability,
        handlers::reports::realized_period,
        handlers::reports::cash_flow,
        handlers::reports::goal_simulation,
        handlers::reports::break_even,

        // --- Configurações ---
        handlers::settings::get_settings,
        handlers::settings::update_settings,
    ),
    components(
        schemas(
            // --- Catálogo ---
            models::catalog::ServiceType,
            handlers::catalog::CreateServicePayload,

            // --- Custos ---
            models::costs::CostKind,
            models::costs::CostFrequency,
            models::costs::ApplicationMode,
            models::costs::CostPaymentStatus,
            models::costs::Cost,
            models::costs::CostServiceLink,
            models::costs::CostPayment,
            services::cost_catalog::CostApplicability,
            services::cost_catalog::ServiceLinkSpec,
            handlers::costs::CreateCostPayload,
            handlers::costs::CreatedCostResponse,
            handlers::costs::RecordPaymentPayload,
            handlers::costs::ConfirmMonthPayload,

            // --- Despesas ---
            models::expenses::OneOffExpense,
            handlers::expenses::CreateExpensePayload,

            // --- Configurações ---
            models::settings::ClinicSettings,
            models::settings::UpdateSettingsRequest,

            // --- Relatórios ---
            models::reports::ServiceProfitability,
            models::reports::ProfitabilityReport,
            models::reports::RealizedServiceResult,
            models::reports::RealizedPeriodReport,
            models::reports::LedgerEntry,
            models::reports::MonthLedger,
            models::reports::ConfirmItemOutcome,
            models::reports::BatchConfirmOutcome,
            models::reports::MonthlyCashFlow,
            models::reports::CashFlowReport,
            models::reports::GoalServiceTarget,
            models::reports::GoalSimulation,
            models::reports::MonthlyGoalStatus,
            models::reports::YearCompensation,
            services::goal::MonthlyActual,
            handlers::reports::GoalSimulationPayload,
            handlers::reports::GoalSimulationResponse,
        )
    ),
    tags(
        (name = "Catálogo", description = "Serviços oferecidos pela clínica"),
        (name = "Custos", description = "Catálogo de custos, rateio e ledger de confirmação"),
        (name = "Despesas", description = "Despesas avulsas parceladas"),
        (name = "Relatórios", description = "Economia, período realizado, fluxo de caixa e metas"),
        (name = "Configurações", description = "Taxas de cartão e alíquota")
    )
)]
pub struct ApiDoc;
