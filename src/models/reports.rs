// src/models/reports.rs
//
// Objetos de saída do motor de cálculo (rentabilidade, fluxo de caixa,
// simulação de metas). São valores puros: a camada de apresentação só
// serializa, nunca recalcula.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Rentabilidade por serviço (visão unitária) ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceProfitability {
    pub service_id: Uuid,
    pub service_name: String,

    pub price: Decimal,

    // Rateio "flat": custo fixo total ÷ número de serviços ativos,
    // ignorando os vínculos custo-serviço de propósito (paridade com os
    // relatórios históricos).
    pub fixed_cost_allocated: Decimal,
    pub variable_cost_allocated: Decimal,

    pub margin: Decimal,
    pub margin_percent: Decimal, // 0 quando price = 0
    pub profitable: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfitabilityReport {
    // Ordenado por margem absoluta, decrescente
    pub services: Vec<ServiceProfitability>,

    pub total_fixed_cost: Decimal,
    pub ticket_medio: Decimal,
    pub variable_cost_per_visit: Decimal,

    // None = ponto de equilíbrio inalcançável (margem média ≤ 0)
    pub break_even: Option<u32>,
}

// --- Período realizado (reconciliação com o volume real) ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RealizedServiceResult {
    pub service_id: Uuid,
    pub service_name: String,

    pub visit_count: u32,
    pub participation_pct: Decimal,

    // Rateio por participação no período, e o ajuste em relação ao que o
    // rateio flat já embutiu na margem unitária.
    pub fixed_cost_rateio: Decimal,
    pub adjustment: Decimal,

    pub realized_profit: Decimal,
    pub realized_margin_per_visit: Decimal,
    pub profitability_bar: Decimal, // 0..100
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RealizedPeriodReport {
    #[schema(value_type = String, format = Date)]
    pub start: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub end: NaiveDate,

    pub months_in_window: u32,
    pub total_visits: u32,

    // Ordenado por lucro realizado, decrescente
    pub results: Vec<RealizedServiceResult>,
}

// --- Ledger de confirmação de custos ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub cost_id: Uuid,
    pub cost_name: String,

    pub estimated_amount: Decimal,

    // Último valor pago nos 3 meses anteriores: default melhor que a
    // estimativa na hora de confirmar o mês.
    pub last_paid_amount: Option<Decimal>,

    pub paid_amount: Option<Decimal>,
    #[schema(value_type = Option<String>, format = Date)]
    pub payment_date: Option<NaiveDate>,

    pub confirmed: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthLedger {
    #[schema(value_type = String, format = Date)]
    pub month: NaiveDate,
    pub entries: Vec<LedgerEntry>,
    pub all_confirmed: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmItemOutcome {
    pub cost_id: Uuid,
    pub cost_name: String,
    pub amount: Option<Decimal>,
    pub success: bool,
    pub error: Option<String>,
}

// Resultado de lote melhor-esforço: uma falha não desfaz as confirmações
// anteriores, então o chamador recebe o placar item a item.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchConfirmOutcome {
    #[schema(value_type = String, format = Date)]
    pub month: NaiveDate,
    pub confirmed: u32,
    pub failed: u32,
    pub items: Vec<ConfirmItemOutcome>,
}

// --- Fluxo de caixa mensal ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyCashFlow {
    #[schema(value_type = String, format = Date)]
    pub month: NaiveDate,

    pub recognized_revenue: Decimal,
    pub projected_revenue: Decimal,

    pub card_fees: Decimal,
    pub projected_card_fees: Decimal,

    pub fixed_actual: Decimal,
    pub fixed_estimated: Decimal,
    pub is_estimated: bool,

    pub variable_costs: Decimal,
    pub one_off_expenses: Decimal,

    pub visit_count: u32,

    pub balance: Decimal,
    pub projected_balance: Decimal,

    pub tax_estimate: Decimal,
    pub net_balance: Decimal,

    // A linha realizada para de acumular no mês corrente; a projetada parte
    // do último valor realizado, então as duas coincidem na fronteira.
    pub accumulated_balance: Option<Decimal>,
    pub accumulated_projected: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowReport {
    #[schema(value_type = String, format = Date)]
    pub start: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub end: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub current_month: NaiveDate,

    pub rows: Vec<MonthlyCashFlow>,
}

// --- Simulador de metas ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GoalServiceTarget {
    pub service_id: Uuid,
    pub service_name: String,

    // Histórico dos últimos 3 meses
    pub historical_monthly_volume: Decimal,
    pub mix_pct: Decimal,

    pub unit_net_margin: Decimal,

    pub suggested_volume: u32,
    pub capped: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GoalSimulation {
    pub goal: Decimal,

    pub feasible: bool,
    pub weighted_margin: Decimal,

    // None quando a simulação é inviável (margem ponderada ≤ 0): volume
    // "infinito", nunca um número finito enganoso.
    pub required_volume_total: Option<u32>,

    pub targets: Vec<GoalServiceTarget>,

    // Agregados recalculados a partir dos volumes já limitados pelos tetos
    // de crescimento, não do número teórico.
    pub required_revenue: Decimal,
    pub achievable_net_income: Decimal,

    pub viable: bool,    // líquido alcançável ≥ 95% da meta e volume < 500
    pub reachable: bool, // checagem cruzada, limiar de 90%

    pub alerts: Vec<String>,
    pub insights: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyGoalStatus {
    #[schema(value_type = String, format = Date)]
    pub month: NaiveDate,
    pub actual_net: Decimal,
    pub diff: Decimal,
    pub running_total: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct YearCompensation {
    pub months: Vec<MonthlyGoalStatus>,
    pub running_total: Decimal,
    pub months_remaining: u32,

    // Meta mensal ajustada para os meses restantes quando há déficit
    // acumulado; informativa, nunca substitui a meta original.
    pub adjusted_goal: Option<Decimal>,
}
