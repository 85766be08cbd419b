// src/services/goal.rs
//
// Simulador de metas: inverte o modelo de rentabilidade para responder
// "quantos atendimentos de cada serviço precisam acontecer para atingir um
// líquido mensal alvo", respeitando tetos de crescimento por serviço.

use chrono::{Datelike, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;
use sqlx::PgPool;
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::{error::AppError, period},
    db::{ScheduleRepository, SettingsRepository},
    models::{
        reports::{
            GoalServiceTarget, GoalSimulation, MonthlyGoalStatus, ProfitabilityReport,
            YearCompensation,
        },
        settings::ClinicSettings,
        visits::Visit,
    },
    services::ProfitabilityService,
};

// Tetos de sanidade da simulação
const HARD_VOLUME_CEILING: u32 = 500;
const LOW_MIX_THRESHOLD_PCT: u32 = 5;
const ZERO_HISTORY_CAP: u32 = 2;

/// Mix assumido de métodos de pagamento para a taxa de cartão combinada:
/// 70% crédito / 30% débito. Premissa fixa do produto, não derivada do
/// histórico real de métodos.
fn blended_card_rate(settings: &ClinicSettings) -> Decimal {
    let hundred = Decimal::from(100);
    (settings.credit_card_fee_pct * Decimal::new(7, 1)
        + settings.debit_card_fee_pct * Decimal::new(3, 1))
        / hundred
}

fn ceil_u32(value: Decimal) -> u32 {
    value.ceil().to_u32().unwrap_or(u32::MAX)
}

pub fn simulate_goal(
    goal: Decimal,
    profitability: &ProfitabilityReport,
    trailing_visits: &[Visit],
    settings: &ClinicSettings,
) -> GoalSimulation {
    let hundred = Decimal::from(100);
    let three = Decimal::from(3);

    // 1. Mix histórico dos últimos 3 meses
    let mut counts: HashMap<Uuid, u32> = HashMap::new();
    for v in trailing_visits.iter().filter(|v| v.counts_for_finance()) {
        *counts.entry(v.service_id).or_insert(0) += 1;
    }
    let total_count: u32 = counts.values().sum();

    let blended = blended_card_rate(settings);

    // 2. Margem líquida unitária para fins de meta: o custo fixo NÃO entra
    // aqui — ele é abatido uma única vez no agregado (passo 4).
    struct Row {
        service_id: Uuid,
        service_name: String,
        price: Decimal,
        count: u32,
        volume_mensal: Decimal,
        mix_pct: Decimal,
        unit_net_margin: Decimal,
    }

    let rows: Vec<Row> = profitability
        .services
        .iter()
        .map(|p| {
            let count = counts.get(&p.service_id).copied().unwrap_or(0);
            let mix_pct = if total_count > 0 {
                Decimal::from(count) * hundred / Decimal::from(total_count)
            } else {
                Decimal::ZERO
            };
            Row {
                service_id: p.service_id,
                service_name: p.service_name.clone(),
                price: p.price,
                count,
                volume_mensal: Decimal::from(count) / three,
                mix_pct,
                unit_net_margin: p.price - p.variable_cost_allocated - p.price * blended,
            }
        })
        .collect();

    // 3. Margem média ponderada pelo mix
    let weighted_margin: Decimal =
        rows.iter().map(|r| r.unit_net_margin * r.mix_pct / hundred).sum();

    let mut alerts: Vec<String> = Vec::new();

    if weighted_margin <= Decimal::ZERO {
        // Inviável: volume "infinito". Nunca distribuir nem devolver um
        // número finito enganoso; o motivo vai explícito no alerta.
        alerts.push(if total_count == 0 {
            "Sem histórico de atendimentos nos últimos 3 meses: não há mix para simular."
                .to_string()
        } else {
            format!(
                "Margem média ponderada não positiva ({weighted_margin:.2}): \
                 a meta é inatingível em qualquer volume. Revise preços e custos variáveis."
            )
        });

        let targets = rows
            .into_iter()
            .map(|r| GoalServiceTarget {
                service_id: r.service_id,
                service_name: r.service_name,
                historical_monthly_volume: r.volume_mensal,
                mix_pct: r.mix_pct,
                unit_net_margin: r.unit_net_margin,
                suggested_volume: 0,
                capped: false,
            })
            .collect();

        return GoalSimulation {
            goal,
            feasible: false,
            weighted_margin,
            required_volume_total: None,
            targets,
            required_revenue: Decimal::ZERO,
            achievable_net_income: Decimal::ZERO,
            viable: false,
            reachable: false,
            alerts,
            insights: vec![
                "Nenhuma distribuição de volume cobre o custo fixo com a margem atual."
                    .to_string(),
            ],
        };
    }

    // 4. Volume total teórico (o fixo entra uma única vez, aqui)
    let gross_needed = goal + profitability.total_fixed_cost;
    let theoretical_total = if gross_needed > Decimal::ZERO {
        ceil_u32(gross_needed / weighted_margin)
    } else {
        0
    };

    // 5. Distribui pelo mix e aplica os tetos de crescimento
    let mut targets: Vec<GoalServiceTarget> = Vec::with_capacity(rows.len());
    let mut required_revenue = Decimal::ZERO;
    for r in &rows {
        let raw = ceil_u32(Decimal::from(theoretical_total) * r.mix_pct / hundred);
        let mut volume = raw;
        let mut capped = false;

        if r.count == 0 {
            if volume > ZERO_HISTORY_CAP {
                volume = ZERO_HISTORY_CAP;
                capped = true;
                alerts.push(format!(
                    "'{}' não tem histórico: sugestão limitada a {} atendimentos/mês.",
                    r.service_name, ZERO_HISTORY_CAP
                ));
            }
        } else if r.mix_pct < Decimal::from(LOW_MIX_THRESHOLD_PCT) {
            // Serviço de nicho (< 5% do mix) não cresce mais que 30% sobre o
            // volume histórico de uma vez.
            let cap = ceil_u32(r.volume_mensal * Decimal::new(13, 1));
            if volume > cap {
                volume = cap;
                capped = true;
                alerts.push(format!(
                    "'{}' representa menos de 5% do mix: crescimento limitado a {} atendimentos/mês (histórico {:.1}).",
                    r.service_name, cap, r.volume_mensal
                ));
            }
        }

        required_revenue += r.price * Decimal::from(volume);
        targets.push(GoalServiceTarget {
            service_id: r.service_id,
            service_name: r.service_name.clone(),
            historical_monthly_volume: r.volume_mensal,
            mix_pct: r.mix_pct,
            unit_net_margin: r.unit_net_margin,
            suggested_volume: volume,
            capped,
        });
    }

    // 6. Agregados recalculados a partir dos volumes JÁ limitados
    let capped_total: u32 = targets.iter().map(|t| t.suggested_volume).sum();
    let achievable_net_income: Decimal = targets
        .iter()
        .map(|t| t.unit_net_margin * Decimal::from(t.suggested_volume))
        .sum::<Decimal>()
        - profitability.total_fixed_cost;

    // 7. Viabilidade: 95% da meta para "viável", 90% para "alcançável",
    // mais o teto duro de volume mensal.
    let within_ceiling = capped_total < HARD_VOLUME_CEILING;
    let viable = within_ceiling
        && achievable_net_income >= goal * Decimal::new(95, 2);
    let reachable = within_ceiling
        && achievable_net_income >= goal * Decimal::new(90, 2);

    if !within_ceiling {
        alerts.push(format!(
            "Volume total sugerido ({capped_total}) acima do teto de sanidade de {HARD_VOLUME_CEILING} atendimentos/mês."
        ));
    }

    let insights = build_insights(goal, achievable_net_income, &targets);

    GoalSimulation {
        goal,
        feasible: true,
        weighted_margin,
        required_volume_total: Some(theoretical_total),
        targets,
        required_revenue,
        achievable_net_income,
        viable,
        reachable,
        alerts,
        insights,
    }
}

/// Distribuição de ponto de equilíbrio: a mesma simulação com meta zero.
pub fn break_even_distribution(
    profitability: &ProfitabilityReport,
    trailing_visits: &[Visit],
    settings: &ClinicSettings,
) -> GoalSimulation {
    simulate_goal(Decimal::ZERO, profitability, trailing_visits, settings)
}

/// Compensação do ano corrente: compara o realizado mês a mês com a meta e,
/// havendo déficit acumulado, calcula a meta mensal ajustada para os meses
/// restantes. O ajuste é informativo — nunca substitui a meta original.
pub fn year_to_date_compensation(
    target: Decimal,
    actuals: &[(NaiveDate, Decimal)],
) -> YearCompensation {
    let mut months: Vec<MonthlyGoalStatus> = Vec::with_capacity(actuals.len());
    let mut running_total = Decimal::ZERO;
    let mut last_month: u32 = 0;

    let mut sorted: Vec<&(NaiveDate, Decimal)> = actuals.iter().collect();
    sorted.sort_by_key(|(month, _)| *month);

    for (month, actual_net) in sorted {
        let diff = *actual_net - target;
        running_total += diff;
        last_month = month.month();
        months.push(MonthlyGoalStatus {
            month: period::first_of_month(*month),
            actual_net: *actual_net,
            diff,
            running_total,
        });
    }

    let months_remaining = 12u32.saturating_sub(last_month);

    let adjusted_goal = if running_total < Decimal::ZERO && months_remaining > 0 {
        let remaining = Decimal::from(months_remaining);
        Some((target * remaining - running_total) / remaining)
    } else {
        None
    };

    YearCompensation { months, running_total, months_remaining, adjusted_goal }
}

// Texto consultivo derivado de limiares fixos: informativo, determinístico
// para a mesma entrada.
fn build_insights(
    goal: Decimal,
    achievable: Decimal,
    targets: &[GoalServiceTarget],
) -> Vec<String> {
    let mut insights = Vec::new();

    if goal > Decimal::ZERO {
        let ratio = achievable / goal;
        if ratio >= Decimal::new(80, 2) && ratio < Decimal::new(95, 2) {
            insights.push(
                "O resultado projetado fica entre 80% e 95% da meta: pequenos ajustes de \
                 preço ou volume fecham a diferença."
                    .to_string(),
            );
        } else if ratio >= Decimal::ONE {
            insights.push("A distribuição sugerida cobre a meta integralmente.".to_string());
        }
    }

    if achievable > Decimal::ZERO {
        let threshold = achievable / Decimal::from(10);
        for t in targets {
            let contribution = t.unit_net_margin * Decimal::from(t.suggested_volume);
            if contribution > threshold {
                insights.push(format!(
                    "'{}' responde por mais de 10% do resultado líquido projetado.",
                    t.service_name
                ));
            }
        }
    }

    if targets.iter().any(|t| t.capped) {
        insights.push(
            "Parte da distribuição foi limitada pelos tetos de crescimento; o volume \
             restante foi mantido nos demais serviços."
                .to_string(),
        );
    }

    insights
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyActual {
    #[schema(value_type = String, format = Date, example = "2026-03-01")]
    pub month: NaiveDate,
    pub actual_net: Decimal,
}

#[derive(Clone)]
pub struct GoalService {
    profitability: ProfitabilityService,
    schedule_repo: ScheduleRepository,
    settings_repo: SettingsRepository,
}

impl GoalService {
    pub fn new(
        profitability: ProfitabilityService,
        schedule_repo: ScheduleRepository,
        settings_repo: SettingsRepository,
    ) -> Self {
        Self { profitability, schedule_repo, settings_repo }
    }

    async fn trailing_visits(&self, pool: &PgPool) -> Result<Vec<Visit>, AppError> {
        let today = Utc::now().date_naive();
        let start = period::sub_months(period::first_of_month(today), 3);
        let window_start =
            Utc.from_utc_datetime(&start.and_hms_opt(0, 0, 0).unwrap_or_default());
        let window_end = Utc.from_utc_datetime(
            &period::first_of_month(today).and_hms_opt(0, 0, 0).unwrap_or_default(),
        );
        self.schedule_repo.done_visits_between(pool, window_start, window_end).await
    }

    pub async fn simulate(
        &self,
        pool: &PgPool,
        goal: Decimal,
        actuals: Option<Vec<MonthlyActual>>,
    ) -> Result<(GoalSimulation, Option<YearCompensation>), AppError> {
        let profitability = self.profitability.report(pool).await?;
        let visits = self.trailing_visits(pool).await?;
        let settings = self.settings_repo.get_settings(pool).await?;

        let simulation = simulate_goal(goal, &profitability, &visits, &settings);

        let compensation = actuals.map(|list| {
            let pairs: Vec<(NaiveDate, Decimal)> =
                list.into_iter().map(|a| (a.month, a.actual_net)).collect();
            year_to_date_compensation(goal, &pairs)
        });

        Ok((simulation, compensation))
    }

    pub async fn break_even(&self, pool: &PgPool) -> Result<GoalSimulation, AppError> {
        let profitability = self.profitability.report(pool).await?;
        let visits = self.trailing_visits(pool).await?;
        let settings = self.settings_repo.get_settings(pool).await?;

        Ok(break_even_distribution(&profitability, &visits, &settings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::costs::{CostFrequency, CostKind};
    use crate::models::visits::VisitStatus;
    use crate::services::profitability::{calculate_profitability, test_fixtures::*};
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn done_visits(service_id: Uuid, count: u32) -> Vec<Visit> {
        (0..count)
            .map(|_| Visit {
                id: Uuid::new_v4(),
                service_id,
                scheduled_at: Utc
                    .from_utc_datetime(&d(2026, 7, 10).and_hms_opt(9, 0, 0).unwrap()),
                status: VisitStatus::Done,
                cancelled: false,
                value: None,
            })
            .collect()
    }

    fn no_fee_settings() -> ClinicSettings {
        ClinicSettings {
            credit_card_fee_pct: dec!(0),
            debit_card_fee_pct: dec!(0),
            tax_rate_pct: dec!(0),
            updated_at: None,
        }
    }

    // Margem unitária de 50 (preço 60, variável global 10), fixo 5000.
    fn base_report(services: &[crate::models::catalog::ServiceType]) -> ProfitabilityReport {
        let costs = vec![
            cost("Estrutura", dec!(5000), CostKind::Fixed, CostFrequency::Monthly),
            cost("Insumos", dec!(10), CostKind::Variable, CostFrequency::PerVisit),
        ];
        calculate_profitability(&costs, &[], services)
    }

    #[test]
    fn volume_necessario_e_teto_da_divisao() {
        // goal 10000 + fixo 5000, margem ponderada 50 → ceil(15000/50) = 300
        let a = service("A", dec!(60));
        let report = base_report(&[a.clone()]);
        let visits = done_visits(a.id, 30);

        let sim = simulate_goal(dec!(10000), &report, &visits, &no_fee_settings());

        assert!(sim.feasible);
        assert_eq!(sim.weighted_margin, dec!(50));
        assert_eq!(sim.required_volume_total, Some(300));
        assert_eq!(sim.targets[0].suggested_volume, 300);
        assert_eq!(sim.achievable_net_income, dec!(10000));
        assert!(sim.viable);
        assert!(sim.reachable);
    }

    #[test]
    fn margem_ponderada_nao_positiva_e_inviavel_sem_numero_enganoso() {
        let a = service("A", dec!(100));
        let costs = vec![
            cost("Estrutura", dec!(5000), CostKind::Fixed, CostFrequency::Monthly),
            cost("Insumo caro", dec!(150), CostKind::Variable, CostFrequency::PerVisit),
        ];
        let report = calculate_profitability(&costs, &[], &[a.clone()]);
        let visits = done_visits(a.id, 30);

        let sim = simulate_goal(dec!(10000), &report, &visits, &no_fee_settings());

        assert!(!sim.feasible);
        assert_eq!(sim.required_volume_total, None);
        assert!(!sim.viable);
        assert!(!sim.alerts.is_empty());
        assert!(sim.targets.iter().all(|t| t.suggested_volume == 0));
    }

    #[test]
    fn sem_historico_nenhum_a_simulacao_e_inviavel() {
        let a = service("A", dec!(60));
        let report = base_report(&[a]);

        let sim = simulate_goal(dec!(10000), &report, &[], &no_fee_settings());

        assert!(!sim.feasible);
        assert!(sim.alerts[0].contains("Sem histórico"));
    }

    #[test]
    fn servico_de_nicho_respeita_o_teto_de_crescimento() {
        let a = service("A", dec!(60));
        let b = service("B", dec!(60));
        let report = base_report(&[a.clone(), b.clone()]);

        // A: 48 atendimentos (96% do mix); B: 2 (4%, nicho)
        let mut visits = done_visits(a.id, 48);
        visits.extend(done_visits(b.id, 2));

        let sim = simulate_goal(dec!(10000), &report, &visits, &no_fee_settings());

        let target_b = sim.targets.iter().find(|t| t.service_id == b.id).unwrap();
        // Histórico mensal de B = 2/3; teto = ceil(1.3 × 2/3) = 1
        let cap = ceil_u32(target_b.historical_monthly_volume * dec!(1.3));
        assert!(target_b.capped);
        assert_eq!(target_b.suggested_volume, cap);
        assert!(target_b.suggested_volume <= cap);
        assert!(sim.alerts.iter().any(|a| a.contains("menos de 5% do mix")));

        // O total teórico continua reportado; os agregados usam o volume limitado
        assert_eq!(sim.required_volume_total, Some(300));
        let capped_total: u32 = sim.targets.iter().map(|t| t.suggested_volume).sum();
        assert!(capped_total < 300);
        assert_eq!(
            sim.achievable_net_income,
            dec!(50) * Decimal::from(capped_total) - dec!(5000)
        );
    }

    #[test]
    fn servico_sem_historico_nao_recebe_volume_na_distribuicao() {
        let a = service("A", dec!(60));
        let c = service("Novo", dec!(60));
        let report = base_report(&[a.clone(), c.clone()]);
        let visits = done_visits(a.id, 30);

        let sim = simulate_goal(dec!(10000), &report, &visits, &no_fee_settings());

        let target_c = sim.targets.iter().find(|t| t.service_id == c.id).unwrap();
        assert_eq!(target_c.suggested_volume, 0);
        assert!(target_c.suggested_volume <= ZERO_HISTORY_CAP);
    }

    #[test]
    fn taxa_combinada_assume_70_30() {
        let s = ClinicSettings {
            credit_card_fee_pct: dec!(10),
            debit_card_fee_pct: dec!(0),
            tax_rate_pct: dec!(0),
            updated_at: None,
        };
        // 70% de 10% = 7% sobre o preço
        assert_eq!(blended_card_rate(&s), dec!(0.07));

        let a = service("A", dec!(100));
        let report = base_report(&[a.clone()]);
        let visits = done_visits(a.id, 30);
        let sim = simulate_goal(dec!(1000), &report, &visits, &s);

        // margem = 100 − 10 − 100×0.07 = 83
        assert_eq!(sim.targets[0].unit_net_margin, dec!(83));
    }

    #[test]
    fn ponto_de_equilibrio_e_meta_zero() {
        let a = service("A", dec!(60));
        let report = base_report(&[a.clone()]);
        let visits = done_visits(a.id, 30);

        let sim = break_even_distribution(&report, &visits, &no_fee_settings());

        assert_eq!(sim.goal, dec!(0));
        // ceil(5000/50) = 100 atendimentos só para empatar
        assert_eq!(sim.required_volume_total, Some(100));
    }

    #[test]
    fn compensacao_anual_ajusta_a_meta_dos_meses_restantes() {
        let target = dec!(10000);
        let actuals = vec![
            (d(2026, 1, 1), dec!(8000)),
            (d(2026, 2, 1), dec!(12000)),
            (d(2026, 3, 1), dec!(7000)),
        ];

        let comp = year_to_date_compensation(target, &actuals);

        assert_eq!(comp.running_total, dec!(-3000));
        assert_eq!(comp.months_remaining, 9);
        // (10000 × 9 − (−3000)) ÷ 9
        assert_eq!(comp.adjusted_goal, Some(dec!(93000) / dec!(9)));
        assert_eq!(comp.months[0].diff, dec!(-2000));
        assert_eq!(comp.months[1].running_total, dec!(0));
    }

    #[test]
    fn sem_deficit_nao_ha_meta_ajustada() {
        let actuals = vec![(d(2026, 1, 1), dec!(11000)), (d(2026, 2, 1), dec!(10500))];
        let comp = year_to_date_compensation(dec!(10000), &actuals);

        assert!(comp.running_total > dec!(0));
        assert_eq!(comp.adjusted_goal, None);
    }

    #[test]
    fn insights_sao_deterministicos() {
        let a = service("A", dec!(60));
        let report = base_report(&[a.clone()]);
        let visits = done_visits(a.id, 30);

        let first = simulate_goal(dec!(10000), &report, &visits, &no_fee_settings());
        let second = simulate_goal(dec!(10000), &report, &visits, &no_fee_settings());

        assert_eq!(first.insights, second.insights);
        assert_eq!(first.alerts, second.alerts);
    }
}
