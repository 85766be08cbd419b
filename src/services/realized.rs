// src/services/realized.rs
//
// Reconciliação do período realizado: o rateio flat da visão unitária não
// enxerga o volume real de atendimentos, então aqui o custo fixo é
// re-rateado por participação e a diferença entra como ajuste sobre a
// margem já reportada. São dois passos de propósito — um rateio direto por
// participação não bateria com os números da visão unitária.

use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    common::{error::AppError, period},
    db::ScheduleRepository,
    models::{
        reports::{ProfitabilityReport, RealizedPeriodReport, RealizedServiceResult},
        visits::Visit,
    },
    services::ProfitabilityService,
};

pub fn analyze_realized_period(
    profitability: &ProfitabilityReport,
    visits: &[Visit],
    start: NaiveDate,
    end: NaiveDate,
) -> RealizedPeriodReport {
    let hundred = Decimal::from(100);
    let months = period::months_in_window(start, end);

    let mut counts: HashMap<Uuid, u32> = HashMap::new();
    for v in visits.iter().filter(|v| v.counts_for_finance()) {
        *counts.entry(v.service_id).or_insert(0) += 1;
    }
    let total_visits: u32 = counts.values().sum();

    // Custo fixo do período inteiro (total mensal × meses na janela)
    let fixed_window = profitability.total_fixed_cost * Decimal::from(months);

    let mut results: Vec<RealizedServiceResult> = profitability
        .services
        .iter()
        .map(|row| {
            let count = counts.get(&row.service_id).copied().unwrap_or(0);
            let count_dec = Decimal::from(count);

            let (participation_pct, fixed_cost_rateio) = if total_visits > 0 {
                let total_dec = Decimal::from(total_visits);
                // Multiplica antes de dividir para não acumular resíduo de
                // arredondamento no rateio.
                (
                    count_dec * hundred / total_dec,
                    fixed_window * count_dec / total_dec,
                )
            } else {
                (Decimal::ZERO, Decimal::ZERO)
            };

            // Quanto do fixo o rateio flat já embutiu na margem unitária
            let already_embedded = row.fixed_cost_allocated * count_dec;
            let adjustment = fixed_cost_rateio - already_embedded;

            let realized_profit = row.margin * count_dec - adjustment;

            let realized_margin_per_visit = if count > 0 {
                realized_profit / count_dec
            } else {
                Decimal::ZERO
            };

            let profitability_bar = if row.price.is_zero() {
                Decimal::ZERO
            } else {
                (realized_margin_per_visit / row.price * hundred)
                    .clamp(Decimal::ZERO, hundred)
            };

            RealizedServiceResult {
                service_id: row.service_id,
                service_name: row.service_name.clone(),
                visit_count: count,
                participation_pct,
                fixed_cost_rateio,
                adjustment,
                realized_profit,
                realized_margin_per_visit,
                profitability_bar,
            }
        })
        .collect();

    results.sort_by(|a, b| b.realized_profit.cmp(&a.realized_profit));

    RealizedPeriodReport {
        start,
        end,
        months_in_window: months,
        total_visits,
        results,
    }
}

#[derive(Clone)]
pub struct RealizedPeriodService {
    profitability: ProfitabilityService,
    schedule_repo: ScheduleRepository,
}

impl RealizedPeriodService {
    pub fn new(profitability: ProfitabilityService, schedule_repo: ScheduleRepository) -> Self {
        Self { profitability, schedule_repo }
    }

    pub async fn report(
        &self,
        pool: &PgPool,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RealizedPeriodReport, AppError> {
        if end < start {
            return Err(AppError::InvalidPeriod(format!(
                "fim ({end}) anterior ao início ({start})"
            )));
        }

        let profitability = self.profitability.report(pool).await?;

        let window_start = Utc.from_utc_datetime(&start.and_hms_opt(0, 0, 0).unwrap_or_default());
        let window_end = Utc.from_utc_datetime(
            &end.succ_opt()
                .unwrap_or(end)
                .and_hms_opt(0, 0, 0)
                .unwrap_or_default(),
        );
        let visits = self
            .schedule_repo
            .done_visits_between(pool, window_start, window_end)
            .await?;

        Ok(analyze_realized_period(&profitability, &visits, start, end))
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

    fn done_visit(service_id: Uuid, day: NaiveDate) -> Visit {
        Visit {
            id: Uuid::new_v4(),
            service_id,
            scheduled_at: Utc.from_utc_datetime(&day.and_hms_opt(10, 0, 0).unwrap()),
            status: VisitStatus::Done,
            cancelled: false,
            value: None,
        }
    }

    // Cenário fechado: fixo 3000/mês, A (200, var 20) e B (100, var 10),
    // janela de 1 mês com 10 atendimentos de A e 5 de B.
    fn scenario() -> (ProfitabilityReport, Vec<Visit>) {
        let fixed = cost("Aluguel", dec!(3000), CostKind::Fixed, CostFrequency::Monthly);
        let var_a = cost("Insumo A", dec!(20), CostKind::Variable, CostFrequency::PerVisit);
        let var_b = cost("Insumo B", dec!(10), CostKind::Variable, CostFrequency::PerVisit);
        let a = service("A", dec!(200));
        let b = service("B", dec!(100));
        let links = vec![link(var_a.id, a.id, dec!(100)), link(var_b.id, b.id, dec!(100))];

        let report = calculate_profitability(
            &[fixed, var_a, var_b],
            &links,
            &[a.clone(), b.clone()],
        );

        let mut visits = Vec::new();
        for _ in 0..10 {
            visits.push(done_visit(a.id, d(2026, 7, 10)));
        }
        for _ in 0..5 {
            visits.push(done_visit(b.id, d(2026, 7, 20)));
        }
        (report, visits)
    }

    #[test]
    fn reconciliacao_em_dois_passos_bate_com_o_rateio_por_participacao() {
        let (report, visits) = scenario();
        let realized = analyze_realized_period(&report, &visits, d(2026, 7, 1), d(2026, 7, 31));

        assert_eq!(realized.months_in_window, 1);
        assert_eq!(realized.total_visits, 15);

        // A: receita 2000, variável 200, fixo por participação 2000 → -200
        let row_a = realized.results.iter().find(|r| r.service_name == "A").unwrap();
        assert_eq!(row_a.visit_count, 10);
        assert_eq!(row_a.fixed_cost_rateio, dec!(2000));
        // O flat já havia embutido 1500 × 10 = 15000; o ajuste devolve a diferença
        assert_eq!(row_a.adjustment, dec!(-13000));
        assert_eq!(row_a.realized_profit, dec!(-200));

        // B: receita 500, variável 50, fixo por participação 1000 → -550
        let row_b = realized.results.iter().find(|r| r.service_name == "B").unwrap();
        assert_eq!(row_b.realized_profit, dec!(-550));

        // Ordenado por lucro realizado decrescente
        assert_eq!(realized.results[0].service_name, "A");
    }

    #[test]
    fn rateio_do_periodo_soma_o_fixo_da_janela_inteira() {
        let (report, visits) = scenario();
        // Janela de 3 meses: o fixo rateado deve somar 3 × 3000
        let realized = analyze_realized_period(&report, &visits, d(2026, 5, 1), d(2026, 7, 31));

        let rateio_total: Decimal =
            realized.results.iter().map(|r| r.fixed_cost_rateio).sum();
        assert_eq!(rateio_total, dec!(9000));
    }

    #[test]
    fn periodo_sem_atendimentos_zera_sem_dividir_por_zero() {
        let (report, _) = scenario();
        let realized = analyze_realized_period(&report, &[], d(2026, 7, 1), d(2026, 7, 31));

        assert_eq!(realized.total_visits, 0);
        for r in &realized.results {
            assert_eq!(r.participation_pct, dec!(0));
            assert_eq!(r.realized_profit, dec!(0));
            assert_eq!(r.realized_margin_per_visit, dec!(0));
        }
    }

    #[test]
    fn barra_de_rentabilidade_fica_entre_0_e_100() {
        let (report, visits) = scenario();
        let realized = analyze_realized_period(&report, &visits, d(2026, 7, 1), d(2026, 7, 31));

        for r in &realized.results {
            assert!(r.profitability_bar >= dec!(0) && r.profitability_bar <= dec!(100));
        }
    }

    #[test]
    fn atendimento_cancelado_fica_fora_da_contagem() {
        let (report, mut visits) = scenario();
        let service_id = visits[0].service_id;
        let mut cancelled = done_visit(service_id, d(2026, 7, 15));
        cancelled.cancelled = true;
        visits.push(cancelled);

        let realized = analyze_realized_period(&report, &visits, d(2026, 7, 1), d(2026, 7, 31));
        assert_eq!(realized.total_visits, 15);
    }
}
