// src/services/profitability.rs
//
// Economia unitária por serviço: preço, custo variável alocado, custo fixo
// rateado e margem. Tudo função pura das coleções já buscadas; o service só
// orquestra as queries.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CatalogRepository, CostRepository},
    models::{
        catalog::ServiceType,
        costs::{Cost, CostFrequency, CostKind, CostServiceLink},
        reports::{ProfitabilityReport, ServiceProfitability},
    },
};

/// Total dos custos fixos recorrentes ativos. Custos avulsos (occasional)
/// ficam de fora dos totais recorrentes.
pub fn total_fixed_cost(costs: &[Cost]) -> Decimal {
    costs
        .iter()
        .filter(|c| c.is_active && c.kind == CostKind::Fixed && c.frequency == CostFrequency::Monthly)
        .map(|c| c.amount)
        .sum()
}

/// Total dos custos variáveis mensais ativos (entram no fluxo de caixa como
/// valor cheio do mês, não por atendimento).
pub fn total_variable_monthly_cost(costs: &[Cost]) -> Decimal {
    costs
        .iter()
        .filter(|c| {
            c.is_active && c.kind == CostKind::Variable && c.frequency == CostFrequency::Monthly
        })
        .map(|c| c.amount)
        .sum()
}

/// Custo variável alocado a um serviço: custos por-atendimento globais (sem
/// vínculo = valem para todos) + custos variáveis vinculados a este serviço,
/// ponderados pelo percentual de rateio.
pub fn variable_cost_for_service(
    service_id: Uuid,
    costs: &[Cost],
    links: &[CostServiceLink],
) -> Decimal {
    let hundred = Decimal::from(100);

    let global: Decimal = costs
        .iter()
        .filter(|c| {
            c.is_active
                && c.kind == CostKind::Variable
                && c.frequency == CostFrequency::PerVisit
                && !links.iter().any(|l| l.cost_id == c.id)
        })
        .map(|c| c.amount)
        .sum();

    let linked: Decimal = links
        .iter()
        .filter(|l| l.service_id == service_id)
        .filter_map(|l| {
            costs
                .iter()
                .find(|c| {
                    c.id == l.cost_id
                        && c.is_active
                        && c.kind == CostKind::Variable
                        && c.frequency != CostFrequency::Occasional
                })
                .map(|c| c.amount * l.percentage / hundred)
        })
        .sum();

    global + linked
}

/// Relatório de rentabilidade por serviço.
///
/// O rateio do custo fixo aqui é deliberadamente "flat" (total ÷ número de
/// serviços ativos), ignorando os percentuais de vínculo — é assim que os
/// relatórios históricos foram calculados e a visão realizada (realized.rs)
/// corrige essa simplificação depois. Não unificar os dois modelos.
pub fn calculate_profitability(
    costs: &[Cost],
    links: &[CostServiceLink],
    services: &[ServiceType],
) -> ProfitabilityReport {
    let hundred = Decimal::from(100);
    let total_fixed = total_fixed_cost(costs);

    let service_count = services.len();
    let fixed_allocated = if service_count > 0 {
        total_fixed / Decimal::from(service_count as u64)
    } else {
        Decimal::ZERO
    };

    let mut rows: Vec<ServiceProfitability> = services
        .iter()
        .map(|s| {
            let variable = variable_cost_for_service(s.id, costs, links);
            let margin = s.price - fixed_allocated - variable;
            let margin_percent = if s.price.is_zero() {
                // Preço zero é estado legítimo (serviço cortesia); nunca
                // dividir por zero.
                Decimal::ZERO
            } else {
                margin / s.price * hundred
            };

            ServiceProfitability {
                service_id: s.id,
                service_name: s.name.clone(),
                price: s.price,
                fixed_cost_allocated: fixed_allocated,
                variable_cost_allocated: variable,
                margin,
                margin_percent,
                profitable: margin > Decimal::ZERO,
            }
        })
        .collect();

    // Ranking por margem absoluta, decrescente
    rows.sort_by(|a, b| b.margin.cmp(&a.margin));

    let ticket_medio = if service_count > 0 {
        services.iter().map(|s| s.price).sum::<Decimal>() / Decimal::from(service_count as u64)
    } else {
        Decimal::ZERO
    };

    let variable_cost_per_visit = if service_count > 0 {
        rows.iter().map(|r| r.variable_cost_allocated).sum::<Decimal>()
            / Decimal::from(service_count as u64)
    } else {
        Decimal::ZERO
    };

    // Ponto de equilíbrio: quantos atendimentos no ticket médio cobrem o
    // custo fixo. Margem média ≤ 0 significa "não há ponto de equilíbrio",
    // representado como None (nunca pânico, nunca número enganoso).
    let denominator = ticket_medio - variable_cost_per_visit;
    let break_even = if denominator > Decimal::ZERO {
        (total_fixed / denominator).ceil().to_u32()
    } else {
        None
    };

    ProfitabilityReport {
        services: rows,
        total_fixed_cost: total_fixed,
        ticket_medio,
        variable_cost_per_visit,
        break_even,
    }
}

#[derive(Clone)]
pub struct ProfitabilityService {
    cost_repo: CostRepository,
    catalog_repo: CatalogRepository,
}

impl ProfitabilityService {
    pub fn new(cost_repo: CostRepository, catalog_repo: CatalogRepository) -> Self {
        Self { cost_repo, catalog_repo }
    }

    pub async fn report(&self, pool: &PgPool) -> Result<ProfitabilityReport, AppError> {
        let costs = self.cost_repo.list_active(pool, None, None).await?;
        let links = self.cost_repo.list_links(pool).await?;
        let services = self.catalog_repo.list_active_services(pool).await?;

        Ok(calculate_profitability(&costs, &links, &services))
    }
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use super::*;
    use crate::models::costs::{ApplicationMode, CostPaymentStatus};
    use chrono::NaiveDate;

    pub fn service(name: &str, price: Decimal) -> ServiceType {
        ServiceType {
            id: Uuid::new_v4(),
            name: name.to_string(),
            price,
            is_active: true,
            created_at: None,
        }
    }

    pub fn cost(name: &str, amount: Decimal, kind: CostKind, frequency: CostFrequency) -> Cost {
        Cost {
            id: Uuid::new_v4(),
            name: name.to_string(),
            amount,
            kind,
            frequency,
            is_active: true,
            note: None,
            created_at: None,
        }
    }

    pub fn link(cost_id: Uuid, service_id: Uuid, percentage: Decimal) -> CostServiceLink {
        CostServiceLink {
            id: Uuid::new_v4(),
            cost_id,
            service_id,
            mode: if percentage == Decimal::from(100) {
                ApplicationMode::Full
            } else {
                ApplicationMode::Prorated
            },
            percentage,
        }
    }

    pub fn paid_payment(
        cost_id: Uuid,
        month: NaiveDate,
        amount: Decimal,
    ) -> crate::models::costs::CostPayment {
        crate::models::costs::CostPayment {
            id: Uuid::new_v4(),
            cost_id,
            month_reference: month,
            paid_amount: amount,
            payment_date: month,
            status: CostPaymentStatus::Paid,
            created_at: None,
        }
    }
}
