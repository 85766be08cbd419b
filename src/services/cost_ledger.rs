// src/services/cost_ledger.rs
//
// Ledger de confirmação: por (custo, mês), o que foi efetivamente pago
// versus o estimado. A máquina de estados por mês é pending → (estimated,
// derivado, nunca gravado) → paid.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{error::AppError, period},
    db::CostRepository,
    models::{
        costs::{Cost, CostPayment, CostPaymentStatus},
        reports::{BatchConfirmOutcome, ConfirmItemOutcome, LedgerEntry, MonthLedger},
    },
};

/// Último valor pago do custo nos 3 meses anteriores ao mês de referência.
/// É um default melhor que a estimativa na hora de confirmar: o aluguel do
/// mês passado prevê o deste mês melhor que o valor cadastrado há um ano.
pub fn last_paid_amount(
    cost_id: Uuid,
    month: NaiveDate,
    payments: &[CostPayment],
) -> Option<Decimal> {
    let floor = period::sub_months(month, 3);
    payments
        .iter()
        .filter(|p| {
            p.cost_id == cost_id
                && p.status == CostPaymentStatus::Paid
                && p.month_reference < month
                && p.month_reference >= floor
        })
        .max_by_key(|p| p.month_reference)
        .map(|p| p.paid_amount)
}

fn paid_in_month(cost_id: Uuid, month: NaiveDate, payments: &[CostPayment]) -> Option<&CostPayment> {
    payments.iter().find(|p| {
        p.cost_id == cost_id && p.month_reference == month && p.status == CostPaymentStatus::Paid
    })
}

/// Visão do mês: cada custo recorrente ativo com estimativa, último valor
/// pago e confirmação (se houver).
pub fn build_month_ledger(
    month: NaiveDate,
    costs: &[Cost],
    payments: &[CostPayment],
) -> MonthLedger {
    let entries: Vec<LedgerEntry> = costs
        .iter()
        .filter(|c| c.is_recurring())
        .map(|c| {
            let paid = paid_in_month(c.id, month, payments);
            LedgerEntry {
                cost_id: c.id,
                cost_name: c.name.clone(),
                estimated_amount: c.amount,
                last_paid_amount: last_paid_amount(c.id, month, payments),
                paid_amount: paid.map(|p| p.paid_amount),
                payment_date: paid.map(|p| p.payment_date),
                confirmed: paid.is_some(),
            }
        })
        .collect();

    let all_confirmed = entries.iter().all(|e| e.confirmed);
    MonthLedger { month, entries, all_confirmed }
}

/// Quais custos ainda precisam de confirmação no mês e com que valor:
/// (1) último pago nos 3 meses anteriores, senão (2) estimativa do cadastro.
pub fn plan_confirmations(
    month: NaiveDate,
    costs: &[Cost],
    payments: &[CostPayment],
) -> Vec<(Uuid, String, Decimal)> {
    costs
        .iter()
        .filter(|c| c.is_recurring() && paid_in_month(c.id, month, payments).is_none())
        .map(|c| {
            let amount = last_paid_amount(c.id, month, payments).unwrap_or(c.amount);
            (c.id, c.name.clone(), amount)
        })
        .collect()
}

#[derive(Clone)]
pub struct CostLedgerService {
    cost_repo: CostRepository,
}

impl CostLedgerService {
    pub fn new(cost_repo: CostRepository) -> Self {
        Self { cost_repo }
    }

    /// Registra (ou corrige) o pagamento de um custo no mês. Upsert pela
    /// chave (custo, mês); o mês de referência é normalizado para o dia 1.
    pub async fn record_payment(
        &self,
        pool: &PgPool,
        cost_id: Uuid,
        month: NaiveDate,
        amount: Decimal,
        payment_date: NaiveDate,
    ) -> Result<CostPayment, AppError> {
        let cost = self.cost_repo.get_cost(pool, cost_id).await?;
        if cost.is_none() {
            return Err(AppError::CostNotFound);
        }

        self.cost_repo
            .upsert_payment(
                pool,
                cost_id,
                period::first_of_month(month),
                amount,
                payment_date,
                CostPaymentStatus::Paid,
            )
            .await
    }

    /// Confirma de uma vez todos os custos recorrentes ainda pendentes no
    /// mês. Melhor-esforço e sequencial, de propósito: se a escrita k falha,
    /// as k-1 anteriores permanecem, e o chamador recebe o placar por item
    /// em vez de tudo-ou-nada.
    pub async fn confirm_all_pending(
        &self,
        pool: &PgPool,
        month: NaiveDate,
    ) -> Result<BatchConfirmOutcome, AppError> {
        let month = period::first_of_month(month);

        let costs = self.cost_repo.list_active(pool, None, None).await?;
        let payments = self
            .cost_repo
            .payments_in_range(pool, period::sub_months(month, 3), month)
            .await?;

        let plan = plan_confirmations(month, &costs, &payments);
        let today = Utc::now().date_naive();

        let mut items = Vec::with_capacity(plan.len());
        let mut confirmed = 0u32;
        let mut failed = 0u32;

        for (cost_id, cost_name, amount) in plan {
            let result = self
                .cost_repo
                .upsert_payment(pool, cost_id, month, amount, today, CostPaymentStatus::Paid)
                .await;

            match result {
                Ok(_) => {
                    confirmed += 1;
                    items.push(ConfirmItemOutcome {
                        cost_id,
                        cost_name,
                        amount: Some(amount),
                        success: true,
                        error: None,
                    });
                }
                Err(e) => {
                    failed += 1;
                    tracing::warn!("Falha ao confirmar custo '{}' em {}: {}", cost_name, month, e);
                    items.push(ConfirmItemOutcome {
                        cost_id,
                        cost_name,
                        amount: Some(amount),
                        success: false,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        Ok(BatchConfirmOutcome { month, confirmed, failed, items })
    }

    /// Visão do ledger do mês para a tela de confirmação. O ledger não
    /// bloqueia meses futuros; quem trata mês ≥ corrente como somente
    /// estimativa é a camada de cálculo (fluxo de caixa).
    pub async fn month_ledger(
        &self,
        pool: &PgPool,
        month: NaiveDate,
    ) -> Result<MonthLedger, AppError> {
        let month = period::first_of_month(month);

        let costs = self.cost_repo.list_active(pool, None, None).await?;
        let payments = self
            .cost_repo
            .payments_in_range(pool, period::sub_months(month, 3), month)
            .await?;

        Ok(build_month_ledger(month, &costs, &payments))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::costs::{CostFrequency, CostKind};
    use crate::services::profitability::test_fixtures::*;
    use rust_decimal_macros::dec;

    fn month(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn ultimo_valor_pago_vence_a_estimativa() {
        let aluguel = cost("Aluguel", dec!(3000), CostKind::Fixed, CostFrequency::Monthly);
        let payments = vec![
            paid_payment(aluguel.id, month(2026, 6), dec!(3100)),
            paid_payment(aluguel.id, month(2026, 7), dec!(3150)),
        ];

        let plan = plan_confirmations(month(2026, 8), &[aluguel.clone()], &payments);

        assert_eq!(plan.len(), 1);
        // Usa o pagamento mais recente (julho), não a estimativa de 3000
        assert_eq!(plan[0].2, dec!(3150));
    }

    #[test]
    fn pagamento_com_mais_de_3_meses_nao_serve_de_default() {
        let aluguel = cost("Aluguel", dec!(3000), CostKind::Fixed, CostFrequency::Monthly);
        let payments = vec![paid_payment(aluguel.id, month(2026, 3), dec!(3500))];

        let plan = plan_confirmations(month(2026, 8), &[aluguel.clone()], &payments);

        // Março está fora da janela de 3 meses: cai na estimativa
        assert_eq!(plan[0].2, dec!(3000));
    }

    #[test]
    fn custo_ja_confirmado_sai_do_plano() {
        let aluguel = cost("Aluguel", dec!(3000), CostKind::Fixed, CostFrequency::Monthly);
        let equipe = cost("Equipe", dec!(5000), CostKind::Fixed, CostFrequency::Monthly);
        let payments = vec![paid_payment(aluguel.id, month(2026, 8), dec!(3000))];

        let plan = plan_confirmations(month(2026, 8), &[aluguel, equipe.clone()], &payments);

        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].0, equipe.id);
    }

    #[test]
    fn custo_avulso_nao_entra_no_plano_de_confirmacao() {
        let reforma = cost("Reforma", dec!(9000), CostKind::Fixed, CostFrequency::Occasional);
        let plan = plan_confirmations(month(2026, 8), &[reforma], &[]);
        assert!(plan.is_empty());
    }

    #[test]
    fn ledger_do_mes_marca_confirmados_e_pendentes() {
        let aluguel = cost("Aluguel", dec!(3000), CostKind::Fixed, CostFrequency::Monthly);
        let equipe = cost("Equipe", dec!(5000), CostKind::Fixed, CostFrequency::Monthly);
        let payments = vec![paid_payment(aluguel.id, month(2026, 8), dec!(2950))];

        let ledger =
            build_month_ledger(month(2026, 8), &[aluguel.clone(), equipe.clone()], &payments);

        assert!(!ledger.all_confirmed);
        let entry_aluguel =
            ledger.entries.iter().find(|e| e.cost_id == aluguel.id).unwrap();
        assert!(entry_aluguel.confirmed);
        assert_eq!(entry_aluguel.paid_amount, Some(dec!(2950)));

        let entry_equipe = ledger.entries.iter().find(|e| e.cost_id == equipe.id).unwrap();
        assert!(!entry_equipe.confirmed);
        assert_eq!(entry_equipe.estimated_amount, dec!(5000));
    }
}
