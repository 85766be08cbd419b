// src/services/cashflow.rs
//
// Fluxo de caixa mensal: passado reconhecido × futuro projetado numa única
// série, com amortização de parcelas, taxas de cartão, custos confirmados
// versus estimados e despesas avulsas parceladas.

use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::collections::HashMap;

use crate::{
    common::{error::AppError, period},
    db::{BillingRepository, CostRepository, ScheduleRepository, SettingsRepository},
    models::{
        costs::{Cost, CostFrequency, CostKind, CostPayment, CostPaymentStatus},
        expenses::OneOffExpense,
        receipts::{PaymentMethod, Receipt},
        reports::{CashFlowReport, MonthlyCashFlow},
        settings::ClinicSettings,
        visits::Visit,
    },
    services::profitability::total_variable_monthly_cost,
};

// Teto de parcelamento das despesas avulsas; o corte de busca dos
// recebimentos usa o mesmo horizonte.
pub const MAX_INSTALLMENTS: i32 = 48;

pub struct CashFlowInputs<'a> {
    pub costs: &'a [Cost],
    pub payments: &'a [CostPayment],
    pub receipts: &'a [Receipt],
    pub expenses: &'a [OneOffExpense],
    pub visits: &'a [Visit],
    pub settings: &'a ClinicSettings,
}

fn card_fee_rate(method: PaymentMethod, settings: &ClinicSettings) -> Decimal {
    let hundred = Decimal::from(100);
    match method {
        PaymentMethod::CreditCard => settings.credit_card_fee_pct / hundred,
        PaymentMethod::DebitCard => settings.debit_card_fee_pct / hundred,
        _ => Decimal::ZERO,
    }
}

/// Fatia da despesa avulsa que cai no mês: valor total ÷ parcelas, para os
/// meses consecutivos a partir da primeira parcela.
pub fn expense_slice_for_month(expense: &OneOffExpense, month: NaiveDate) -> Decimal {
    let count = expense.installment_count.max(1) as u32;
    let first = period::first_of_month(expense.first_installment);
    let last = period::add_months(first, count - 1);
    if month >= first && month <= last {
        expense.total_value / Decimal::from(count)
    } else {
        Decimal::ZERO
    }
}

#[derive(Default, Clone)]
struct MonthBucket {
    recognized: Decimal,
    projected: Decimal,
    fee_recognized: Decimal,
    fee_projected: Decimal,
}

/// Distribui as parcelas de um recebimento nos baldes mensais.
///
/// Cada parcela pertence a exatamente um mês (mês do primeiro pagamento +
/// índice). Parcela já recebida em mês ≤ corrente é reconhecida; o restante
/// que cai em mês ≥ corrente é projetado — nunca o mesmo índice nas duas
/// pontas. Parcela em aberto de mês já passado não entra em nenhuma das
/// linhas (inadimplência fica fora da projeção).
fn distribute_receipt(
    receipt: &Receipt,
    current_month: NaiveDate,
    settings: &ClinicSettings,
    buckets: &mut HashMap<NaiveDate, MonthBucket>,
) {
    let total_installments = receipt.installment_total.max(1);
    let received = receipt.installments_received.clamp(0, total_installments);

    // Sem nada recebido ainda, a projeção parte do valor contratado
    let base = if received > 0 { receipt.paid_value } else { receipt.total_value };
    let portion = base / Decimal::from(total_installments);
    let rate = card_fee_rate(receipt.method, settings);
    let fee = portion * rate;

    let first_month = period::first_of_month(receipt.payment_date);
    for index in 0..total_installments {
        let month = period::add_months(first_month, index as u32);
        let bucket = buckets.entry(month).or_default();

        if index < received && month <= current_month {
            bucket.recognized += portion;
            bucket.fee_recognized += fee;
        } else if month >= current_month {
            bucket.projected += portion;
            bucket.fee_projected += fee;
        }
    }
}

/// Custos fixos do mês: confirmações pagas × estimativas dos pendentes.
/// Qualquer mês depois do corrente é somente-estimativa, não importa o que
/// o ledger tenha gravado lá.
fn fixed_costs_for_month(
    month: NaiveDate,
    current_month: NaiveDate,
    costs: &[Cost],
    payments: &[CostPayment],
) -> (Decimal, Decimal, bool) {
    let fixed: Vec<&Cost> = costs
        .iter()
        .filter(|c| c.is_active && c.kind == CostKind::Fixed && c.frequency == CostFrequency::Monthly)
        .collect();

    if month > current_month {
        let estimated: Decimal = fixed.iter().map(|c| c.amount).sum();
        return (Decimal::ZERO, estimated, true);
    }

    let mut actual = Decimal::ZERO;
    let mut estimated = Decimal::ZERO;
    let mut unconfirmed = false;

    for cost in &fixed {
        let paid = payments.iter().find(|p| {
            p.cost_id == cost.id
                && p.month_reference == month
                && p.status == CostPaymentStatus::Paid
        });
        match paid {
            Some(p) => actual += p.paid_amount,
            None => {
                estimated += cost.amount;
                unconfirmed = true;
            }
        }
    }

    (actual, estimated, unconfirmed)
}

pub fn build_cash_flow(
    inputs: &CashFlowInputs<'_>,
    today: NaiveDate,
    months_back: u32,
    months_forward: u32,
) -> CashFlowReport {
    let hundred = Decimal::from(100);
    let current_month = period::first_of_month(today);
    let start = period::sub_months(current_month, months_back.saturating_sub(1));
    let end = period::add_months(current_month, months_forward);

    let mut buckets: HashMap<NaiveDate, MonthBucket> = HashMap::new();
    for receipt in inputs.receipts {
        distribute_receipt(receipt, current_month, inputs.settings, &mut buckets);
    }

    let mut visit_counts: HashMap<NaiveDate, u32> = HashMap::new();
    for visit in inputs.visits.iter().filter(|v| v.counts_for_finance()) {
        let month = period::first_of_month(visit.scheduled_at.date_naive());
        *visit_counts.entry(month).or_insert(0) += 1;
    }

    let variable_monthly = total_variable_monthly_cost(inputs.costs);
    let tax_rate = inputs.settings.tax_rate_pct / hundred;

    let mut rows = Vec::new();
    let mut accumulated = Decimal::ZERO;
    let mut accumulated_projected = Decimal::ZERO;

    let mut month = start;
    while month <= end {
        let bucket = buckets.get(&month).cloned().unwrap_or_default();

        let (fixed_actual, fixed_estimated, unconfirmed) =
            fixed_costs_for_month(month, current_month, inputs.costs, inputs.payments);
        let fixed_total = fixed_actual + fixed_estimated;
        let is_estimated = month > current_month || unconfirmed;

        let one_off: Decimal = inputs
            .expenses
            .iter()
            .map(|e| expense_slice_for_month(e, month))
            .sum();

        let visit_count = if month > current_month {
            0
        } else {
            visit_counts.get(&month).copied().unwrap_or(0)
        };

        let balance = bucket.recognized
            - (fixed_total + variable_monthly + one_off + bucket.fee_recognized);

        let projected_balance = if month > current_month {
            (bucket.recognized + bucket.projected)
                - (fixed_total + one_off + bucket.fee_projected)
        } else {
            balance
        };

        let period_revenue = if month > current_month {
            bucket.projected
        } else {
            bucket.recognized
        };
        let tax_estimate = period_revenue * tax_rate;
        let net_balance = balance - tax_estimate;

        // As duas linhas acumuladas se encontram na fronteira: a projetada
        // parte do último mês realizado.
        let accumulated_balance = if month <= current_month {
            accumulated += balance;
            accumulated_projected = accumulated;
            Some(accumulated)
        } else {
            accumulated_projected += projected_balance;
            None
        };

        rows.push(MonthlyCashFlow {
            month,
            recognized_revenue: bucket.recognized,
            projected_revenue: bucket.projected,
            card_fees: bucket.fee_recognized,
            projected_card_fees: bucket.fee_projected,
            fixed_actual,
            fixed_estimated,
            is_estimated,
            variable_costs: variable_monthly,
            one_off_expenses: one_off,
            visit_count,
            balance,
            projected_balance,
            tax_estimate,
            net_balance,
            accumulated_balance,
            accumulated_projected,
        });

        month = period::add_months(month, 1);
    }

    CashFlowReport { start, end, current_month, rows }
}

#[derive(Clone)]
pub struct CashFlowService {
    cost_repo: CostRepository,
    billing_repo: BillingRepository,
    schedule_repo: ScheduleRepository,
    settings_repo: SettingsRepository,
}

impl CashFlowService {
    pub fn new(
        cost_repo: CostRepository,
        billing_repo: BillingRepository,
        schedule_repo: ScheduleRepository,
        settings_repo: SettingsRepository,
    ) -> Self {
        Self { cost_repo, billing_repo, schedule_repo, settings_repo }
    }

    pub async fn report(
        &self,
        pool: &PgPool,
        months_back: u32,
        months_forward: u32,
    ) -> Result<CashFlowReport, AppError> {
        if !matches!(months_back, 3 | 6 | 12) {
            return Err(AppError::InvalidPeriod(
                "janela retroativa deve ser 3, 6 ou 12 meses".to_string(),
            ));
        }

        let today = Utc::now().date_naive();
        let current_month = period::first_of_month(today);
        let start = period::sub_months(current_month, months_back - 1);
        let end = period::add_months(current_month, months_forward);

        let costs = self.cost_repo.list_active(pool, None, None).await?;
        let payments = self.cost_repo.payments_in_range(pool, start, end).await?;
        // Parcelas antigas ainda caem na janela: busca recebimentos desde o
        // horizonte máximo de parcelamento antes do início.
        let receipts = self
            .billing_repo
            .receipts_since(pool, period::sub_months(start, MAX_INSTALLMENTS as u32))
            .await?;
        let expenses = self.billing_repo.list_expenses(pool).await?;

        let window_start =
            Utc.from_utc_datetime(&start.and_hms_opt(0, 0, 0).unwrap_or_default());
        let window_end = Utc.from_utc_datetime(
            &period::add_months(current_month, 1)
                .and_hms_opt(0, 0, 0)
                .unwrap_or_default(),
        );
        let visits = self
            .schedule_repo
            .done_visits_between(pool, window_start, window_end)
            .await?;

        let settings = self.settings_repo.get_settings(pool).await?;

        let inputs = CashFlowInputs {
            costs: &costs,
            payments: &payments,
            receipts: &receipts,
            expenses: &expenses,
            visits: &visits,
            settings: &settings,
        };

        Ok(build_cash_flow(&inputs, today, months_back, months_forward))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::profitability::test_fixtures::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn settings(credit: Decimal, debit: Decimal, tax: Decimal) -> ClinicSettings {
        ClinicSettings {
            credit_card_fee_pct: credit,
            debit_card_fee_pct: debit,
            tax_rate_pct: tax,
            updated_at: None,
        }
    }

    fn receipt(
        total: Decimal,
        paid: Decimal,
        method: PaymentMethod,
        installment_total: i32,
        installments_received: i32,
        payment_date: NaiveDate,
    ) -> Receipt {
        Receipt {
            id: Uuid::new_v4(),
            visit_id: Uuid::new_v4(),
            total_value: total,
            paid_value: paid,
            method,
            status: crate::models::receipts::ReceiptStatus::Paid,
            installment_total,
            installments_received,
            payment_date,
        }
    }

    fn empty_settings() -> ClinicSettings {
        settings(dec!(0), dec!(0), dec!(0))
    }

    const TODAY: (i32, u32, u32) = (2026, 8, 30);

    fn build(inputs: &CashFlowInputs<'_>) -> CashFlowReport {
        build_cash_flow(inputs, d(TODAY.0, TODAY.1, TODAY.2), 3, 3)
    }

    fn row<'a>(report: &'a CashFlowReport, y: i32, m: u32) -> &'a MonthlyCashFlow {
        report.rows.iter().find(|r| r.month == d(y, m, 1)).unwrap()
    }

    #[test]
    fn parcela_recebida_reconhece_e_o_resto_projeta() {
        // 300 em 3x, primeira parcela paga no mês corrente: 100 reconhecido
        // agora, 100 projetado em cada um dos dois meses seguintes.
        let r = receipt(dec!(300), dec!(300), PaymentMethod::Pix, 3, 1, d(2026, 8, 10));
        let s = empty_settings();
        let inputs = CashFlowInputs {
            costs: &[],
            payments: &[],
            receipts: &[r],
            expenses: &[],
            visits: &[],
            settings: &s,
        };
        let report = build(&inputs);

        assert_eq!(row(&report, 2026, 8).recognized_revenue, dec!(100));
        assert_eq!(row(&report, 2026, 8).projected_revenue, dec!(0));
        assert_eq!(row(&report, 2026, 9).projected_revenue, dec!(100));
        assert_eq!(row(&report, 2026, 9).recognized_revenue, dec!(0));
        assert_eq!(row(&report, 2026, 10).projected_revenue, dec!(100));
    }

    #[test]
    fn parcelamento_e_sem_perdas() {
        let r = receipt(dec!(450), dec!(450), PaymentMethod::Cash, 3, 1, d(2026, 8, 5));
        let s = empty_settings();
        let inputs = CashFlowInputs {
            costs: &[],
            payments: &[],
            receipts: &[r.clone()],
            expenses: &[],
            visits: &[],
            settings: &s,
        };
        let report = build(&inputs);

        let total: Decimal = report
            .rows
            .iter()
            .map(|row| row.recognized_revenue + row.projected_revenue)
            .sum();
        assert_eq!(total, r.paid_value);
    }

    #[test]
    fn recebimento_pendente_projeta_pelo_valor_contratado() {
        // Nada recebido ainda: a projeção usa o total contratado
        let r = receipt(dec!(600), dec!(0), PaymentMethod::Pix, 2, 0, d(2026, 9, 1));
        let s = empty_settings();
        let inputs = CashFlowInputs {
            costs: &[],
            payments: &[],
            receipts: &[r],
            expenses: &[],
            visits: &[],
            settings: &s,
        };
        let report = build(&inputs);

        assert_eq!(row(&report, 2026, 9).projected_revenue, dec!(300));
        assert_eq!(row(&report, 2026, 10).projected_revenue, dec!(300));
    }

    #[test]
    fn taxa_de_cartao_por_metodo() {
        let s = settings(dec!(4), dec!(2), dec!(0));
        let credit = receipt(dec!(100), dec!(100), PaymentMethod::CreditCard, 1, 1, d(2026, 8, 3));
        let debit = receipt(dec!(100), dec!(100), PaymentMethod::DebitCard, 1, 1, d(2026, 8, 3));
        let pix = receipt(dec!(100), dec!(100), PaymentMethod::Pix, 1, 1, d(2026, 8, 3));
        let inputs = CashFlowInputs {
            costs: &[],
            payments: &[],
            receipts: &[credit, debit, pix],
            expenses: &[],
            visits: &[],
            settings: &s,
        };
        let report = build(&inputs);

        // 4% de 100 + 2% de 100 + 0
        assert_eq!(row(&report, 2026, 8).card_fees, dec!(6));
    }

    #[test]
    fn fixo_confirmado_vale_o_pago_e_pendente_vale_a_estimativa() {
        let aluguel = cost("Aluguel", dec!(3000), CostKind::Fixed, CostFrequency::Monthly);
        let equipe = cost("Equipe", dec!(5000), CostKind::Fixed, CostFrequency::Monthly);
        let payments = vec![paid_payment(aluguel.id, d(2026, 7, 1), dec!(2900))];
        let s = empty_settings();
        let costs = vec![aluguel, equipe];
        let inputs = CashFlowInputs {
            costs: &costs,
            payments: &payments,
            receipts: &[],
            expenses: &[],
            visits: &[],
            settings: &s,
        };
        let report = build(&inputs);

        let july = row(&report, 2026, 7);
        assert_eq!(july.fixed_actual, dec!(2900));
        assert_eq!(july.fixed_estimated, dec!(5000));
        assert!(july.is_estimated); // mês passado com confirmação incompleta
    }

    #[test]
    fn mes_corrente_todo_confirmado_deixa_de_ser_estimativa() {
        let aluguel = cost("Aluguel", dec!(3000), CostKind::Fixed, CostFrequency::Monthly);
        // Único custo fixo com confirmação paga no próprio mês corrente
        let payments = vec![paid_payment(aluguel.id, d(2026, 8, 1), dec!(3000))];
        let s = empty_settings();
        let costs = vec![aluguel];
        let inputs = CashFlowInputs {
            costs: &costs,
            payments: &payments,
            receipts: &[],
            expenses: &[],
            visits: &[],
            settings: &s,
        };
        let report = build(&inputs);

        let current = row(&report, 2026, 8);
        assert_eq!(current.fixed_actual, dec!(3000));
        assert_eq!(current.fixed_estimated, dec!(0));
        assert!(!current.is_estimated);

        // O futuro continua estimado mesmo sem nenhuma pendência
        assert!(row(&report, 2026, 9).is_estimated);
    }

    #[test]
    fn mes_futuro_ignora_o_ledger_e_usa_so_estimativas() {
        let aluguel = cost("Aluguel", dec!(3000), CostKind::Fixed, CostFrequency::Monthly);
        // Alguém gravou um pagamento num mês futuro: a projeção não pode
        // tratá-lo como realizado.
        let payments = vec![paid_payment(aluguel.id, d(2026, 10, 1), dec!(1))];
        let s = empty_settings();
        let costs = vec![aluguel];
        let inputs = CashFlowInputs {
            costs: &costs,
            payments: &payments,
            receipts: &[],
            expenses: &[],
            visits: &[],
            settings: &s,
        };
        let report = build(&inputs);

        let october = row(&report, 2026, 10);
        assert_eq!(october.fixed_actual, dec!(0));
        assert_eq!(october.fixed_estimated, dec!(3000));
        assert!(october.is_estimated);
    }

    #[test]
    fn despesa_avulsa_fatia_os_meses_consecutivos() {
        let expense = OneOffExpense {
            id: Uuid::new_v4(),
            description: "Cadeira".to_string(),
            total_value: dec!(4800),
            category: "Equipamento".to_string(),
            first_installment: d(2026, 7, 15),
            installment_count: 12,
            created_at: None,
        };
        let s = empty_settings();
        let inputs = CashFlowInputs {
            costs: &[],
            payments: &[],
            receipts: &[],
            expenses: &[expense],
            visits: &[],
            settings: &s,
        };
        let report = build(&inputs);

        assert_eq!(row(&report, 2026, 6).one_off_expenses, dec!(0));
        assert_eq!(row(&report, 2026, 7).one_off_expenses, dec!(400));
        assert_eq!(row(&report, 2026, 11).one_off_expenses, dec!(400));
    }

    #[test]
    fn linhas_acumuladas_coincidem_no_ultimo_mes_realizado() {
        let aluguel = cost("Aluguel", dec!(1000), CostKind::Fixed, CostFrequency::Monthly);
        let r = receipt(dec!(3000), dec!(3000), PaymentMethod::Pix, 3, 2, d(2026, 7, 1));
        let s = empty_settings();
        let costs = vec![aluguel];
        let inputs = CashFlowInputs {
            costs: &costs,
            payments: &[],
            receipts: &[r],
            expenses: &[],
            visits: &[],
            settings: &s,
        };
        let report = build(&inputs);

        let current = row(&report, 2026, 8);
        assert_eq!(current.accumulated_balance, Some(current.accumulated_projected));

        // Depois da fronteira, só a linha projetada continua
        let future = row(&report, 2026, 9);
        assert_eq!(future.accumulated_balance, None);
        assert_eq!(
            future.accumulated_projected,
            current.accumulated_projected + future.projected_balance
        );
    }

    #[test]
    fn imposto_usa_reconhecido_no_passado_e_projetado_no_futuro() {
        let s = settings(dec!(0), dec!(0), dec!(10));
        let r = receipt(dec!(300), dec!(300), PaymentMethod::Pix, 3, 1, d(2026, 8, 10));
        let inputs = CashFlowInputs {
            costs: &[],
            payments: &[],
            receipts: &[r],
            expenses: &[],
            visits: &[],
            settings: &s,
        };
        let report = build(&inputs);

        assert_eq!(row(&report, 2026, 8).tax_estimate, dec!(10));
        assert_eq!(row(&report, 2026, 9).tax_estimate, dec!(10));
    }

    #[test]
    fn janela_padrao_tem_6_meses() {
        let s = empty_settings();
        let inputs = CashFlowInputs {
            costs: &[],
            payments: &[],
            receipts: &[],
            expenses: &[],
            visits: &[],
            settings: &s,
        };
        let report = build(&inputs);

        // 3 retroativos com o corrente incluso (jun, jul, ago) + 3 à frente
        assert_eq!(report.rows.len(), 6);
        assert_eq!(report.start, d(2026, 6, 1));
        assert_eq!(report.end, d(2026, 11, 1));
        assert_eq!(report.current_month, d(2026, 8, 1));
    }
}
