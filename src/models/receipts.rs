// src/models/receipts.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_method", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Pix,
    CreditCard,
    DebitCard,
    PaymentLink,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "receipt_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "snake_case")]
pub enum ReceiptStatus {
    Pending,
    Paid,
    Overdue,
}

// Recebimento vinculado a um atendimento. Cada parcela pertence a exatamente
// um mês do calendário: mês do primeiro pagamento + índice da parcela.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub id: Uuid,
    pub visit_id: Uuid,

    #[schema(example = "300.00")]
    pub total_value: Decimal,

    #[schema(example = "300.00")]
    pub paid_value: Decimal,

    pub method: PaymentMethod,
    pub status: ReceiptStatus,

    // installments_received ≤ installment_total; primeiro pagamento
    // registra 1 por padrão.
    #[schema(example = 3)]
    pub installment_total: i32,

    #[schema(example = 1)]
    pub installments_received: i32,

    #[schema(value_type = String, format = Date, example = "2026-08-10")]
    pub payment_date: NaiveDate,
}
