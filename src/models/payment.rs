use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    PartiallyPaid,
    Overdue,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: i32,
    pub amount_due: Decimal,
    pub amount_paid: Decimal,
    pub due_date: DateTime<Utc>,
    pub payment_date: DateTime<Utc>,
    pub payment_status: PaymentStatus,
    pub lease_id: i32,
}
