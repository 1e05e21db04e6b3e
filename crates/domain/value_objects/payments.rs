use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::{bookings::BookingEntity, payments::PaymentEntity},
    value_objects::{enums::payment_methods::OnsiteMethod, ledger::LedgerError},
};

/// Front-desk payment entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordPaymentModel {
    pub amount: i64,
    pub method: OnsiteMethod,
    pub notes: Option<String>,
}

/// Invoice callback body posted by the payment gateway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GatewayCallbackPayload {
    /// Gateway invoice id; correlates with `payments.gateway_invoice_id`.
    pub id: String,
    pub external_id: Option<String>,
    pub status: String,
    pub paid_amount: Option<f64>,
    pub payment_method: Option<String>,
    pub payment_channel: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl GatewayCallbackPayload {
    pub fn paid_amount_minor(&self) -> Option<i64> {
        self.paid_amount
            .filter(|amount| amount.is_finite() && *amount > 0.0)
            .map(|amount| amount.round() as i64)
    }

    pub fn channel_label(&self) -> Option<String> {
        self.payment_channel
            .clone()
            .or_else(|| self.payment_method.clone())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CallbackOutcome {
    Applied,
    AlreadyApplied,
    Expired,
    UnknownPayment,
    Ignored,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CallbackAck {
    pub received: bool,
    pub outcome: CallbackOutcome,
}

impl CallbackAck {
    pub fn new(outcome: CallbackOutcome) -> Self {
        Self {
            received: true,
            outcome,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GatewayInvoiceRequest {
    pub external_id: String,
    pub amount: i64,
    pub payer_email: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GatewayInvoice {
    pub id: String,
    pub invoice_url: String,
    pub status: String,
}

/// Input to the atomic gateway settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettleGatewayPayment {
    pub payment_id: Uuid,
    pub amount: i64,
    pub channel: Option<String>,
    pub paid_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SettlementOutcome {
    Applied(BookingEntity),
    /// The payment was already paid; nothing changed.
    AlreadySettled,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ManualPaymentOutcome {
    Applied {
        booking: BookingEntity,
        payment: PaymentEntity,
    },
    Rejected(LedgerError),
    BookingNotFound,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentDto {
    pub id: Uuid,
    pub amount: i64,
    pub method: String,
    pub status: String,
    pub gateway_invoice_url: Option<String>,
    pub gateway_channel: Option<String>,
    pub notes: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<PaymentEntity> for PaymentDto {
    fn from(value: PaymentEntity) -> Self {
        Self {
            id: value.id,
            amount: value.amount,
            method: value.method,
            status: value.status,
            gateway_invoice_url: value.gateway_invoice_url,
            gateway_channel: value.gateway_channel,
            notes: value.notes,
            paid_at: value.paid_at,
            created_at: value.created_at,
        }
    }
}
