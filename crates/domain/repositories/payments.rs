use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::payments::{InsertPaymentEntity, PaymentEntity},
    value_objects::payments::{ManualPaymentOutcome, SettleGatewayPayment, SettlementOutcome},
};

#[async_trait]
#[automock]
pub trait PaymentRepository {
    async fn insert_payment(&self, payment: InsertPaymentEntity) -> Result<PaymentEntity>;

    async fn find_by_gateway_invoice_id(&self, invoice_id: String) -> Result<Option<PaymentEntity>>;

    async fn list_by_booking(&self, booking_id: Uuid) -> Result<Vec<PaymentEntity>>;

    /// Re-validates the amount against the locked booking, then inserts the
    /// settled payment and updates the booking ledger in one transaction.
    async fn record_manual_payment(
        &self,
        booking_id: Uuid,
        payment: InsertPaymentEntity,
    ) -> Result<ManualPaymentOutcome>;

    /// Marks a gateway payment paid and applies it to its booking, unless the
    /// payment is already paid.
    async fn settle_gateway_payment(&self, settlement: SettleGatewayPayment) -> Result<SettlementOutcome>;

    /// Returns false when the payment was not pending.
    async fn mark_expired(&self, payment_id: Uuid) -> Result<bool>;
}
