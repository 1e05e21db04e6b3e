use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{Connection, PgConnection, QueryResult, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        entities::{
            bookings::BookingEntity,
            payments::{InsertPaymentEntity, PaymentEntity},
        },
        repositories::payments::PaymentRepository,
        value_objects::{
            enums::payment_statuses::PaymentStatus,
            ledger::{LedgerUpdate, apply_manual_payment, apply_settlement},
            payments::{ManualPaymentOutcome, SettleGatewayPayment, SettlementOutcome},
        },
    },
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{bookings, payments},
    },
};

pub struct PaymentPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PaymentPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

fn lock_booking(conn: &mut PgConnection, booking_id: Uuid) -> QueryResult<Option<BookingEntity>> {
    bookings::table
        .find(booking_id)
        .select(BookingEntity::as_select())
        .for_update()
        .first::<BookingEntity>(conn)
        .optional()
}

fn write_ledger(
    conn: &mut PgConnection,
    booking_id: Uuid,
    ledger: LedgerUpdate,
) -> QueryResult<BookingEntity> {
    update(bookings::table.find(booking_id))
        .set((
            bookings::paid_amount.eq(ledger.paid_amount),
            bookings::payment_status.eq(ledger.payment_status.as_str()),
            bookings::status.eq(ledger.status.as_str()),
            bookings::updated_at.eq(Utc::now()),
        ))
        .returning(BookingEntity::as_select())
        .get_result::<BookingEntity>(conn)
}

#[async_trait]
impl PaymentRepository for PaymentPostgres {
    async fn insert_payment(&self, payment: InsertPaymentEntity) -> Result<PaymentEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(payments::table)
            .values(&payment)
            .returning(PaymentEntity::as_select())
            .get_result::<PaymentEntity>(&mut conn)?;

        Ok(result)
    }

    async fn find_by_gateway_invoice_id(&self, invoice_id: String) -> Result<Option<PaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = payments::table
            .filter(payments::gateway_invoice_id.eq(invoice_id))
            .select(PaymentEntity::as_select())
            .first::<PaymentEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list_by_booking(&self, booking_id: Uuid) -> Result<Vec<PaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = payments::table
            .filter(payments::booking_id.eq(booking_id))
            .select(PaymentEntity::as_select())
            .order(payments::created_at.asc())
            .load::<PaymentEntity>(&mut conn)?;

        Ok(results)
    }

    async fn record_manual_payment(
        &self,
        booking_id: Uuid,
        payment: InsertPaymentEntity,
    ) -> Result<ManualPaymentOutcome> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let outcome = conn.transaction::<ManualPaymentOutcome, diesel::result::Error, _>(|tx| {
            let Some(booking) = lock_booking(tx, booking_id)? else {
                return Ok(ManualPaymentOutcome::BookingNotFound);
            };

            let ledger = match apply_manual_payment(&booking, payment.amount) {
                Ok(ledger) => ledger,
                Err(rejection) => return Ok(ManualPaymentOutcome::Rejected(rejection)),
            };

            let payment = insert_into(payments::table)
                .values(&payment)
                .returning(PaymentEntity::as_select())
                .get_result::<PaymentEntity>(tx)?;
            let booking = write_ledger(tx, booking_id, ledger)?;

            Ok(ManualPaymentOutcome::Applied { booking, payment })
        })?;

        Ok(outcome)
    }

    async fn settle_gateway_payment(&self, settlement: SettleGatewayPayment) -> Result<SettlementOutcome> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let outcome = conn.transaction::<SettlementOutcome, diesel::result::Error, _>(|tx| {
            // Only the first delivery flips the row; replays match nothing.
            let settled = update(payments::table)
                .filter(payments::id.eq(settlement.payment_id))
                .filter(payments::status.ne(PaymentStatus::Paid.as_str()))
                .set((
                    payments::status.eq(PaymentStatus::Paid.as_str()),
                    payments::amount.eq(settlement.amount),
                    payments::gateway_channel.eq(&settlement.channel),
                    payments::paid_at.eq(Some(settlement.paid_at)),
                    payments::updated_at.eq(Utc::now()),
                ))
                .returning(PaymentEntity::as_select())
                .get_result::<PaymentEntity>(tx)
                .optional()?;

            let Some(payment) = settled else {
                return Ok(SettlementOutcome::AlreadySettled);
            };

            let Some(booking) = lock_booking(tx, payment.booking_id)? else {
                return Err(diesel::result::Error::NotFound);
            };

            let ledger = apply_settlement(&booking, settlement.amount);
            let booking = write_ledger(tx, booking.id, ledger)?;

            Ok(SettlementOutcome::Applied(booking))
        })?;

        Ok(outcome)
    }

    async fn mark_expired(&self, payment_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let updated = update(payments::table)
            .filter(payments::id.eq(payment_id))
            .filter(payments::status.eq(PaymentStatus::Pending.as_str()))
            .set((
                payments::status.eq(PaymentStatus::Expired.as_str()),
                payments::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(updated > 0)
    }
}
