use std::sync::Arc;

use chrono::Utc;
use staydesk::{
    domain::{
        entities::{bookings::BookingEntity, payments::InsertPaymentEntity},
        repositories::{
            bookings::BookingRepository, guests::GuestRepository, payments::PaymentRepository,
        },
        value_objects::{
            bookings::BookingDto,
            enums::{
                notification_types::NotificationType, payment_methods::PaymentMethod,
                payment_statuses::PaymentStatus,
            },
            ledger::{LedgerError, apply_manual_payment},
            payments::{
                CallbackAck, CallbackOutcome, GatewayCallbackPayload, ManualPaymentOutcome,
                RecordPaymentModel, SettleGatewayPayment, SettlementOutcome,
            },
        },
    },
    notifications::templates::{format_amount, payment_receipt},
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::dispatch::Dispatcher;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("booking not found")]
    BookingNotFound,
    #[error(transparent)]
    Rejected(#[from] LedgerError),
    #[error("invalid callback token")]
    InvalidCallbackToken,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl PaymentError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            PaymentError::BookingNotFound => StatusCode::NOT_FOUND,
            PaymentError::Rejected(LedgerError::NonPositiveAmount) => StatusCode::BAD_REQUEST,
            PaymentError::Rejected(_) => StatusCode::CONFLICT,
            PaymentError::InvalidCallbackToken => StatusCode::UNAUTHORIZED,
            PaymentError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, PaymentError>;

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

pub struct PaymentUseCase<B, P, G>
where
    B: BookingRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    G: GuestRepository + Send + Sync + 'static,
{
    booking_repo: Arc<B>,
    payment_repo: Arc<P>,
    guest_repo: Arc<G>,
    dispatcher: Arc<Dispatcher>,
    callback_token: String,
}

impl<B, P, G> PaymentUseCase<B, P, G>
where
    B: BookingRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    G: GuestRepository + Send + Sync + 'static,
{
    pub fn new(
        booking_repo: Arc<B>,
        payment_repo: Arc<P>,
        guest_repo: Arc<G>,
        dispatcher: Arc<Dispatcher>,
        callback_token: String,
    ) -> Self {
        Self {
            booking_repo,
            payment_repo,
            guest_repo,
            dispatcher,
            callback_token,
        }
    }

    /// Front-desk payment. The amount is checked against the loaded booking
    /// first, then again under the row lock inside the repository.
    pub async fn record_payment(
        &self,
        booking_id: Uuid,
        model: RecordPaymentModel,
    ) -> UseCaseResult<BookingDto> {
        let booking = self
            .booking_repo
            .find_by_id(booking_id)
            .await
            .map_err(|err| {
                error!(%booking_id, db_error = ?err, "payments: failed to load booking");
                PaymentError::Internal(err)
            })?
            .ok_or(PaymentError::BookingNotFound)?;

        if let Err(rejection) = apply_manual_payment(&booking, model.amount) {
            info!(%booking_id, amount = model.amount, %rejection, "payments: manual payment rejected");
            return Err(rejection.into());
        }

        let method = PaymentMethod::from(model.method);
        let payment = InsertPaymentEntity {
            booking_id,
            amount: model.amount,
            method: method.to_string(),
            status: PaymentStatus::Paid.to_string(),
            gateway_invoice_id: None,
            gateway_invoice_url: None,
            gateway_channel: None,
            notes: model.notes,
            paid_at: Some(Utc::now()),
        };

        let outcome = self
            .payment_repo
            .record_manual_payment(booking_id, payment)
            .await
            .map_err(|err| {
                error!(%booking_id, db_error = ?err, "payments: failed to record manual payment");
                PaymentError::Internal(err)
            })?;

        match outcome {
            ManualPaymentOutcome::Applied { booking, payment } => {
                info!(
                    %booking_id,
                    payment_id = %payment.id,
                    amount = payment.amount,
                    %method,
                    paid_amount = booking.paid_amount,
                    "payments: manual payment recorded"
                );
                self.announce_payment(&booking, payment.amount, method).await;
                Ok(BookingDto::from(booking))
            }
            ManualPaymentOutcome::Rejected(rejection) => {
                info!(%booking_id, %rejection, "payments: manual payment rejected under lock");
                Err(rejection.into())
            }
            ManualPaymentOutcome::BookingNotFound => Err(PaymentError::BookingNotFound),
        }
    }

    /// Applies an invoice callback. Replays and unknown invoices are
    /// acknowledged so the gateway stops retrying.
    pub async fn handle_callback(
        &self,
        token: Option<String>,
        payload: GatewayCallbackPayload,
    ) -> UseCaseResult<CallbackAck> {
        let authorized = !self.callback_token.is_empty()
            && token
                .as_deref()
                .is_some_and(|token| constant_time_compare(token, &self.callback_token));
        if !authorized {
            warn!(invoice_id = %payload.id, "payments: callback with invalid token");
            return Err(PaymentError::InvalidCallbackToken);
        }

        let invoice_id = payload.id.clone();
        let Some(payment) = self
            .payment_repo
            .find_by_gateway_invoice_id(invoice_id.clone())
            .await
            .map_err(|err| {
                error!(%invoice_id, db_error = ?err, "payments: failed to look up invoice");
                PaymentError::Internal(err)
            })?
        else {
            info!(%invoice_id, "payments: callback for unknown invoice");
            return Ok(CallbackAck::new(CallbackOutcome::UnknownPayment));
        };

        let outcome = match PaymentStatus::from_gateway(&payload.status) {
            PaymentStatus::Paid => {
                let settlement = SettleGatewayPayment {
                    payment_id: payment.id,
                    amount: payload.paid_amount_minor().unwrap_or(payment.amount),
                    channel: payload.channel_label(),
                    paid_at: payload.paid_at.unwrap_or_else(Utc::now),
                };
                let amount = settlement.amount;

                let settled = self
                    .payment_repo
                    .settle_gateway_payment(settlement)
                    .await
                    .map_err(|err| {
                        error!(%invoice_id, payment_id = %payment.id, db_error = ?err, "payments: settlement failed");
                        PaymentError::Internal(err)
                    })?;

                match settled {
                    SettlementOutcome::Applied(booking) => {
                        info!(
                            %invoice_id,
                            booking_id = %booking.id,
                            amount,
                            paid_amount = booking.paid_amount,
                            payment_status = %booking.payment_status,
                            "payments: gateway payment settled"
                        );
                        self.announce_payment(&booking, amount, PaymentMethod::Gateway)
                            .await;
                        CallbackOutcome::Applied
                    }
                    SettlementOutcome::AlreadySettled => {
                        info!(%invoice_id, "payments: duplicate paid callback ignored");
                        CallbackOutcome::AlreadyApplied
                    }
                }
            }
            PaymentStatus::Expired => {
                let expired = self.payment_repo.mark_expired(payment.id).await.map_err(|err| {
                    error!(%invoice_id, db_error = ?err, "payments: failed to expire payment");
                    PaymentError::Internal(err)
                })?;
                if expired {
                    info!(%invoice_id, booking_id = %payment.booking_id, "payments: invoice expired");
                    CallbackOutcome::Expired
                } else {
                    CallbackOutcome::Ignored
                }
            }
            _ => {
                info!(%invoice_id, status = %payload.status, "payments: callback status ignored");
                CallbackOutcome::Ignored
            }
        };

        Ok(CallbackAck::new(outcome))
    }

    async fn announce_payment(&self, booking: &BookingEntity, amount: i64, method: PaymentMethod) {
        self.dispatcher.notify(
            NotificationType::PaymentReceived,
            format!("Payment received for {}", booking.booking_code),
            format!(
                "{} via {}; {} of {} paid",
                format_amount(amount),
                method,
                format_amount(booking.paid_amount),
                format_amount(booking.total_amount)
            ),
            Some(booking.id),
        );

        match self.guest_repo.find_by_id(booking.guest_id).await {
            Ok(Some(guest)) => self
                .dispatcher
                .send_email(payment_receipt(booking, &guest, amount, method)),
            Ok(None) => warn!(booking_id = %booking.id, "payments: guest missing, receipt skipped"),
            Err(err) => {
                warn!(booking_id = %booking.id, db_error = ?err, "payments: guest lookup failed, receipt skipped")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use chrono::NaiveDate;
    use staydesk::{
        domain::{
            entities::{bookings::InsertBookingEntity, guests::UpsertGuestEntity},
            repositories::{bookings::MockBookingRepository, payments::MockPaymentRepository},
            value_objects::enums::{
                booking_statuses::BookingStatus, payment_methods::OnsiteMethod,
                payment_statuses::BookingPaymentStatus,
            },
        },
        infra::memory::InMemoryStore,
        notifications::{EmailMessage, MockEmailSender},
    };

    const TOKEN: &str = "cb-token-123";

    async fn seed_booking(store: &InMemoryStore, total: i64) -> BookingEntity {
        let property = store.add_property("kemang", "Kemang Residence").unwrap();
        let room_type = store.add_room_type("Deluxe", 2, &[]).unwrap();
        let room = store.add_room(property.id, room_type.id, "101").unwrap();
        let guest = store
            .upsert_by_email(UpsertGuestEntity {
                full_name: "Ana Putri".to_string(),
                email: "ana@example.com".to_string(),
                phone: None,
                id_number: None,
            })
            .await
            .unwrap();

        store
            .insert_booking_if_available(InsertBookingEntity {
                booking_code: "BK-20260110-ABC234".to_string(),
                room_id: room.id,
                guest_id: guest.id,
                property_id: property.id,
                check_in: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
                check_out: NaiveDate::from_ymd_opt(2026, 1, 13).unwrap(),
                stay_type: "daily".to_string(),
                base_price: total,
                tax_amount: 0,
                service_fee: 0,
                discount_amount: 0,
                deposit_amount: total,
                total_amount: total,
                paid_amount: 0,
                payment_status: "unpaid".to_string(),
                status: "pending".to_string(),
                payment_method_type: "online".to_string(),
                special_requests: None,
            })
            .await
            .unwrap()
            .unwrap()
    }

    async fn seed_invoice(store: &InMemoryStore, booking: &BookingEntity, amount: i64) {
        store
            .insert_payment(InsertPaymentEntity {
                booking_id: booking.id,
                amount,
                method: "gateway".to_string(),
                status: "pending".to_string(),
                gateway_invoice_id: Some("inv_001".to_string()),
                gateway_invoice_url: Some("https://pay.example/inv_001".to_string()),
                gateway_channel: None,
                notes: None,
                paid_at: None,
            })
            .await
            .unwrap();
    }

    async fn stored_booking(store: &InMemoryStore, booking_id: Uuid) -> BookingEntity {
        BookingRepository::find_by_id(store, booking_id)
            .await
            .unwrap()
            .unwrap()
    }

    fn payments(
        store: &Arc<InMemoryStore>,
        dispatcher: Arc<Dispatcher>,
    ) -> PaymentUseCase<InMemoryStore, InMemoryStore, InMemoryStore> {
        PaymentUseCase::new(
            Arc::clone(store),
            Arc::clone(store),
            Arc::clone(store),
            dispatcher,
            TOKEN.to_string(),
        )
    }

    fn quiet_dispatcher(store: &Arc<InMemoryStore>) -> Arc<Dispatcher> {
        Arc::new(Dispatcher::new(store.clone(), None))
    }

    fn callback(status: &str, paid_amount: Option<f64>) -> GatewayCallbackPayload {
        GatewayCallbackPayload {
            id: "inv_001".to_string(),
            external_id: Some("BK-20260110-ABC234".to_string()),
            status: status.to_string(),
            paid_amount,
            payment_method: Some("BANK_TRANSFER".to_string()),
            payment_channel: Some("BCA".to_string()),
            paid_at: None,
        }
    }

    #[tokio::test]
    async fn paid_callback_settles_once_and_replays_are_acknowledged() {
        let store = Arc::new(InMemoryStore::new());
        let booking = seed_booking(&store, 1_000_000).await;
        seed_invoice(&store, &booking, 1_000_000).await;
        let dispatcher = quiet_dispatcher(&store);
        let usecase = payments(&store, Arc::clone(&dispatcher));

        let ack = usecase
            .handle_callback(Some(TOKEN.to_string()), callback("PAID", Some(1_000_000.0)))
            .await
            .unwrap();
        assert_eq!(ack.outcome, CallbackOutcome::Applied);

        let replay = usecase
            .handle_callback(Some(TOKEN.to_string()), callback("PAID", Some(1_000_000.0)))
            .await
            .unwrap();
        assert!(replay.received);
        assert_eq!(replay.outcome, CallbackOutcome::AlreadyApplied);

        let stored = stored_booking(&store, booking.id).await;
        assert_eq!(stored.paid_amount, 1_000_000);
        assert_eq!(stored.booking_payment_status(), BookingPaymentStatus::Paid);
        assert_eq!(stored.booking_status(), BookingStatus::Confirmed);

        let payment = &store.payments().unwrap()[0];
        assert_eq!(payment.status, "paid");
        assert_eq!(payment.gateway_channel.as_deref(), Some("BCA"));
        dispatcher.drain().await;
        assert_eq!(store.notifications().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn paid_callback_without_amount_uses_the_invoice_amount() {
        let store = Arc::new(InMemoryStore::new());
        let booking = seed_booking(&store, 1_000_000).await;
        seed_invoice(&store, &booking, 300_000).await;
        let usecase = payments(&store, quiet_dispatcher(&store));

        usecase
            .handle_callback(Some(TOKEN.to_string()), callback("SETTLED", None))
            .await
            .unwrap();

        let stored = stored_booking(&store, booking.id).await;
        assert_eq!(stored.paid_amount, 300_000);
        assert_eq!(stored.booking_payment_status(), BookingPaymentStatus::Partial);
    }

    #[tokio::test]
    async fn wrong_or_missing_token_is_unauthorized() {
        let mut payment_repo = MockPaymentRepository::new();
        payment_repo.expect_find_by_gateway_invoice_id().never();
        let usecase = PaymentUseCase::new(
            Arc::new(MockBookingRepository::new()),
            Arc::new(payment_repo),
            Arc::new(InMemoryStore::new()),
            Arc::new(Dispatcher::new(Arc::new(InMemoryStore::new()), None)),
            TOKEN.to_string(),
        );

        for token in [None, Some("cb-token-124".to_string()), Some(String::new())] {
            let err = usecase
                .handle_callback(token, callback("PAID", Some(1.0)))
                .await
                .unwrap_err();
            assert!(matches!(err, PaymentError::InvalidCallbackToken));
            assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
        }
    }

    #[tokio::test]
    async fn unknown_invoice_is_acknowledged_without_changes() {
        let store = Arc::new(InMemoryStore::new());
        let usecase = payments(&store, quiet_dispatcher(&store));

        let ack = usecase
            .handle_callback(Some(TOKEN.to_string()), callback("PAID", Some(10.0)))
            .await
            .unwrap();
        assert_eq!(ack.outcome, CallbackOutcome::UnknownPayment);
    }

    #[tokio::test]
    async fn expired_callback_marks_pending_payment_only_once() {
        let store = Arc::new(InMemoryStore::new());
        let booking = seed_booking(&store, 1_000_000).await;
        seed_invoice(&store, &booking, 1_000_000).await;
        let usecase = payments(&store, quiet_dispatcher(&store));

        let first = usecase
            .handle_callback(Some(TOKEN.to_string()), callback("EXPIRED", None))
            .await
            .unwrap();
        let second = usecase
            .handle_callback(Some(TOKEN.to_string()), callback("EXPIRED", None))
            .await
            .unwrap();

        assert_eq!(first.outcome, CallbackOutcome::Expired);
        assert_eq!(second.outcome, CallbackOutcome::Ignored);
        assert_eq!(store.payments().unwrap()[0].status, "expired");
        let stored = stored_booking(&store, booking.id).await;
        assert_eq!(stored.booking_status(), BookingStatus::Pending);
    }

    #[tokio::test]
    async fn front_desk_payment_updates_ledger_and_sends_receipt() {
        let store = Arc::new(InMemoryStore::new());
        let booking = seed_booking(&store, 1_000_000).await;
        let mut email = MockEmailSender::new();
        email
            .expect_send()
            .withf(|message: &EmailMessage| message.to == "ana@example.com")
            .times(1)
            .returning(|_| Box::pin(async { Ok(()) }));
        let dispatcher = Arc::new(Dispatcher::new(store.clone(), Some(Arc::new(email))));
        let usecase = payments(&store, Arc::clone(&dispatcher));

        let dto = usecase
            .record_payment(
                booking.id,
                RecordPaymentModel {
                    amount: 400_000,
                    method: OnsiteMethod::Cash,
                    notes: Some("front desk".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(dto.paid_amount, 400_000);
        assert_eq!(dto.outstanding_amount, 600_000);
        assert_eq!(dto.payment_status, BookingPaymentStatus::Partial);
        assert_eq!(dto.status, BookingStatus::Confirmed);
        assert_eq!(store.payments().unwrap()[0].method, "cash");
        dispatcher.drain().await;
    }

    #[tokio::test]
    async fn over_payment_is_rejected_and_changes_nothing() {
        let store = Arc::new(InMemoryStore::new());
        let booking = seed_booking(&store, 1_000_000).await;
        let usecase = payments(&store, quiet_dispatcher(&store));

        let err = usecase
            .record_payment(
                booking.id,
                RecordPaymentModel {
                    amount: 1_000_001,
                    method: OnsiteMethod::Transfer,
                    notes: None,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PaymentError::Rejected(LedgerError::ExceedsOutstanding { outstanding: 1_000_000, .. })
        ));
        assert_eq!(err.status_code(), axum::http::StatusCode::CONFLICT);
        assert!(store.payments().unwrap().is_empty());
        let stored = stored_booking(&store, booking.id).await;
        assert_eq!(stored.paid_amount, 0);
        assert_eq!(stored.booking_status(), BookingStatus::Pending);
    }

    #[tokio::test]
    async fn store_failure_during_settlement_is_internal() {
        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_find_by_gateway_invoice_id()
            .returning(|_| {
                Box::pin(async {
                    let now = Utc::now();
                    Ok(Some(staydesk::domain::entities::payments::PaymentEntity {
                        id: Uuid::new_v4(),
                        booking_id: Uuid::new_v4(),
                        amount: 100,
                        method: "gateway".to_string(),
                        status: "pending".to_string(),
                        gateway_invoice_id: Some("inv_001".to_string()),
                        gateway_invoice_url: None,
                        gateway_channel: None,
                        notes: None,
                        paid_at: None,
                        created_at: now,
                        updated_at: now,
                    }))
                })
            });
        payment_repo
            .expect_settle_gateway_payment()
            .returning(|_| Box::pin(async { Err(anyhow!("deadlock detected")) }));
        let usecase = PaymentUseCase::new(
            Arc::new(MockBookingRepository::new()),
            Arc::new(payment_repo),
            Arc::new(InMemoryStore::new()),
            Arc::new(Dispatcher::new(Arc::new(InMemoryStore::new()), None)),
            TOKEN.to_string(),
        );

        let err = usecase
            .handle_callback(Some(TOKEN.to_string()), callback("PAID", Some(100.0)))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn constant_time_compare_requires_exact_match() {
        assert!(constant_time_compare("abc", "abc"));
        assert!(!constant_time_compare("abc", "abd"));
        assert!(!constant_time_compare("abc", "abcd"));
    }
}
