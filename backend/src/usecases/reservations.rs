use std::sync::Arc;

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use chrono::Utc;
use staydesk::{
    domain::{
        entities::{
            bookings::{BookingEntity, InsertBookingEntity},
            guests::GuestEntity,
            payments::InsertPaymentEntity,
        },
        repositories::{
            availability::AvailabilityRepository, bookings::BookingRepository,
            guests::GuestRepository, payments::PaymentRepository, rooms::RoomRepository,
        },
        value_objects::{
            bookings::generate_booking_code,
            enums::{
                booking_statuses::BookingStatus, notification_types::NotificationType,
                payment_method_types::PaymentMethodType, payment_methods::PaymentMethod,
                payment_statuses::{BookingPaymentStatus, PaymentStatus},
                room_statuses::RoomStatus, stay_types::StayType,
            },
            payments::{GatewayInvoice, GatewayInvoiceRequest},
            pricing::{PriceBreakdown, calculate_price, suggest_stay_type},
            rates::{RateQuery, ResolvedRate},
            reservations::{CreateReservationModel, QuoteDto, QuoteQuery, ReservationDto},
            rooms::RoomDetails,
            stays::StayDates,
            validation::{FieldError, parse_stay_dates},
        },
    },
    notifications::templates::{BookingConfirmation, booking_confirmation, format_amount},
    payments::gateway_client::GatewayClient,
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::{dispatch::Dispatcher, rate_resolver::RateResolver};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_invoice(&self, request: GatewayInvoiceRequest) -> AnyResult<GatewayInvoice>;
}

#[async_trait]
impl PaymentGateway for GatewayClient {
    async fn create_invoice(&self, request: GatewayInvoiceRequest) -> AnyResult<GatewayInvoice> {
        self.create_invoice(&request).await
    }
}

#[derive(Debug, Error)]
pub enum ReservationError {
    #[error("invalid reservation request")]
    Validation(Vec<FieldError>),
    #[error("room not found")]
    RoomNotFound,
    #[error("room is no longer available for the selected dates")]
    RoomUnavailable,
    #[error("no {0} pricing is configured for this room")]
    NoRateConfigured(StayType),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ReservationError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            ReservationError::Validation(_) | ReservationError::NoRateConfigured(_) => {
                StatusCode::BAD_REQUEST
            }
            ReservationError::RoomNotFound => StatusCode::NOT_FOUND,
            ReservationError::RoomUnavailable => StatusCode::CONFLICT,
            ReservationError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, ReservationError>;

/// Amount requested from the gateway. Override-priced rooms carry no deposit
/// percentage, so a zero deposit falls back to the full total.
fn online_amount(method: PaymentMethodType, pricing: &PriceBreakdown) -> i64 {
    match method {
        PaymentMethodType::DpOnline if pricing.deposit > 0 => pricing.deposit,
        PaymentMethodType::PayAtProperty => 0,
        _ => pricing.total,
    }
}

pub struct ReservationUseCase<Rm, Av, B, G, P, Gw>
where
    Rm: RoomRepository + Send + Sync + 'static,
    Av: AvailabilityRepository + Send + Sync + 'static,
    B: BookingRepository + Send + Sync + 'static,
    G: GuestRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    Gw: PaymentGateway + 'static,
{
    room_repo: Arc<Rm>,
    availability_repo: Arc<Av>,
    booking_repo: Arc<B>,
    guest_repo: Arc<G>,
    payment_repo: Arc<P>,
    gateway: Arc<Gw>,
    rate_resolver: Arc<RateResolver>,
    dispatcher: Arc<Dispatcher>,
}

impl<Rm, Av, B, G, P, Gw> ReservationUseCase<Rm, Av, B, G, P, Gw>
where
    Rm: RoomRepository + Send + Sync + 'static,
    Av: AvailabilityRepository + Send + Sync + 'static,
    B: BookingRepository + Send + Sync + 'static,
    G: GuestRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    Gw: PaymentGateway + 'static,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        room_repo: Arc<Rm>,
        availability_repo: Arc<Av>,
        booking_repo: Arc<B>,
        guest_repo: Arc<G>,
        payment_repo: Arc<P>,
        gateway: Arc<Gw>,
        rate_resolver: Arc<RateResolver>,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        Self {
            room_repo,
            availability_repo,
            booking_repo,
            guest_repo,
            payment_repo,
            gateway,
            rate_resolver,
            dispatcher,
        }
    }

    pub async fn create_reservation(&self, model: CreateReservationModel) -> UseCaseResult<ReservationDto> {
        let request = model.validate(Utc::now().date_naive()).map_err(|fields| {
            info!(
                room_id = %model.room_id,
                field_count = fields.len(),
                "reservations: request rejected by validation"
            );
            ReservationError::Validation(fields)
        })?;
        let room_id = request.room_id;
        let stay = request.stay;

        let details = self.load_room(room_id).await?;
        if !details.property.is_active
            || matches!(
                details.room.room_status(),
                RoomStatus::Maintenance | RoomStatus::Blocked
            )
        {
            info!(%room_id, status = %details.room.status, "reservations: room is out of service");
            return Err(ReservationError::RoomUnavailable);
        }

        let available = self
            .availability_repo
            .is_room_available(room_id, stay.check_in, stay.check_out, None)
            .await
            .map_err(|err| {
                error!(%room_id, db_error = ?err, "reservations: availability check failed");
                ReservationError::Internal(err)
            })?;
        if !available {
            info!(
                %room_id,
                check_in = %stay.check_in,
                check_out = %stay.check_out,
                "reservations: room already booked for the dates"
            );
            return Err(ReservationError::RoomUnavailable);
        }

        let stay_type = request
            .stay_type
            .unwrap_or_else(|| suggest_stay_type(stay.nights()));
        let rate = self.resolve_rate(&details, stay_type).await?;
        let pricing = calculate_price(&rate, &stay, stay_type);

        let guest = self
            .guest_repo
            .upsert_by_email(request.guest.to_upsert_entity())
            .await
            .map_err(|err| {
                error!(%room_id, db_error = ?err, "reservations: guest upsert failed");
                ReservationError::Internal(err)
            })?;

        let method = request.payment_method_type;
        let booking = self
            .booking_repo
            .insert_booking_if_available(InsertBookingEntity {
                booking_code: generate_booking_code(Utc::now().date_naive()),
                room_id,
                guest_id: guest.id,
                property_id: details.property.id,
                check_in: stay.check_in,
                check_out: stay.check_out,
                stay_type: stay_type.to_string(),
                base_price: pricing.base_price,
                tax_amount: pricing.tax,
                service_fee: pricing.service_fee,
                discount_amount: pricing.discount,
                deposit_amount: pricing.deposit,
                total_amount: pricing.total,
                paid_amount: 0,
                payment_status: BookingPaymentStatus::Unpaid.to_string(),
                status: BookingStatus::Pending.to_string(),
                payment_method_type: method.to_string(),
                special_requests: request.special_requests.clone(),
            })
            .await
            .map_err(|err| {
                error!(%room_id, db_error = ?err, "reservations: booking insert failed");
                ReservationError::Internal(err)
            })?
            .ok_or_else(|| {
                info!(%room_id, "reservations: lost the race for the room");
                ReservationError::RoomUnavailable
            })?;

        info!(
            booking_id = %booking.id,
            booking_code = %booking.booking_code,
            %room_id,
            total = pricing.total,
            payment_method_type = %method,
            "reservations: booking created"
        );

        let amount_due_now = online_amount(method, &pricing);
        let (booking, payment_url) = match method {
            PaymentMethodType::Online | PaymentMethodType::DpOnline => {
                let payment_url = self
                    .open_invoice(&booking, &guest, &details, &stay, amount_due_now)
                    .await;
                (booking, payment_url)
            }
            PaymentMethodType::PayAtProperty => (self.confirm_pay_at_property(booking).await, None),
        };

        self.announce(&booking, &guest, &details, amount_due_now, payment_url.as_deref());

        Ok(ReservationDto {
            booking_id: booking.id,
            booking_code: booking.booking_code.clone(),
            status: booking.booking_status(),
            payment_status: booking.booking_payment_status(),
            payment_method_type: method,
            stay_type,
            check_in: stay.check_in,
            check_out: stay.check_out,
            nights: stay.nights(),
            pricing,
            amount_due_now,
            payment_url,
        })
    }

    /// Price preview for the booking page. No side effects.
    pub async fn quote(&self, query: QuoteQuery) -> UseCaseResult<QuoteDto> {
        let mut errors = Vec::new();
        let Some(stay) = parse_stay_dates(&query.check_in, &query.check_out, &mut errors) else {
            return Err(ReservationError::Validation(errors));
        };

        let details = self.load_room(query.room_id).await?;
        let stay_type = query
            .stay_type
            .unwrap_or_else(|| suggest_stay_type(stay.nights()));
        let rate = self.resolve_rate(&details, stay_type).await?;

        Ok(QuoteDto {
            room_id: query.room_id,
            stay_type,
            nights: stay.nights(),
            rate_source: rate.source,
            pricing: calculate_price(&rate, &stay, stay_type),
        })
    }

    async fn load_room(&self, room_id: Uuid) -> UseCaseResult<RoomDetails> {
        self.room_repo
            .find_room_details(room_id)
            .await
            .map_err(|err| {
                error!(%room_id, db_error = ?err, "reservations: failed to load room");
                ReservationError::Internal(err)
            })?
            .ok_or_else(|| {
                info!(%room_id, "reservations: room not found");
                ReservationError::RoomNotFound
            })
    }

    async fn resolve_rate(&self, details: &RoomDetails, stay_type: StayType) -> UseCaseResult<ResolvedRate> {
        let query = RateQuery {
            room_type_id: details.room_type.id,
            stay_type,
            room_id: Some(details.room.id),
            property_id: Some(details.property.id),
        };

        self.rate_resolver
            .resolve(&query)
            .await
            .map_err(|err| {
                error!(room_id = %details.room.id, db_error = ?err, "reservations: rate lookup failed");
                ReservationError::Internal(err)
            })?
            .ok_or_else(|| {
                warn!(
                    room_id = %details.room.id,
                    room_type_id = %details.room_type.id,
                    %stay_type,
                    "reservations: no rate configured"
                );
                ReservationError::NoRateConfigured(stay_type)
            })
    }

    /// Opens a gateway invoice and records the pending payment. Any failure
    /// leaves the booking pending without a payment link.
    async fn open_invoice(
        &self,
        booking: &BookingEntity,
        guest: &GuestEntity,
        details: &RoomDetails,
        stay: &StayDates,
        amount: i64,
    ) -> Option<String> {
        let request = GatewayInvoiceRequest {
            external_id: booking.booking_code.clone(),
            amount,
            payer_email: guest.email.clone(),
            description: format!(
                "{} room {}, {} night(s) from {}",
                details.property.name,
                details.room.room_number,
                stay.nights(),
                stay.check_in
            ),
        };

        let invoice = match self.gateway.create_invoice(request).await {
            Ok(invoice) => invoice,
            Err(err) => {
                warn!(
                    booking_id = %booking.id,
                    gateway_error = ?err,
                    "reservations: gateway invoice failed, booking stays pending"
                );
                return None;
            }
        };

        let payment = InsertPaymentEntity {
            booking_id: booking.id,
            amount,
            method: PaymentMethod::Gateway.to_string(),
            status: PaymentStatus::Pending.to_string(),
            gateway_invoice_id: Some(invoice.id.clone()),
            gateway_invoice_url: Some(invoice.invoice_url.clone()),
            gateway_channel: None,
            notes: None,
            paid_at: None,
        };
        match self.payment_repo.insert_payment(payment).await {
            Ok(_) => Some(invoice.invoice_url),
            Err(err) => {
                // Without the row the callback could never be matched.
                error!(
                    booking_id = %booking.id,
                    gateway_invoice_id = %invoice.id,
                    db_error = ?err,
                    "reservations: failed to record gateway payment"
                );
                None
            }
        }
    }

    async fn confirm_pay_at_property(&self, booking: BookingEntity) -> BookingEntity {
        let placeholder = InsertPaymentEntity {
            booking_id: booking.id,
            amount: 0,
            method: PaymentMethod::PayAtProperty.to_string(),
            status: PaymentStatus::Pending.to_string(),
            gateway_invoice_id: None,
            gateway_invoice_url: None,
            gateway_channel: None,
            notes: None,
            paid_at: None,
        };
        if let Err(err) = self.payment_repo.insert_payment(placeholder).await {
            warn!(booking_id = %booking.id, db_error = ?err, "reservations: placeholder payment not stored");
        }

        match self
            .booking_repo
            .transition_status(booking.id, BookingStatus::Pending, BookingStatus::Confirmed, Utc::now())
            .await
        {
            Ok(Some(confirmed)) => confirmed,
            Ok(None) => {
                warn!(booking_id = %booking.id, "reservations: booking left pending before confirmation");
                booking
            }
            Err(err) => {
                error!(booking_id = %booking.id, db_error = ?err, "reservations: failed to confirm booking");
                booking
            }
        }
    }

    fn announce(
        &self,
        booking: &BookingEntity,
        guest: &GuestEntity,
        details: &RoomDetails,
        amount_due_now: i64,
        payment_url: Option<&str>,
    ) {
        self.dispatcher.notify(
            NotificationType::NewBooking,
            format!("New booking {}", booking.booking_code),
            format!(
                "{} booked room {} at {} from {} to {} ({})",
                guest.full_name,
                details.room.room_number,
                details.property.name,
                booking.check_in,
                booking.check_out,
                format_amount(booking.total_amount)
            ),
            Some(booking.id),
        );

        self.dispatcher
            .send_email(booking_confirmation(&BookingConfirmation {
                booking,
                guest,
                property_name: &details.property.name,
                room_number: &details.room.room_number,
                amount_due_now,
                payment_url,
            }));
    }
}
