use std::sync::Arc;

use chrono::Utc;
use staydesk::domain::{
    entities::bookings::BookingEntity,
    repositories::{
        bookings::BookingRepository, payments::PaymentRepository, rooms::RoomRepository,
    },
    value_objects::{
        bookings::{BookingDto, PendingBookingsQuery, StatusTransition},
        enums::{
            booking_statuses::BookingStatus, notification_types::NotificationType,
            room_statuses::RoomStatus,
        },
        payments::PaymentDto,
    },
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::dispatch::Dispatcher;

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("booking not found")]
    NotFound,
    #[error("cannot move a booking from {from} to {to}")]
    InvalidTransition { from: BookingStatus, to: BookingStatus },
    #[error("booking was changed by another request, reload and retry")]
    ConcurrentChange,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl BookingError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            BookingError::NotFound => StatusCode::NOT_FOUND,
            BookingError::InvalidTransition { .. } | BookingError::ConcurrentChange => {
                StatusCode::CONFLICT
            }
            BookingError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, BookingError>;

pub struct BookingUseCase<B, P, Rm>
where
    B: BookingRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    Rm: RoomRepository + Send + Sync + 'static,
{
    booking_repo: Arc<B>,
    payment_repo: Arc<P>,
    room_repo: Arc<Rm>,
    dispatcher: Arc<Dispatcher>,
}

impl<B, P, Rm> BookingUseCase<B, P, Rm>
where
    B: BookingRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    Rm: RoomRepository + Send + Sync + 'static,
{
    pub fn new(
        booking_repo: Arc<B>,
        payment_repo: Arc<P>,
        room_repo: Arc<Rm>,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        Self {
            booking_repo,
            payment_repo,
            room_repo,
            dispatcher,
        }
    }

    pub async fn get(&self, booking_id: Uuid) -> UseCaseResult<BookingDto> {
        let booking = self
            .booking_repo
            .find_by_id(booking_id)
            .await
            .map_err(|err| {
                error!(%booking_id, db_error = ?err, "bookings: failed to load booking");
                BookingError::Internal(err)
            })?
            .ok_or(BookingError::NotFound)?;

        self.with_payments(booking).await
    }

    pub async fn get_by_code(&self, booking_code: &str) -> UseCaseResult<BookingDto> {
        let booking_code = booking_code.trim().to_ascii_uppercase();
        let booking = self
            .booking_repo
            .find_by_code(booking_code.clone())
            .await
            .map_err(|err| {
                error!(%booking_code, db_error = ?err, "bookings: failed to load booking by code");
                BookingError::Internal(err)
            })?
            .ok_or(BookingError::NotFound)?;

        self.with_payments(booking).await
    }

    pub async fn transition(
        &self,
        booking_id: Uuid,
        transition: StatusTransition,
    ) -> UseCaseResult<BookingDto> {
        let booking = self
            .booking_repo
            .find_by_id(booking_id)
            .await
            .map_err(|err| {
                error!(%booking_id, db_error = ?err, "bookings: failed to load booking");
                BookingError::Internal(err)
            })?
            .ok_or(BookingError::NotFound)?;

        let from = booking.booking_status();
        let to = transition.target();
        if !from.can_transition_to(to) {
            info!(%booking_id, %from, %to, "bookings: transition refused");
            return Err(BookingError::InvalidTransition { from, to });
        }

        let updated = self
            .booking_repo
            .transition_status(booking_id, from, to, Utc::now())
            .await
            .map_err(|err| {
                error!(%booking_id, %from, %to, db_error = ?err, "bookings: transition failed");
                BookingError::Internal(err)
            })?
            .ok_or_else(|| {
                warn!(%booking_id, %from, %to, "bookings: status moved underneath the transition");
                BookingError::ConcurrentChange
            })?;

        info!(%booking_id, %from, %to, "bookings: status changed");

        let room_status = match transition {
            StatusTransition::CheckIn => Some(RoomStatus::Occupied),
            StatusTransition::CheckOut => Some(RoomStatus::Available),
            StatusTransition::Cancel | StatusTransition::NoShow => None,
        };
        if let Some(room_status) = room_status
            && let Err(err) = self.room_repo.update_status(updated.room_id, room_status).await
        {
            error!(
                %booking_id,
                room_id = %updated.room_id,
                %room_status,
                db_error = ?err,
                "bookings: room status not updated"
            );
        }

        self.dispatcher.notify(
            NotificationType::BookingStatusChanged,
            format!("Booking {} is now {}", updated.booking_code, to),
            format!("Status moved from {from} to {to}"),
            Some(updated.id),
        );

        self.with_payments(updated).await
    }

    /// Pending bookings, oldest first, for the payment-timeout sweep.
    pub async fn list_pending(&self, query: PendingBookingsQuery) -> UseCaseResult<Vec<BookingDto>> {
        let bookings = self
            .booking_repo
            .list_pending(query.created_before)
            .await
            .map_err(|err| {
                error!(db_error = ?err, "bookings: failed to list pending bookings");
                BookingError::Internal(err)
            })?;

        Ok(bookings.into_iter().map(BookingDto::from).collect())
    }

    async fn with_payments(&self, booking: BookingEntity) -> UseCaseResult<BookingDto> {
        let payments = self
            .payment_repo
            .list_by_booking(booking.id)
            .await
            .map_err(|err| {
                error!(booking_id = %booking.id, db_error = ?err, "bookings: failed to list payments");
                BookingError::Internal(err)
            })?;

        let mut dto = BookingDto::from(booking);
        dto.payments = payments.into_iter().map(PaymentDto::from).collect();
        Ok(dto)
    }
}
