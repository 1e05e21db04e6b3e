use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use staydesk::domain::{
    repositories::{
        availability::AvailabilityRepository, bookings::BookingRepository,
        guests::GuestRepository, payments::PaymentRepository, rooms::RoomRepository,
    },
    value_objects::reservations::{CreateReservationModel, QuoteQuery},
};
use tracing::info;

use crate::usecases::reservations::{PaymentGateway, ReservationUseCase};

pub fn routes<Rm, Av, B, G, P, Gw>(usecase: Arc<ReservationUseCase<Rm, Av, B, G, P, Gw>>) -> Router
where
    Rm: RoomRepository + Send + Sync + 'static,
    Av: AvailabilityRepository + Send + Sync + 'static,
    B: BookingRepository + Send + Sync + 'static,
    G: GuestRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    Gw: PaymentGateway + 'static,
{
    Router::new()
        .route("/", post(create_reservation))
        .route("/quote", get(quote))
        .with_state(usecase)
}

pub async fn create_reservation<Rm, Av, B, G, P, Gw>(
    State(usecase): State<Arc<ReservationUseCase<Rm, Av, B, G, P, Gw>>>,
    Json(model): Json<CreateReservationModel>,
) -> impl IntoResponse
where
    Rm: RoomRepository + Send + Sync + 'static,
    Av: AvailabilityRepository + Send + Sync + 'static,
    B: BookingRepository + Send + Sync + 'static,
    G: GuestRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    Gw: PaymentGateway + 'static,
{
    info!(room_id = %model.room_id, "reservations: create request received");

    match usecase.create_reservation(model).await {
        Ok(reservation) => (StatusCode::CREATED, Json(reservation)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn quote<Rm, Av, B, G, P, Gw>(
    State(usecase): State<Arc<ReservationUseCase<Rm, Av, B, G, P, Gw>>>,
    Query(query): Query<QuoteQuery>,
) -> impl IntoResponse
where
    Rm: RoomRepository + Send + Sync + 'static,
    Av: AvailabilityRepository + Send + Sync + 'static,
    B: BookingRepository + Send + Sync + 'static,
    G: GuestRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    Gw: PaymentGateway + 'static,
{
    match usecase.quote(query).await {
        Ok(quote) => Json(quote).into_response(),
        Err(err) => err.into_response(),
    }
}
