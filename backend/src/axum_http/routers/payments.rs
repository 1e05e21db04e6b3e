use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::HeaderMap,
    response::IntoResponse,
    routing::post,
};
use staydesk::domain::{
    repositories::{
        bookings::BookingRepository, guests::GuestRepository, payments::PaymentRepository,
    },
    value_objects::payments::{GatewayCallbackPayload, RecordPaymentModel},
};
use tracing::info;
use uuid::Uuid;

use crate::usecases::payments::PaymentUseCase;

pub const CALLBACK_TOKEN_HEADER: &str = "x-callback-token";

pub fn routes<B, P, G>(usecase: Arc<PaymentUseCase<B, P, G>>) -> Router
where
    B: BookingRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    G: GuestRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/bookings/:booking_id", post(record_payment))
        .route("/callback", post(gateway_callback))
        .with_state(usecase)
}

pub async fn record_payment<B, P, G>(
    State(usecase): State<Arc<PaymentUseCase<B, P, G>>>,
    Path(booking_id): Path<Uuid>,
    Json(model): Json<RecordPaymentModel>,
) -> impl IntoResponse
where
    B: BookingRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    G: GuestRepository + Send + Sync + 'static,
{
    info!(%booking_id, amount = model.amount, method = %model.method, "payments: manual payment request received");

    match usecase.record_payment(booking_id, model).await {
        Ok(booking) => Json(booking).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn gateway_callback<B, P, G>(
    State(usecase): State<Arc<PaymentUseCase<B, P, G>>>,
    headers: HeaderMap,
    Json(payload): Json<GatewayCallbackPayload>,
) -> impl IntoResponse
where
    B: BookingRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    G: GuestRepository + Send + Sync + 'static,
{
    info!(invoice_id = %payload.id, status = %payload.status, "payments: gateway callback received");

    let token = headers
        .get(CALLBACK_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    match usecase.handle_callback(token, payload).await {
        Ok(ack) => Json(ack).into_response(),
        Err(err) => err.into_response(),
    }
}
