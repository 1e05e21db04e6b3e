use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
};
use staydesk::domain::{
    repositories::{
        bookings::BookingRepository, payments::PaymentRepository, rooms::RoomRepository,
    },
    value_objects::bookings::{PendingBookingsQuery, StatusTransition},
};
use tracing::info;
use uuid::Uuid;

use crate::usecases::bookings::BookingUseCase;

pub fn routes<B, P, Rm>(usecase: Arc<BookingUseCase<B, P, Rm>>) -> Router
where
    B: BookingRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    Rm: RoomRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/pending", get(list_pending))
        .route("/code/:booking_code", get(get_by_code))
        .route("/:booking_id", get(get_booking))
        .route("/:booking_id/check-in", post(check_in))
        .route("/:booking_id/check-out", post(check_out))
        .route("/:booking_id/cancel", post(cancel))
        .route("/:booking_id/no-show", post(no_show))
        .with_state(usecase)
}

pub async fn get_booking<B, P, Rm>(
    State(usecase): State<Arc<BookingUseCase<B, P, Rm>>>,
    Path(booking_id): Path<Uuid>,
) -> impl IntoResponse
where
    B: BookingRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    Rm: RoomRepository + Send + Sync + 'static,
{
    match usecase.get(booking_id).await {
        Ok(booking) => Json(booking).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn get_by_code<B, P, Rm>(
    State(usecase): State<Arc<BookingUseCase<B, P, Rm>>>,
    Path(booking_code): Path<String>,
) -> impl IntoResponse
where
    B: BookingRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    Rm: RoomRepository + Send + Sync + 'static,
{
    match usecase.get_by_code(&booking_code).await {
        Ok(booking) => Json(booking).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn list_pending<B, P, Rm>(
    State(usecase): State<Arc<BookingUseCase<B, P, Rm>>>,
    Query(query): Query<PendingBookingsQuery>,
) -> impl IntoResponse
where
    B: BookingRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    Rm: RoomRepository + Send + Sync + 'static,
{
    match usecase.list_pending(query).await {
        Ok(bookings) => Json(bookings).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn apply<B, P, Rm>(
    usecase: Arc<BookingUseCase<B, P, Rm>>,
    booking_id: Uuid,
    transition: StatusTransition,
) -> axum::response::Response
where
    B: BookingRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    Rm: RoomRepository + Send + Sync + 'static,
{
    info!(%booking_id, ?transition, "bookings: transition request received");

    match usecase.transition(booking_id, transition).await {
        Ok(booking) => Json(booking).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn check_in<B, P, Rm>(
    State(usecase): State<Arc<BookingUseCase<B, P, Rm>>>,
    Path(booking_id): Path<Uuid>,
) -> impl IntoResponse
where
    B: BookingRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    Rm: RoomRepository + Send + Sync + 'static,
{
    apply(usecase, booking_id, StatusTransition::CheckIn).await
}

pub async fn check_out<B, P, Rm>(
    State(usecase): State<Arc<BookingUseCase<B, P, Rm>>>,
    Path(booking_id): Path<Uuid>,
) -> impl IntoResponse
where
    B: BookingRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    Rm: RoomRepository + Send + Sync + 'static,
{
    apply(usecase, booking_id, StatusTransition::CheckOut).await
}

pub async fn cancel<B, P, Rm>(
    State(usecase): State<Arc<BookingUseCase<B, P, Rm>>>,
    Path(booking_id): Path<Uuid>,
) -> impl IntoResponse
where
    B: BookingRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    Rm: RoomRepository + Send + Sync + 'static,
{
    apply(usecase, booking_id, StatusTransition::Cancel).await
}

pub async fn no_show<B, P, Rm>(
    State(usecase): State<Arc<BookingUseCase<B, P, Rm>>>,
    Path(booking_id): Path<Uuid>,
) -> impl IntoResponse
where
    B: BookingRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    Rm: RoomRepository + Send + Sync + 'static,
{
    apply(usecase, booking_id, StatusTransition::NoShow).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::dispatch::Dispatcher;
    use axum::{body::Body, http::Request, http::StatusCode};
    use staydesk::infra::memory::InMemoryStore;
    use tower::ServiceExt;

    fn app(store: &Arc<InMemoryStore>) -> Router {
        routes(Arc::new(BookingUseCase::new(
            Arc::clone(store),
            Arc::clone(store),
            Arc::clone(store),
            Arc::new(Dispatcher::new(store.clone(), None)),
        )))
    }

    #[tokio::test]
    async fn unknown_booking_is_not_found_for_reads_and_transitions() {
        let store = Arc::new(InMemoryStore::new());
        let id = Uuid::new_v4();

        let response = app(&store)
            .oneshot(Request::builder().uri(format!("/{id}")).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app(&store)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/{id}/check-in"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn pending_set_is_reachable_without_filters() {
        let store = Arc::new(InMemoryStore::new());

        let response = app(&store)
            .oneshot(Request::builder().uri("/pending").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
