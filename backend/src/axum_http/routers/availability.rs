use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use staydesk::domain::{
    repositories::{availability::AvailabilityRepository, rooms::RoomRepository},
    value_objects::rooms::{AvailabilityQuery, CreateRoomBlockModel, RoomAvailabilityQuery},
};
use tracing::info;
use uuid::Uuid;

use crate::usecases::availability::AvailabilityUseCase;

pub fn routes<A, Rm>(usecase: Arc<AvailabilityUseCase<A, Rm>>) -> Router
where
    A: AvailabilityRepository + Send + Sync + 'static,
    Rm: RoomRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/available", get(find_available))
        .route("/rooms-left", get(rooms_left))
        .route("/:room_id/availability", get(is_available))
        .route("/:room_id/blocks", post(create_block))
        .with_state(usecase)
}

pub async fn find_available<A, Rm>(
    State(usecase): State<Arc<AvailabilityUseCase<A, Rm>>>,
    Query(query): Query<AvailabilityQuery>,
) -> impl IntoResponse
where
    A: AvailabilityRepository + Send + Sync + 'static,
    Rm: RoomRepository + Send + Sync + 'static,
{
    match usecase.find_available(query).await {
        Ok(rooms) => Json(rooms).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn rooms_left<A, Rm>(
    State(usecase): State<Arc<AvailabilityUseCase<A, Rm>>>,
    Query(query): Query<AvailabilityQuery>,
) -> impl IntoResponse
where
    A: AvailabilityRepository + Send + Sync + 'static,
    Rm: RoomRepository + Send + Sync + 'static,
{
    match usecase.rooms_left(query).await {
        Ok(counts) => Json(counts).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn is_available<A, Rm>(
    State(usecase): State<Arc<AvailabilityUseCase<A, Rm>>>,
    Path(room_id): Path<Uuid>,
    Query(query): Query<RoomAvailabilityQuery>,
) -> impl IntoResponse
where
    A: AvailabilityRepository + Send + Sync + 'static,
    Rm: RoomRepository + Send + Sync + 'static,
{
    match usecase.is_available(room_id, query).await {
        Ok(availability) => Json(availability).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn create_block<A, Rm>(
    State(usecase): State<Arc<AvailabilityUseCase<A, Rm>>>,
    Path(room_id): Path<Uuid>,
    Json(model): Json<CreateRoomBlockModel>,
) -> impl IntoResponse
where
    A: AvailabilityRepository + Send + Sync + 'static,
    Rm: RoomRepository + Send + Sync + 'static,
{
    info!(%room_id, start_date = %model.start_date, end_date = %model.end_date, "availability: block request received");

    match usecase.create_block(room_id, model).await {
        Ok(block) => (StatusCode::CREATED, Json(block)).into_response(),
        Err(err) => err.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use http_body_util::BodyExt;
    use staydesk::infra::memory::InMemoryStore;
    use tower::ServiceExt;

    #[tokio::test]
    async fn search_lists_rooms_with_nested_property_and_type() {
        let store = Arc::new(InMemoryStore::new());
        let property = store.add_property("kemang", "Kemang Residence").unwrap();
        let room_type = store.add_room_type("Deluxe", 2, &["wifi"]).unwrap();
        store.add_room(property.id, room_type.id, "101").unwrap();
        let app = routes(Arc::new(AvailabilityUseCase::new(Arc::clone(&store), Arc::clone(&store))));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/available?check_in=2026-02-01&check_out=2026-02-03")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["property"]["slug"], "kemang");
        assert_eq!(body[0]["room_type"]["name"], "Deluxe");
    }

    #[tokio::test]
    async fn unknown_room_is_not_found() {
        let store = Arc::new(InMemoryStore::new());
        let app = routes(Arc::new(AvailabilityUseCase::new(Arc::clone(&store), Arc::clone(&store))));

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!(
                        "/{}/availability?check_in=2026-02-01&check_out=2026-02-03",
                        Uuid::new_v4()
                    ))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
