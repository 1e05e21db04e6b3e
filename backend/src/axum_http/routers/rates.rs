use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use staydesk::domain::{
    repositories::{rates::RateRepository, rooms::RoomRepository},
    value_objects::{
        enums::stay_types::StayType,
        rates::{BulkRoomRateModel, RateListQuery, UpsertRateModel, UpsertRoomRateModel},
    },
};
use tracing::info;
use uuid::Uuid;

use crate::usecases::rate_admin::RateAdminUseCase;

pub fn routes<Rt, Rm>(usecase: Arc<RateAdminUseCase<Rt, Rm>>) -> Router
where
    Rt: RateRepository + Send + Sync + 'static,
    Rm: RoomRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list_rates).put(upsert_rate))
        .route("/rooms", post(upsert_room_rate))
        .route("/rooms/:room_id", get(list_room_rates))
        .route("/rooms/:room_id/:stay_type", delete(deactivate_room_rate))
        .route("/properties/:property_id/bulk", post(bulk_room_rate))
        .with_state(usecase)
}

pub async fn upsert_rate<Rt, Rm>(
    State(usecase): State<Arc<RateAdminUseCase<Rt, Rm>>>,
    Json(model): Json<UpsertRateModel>,
) -> impl IntoResponse
where
    Rt: RateRepository + Send + Sync + 'static,
    Rm: RoomRepository + Send + Sync + 'static,
{
    info!(room_type_id = %model.room_type_id, stay_type = %model.stay_type, "rate_admin: rate upsert request received");

    match usecase.upsert_rate(model).await {
        Ok(rate) => Json(rate).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn list_rates<Rt, Rm>(
    State(usecase): State<Arc<RateAdminUseCase<Rt, Rm>>>,
    Query(query): Query<RateListQuery>,
) -> impl IntoResponse
where
    Rt: RateRepository + Send + Sync + 'static,
    Rm: RoomRepository + Send + Sync + 'static,
{
    match usecase.list_rates(query.room_type_id).await {
        Ok(rates) => Json(rates).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn upsert_room_rate<Rt, Rm>(
    State(usecase): State<Arc<RateAdminUseCase<Rt, Rm>>>,
    Json(model): Json<UpsertRoomRateModel>,
) -> impl IntoResponse
where
    Rt: RateRepository + Send + Sync + 'static,
    Rm: RoomRepository + Send + Sync + 'static,
{
    match usecase.upsert_room_rate(model).await {
        Ok(rate_override) => Json(rate_override).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn list_room_rates<Rt, Rm>(
    State(usecase): State<Arc<RateAdminUseCase<Rt, Rm>>>,
    Path(room_id): Path<Uuid>,
) -> impl IntoResponse
where
    Rt: RateRepository + Send + Sync + 'static,
    Rm: RoomRepository + Send + Sync + 'static,
{
    match usecase.list_room_rates(room_id).await {
        Ok(overrides) => Json(overrides).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn deactivate_room_rate<Rt, Rm>(
    State(usecase): State<Arc<RateAdminUseCase<Rt, Rm>>>,
    Path((room_id, stay_type)): Path<(Uuid, StayType)>,
) -> impl IntoResponse
where
    Rt: RateRepository + Send + Sync + 'static,
    Rm: RoomRepository + Send + Sync + 'static,
{
    match usecase.deactivate_room_rate(room_id, stay_type).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn bulk_room_rate<Rt, Rm>(
    State(usecase): State<Arc<RateAdminUseCase<Rt, Rm>>>,
    Path(property_id): Path<Uuid>,
    Json(model): Json<BulkRoomRateModel>,
) -> impl IntoResponse
where
    Rt: RateRepository + Send + Sync + 'static,
    Rm: RoomRepository + Send + Sync + 'static,
{
    match usecase.bulk_room_rate(property_id, model).await {
        Ok(result) => Json(result).into_response(),
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
    async fn rate_upsert_then_list_round_trips_over_http() {
        let store = Arc::new(InMemoryStore::new());
        let room_type = store.add_room_type("Deluxe", 2, &[]).unwrap();
        let app = routes(Arc::new(RateAdminUseCase::new(Arc::clone(&store), Arc::clone(&store))));

        let body = serde_json::json!({
            "room_type_id": room_type.id,
            "property_id": null,
            "stay_type": "weekly",
            "price": 2_000_000
        });
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/?room_type_id={}", room_type.id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let rates: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(rates[0]["price"], 2_000_000);
        assert_eq!(rates[0]["deposit_percentage"], 100.0);
    }

    #[tokio::test]
    async fn deactivating_a_missing_override_is_not_found() {
        let store = Arc::new(InMemoryStore::new());
        let app = routes(Arc::new(RateAdminUseCase::new(Arc::clone(&store), Arc::clone(&store))));

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/rooms/{}/daily", Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
