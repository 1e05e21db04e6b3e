use std::sync::Arc;

use staydesk::domain::{
    entities::rates::UpsertRoomRateOverrideEntity,
    repositories::{rates::RateRepository, rooms::RoomRepository},
    value_objects::{
        enums::stay_types::StayType,
        rates::{
            BulkRoomRateDto, BulkRoomRateModel, RateDto, RoomRateDto, UpsertRateModel,
            UpsertRoomRateModel,
        },
    },
};
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RateAdminError {
    #[error("{0}")]
    Validation(String),
    #[error("room not found")]
    RoomNotFound,
    #[error("no active {0} override for this room")]
    OverrideNotFound(StayType),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl RateAdminError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            RateAdminError::Validation(_) => StatusCode::BAD_REQUEST,
            RateAdminError::RoomNotFound | RateAdminError::OverrideNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            RateAdminError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, RateAdminError>;

fn ensure_price(price: i64) -> UseCaseResult<()> {
    if price < 0 {
        return Err(RateAdminError::Validation(
            "price must not be negative".to_string(),
        ));
    }
    Ok(())
}

pub struct RateAdminUseCase<Rt, Rm>
where
    Rt: RateRepository + Send + Sync + 'static,
    Rm: RoomRepository + Send + Sync + 'static,
{
    rate_repo: Arc<Rt>,
    room_repo: Arc<Rm>,
}

impl<Rt, Rm> RateAdminUseCase<Rt, Rm>
where
    Rt: RateRepository + Send + Sync + 'static,
    Rm: RoomRepository + Send + Sync + 'static,
{
    pub fn new(rate_repo: Arc<Rt>, room_repo: Arc<Rm>) -> Self {
        Self {
            rate_repo,
            room_repo,
        }
    }

    pub async fn upsert_rate(&self, model: UpsertRateModel) -> UseCaseResult<RateDto> {
        model.validate().map_err(RateAdminError::Validation)?;

        let rate = self
            .rate_repo
            .upsert_rate(model.to_entity())
            .await
            .map_err(|err| {
                error!(
                    room_type_id = %model.room_type_id,
                    stay_type = %model.stay_type,
                    db_error = ?err,
                    "rate_admin: rate upsert failed"
                );
                RateAdminError::Internal(err)
            })?;

        info!(
            rate_id = %rate.id,
            room_type_id = %rate.room_type_id,
            property_id = ?rate.property_id,
            stay_type = %rate.stay_type,
            price = rate.price,
            "rate_admin: rate saved"
        );
        Ok(RateDto::from(rate))
    }

    pub async fn upsert_room_rate(&self, model: UpsertRoomRateModel) -> UseCaseResult<RoomRateDto> {
        ensure_price(model.price)?;
        self.ensure_room(model.room_id).await?;

        let rate_override = self
            .rate_repo
            .upsert_override(model.to_entity())
            .await
            .map_err(|err| {
                error!(room_id = %model.room_id, db_error = ?err, "rate_admin: override upsert failed");
                RateAdminError::Internal(err)
            })?;

        info!(
            room_id = %rate_override.room_id,
            stay_type = %rate_override.stay_type,
            price = rate_override.price,
            "rate_admin: override saved"
        );
        Ok(RoomRateDto::from(rate_override))
    }

    pub async fn deactivate_room_rate(&self, room_id: Uuid, stay_type: StayType) -> UseCaseResult<()> {
        let deactivated = self
            .rate_repo
            .deactivate_override(room_id, stay_type)
            .await
            .map_err(|err| {
                error!(%room_id, %stay_type, db_error = ?err, "rate_admin: override deactivation failed");
                RateAdminError::Internal(err)
            })?;

        if !deactivated {
            return Err(RateAdminError::OverrideNotFound(stay_type));
        }
        info!(%room_id, %stay_type, "rate_admin: override deactivated");
        Ok(())
    }

    /// Writes the same override to every room of the property that is
    /// currently `available`, in one transaction.
    pub async fn bulk_room_rate(
        &self,
        property_id: Uuid,
        model: BulkRoomRateModel,
    ) -> UseCaseResult<BulkRoomRateDto> {
        ensure_price(model.price)?;

        let room_ids = self
            .room_repo
            .list_available_room_ids(property_id)
            .await
            .map_err(|err| {
                error!(%property_id, db_error = ?err, "rate_admin: failed to list rooms");
                RateAdminError::Internal(err)
            })?;

        let overrides = room_ids
            .into_iter()
            .map(|room_id| UpsertRoomRateOverrideEntity {
                room_id,
                stay_type: model.stay_type.to_string(),
                price: model.price,
            })
            .collect::<Vec<_>>();

        let rooms_updated = if overrides.is_empty() {
            0
        } else {
            self.rate_repo
                .upsert_overrides(overrides)
                .await
                .map_err(|err| {
                    error!(%property_id, db_error = ?err, "rate_admin: bulk override failed");
                    RateAdminError::Internal(err)
                })?
        };

        info!(
            %property_id,
            stay_type = %model.stay_type,
            price = model.price,
            rooms_updated,
            "rate_admin: bulk override applied"
        );
        Ok(BulkRoomRateDto {
            property_id,
            stay_type: model.stay_type,
            rooms_updated,
        })
    }

    pub async fn list_rates(&self, room_type_id: Option<Uuid>) -> UseCaseResult<Vec<RateDto>> {
        let rates = self
            .rate_repo
            .list_active_rates(room_type_id)
            .await
            .map_err(|err| {
                error!(room_type_id = ?room_type_id, db_error = ?err, "rate_admin: failed to list rates");
                RateAdminError::Internal(err)
            })?;

        Ok(rates.into_iter().map(RateDto::from).collect())
    }

    pub async fn list_room_rates(&self, room_id: Uuid) -> UseCaseResult<Vec<RoomRateDto>> {
        let overrides = self
            .rate_repo
            .list_active_overrides(room_id)
            .await
            .map_err(|err| {
                error!(%room_id, db_error = ?err, "rate_admin: failed to list overrides");
                RateAdminError::Internal(err)
            })?;

        Ok(overrides.into_iter().map(RoomRateDto::from).collect())
    }

    async fn ensure_room(&self, room_id: Uuid) -> UseCaseResult<()> {
        self.room_repo
            .find_room_details(room_id)
            .await
            .map_err(|err| {
                error!(%room_id, db_error = ?err, "rate_admin: failed to load room");
                RateAdminError::Internal(err)
            })?
            .map(|_| ())
            .ok_or(RateAdminError::RoomNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use staydesk::{
        domain::{
            repositories::{rates::MockRateRepository, rooms::MockRoomRepository},
            value_objects::enums::room_statuses::RoomStatus,
        },
        infra::memory::InMemoryStore,
    };

    fn rate_model(room_type_id: Uuid, price: i64) -> UpsertRateModel {
        UpsertRateModel {
            room_type_id,
            property_id: None,
            stay_type: StayType::Daily,
            price,
            deposit_percentage: 100.0,
            tax_percentage: 11.0,
            service_fee: 25_000,
        }
    }

    #[tokio::test]
    async fn upserting_twice_keeps_one_active_rate() {
        let store = Arc::new(InMemoryStore::new());
        let room_type = store.add_room_type("Deluxe", 2, &[]).unwrap();
        let usecase = RateAdminUseCase::new(Arc::clone(&store), Arc::clone(&store));

        let first = usecase.upsert_rate(rate_model(room_type.id, 300_000)).await.unwrap();
        let second = usecase.upsert_rate(rate_model(room_type.id, 350_000)).await.unwrap();

        assert_eq!(first.id, second.id);
        let rates = usecase.list_rates(Some(room_type.id)).await.unwrap();
        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0].price, 350_000);
    }

    #[tokio::test]
    async fn invalid_rate_never_reaches_the_store() {
        let mut rate_repo = MockRateRepository::new();
        rate_repo.expect_upsert_rate().never();
        let usecase = RateAdminUseCase::new(Arc::new(rate_repo), Arc::new(MockRoomRepository::new()));

        let mut model = rate_model(Uuid::new_v4(), 300_000);
        model.deposit_percentage = 120.0;
        let err = usecase.upsert_rate(model).await.unwrap_err();

        assert!(matches!(err, RateAdminError::Validation(_)));
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn bulk_override_skips_rooms_that_are_not_available() {
        let store = Arc::new(InMemoryStore::new());
        let property = store.add_property("kemang", "Kemang Residence").unwrap();
        let room_type = store.add_room_type("Deluxe", 2, &[]).unwrap();
        let open_a = store.add_room(property.id, room_type.id, "101").unwrap();
        let open_b = store.add_room(property.id, room_type.id, "102").unwrap();
        let broken = store.add_room(property.id, room_type.id, "103").unwrap();
        store
            .update_status(broken.id, RoomStatus::Maintenance)
            .await
            .unwrap();
        let usecase = RateAdminUseCase::new(Arc::clone(&store), Arc::clone(&store));

        let result = usecase
            .bulk_room_rate(
                property.id,
                BulkRoomRateModel {
                    stay_type: StayType::Weekly,
                    price: 2_000_000,
                },
            )
            .await
            .unwrap();

        assert_eq!(result.rooms_updated, 2);
        for room_id in [open_a.id, open_b.id] {
            let overrides = usecase.list_room_rates(room_id).await.unwrap();
            assert_eq!(overrides.len(), 1);
            assert_eq!(overrides[0].price, 2_000_000);
        }
        assert!(usecase.list_room_rates(broken.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn override_lifecycle_and_missing_room() {
        let store = Arc::new(InMemoryStore::new());
        let property = store.add_property("kemang", "Kemang Residence").unwrap();
        let room_type = store.add_room_type("Deluxe", 2, &[]).unwrap();
        let room = store.add_room(property.id, room_type.id, "101").unwrap();
        let usecase = RateAdminUseCase::new(Arc::clone(&store), Arc::clone(&store));

        let model = |room_id, price| UpsertRoomRateModel {
            room_id,
            stay_type: StayType::Daily,
            price,
        };
        usecase.upsert_room_rate(model(room.id, 400_000)).await.unwrap();
        usecase.upsert_room_rate(model(room.id, 420_000)).await.unwrap();
        let overrides = usecase.list_room_rates(room.id).await.unwrap();
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides[0].price, 420_000);

        usecase
            .deactivate_room_rate(room.id, StayType::Daily)
            .await
            .unwrap();
        let err = usecase
            .deactivate_room_rate(room.id, StayType::Daily)
            .await
            .unwrap_err();
        assert!(matches!(err, RateAdminError::OverrideNotFound(StayType::Daily)));

        let err = usecase
            .upsert_room_rate(model(Uuid::new_v4(), 400_000))
            .await
            .unwrap_err();
        assert!(matches!(err, RateAdminError::RoomNotFound));
    }
}
