use std::{collections::BTreeMap, sync::Arc};

use staydesk::domain::{
    entities::rooms::InsertRoomBlockEntity,
    repositories::{availability::AvailabilityRepository, rooms::RoomRepository},
    value_objects::{
        rooms::{
            AvailabilityQuery, AvailabilitySearch, AvailableRoomDto, CreateRoomBlockModel,
            RoomAvailabilityDto, RoomAvailabilityQuery, RoomBlockDto, RoomDetails, RoomsLeftDto,
            RoomTypeSummary,
        },
        stays::StayDates,
        validation::{FieldError, parse_stay_dates},
    },
};
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AvailabilityError {
    #[error("invalid request")]
    Validation(Vec<FieldError>),
    #[error("room not found")]
    RoomNotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AvailabilityError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            AvailabilityError::Validation(_) => StatusCode::BAD_REQUEST,
            AvailabilityError::RoomNotFound => StatusCode::NOT_FOUND,
            AvailabilityError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, AvailabilityError>;

fn stay_from(check_in: &str, check_out: &str) -> UseCaseResult<StayDates> {
    let mut errors = Vec::new();
    parse_stay_dates(check_in, check_out, &mut errors).ok_or(AvailabilityError::Validation(errors))
}

pub struct AvailabilityUseCase<A, Rm>
where
    A: AvailabilityRepository + Send + Sync + 'static,
    Rm: RoomRepository + Send + Sync + 'static,
{
    availability_repo: Arc<A>,
    room_repo: Arc<Rm>,
}

impl<A, Rm> AvailabilityUseCase<A, Rm>
where
    A: AvailabilityRepository + Send + Sync + 'static,
    Rm: RoomRepository + Send + Sync + 'static,
{
    pub fn new(availability_repo: Arc<A>, room_repo: Arc<Rm>) -> Self {
        Self {
            availability_repo,
            room_repo,
        }
    }

    pub async fn is_available(
        &self,
        room_id: Uuid,
        query: RoomAvailabilityQuery,
    ) -> UseCaseResult<RoomAvailabilityDto> {
        let stay = stay_from(&query.check_in, &query.check_out)?;

        self.room_repo
            .find_room_details(room_id)
            .await
            .map_err(|err| {
                error!(%room_id, db_error = ?err, "availability: failed to load room");
                AvailabilityError::Internal(err)
            })?
            .ok_or(AvailabilityError::RoomNotFound)?;

        let available = self
            .availability_repo
            .is_room_available(room_id, stay.check_in, stay.check_out, query.exclude_booking_id)
            .await
            .map_err(|err| {
                error!(%room_id, db_error = ?err, "availability: single-room check failed");
                AvailabilityError::Internal(err)
            })?;

        Ok(RoomAvailabilityDto {
            room_id,
            check_in: stay.check_in,
            check_out: stay.check_out,
            available,
        })
    }

    /// Excludes rooms with an overlapping booking or maintenance block, then
    /// selects the remaining open rooms in one query.
    pub async fn find_available(&self, query: AvailabilityQuery) -> UseCaseResult<Vec<AvailableRoomDto>> {
        let rooms = self.open_rooms(query).await?;
        Ok(rooms.iter().map(AvailableRoomDto::from).collect())
    }

    /// Advisory count per room type; nothing is held.
    pub async fn rooms_left(&self, query: AvailabilityQuery) -> UseCaseResult<Vec<RoomsLeftDto>> {
        let rooms = self.open_rooms(query).await?;

        let mut by_type: BTreeMap<Uuid, RoomsLeftDto> = BTreeMap::new();
        for details in &rooms {
            by_type
                .entry(details.room_type.id)
                .or_insert_with(|| RoomsLeftDto {
                    room_type: RoomTypeSummary::from(&details.room_type),
                    rooms_left: 0,
                })
                .rooms_left += 1;
        }

        Ok(by_type.into_values().collect())
    }

    pub async fn create_block(
        &self,
        room_id: Uuid,
        model: CreateRoomBlockModel,
    ) -> UseCaseResult<RoomBlockDto> {
        if model.end_date <= model.start_date {
            return Err(AvailabilityError::Validation(vec![FieldError::new(
                "end_date",
                "must be after start_date",
            )]));
        }

        self.room_repo
            .find_room_details(room_id)
            .await
            .map_err(AvailabilityError::Internal)?
            .ok_or(AvailabilityError::RoomNotFound)?;

        let block = self
            .room_repo
            .insert_block(InsertRoomBlockEntity {
                room_id,
                start_date: model.start_date,
                end_date: model.end_date,
                reason: model.reason,
            })
            .await
            .map_err(|err| {
                error!(%room_id, db_error = ?err, "availability: failed to store block");
                AvailabilityError::Internal(err)
            })?;

        info!(
            %room_id,
            start_date = %block.start_date,
            end_date = %block.end_date,
            "availability: maintenance block created"
        );
        Ok(RoomBlockDto::from(block))
    }

    async fn open_rooms(&self, query: AvailabilityQuery) -> UseCaseResult<Vec<RoomDetails>> {
        let stay = stay_from(&query.check_in, &query.check_out)?;

        let mut excluded = self
            .availability_repo
            .find_conflicting_room_ids(stay.check_in, stay.check_out)
            .await
            .map_err(|err| {
                error!(db_error = ?err, "availability: failed to load booking conflicts");
                AvailabilityError::Internal(err)
            })?;
        let blocked = self
            .availability_repo
            .find_blocked_room_ids(stay.check_in, stay.check_out)
            .await
            .map_err(|err| {
                error!(db_error = ?err, "availability: failed to load maintenance blocks");
                AvailabilityError::Internal(err)
            })?;
        excluded.extend(blocked);
        excluded.sort();
        excluded.dedup();

        let search = AvailabilitySearch {
            stay,
            property_id: query.property_id,
            room_type_id: query.room_type_id,
        };
        let rooms = self
            .availability_repo
            .list_open_rooms(search, excluded)
            .await
            .map_err(|err| {
                error!(db_error = ?err, "availability: failed to list open rooms");
                AvailabilityError::Internal(err)
            })?;

        info!(
            check_in = %stay.check_in,
            check_out = %stay.check_out,
            room_count = rooms.len(),
            "availability: search completed"
        );
        Ok(rooms)
    }
}
