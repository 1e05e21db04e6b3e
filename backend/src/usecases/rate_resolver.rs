use std::sync::Arc;

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use staydesk::domain::{
    repositories::rates::RateRepository,
    value_objects::rates::{RateQuery, ResolvedRate},
};
use tracing::debug;

/// One step of rate resolution. A tier that does not apply to the query, or
/// finds nothing, answers `None` and the next tier is tried.
#[async_trait]
pub trait RateTier: Send + Sync {
    fn name(&self) -> &'static str;

    async fn lookup(&self, query: &RateQuery) -> AnyResult<Option<ResolvedRate>>;
}

pub struct RoomOverrideTier<R> {
    rate_repo: Arc<R>,
}

#[async_trait]
impl<R> RateTier for RoomOverrideTier<R>
where
    R: RateRepository + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "room_override"
    }

    async fn lookup(&self, query: &RateQuery) -> AnyResult<Option<ResolvedRate>> {
        let Some(room_id) = query.room_id else {
            return Ok(None);
        };
        let found = self
            .rate_repo
            .find_active_override(room_id, query.stay_type)
            .await?;
        Ok(found.map(|rate_override| ResolvedRate::from_override(&rate_override, query.stay_type)))
    }
}

pub struct PropertyRateTier<R> {
    rate_repo: Arc<R>,
}

#[async_trait]
impl<R> RateTier for PropertyRateTier<R>
where
    R: RateRepository + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "property"
    }

    async fn lookup(&self, query: &RateQuery) -> AnyResult<Option<ResolvedRate>> {
        let Some(property_id) = query.property_id else {
            return Ok(None);
        };
        let found = self
            .rate_repo
            .find_active_rate(query.room_type_id, query.stay_type, Some(property_id))
            .await?;
        Ok(found.map(|rate| ResolvedRate::from_rate(&rate, query.stay_type)))
    }
}

pub struct GlobalRateTier<R> {
    rate_repo: Arc<R>,
}

#[async_trait]
impl<R> RateTier for GlobalRateTier<R>
where
    R: RateRepository + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "global"
    }

    async fn lookup(&self, query: &RateQuery) -> AnyResult<Option<ResolvedRate>> {
        let found = self
            .rate_repo
            .find_active_rate(query.room_type_id, query.stay_type, None)
            .await?;
        Ok(found.map(|rate| ResolvedRate::from_rate(&rate, query.stay_type)))
    }
}

/// Ordered chain of tiers; the first hit wins.
pub struct RateResolver {
    tiers: Vec<Box<dyn RateTier>>,
}

impl RateResolver {
    pub fn new(tiers: Vec<Box<dyn RateTier>>) -> Self {
        Self { tiers }
    }

    /// Room override, then property rate, then global rate.
    pub fn standard<R>(rate_repo: Arc<R>) -> Self
    where
        R: RateRepository + Send + Sync + 'static,
    {
        Self::new(vec![
            Box::new(RoomOverrideTier {
                rate_repo: Arc::clone(&rate_repo),
            }),
            Box::new(PropertyRateTier {
                rate_repo: Arc::clone(&rate_repo),
            }),
            Box::new(GlobalRateTier { rate_repo }),
        ])
    }

    /// `Ok(None)` means no tier has a price; callers must treat it as a hard failure.
    pub async fn resolve(&self, query: &RateQuery) -> AnyResult<Option<ResolvedRate>> {
        for tier in &self.tiers {
            if let Some(rate) = tier.lookup(query).await? {
                debug!(
                    tier = tier.name(),
                    room_type_id = %query.room_type_id,
                    stay_type = %query.stay_type,
                    price = rate.price,
                    "rates: resolved"
                );
                return Ok(Some(rate));
            }
        }
        debug!(
            room_type_id = %query.room_type_id,
            stay_type = %query.stay_type,
            "rates: no tier matched"
        );
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use mockall::predicate::eq;
    use staydesk::{
        domain::{
            entities::rates::UpsertRateEntity,
            repositories::rates::MockRateRepository,
            value_objects::{enums::stay_types::StayType, rates::RateSource},
        },
        infra::memory::InMemoryStore,
    };
    use uuid::Uuid;

    fn rate(room_type_id: Uuid, property_id: Option<Uuid>, price: i64) -> UpsertRateEntity {
        UpsertRateEntity {
            room_type_id,
            property_id,
            stay_type: StayType::Daily.to_string(),
            price,
            deposit_percentage: 100.0,
            tax_percentage: 11.0,
            service_fee: 25_000,
        }
    }

    #[tokio::test]
    async fn precedence_falls_through_override_property_global_none() {
        let store = Arc::new(InMemoryStore::new());
        let property = store.add_property("harbor", "Harbor House").unwrap();
        let room_type = store.add_room_type("Deluxe", 2, &[]).unwrap();
        let room = store.add_room(property.id, room_type.id, "101").unwrap();

        store.add_rate(rate(room_type.id, None, 300_000)).unwrap();
        let property_rate = store
            .add_rate(rate(room_type.id, Some(property.id), 350_000))
            .unwrap();
        store.add_override(room.id, StayType::Daily, 400_000).unwrap();

        let resolver = RateResolver::standard(Arc::clone(&store));
        let query = RateQuery {
            room_type_id: room_type.id,
            stay_type: StayType::Daily,
            room_id: Some(room.id),
            property_id: Some(property.id),
        };

        let resolved = resolver.resolve(&query).await.unwrap().unwrap();
        assert_eq!(resolved.source, RateSource::RoomOverride);
        assert_eq!(resolved.price, 400_000);
        assert_eq!(resolved.tax_percentage, 0.0);

        store.deactivate_override(room.id, StayType::Daily).await.unwrap();
        let resolved = resolver.resolve(&query).await.unwrap().unwrap();
        assert_eq!(resolved.source, RateSource::Property);
        assert_eq!(resolved.price, 350_000);

        assert!(store.deactivate_rate(property_rate.id).unwrap());
        let resolved = resolver.resolve(&query).await.unwrap().unwrap();
        assert_eq!(resolved.source, RateSource::Global);
        assert_eq!(resolved.price, 300_000);

        let other_stay = RateQuery {
            stay_type: StayType::Monthly,
            ..query
        };
        assert!(resolver.resolve(&other_stay).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn tiers_without_their_key_are_skipped() {
        let room_type_id = Uuid::new_v4();
        let mut rate_repo = MockRateRepository::new();
        rate_repo.expect_find_active_override().never();
        rate_repo
            .expect_find_active_rate()
            .with(eq(room_type_id), eq(StayType::Weekly), eq(None))
            .times(1)
            .returning(|_, _, _| Box::pin(async { Ok(None) }));

        let resolver = RateResolver::standard(Arc::new(rate_repo));
        let query = RateQuery {
            room_type_id,
            stay_type: StayType::Weekly,
            room_id: None,
            property_id: None,
        };
        assert!(resolver.resolve(&query).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn store_errors_stop_the_chain() {
        let mut rate_repo = MockRateRepository::new();
        rate_repo
            .expect_find_active_override()
            .returning(|_, _| Box::pin(async { Err(anyhow!("connection reset")) }));
        rate_repo.expect_find_active_rate().never();

        let resolver = RateResolver::standard(Arc::new(rate_repo));
        let query = RateQuery {
            room_type_id: Uuid::new_v4(),
            stay_type: StayType::Daily,
            room_id: Some(Uuid::new_v4()),
            property_id: Some(Uuid::new_v4()),
        };
        assert!(resolver.resolve(&query).await.is_err());
    }
}
