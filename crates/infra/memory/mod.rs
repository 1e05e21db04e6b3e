//! Process-local implementation of every repository port.
//!
//! All state sits behind one mutex, so check-then-insert sequences are atomic the
//! same way the room-row lock makes them atomic in Postgres. Used by tests and by
//! local runs without a database.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::domain::{
    entities::{
        bookings::{BookingEntity, InsertBookingEntity},
        guests::{GuestEntity, UpsertGuestEntity},
        notifications::{InsertNotificationEntity, NotificationEntity},
        payments::{InsertPaymentEntity, PaymentEntity},
        properties::PropertyEntity,
        rates::{RateEntity, RoomRateOverrideEntity, UpsertRateEntity, UpsertRoomRateOverrideEntity},
        room_types::RoomTypeEntity,
        rooms::{InsertRoomBlockEntity, RoomBlockEntity, RoomEntity},
    },
    repositories::{
        availability::AvailabilityRepository, bookings::BookingRepository,
        guests::GuestRepository, notifications::NotificationRepository,
        payments::PaymentRepository, rates::RateRepository, rooms::RoomRepository,
    },
    value_objects::{
        enums::{
            booking_statuses::BookingStatus, payment_statuses::PaymentStatus,
            room_statuses::RoomStatus, stay_types::StayType,
        },
        ledger::{LedgerUpdate, apply_manual_payment, apply_settlement},
        payments::{ManualPaymentOutcome, SettleGatewayPayment, SettlementOutcome},
        rooms::{AvailabilitySearch, RoomDetails},
        stays::ranges_overlap,
    },
};

#[derive(Debug, Default)]
struct State {
    properties: Vec<PropertyEntity>,
    room_types: Vec<RoomTypeEntity>,
    rooms: Vec<RoomEntity>,
    room_blocks: Vec<RoomBlockEntity>,
    rates: Vec<RateEntity>,
    overrides: Vec<RoomRateOverrideEntity>,
    guests: Vec<GuestEntity>,
    bookings: Vec<BookingEntity>,
    payments: Vec<PaymentEntity>,
    notifications: Vec<NotificationEntity>,
}

impl State {
    fn has_overlap(
        &self,
        room_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
        exclude_booking_id: Option<Uuid>,
    ) -> bool {
        self.bookings.iter().any(|booking| {
            booking.room_id == room_id
                && Some(booking.id) != exclude_booking_id
                && !booking.booking_status().is_terminal()
                && ranges_overlap(booking.check_in, booking.check_out, check_in, check_out)
        })
    }

    fn room_details(&self, room: &RoomEntity) -> Option<RoomDetails> {
        let property = self.properties.iter().find(|p| p.id == room.property_id)?;
        let room_type = self.room_types.iter().find(|t| t.id == room.room_type_id)?;
        Some(RoomDetails {
            room: room.clone(),
            property: property.clone(),
            room_type: room_type.clone(),
        })
    }

    fn booking_mut(&mut self, booking_id: Uuid) -> Option<&mut BookingEntity> {
        self.bookings.iter_mut().find(|b| b.id == booking_id)
    }

    fn write_ledger(&mut self, booking_id: Uuid, ledger: LedgerUpdate) -> Option<BookingEntity> {
        let booking = self.booking_mut(booking_id)?;
        booking.paid_amount = ledger.paid_amount;
        booking.payment_status = ledger.payment_status.to_string();
        booking.status = ledger.status.to_string();
        booking.updated_at = Utc::now();
        Some(booking.clone())
    }

    fn upsert_override(&mut self, rate_override: &UpsertRoomRateOverrideEntity) -> RoomRateOverrideEntity {
        let now = Utc::now();
        if let Some(existing) = self.overrides.iter_mut().find(|o| {
            o.is_active && o.room_id == rate_override.room_id && o.stay_type == rate_override.stay_type
        }) {
            existing.price = rate_override.price;
            existing.updated_at = now;
            return existing.clone();
        }

        let entity = RoomRateOverrideEntity {
            id: Uuid::new_v4(),
            room_id: rate_override.room_id,
            stay_type: rate_override.stay_type.clone(),
            price: rate_override.price,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.overrides.push(entity.clone());
        entity
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| anyhow!("in-memory store lock poisoned"))
    }

    pub fn add_property(&self, slug: &str, name: &str) -> Result<PropertyEntity> {
        let property = PropertyEntity {
            id: Uuid::new_v4(),
            slug: slug.to_string(),
            name: name.to_string(),
            address: None,
            total_rooms: 0,
            is_active: true,
            created_at: Utc::now(),
        };
        self.state()?.properties.push(property.clone());
        Ok(property)
    }

    pub fn add_room_type(&self, name: &str, capacity: i32, amenities: &[&str]) -> Result<RoomTypeEntity> {
        let room_type = RoomTypeEntity {
            id: Uuid::new_v4(),
            name: name.to_string(),
            capacity,
            amenities: serde_json::json!(amenities),
            is_active: true,
            created_at: Utc::now(),
        };
        self.state()?.room_types.push(room_type.clone());
        Ok(room_type)
    }

    pub fn add_room(&self, property_id: Uuid, room_type_id: Uuid, room_number: &str) -> Result<RoomEntity> {
        let now = Utc::now();
        let room = RoomEntity {
            id: Uuid::new_v4(),
            property_id,
            room_type_id,
            room_number: room_number.to_string(),
            floor: None,
            status: RoomStatus::Available.to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let mut state = self.state()?;
        if let Some(property) = state.properties.iter_mut().find(|p| p.id == property_id) {
            property.total_rooms += 1;
        }
        state.rooms.push(room.clone());
        Ok(room)
    }

    pub fn add_rate(&self, rate: UpsertRateEntity) -> Result<RateEntity> {
        let now = Utc::now();
        let entity = RateEntity {
            id: Uuid::new_v4(),
            room_type_id: rate.room_type_id,
            property_id: rate.property_id,
            stay_type: rate.stay_type,
            price: rate.price,
            deposit_percentage: rate.deposit_percentage,
            tax_percentage: rate.tax_percentage,
            service_fee: rate.service_fee,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.state()?.rates.push(entity.clone());
        Ok(entity)
    }

    pub fn deactivate_rate(&self, rate_id: Uuid) -> Result<bool> {
        let mut state = self.state()?;
        match state.rates.iter_mut().find(|r| r.id == rate_id && r.is_active) {
            Some(rate) => {
                rate.is_active = false;
                rate.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn add_override(&self, room_id: Uuid, stay_type: StayType, price: i64) -> Result<RoomRateOverrideEntity> {
        Ok(self.state()?.upsert_override(&UpsertRoomRateOverrideEntity {
            room_id,
            stay_type: stay_type.to_string(),
            price,
        }))
    }

    pub fn bookings(&self) -> Result<Vec<BookingEntity>> {
        Ok(self.state()?.bookings.clone())
    }

    pub fn payments(&self) -> Result<Vec<PaymentEntity>> {
        Ok(self.state()?.payments.clone())
    }

    pub fn notifications(&self) -> Result<Vec<NotificationEntity>> {
        Ok(self.state()?.notifications.clone())
    }

    pub fn room(&self, room_id: Uuid) -> Result<Option<RoomEntity>> {
        Ok(self.state()?.rooms.iter().find(|r| r.id == room_id).cloned())
    }

    pub fn set_property_active(&self, property_id: Uuid, is_active: bool) -> Result<()> {
        if let Some(property) = self.state()?.properties.iter_mut().find(|p| p.id == property_id) {
            property.is_active = is_active;
        }
        Ok(())
    }
}

#[async_trait]
impl RateRepository for InMemoryStore {
    async fn find_active_override(
        &self,
        room_id: Uuid,
        stay_type: StayType,
    ) -> Result<Option<RoomRateOverrideEntity>> {
        let state = self.state()?;
        Ok(state
            .overrides
            .iter()
            .find(|o| o.is_active && o.room_id == room_id && o.stay_type == stay_type.as_str())
            .cloned())
    }

    async fn find_active_rate(
        &self,
        room_type_id: Uuid,
        stay_type: StayType,
        property_id: Option<Uuid>,
    ) -> Result<Option<RateEntity>> {
        let state = self.state()?;
        Ok(state
            .rates
            .iter()
            .find(|r| {
                r.is_active
                    && r.room_type_id == room_type_id
                    && r.stay_type == stay_type.as_str()
                    && r.property_id == property_id
            })
            .cloned())
    }

    async fn upsert_rate(&self, rate: UpsertRateEntity) -> Result<RateEntity> {
        let mut state = self.state()?;
        let now = Utc::now();

        if let Some(existing) = state.rates.iter_mut().find(|r| {
            r.is_active
                && r.room_type_id == rate.room_type_id
                && r.stay_type == rate.stay_type
                && r.property_id == rate.property_id
        }) {
            existing.price = rate.price;
            existing.deposit_percentage = rate.deposit_percentage;
            existing.tax_percentage = rate.tax_percentage;
            existing.service_fee = rate.service_fee;
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let entity = RateEntity {
            id: Uuid::new_v4(),
            room_type_id: rate.room_type_id,
            property_id: rate.property_id,
            stay_type: rate.stay_type,
            price: rate.price,
            deposit_percentage: rate.deposit_percentage,
            tax_percentage: rate.tax_percentage,
            service_fee: rate.service_fee,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        state.rates.push(entity.clone());
        Ok(entity)
    }

    async fn upsert_override(
        &self,
        rate_override: UpsertRoomRateOverrideEntity,
    ) -> Result<RoomRateOverrideEntity> {
        Ok(self.state()?.upsert_override(&rate_override))
    }

    async fn upsert_overrides(&self, overrides: Vec<UpsertRoomRateOverrideEntity>) -> Result<usize> {
        let mut state = self.state()?;
        for rate_override in &overrides {
            state.upsert_override(rate_override);
        }
        Ok(overrides.len())
    }

    async fn deactivate_override(&self, room_id: Uuid, stay_type: StayType) -> Result<bool> {
        let mut state = self.state()?;
        let mut deactivated = false;
        for rate_override in state
            .overrides
            .iter_mut()
            .filter(|o| o.is_active && o.room_id == room_id && o.stay_type == stay_type.as_str())
        {
            rate_override.is_active = false;
            rate_override.updated_at = Utc::now();
            deactivated = true;
        }
        Ok(deactivated)
    }

    async fn list_active_rates(&self, room_type_id: Option<Uuid>) -> Result<Vec<RateEntity>> {
        let state = self.state()?;
        let mut rates: Vec<RateEntity> = state
            .rates
            .iter()
            .filter(|r| r.is_active && room_type_id.is_none_or(|id| r.room_type_id == id))
            .cloned()
            .collect();
        rates.sort_by(|a, b| {
            (a.room_type_id, &a.stay_type).cmp(&(b.room_type_id, &b.stay_type))
        });
        Ok(rates)
    }

    async fn list_active_overrides(&self, room_id: Uuid) -> Result<Vec<RoomRateOverrideEntity>> {
        let state = self.state()?;
        let mut overrides: Vec<RoomRateOverrideEntity> = state
            .overrides
            .iter()
            .filter(|o| o.is_active && o.room_id == room_id)
            .cloned()
            .collect();
        overrides.sort_by(|a, b| a.stay_type.cmp(&b.stay_type));
        Ok(overrides)
    }
}

#[async_trait]
impl RoomRepository for InMemoryStore {
    async fn find_room_details(&self, room_id: Uuid) -> Result<Option<RoomDetails>> {
        let state = self.state()?;
        Ok(state
            .rooms
            .iter()
            .find(|r| r.id == room_id && r.is_active)
            .and_then(|room| state.room_details(room)))
    }

    async fn list_available_room_ids(&self, property_id: Uuid) -> Result<Vec<Uuid>> {
        let state = self.state()?;
        Ok(state
            .rooms
            .iter()
            .filter(|r| {
                r.property_id == property_id && r.is_active && r.room_status() == RoomStatus::Available
            })
            .map(|r| r.id)
            .collect())
    }

    async fn update_status(&self, room_id: Uuid, status: RoomStatus) -> Result<()> {
        let mut state = self.state()?;
        if let Some(room) = state.rooms.iter_mut().find(|r| r.id == room_id) {
            room.status = status.to_string();
            room.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn insert_block(&self, block: InsertRoomBlockEntity) -> Result<RoomBlockEntity> {
        let entity = RoomBlockEntity {
            id: Uuid::new_v4(),
            room_id: block.room_id,
            start_date: block.start_date,
            end_date: block.end_date,
            reason: block.reason,
            created_at: Utc::now(),
        };
        self.state()?.room_blocks.push(entity.clone());
        Ok(entity)
    }
}

#[async_trait]
impl AvailabilityRepository for InMemoryStore {
    async fn is_room_available(
        &self,
        room_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
        exclude_booking_id: Option<Uuid>,
    ) -> Result<bool> {
        let state = self.state()?;
        if !state.rooms.iter().any(|r| r.id == room_id) {
            return Ok(false);
        }
        Ok(!state.has_overlap(room_id, check_in, check_out, exclude_booking_id))
    }

    async fn find_conflicting_room_ids(
        &self,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<Vec<Uuid>> {
        let state = self.state()?;
        let mut ids: Vec<Uuid> = state
            .bookings
            .iter()
            .filter(|b| {
                !b.booking_status().is_terminal()
                    && ranges_overlap(b.check_in, b.check_out, check_in, check_out)
            })
            .map(|b| b.room_id)
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    async fn find_blocked_room_ids(
        &self,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<Vec<Uuid>> {
        let state = self.state()?;
        let mut ids: Vec<Uuid> = state
            .room_blocks
            .iter()
            .filter(|b| ranges_overlap(b.start_date, b.end_date, check_in, check_out))
            .map(|b| b.room_id)
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    async fn list_open_rooms(
        &self,
        search: AvailabilitySearch,
        excluded: Vec<Uuid>,
    ) -> Result<Vec<RoomDetails>> {
        let state = self.state()?;
        let mut rooms: Vec<RoomDetails> = state
            .rooms
            .iter()
            .filter(|r| r.is_active && r.room_status() == RoomStatus::Available)
            .filter(|r| !excluded.contains(&r.id))
            .filter(|r| search.property_id.is_none_or(|id| r.property_id == id))
            .filter(|r| search.room_type_id.is_none_or(|id| r.room_type_id == id))
            .filter_map(|r| state.room_details(r))
            .filter(|details| details.property.is_active)
            .collect();
        rooms.sort_by(|a, b| {
            (&a.property.name, &a.room.room_number).cmp(&(&b.property.name, &b.room.room_number))
        });
        Ok(rooms)
    }
}

#[async_trait]
impl BookingRepository for InMemoryStore {
    async fn insert_booking_if_available(
        &self,
        booking: InsertBookingEntity,
    ) -> Result<Option<BookingEntity>> {
        let mut state = self.state()?;
        if !state.rooms.iter().any(|r| r.id == booking.room_id)
            || state.has_overlap(booking.room_id, booking.check_in, booking.check_out, None)
        {
            return Ok(None);
        }
        if state.bookings.iter().any(|b| b.booking_code == booking.booking_code) {
            return Err(anyhow!("duplicate booking code {}", booking.booking_code));
        }

        let now = Utc::now();
        let entity = BookingEntity {
            id: Uuid::new_v4(),
            booking_code: booking.booking_code,
            room_id: booking.room_id,
            guest_id: booking.guest_id,
            property_id: booking.property_id,
            check_in: booking.check_in,
            check_out: booking.check_out,
            stay_type: booking.stay_type,
            base_price: booking.base_price,
            tax_amount: booking.tax_amount,
            service_fee: booking.service_fee,
            discount_amount: booking.discount_amount,
            deposit_amount: booking.deposit_amount,
            total_amount: booking.total_amount,
            paid_amount: booking.paid_amount,
            payment_status: booking.payment_status,
            status: booking.status,
            payment_method_type: booking.payment_method_type,
            special_requests: booking.special_requests,
            checked_in_at: None,
            checked_out_at: None,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        };
        state.bookings.push(entity.clone());
        Ok(Some(entity))
    }

    async fn find_by_id(&self, booking_id: Uuid) -> Result<Option<BookingEntity>> {
        let state = self.state()?;
        Ok(state.bookings.iter().find(|b| b.id == booking_id).cloned())
    }

    async fn find_by_code(&self, booking_code: String) -> Result<Option<BookingEntity>> {
        let state = self.state()?;
        Ok(state
            .bookings
            .iter()
            .find(|b| b.booking_code == booking_code)
            .cloned())
    }

    async fn transition_status(
        &self,
        booking_id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<BookingEntity>> {
        let mut state = self.state()?;
        let Some(booking) = state
            .booking_mut(booking_id)
            .filter(|b| b.status == from.as_str())
        else {
            return Ok(None);
        };

        booking.status = to.to_string();
        booking.updated_at = at;
        match to {
            BookingStatus::CheckedIn => booking.checked_in_at = Some(at),
            BookingStatus::CheckedOut => booking.checked_out_at = Some(at),
            BookingStatus::Cancelled => booking.cancelled_at = Some(at),
            _ => {}
        }
        Ok(Some(booking.clone()))
    }

    async fn list_pending(&self, created_before: Option<DateTime<Utc>>) -> Result<Vec<BookingEntity>> {
        let state = self.state()?;
        let mut pending: Vec<BookingEntity> = state
            .bookings
            .iter()
            .filter(|b| b.booking_status() == BookingStatus::Pending)
            .filter(|b| created_before.is_none_or(|cutoff| b.created_at < cutoff))
            .cloned()
            .collect();
        pending.sort_by_key(|b| b.created_at);
        Ok(pending)
    }
}

#[async_trait]
impl GuestRepository for InMemoryStore {
    async fn upsert_by_email(&self, guest: UpsertGuestEntity) -> Result<GuestEntity> {
        let mut state = self.state()?;
        let now = Utc::now();

        if let Some(existing) = state.guests.iter_mut().find(|g| g.email == guest.email) {
            existing.full_name = guest.full_name;
            if guest.phone.is_some() {
                existing.phone = guest.phone;
            }
            if guest.id_number.is_some() {
                existing.id_number = guest.id_number;
            }
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let entity = GuestEntity {
            id: Uuid::new_v4(),
            full_name: guest.full_name,
            email: guest.email,
            phone: guest.phone,
            id_number: guest.id_number,
            created_at: now,
            updated_at: now,
        };
        state.guests.push(entity.clone());
        Ok(entity)
    }

    async fn find_by_id(&self, guest_id: Uuid) -> Result<Option<GuestEntity>> {
        let state = self.state()?;
        Ok(state.guests.iter().find(|g| g.id == guest_id).cloned())
    }
}

fn payment_from_insert(payment: InsertPaymentEntity) -> PaymentEntity {
    let now = Utc::now();
    PaymentEntity {
        id: Uuid::new_v4(),
        booking_id: payment.booking_id,
        amount: payment.amount,
        method: payment.method,
        status: payment.status,
        gateway_invoice_id: payment.gateway_invoice_id,
        gateway_invoice_url: payment.gateway_invoice_url,
        gateway_channel: payment.gateway_channel,
        notes: payment.notes,
        paid_at: payment.paid_at,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl PaymentRepository for InMemoryStore {
    async fn insert_payment(&self, payment: InsertPaymentEntity) -> Result<PaymentEntity> {
        let mut state = self.state()?;
        if let Some(invoice_id) = &payment.gateway_invoice_id
            && state
                .payments
                .iter()
                .any(|p| p.gateway_invoice_id.as_ref() == Some(invoice_id))
        {
            return Err(anyhow!("duplicate gateway invoice id {invoice_id}"));
        }
        let entity = payment_from_insert(payment);
        state.payments.push(entity.clone());
        Ok(entity)
    }

    async fn find_by_gateway_invoice_id(&self, invoice_id: String) -> Result<Option<PaymentEntity>> {
        let state = self.state()?;
        Ok(state
            .payments
            .iter()
            .find(|p| p.gateway_invoice_id.as_deref() == Some(invoice_id.as_str()))
            .cloned())
    }

    async fn list_by_booking(&self, booking_id: Uuid) -> Result<Vec<PaymentEntity>> {
        let state = self.state()?;
        Ok(state
            .payments
            .iter()
            .filter(|p| p.booking_id == booking_id)
            .cloned()
            .collect())
    }

    async fn record_manual_payment(
        &self,
        booking_id: Uuid,
        payment: InsertPaymentEntity,
    ) -> Result<ManualPaymentOutcome> {
        let mut state = self.state()?;
        let Some(booking) = state.bookings.iter().find(|b| b.id == booking_id).cloned() else {
            return Ok(ManualPaymentOutcome::BookingNotFound);
        };

        let ledger = match apply_manual_payment(&booking, payment.amount) {
            Ok(ledger) => ledger,
            Err(rejection) => return Ok(ManualPaymentOutcome::Rejected(rejection)),
        };

        let payment = payment_from_insert(payment);
        state.payments.push(payment.clone());
        let booking = state
            .write_ledger(booking_id, ledger)
            .ok_or_else(|| anyhow!("booking {booking_id} vanished during payment"))?;

        Ok(ManualPaymentOutcome::Applied { booking, payment })
    }

    async fn settle_gateway_payment(&self, settlement: SettleGatewayPayment) -> Result<SettlementOutcome> {
        let mut state = self.state()?;
        let Some(payment) = state.payments.iter().find(|p| p.id == settlement.payment_id) else {
            return Err(anyhow!("payment {} not found", settlement.payment_id));
        };
        if payment.payment_status() == PaymentStatus::Paid {
            return Ok(SettlementOutcome::AlreadySettled);
        }
        let booking_id = payment.booking_id;

        // Both rows must exist before either is touched.
        let Some(booking) = state.bookings.iter().find(|b| b.id == booking_id).cloned() else {
            return Err(anyhow!("booking {booking_id} not found for payment"));
        };
        let ledger = apply_settlement(&booking, settlement.amount);

        if let Some(payment) = state
            .payments
            .iter_mut()
            .find(|p| p.id == settlement.payment_id)
        {
            payment.status = PaymentStatus::Paid.to_string();
            payment.amount = settlement.amount;
            payment.gateway_channel = settlement.channel.clone();
            payment.paid_at = Some(settlement.paid_at);
            payment.updated_at = Utc::now();
        }
        let booking = state
            .write_ledger(booking_id, ledger)
            .ok_or_else(|| anyhow!("booking {booking_id} vanished during settlement"))?;

        Ok(SettlementOutcome::Applied(booking))
    }

    async fn mark_expired(&self, payment_id: Uuid) -> Result<bool> {
        let mut state = self.state()?;
        match state
            .payments
            .iter_mut()
            .find(|p| p.id == payment_id && p.payment_status() == PaymentStatus::Pending)
        {
            Some(payment) => {
                payment.status = PaymentStatus::Expired.to_string();
                payment.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl NotificationRepository for InMemoryStore {
    async fn notify(&self, notification: InsertNotificationEntity) -> Result<()> {
        self.state()?.notifications.push(NotificationEntity {
            id: Uuid::new_v4(),
            type_: notification.type_,
            title: notification.title,
            message: notification.message,
            reference_id: notification.reference_id,
            is_read: false,
            created_at: Utc::now(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::enums::{
        payment_method_types::PaymentMethodType, payment_statuses::BookingPaymentStatus,
    };

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
    }

    fn seed() -> (InMemoryStore, RoomEntity) {
        let store = InMemoryStore::new();
        let property = store.add_property("harbor", "Harbor House").unwrap();
        let room_type = store.add_room_type("Deluxe", 2, &["wifi"]).unwrap();
        let room = store.add_room(property.id, room_type.id, "101").unwrap();
        (store, room)
    }

    fn insert(room: &RoomEntity, code: &str, check_in: u32, check_out: u32) -> InsertBookingEntity {
        InsertBookingEntity {
            booking_code: code.to_string(),
            room_id: room.id,
            guest_id: Uuid::new_v4(),
            property_id: room.property_id,
            check_in: date(check_in),
            check_out: date(check_out),
            stay_type: StayType::Daily.to_string(),
            base_price: 1_000,
            tax_amount: 0,
            service_fee: 0,
            discount_amount: 0,
            deposit_amount: 1_000,
            total_amount: 1_000,
            paid_amount: 0,
            payment_status: BookingPaymentStatus::Unpaid.to_string(),
            status: BookingStatus::Pending.to_string(),
            payment_method_type: PaymentMethodType::PayAtProperty.to_string(),
            special_requests: None,
        }
    }

    #[tokio::test]
    async fn overlapping_insert_is_refused_and_adjacent_is_accepted() {
        let (store, room) = seed();

        let first = store
            .insert_booking_if_available(insert(&room, "BK-20260301-AAAAAA", 1, 5))
            .await
            .unwrap();
        assert!(first.is_some());

        let overlapping = store
            .insert_booking_if_available(insert(&room, "BK-20260301-BBBBBB", 4, 6))
            .await
            .unwrap();
        assert!(overlapping.is_none());

        let adjacent = store
            .insert_booking_if_available(insert(&room, "BK-20260301-CCCCCC", 5, 7))
            .await
            .unwrap();
        assert!(adjacent.is_some());
    }

    #[tokio::test]
    async fn cancelled_booking_frees_its_dates() {
        let (store, room) = seed();
        let booking = store
            .insert_booking_if_available(insert(&room, "BK-20260301-AAAAAA", 1, 5))
            .await
            .unwrap()
            .unwrap();

        store
            .transition_status(booking.id, BookingStatus::Pending, BookingStatus::Cancelled, Utc::now())
            .await
            .unwrap()
            .unwrap();

        assert!(store.is_room_available(room.id, date(2), date(3), None).await.unwrap());
    }

    #[tokio::test]
    async fn transition_requires_the_expected_current_status() {
        let (store, room) = seed();
        let booking = store
            .insert_booking_if_available(insert(&room, "BK-20260301-AAAAAA", 1, 5))
            .await
            .unwrap()
            .unwrap();

        let stale = store
            .transition_status(booking.id, BookingStatus::Confirmed, BookingStatus::CheckedIn, Utc::now())
            .await
            .unwrap();
        assert!(stale.is_none());
    }

    #[tokio::test]
    async fn guest_upsert_keeps_existing_contact_fields_when_blank() {
        let store = InMemoryStore::new();
        let first = store
            .upsert_by_email(UpsertGuestEntity {
                full_name: "Rina".to_string(),
                email: "rina@example.com".to_string(),
                phone: Some("0812".to_string()),
                id_number: None,
            })
            .await
            .unwrap();
        let second = store
            .upsert_by_email(UpsertGuestEntity {
                full_name: "Rina S".to_string(),
                email: "rina@example.com".to_string(),
                phone: None,
                id_number: None,
            })
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.full_name, "Rina S");
        assert_eq!(second.phone.as_deref(), Some("0812"));
    }

    #[tokio::test]
    async fn gateway_settlement_applies_once() {
        let (store, room) = seed();
        let booking = store
            .insert_booking_if_available(insert(&room, "BK-20260301-AAAAAA", 1, 5))
            .await
            .unwrap()
            .unwrap();
        let payment = store
            .insert_payment(InsertPaymentEntity {
                booking_id: booking.id,
                amount: 1_000,
                method: "gateway".to_string(),
                status: PaymentStatus::Pending.to_string(),
                gateway_invoice_id: Some("inv_1".to_string()),
                gateway_invoice_url: Some("https://pay.example/inv_1".to_string()),
                gateway_channel: None,
                notes: None,
                paid_at: None,
            })
            .await
            .unwrap();
        let settlement = SettleGatewayPayment {
            payment_id: payment.id,
            amount: 1_000,
            channel: Some("BCA".to_string()),
            paid_at: Utc::now(),
        };

        let first = store.settle_gateway_payment(settlement.clone()).await.unwrap();
        let SettlementOutcome::Applied(updated) = first else {
            panic!("first settlement should apply");
        };
        assert_eq!(updated.paid_amount, 1_000);
        assert_eq!(updated.booking_status(), BookingStatus::Confirmed);

        let replay = store.settle_gateway_payment(settlement).await.unwrap();
        assert_eq!(replay, SettlementOutcome::AlreadySettled);
        assert_eq!(store.bookings().unwrap()[0].paid_amount, 1_000);
    }

    #[tokio::test]
    async fn settlement_for_a_missing_booking_leaves_the_payment_pending() {
        let store = InMemoryStore::new();
        let payment = store
            .insert_payment(InsertPaymentEntity {
                booking_id: Uuid::new_v4(),
                amount: 1_000,
                method: "gateway".to_string(),
                status: PaymentStatus::Pending.to_string(),
                gateway_invoice_id: Some("inv_orphan".to_string()),
                gateway_invoice_url: None,
                gateway_channel: None,
                notes: None,
                paid_at: None,
            })
            .await
            .unwrap();

        let result = store
            .settle_gateway_payment(SettleGatewayPayment {
                payment_id: payment.id,
                amount: 1_000,
                channel: Some("BCA".to_string()),
                paid_at: Utc::now(),
            })
            .await;

        assert!(result.is_err());
        let stored = &store.payments().unwrap()[0];
        assert_eq!(stored.payment_status(), PaymentStatus::Pending);
        assert_eq!(stored.paid_at, None);
        assert_eq!(stored.gateway_channel, None);
    }
}
