pub mod bookings;
pub mod guests;
pub mod notifications;
pub mod payments;
pub mod properties;
pub mod rates;
pub mod room_types;
pub mod rooms;
