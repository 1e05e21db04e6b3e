pub mod availability;
pub mod bookings;
pub mod guests;
pub mod notifications;
pub mod payments;
pub mod rates;
pub mod rooms;
