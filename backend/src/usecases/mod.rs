pub mod availability;
pub mod bookings;
pub mod dispatch;
pub mod payments;
pub mod rate_admin;
pub mod rate_resolver;
pub mod reservations;
