pub mod availability;
pub mod bookings;
pub mod payments;
pub mod rates;
pub mod reservations;
