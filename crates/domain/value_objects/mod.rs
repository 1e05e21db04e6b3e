pub mod bookings;
pub mod enums;
pub mod ledger;
pub mod payments;
pub mod pricing;
pub mod rates;
pub mod reservations;
pub mod rooms;
pub mod stays;
pub mod validation;
