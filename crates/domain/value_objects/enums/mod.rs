pub mod booking_statuses;
pub mod notification_types;
pub mod payment_method_types;
pub mod payment_methods;
pub mod payment_statuses;
pub mod room_statuses;
pub mod stay_types;
