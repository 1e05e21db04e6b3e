use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use staydesk::domain::value_objects::validation::FieldError;

use crate::usecases::{
    availability::AvailabilityError, bookings::BookingError, payments::PaymentError,
    rate_admin::RateAdminError, reservations::ReservationError,
};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldError>>,
}

impl ErrorResponse {
    pub fn into_response_with(status: StatusCode, message: String, fields: Option<Vec<FieldError>>) -> Response {
        let body = Json(ErrorResponse {
            code: status.as_u16(),
            message,
            fields,
        });

        (status, body).into_response()
    }
}

fn internal() -> Response {
    // Don't leak internal error detail to client
    ErrorResponse::into_response_with(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
        None,
    )
}

impl IntoResponse for ReservationError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            ReservationError::Internal(_) => internal(),
            ReservationError::Validation(fields) => ErrorResponse::into_response_with(
                status,
                "Invalid reservation request".to_string(),
                Some(fields),
            ),
            other => ErrorResponse::into_response_with(status, other.to_string(), None),
        }
    }
}

impl IntoResponse for AvailabilityError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            AvailabilityError::Internal(_) => internal(),
            AvailabilityError::Validation(fields) => ErrorResponse::into_response_with(
                status,
                "Invalid availability query".to_string(),
                Some(fields),
            ),
            other => ErrorResponse::into_response_with(status, other.to_string(), None),
        }
    }
}

impl IntoResponse for PaymentError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            PaymentError::Internal(_) => internal(),
            other => ErrorResponse::into_response_with(status, other.to_string(), None),
        }
    }
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            BookingError::Internal(_) => internal(),
            other => ErrorResponse::into_response_with(status, other.to_string(), None),
        }
    }
}

impl IntoResponse for RateAdminError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            RateAdminError::Internal(_) => internal(),
            other => ErrorResponse::into_response_with(status, other.to_string(), None),
        }
    }
}
