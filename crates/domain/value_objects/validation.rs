use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::stays::StayDates;

/// Longest stay a single booking, quote or search may cover.
pub const MAX_STAY_NIGHTS: i64 = 365;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

pub fn parse_iso_date(field: &str, raw: &str) -> Result<NaiveDate, FieldError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| FieldError::new(field, "must be an ISO date (YYYY-MM-DD)"))
}

/// Parses both dates, pushing one error per bad field, and checks ordering and
/// length.
pub fn parse_stay_dates(
    check_in: &str,
    check_out: &str,
    errors: &mut Vec<FieldError>,
) -> Option<StayDates> {
    let check_in = parse_iso_date("check_in", check_in)
        .map_err(|err| errors.push(err))
        .ok();
    let check_out = parse_iso_date("check_out", check_out)
        .map_err(|err| errors.push(err))
        .ok();

    let (check_in, check_out) = (check_in?, check_out?);
    match StayDates::new(check_in, check_out) {
        Ok(stay) if stay.nights() > MAX_STAY_NIGHTS => {
            errors.push(FieldError::new(
                "check_out",
                format!("stay must not exceed {MAX_STAY_NIGHTS} nights"),
            ));
            None
        }
        Ok(stay) => Some(stay),
        Err(err) => {
            errors.push(FieldError::new("check_out", err.to_string()));
            None
        }
    }
}

/// Loose shape check; deliverability is the mail provider's problem.
pub fn is_plausible_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}
