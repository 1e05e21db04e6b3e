//! Rules for applying a settled amount to a booking's running balance.
//!
//! Both the front-desk path and the gateway path go through here so that
//! `paid_amount`, `payment_status` and `status` always move together.

use thiserror::Error;

use crate::domain::{
    entities::bookings::BookingEntity,
    value_objects::enums::{booking_statuses::BookingStatus, payment_statuses::BookingPaymentStatus},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerUpdate {
    pub paid_amount: i64,
    pub payment_status: BookingPaymentStatus,
    pub status: BookingStatus,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("payment amount must be greater than zero")]
    NonPositiveAmount,
    #[error("booking is already fully paid")]
    AlreadyPaid,
    #[error("amount {amount} exceeds the outstanding balance of {outstanding}")]
    ExceedsOutstanding { amount: i64, outstanding: i64 },
    #[error("booking is {status} and no longer accepts payments")]
    BookingClosed { status: BookingStatus },
}

pub fn derive_payment_status(paid_amount: i64, total_amount: i64) -> BookingPaymentStatus {
    if paid_amount <= 0 {
        BookingPaymentStatus::Unpaid
    } else if paid_amount < total_amount {
        BookingPaymentStatus::Partial
    } else {
        BookingPaymentStatus::Paid
    }
}

/// A payment is proof of commitment: a pending booking becomes confirmed.
pub fn promote_on_payment(status: BookingStatus) -> BookingStatus {
    match status {
        BookingStatus::Pending => BookingStatus::Confirmed,
        other => other,
    }
}

/// Validates and applies a front-desk payment. Over-payment is rejected, never clamped.
pub fn apply_manual_payment(booking: &BookingEntity, amount: i64) -> Result<LedgerUpdate, LedgerError> {
    let status = booking.booking_status();
    if matches!(status, BookingStatus::Cancelled | BookingStatus::NoShow) {
        return Err(LedgerError::BookingClosed { status });
    }
    if amount <= 0 {
        return Err(LedgerError::NonPositiveAmount);
    }

    let outstanding = booking.outstanding();
    if outstanding == 0 {
        return Err(LedgerError::AlreadyPaid);
    }
    if amount > outstanding {
        return Err(LedgerError::ExceedsOutstanding {
            amount,
            outstanding,
        });
    }

    Ok(apply_settlement(booking, amount))
}

/// Applies money the gateway has already collected. Nothing is rejected here: the
/// funds exist, so the ledger records them even when they overshoot the total.
/// Closed bookings keep their status so staff can refund.
pub fn apply_settlement(booking: &BookingEntity, amount: i64) -> LedgerUpdate {
    let paid_amount = booking.paid_amount + amount.max(0);
    let status = booking.booking_status();
    let status = if status.is_terminal() {
        status
    } else {
        promote_on_payment(status)
    };

    LedgerUpdate {
        paid_amount,
        payment_status: derive_payment_status(paid_amount, booking.total_amount),
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn booking(total: i64, paid: i64, status: BookingStatus) -> BookingEntity {
        let now = Utc::now();
        BookingEntity {
            id: Uuid::new_v4(),
            booking_code: "BK-20260110-ABC123".to_string(),
            room_id: Uuid::new_v4(),
            guest_id: Uuid::new_v4(),
            property_id: Uuid::new_v4(),
            check_in: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2026, 1, 13).unwrap(),
            stay_type: "daily".to_string(),
            base_price: total,
            tax_amount: 0,
            service_fee: 0,
            discount_amount: 0,
            deposit_amount: total,
            total_amount: total,
            paid_amount: paid,
            payment_status: derive_payment_status(paid, total).to_string(),
            status: status.to_string(),
            payment_method_type: "pay_at_property".to_string(),
            special_requests: None,
            checked_in_at: None,
            checked_out_at: None,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn payment_status_follows_paid_vs_total() {
        assert_eq!(derive_payment_status(0, 100), BookingPaymentStatus::Unpaid);
        assert_eq!(derive_payment_status(1, 100), BookingPaymentStatus::Partial);
        assert_eq!(derive_payment_status(99, 100), BookingPaymentStatus::Partial);
        assert_eq!(derive_payment_status(100, 100), BookingPaymentStatus::Paid);
        assert_eq!(derive_payment_status(120, 100), BookingPaymentStatus::Paid);
    }

    #[test]
    fn partial_payment_confirms_a_pending_booking() {
        let update = apply_manual_payment(&booking(1_000, 0, BookingStatus::Pending), 400).unwrap();
        assert_eq!(update.paid_amount, 400);
        assert_eq!(update.payment_status, BookingPaymentStatus::Partial);
        assert_eq!(update.status, BookingStatus::Confirmed);
    }

    #[test]
    fn settling_the_balance_marks_paid_without_touching_checked_in_status() {
        let update =
            apply_manual_payment(&booking(1_000, 400, BookingStatus::CheckedIn), 600).unwrap();
        assert_eq!(update.paid_amount, 1_000);
        assert_eq!(update.payment_status, BookingPaymentStatus::Paid);
        assert_eq!(update.status, BookingStatus::CheckedIn);
    }

    #[test]
    fn over_payment_is_rejected_with_the_outstanding_balance() {
        let err = apply_manual_payment(&booking(1_000, 400, BookingStatus::Confirmed), 601).unwrap_err();
        assert_eq!(
            err,
            LedgerError::ExceedsOutstanding {
                amount: 601,
                outstanding: 600
            }
        );
    }

    #[test]
    fn non_positive_and_fully_paid_are_rejected() {
        let open = booking(1_000, 0, BookingStatus::Confirmed);
        assert_eq!(apply_manual_payment(&open, 0), Err(LedgerError::NonPositiveAmount));
        assert_eq!(apply_manual_payment(&open, -5), Err(LedgerError::NonPositiveAmount));

        let settled = booking(1_000, 1_000, BookingStatus::Confirmed);
        assert_eq!(apply_manual_payment(&settled, 1), Err(LedgerError::AlreadyPaid));
    }

    #[test]
    fn cancelled_booking_rejects_front_desk_payment() {
        let err = apply_manual_payment(&booking(1_000, 0, BookingStatus::Cancelled), 100).unwrap_err();
        assert_eq!(
            err,
            LedgerError::BookingClosed {
                status: BookingStatus::Cancelled
            }
        );
    }

    #[test]
    fn late_gateway_settlement_on_cancelled_booking_keeps_status() {
        let update = apply_settlement(&booking(1_000, 0, BookingStatus::Cancelled), 1_000);
        assert_eq!(update.paid_amount, 1_000);
        assert_eq!(update.payment_status, BookingPaymentStatus::Paid);
        assert_eq!(update.status, BookingStatus::Cancelled);
    }
}
