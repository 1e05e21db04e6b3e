use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Settlement state of a booking as a whole, derived from paid vs total.
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingPaymentStatus {
    #[default]
    Unpaid,
    Partial,
    Paid,
    Refunded,
}

impl BookingPaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingPaymentStatus::Unpaid => "unpaid",
            BookingPaymentStatus::Partial => "partial",
            BookingPaymentStatus::Paid => "paid",
            BookingPaymentStatus::Refunded => "refunded",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "unpaid" => Some(BookingPaymentStatus::Unpaid),
            "partial" => Some(BookingPaymentStatus::Partial),
            "paid" => Some(BookingPaymentStatus::Paid),
            "refunded" => Some(BookingPaymentStatus::Refunded),
            _ => None,
        }
    }
}

impl Display for BookingPaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of a single payment row.
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Expired,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Expired => "expired",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(PaymentStatus::Pending),
            "paid" => Some(PaymentStatus::Paid),
            "expired" => Some(PaymentStatus::Expired),
            "failed" => Some(PaymentStatus::Failed),
            "refunded" => Some(PaymentStatus::Refunded),
            _ => None,
        }
    }

    /// Maps a gateway invoice status onto the internal enum. Statuses the
    /// gateway may send that we do not act on come back as `Pending`.
    pub fn from_gateway(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "PAID" | "SETTLED" => PaymentStatus::Paid,
            "EXPIRED" => PaymentStatus::Expired,
            _ => PaymentStatus::Pending,
        }
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_statuses_are_mapped() {
        assert_eq!(PaymentStatus::from_gateway("PAID"), PaymentStatus::Paid);
        assert_eq!(PaymentStatus::from_gateway("SETTLED"), PaymentStatus::Paid);
        assert_eq!(PaymentStatus::from_gateway("settled"), PaymentStatus::Paid);
        assert_eq!(PaymentStatus::from_gateway("EXPIRED"), PaymentStatus::Expired);
        assert_eq!(PaymentStatus::from_gateway("PENDING"), PaymentStatus::Pending);
        assert_eq!(PaymentStatus::from_gateway("FAILED"), PaymentStatus::Pending);
    }
}
