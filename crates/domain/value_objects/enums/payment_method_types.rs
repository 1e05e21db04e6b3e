use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// How the guest chose to settle a reservation when booking.
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethodType {
    #[default]
    Online,
    DpOnline,
    PayAtProperty,
}

impl PaymentMethodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethodType::Online => "online",
            PaymentMethodType::DpOnline => "dp_online",
            PaymentMethodType::PayAtProperty => "pay_at_property",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "online" => Some(PaymentMethodType::Online),
            "dp_online" => Some(PaymentMethodType::DpOnline),
            "pay_at_property" => Some(PaymentMethodType::PayAtProperty),
            _ => None,
        }
    }
}

impl Display for PaymentMethodType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
