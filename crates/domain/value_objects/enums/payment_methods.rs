use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Method recorded on a payment row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Gateway,
    PayAtProperty,
    Cash,
    Qris,
    Transfer,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Gateway => "gateway",
            PaymentMethod::PayAtProperty => "pay_at_property",
            PaymentMethod::Cash => "cash",
            PaymentMethod::Qris => "qris",
            PaymentMethod::Transfer => "transfer",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "gateway" => Some(PaymentMethod::Gateway),
            "pay_at_property" => Some(PaymentMethod::PayAtProperty),
            "cash" => Some(PaymentMethod::Cash),
            "qris" => Some(PaymentMethod::Qris),
            "transfer" => Some(PaymentMethod::Transfer),
            _ => None,
        }
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Methods the front desk can record by hand.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OnsiteMethod {
    Cash,
    Qris,
    Transfer,
}

impl From<OnsiteMethod> for PaymentMethod {
    fn from(value: OnsiteMethod) -> Self {
        match value {
            OnsiteMethod::Cash => PaymentMethod::Cash,
            OnsiteMethod::Qris => PaymentMethod::Qris,
            OnsiteMethod::Transfer => PaymentMethod::Transfer,
        }
    }
}

impl Display for OnsiteMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(PaymentMethod::from(*self).as_str())
    }
}
