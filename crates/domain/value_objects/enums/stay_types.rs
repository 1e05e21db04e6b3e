use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Billing granularity of a stay. Each variant also fixes the unit length used to
/// turn a night count into billable units.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StayType {
    Daily,
    Weekly,
    Monthly,
}

impl StayType {
    pub const ALL: [StayType; 3] = [StayType::Daily, StayType::Weekly, StayType::Monthly];

    pub fn as_str(&self) -> &'static str {
        match self {
            StayType::Daily => "daily",
            StayType::Weekly => "weekly",
            StayType::Monthly => "monthly",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "daily" => Some(StayType::Daily),
            "weekly" => Some(StayType::Weekly),
            "monthly" => Some(StayType::Monthly),
            _ => None,
        }
    }

    pub fn unit_days(&self) -> i64 {
        match self {
            StayType::Daily => 1,
            StayType::Weekly => 7,
            StayType::Monthly => 30,
        }
    }
}

impl Display for StayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
