use serde::{Deserialize, Serialize};

/// Reset cadence of a limit.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LimitPeriod {
    Day,
    Week,
    Month,
}
