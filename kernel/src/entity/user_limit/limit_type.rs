use serde::{Deserialize, Serialize};

/// Category of limit the record instantiates.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LimitType {
    Deposit,
    Withdrawal,
}
