mod limit;
mod schema;

pub use self::{limit::*, schema::*};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use vodca::References;

/// String tag identifying which mutation an envelope carries. Tags outside
/// the known set decode as `Unknown` and are skipped by the dispatch loop.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "USER_LIMIT_CREATED")]
    UserLimitCreated,
    #[serde(rename = "USER_LIMIT_PROGRESS_CHANGED")]
    UserLimitProgressChanged,
    #[serde(rename = "USER_LIMIT_RESET")]
    UserLimitReset,
    #[serde(other)]
    Unknown,
}

/// Wire envelope around one event. Only `type` and `payload` drive the
/// dispatch; the remaining fields are tracing metadata and are tolerated
/// when absent.
#[derive(Debug, Clone, Serialize, Deserialize, References)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    #[serde(rename = "type")]
    event_type: EventType,
    payload: Value,
    #[serde(default)]
    aggregate_id: String,
    #[serde(default)]
    event_id: String,
    #[serde(default)]
    created_at: i64,
    #[serde(default)]
    sequence_number: i64,
    #[serde(default)]
    source: String,
    #[serde(default)]
    context: Value,
}
