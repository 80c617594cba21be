use std::fmt::{Display, Formatter};

use destructure::Mutation;
use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln, References};

use crate::KernelError;

/// Transport-assigned identifier of one record within a stream, used for
/// selective redelivery of failed records.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Fromln, AsRefln, Serialize, Deserialize)]
pub struct SequenceNumber(String);

impl SequenceNumber {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl Display for SequenceNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// One opaque, independently-acknowledgeable unit within a batch. `data` is
/// the base64 text of a JSON event envelope.
#[derive(Debug, Clone, References)]
pub struct StreamRecord {
    sequence_number: SequenceNumber,
    data: String,
}

impl StreamRecord {
    pub fn new(sequence_number: SequenceNumber, data: impl Into<String>) -> Self {
        Self {
            sequence_number,
            data: data.into(),
        }
    }
}

/// Result of one batch. `succeeded` holds the records that actually ran to
/// completion and may be settled; `failures` holds the ones that must be
/// redelivered. Records the batch never reached appear in neither list, so
/// acknowledging anything outside `succeeded` would lose them.
#[derive(Debug, Clone, Default, References)]
pub struct BatchOutcome {
    succeeded: Vec<SequenceNumber>,
    failures: Vec<SequenceNumber>,
}

impl BatchOutcome {
    pub fn new(succeeded: Vec<SequenceNumber>, failures: Vec<SequenceNumber>) -> Self {
        Self {
            succeeded,
            failures,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn is_failed(&self, sequence_number: &SequenceNumber) -> bool {
        self.failures.contains(sequence_number)
    }
}

#[derive(Debug, Clone, References, Mutation)]
pub struct SourceConfig {
    batch_size: usize,
    claim_idle_millis: i32,
    block_millis: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            claim_idle_millis: 30_000,
            block_millis: 1000,
        }
    }
}

/// Upstream source of raw records. Acknowledged records are settled;
/// unacknowledged ones are redelivered by the transport, which also
/// guarantees unique-per-key ordering across concurrent consumers.
#[async_trait::async_trait]
pub trait EventSource: 'static + Sync + Send {
    async fn poll(&self) -> error_stack::Result<Vec<StreamRecord>, KernelError>;
    async fn ack(&self, ids: &[SequenceNumber]) -> error_stack::Result<(), KernelError>;
    async fn publish(&self, data: &str) -> error_stack::Result<SequenceNumber, KernelError>;
}

pub trait DependOnEventSource: 'static + Sync + Send {
    type EventSource: EventSource;
    fn event_source(&self) -> &Self::EventSource;
}

impl<T> DependOnEventSource for T
where
    T: EventSource,
{
    type EventSource = T;
    fn event_source(&self) -> &Self::EventSource {
        self
    }
}

#[cfg(test)]
mod test {
    use crate::transport::{BatchOutcome, SequenceNumber};

    #[test]
    fn empty_outcome_is_success() {
        assert!(BatchOutcome::default().is_success());
    }

    #[test]
    fn outcome_tracks_failed_records() {
        let done = SequenceNumber::new("1");
        let failed = SequenceNumber::new("2");
        let outcome = BatchOutcome::new(vec![done.clone()], vec![failed.clone()]);
        assert!(!outcome.is_success());
        assert!(outcome.is_failed(&failed));
        assert!(!outcome.is_failed(&done));
        assert_eq!(outcome.succeeded(), &vec![done]);
    }

    #[test]
    fn unreached_records_are_neither_succeeded_nor_failed() {
        let outcome = BatchOutcome::new(vec![], vec![SequenceNumber::new("1")]);
        let unreached = SequenceNumber::new("2");
        assert!(!outcome.is_failed(&unreached));
        assert!(!outcome.succeeded().contains(&unreached));
    }
}
