use base64::prelude::{Engine as _, BASE64_STANDARD};
use error_stack::ResultExt;
use tracing::error;

use kernel::interface::event::{EventEnvelope, EventType};
use kernel::interface::store::DependOnUserLimitStore;
use kernel::interface::transport::{BatchOutcome, SequenceNumber, StreamRecord};
use kernel::KernelError;

use crate::service::{
    ChangeUserLimitProgressService, CreateUserLimitService, ResetUserLimitService,
};

/// What to do with the rest of a batch once a record fails to decode.
///
/// `EagerReturn` reports only the failing record and defers everything after
/// it to transport redelivery, trading duplicate-free progress for
/// at-least-once latency. `Continue` records the failure and keeps going,
/// which suits local replays where redelivery does not exist.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FailureMode {
    Continue,
    EagerReturn,
}

/// Routes each decoded event of a batch to its handler, sequentially and in
/// delivery order, collecting per-record failures for selective redelivery.
pub struct EventProcessor<M> {
    module: M,
    mode: FailureMode,
}

impl<M> EventProcessor<M>
where
    M: DependOnUserLimitStore,
{
    pub fn new(module: M, mode: FailureMode) -> Self {
        Self { module, mode }
    }

    pub async fn process_batch(&self, records: &[StreamRecord]) -> BatchOutcome {
        let mut succeeded: Vec<SequenceNumber> = Vec::new();
        let mut failures: Vec<SequenceNumber> = Vec::new();

        for record in records {
            let envelope = match Self::decode(record.data()) {
                Ok(envelope) => envelope,
                Err(report) => {
                    error!(
                        "Invalid record {}: {report:?}",
                        record.sequence_number()
                    );
                    failures.push(record.sequence_number().clone());
                    match self.mode {
                        // Records after this one were never attempted and
                        // belong to neither list.
                        FailureMode::EagerReturn => {
                            return BatchOutcome::new(succeeded, failures)
                        }
                        FailureMode::Continue => continue,
                    }
                }
            };

            match self.apply(&envelope).await {
                Ok(()) => succeeded.push(record.sequence_number().clone()),
                Err(report) => {
                    error!(
                        "There was an error while processing record {}: {report:?}",
                        record.sequence_number()
                    );
                    failures.push(record.sequence_number().clone());
                }
            }
        }

        BatchOutcome::new(succeeded, failures)
    }

    async fn apply(&self, envelope: &EventEnvelope) -> error_stack::Result<(), KernelError> {
        match envelope.event_type() {
            EventType::UserLimitCreated => self.module.create_user_limit(envelope.payload()).await,
            EventType::UserLimitProgressChanged => {
                self.module
                    .change_user_limit_progress(envelope.payload())
                    .await
            }
            EventType::UserLimitReset => self.module.reset_user_limit(envelope.payload()).await,
            EventType::Unknown => {
                // Not a failure: the record is settled without effect.
                error!("No handler registered for event type");
                Ok(())
            }
        }
    }

    fn decode(data: &str) -> error_stack::Result<EventEnvelope, KernelError> {
        let json = BASE64_STANDARD
            .decode(data)
            .change_context_lazy(|| KernelError::Decode)?;
        serde_json::from_slice(&json).change_context_lazy(|| KernelError::Decode)
    }
}
