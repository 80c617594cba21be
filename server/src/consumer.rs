use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error, warn};

use application::{EventProcessor, FailureMode};
use kernel::interface::store::{DependOnUserLimitStore, UserLimitStore};
use kernel::interface::transport::{EventSource, StreamRecord};

use crate::handler::AppModule;

/// Consumes the stream until the process is stopped. Only records that
/// applied cleanly are acknowledged; failed and unattempted ones stay
/// pending and come back through the source's claim path.
pub async fn run<S, E>(module: AppModule<S>, source: E)
where
    S: UserLimitStore,
    E: EventSource,
{
    let processor = EventProcessor::new(module, FailureMode::EagerReturn);
    loop {
        let records = match source.poll().await {
            Ok(records) => records,
            Err(report) => {
                error!("{report:?}");
                sleep(Duration::from_secs(1)).await;
                continue;
            }
        };
        if records.is_empty() {
            continue;
        }
        consume(&processor, &source, &records).await;
    }
}

async fn consume<M, E>(processor: &EventProcessor<M>, source: &E, records: &[StreamRecord])
where
    M: DependOnUserLimitStore,
    E: EventSource,
{
    debug!("Processing batch of {} records", records.len());

    let outcome = processor.process_batch(records).await;
    if !outcome.is_success() {
        warn!(
            "{} of {} records failed, leaving them pending",
            outcome.failures().len(),
            records.len()
        );
    }

    if let Err(report) = source.ack(outcome.succeeded()).await {
        error!("{report:?}");
    }
}

#[cfg(test)]
mod test {
    use std::sync::Mutex;

    use base64::prelude::{Engine as _, BASE64_STANDARD};
    use serde_json::{json, Value};

    use application::{EventProcessor, FailureMode};
    use driver::database::InMemoryUserLimitStore;
    use kernel::interface::store::UserLimitStore;
    use kernel::interface::transport::{EventSource, SequenceNumber, StreamRecord};
    use kernel::prelude::entity::UserId;
    use kernel::KernelError;

    use crate::consumer::consume;
    use crate::handler::AppModule;

    #[derive(Default)]
    struct RecordingSource {
        acked: Mutex<Vec<SequenceNumber>>,
    }

    impl RecordingSource {
        fn acked(&self) -> Vec<SequenceNumber> {
            self.acked.lock().expect("lock must not be poisoned").clone()
        }
    }

    #[async_trait::async_trait]
    impl EventSource for RecordingSource {
        async fn poll(&self) -> error_stack::Result<Vec<StreamRecord>, KernelError> {
            Ok(Vec::new())
        }

        async fn ack(&self, ids: &[SequenceNumber]) -> error_stack::Result<(), KernelError> {
            self.acked
                .lock()
                .expect("lock must not be poisoned")
                .extend(ids.iter().cloned());
            Ok(())
        }

        async fn publish(&self, _data: &str) -> error_stack::Result<SequenceNumber, KernelError> {
            Ok(SequenceNumber::new("0"))
        }
    }

    fn record(sequence_number: &str, envelope: Value) -> StreamRecord {
        let data = BASE64_STANDARD.encode(envelope.to_string());
        StreamRecord::new(SequenceNumber::new(sequence_number), data)
    }

    fn created_envelope(user_id: &str) -> Value {
        json!({
            "type": "USER_LIMIT_CREATED",
            "payload": {
                "brandId": "mock-brand-id",
                "currencyCode": "EUR",
                "nextResetTime": 1700000000000_i64,
                "userId": user_id,
                "userLimitId": "mock-user-limit-id",
                "activeFrom": 1700000000000_i64,
                "period": "DAY",
                "status": "ACTIVE",
                "type": "DEPOSIT",
                "value": "1000"
            }
        })
    }

    fn progress_envelope(user_id: &str, amount: &str, previous_progress: &str) -> Value {
        json!({
            "type": "USER_LIMIT_PROGRESS_CHANGED",
            "payload": {
                "brandId": "mock-brand-id",
                "currencyCode": "EUR",
                "nextResetTime": 1700000000000_i64,
                "userId": user_id,
                "userLimitId": "mock-user-limit-id",
                "amount": amount,
                "previousProgress": previous_progress,
                "remainingAmount": "400"
            }
        })
    }

    #[tokio::test]
    async fn records_after_a_decode_failure_are_neither_applied_nor_acked() {
        let store = InMemoryUserLimitStore::default();
        let processor =
            EventProcessor::new(AppModule::new(store.clone()), FailureMode::EagerReturn);
        let source = RecordingSource::default();

        let records = vec![
            StreamRecord::new(SequenceNumber::new("1"), "not-base64!"),
            record("2", created_envelope("u1")),
        ];
        consume(&processor, &source, &records).await;

        // The record behind the failure must stay pending for redelivery.
        let absent = store
            .get(&UserId::new("u1"))
            .await
            .expect("store must not fail");
        assert!(absent.is_none());
        assert!(source.acked().is_empty());
    }

    #[tokio::test]
    async fn only_cleanly_applied_records_are_acked() {
        let store = InMemoryUserLimitStore::default();
        let processor =
            EventProcessor::new(AppModule::new(store.clone()), FailureMode::EagerReturn);
        let source = RecordingSource::default();

        let records = vec![
            record("1", created_envelope("u1")),
            record("2", created_envelope("u1")),
            record("3", progress_envelope("u1", "100", "0")),
        ];
        consume(&processor, &source, &records).await;

        // The duplicate create stays pending; the records around it settle.
        assert_eq!(
            source.acked(),
            vec![SequenceNumber::new("1"), SequenceNumber::new("3")]
        );
    }
}
