use base64::prelude::{Engine as _, BASE64_STANDARD};
use error_stack::ResultExt;
use serde_json::Value;
use tracing::{info, warn};

use application::{EventProcessor, FailureMode};
use kernel::interface::store::UserLimitStore;
use kernel::interface::transport::{SequenceNumber, StreamRecord};
use kernel::KernelError;

use crate::handler::AppModule;

/// One-shot replay of a JSON file holding an array of event envelopes.
/// Failed records are logged and skipped; there is no redelivery here.
pub async fn replay<S>(module: AppModule<S>, path: &str) -> error_stack::Result<(), KernelError>
where
    S: UserLimitStore,
{
    let raw = std::fs::read_to_string(path)
        .change_context_lazy(|| KernelError::Config)
        .attach_printable_lazy(|| format!("Failed to read {path}"))?;
    let events: Vec<Value> =
        serde_json::from_str(&raw).change_context_lazy(|| KernelError::Decode)?;
    let records = events
        .into_iter()
        .enumerate()
        .map(|(index, event)| {
            StreamRecord::new(
                SequenceNumber::new(index.to_string()),
                BASE64_STANDARD.encode(event.to_string()),
            )
        })
        .collect::<Vec<StreamRecord>>();

    let processor = EventProcessor::new(module, FailureMode::Continue);
    let outcome = processor.process_batch(&records).await;
    if outcome.is_success() {
        info!("Replayed {} records", records.len());
    } else {
        warn!(
            "Replayed {} records, {} failed: {:?}",
            records.len(),
            outcome.failures().len(),
            outcome.failures()
        );
    }
    Ok(())
}
