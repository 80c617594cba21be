use error_stack::Report;
use serde_json::Value;
use tracing::info;

use kernel::interface::event::{
    UserLimitCreatedPayload, UserLimitProgressChangedPayload, UserLimitResetPayload,
};
use kernel::interface::store::{DependOnUserLimitStore, UserLimitStore};
use kernel::prelude::entity::LimitAmount;
use kernel::KernelError;

/// Applies `USER_LIMIT_CREATED`: the record must not exist yet, and its
/// progress starts at `"0"`.
#[async_trait::async_trait]
pub trait CreateUserLimitService: 'static + Sync + Send + DependOnUserLimitStore {
    async fn create_user_limit(&self, raw: &Value) -> error_stack::Result<(), KernelError> {
        let payload = UserLimitCreatedPayload::parse(raw)?;
        let user_id = payload.user_id().clone();

        if self.user_limit_store().has(&user_id).await? {
            return Err(Report::new(KernelError::AlreadyExists {
                user_id: user_id.to_string(),
            })
            .attach_printable("Failed to create user limit"));
        }

        self.user_limit_store()
            .set(&user_id, payload.into_limit())
            .await?;
        info!("User limit created: {user_id}");
        Ok(())
    }
}

impl<T> CreateUserLimitService for T where T: DependOnUserLimitStore {}

/// Applies `USER_LIMIT_PROGRESS_CHANGED`: overwrites progress with
/// `previousProgress + amount`. Numeric validation happens after the
/// existence check and before any store write, `amount` first.
#[async_trait::async_trait]
pub trait ChangeUserLimitProgressService: 'static + Sync + Send + DependOnUserLimitStore {
    async fn change_user_limit_progress(
        &self,
        raw: &Value,
    ) -> error_stack::Result<(), KernelError> {
        let payload = UserLimitProgressChangedPayload::parse(raw)?;
        let user_id = payload.user_id().clone();
        let store = self.user_limit_store();

        if !store.has(&user_id).await? {
            return Err(Report::new(KernelError::NotFound {
                user_id: user_id.to_string(),
            })
            .attach_printable("Failed to change user limit progress"));
        }

        let amount = payload.amount().as_non_negative("amount")?;
        let previous_progress = payload
            .previous_progress()
            .as_non_negative("previousProgress")?;

        let Some(limit) = store.get(&user_id).await? else {
            return Err(Report::new(KernelError::NotFound {
                user_id: user_id.to_string(),
            })
            .attach_printable("Failed to change user limit progress"));
        };

        let progress = LimitAmount::from_number(previous_progress + amount);
        let limit = limit.reconstruct(|l| l.progress = progress.clone());
        store.set(&user_id, limit).await?;

        info!(
            "User limit progress changed: {user_id} New progress: {}",
            progress.as_ref()
        );
        Ok(())
    }
}

impl<T> ChangeUserLimitProgressService for T where T: DependOnUserLimitStore {}

/// Applies `USER_LIMIT_RESET`: zeroes progress on an existing record. The
/// reset-specific payload fields are schema-checked but do not influence the
/// new state.
#[async_trait::async_trait]
pub trait ResetUserLimitService: 'static + Sync + Send + DependOnUserLimitStore {
    async fn reset_user_limit(&self, raw: &Value) -> error_stack::Result<(), KernelError> {
        let payload = UserLimitResetPayload::parse(raw)?;
        let user_id = payload.user_id().clone();
        let store = self.user_limit_store();

        if !store.has(&user_id).await? {
            return Err(Report::new(KernelError::NotFound {
                user_id: user_id.to_string(),
            })
            .attach_printable("Failed to reset user limit progress"));
        }

        let Some(limit) = store.get(&user_id).await? else {
            return Err(Report::new(KernelError::NotFound {
                user_id: user_id.to_string(),
            })
            .attach_printable("Failed to reset user limit progress"));
        };

        let limit = limit.reconstruct(|l| l.progress = LimitAmount::zero());
        store.set(&user_id, limit).await?;

        info!("User limit reset: {user_id}");
        Ok(())
    }
}

impl<T> ResetUserLimitService for T where T: DependOnUserLimitStore {}
