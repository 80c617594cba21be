use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use error_stack::Report;

use kernel::interface::store::UserLimitStore;
use kernel::prelude::entity::{UserId, UserLimit};
use kernel::KernelError;

/// Process-local store backend used by local replays and tests. `get` hands
/// out clones, so a caller can never mutate stored state through its copy.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserLimitStore {
    limits: Arc<RwLock<HashMap<UserId, UserLimit>>>,
}

impl InMemoryUserLimitStore {
    fn read(
        &self,
    ) -> error_stack::Result<RwLockReadGuard<'_, HashMap<UserId, UserLimit>>, KernelError> {
        self.limits
            .read()
            .map_err(|_| Report::new(KernelError::Store).attach_printable("Store lock poisoned"))
    }

    fn write(
        &self,
    ) -> error_stack::Result<RwLockWriteGuard<'_, HashMap<UserId, UserLimit>>, KernelError> {
        self.limits
            .write()
            .map_err(|_| Report::new(KernelError::Store).attach_printable("Store lock poisoned"))
    }
}

#[async_trait::async_trait]
impl UserLimitStore for InMemoryUserLimitStore {
    async fn has(&self, id: &UserId) -> error_stack::Result<bool, KernelError> {
        Ok(self.read()?.contains_key(id))
    }

    async fn get(&self, id: &UserId) -> error_stack::Result<Option<UserLimit>, KernelError> {
        Ok(self.read()?.get(id).cloned())
    }

    async fn set(&self, id: &UserId, limit: UserLimit) -> error_stack::Result<(), KernelError> {
        self.write()?.insert(id.clone(), limit);
        Ok(())
    }

    async fn delete(&self, id: &UserId) -> error_stack::Result<(), KernelError> {
        self.write()?.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use kernel::interface::store::UserLimitStore;
    use kernel::prelude::entity::{
        BrandId, CurrencyCode, LimitAmount, LimitPeriod, LimitStatus, LimitType, UserId,
        UserLimit, UserLimitId,
    };
    use kernel::KernelError;

    use crate::database::InMemoryUserLimitStore;

    fn limit(user_id: &UserId) -> UserLimit {
        UserLimit::new(
            user_id.clone(),
            UserLimitId::new("mock-user-limit-id"),
            BrandId::new("mock-brand-id"),
            CurrencyCode::new("EUR"),
            LimitAmount::new("1000"),
            LimitAmount::zero(),
            LimitPeriod::Day,
            LimitStatus::Active,
            LimitType::Deposit,
            1700000000000,
        )
    }

    #[tokio::test]
    async fn set_then_get_returns_the_record() -> error_stack::Result<(), KernelError> {
        let store = InMemoryUserLimitStore::default();
        let id = UserId::new("u1");

        assert!(!store.has(&id).await?);
        store.set(&id, limit(&id)).await?;
        assert!(store.has(&id).await?);
        assert_eq!(store.get(&id).await?, Some(limit(&id)));
        Ok(())
    }

    #[tokio::test]
    async fn get_returns_a_copy() -> error_stack::Result<(), KernelError> {
        let store = InMemoryUserLimitStore::default();
        let id = UserId::new("u1");
        store.set(&id, limit(&id)).await?;

        let copy = store
            .get(&id)
            .await?
            .map(|found| found.reconstruct(|l| l.progress = LimitAmount::new("999")));
        assert!(copy.is_some());
        assert_eq!(store.get(&id).await?, Some(limit(&id)));
        Ok(())
    }

    #[tokio::test]
    async fn delete_is_a_noop_for_absent_records() -> error_stack::Result<(), KernelError> {
        let store = InMemoryUserLimitStore::default();
        let id = UserId::new("u1");

        store.delete(&id).await?;

        store.set(&id, limit(&id)).await?;
        store.delete(&id).await?;
        assert!(!store.has(&id).await?);
        Ok(())
    }
}
