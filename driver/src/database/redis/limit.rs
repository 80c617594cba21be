use deadpool_redis::redis::AsyncCommands;
use deadpool_redis::Connection;
use error_stack::ResultExt;

use kernel::interface::store::UserLimitStore;
use kernel::prelude::entity::{UserId, UserLimit};
use kernel::KernelError;

use crate::database::RedisDatabase;
use crate::error::ConvertError;

fn key(id: &UserId) -> String {
    format!("user_limit:{id}")
}

pub struct RedisUserLimitStore {
    db: RedisDatabase,
}

impl RedisUserLimitStore {
    pub fn new(db: RedisDatabase) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl UserLimitStore for RedisUserLimitStore {
    async fn has(&self, id: &UserId) -> error_stack::Result<bool, KernelError> {
        let mut con = self.db.connect().await?;
        RedisLimitInternal::exists(&mut con, id).await
    }

    async fn get(&self, id: &UserId) -> error_stack::Result<Option<UserLimit>, KernelError> {
        let mut con = self.db.connect().await?;
        RedisLimitInternal::find(&mut con, id).await
    }

    async fn set(&self, id: &UserId, limit: UserLimit) -> error_stack::Result<(), KernelError> {
        let mut con = self.db.connect().await?;
        RedisLimitInternal::upsert(&mut con, id, &limit).await
    }

    async fn delete(&self, id: &UserId) -> error_stack::Result<(), KernelError> {
        let mut con = self.db.connect().await?;
        RedisLimitInternal::remove(&mut con, id).await
    }
}

pub(in crate::database) struct RedisLimitInternal;

impl RedisLimitInternal {
    async fn exists(
        con: &mut Connection,
        id: &UserId,
    ) -> error_stack::Result<bool, KernelError> {
        con.exists(key(id)).await.convert_error()
    }

    async fn find(
        con: &mut Connection,
        id: &UserId,
    ) -> error_stack::Result<Option<UserLimit>, KernelError> {
        let raw: Option<String> = con.get(key(id)).await.convert_error()?;
        raw.map(|raw| serde_json::from_str(&raw).change_context_lazy(|| KernelError::Store))
            .transpose()
    }

    async fn upsert(
        con: &mut Connection,
        id: &UserId,
        limit: &UserLimit,
    ) -> error_stack::Result<(), KernelError> {
        let raw = serde_json::to_string(limit).change_context_lazy(|| KernelError::Store)?;
        con.set(key(id), raw).await.convert_error()
    }

    async fn remove(con: &mut Connection, id: &UserId) -> error_stack::Result<(), KernelError> {
        con.del(key(id)).await.convert_error()
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
    use uuid::Uuid;

    use crate::database::{RedisDatabase, RedisUserLimitStore};

    #[test_with::env(REDIS_TEST)]
    #[tokio::test]
    async fn test_limit_store() -> error_stack::Result<(), KernelError> {
        let store = RedisUserLimitStore::new(RedisDatabase::new()?);
        let id = UserId::new(Uuid::new_v4().to_string());
        let limit = UserLimit::new(
            id.clone(),
            UserLimitId::new("test-user-limit-id"),
            BrandId::new("test-brand-id"),
            CurrencyCode::new("EUR"),
            LimitAmount::new("1000"),
            LimitAmount::zero(),
            LimitPeriod::Day,
            LimitStatus::Active,
            LimitType::Deposit,
            1700000000000,
        );

        assert!(!store.has(&id).await?);
        store.set(&id, limit.clone()).await?;
        assert!(store.has(&id).await?);
        assert_eq!(store.get(&id).await?, Some(limit));

        store.delete(&id).await?;
        assert!(!store.has(&id).await?);
        assert_eq!(store.get(&id).await?, None);
        Ok(())
    }
}
