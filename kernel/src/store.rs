use crate::entity::{UserId, UserLimit};
use crate::KernelError;

/// Key-value contract for user-limit records. Implementations must keep an
/// owned copy on `set`: after the call returns, no caller-held handle may
/// alias stored state.
#[async_trait::async_trait]
pub trait UserLimitStore: 'static + Sync + Send {
    /// Existence check. Absence is not an error.
    async fn has(&self, id: &UserId) -> error_stack::Result<bool, KernelError>;
    /// Absence policy is `None`; callers check `has` first when presence is a
    /// precondition.
    async fn get(&self, id: &UserId) -> error_stack::Result<Option<UserLimit>, KernelError>;
    /// Inserts or fully overwrites the record at `id`.
    async fn set(&self, id: &UserId, limit: UserLimit) -> error_stack::Result<(), KernelError>;
    /// No-op when the record is absent.
    async fn delete(&self, id: &UserId) -> error_stack::Result<(), KernelError>;
}

pub trait DependOnUserLimitStore: 'static + Sync + Send {
    type UserLimitStore: UserLimitStore;
    fn user_limit_store(&self) -> &Self::UserLimitStore;
}

impl<T> DependOnUserLimitStore for T
where
    T: UserLimitStore,
{
    type UserLimitStore = T;
    fn user_limit_store(&self) -> &Self::UserLimitStore {
        self
    }
}
