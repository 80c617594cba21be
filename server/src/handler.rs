use std::ops::Deref;
use std::sync::Arc;

use kernel::interface::store::{DependOnUserLimitStore, UserLimitStore};

/// Cheap-to-clone dependency container handed to the event processor.
pub struct AppModule<S>(Arc<Handler<S>>);

impl<S> AppModule<S> {
    pub fn new(store: S) -> Self {
        Self(Arc::new(Handler { store }))
    }
}

impl<S> Clone for AppModule<S> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<S> Deref for AppModule<S> {
    type Target = Handler<S>;
    fn deref(&self) -> &Self::Target {
        Deref::deref(&self.0)
    }
}

pub struct Handler<S> {
    store: S,
}

impl<S> DependOnUserLimitStore for AppModule<S>
where
    S: UserLimitStore,
{
    type UserLimitStore = S;
    fn user_limit_store(&self) -> &Self::UserLimitStore {
        &self.0.store
    }
}
