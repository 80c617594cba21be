mod limit;
mod stream;

use crate::env;
use crate::error::ConvertError;
use deadpool_redis::redis::RedisError;
use deadpool_redis::{Config, Connection, Pool, PoolError, Runtime};
use error_stack::{Report, ResultExt};
use kernel::KernelError;
use std::ops::{Deref, DerefMut};

pub use crate::database::redis::limit::*;
pub use crate::database::redis::stream::*;

const REDIS_URL: &str = "REDIS_URL";

pub struct RedisDatabase {
    pool: Pool,
}

impl RedisDatabase {
    pub fn new() -> error_stack::Result<Self, KernelError> {
        let url = env(REDIS_URL)?;
        let cfg = Config::from_url(url);
        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .change_context_lazy(|| KernelError::Store)?;
        Ok(Self { pool })
    }

    pub(crate) async fn connect(&self) -> error_stack::Result<RedisConnection, KernelError> {
        let con: Connection = self.pool.get().await.convert_error()?;
        Ok(RedisConnection(con))
    }
}

impl Clone for RedisDatabase {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
        }
    }
}

pub struct RedisConnection(Connection);

impl Deref for RedisConnection {
    type Target = Connection;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for RedisConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T> ConvertError for Result<T, PoolError> {
    type Ok = T;
    fn convert_error(self) -> error_stack::Result<T, KernelError> {
        self.map_err(|error| Report::new(error).change_context(KernelError::Store))
    }
}

impl<T> ConvertError for Result<T, RedisError> {
    type Ok = T;
    fn convert_error(self) -> error_stack::Result<T, KernelError> {
        self.map_err(|error| Report::new(error).change_context(KernelError::Store))
    }
}
