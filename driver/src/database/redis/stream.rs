use std::fmt::Debug;
use std::str::from_utf8;

use deadpool_redis::redis::AsyncCommands;
use deadpool_redis::{redis, Connection};
use error_stack::{Report, ResultExt};
use redis::streams::StreamReadOptions;
use redis::{RedisResult, Value};
use tracing::debug;
use uuid::Uuid;

use kernel::interface::transport::{EventSource, SequenceNumber, SourceConfig, StreamRecord};
use kernel::KernelError;

use crate::database::RedisDatabase;
use crate::error::ConvertError;

const RECORD_FIELD: &str = "data";

fn group(name: &str) -> String {
    format!("g:{name}")
}

fn parse_error(value: impl Debug) -> Report<KernelError> {
    Report::new(KernelError::Store)
        .attach_printable(format!("Failed to parse received data. {value:?}"))
}

/// Consumer-group view of one Redis stream. Records claimed from other
/// consumers after `claim_idle_millis` are served before fresh ones, so a
/// crashed consumer's unacknowledged batch is redelivered here.
pub struct RedisStreamSource {
    name: String,
    member: String,
    db: RedisDatabase,
    config: SourceConfig,
}

impl RedisStreamSource {
    pub fn new(db: RedisDatabase, name: &str, config: SourceConfig) -> Self {
        Self {
            name: name.to_string(),
            member: format!("consumer:{}", Uuid::new_v4()),
            db,
            config,
        }
    }
}

#[async_trait::async_trait]
impl EventSource for RedisStreamSource {
    async fn poll(&self) -> error_stack::Result<Vec<StreamRecord>, KernelError> {
        let mut con = self.db.connect().await?;
        let batch = *self.config.batch_size();
        let mut records = RedisStreamInternal::claim_stale(
            &mut con,
            &self.name,
            &self.member,
            self.config.claim_idle_millis(),
            batch,
        )
        .await?;
        if !records.is_empty() {
            debug!("Claimed {} stale pending records", records.len());
        }
        if records.len() < batch {
            let fresh = RedisStreamInternal::read_new(
                &mut con,
                &self.name,
                &self.member,
                batch - records.len(),
                *self.config.block_millis(),
            )
            .await?;
            records.extend(fresh);
        }
        Ok(records)
    }

    async fn ack(&self, ids: &[SequenceNumber]) -> error_stack::Result<(), KernelError> {
        if ids.is_empty() {
            return Ok(());
        }
        let mut con = self.db.connect().await?;
        RedisStreamInternal::settle(&mut con, &self.name, ids).await
    }

    async fn publish(&self, data: &str) -> error_stack::Result<SequenceNumber, KernelError> {
        let mut con = self.db.connect().await?;
        RedisStreamInternal::append(&mut con, &self.name, data).await
    }
}

pub(in crate::database) struct RedisStreamInternal;

impl RedisStreamInternal {
    async fn create_group(con: &mut Connection, name: &str) -> RedisResult<Value> {
        con.xgroup_create_mkstream(name, &group(name), 0).await
    }

    async fn append(
        con: &mut Connection,
        name: &str,
        data: &str,
    ) -> error_stack::Result<SequenceNumber, KernelError> {
        // Ignore error
        let _ = Self::create_group(con, name).await;
        let id: String = con
            .xadd(name, "*", &[(RECORD_FIELD, data)])
            .await
            .convert_error()?;
        Ok(SequenceNumber::new(id))
    }

    async fn read_new(
        con: &mut Connection,
        name: &str,
        member: &str,
        count: usize,
        block_millis: usize,
    ) -> error_stack::Result<Vec<StreamRecord>, KernelError> {
        // Ignore error
        let _ = Self::create_group(con, name).await;
        let options = StreamReadOptions::default()
            .block(block_millis)
            .count(count)
            .group(group(name), member);
        let result: Value = con
            .xread_options(&[name], &[">"], &options)
            .await
            .convert_error()?;
        let bulk = match result {
            Value::Bulk(bulk) => bulk,
            Value::Nil => return Ok(vec![]),
            _ => return Err(parse_error(result)),
        };
        let bulk = match bulk.as_slice() {
            [Value::Bulk(bulk)] => bulk,
            _ => return Err(parse_error(bulk)),
        };
        let entries = match bulk.as_slice() {
            [Value::Data(_name), Value::Bulk(entries)] => entries,
            _ => return Err(parse_error(bulk)),
        };
        entries.iter().map(Self::parse_entry).collect()
    }

    async fn claim_stale(
        con: &mut Connection,
        name: &str,
        own_member: &str,
        time_millis: &i32,
        count: usize,
    ) -> error_stack::Result<Vec<StreamRecord>, KernelError> {
        // Ignore error
        let _ = Self::create_group(con, name).await;
        let group = group(name);
        let value: Value = redis::cmd("XPENDING")
            .arg(name)
            .arg(&group)
            .arg("IDLE")
            .arg(time_millis)
            .arg("-")
            .arg("+")
            .arg(count)
            .query_async(con)
            .await
            .convert_error()?;

        let bulk = match value {
            Value::Bulk(bulk) => bulk,
            _ => return Err(parse_error(value)),
        };
        if bulk.is_empty() {
            return Ok(vec![]);
        }
        let ids = bulk
            .iter()
            .map(|entry| {
                let pending = match entry {
                    Value::Bulk(pending) => pending,
                    _ => return Err(parse_error(entry)),
                };
                match pending.as_slice() {
                    [Value::Data(id), Value::Data(_original_owner), _time, Value::Int(_count)] => {
                        Ok(from_utf8(id)
                            .change_context_lazy(|| KernelError::Store)?
                            .to_string())
                    }
                    _ => Err(parse_error(pending)),
                }
            })
            .collect::<error_stack::Result<Vec<String>, KernelError>>()?;

        let result: Value = con
            .xclaim(name, &group, own_member, time_millis, &ids)
            .await
            .convert_error()?;
        let entries = match result {
            Value::Bulk(entries) => entries,
            _ => return Err(parse_error(result)),
        };
        entries.iter().map(Self::parse_entry).collect()
    }

    fn parse_entry(entry: &Value) -> error_stack::Result<StreamRecord, KernelError> {
        let pair = match entry {
            Value::Bulk(pair) => pair,
            _ => return Err(parse_error(entry)),
        };
        let (id, fields) = match pair.as_slice() {
            [Value::Data(id), Value::Bulk(fields)] => (id, fields),
            _ => return Err(parse_error(pair)),
        };
        let data = match fields.as_slice() {
            [Value::Data(_field), Value::Data(data)] => data,
            _ => return Err(parse_error(fields)),
        };
        Ok(StreamRecord::new(
            SequenceNumber::new(from_utf8(id).change_context_lazy(|| KernelError::Store)?),
            from_utf8(data).change_context_lazy(|| KernelError::Store)?,
        ))
    }

    async fn settle(
        con: &mut Connection,
        name: &str,
        ids: &[SequenceNumber],
    ) -> error_stack::Result<(), KernelError> {
        let ids = ids.iter().map(AsRef::as_ref).collect::<Vec<&String>>();
        con.xack::<_, _, _, ()>(name, &group(name), &ids)
            .await
            .convert_error()?;
        con.xdel::<_, _, ()>(name, &ids).await.convert_error()
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use tokio::time::sleep;
    use uuid::Uuid;

    use kernel::interface::transport::{EventSource, SourceConfig};
    use kernel::KernelError;

    use crate::database::{RedisDatabase, RedisStreamSource};

    #[test_with::env(REDIS_TEST)]
    #[tokio::test]
    async fn test_stream_source() -> error_stack::Result<(), KernelError> {
        let db = RedisDatabase::new()?;
        let name = format!("test-stream:{}", Uuid::new_v4());
        let mut config = SourceConfig::default();
        config.substitute(|config| {
            *config.batch_size = 10;
            *config.claim_idle_millis = 100;
            *config.block_millis = 100;
        });
        let source = RedisStreamSource::new(db.clone(), &name, config.clone());

        let first = source.publish("first").await?;
        source.publish("second").await?;

        let records = source.poll().await?;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].data(), "first");
        assert_eq!(records[0].sequence_number(), &first);
        assert_eq!(records[1].data(), "second");

        // Ack the first; the second stays pending for another consumer.
        source
            .ack(std::slice::from_ref(records[0].sequence_number()))
            .await?;

        let other = RedisStreamSource::new(db, &name, config);
        sleep(Duration::from_millis(200)).await;
        let reclaimed = other.poll().await?;
        assert_eq!(reclaimed.len(), 1);
        assert_eq!(reclaimed[0].data(), "second");
        other
            .ack(std::slice::from_ref(reclaimed[0].sequence_number()))
            .await?;
        Ok(())
    }
}
