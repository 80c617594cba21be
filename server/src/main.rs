use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use driver::database::{
    InMemoryUserLimitStore, RedisDatabase, RedisStreamSource, RedisUserLimitStore,
};
use kernel::interface::transport::SourceConfig;

use crate::config::{AppConfig, RunMode, StoreBackend};
use crate::error::StackTrace;
use crate::handler::AppModule;

mod config;
mod consumer;
mod error;
mod handler;
mod local;

#[tokio::main]
async fn main() -> Result<(), StackTrace> {
    let appender = tracing_appender::rolling::daily(std::path::Path::new("./logs/"), "debug.log");
    let (non_blocking_appender, _guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_filter(tracing_subscriber::EnvFilter::new(
                    std::env::var("RUST_LOG").unwrap_or_else(|_| {
                        "application=debug,driver=debug,server=debug".into()
                    }),
                ))
                .with_filter(tracing_subscriber::filter::LevelFilter::DEBUG),
        )
        .with(
            tracing_subscriber::fmt::Layer::default()
                .with_writer(non_blocking_appender)
                .with_ansi(false)
                .with_filter(tracing_subscriber::filter::LevelFilter::DEBUG),
        )
        .init();

    let config = AppConfig::load()?;
    match config.run_mode {
        RunMode::Local => match config.store_backend {
            StoreBackend::Memory => {
                let module = AppModule::new(InMemoryUserLimitStore::default());
                local::replay(module, &config.events_file).await?;
            }
            StoreBackend::Redis => {
                let module = AppModule::new(RedisUserLimitStore::new(RedisDatabase::new()?));
                local::replay(module, &config.events_file).await?;
            }
        },
        RunMode::Stream => {
            let db = RedisDatabase::new()?;
            let source =
                RedisStreamSource::new(db.clone(), &config.stream_name, SourceConfig::default());
            match config.store_backend {
                StoreBackend::Memory => {
                    let module = AppModule::new(InMemoryUserLimitStore::default());
                    consumer::run(module, source).await;
                }
                StoreBackend::Redis => {
                    let module = AppModule::new(RedisUserLimitStore::new(db));
                    consumer::run(module, source).await;
                }
            }
        }
    }

    Ok(())
}
