use error_stack::Report;
use kernel::KernelError;

const RUN_MODE: &str = "RUN_MODE";
const STORE_BACKEND: &str = "STORE_BACKEND";
const EVENTS_FILE: &str = "EVENTS_FILE";
const STREAM_NAME: &str = "STREAM_NAME";

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RunMode {
    Local,
    Stream,
}

impl RunMode {
    fn parse(value: Option<&str>) -> error_stack::Result<Self, KernelError> {
        match value {
            Some("local") => Ok(RunMode::Local),
            Some("stream") | None => Ok(RunMode::Stream),
            Some(other) => Err(Report::new(KernelError::Config)
                .attach_printable(format!("Unknown run mode: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum StoreBackend {
    Memory,
    Redis,
}

impl StoreBackend {
    fn parse(value: Option<&str>, run_mode: RunMode) -> error_stack::Result<Self, KernelError> {
        match value {
            Some("memory") => Ok(StoreBackend::Memory),
            Some("redis") => Ok(StoreBackend::Redis),
            Some(other) => Err(Report::new(KernelError::Config)
                .attach_printable(format!("Unknown store backend: {other}"))),
            None => Ok(match run_mode {
                RunMode::Local => StoreBackend::Memory,
                RunMode::Stream => StoreBackend::Redis,
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub run_mode: RunMode,
    pub store_backend: StoreBackend,
    pub events_file: String,
    pub stream_name: String,
}

impl AppConfig {
    /// Reads the process environment (and `.env`). Unset values fall back to
    /// stream consumption against Redis, or an in-memory store when
    /// `RUN_MODE=local`; unrecognized values fail fast at startup.
    pub fn load() -> error_stack::Result<Self, KernelError> {
        let run_mode = RunMode::parse(dotenvy::var(RUN_MODE).ok().as_deref())?;
        let store_backend =
            StoreBackend::parse(dotenvy::var(STORE_BACKEND).ok().as_deref(), run_mode)?;
        Ok(Self {
            run_mode,
            store_backend,
            events_file: dotenvy::var(EVENTS_FILE)
                .unwrap_or_else(|_| "./data/events.json".to_string()),
            stream_name: dotenvy::var(STREAM_NAME)
                .unwrap_or_else(|_| "user-limit-events".to_string()),
        })
    }
}

#[cfg(test)]
mod test {
    use kernel::KernelError;

    use crate::config::{RunMode, StoreBackend};

    #[test]
    fn run_mode_defaults_to_stream() -> error_stack::Result<(), KernelError> {
        assert_eq!(RunMode::parse(None)?, RunMode::Stream);
        assert_eq!(RunMode::parse(Some("stream"))?, RunMode::Stream);
        assert_eq!(RunMode::parse(Some("local"))?, RunMode::Local);
        Ok(())
    }

    #[test]
    fn unknown_run_mode_fails_fast() {
        let report = RunMode::parse(Some("lambda")).expect_err("must fail");
        assert!(matches!(report.current_context(), KernelError::Config));
    }

    #[test]
    fn store_backend_defaults_follow_run_mode() -> error_stack::Result<(), KernelError> {
        assert_eq!(
            StoreBackend::parse(None, RunMode::Local)?,
            StoreBackend::Memory
        );
        assert_eq!(
            StoreBackend::parse(None, RunMode::Stream)?,
            StoreBackend::Redis
        );
        assert_eq!(
            StoreBackend::parse(Some("memory"), RunMode::Stream)?,
            StoreBackend::Memory
        );
        Ok(())
    }

    #[test]
    fn unknown_store_backend_fails_fast() {
        let report = StoreBackend::parse(Some("postgres"), RunMode::Stream).expect_err("must fail");
        assert!(matches!(report.current_context(), KernelError::Config));
    }
}
