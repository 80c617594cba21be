mod processor;
mod service;

pub use self::processor::*;
pub use self::service::*;
