mod limit;

pub use self::limit::*;
