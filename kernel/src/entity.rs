mod user_limit;

pub use self::user_limit::*;
