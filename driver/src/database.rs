mod memory;
mod redis;

pub use self::{memory::*, redis::*};
