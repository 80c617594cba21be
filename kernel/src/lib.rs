pub use crate::error::*;

mod entity;
mod error;
mod event;
mod store;
mod transport;

#[cfg(feature = "prelude")]
pub mod prelude {
    pub mod entity {
        pub use crate::entity::*;
    }
}

#[cfg(feature = "interface")]
pub mod interface {
    pub mod event {
        pub use crate::event::*;
    }
    pub mod store {
        pub use crate::store::*;
    }
    pub mod transport {
        pub use crate::transport::*;
    }
}
