#![forbid(unsafe_code)]

//! Logging shims.
//!
//! With the `tracing` feature these are the `tracing` macros. Without it they
//! expand to nothing, so call sites never need their own `cfg` guards.

#[cfg(feature = "tracing")]
pub use tracing::{debug, error, info, trace, warn};

#[cfg(not(feature = "tracing"))]
mod noop {
    #[macro_export]
    #[doc(hidden)]
    macro_rules! __tessera_noop_log {
        ($($arg:tt)*) => {};
    }
}

#[cfg(not(feature = "tracing"))]
pub use crate::__tessera_noop_log as debug;
#[cfg(not(feature = "tracing"))]
pub use crate::__tessera_noop_log as error;
#[cfg(not(feature = "tracing"))]
pub use crate::__tessera_noop_log as info;
#[cfg(not(feature = "tracing"))]
pub use crate::__tessera_noop_log as trace;
#[cfg(not(feature = "tracing"))]
pub use crate::__tessera_noop_log as warn;
