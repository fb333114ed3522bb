//! HTTP handlers.

mod snapshot;
mod system;

pub use snapshot::*;
pub use system::*;
