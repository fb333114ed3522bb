pub mod api;
pub mod cli;
pub mod snapshot;
pub mod store;
