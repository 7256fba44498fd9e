pub mod config;
pub mod logging;

pub mod control;
pub mod retry;
pub mod store;
