pub mod config;
pub mod context;
pub mod logging;

pub mod callback;
pub mod catalog;
pub mod pagination;
pub mod payment;
pub mod reachability;
pub mod retry;
pub mod store;
