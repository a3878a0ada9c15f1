//! I/O helpers for liecounter commands.

pub mod atomic;
pub mod config;
pub mod fact_source;
pub mod init;
pub mod page;
pub mod state_store;
