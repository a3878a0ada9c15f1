//! Daily "days since last lie" counter.
//!
//! One scheduled run queries a fact-check service for recent reviews, decides
//! whether any of them rate a claim as false, updates a JSON counter file, and
//! regenerates a static page. The architecture enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (detection, counter update, invariants).
//!   No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (config, state file, HTTP, page output).
//!   Behind traits where tests need to substitute them.
//!
//! Orchestration modules ([`run`], [`render`], [`validate`]) coordinate core
//! logic with I/O to implement CLI commands.

pub mod core;
pub mod error;
pub mod exit_codes;
pub mod fact_check;
pub mod io;
pub mod logging;
pub mod render;
pub mod run;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod validate;
