//! Deterministic, pure logic shared by the counter job.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod counter_update;
pub mod detect;
pub mod invariants;
pub mod types;
