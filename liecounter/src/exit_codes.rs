//! Stable exit codes for liecounter CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Invalid config, usage, or any failure outside the run taxonomy.
pub const INVALID: i32 = 1;
/// State file missing, unreadable, or malformed.
pub const STATE_LOAD: i32 = 3;
/// Fact source unreachable, rejected the request, or returned garbage.
pub const FACT_SOURCE: i32 = 4;
/// Next state could not be persisted.
pub const STATE_WRITE: i32 = 5;
/// State was saved but the static page was not regenerated.
pub const RENDER: i32 = 6;
