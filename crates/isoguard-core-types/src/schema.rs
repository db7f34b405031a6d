//! Field and event names shared by the logging macros and log assertions.

/// Module path of the emitting code
pub const FIELD_COMPONENT: &str = "component";
/// Operation name, e.g. `capture`, `verify_isolation`
pub const FIELD_OP: &str = "op";
/// Lifecycle marker, one of the `EVENT_*` values
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_ERR_CODE: &str = "err.code";

// Verification run context
pub const FIELD_RUN_ID: &str = "run_id";
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_ROOT: &str = "root";
pub const FIELD_PHASE: &str = "phase";
pub const FIELD_VERDICT: &str = "verdict";

pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
