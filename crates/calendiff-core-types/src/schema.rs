//! Canonical schema constants for structured logging
//!
//! Every log line emitted through the logging macros carries these keys so
//! that captured output can be filtered the same way in tests and in
//! production JSON logs.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";

// Snapshot / event identifiers
pub const FIELD_DIFF_ID: &str = "diff_id";
pub const FIELD_UNIQUE_ID: &str = "unique_id";
pub const FIELD_SNAPSHOT_PATH: &str = "snapshot_path";

// Collection sizes
pub const FIELD_CURRENT_LEN: &str = "current_len";
pub const FIELD_PREVIOUS_LEN: &str = "previous_len";
pub const FIELD_OUTPUT_LEN: &str = "output_len";
pub const FIELD_SHIFTED_LEN: &str = "shifted_len";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
