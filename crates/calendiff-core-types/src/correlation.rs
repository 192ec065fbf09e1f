//! Correlation ids for tying log lines and errors to one CLI invocation.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of one run (one CLI invocation, one dashboard refresh).
///
/// UUIDv7, so ids sort by creation time in collected logs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a run is working on, for the root log span and error reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub request_id: RequestId,
    /// Subcommand or dashboard action (`diff`, `table`, `post`)
    pub command: Option<String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::with_request_id(RequestId::new())
    }

    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            command: None,
        }
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// `command` or `"-"`, for log fields that must always be present.
    pub fn command_label(&self) -> &str {
        self.command.as_deref().unwrap_or("-")
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
