use calendiff_core_types::RequestId;
use thiserror::Error;

/// Result type alias using CalendiffError
pub type Result<T> = std::result::Result<T, CalendiffError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers and tests can match on
/// without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Input / precondition
    InvalidInput,
    /// A snapshot lacks a column the diff engine reads
    MissingColumn,
    NotFound,

    // Configuration side files
    /// A type-mapping rule has an unknown operator or an invalid pattern
    InvalidRule,
    /// A template file or template entry is malformed
    InvalidTemplate,
    InvalidConfig,

    // Integration/IO
    Io,
    Serialization,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::MissingColumn => "ERR_MISSING_COLUMN",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::InvalidRule => "ERR_INVALID_RULE",
            ExErrorKind::InvalidTemplate => "ERR_INVALID_TEMPLATE",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification for programmatic handling plus optional context
/// (operation, offending entity, request id) for diagnostics.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    column: Option<String>,
    request_id: Option<RequestId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            column: None,
            request_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity context (a file path, a rule index, a template name)
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add column context
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity: {})", entity_id)?;
        }
        if let Some(column) = &self.column {
            write!(f, " (column: {})", column)?;
        }
        if let Some(request_id) = &self.request_id {
            write!(f, " (request_id: {})", request_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Domain error taxonomy for calendiff operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalendiffError {
    /// A snapshot does not expose a column the diff engine depends on
    #[error("Snapshot '{snapshot}' is missing required column: {column}")]
    MissingColumn { snapshot: String, column: String },

    /// A CSV row has a different number of cells than the header
    #[error("Row {row} of '{source_name}' has {found} cells, expected {expected}")]
    RaggedRow {
        source_name: String,
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A file the caller asked for does not exist
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// Rule condition uses an operator outside the supported set
    #[error("Rule {rule_index} uses unknown operator '{operator}'")]
    UnknownOperator { rule_index: usize, operator: String },

    /// Rule condition `matches` pattern does not compile
    #[error("Rule {rule_index} has an invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        rule_index: usize,
        pattern: String,
        reason: String,
    },

    /// Timezone name is not one of the supported zones
    #[error("Unknown timezone: {name}")]
    UnknownTimezone { name: String },

    /// Named Discord template does not exist
    #[error("Template not found: {name}")]
    TemplateNotFound { name: String },

    /// Configuration value is invalid
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Serialization error
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// IO error
    #[error("IO error: {message}")]
    Io { message: String },
}

/// Conversion from CalendiffError to ExError
impl From<CalendiffError> for ExError {
    fn from(err: CalendiffError) -> Self {
        match err {
            CalendiffError::MissingColumn { snapshot, column } => {
                ExError::new(ExErrorKind::MissingColumn)
                    .with_entity_id(snapshot)
                    .with_column(column)
                    .with_message("Snapshot is missing a required column")
            }

            CalendiffError::RaggedRow {
                source_name,
                row,
                expected,
                found,
            } => ExError::new(ExErrorKind::InvalidInput)
                .with_entity_id(source_name)
                .with_message(format!(
                    "Row {} has {} cells, expected {}",
                    row, found, expected
                )),

            CalendiffError::FileNotFound { path } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(path)
                .with_message("File not found"),

            CalendiffError::UnknownOperator {
                rule_index,
                operator,
            } => ExError::new(ExErrorKind::InvalidRule)
                .with_entity_id(format!("rule[{}]", rule_index))
                .with_message(format!("Unknown operator '{}'", operator)),

            CalendiffError::InvalidPattern {
                rule_index,
                pattern,
                reason,
            } => ExError::new(ExErrorKind::InvalidRule)
                .with_entity_id(format!("rule[{}]", rule_index))
                .with_message(format!("Invalid pattern '{}': {}", pattern, reason)),

            CalendiffError::UnknownTimezone { name } => ExError::new(ExErrorKind::InvalidConfig)
                .with_entity_id(name)
                .with_message("Unknown timezone"),

            CalendiffError::TemplateNotFound { name } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(name)
                .with_message("Template not found"),

            CalendiffError::InvalidConfig { reason } => {
                ExError::new(ExErrorKind::InvalidConfig).with_message(reason)
            }

            CalendiffError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }

            CalendiffError::Io { message } => ExError::new(ExErrorKind::Io).with_message(message),
        }
    }
}

/// Conversion from serde_json::Error to CalendiffError
impl From<serde_json::Error> for CalendiffError {
    fn from(err: serde_json::Error) -> Self {
        CalendiffError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for CalendiffError {
    fn from(err: std::io::Error) -> Self {
        CalendiffError::Io {
            message: err.to_string(),
        }
    }
}

impl From<csv::Error> for ExError {
    fn from(err: csv::Error) -> Self {
        let kind = if err.is_io_error() {
            ExErrorKind::Io
        } else {
            ExErrorKind::InvalidInput
        };
        ExError::new(kind).with_message(format!("CSV error: {}", err))
    }
}

impl From<serde_json::Error> for ExError {
    fn from(err: serde_json::Error) -> Self {
        CalendiffError::from(err).into()
    }
}

impl From<std::io::Error> for ExError {
    fn from(err: std::io::Error) -> Self {
        CalendiffError::from(err).into()
    }
}
