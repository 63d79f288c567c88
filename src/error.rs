use thiserror::Error;

/// Application-level error: a message plus the process exit code it maps to.
///
/// Exit codes:
/// - `2`: input/usage problem (missing file, missing column, strict-mode row error)
/// - `3`: no usable rows after validation
/// - `4`: output or internal failure
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<FeatureError> for AppError {
    fn from(err: FeatureError) -> Self {
        AppError::new(2, err.to_string())
    }
}

/// Record-level validation failures found while turning CSV rows into sales records.
///
/// `line` is the 1-based line in the source file (the header is line 1).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeatureError {
    #[error("line {line}: missing required field `{field}`")]
    MissingField { field: &'static str, line: usize },

    #[error("line {line}: invalid date '{value}' (expected YYYY-MM-DD, MM/DD/YYYY, YYYY/MM/DD or MM-DD-YYYY)")]
    InvalidDate { value: String, line: usize },

    #[error("line {line}: `{field}` must not be negative (got {value})")]
    NegativeValue {
        field: &'static str,
        value: String,
        line: usize,
    },

    #[error("line {line}: `{field}` is not a valid value: '{value}'")]
    InvalidNumber {
        field: &'static str,
        value: String,
        line: usize,
    },
}

impl FeatureError {
    pub fn line(&self) -> usize {
        match self {
            FeatureError::MissingField { line, .. }
            | FeatureError::InvalidDate { line, .. }
            | FeatureError::NegativeValue { line, .. }
            | FeatureError::InvalidNumber { line, .. } => *line,
        }
    }

    /// Whether this error invalidates the whole batch regardless of strictness.
    pub fn is_fatal(&self) -> bool {
        matches!(self, FeatureError::MissingField { .. })
    }
}

/// Failures while reducing a batch of derived records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregateError {
    #[error("total {metric} for group {group} overflows")]
    TotalOverflow { metric: &'static str, group: String },
}

impl From<AggregateError> for AppError {
    fn from(err: AggregateError) -> Self {
        AppError::new(2, err.to_string())
    }
}
