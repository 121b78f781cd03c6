//! Error types for spendview-core
//!
//! Nothing in here is fatal to a view session. Fetch failures keep the
//! previous list on screen, write failures roll the override back, and
//! stale results are dropped and only logged.

use serde::{Deserialize, Serialize};
use spendview_ledger::TransportError;
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// A feed could not be fetched
    FetchFailure,
    /// An approval could not be persisted
    WriteFailure,
    /// A result arrived after the filter it was requested for
    InconsistentFilterState,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::FetchFailure => write!(f, "FETCH_FAILURE"),
            ErrorCode::WriteFailure => write!(f, "WRITE_FAILURE"),
            ErrorCode::InconsistentFilterState => write!(f, "INCONSISTENT_FILTER_STATE"),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Debug => write!(f, "debug"),
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
        }
    }
}

/// The data source a fetch was issued against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedSource {
    Employees,
    Paginated,
    ByEmployee,
}

impl std::fmt::Display for FeedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedSource::Employees => write!(f, "employees"),
            FeedSource::Paginated => write!(f, "paginated transactions"),
            FeedSource::ByEmployee => write!(f, "transactions by employee"),
        }
    }
}

/// Detailed error information for the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    /// Whether repeating the user action may succeed
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    pub fn new(code: ErrorCode, message: String, retryable: bool) -> Self {
        Self {
            code,
            message,
            retryable,
            details: None,
            suggestions: vec![],
        }
    }

    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Main error type for spendview-core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ViewError {
    #[error("Failed to fetch {source_feed}: {message}")]
    FetchFailure { source_feed: FeedSource, message: String },

    #[error("Failed to set approval of {transaction_id}: {message}")]
    WriteFailure { transaction_id: String, message: String },

    #[error("Discarded {source_feed} result: requested for {requested}, filter is now {current}")]
    InconsistentFilterState {
        source_feed: FeedSource,
        requested: String,
        current: String,
    },
}

impl ViewError {
    pub fn fetch(source_feed: FeedSource, error: &TransportError) -> Self {
        ViewError::FetchFailure {
            source_feed,
            message: error.to_string(),
        }
    }

    pub fn write(transaction_id: &str, error: &TransportError) -> Self {
        ViewError::WriteFailure {
            transaction_id: transaction_id.to_string(),
            message: error.to_string(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            ViewError::FetchFailure { .. } => ErrorCode::FetchFailure,
            ViewError::WriteFailure { .. } => ErrorCode::WriteFailure,
            ViewError::InconsistentFilterState { .. } => ErrorCode::InconsistentFilterState,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ViewError::FetchFailure { .. } => ErrorSeverity::Error,
            ViewError::WriteFailure { .. } => ErrorSeverity::Error,
            ViewError::InconsistentFilterState { .. } => ErrorSeverity::Warning,
        }
    }

    /// Stale results are not something the user can retry
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ViewError::InconsistentFilterState { .. })
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string(), self.is_retryable());

        match self {
            ViewError::FetchFailure { source_feed, .. } => {
                details = details.with_detail(serde_json::json!({ "source": source_feed }));
                details = details.with_suggestion(match source_feed {
                    FeedSource::Employees => "Reload the page to fetch the employee list again.".to_string(),
                    FeedSource::Paginated => "Press \"View More\" or re-select All Employees to retry.".to_string(),
                    FeedSource::ByEmployee => "Select the employee again to retry.".to_string(),
                });
            }
            ViewError::WriteFailure { transaction_id, .. } => {
                details = details.with_detail(serde_json::json!({ "transaction_id": transaction_id }));
                details = details.with_suggestion(
                    "The previous approval state was restored; toggle it again to retry.".to_string()
                );
            }
            ViewError::InconsistentFilterState { .. } => {}
        }

        details
    }
}

/// Result type with ViewError
pub type ViewResult<T> = Result<T, ViewError>;

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Operation being performed
    pub operation: String,
    /// Additional context data
    pub data: serde_json::Value,
}

impl ErrorContext {
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            data: serde_json::json!({}),
        }
    }

    pub fn with_data(mut self, key: &str, value: serde_json::Value) -> Self {
        self.data[key] = value;
        self
    }
}

/// Error logger trait
pub trait ErrorLogger: Send + Sync {
    fn log_error(&self, error: &ViewError, context: &ErrorContext);
    fn log_warning(&self, message: &str, context: &ErrorContext);
    fn log_debug(&self, message: &str, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Debug, Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &ViewError, context: &ErrorContext) {
        match error.severity() {
            ErrorSeverity::Error => log::error!(
                target: "spendview::error",
                "ERROR [{}] {} - Operation: {} - Data: {}",
                error.code(),
                error,
                context.operation,
                context.data
            ),
            _ => log::warn!(
                target: "spendview::error",
                "WARNING [{}] {} - Operation: {} - Data: {}",
                error.code(),
                error,
                context.operation,
                context.data
            ),
        }
    }

    fn log_warning(&self, message: &str, context: &ErrorContext) {
        log::warn!(
            target: "spendview::error",
            "WARNING: {} - Operation: {}",
            message,
            context.operation
        );
    }

    fn log_debug(&self, message: &str, context: &ErrorContext) {
        log::debug!(
            target: "spendview::error",
            "DEBUG: {} - Operation: {}",
            message,
            context.operation
        );
    }
}

// ==================== Tests ====================
