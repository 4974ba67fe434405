use thiserror::Error;

/// Failures raised by the plan engine. All of them are recoverable by
/// correcting the input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),
    #[error("Invalid distribution: {0}")]
    InvalidDistribution(String),
    #[error("Invalid policy config: {0}")]
    InvalidPolicyConfig(String),
    #[error("Start date and end date are required")]
    MissingDateRange,
    #[error("End date {end} is before start date {start}")]
    InvertedDateRange { start: String, end: String },
    #[error("Target time must not be negative (got {0})")]
    NegativeTarget(i64),
    #[error("No daily plan generated. Run an allocation policy first.")]
    PlanNotGenerated,
    #[error("Final cumulative work must be exactly 100 (got {0})")]
    WorkSumMismatch(f64),
    #[error("Daily time must add up to the target time {target} (got {actual})")]
    TimeSumMismatch { target: i64, actual: f64 },
    #[error("Invalid edit: {0}")]
    InvalidEdit(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NotInitialized,
    TaskNotFound,
    RecordNotFound,
    AmbiguousRef,
    PermissionDenied,
    InvalidDateRange,
    InvalidDistribution,
    InvalidPolicyConfig,
    MissingDateRange,
    InvertedDateRange,
    NegativeTarget,
    PlanNotGenerated,
    WorkSumMismatch,
    TimeSumMismatch,
    InvalidEdit,
    ValidationError,
    DatabaseError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::TaskNotFound => "TASK_NOT_FOUND",
            Self::RecordNotFound => "RECORD_NOT_FOUND",
            Self::AmbiguousRef => "AMBIGUOUS_REF",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::InvalidDateRange => "INVALID_DATE_RANGE",
            Self::InvalidDistribution => "INVALID_DISTRIBUTION",
            Self::InvalidPolicyConfig => "INVALID_POLICY_CONFIG",
            Self::MissingDateRange => "MISSING_DATE_RANGE",
            Self::InvertedDateRange => "INVERTED_DATE_RANGE",
            Self::NegativeTarget => "NEGATIVE_TARGET",
            Self::PlanNotGenerated => "PLAN_NOT_GENERATED",
            Self::WorkSumMismatch => "WORK_SUM_MISMATCH",
            Self::TimeSumMismatch => "TIME_SUM_MISMATCH",
            Self::InvalidEdit => "INVALID_EDIT",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::DatabaseError => "DATABASE_ERROR",
        }
    }
}

#[derive(Debug, Error)]
#[error("{message}")]
pub struct ClimblyError {
    pub code: ErrorCode,
    pub message: String,
}

impl ClimblyError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn not_initialized() -> Self {
        Self::new(
            ErrorCode::NotInitialized,
            "climbly is not initialized. Run `climbly init` first.",
        )
    }

    pub fn task_not_found(reference: &str) -> Self {
        Self::new(
            ErrorCode::TaskNotFound,
            format!("Task not found: {reference}"),
        )
    }

    pub fn record_not_found(reference: &str) -> Self {
        Self::new(
            ErrorCode::RecordNotFound,
            format!("Record not found: {reference}"),
        )
    }

    pub fn ambiguous_ref(reference: &str, candidates: &[String]) -> Self {
        Self::new(
            ErrorCode::AmbiguousRef,
            format!(
                "Ambiguous reference '{}'. Candidates: {}",
                reference,
                candidates.join(", ")
            ),
        )
    }

    pub fn permission_denied(user: &str, action: &str) -> Self {
        Self::new(
            ErrorCode::PermissionDenied,
            format!("User '{user}' is not allowed to {action} this task"),
        )
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }
}

impl From<PlanError> for ClimblyError {
    fn from(e: PlanError) -> Self {
        let code = match e {
            PlanError::InvalidDateRange(_) => ErrorCode::InvalidDateRange,
            PlanError::InvalidDistribution(_) => ErrorCode::InvalidDistribution,
            PlanError::InvalidPolicyConfig(_) => ErrorCode::InvalidPolicyConfig,
            PlanError::MissingDateRange => ErrorCode::MissingDateRange,
            PlanError::InvertedDateRange { .. } => ErrorCode::InvertedDateRange,
            PlanError::NegativeTarget(_) => ErrorCode::NegativeTarget,
            PlanError::PlanNotGenerated => ErrorCode::PlanNotGenerated,
            PlanError::WorkSumMismatch(_) => ErrorCode::WorkSumMismatch,
            PlanError::TimeSumMismatch { .. } => ErrorCode::TimeSumMismatch,
            PlanError::InvalidEdit(_) => ErrorCode::InvalidEdit,
        };
        Self::new(code, e.to_string())
    }
}

impl From<rusqlite::Error> for ClimblyError {
    fn from(e: rusqlite::Error) -> Self {
        Self::database(e.to_string())
    }
}
