//! Settings validation errors and semantic validation.

use thiserror::Error;

use crate::settings::AnalyzeSettings;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Deepest prefix level accepted.
pub const MAX_PREFIX_DEPTH: usize = 64;

/// Largest top-N accepted.
pub const MAX_TOP_N: usize = 100_000;

/// Settings validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::InvalidValue { .. } => 11,
        }
    }

    /// Field the error refers to, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::InvalidValue { field, .. } => Some(field),
        }
    }
}

/// Validate settings semantically.
pub fn validate_settings(settings: &AnalyzeSettings) -> ValidationResult<()> {
    let separator = &settings.prefix.separator;
    if separator.contains('\n') || separator.contains('\r') {
        return Err(ValidationError::InvalidValue {
            field: "prefix.separator".to_string(),
            message: "must not contain line breaks".to_string(),
        });
    }

    if settings.prefix.max_depth > MAX_PREFIX_DEPTH {
        return Err(ValidationError::InvalidValue {
            field: "prefix.max_depth".to_string(),
            message: format!(
                "must be at most {}, got {}",
                MAX_PREFIX_DEPTH, settings.prefix.max_depth
            ),
        });
    }

    if settings.top_n > MAX_TOP_N {
        return Err(ValidationError::InvalidValue {
            field: "top_n".to_string(),
            message: format!("must be at most {}, got {}", MAX_TOP_N, settings.top_n),
        });
    }

    Ok(())
}

/// Non-fatal observations about settings that are valid but probably unintended.
pub fn lint_settings(settings: &AnalyzeSettings) -> Vec<String> {
    let mut warnings = Vec::new();

    if settings.prefix.separator.is_empty() && settings.prefix.max_depth > 0 {
        warnings.push("prefix.separator is empty; namespace aggregation is disabled".to_string());
    }
    if !settings.prefix.separator.is_empty() && settings.prefix.max_depth == 0 {
        warnings.push("prefix.max_depth is 0; namespace aggregation is disabled".to_string());
    }
    if settings.top_n == 0 {
        warnings.push(
            "top_n is 0; big keys are not tracked and prefix lists are not truncated".to_string(),
        );
    }
    if settings.progress_interval_ms > 0 && settings.progress_interval_ms < 100 {
        warnings.push(format!(
            "progress_interval_ms is {}; progress output will be very chatty",
            settings.progress_interval_ms
        ));
    }

    warnings
}
