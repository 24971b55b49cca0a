//! captionkit Error Definitions
//!
//! Defines error types returned by the caption store and the format codecs.

use thiserror::Error;

use crate::captions::ParseError;
use crate::{CaptionId, TimeSec};

/// Core error types
#[derive(Error, Debug)]
pub enum CoreError {
    // =========================================================================
    // Caption Errors
    // =========================================================================
    #[error("Caption not found: {0}")]
    NotFound(CaptionId),

    #[error("Invalid value for {field}: {value:?}")]
    InvalidValue { field: String, value: String },

    #[error("Invalid time range: {0}~{1} seconds")]
    InvalidTimeRange(TimeSec, TimeSec),

    #[error("Duplicate caption id: {0}")]
    DuplicateId(CaptionId),

    // =========================================================================
    // Format Errors
    // =========================================================================
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    // =========================================================================
    // General Errors
    // =========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Core result type
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub(crate) fn invalid_value(field: impl ToString, value: impl ToString) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}
