//! Caption Data Models
//!
//! Defines the caption entry and the field-level update values accepted by the store.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{new_caption_id, CaptionId, TimeSec};

// =============================================================================
// Caption Entry
// =============================================================================

/// A single caption entry with text and timing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Caption {
    /// Unique identifier
    pub id: CaptionId,
    /// Start time in seconds
    pub start_time: TimeSec,
    /// End time in seconds
    pub end_time: TimeSec,
    /// Caption text (may be empty, may contain line breaks)
    pub text: String,
}

impl Caption {
    /// Creates a new caption with the given text and timing
    pub fn new(id: &str, start_time: TimeSec, end_time: TimeSec, text: &str) -> Self {
        Self {
            id: id.to_string(),
            start_time,
            end_time,
            text: text.to_string(),
        }
    }

    /// Creates a caption with auto-generated ID
    pub fn create(start_time: TimeSec, end_time: TimeSec, text: &str) -> Self {
        Self::new(&new_caption_id(), start_time, end_time, text)
    }

    /// Returns the duration of this caption in seconds
    pub fn duration(&self) -> TimeSec {
        self.end_time - self.start_time
    }

    /// Returns true if the caption covers the given time (both ends inclusive)
    pub fn is_active_at(&self, time: TimeSec) -> bool {
        self.start_time <= time && time <= self.end_time
    }

    /// Returns true if this caption overlaps with another
    pub fn overlaps(&self, other: &Caption) -> bool {
        self.start_time < other.end_time && self.end_time > other.start_time
    }
}

// =============================================================================
// Field Updates
// =============================================================================

/// Caption field addressed by a field-level update
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CaptionField {
    StartTime,
    EndTime,
    Text,
}

impl CaptionField {
    /// Returns true for the time fields
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::StartTime | Self::EndTime)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::StartTime => "startTime",
            Self::EndTime => "endTime",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for CaptionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaptionField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "start" | "starttime" => Ok(Self::StartTime),
            "end" | "endtime" => Ok(Self::EndTime),
            "text" => Ok(Self::Text),
            other => Err(format!(
                "unknown caption field '{}' (expected start, end or text)",
                other
            )),
        }
    }
}

/// Value supplied to a field-level update.
///
/// Time fields coerce `Text` into a number; the text field stores `Number`
/// by its decimal rendering.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Coerces the value to seconds, or `None` if it is not a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed.parse::<f64>().ok()
            }
        }
    }

    /// Renders the value as caption text
    pub fn into_text(self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

// =============================================================================
// Tests
// =============================================================================
