//! Core Type Definitions
//!
//! Defines fundamental types shared by the caption model and the format codecs.

// =============================================================================
// ID Types
// =============================================================================

/// Caption unique identifier (ULID)
pub type CaptionId = String;

// =============================================================================
// Time Types
// =============================================================================

/// Time in seconds (floating point)
pub type TimeSec = f64;

/// Returns true if the value can be stored as a caption time.
pub fn is_valid_time_sec(value: TimeSec) -> bool {
    value.is_finite() && value >= 0.0
}

/// Generates a fresh caption identifier
pub fn new_caption_id() -> CaptionId {
    ulid::Ulid::new().to_string()
}
