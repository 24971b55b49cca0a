//! captionkit Core Library
//!
//! Caption timeline model and WebVTT serialization.
//! This library holds the caption store and the timestamp/cue codecs; playback,
//! persistence and file output belong to the caller.

pub mod captions;

mod types;
pub use types::*;

mod error;
pub use error::*;

#[cfg(test)]
mod tests_destructive;
