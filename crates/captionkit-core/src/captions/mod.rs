//! Caption System Module
//!
//! Provides the caption timeline for captionkit:
//! - Caption data model (Caption, CaptionField, FieldValue)
//! - The caption store with create/update/delete and active-caption queries
//! - WebVTT timestamp formatting/parsing, export and import
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Caption System                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  models.rs     - Data structures (Caption, field updates)       │
//! │  store.rs      - CaptionStore (ownership, ordering, queries)    │
//! │  formats.rs    - VTT timestamps, export and parsing             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example Usage
//!
//! ```rust
//! use captionkit_core::captions::{export_vtt, CaptionStore};
//!
//! let mut store = CaptionStore::new();
//! let id = store.add(2.5).unwrap().id;
//! store.set_text(&id, "Hello World").unwrap();
//!
//! assert_eq!(store.active_at(3.0), "Hello World");
//! let vtt = export_vtt(&store.list());
//! assert!(vtt.starts_with("WEBVTT\n\n1\n00:02.500 --> 00:05.500\n"));
//! ```

mod formats;
mod models;
mod store;

// Re-export models
pub use models::{Caption, CaptionField, FieldValue};

// Re-export the store
pub use store::{CaptionStore, DEFAULT_CAPTION_DURATION_SEC};

// Re-export format functions
pub use formats::{export_vtt, format_timestamp, parse_timestamp, parse_vtt, ParseError};
