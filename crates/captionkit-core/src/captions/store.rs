//! Caption Store
//!
//! Owns the caption entries of one editing session.
//!
//! Entries are kept in a map keyed by id. Display and export order is never
//! stored: `list()` derives it by sorting on start time, with ties broken by
//! insertion order.

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::debug;

use super::{Caption, CaptionField, FieldValue};
use crate::{is_valid_time_sec, CaptionId, CoreError, CoreResult, TimeSec};

/// Duration given to a newly added caption
pub const DEFAULT_CAPTION_DURATION_SEC: TimeSec = 3.0;

/// Caption record plus the insertion sequence used as the sort tie-break
#[derive(Clone, Debug)]
struct StoredCaption {
    caption: Caption,
    seq: u64,
}

/// In-memory caption timeline
#[derive(Clone, Debug, Default)]
pub struct CaptionStore {
    captions: HashMap<CaptionId, StoredCaption>,
    next_seq: u64,
}

impl CaptionStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a store from previously listed captions.
    ///
    /// The iteration order becomes the insertion order. Every entry is
    /// validated; nothing is repaired.
    pub fn from_captions(captions: impl IntoIterator<Item = Caption>) -> CoreResult<Self> {
        let mut store = Self::new();
        for caption in captions {
            validate_range(caption.start_time, caption.end_time)?;
            if store.captions.contains_key(&caption.id) {
                return Err(CoreError::DuplicateId(caption.id));
            }
            store.insert(caption);
        }
        Ok(store)
    }

    fn insert(&mut self, caption: Caption) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.captions
            .insert(caption.id.clone(), StoredCaption { caption, seq });
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds an empty caption starting at `at` with the default duration
    pub fn add(&mut self, at: TimeSec) -> CoreResult<Caption> {
        if !is_valid_time_sec(at) {
            return Err(CoreError::invalid_value(CaptionField::StartTime, at));
        }

        // `+ 0.0` turns a negative zero into zero.
        let start = at + 0.0;
        let caption = Caption::create(start, start + DEFAULT_CAPTION_DURATION_SEC, "");
        debug!(caption_id = %caption.id, start_time = start, "Adding caption");

        self.insert(caption.clone());
        Ok(caption)
    }

    /// Appends parsed captions under fresh ids.
    ///
    /// All entries are validated before any is inserted.
    pub fn extend_from(
        &mut self,
        captions: impl IntoIterator<Item = Caption>,
    ) -> CoreResult<Vec<CaptionId>> {
        let captions: Vec<Caption> = captions.into_iter().collect();
        for caption in &captions {
            validate_range(caption.start_time, caption.end_time)?;
        }

        let ids = captions
            .into_iter()
            .map(|caption| {
                let fresh = Caption::create(caption.start_time, caption.end_time, &caption.text);
                let id = fresh.id.clone();
                self.insert(fresh);
                id
            })
            .collect::<Vec<_>>();

        debug!(count = ids.len(), "Imported captions");
        Ok(ids)
    }

    /// Sets one field of the caption with the given id.
    ///
    /// Time fields coerce the value to seconds and reject anything that is not
    /// a finite, non-negative number, or that would put the end before the
    /// start. A rejected update leaves the caption untouched.
    pub fn update(
        &mut self,
        id: &str,
        field: CaptionField,
        value: impl Into<FieldValue>,
    ) -> CoreResult<()> {
        let value = value.into();
        debug!(caption_id = %id, field = %field, "Updating caption");

        let caption = &mut self
            .captions
            .get_mut(id)
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?
            .caption;

        match field {
            CaptionField::Text => {
                caption.text = value.into_text();
            }
            CaptionField::StartTime | CaptionField::EndTime => {
                let seconds = value
                    .as_number()
                    .filter(|v| is_valid_time_sec(*v))
                    .ok_or_else(|| CoreError::invalid_value(field, &value))?;

                let (start, end) = if field == CaptionField::StartTime {
                    (seconds, caption.end_time)
                } else {
                    (caption.start_time, seconds)
                };
                validate_range(start, end)?;

                caption.start_time = start;
                caption.end_time = end;
            }
        }

        Ok(())
    }

    /// Sets the caption text
    pub fn set_text(&mut self, id: &str, text: impl Into<String>) -> CoreResult<()> {
        self.update(id, CaptionField::Text, FieldValue::Text(text.into()))
    }

    /// Sets the start time, e.g. to the current playback time
    pub fn set_start_time(&mut self, id: &str, seconds: TimeSec) -> CoreResult<()> {
        self.update(id, CaptionField::StartTime, seconds)
    }

    /// Sets the end time, e.g. to the current playback time
    pub fn set_end_time(&mut self, id: &str, seconds: TimeSec) -> CoreResult<()> {
        self.update(id, CaptionField::EndTime, seconds)
    }

    /// Sets both times at once, so a caption can move past its current end
    pub fn update_time_range(&mut self, id: &str, start: TimeSec, end: TimeSec) -> CoreResult<()> {
        debug!(caption_id = %id, start_time = start, end_time = end, "Retiming caption");

        let caption = &mut self
            .captions
            .get_mut(id)
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?
            .caption;

        validate_range(start, end)?;
        caption.start_time = start;
        caption.end_time = end;
        Ok(())
    }

    /// Removes a caption by ID. Absent ids are ignored.
    pub fn delete(&mut self, id: &str) -> Option<Caption> {
        let removed = self.captions.remove(id).map(|stored| stored.caption);
        if removed.is_some() {
            debug!(caption_id = %id, "Deleted caption");
        }
        removed
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Returns the text of the caption showing at `time`, or "" if none.
    ///
    /// When captions overlap, the earliest-starting one wins.
    pub fn active_at(&self, time: TimeSec) -> &str {
        self.active_caption_at(time)
            .map(|c| c.text.as_str())
            .unwrap_or("")
    }

    /// Returns the caption showing at `time`
    pub fn active_caption_at(&self, time: TimeSec) -> Option<&Caption> {
        self.sorted()
            .into_iter()
            .find(|c| c.is_active_at(time))
    }

    /// Returns all captions sorted by start time (stable on ties)
    pub fn list(&self) -> Vec<Caption> {
        self.sorted().into_iter().cloned().collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.captions.contains_key(id)
    }

    /// Returns the number of captions
    pub fn len(&self) -> usize {
        self.captions.len()
    }

    /// Returns true if the store has no captions
    pub fn is_empty(&self) -> bool {
        self.captions.is_empty()
    }

    fn sorted(&self) -> Vec<&Caption> {
        let mut stored: Vec<&StoredCaption> = self.captions.values().collect();
        stored.sort_by(|a, b| {
            a.caption
                .start_time
                .partial_cmp(&b.caption.start_time)
                .unwrap_or(Ordering::Equal)
                .then(a.seq.cmp(&b.seq))
        });
        stored.into_iter().map(|s| &s.caption).collect()
    }
}

fn validate_range(start: TimeSec, end: TimeSec) -> CoreResult<()> {
    if !is_valid_time_sec(start) {
        return Err(CoreError::invalid_value(CaptionField::StartTime, start));
    }
    if !is_valid_time_sec(end) {
        return Err(CoreError::invalid_value(CaptionField::EndTime, end));
    }
    if end < start {
        return Err(CoreError::InvalidTimeRange(start, end));
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
