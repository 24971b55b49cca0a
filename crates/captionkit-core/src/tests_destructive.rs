//! Destructive and Edge Case Tests for the Caption Timeline
//!
//! These tests feed the store and the codecs hostile input and check that
//! nothing is silently stored, zeroed or reordered.

use crate::captions::{
    export_vtt, format_timestamp, parse_timestamp, parse_vtt, Caption, CaptionField,
    CaptionStore, ParseError,
};
use crate::CoreError;

#[test]
fn test_destructive_parse_failure_is_not_zero() {
    // A silent fallback would make this Ok(0.0).
    assert_eq!(
        parse_timestamp("abc"),
        Err(ParseError::InvalidTimestamp("abc".to_string()))
    );
    assert!(parse_timestamp("NaN:00.000").is_err());
    assert!(parse_timestamp("00:00.000\n00:01.000").is_err());
}

#[test]
fn test_destructive_non_finite_updates_rejected() {
    let mut store = CaptionStore::new();
    let id = store.add(1.0).unwrap().id;

    for value in ["NaN", "inf", "-inf", "-0.5", "1e400", "   "] {
        let err = store.update(&id, CaptionField::EndTime, value).unwrap_err();
        assert!(matches!(err, CoreError::InvalidValue { .. }), "{value}");
    }

    let caption = &store.list()[0];
    assert_eq!(caption.start_time, 1.0);
    assert_eq!(caption.end_time, 4.0);
}

#[test]
fn test_destructive_failed_update_reports_field_and_value() {
    let mut store = CaptionStore::new();
    let id = store.add(0.0).unwrap().id;

    match store.update(&id, CaptionField::StartTime, "12;30") {
        Err(CoreError::InvalidValue { field, value }) => {
            assert_eq!(field, "startTime");
            assert_eq!(value, "12;30");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_destructive_text_accepts_anything() {
    let mut store = CaptionStore::new();
    let id = store.add(0.0).unwrap().id;

    store.set_text(&id, "").unwrap();
    store.set_text(&id, "-->\n\u{0}\u{FEFF} ünïcødé").unwrap();
    store.update(&id, CaptionField::Text, 42.0).unwrap();

    assert_eq!(store.active_at(1.0), "42");
}

#[test]
fn test_destructive_negative_zero_start() {
    let mut store = CaptionStore::new();
    let caption = store.add(-0.0).unwrap();

    assert!(caption.start_time.is_sign_positive());
    assert_eq!(format_timestamp(caption.start_time), "00:00.000");
}

#[test]
fn test_destructive_many_ties_stay_stable() {
    let mut store = CaptionStore::new();
    let ids: Vec<_> = (0..50).map(|_| store.add(7.0).unwrap().id).collect();

    let listed: Vec<_> = store.list().into_iter().map(|c| c.id).collect();
    assert_eq!(listed, ids);
    assert_eq!(store.active_caption_at(8.0).map(|c| &c.id), Some(&ids[0]));
}

#[test]
fn test_destructive_restore_rejects_bad_entries() {
    let bad = [
        Caption::new("a", f64::NAN, 1.0, ""),
        Caption::new("b", 1.0, f64::INFINITY, ""),
        Caption::new("c", -1.0, 1.0, ""),
    ];

    for caption in bad {
        assert!(CaptionStore::from_captions(vec![caption]).is_err());
    }
}

#[test]
fn test_destructive_import_bad_vtt_leaves_store_untouched() {
    let mut store = CaptionStore::new();
    store.add(0.0).unwrap();

    let result = parse_vtt("WEBVTT\n\n1\n00:05.000 --> 00:99.000\nX\n");
    assert!(result.is_err());
    assert_eq!(store.len(), 1);

    // Parsed but inverted: import is refused as a whole.
    let inverted = parse_vtt("WEBVTT\n\n00:09.000 --> 00:01.000\nX\n").unwrap();
    assert!(store.extend_from(inverted).is_err());
    assert_eq!(store.len(), 1);
}

#[test]
fn test_destructive_huge_times_export() {
    let captions = vec![Caption::new("a", 360_000.0, 360_003.0, "late")];
    let vtt = export_vtt(&captions);

    assert!(vtt.contains("6000:00.000 --> 6000:03.000"));
    assert_eq!(parse_vtt(&vtt).unwrap()[0].start_time, 360_000.0);
}
