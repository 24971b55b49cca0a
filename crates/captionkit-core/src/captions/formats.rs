//! Caption Format Parsers and Exporters
//!
//! WebVTT support for the caption timeline:
//! - `MM:SS.mmm` timestamp formatting and parsing
//! - Cue export (`export_vtt`) and import (`parse_vtt`)
//!
//! # Example
//!
//! ```rust
//! use captionkit_core::captions::{format_timestamp, parse_timestamp};
//!
//! assert_eq!(format_timestamp(125.4817), "02:05.481");
//! assert_eq!(parse_timestamp("01:05.500").unwrap(), 65.5);
//! assert!(parse_timestamp("abc").is_err());
//! ```

use thiserror::Error;

use super::Caption;
use crate::{is_valid_time_sec, TimeSec};

/// WebVTT file signature
const VTT_HEADER: &str = "WEBVTT";

/// Cue timing separator
const TIMING_ARROW: &str = "-->";

/// Relative bias (in units of f64 epsilon) applied before truncating to
/// milliseconds. It covers only the representation error of the value itself,
/// so `02:05.481` parsed and formatted again stays `02:05.481`.
const MS_BIAS_ULPS: f64 = 8.0;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during caption parsing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Invalid timestamp format
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
    /// Invalid caption format
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
    /// Missing required data
    #[error("Missing data: {0}")]
    MissingData(String),
    /// Unexpected end of input
    #[error("Unexpected end of input")]
    UnexpectedEnd,
}

// =============================================================================
// Timestamps
// =============================================================================

/// Formats seconds as `MM:SS.mmm`.
///
/// Minutes are not wrapped into hours and may exceed 59. Milliseconds are
/// truncated, not rounded; only values within a few ulps below a millisecond
/// boundary count as that boundary. Negative or non-finite input formats as zero.
pub fn format_timestamp(seconds: TimeSec) -> String {
    let total_ms = if is_valid_time_sec(seconds) {
        let scaled = seconds * 1000.0;
        let bias = scaled.max(1.0) * MS_BIAS_ULPS * f64::EPSILON;
        (scaled + bias).floor() as u64
    } else {
        0
    };
    let ms = total_ms % 1000;
    let total_secs = total_ms / 1000;
    let secs = total_secs % 60;
    let mins = total_secs / 60;

    format!("{:02}:{:02}.{:03}", mins, secs, ms)
}

/// Parses a `MM:SS.mmm` timestamp into seconds.
///
/// Minutes take any number of digits; seconds must be two digits below 60 and
/// milliseconds exactly three digits. Surrounding whitespace is ignored.
pub fn parse_timestamp(ts: &str) -> Result<TimeSec, ParseError> {
    let invalid = || ParseError::InvalidTimestamp(ts.to_string());

    let (minutes, rest) = ts.trim().split_once(':').ok_or_else(invalid)?;
    let (seconds, millis) = rest.split_once('.').ok_or_else(invalid)?;

    if !is_digits(minutes, None) || !is_digits(seconds, Some(2)) || !is_digits(millis, Some(3)) {
        return Err(invalid());
    }

    let minutes: u64 = minutes.parse().map_err(|_| invalid())?;
    let seconds: u64 = seconds.parse().map_err(|_| invalid())?;
    let millis: u64 = millis.parse().map_err(|_| invalid())?;

    if seconds >= 60 {
        return Err(invalid());
    }

    Ok(minutes as f64 * 60.0 + seconds as f64 + millis as f64 / 1000.0)
}

/// Parses a cue timestamp, accepting the `HH:MM:SS.mmm` form as well
fn parse_cue_timestamp(ts: &str) -> Result<TimeSec, ParseError> {
    let invalid = || ParseError::InvalidTimestamp(ts.to_string());

    match ts.matches(':').count() {
        1 => parse_timestamp(ts),
        2 => {
            let (hours, rest) = ts.split_once(':').ok_or_else(invalid)?;
            if !is_digits(hours, None) {
                return Err(invalid());
            }
            // Minutes below an hour field must be two digits under 60.
            let (minutes, _) = rest.split_once(':').ok_or_else(invalid)?;
            if !is_digits(minutes, Some(2)) || minutes >= "60" {
                return Err(invalid());
            }
            let hours: u64 = hours.parse().map_err(|_| invalid())?;
            let rest = parse_timestamp(rest).map_err(|_| invalid())?;
            Ok(hours as f64 * 3600.0 + rest)
        }
        _ => Err(invalid()),
    }
}

fn is_digits(s: &str, len: Option<usize>) -> bool {
    !s.is_empty() && len.is_none_or(|n| s.len() == n) && s.bytes().all(|b| b.is_ascii_digit())
}

// =============================================================================
// VTT Format
// =============================================================================

/// Exports captions to WebVTT format.
///
/// Cues are numbered from 1 in the given order; callers pass captions already
/// sorted by start time (`CaptionStore::list`).
///
/// ```text
/// WEBVTT
///
/// 1
/// 00:02.481 --> 00:05.481
/// [A sunny day in the afternoon]
///
/// ```
pub fn export_vtt(captions: &[Caption]) -> String {
    let mut output = format!("{}\n\n", VTT_HEADER);

    for (index, caption) in captions.iter().enumerate() {
        // Cue identifier
        output.push_str(&format!("{}\n", index + 1));

        // Timestamps
        let start = format_timestamp(caption.start_time);
        let end = format_timestamp(caption.end_time);
        output.push_str(&format!("{} {} {}\n", start, TIMING_ARROW, end));

        // Text
        output.push_str(&caption.text);
        output.push_str("\n\n");
    }

    output
}

/// Parses WebVTT content into a list of captions.
///
/// Reads what `export_vtt` writes, plus common WebVTT input: cues without
/// identifiers, `HH:MM:SS.mmm` timings, cue settings after the end time,
/// `NOTE`/`STYLE`/`REGION` blocks and CRLF line endings. Text is kept
/// verbatim; parsed captions get fresh ids.
pub fn parse_vtt(content: &str) -> Result<Vec<Caption>, ParseError> {
    let content = content.strip_prefix('\u{FEFF}').unwrap_or(content);
    let mut captions = Vec::new();
    let mut lines = content.lines().peekable();

    let header = lines
        .next()
        .ok_or_else(|| ParseError::MissingData("WEBVTT header".to_string()))?;
    if !is_vtt_header(header) {
        return Err(ParseError::InvalidFormat(
            "VTT file must start with WEBVTT".to_string(),
        ));
    }

    // Skip any header metadata (lines before first blank line after WEBVTT)
    while lines.next_if(|l| !l.is_empty()).is_some() {}

    loop {
        // Skip empty lines
        while lines.next_if(|l| l.is_empty()).is_some() {}

        let Some(first_line) = lines.next() else {
            break;
        };

        if is_non_cue_block(first_line) {
            while lines.next_if(|l| !l.is_empty()).is_some() {}
            continue;
        }

        let timing_line = if first_line.contains(TIMING_ARROW) {
            first_line
        } else {
            // This was a cue identifier, next line should be the timing
            lines.next().ok_or(ParseError::UnexpectedEnd)?
        };
        let (start_time, end_time) = parse_timing_line(timing_line)?;

        // Text (may be multiple lines, may be empty)
        let mut text_lines = Vec::new();
        while let Some(line) = lines.next_if(|l| !l.is_empty()) {
            text_lines.push(line);
        }

        captions.push(Caption::create(start_time, end_time, &text_lines.join("\n")));
    }

    Ok(captions)
}

fn is_vtt_header(line: &str) -> bool {
    match line.strip_prefix(VTT_HEADER) {
        Some(rest) => rest.is_empty() || rest.starts_with([' ', '\t']),
        None => false,
    }
}

fn is_non_cue_block(line: &str) -> bool {
    !line.contains(TIMING_ARROW)
        && ["NOTE", "STYLE", "REGION"].iter().any(|kw| {
            line.strip_prefix(*kw)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with([' ', '\t']))
        })
}

/// Parses a timing line (e.g., "00:01.000 --> 00:04.000 align:start")
fn parse_timing_line(line: &str) -> Result<(TimeSec, TimeSec), ParseError> {
    let (start_part, end_part) = line.split_once(TIMING_ARROW).ok_or_else(|| {
        ParseError::InvalidFormat(format!("Expected 'start --> end' format: {}", line))
    })?;

    // Cue settings may follow the end timestamp
    let end_str = end_part
        .split_whitespace()
        .next()
        .ok_or_else(|| ParseError::InvalidTimestamp(end_part.to_string()))?;

    let start = parse_cue_timestamp(start_part.trim())?;
    let end = parse_cue_timestamp(end_str)?;

    Ok((start, end))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::captions::CaptionStore;

    // -------------------------------------------------------------------------
    // Timestamp Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "00:00.000");
        assert_eq!(format_timestamp(65.5), "01:05.500");
        assert_eq!(format_timestamp(125.4817), "02:05.481");
        assert_eq!(format_timestamp(59.9999), "00:59.999");
    }

    #[test]
    fn test_format_timestamp_minutes_are_unbounded() {
        assert_eq!(format_timestamp(3600.0), "60:00.000");
        assert_eq!(format_timestamp(6000.25), "100:00.250");
    }

    #[test]
    fn test_format_timestamp_invalid_input_is_zero() {
        assert_eq!(format_timestamp(-5.0), "00:00.000");
        assert_eq!(format_timestamp(f64::NAN), "00:00.000");
    }

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("00:00.000").unwrap(), 0.0);
        assert_eq!(parse_timestamp("01:05.500").unwrap(), 65.5);
        assert_eq!(parse_timestamp(" 02:30.000 ").unwrap(), 150.0);
        assert_eq!(parse_timestamp("100:00.250").unwrap(), 6000.25);
    }

    #[test]
    fn test_parse_timestamp_rejects_malformed() {
        for input in [
            "abc",
            "",
            "01:05",
            "01.05.500",
            "01:05:00.500",
            "aa:05.500",
            "01:5.500",
            "01:05.50",
            "01:60.000",
            "-1:05.500",
            "01:05.5x0",
        ] {
            let err = parse_timestamp(input).unwrap_err();
            assert_eq!(err, ParseError::InvalidTimestamp(input.to_string()), "{input}");
        }
    }

    #[test]
    fn test_timestamp_roundtrip_within_one_ms() {
        for t in [0.0, 0.001, 0.29, 2.481795, 13.726788, 59.9995, 61.0, 3599.999, 7322.5] {
            let parsed = parse_timestamp(&format_timestamp(t)).unwrap();
            assert!(t - parsed >= -1e-9 && t - parsed < 0.001, "{t} -> {parsed}");
        }
    }

    #[test]
    fn test_timestamp_text_is_stable() {
        for ts in ["00:00.290", "00:02.481", "02:05.481", "17:17.017", "99:59.999"] {
            assert_eq!(format_timestamp(parse_timestamp(ts).unwrap()), ts);
        }
    }

    #[test]
    fn test_parse_cue_timestamp_hour_form() {
        assert_eq!(parse_cue_timestamp("01:00:01.500").unwrap(), 3601.5);
        assert_eq!(parse_cue_timestamp("00:01.500").unwrap(), 1.5);
        assert!(parse_cue_timestamp("1:2:3:4.000").is_err());
    }

    #[test]
    fn test_parse_cue_timestamp_hour_form_limits_minutes() {
        assert_eq!(parse_cue_timestamp("01:59:00.000").unwrap(), 7140.0);
        assert!(parse_cue_timestamp("01:75:00.000").is_err());
        assert!(parse_cue_timestamp("01:60:00.000").is_err());
        assert!(parse_cue_timestamp("01:5:00.000").is_err());
        assert!(parse_cue_timestamp("01:100:00.000").is_err());
    }

    #[test]
    fn test_format_timestamp_truncates_just_below_boundary() {
        assert_eq!(format_timestamp(0.0009999995), "00:00.000");
        assert_eq!(format_timestamp(1.9999995), "00:01.999");
        assert_eq!(format_timestamp(59.9999999), "00:59.999");
        // Sums that land a rounding step under the boundary still format as it.
        assert_eq!(format_timestamp(2.48 + 3.0), "00:05.480");
    }

    // -------------------------------------------------------------------------
    // Export Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_export_vtt_empty() {
        assert_eq!(export_vtt(&[]), "WEBVTT\n\n");
    }

    #[test]
    fn test_export_vtt_layout() {
        let captions = vec![
            Caption::new("1", 2.481795, 5.481795, "[A sunny day in the afternoon]"),
            Caption::new(
                "2",
                13.726788,
                16.726788,
                "[A water spring flowing through the grass]",
            ),
        ];

        let expected = "WEBVTT\n\
                        \n\
                        1\n\
                        00:02.481 --> 00:05.481\n\
                        [A sunny day in the afternoon]\n\
                        \n\
                        2\n\
                        00:13.726 --> 00:16.726\n\
                        [A water spring flowing through the grass]\n\
                        \n";
        assert_eq!(export_vtt(&captions), expected);
    }

    #[test]
    fn test_export_vtt_multiline_text_verbatim() {
        let captions = vec![Caption::new("1", 0.0, 1.0, "Line one\nLine two")];
        assert_eq!(
            export_vtt(&captions),
            "WEBVTT\n\n1\n00:00.000 --> 00:01.000\nLine one\nLine two\n\n"
        );
    }

    #[test]
    fn test_export_store_end_to_end() {
        let mut store = CaptionStore::new();
        for (start, text) in [(17.30, "C"), (2.48, "A"), (13.73, "B")] {
            let id = store.add(start).unwrap().id;
            store.set_text(&id, text).unwrap();
        }

        let vtt = export_vtt(&store.list());
        assert_eq!(
            vtt,
            "WEBVTT\n\n\
             1\n00:02.480 --> 00:05.480\nA\n\n\
             2\n00:13.730 --> 00:16.730\nB\n\n\
             3\n00:17.300 --> 00:20.300\nC\n\n"
        );
    }

    // -------------------------------------------------------------------------
    // Parsing Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_parse_vtt_is_left_inverse_of_export() {
        let original = vec![
            Caption::new("a", 1.0, 4.0, "First caption"),
            Caption::new("b", 5.5, 8.25, "Second\nMultiline"),
            Caption::new("c", 3725.125, 3726.0, "Past the hour"),
        ];

        let parsed = parse_vtt(&export_vtt(&original)).unwrap();

        assert_eq!(parsed.len(), original.len());
        for (p, o) in parsed.iter().zip(&original) {
            assert_eq!(p.start_time, o.start_time);
            assert_eq!(p.end_time, o.end_time);
            assert_eq!(p.text, o.text);
        }
    }

    #[test]
    fn test_parse_vtt_keeps_whitespace_only_lines() {
        let original = vec![
            Caption::new("a", 1.0, 2.0, " "),
            Caption::new("b", 3.0, 4.0, "A\n \nB"),
            Caption::new("c", 5.0, 6.0, "  padded\t"),
        ];

        let vtt = export_vtt(&original);
        let parsed = parse_vtt(&vtt).unwrap();

        assert_eq!(parsed.len(), 3);
        for (p, o) in parsed.iter().zip(&original) {
            assert_eq!(p.start_time, o.start_time);
            assert_eq!(p.end_time, o.end_time);
            assert_eq!(p.text, o.text);
        }
        assert_eq!(export_vtt(&parsed), vtt);
    }

    #[test]
    fn test_parse_vtt_empty_export() {
        assert!(parse_vtt("WEBVTT\n\n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_vtt_without_identifiers() {
        let vtt = "WEBVTT\n\n00:01.000 --> 00:04.000\nHello World\n\n00:05.500 --> 00:08.000\nSecond\n";

        let captions = parse_vtt(vtt).unwrap();
        assert_eq!(captions.len(), 2);
        assert_eq!(captions[0].start_time, 1.0);
        assert_eq!(captions[0].end_time, 4.0);
        assert_eq!(captions[1].text, "Second");
    }

    #[test]
    fn test_parse_vtt_standard_input() {
        let vtt = "\u{FEFF}WEBVTT - Sample\r\nKind: captions\r\n\r\nNOTE written by hand\r\nspans lines\r\n\r\nintro\r\n00:00:01.000 --> 00:00:04.000 align:start position:10%\r\n<v Speaker>Hello</v>\r\n";

        let captions = parse_vtt(vtt).unwrap();
        assert_eq!(captions.len(), 1);
        assert_eq!(captions[0].start_time, 1.0);
        assert_eq!(captions[0].end_time, 4.0);
        assert_eq!(captions[0].text, "<v Speaker>Hello</v>");
    }

    #[test]
    fn test_parse_vtt_empty_cue_text() {
        let vtt = "WEBVTT\n\n1\n00:00.000 --> 00:03.000\n\n\n2\n00:04.000 --> 00:05.000\nB\n\n";

        let captions = parse_vtt(vtt).unwrap();
        assert_eq!(captions.len(), 2);
        assert_eq!(captions[0].text, "");
        assert_eq!(captions[1].text, "B");
    }

    #[test]
    fn test_parse_vtt_missing_header() {
        let result = parse_vtt("00:01.000 --> 00:04.000\nHello\n");
        assert!(matches!(result, Err(ParseError::InvalidFormat(_))));

        let result = parse_vtt("WEBVTTX\n\n");
        assert!(matches!(result, Err(ParseError::InvalidFormat(_))));

        assert!(matches!(parse_vtt(""), Err(ParseError::MissingData(_))));
    }

    #[test]
    fn test_parse_vtt_invalid_timestamp() {
        let result = parse_vtt("WEBVTT\n\n1\n00:0x.000 --> 00:04.000\nHello\n");
        assert!(matches!(result, Err(ParseError::InvalidTimestamp(_))));
    }

    #[test]
    fn test_parse_vtt_identifier_without_timing() {
        assert_eq!(parse_vtt("WEBVTT\n\n1"), Err(ParseError::UnexpectedEnd));

        let result = parse_vtt("WEBVTT\n\n1\nnot a timing line\n");
        assert!(matches!(result, Err(ParseError::InvalidFormat(_))));
    }
}
