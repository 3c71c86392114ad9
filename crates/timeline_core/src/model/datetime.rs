//! ISO-8601 text codec for persisted date/time values.
//!
//! # Invariants
//! - `format_date_time` output always parses back to the same value.
//! - Unparsable text is an error; callers decide on explicit fallbacks.

use chrono::{NaiveDate, NaiveDateTime};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Canonical persisted form. Fractional seconds are printed only when set.
pub const ISO_DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Minute precision form, accepted on input for older rows and hand-typed values.
const ISO_MINUTE_FORMAT: &str = "%Y-%m-%dT%H:%M";

const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Fallback used when a new event is saved with a blank date field.
pub const PLACEHOLDER_DATE_TIME: &str = "2024-01-01T00:00:00";

/// Date/time text that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTimeParseError {
    pub input: String,
    pub expected: &'static str,
}

impl Display for DateTimeParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "malformed date/time `{}`; expected {}",
            self.input, self.expected
        )
    }
}

impl Error for DateTimeParseError {}

/// Formats a date/time value in the canonical persisted form.
pub fn format_date_time(value: &NaiveDateTime) -> String {
    value.format(ISO_DATE_TIME_FORMAT).to_string()
}

/// Parses ISO-8601 local date/time text with second or minute precision.
pub fn parse_date_time(text: &str) -> Result<NaiveDateTime, DateTimeParseError> {
    let trimmed = text.trim();
    NaiveDateTime::parse_from_str(trimmed, ISO_DATE_TIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, ISO_MINUTE_FORMAT))
        .map_err(|_| DateTimeParseError {
            input: text.to_string(),
            expected: "YYYY-MM-DDTHH:MM[:SS[.fff]]",
        })
}

/// Parses a date-only ISO-8601 value (`YYYY-MM-DD`).
pub fn parse_date(text: &str) -> Result<NaiveDate, DateTimeParseError> {
    NaiveDate::parse_from_str(text.trim(), ISO_DATE_FORMAT).map_err(|_| DateTimeParseError {
        input: text.to_string(),
        expected: "YYYY-MM-DD",
    })
}

/// Parses a form field, substituting `fallback` when the field is blank.
pub fn parse_date_time_or(text: &str, fallback: &str) -> Result<NaiveDateTime, DateTimeParseError> {
    if text.trim().is_empty() {
        parse_date_time(fallback)
    } else {
        parse_date_time(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_form_round_trips() {
        for text in [
            "2024-01-01T00:00:00",
            "1969-07-20T20:17:40",
            "2024-02-29T23:59:59.250",
        ] {
            let parsed = parse_date_time(text).unwrap();
            assert_eq!(format_date_time(&parsed), text);
        }
    }

    #[test]
    fn minute_precision_input_is_accepted() {
        let parsed = parse_date_time("2024-06-01T09:30").unwrap();
        assert_eq!(format_date_time(&parsed), "2024-06-01T09:30:00");
    }

    #[test]
    fn malformed_input_reports_input_text() {
        let err = parse_date_time("June 1st").unwrap_err();
        assert_eq!(err.input, "June 1st");
        assert!(err.to_string().contains("malformed"));
    }

    #[test]
    fn blank_field_uses_fallback_but_garbage_does_not() {
        let fallback = parse_date_time_or("  ", PLACEHOLDER_DATE_TIME).unwrap();
        assert_eq!(format_date_time(&fallback), PLACEHOLDER_DATE_TIME);
        assert!(parse_date_time_or("2024-13-01T00:00", PLACEHOLDER_DATE_TIME).is_err());
    }

    #[test]
    fn date_only_parser_rejects_time_suffix() {
        assert!(parse_date("2024-01-01").is_ok());
        assert!(parse_date("2024-01-01T00:00").is_err());
    }
}
