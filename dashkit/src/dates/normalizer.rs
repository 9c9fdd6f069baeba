use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

/// Placeholder rendered when a record carries no date at all.
pub const NOT_AVAILABLE: &str = "N/A";

/// Display format every parsed date is rendered to.
pub const CANONICAL_FORMAT: &str = "%d-%m-%Y";

/// Minimum character count for hyphenated text to be treated as ISO.
const ISO_MIN_LEN: usize = 10;

const ISO_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const ISO_OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M:%S%#z",
    "%Y-%m-%dT%H:%M%#z",
];

const DAY_MONTH_YEAR_FORMAT: &str = "%d/%m/%Y";

const FREE_FORM_FORMATS: &[&str] = &[
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%a %b %d %Y",
    "%Y.%m.%d",
    "%d.%m.%Y",
];

static ORDINAL_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2})(st|nd|rd|th)\b").expect("ordinal suffix pattern is valid"));

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("digit run pattern is valid"));

/// Which parser a piece of raw date text is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateShape {
    /// Hyphenated and at least ten characters long: `YYYY-MM-DD[...]`.
    Iso,
    /// Slash separated: `DD/MM/YYYY`.
    DayMonthYear,
    /// Anything else.
    FreeForm,
}

impl DateShape {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Iso => "iso",
            Self::DayMonthYear => "day_month_year",
            Self::FreeForm => "free_form",
        }
    }
}

/// Classifies raw text by shape. Priority is fixed: ISO, then slashes, then free-form.
pub fn classify(raw: &str) -> DateShape {
    if raw.contains('-') && raw.chars().count() >= ISO_MIN_LEN {
        DateShape::Iso
    } else if raw.contains('/') {
        DateShape::DayMonthYear
    } else {
        DateShape::FreeForm
    }
}

/// Parses raw date text with the parser its shape selects.
///
/// The year must be written out in full: a date is only accepted when its
/// four-digit year appears as a run of digits in the input.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let date = match classify(raw) {
        DateShape::Iso => parse_iso(trimmed),
        DateShape::DayMonthYear => NaiveDate::parse_from_str(trimmed, DAY_MONTH_YEAR_FORMAT).ok(),
        DateShape::FreeForm => parse_free_form(trimmed),
    }?;
    has_full_year(trimmed, date).then_some(date)
}

/// Renders a date as `DD-MM-YYYY`.
pub fn format_canonical(date: NaiveDate) -> String {
    date.format(CANONICAL_FORMAT).to_string()
}

/// Normalizes raw date text to `DD-MM-YYYY`.
///
/// Absent or empty input yields [`NOT_AVAILABLE`]. Input that does not parse
/// to a valid calendar date is returned unchanged; this function never fails.
///
/// ```
/// use dashkit::dates::normalize;
///
/// assert_eq!(normalize(Some("2024-06-07")), "07-06-2024");
/// assert_eq!(normalize(Some("07/06/2024")), "07-06-2024");
/// assert_eq!(normalize(Some("not-a-date")), "not-a-date");
/// assert_eq!(normalize(None), "N/A");
/// ```
pub fn normalize(input: Option<&str>) -> String {
    let raw = match input {
        Some(raw) if !raw.is_empty() => raw,
        _ => return NOT_AVAILABLE.to_string(),
    };

    match parse_date(raw) {
        Some(date) => format_canonical(date),
        None => {
            log::debug!("date text {raw:?} did not parse as {:?}; passing through", classify(raw));
            raw.to_string()
        }
    }
}

/// Rewrites the named fields of a JSON record to their normalized display text.
///
/// Missing and `null` fields become [`NOT_AVAILABLE`]. Numbers and booleans
/// are normalized from their textual form. Objects and arrays are left alone.
pub fn normalize_fields(record: &mut Map<String, Value>, fields: &[&str]) {
    for field in fields {
        let rendered = match record.get(*field) {
            None | Some(Value::Null) => NOT_AVAILABLE.to_string(),
            Some(Value::String(text)) => normalize(Some(text)),
            Some(Value::Number(number)) => normalize(Some(&number.to_string())),
            Some(Value::Bool(flag)) => normalize(Some(&flag.to_string())),
            Some(Value::Object(_)) | Some(Value::Array(_)) => continue,
        };
        record.insert((*field).to_string(), Value::String(rendered));
    }
}

fn parse_iso(raw: &str) -> Option<NaiveDate> {
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(stamp.date_naive());
    }
    if let Some(stamp) = ISO_OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(raw, format).ok())
    {
        return Some(stamp.date_naive());
    }
    if let Some(stamp) = ISO_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
    {
        return Some(stamp.date());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

fn parse_free_form(raw: &str) -> Option<NaiveDate> {
    if let Ok(stamp) = DateTime::parse_from_rfc2822(raw) {
        return Some(stamp.date_naive());
    }
    let cleaned = ORDINAL_SUFFIX.replace_all(raw, "$1");
    FREE_FORM_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&cleaned, format).ok())
}

// `%Y` also takes one to three digits, and a space in a format matches zero
// or more spaces, so "June 2024" would otherwise read as 20 June 0024.
fn has_full_year(raw: &str, date: NaiveDate) -> bool {
    let year = format!("{:04}", date.year());
    DIGIT_RUN.find_iter(raw).any(|run| run.as_str() == year)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_and_empty_render_sentinel() {
        assert_eq!(normalize(None), "N/A");
        assert_eq!(normalize(Some("")), "N/A");
    }

    #[test]
    fn iso_dates_and_timestamps() {
        assert_eq!(normalize(Some("2024-06-07")), "07-06-2024");
        assert_eq!(normalize(Some("2024-06-07T10:15:00Z")), "07-06-2024");
        assert_eq!(normalize(Some("2024-06-07T23:30:00+05:00")), "07-06-2024");
        assert_eq!(normalize(Some("2024-06-07T10:15:00.250")), "07-06-2024");
        assert_eq!(normalize(Some("2024-06-07 10:15")), "07-06-2024");
    }

    #[test]
    fn iso_offsets_without_seconds_or_colon() {
        assert_eq!(normalize(Some("2024-06-07T10:15Z")), "07-06-2024");
        assert_eq!(normalize(Some("2024-06-07T10:15:00+0530")), "07-06-2024");
        assert_eq!(normalize(Some("2024-06-07T10:15+05:30")), "07-06-2024");
        assert_eq!(normalize(Some("2024-06-07T10:15:00.5-0800")), "07-06-2024");
    }

    #[test]
    fn slash_dates_are_day_first() {
        assert_eq!(normalize(Some("07/06/2024")), "07-06-2024");
        assert_eq!(normalize(Some("31/12/1999")), "31-12-1999");
    }

    #[test]
    fn invalid_calendar_values_pass_through() {
        assert_eq!(normalize(Some("32/13/2024")), "32/13/2024");
        assert_eq!(normalize(Some("2024-02-30")), "2024-02-30");
        assert_eq!(normalize(Some("2024-13-01")), "2024-13-01");
    }

    #[test]
    fn unparseable_text_passes_through() {
        assert_eq!(normalize(Some("not-a-date")), "not-a-date");
        assert_eq!(normalize(Some("tomorrow")), "tomorrow");
        assert_eq!(normalize(Some("2024-06-07garbage")), "2024-06-07garbage");
    }

    #[test]
    fn free_form_dates() {
        assert_eq!(normalize(Some("June 7, 2024")), "07-06-2024");
        assert_eq!(normalize(Some("Jun 7 2024")), "07-06-2024");
        assert_eq!(normalize(Some("7th June 2024")), "07-06-2024");
        assert_eq!(normalize(Some("Fri, 07 Jun 2024 10:15:00 +0000")), "07-06-2024");
        assert_eq!(normalize(Some("2024.06.07")), "07-06-2024");
    }

    #[test]
    fn month_and_year_without_day_pass_through() {
        for raw in ["June 2024", "Jun 1999", "March 2021", "7 June 24", "Jun 7 24"] {
            assert_eq!(normalize(Some(raw)), raw);
        }
    }

    #[test]
    fn short_years_pass_through() {
        assert_eq!(normalize(Some("07/06/24")), "07/06/24");
        assert_eq!(normalize(Some("7.6.24")), "7.6.24");
    }

    #[test]
    fn canonical_output_is_stable_on_second_pass() {
        for raw in ["2024-06-07", "07/06/2024", "June 7, 2024", "not-a-date", "32/13/2024"] {
            let once = normalize(Some(raw));
            assert_eq!(normalize(Some(&once)), once, "second pass changed {raw:?}");
        }
    }

    #[test]
    fn classification_priority() {
        assert_eq!(classify("2024-06-07"), DateShape::Iso);
        assert_eq!(classify("07-06-2024"), DateShape::Iso);
        assert_eq!(classify("2024-6-7"), DateShape::FreeForm);
        assert_eq!(classify("07/06/2024"), DateShape::DayMonthYear);
        assert_eq!(classify("2024-06-07/08"), DateShape::Iso);
        assert_eq!(classify("June 7, 2024"), DateShape::FreeForm);
    }

    #[test]
    fn record_fields_are_rewritten_in_place() {
        let mut record = serde_json::json!({
            "created": "2024-06-07",
            "due": null,
            "note": "see attached",
            "tags": ["a"],
        })
        .as_object()
        .cloned()
        .unwrap();

        normalize_fields(&mut record, &["created", "due", "shipped", "note", "tags"]);

        assert_eq!(record["created"], "07-06-2024");
        assert_eq!(record["due"], "N/A");
        assert_eq!(record["shipped"], "N/A");
        assert_eq!(record["note"], "see attached");
        assert_eq!(record["tags"], serde_json::json!(["a"]));
    }
}
