//! Wall-clock handling for archived timestamps.
//!
//! Every persisted timestamp is a naive wall-clock value in a fixed UTC+9
//! offset, truncated to whole seconds.

use chrono::{DateTime, FixedOffset, NaiveDateTime, SubsecRound, Utc};

const JST_OFFSET_SECS: i32 = 9 * 3600;

// Evaluated at compile time; an out-of-range offset fails the build.
const JST: FixedOffset = match FixedOffset::east_opt(JST_OFFSET_SECS) {
    Some(offset) => offset,
    None => panic!("UTC+9 is a valid fixed offset"),
};

/// Upstream `created_at` format, e.g. `"Wed Mar 01 12:34:56 +0000 2023"`.
pub const FEED_TIMESTAMP_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

#[must_use]
pub fn jst() -> FixedOffset {
    JST
}

/// Parses an upstream creation timestamp and converts it to UTC+9 wall-clock time.
///
/// # Errors
///
/// Returns [`chrono::ParseError`] if `raw` does not match [`FEED_TIMESTAMP_FORMAT`].
pub fn parse_feed_timestamp(raw: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    let parsed = DateTime::parse_from_str(raw, FEED_TIMESTAMP_FORMAT)?;
    Ok(parsed.with_timezone(&jst()).naive_local().trunc_subsecs(0))
}

/// The ingestion timestamp shared by every fact written in one run.
#[must_use]
pub fn registered_now() -> NaiveDateTime {
    Utc::now().with_timezone(&jst()).naive_local().trunc_subsecs(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    #[test]
    fn archive_offset_is_nine_hours_east() {
        assert_eq!(jst().local_minus_utc(), 9 * 3600);
    }

    #[test]
    fn parses_and_shifts_to_utc_plus_nine() {
        let parsed = parse_feed_timestamp("Wed Mar 01 20:34:56 +0000 2023").unwrap();
        let expected = NaiveDate::from_ymd_opt(2023, 3, 2)
            .unwrap()
            .and_hms_opt(5, 34, 56)
            .unwrap();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn rejects_iso_format() {
        assert!(parse_feed_timestamp("2023-03-01T12:34:56Z").is_err());
    }

    #[test]
    fn registered_now_has_no_subseconds() {
        assert_eq!(registered_now().nanosecond(), 0);
    }
}
