//! Local-time helpers and date/time input parsing.

use chrono::{
    DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone,
};

use crate::error::{CalIndexError, CalIndexResult};

/// Attach the local timezone to a naive (floating) datetime.
///
/// Wall-clock times that fall into a DST gap have no local representation;
/// those are read as if the offset in effect at that UTC instant applied.
pub fn assume_local(naive: NaiveDateTime) -> DateTime<FixedOffset> {
    match Local.from_local_datetime(&naive).earliest() {
        Some(dt) => dt.fixed_offset(),
        None => {
            let offset = Local.offset_from_utc_datetime(&naive).fix();
            offset
                .from_local_datetime(&naive)
                .earliest()
                .unwrap_or_else(|| naive.and_utc().fixed_offset())
        }
    }
}

/// Local midnight of a date, the canonical start of an all-day event.
pub fn local_midnight(date: NaiveDate) -> DateTime<FixedOffset> {
    assume_local(date.and_time(NaiveTime::MIN))
}

/// Today's date in the local timezone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse YYYY-MM-DD.
pub fn parse_date(input: &str) -> CalIndexResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        CalIndexError::InvalidDateTime(format!("'{}'. Expected YYYY-MM-DD", input.trim()))
    })
}

/// Parse an ISO-8601 timestamp.
///
/// Accepts an explicit offset (`2024-01-15T09:00:00+01:00`, `...Z`), a naive
/// timestamp with `T` or a space as separator and optional seconds (taken as
/// local time), or a bare date (local midnight).
pub fn parse_datetime(input: &str) -> CalIndexResult<DateTime<FixedOffset>> {
    let s = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt);
    }
    for fmt in ["%Y-%m-%dT%H:%M%:z", "%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M%:z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(assume_local(naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(local_midnight(date));
    }

    Err(CalIndexError::InvalidDateTime(format!(
        "'{}'. Expected YYYY-MM-DD or YYYY-MM-DD HH:MM",
        s
    )))
}

/// Whether a user-supplied time string names a whole day (`YYYY-MM-DD`).
pub fn is_date_only(input: &str) -> bool {
    input.trim().len() == 10
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn parse_date_rejects_garbage() {
        assert!(parse_date("2024-13-01").is_err());
        assert!(parse_date("tomorrow").is_err());
        assert_eq!(
            parse_date(" 2024-01-15 ").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
    }

    #[test]
    fn parse_datetime_keeps_explicit_offset() {
        let dt = parse_datetime("2024-01-15T09:00:00+05:30").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 5 * 3600 + 30 * 60);
        assert_eq!(dt.to_rfc3339(), "2024-01-15T09:00:00+05:30");
    }

    #[test]
    fn parse_datetime_naive_is_local() {
        let dt = parse_datetime("2024-01-15 14:30").unwrap();
        let expected = assume_local(
            NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(14, 30, 0)
                .unwrap(),
        );
        assert_eq!(dt, expected);
        assert_eq!(dt.hour(), 14);
    }

    #[test]
    fn parse_datetime_bare_date_is_midnight() {
        let dt = parse_datetime("2024-01-15").unwrap();
        assert_eq!(dt, local_midnight(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()));
    }

    #[test]
    fn parse_datetime_invalid_is_distinct_error() {
        let err = parse_datetime("15/01/2024").unwrap_err();
        assert!(matches!(err, CalIndexError::InvalidDateTime(_)));
    }

    #[test]
    fn date_only_detection() {
        assert!(is_date_only("2024-01-15"));
        assert!(!is_date_only("2024-01-15 09:00"));
    }
}
