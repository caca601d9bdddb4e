//! Time helpers shared by storage and the business-day calculations.
//!
//! Every timestamp is persisted as `YYYY-MM-DDTHH:MM:SSZ` in UTC, which keeps
//! lexical ordering in SQL identical to chronological ordering. "Today" and
//! "this month" are always evaluated in the business time zone.

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat,
    TimeZone, Utc,
};

pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

pub fn to_db_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn now_timestamp() -> String {
    to_db_timestamp(now_utc())
}

pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|at| at.with_timezone(&Utc))
}

/// Accepts what HTML forms and API clients send: RFC 3339, a
/// `datetime-local` value or a bare date. Values without an offset are read
/// as business-local time; a bare date means midnight.
pub fn parse_form_datetime(value: &str, offset: FixedOffset) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Some(at) = parse_timestamp(value) {
        return Some(at);
    }

    let naive = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })?;

    local_to_utc(naive, offset)
}

pub fn local_date(at: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    at.with_timezone(&offset).date_naive()
}

/// Half-open UTC interval covering the business calendar day of `now`.
pub fn day_bounds(now: DateTime<Utc>, offset: FixedOffset) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = start_of(local_date(now, offset), offset);
    (start, start + Duration::days(1))
}

/// Half-open UTC interval covering the business calendar month of `now`.
pub fn month_bounds(now: DateTime<Utc>, offset: FixedOffset) -> (DateTime<Utc>, DateTime<Utc>) {
    let today = local_date(now, offset);
    let first = today.with_day(1).unwrap_or(today);
    let next = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    }
    .unwrap_or(first + Duration::days(31));

    (start_of(first, offset), start_of(next, offset))
}

fn start_of(date: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    local_to_utc(midnight, offset).unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

fn local_to_utc(naive: NaiveDateTime, offset: FixedOffset) -> Option<DateTime<Utc>> {
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|at| at.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ist() -> FixedOffset {
        FixedOffset::east_opt(330 * 60).unwrap()
    }

    fn utc(value: &str) -> DateTime<Utc> {
        parse_timestamp(value).unwrap()
    }

    #[test]
    fn db_timestamps_are_second_precision_utc() {
        let at = utc("2026-03-04T05:06:07.891+02:00");
        assert_eq!(to_db_timestamp(at), "2026-03-04T03:06:07Z");
    }

    #[test]
    fn form_values_without_offset_are_business_local() {
        let at = parse_form_datetime("2026-03-04T10:30", ist()).unwrap();
        assert_eq!(to_db_timestamp(at), "2026-03-04T05:00:00Z");

        let midnight = parse_form_datetime("2026-03-04", ist()).unwrap();
        assert_eq!(to_db_timestamp(midnight), "2026-03-03T18:30:00Z");
    }

    #[test]
    fn form_values_reject_garbage() {
        assert!(parse_form_datetime("next tuesday", ist()).is_none());
        assert!(parse_form_datetime("   ", ist()).is_none());
    }

    #[test]
    fn day_bounds_follow_the_business_calendar() {
        // 20:00 UTC is already the next day in India.
        let (start, end) = day_bounds(utc("2026-03-04T20:00:00Z"), ist());
        assert_eq!(to_db_timestamp(start), "2026-03-04T18:30:00Z");
        assert_eq!(to_db_timestamp(end), "2026-03-05T18:30:00Z");
    }

    #[test]
    fn month_bounds_roll_over_december() {
        let (start, end) = month_bounds(utc("2026-12-15T12:00:00Z"), ist());
        assert_eq!(to_db_timestamp(start), "2026-11-30T18:30:00Z");
        assert_eq!(to_db_timestamp(end), "2026-12-31T18:30:00Z");
    }
}
