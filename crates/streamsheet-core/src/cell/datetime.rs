//! Conversion between timestamps and spreadsheet serial day numbers

use chrono::{Duration, NaiveDate, NaiveDateTime};

const MILLIS_PER_DAY: f64 = 86_400_000.0;
const NANOS_PER_DAY: f64 = 86_400_000_000_000.0;

fn midnight(year: i32, month: u32, day: u32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0)
}

fn days_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    let delta = to - from;
    match delta.num_nanoseconds() {
        Some(nanos) => nanos as f64 / NANOS_PER_DAY,
        None => delta.num_milliseconds() as f64 / MILLIS_PER_DAY,
    }
}

/// Convert a timestamp to a serial day number.
///
/// In the 1900 system the serial counts from 1899-12-31 for dates before
/// 1900-03-01 and from 1899-12-30 afterwards, reproducing the phantom
/// 1900-02-29. In the 1904 system it counts from 1904-01-01.
///
/// Returns `None` when the timestamp is on or before the epoch start, which
/// has no positive serial representation.
pub fn datetime_to_serial(value: NaiveDateTime, date_1904: bool) -> Option<f64> {
    let serial = if date_1904 {
        days_between(midnight(1904, 1, 1)?, value)
    } else if value < midnight(1900, 3, 1)? {
        days_between(midnight(1899, 12, 31)?, value)
    } else {
        days_between(midnight(1899, 12, 30)?, value)
    };
    (serial > 0.0).then_some(serial)
}

/// Convert a serial day number back to a timestamp, rounded to the millisecond
pub fn serial_to_datetime(serial: f64, date_1904: bool) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let base = if date_1904 {
        midnight(1904, 1, 1)?
    } else if serial < 61.0 {
        midnight(1899, 12, 31)?
    } else {
        midnight(1899, 12, 30)?
    };
    let millis = (serial * MILLIS_PER_DAY).round();
    if millis > i64::MAX as f64 {
        return None;
    }
    base.checked_add_signed(Duration::milliseconds(millis as i64))
}

/// Express a duration as a fraction of a day
pub fn duration_to_serial(value: Duration) -> f64 {
    match value.num_nanoseconds() {
        Some(nanos) => nanos as f64 / NANOS_PER_DAY,
        None => value.num_milliseconds() as f64 / MILLIS_PER_DAY,
    }
}
