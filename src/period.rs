//! Calendar quarters and the date windows they cover.
//!
//! Budget allocations are kept per quarter, and expenditure is aggregated by
//! receipt date over the quarter's calendar months.

use time::{Date, Month, OffsetDateTime};
use time_tz::{Offset, TimeZone};

use crate::Error;

/// The first and last calendar month of `quarter` (1-4).
///
/// # Errors
/// Returns [Error::InvalidQuarter] if `quarter` is outside 1..=4.
pub fn quarter_months(quarter: u8) -> Result<(Month, Month), Error> {
    let start = match quarter {
        1 => Month::January,
        2 => Month::April,
        3 => Month::July,
        4 => Month::October,
        quarter => return Err(Error::InvalidQuarter(quarter)),
    };

    // The three months of a quarter never cross a year boundary.
    Ok((start, start.next().next()))
}

/// The inclusive date window covered by `quarter` of `year`.
///
/// Receipt dates are stored as plain dates, so the window runs from the first
/// day of the quarter's first month to the last day of its last month.
///
/// # Errors
/// Returns [Error::InvalidQuarter] if `quarter` is outside 1..=4.
pub fn quarter_date_range(year: i32, quarter: u8) -> Result<(Date, Date), Error> {
    let (start_month, end_month) = quarter_months(quarter)?;

    let start = Date::from_calendar_date(year, start_month, 1)
        .expect("day 1 is valid for every month");
    let end = Date::from_calendar_date(
        year,
        end_month,
        time::util::days_in_month(end_month, year),
    )
    .expect("days_in_month returns a valid day");

    Ok((start, end))
}

/// The quarter (1-4) that `date` falls in.
pub fn quarter_of(date: Date) -> u8 {
    (date.month() as u8 - 1) / 3 + 1
}

/// The (year, quarter) of the current instant in the given canonical
/// timezone, e.g. "Asia/Jakarta".
///
/// Fund-open bookkeeping is always recorded against the current calendar
/// quarter, regardless of the dates on the fund's items.
///
/// # Errors
/// Returns [Error::InvalidTimezone] if `canonical_timezone` is not a known
/// timezone name.
pub fn current_period(canonical_timezone: &str) -> Result<(i32, u8), Error> {
    let timezone = time_tz::timezones::get_by_name(canonical_timezone)
        .ok_or_else(|| Error::InvalidTimezone(canonical_timezone.to_owned()))?;

    let now = OffsetDateTime::now_utc();
    let local = now.to_offset(timezone.get_offset_utc(&now).to_utc());

    Ok((local.year(), quarter_of(local.date())))
}

#[cfg(test)]
mod quarter_date_range_tests {
    use time::macros::date;

    use crate::Error;

    use super::quarter_date_range;

    #[test]
    fn first_quarter_covers_january_to_march() {
        let (start, end) = quarter_date_range(2025, 1).unwrap();

        assert_eq!(start, date!(2025 - 01 - 01));
        assert_eq!(end, date!(2025 - 03 - 31));
    }

    #[test]
    fn first_quarter_includes_leap_day() {
        let (start, end) = quarter_date_range(2024, 1).unwrap();

        assert!(start < date!(2024 - 02 - 29));
        assert!(date!(2024 - 02 - 29) < end);
    }

    #[test]
    fn fourth_quarter_ends_on_new_years_eve() {
        let (start, end) = quarter_date_range(2025, 4).unwrap();

        assert_eq!(start, date!(2025 - 10 - 01));
        assert_eq!(end, date!(2025 - 12 - 31));
    }

    #[test]
    fn rejects_quarter_zero_and_five() {
        assert_eq!(quarter_date_range(2025, 0), Err(Error::InvalidQuarter(0)));
        assert_eq!(quarter_date_range(2025, 5), Err(Error::InvalidQuarter(5)));
    }
}
