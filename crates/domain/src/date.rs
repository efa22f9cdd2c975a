use chrono::prelude::*;

pub fn is_valid_date(datestr: &str) -> anyhow::Result<(i32, u32, u32)> {
    let dates = datestr.split('-').collect::<Vec<_>>();
    if dates.len() != 3 {
        return Err(anyhow::Error::msg(datestr.to_string()));
    }

    let (year, month, day) = match (
        dates[0].parse::<i32>(),
        dates[1].parse::<u32>(),
        dates[2].parse::<u32>(),
    ) {
        (Ok(year), Ok(month), Ok(day)) => (year, month, day),
        _ => return Err(anyhow::Error::msg(datestr.to_string())),
    };

    if !(1900..=9999).contains(&year) || month < 1 || month > 12 {
        return Err(anyhow::Error::msg(datestr.to_string()));
    }

    let month_length = get_month_length(year, month);

    if day < 1 || day > month_length {
        return Err(anyhow::Error::msg(datestr.to_string()));
    }

    Ok((year, month, day))
}

/// Parses a `YYYY-M-D` date string into a calendar date
pub fn parse_date(datestr: &str) -> anyhow::Result<NaiveDate> {
    let (year, month, day) = is_valid_date(datestr.trim())?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| anyhow::Error::msg(datestr.to_string()))
}

pub fn is_leap_year(year: i32) -> bool {
    year % 400 == 0 || (year % 100 != 0 && year % 4 == 0)
}

// month: January -> 1. Months outside 1..=12 have no days.
pub fn get_month_length(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

pub fn first_day_of_month(date: &NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(*date)
}

/// Months since year 0 for the month that `date` is in. Makes
/// (year, month) pairs comparable as plain integers.
pub fn month_index(date: &NaiveDate) -> i64 {
    date.year() as i64 * 12 + date.month0() as i64
}

/// Builds the date for `day` in the given month, stepping the day back until
/// it exists in that month. Saturates outside of the representable range.
fn clamped_date(year: i64, month: u32, day: u32) -> NaiveDate {
    if year > NaiveDate::MAX.year() as i64 {
        return NaiveDate::MAX;
    }
    if year < NaiveDate::MIN.year() as i64 {
        return NaiveDate::MIN;
    }
    let year = year as i32;
    let mut day = day;
    while day > 0 {
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return date;
        }
        day -= 1;
    }
    // The edge months of the representable range
    if year == NaiveDate::MAX.year() {
        NaiveDate::MAX
    } else {
        NaiveDate::MIN
    }
}

/// Moves `date` by `months` months. When the day does not exist in the
/// target month, the last day of that month is used instead, so
/// `2023-01-31 + 1 month` is `2023-02-28` and never rolls into March.
pub fn add_months_safe(date: &NaiveDate, months: i32) -> NaiveDate {
    let target = month_index(date) + months as i64;
    let year = target.div_euclid(12);
    let month = target.rem_euclid(12) as u32 + 1;
    clamped_date(year, month, date.day())
}

/// Moves `date` by `years` years. Feb 29 becomes Feb 28 in a non leap year.
pub fn add_years_safe(date: &NaiveDate, years: i32) -> NaiveDate {
    clamped_date(date.year() as i64 + years as i64, date.month(), date.day())
}
