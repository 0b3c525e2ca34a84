use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};

/// Asia/Karachi has been a fixed UTC+05:00 with no daylight saving since 2009.
const KARACHI_UTC_OFFSET_SECS: i32 = 5 * 60 * 60;

const BIRTHDAY_MONTH: u32 = 11;
const BIRTHDAY_DAYS: [u32; 2] = [26, 27];

pub const BIRTHDAY_BANNER: &str = "\u{1F382} Happy Birthday my angel! \u{2728}";

pub fn civil_date(now: DateTime<Utc>) -> NaiveDate {
    match FixedOffset::east_opt(KARACHI_UTC_OFFSET_SECS) {
        Some(offset) => now.with_timezone(&offset).date_naive(),
        None => now.date_naive(),
    }
}

pub fn is_birthday(date: NaiveDate) -> bool {
    date.month() == BIRTHDAY_MONTH && BIRTHDAY_DAYS.contains(&date.day())
}
