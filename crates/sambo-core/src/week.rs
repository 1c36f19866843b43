//! Week arithmetic in the bot's fixed civil timezone.
//!
//! All aggregation is partitioned by a week id: the ISO date of the Monday
//! on/before a given instant. The timezone is Moscow, a fixed UTC+3 offset
//! with no DST, so a `FixedOffset` is sufficient.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};

/// Moscow standard time offset, seconds east of UTC.
const MOSCOW_OFFSET_SECS: i32 = 3 * 3600;

/// The Moscow timezone as a fixed offset.
pub fn moscow_offset() -> FixedOffset {
    FixedOffset::east_opt(MOSCOW_OFFSET_SECS).expect("UTC+3 is a valid offset")
}

/// Current instant in Moscow time.
pub fn moscow_now() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&moscow_offset())
}

/// The Monday on/before `date`.
pub fn week_start_date(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// The Monday on/before `instant`, normalized to midnight in the same
/// offset. Idempotent: `week_start(week_start(x)) == week_start(x)`.
pub fn week_start(instant: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    let monday = week_start_date(instant.date_naive());
    monday
        .and_time(NaiveTime::MIN)
        .and_local_timezone(*instant.offset())
        .single()
        .expect("fixed offsets have no gaps or folds")
}

/// Canonical week partition key: the week's Monday as `YYYY-MM-DD`.
pub fn week_id(instant: DateTime<FixedOffset>) -> String {
    week_start_date(instant.date_naive())
        .format("%Y-%m-%d")
        .to_string()
}

/// Week id of the week `n` weeks before `instant`'s week.
pub fn week_id_back(instant: DateTime<FixedOffset>, n: u32) -> String {
    (week_start_date(instant.date_naive()) - Duration::weeks(n as i64))
        .format("%Y-%m-%d")
        .to_string()
}

/// Calendar date of `instant` as `YYYY-MM-DD`.
pub fn date_id(instant: DateTime<FixedOffset>) -> String {
    instant.date_naive().format("%Y-%m-%d").to_string()
}
