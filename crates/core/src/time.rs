use anyhow::Context;
use chrono::{DateTime, Duration, Months, NaiveDate, Utc};

/// Length of the spending window used for category analysis, in days.
pub const RECENCY_WINDOW_DAYS: i64 = 30;

/// Months of history included in the analytics trend.
pub const TREND_WINDOW_MONTHS: u32 = 6;

/// Pins "now" to a calendar date. An explicit `YYYY-MM-DD` argument wins;
/// otherwise the wall clock is shifted by `utc_offset_minutes` and truncated.
pub fn resolve_as_of_date(
    as_of_date_arg: Option<&str>,
    now_utc: DateTime<Utc>,
    utc_offset_minutes: i32,
) -> anyhow::Result<NaiveDate> {
    if let Some(s) = as_of_date_arg {
        return NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .with_context(|| format!("invalid as-of date {s:?}, expected YYYY-MM-DD"));
    }

    let offset = chrono::FixedOffset::east_opt(utc_offset_minutes * 60)
        .context("invalid UTC offset")?;
    Ok(now_utc.with_timezone(&offset).date_naive())
}

pub fn recency_window_start(as_of: NaiveDate) -> NaiveDate {
    as_of - Duration::days(RECENCY_WINDOW_DAYS)
}

/// Both ends inclusive; future-dated entries are outside the window.
pub fn in_recency_window(date: NaiveDate, as_of: NaiveDate) -> bool {
    date >= recency_window_start(as_of) && date <= as_of
}

pub fn trend_window_start(as_of: NaiveDate) -> NaiveDate {
    as_of
        .checked_sub_months(Months::new(TREND_WINDOW_MONTHS))
        .unwrap_or(NaiveDate::MIN)
}
