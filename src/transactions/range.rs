//! Reporting windows for a [`Timeframe`], always in UTC.

use serde::Serialize;
use time::{util, Date, Duration, OffsetDateTime, UtcOffset};

use crate::classifier::Timeframe;

/// Half-open `[start, end)` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    #[serde(with = "time::serde::rfc3339")]
    pub start: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end: OffsetDateTime,
}

impl DateRange {
    /// The current week (starting Sunday), calendar month or calendar year
    /// containing `now`.
    pub fn for_timeframe(timeframe: Timeframe, now: OffsetDateTime) -> Self {
        let today = now.to_offset(UtcOffset::UTC).date();
        let (start, end) = match timeframe {
            Timeframe::Week => {
                let start =
                    today - Duration::days(today.weekday().number_days_from_sunday() as i64);
                (start, start + Duration::days(7))
            }
            Timeframe::Month => {
                let start = today - Duration::days(today.day() as i64 - 1);
                let len = today.month().length(today.year());
                (start, start + Duration::days(len as i64))
            }
            Timeframe::Year => {
                let start = today - Duration::days(today.ordinal() as i64 - 1);
                let len = util::days_in_year(today.year());
                (start, start + Duration::days(len as i64))
            }
        };

        Self {
            start: midnight_utc(start),
            end: midnight_utc(end),
        }
    }

    pub fn contains(&self, at: OffsetDateTime) -> bool {
        self.start <= at && at < self.end
    }
}

fn midnight_utc(date: Date) -> OffsetDateTime {
    date.midnight().assume_utc()
}
