use alloc::string::ToString;
use core::fmt::Display;
use core::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate};

use crate::InputError;
use crate::tags::{self, Tag};
use crate::value::{ContainerBuilder, Timestamp, Value};

const DAY: i64 = 86_400;

/// Resolution of a history query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryType {
    Day,
    Week,
    Month,
    Year,
}

impl HistoryType {
    pub fn request_tag(&self) -> Tag {
        match self {
            HistoryType::Day => tags::DB_REQ_HISTORY_DATA_DAY,
            HistoryType::Week => tags::DB_REQ_HISTORY_DATA_WEEK,
            HistoryType::Month => tags::DB_REQ_HISTORY_DATA_MONTH,
            HistoryType::Year => tags::DB_REQ_HISTORY_DATA_YEAR,
        }
    }

    /// Seconds per slot
    pub fn interval(&self) -> i64 {
        match self {
            HistoryType::Day => 900,
            HistoryType::Week | HistoryType::Month => DAY,
            HistoryType::Year => 2_628_000,
        }
    }
}

impl FromStr for HistoryType {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "day" => Ok(HistoryType::Day),
            "week" => Ok(HistoryType::Week),
            "month" => Ok(HistoryType::Month),
            "year" => Ok(HistoryType::Year),
            _ => Err(InputError::UnknownHistoryType(s.to_string())),
        }
    }
}

impl Display for HistoryType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            HistoryType::Day => "day",
            HistoryType::Week => "week",
            HistoryType::Month => "month",
            HistoryType::Year => "year",
        };
        f.write_str(name)
    }
}

/// Time range of a history query
///
/// All times are UTC. The start is aligned to midnight of the day, the
/// Monday of the week, the 1st of the month or January 1st.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryWindow {
    pub kind: HistoryType,
    /// Seconds since the epoch
    pub start: i64,
    /// Seconds per slot
    pub interval: i64,
    /// Seconds covered
    pub span: i64,
}

impl HistoryWindow {
    /// Window of type `kind` containing `date`
    pub fn new(kind: HistoryType, date: NaiveDate) -> Self {
        let first = match kind {
            HistoryType::Day => Some(date),
            HistoryType::Week => {
                date.checked_sub_days(Days::new(date.weekday().num_days_from_monday() as u64))
            }
            HistoryType::Month => date.with_day(1),
            HistoryType::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1),
        }
        .unwrap_or(date);
        let span = match kind {
            HistoryType::Day => DAY,
            HistoryType::Week => 7 * DAY,
            HistoryType::Month => {
                first
                    .checked_add_months(Months::new(1))
                    .map_or(30, |next| (next - first).num_days())
                    * DAY
            }
            HistoryType::Year => 365 * DAY,
        };
        let start = first.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
        HistoryWindow {
            kind,
            start,
            interval: kind.interval(),
            span,
        }
    }

    /// Parse the type name and a `YYYY-MM-DD` date
    pub fn parse(kind: &str, date: &str) -> Result<Self, InputError> {
        let kind = kind.parse()?;
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| InputError::InvalidDateFormat(date.to_string()))?;
        Ok(Self::new(kind, date))
    }

    /// `DB_REQ_HISTORY_DATA_<TYPE> { TIME_START, TIME_INTERVAL, TIME_SPAN }`
    pub fn request(&self) -> Value {
        let mut history = ContainerBuilder::new(self.kind.request_tag());
        history
            .append(tags::DB_REQ_HISTORY_TIME_START, Timestamp::from_seconds(self.start))
            .append(
                tags::DB_REQ_HISTORY_TIME_INTERVAL,
                Timestamp::from_seconds(self.interval),
            )
            .append(tags::DB_REQ_HISTORY_TIME_SPAN, Timestamp::from_seconds(self.span));
        history.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_day() {
        let window = HistoryWindow::new(HistoryType::Day, date("2024-02-15"));
        assert_eq!(window.start, 1_707_955_200);
        assert_eq!(window.interval, 900);
        assert_eq!(window.span, 86_400);
    }
    #[test]
    fn test_week_starts_on_monday() {
        let window = HistoryWindow::new(HistoryType::Week, date("2024-11-20"));
        assert_eq!(window.start, 1_731_888_000);
        assert_eq!(window.span, 604_800);
        // A Monday is its own week start
        let monday = HistoryWindow::new(HistoryType::Week, date("2024-11-18"));
        assert_eq!(monday.start, 1_731_888_000);
    }
    #[test]
    fn test_month_honors_leap_years() {
        let leap = HistoryWindow::new(HistoryType::Month, date("2024-02-15"));
        assert_eq!(leap.start, 1_706_745_600);
        assert_eq!(leap.span, 29 * 86_400);
        assert_eq!(leap.interval, 86_400);
        let common = HistoryWindow::new(HistoryType::Month, date("2023-02-15"));
        assert_eq!(common.start, 1_675_209_600);
        assert_eq!(common.span, 28 * 86_400);
        let century = HistoryWindow::new(HistoryType::Month, date("2100-02-01"));
        assert_eq!(century.span, 28 * 86_400);
        let december = HistoryWindow::new(HistoryType::Month, date("2023-12-31"));
        assert_eq!(december.span, 31 * 86_400);
        let november = HistoryWindow::new(HistoryType::Month, date("2023-11-30"));
        assert_eq!(november.span, 30 * 86_400);
    }
    #[test]
    fn test_year() {
        let window = HistoryWindow::new(HistoryType::Year, date("2024-07-04"));
        assert_eq!(window.start, 1_704_067_200);
        assert_eq!(window.interval, 2_628_000);
        assert_eq!(window.span, 31_536_000);
    }
    #[test]
    fn test_parse_errors() {
        assert_eq!(
            HistoryWindow::parse("decade", "2024-01-01"),
            Err(InputError::UnknownHistoryType("decade".into()))
        );
        assert_eq!(
            HistoryWindow::parse("day", "2024-13-01"),
            Err(InputError::InvalidDateFormat("2024-13-01".into()))
        );
        assert_eq!(
            HistoryWindow::parse("Week", "2024-11-20").map(|w| w.kind),
            Ok(HistoryType::Week)
        );
    }
    #[test]
    fn test_request() {
        let request = HistoryWindow::new(HistoryType::Day, date("2024-02-15")).request();
        assert_eq!(request.tag, tags::DB_REQ_HISTORY_DATA_DAY);
        let children = request.children().unwrap();
        assert_eq!(
            children[0].as_timestamp(),
            Ok(Timestamp::from_seconds(1_707_955_200))
        );
        assert_eq!(
            children[1].as_timestamp(),
            Ok(Timestamp::from_seconds(900))
        );
        assert_eq!(children[2].tag, tags::DB_REQ_HISTORY_TIME_SPAN);
    }
}
