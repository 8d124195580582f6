use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Year-month key (`YYYY-MM`) used to partition chronological feeds and to
/// address monthly summaries. Ordering follows calendar order because the
/// string form is zero-padded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self, String> {
        if !(1..=12).contains(&month) {
            return Err(format!("Month out of range: {month}"));
        }
        if !(1970..=9999).contains(&year) {
            return Err(format!("Year out of range: {year}"));
        }
        Ok(Self { year, month })
    }

    pub fn parse(value: &str) -> Result<Self, String> {
        let (year, month) = value
            .split_once('-')
            .ok_or_else(|| format!("Month key must be YYYY-MM: {value}"))?;
        let year = year
            .parse::<i32>()
            .map_err(|_| format!("Month key must be YYYY-MM: {value}"))?;
        let month = month
            .parse::<u32>()
            .map_err(|_| format!("Month key must be YYYY-MM: {value}"))?;
        Self::new(year, month)
    }

    pub fn of_timestamp(at: DateTime<Utc>) -> Self {
        Self {
            year: at.year(),
            month: at.month(),
        }
    }

    pub fn of_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MonthKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MonthKey> for String {
    fn from(value: MonthKey) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats_zero_padded() {
        let key = MonthKey::parse("2024-01").expect("parse");
        assert_eq!(key.to_string(), "2024-01");
        assert_eq!(key.year(), 2024);
        assert_eq!(key.month(), 1);
    }

    #[test]
    fn rejects_out_of_range_month() {
        assert!(MonthKey::parse("2024-13").is_err());
        assert!(MonthKey::parse("2024").is_err());
        assert!(MonthKey::parse("abcd-ef").is_err());
    }

    #[test]
    fn orders_by_calendar() {
        let jan = MonthKey::parse("2024-01").expect("jan");
        let feb = MonthKey::parse("2024-02").expect("feb");
        let dec_prev = MonthKey::parse("2023-12").expect("dec");
        assert!(jan < feb);
        assert!(dec_prev < jan);
    }
}
