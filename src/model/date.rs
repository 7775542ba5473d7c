//! Date parsing and validation for the hand-written date cells of the ledger.

use crate::ingest::RowError;
use anyhow::bail;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The calendar month a worksheet is expected to describe.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPeriod")]
pub struct Period {
    year: i32,
    month: u32,
}

#[derive(Deserialize)]
struct RawPeriod {
    year: i32,
    month: u32,
}

impl TryFrom<RawPeriod> for Period {
    type Error = anyhow::Error;

    fn try_from(raw: RawPeriod) -> crate::Result<Self> {
        Period::new(raw.year, raw.month)
    }
}

impl Period {
    pub fn new(year: i32, month: u32) -> crate::Result<Self> {
        if !(1..=12).contains(&month) {
            bail!("Month must be between 1 and 12, got {month}");
        }
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            bail!("The year {year} is out of range");
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The first day of the month, used when an old worksheet row has no usable date.
    pub fn first_day(&self) -> NaiveDate {
        // `new` has checked that this date exists.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    fn previous_month(&self) -> u32 {
        if self.month == 1 {
            12
        } else {
            self.month - 1
        }
    }

    fn next_month(&self) -> u32 {
        if self.month == 12 {
            1
        } else {
            self.month + 1
        }
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Day-first formats, tried in order.
const DATE_FORMATS: &[&str] = &[
    "%d/%m/%Y",
    "%d/%m/%y",
    "%d-%m-%Y",
    "%d-%m-%y",
    "%d.%m.%Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d %B %Y",
    "%d %b %Y",
    "%d %B, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%B %d, %Y",
    "%b %d, %Y",
];

const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%d/%m/%Y %H:%M:%S", "%d/%m/%Y %H:%M"];

/// Parses a date written in any of the common day-first forms found in the ledger, e.g.
/// `03/01/2024`, `3-1-24`, `2024-01-03`, `3rd January 2024` or `Jan 3, 2024`.
///
/// ```
/// # use finances::model::parse_date;
/// # use chrono::NaiveDate;
/// assert_eq!(parse_date("03/01/2024").unwrap(), NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
/// assert!(parse_date("Bills").is_err());
/// ```
pub fn parse_date(text: &str) -> Result<NaiveDate, RowError> {
    let cleaned = clean(text);
    if cleaned.is_empty() {
        return Err(RowError::DateParse(text.to_string()));
    }

    // %Y happily reads "20" as the year 20, so anything that short is left for %y.
    let plausible = |d: &NaiveDate| d.year() >= 1000;

    DATE_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(&cleaned, fmt).ok())
        .find(plausible)
        .or_else(|| {
            DATE_TIME_FORMATS
                .iter()
                .filter_map(|fmt| NaiveDateTime::parse_from_str(&cleaned, fmt).ok())
                .map(|dt| dt.date())
                .find(plausible)
        })
        .ok_or_else(|| RowError::DateParse(text.trim().to_string()))
}

/// Collapses whitespace and drops ordinal suffixes: "  3rd   Jan 2024" -> "3 Jan 2024".
fn clean(text: &str) -> String {
    text.split_whitespace()
        .map(strip_ordinal)
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_ordinal(word: &str) -> &str {
    for suffix in ["st", "nd", "rd", "th"] {
        let lower = word.to_ascii_lowercase();
        if let Some(number) = lower.strip_suffix(suffix) {
            if !number.is_empty() && number.chars().all(|c| c.is_ascii_digit()) {
                return &word[..number.len()];
            }
        }
    }
    word
}

/// A way in which a date disagrees with the worksheet it was found in.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateAnomaly {
    Year { found: i32, expected: i32 },
    Month { found: u32, expected: u32 },
}

impl Display for DateAnomaly {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DateAnomaly::Year { found, expected } => {
                write!(f, "year {found} is more than a year away from {expected}")
            }
            DateAnomaly::Month { found, expected } => write!(
                f,
                "month {found} is not within a month of the worksheet month {expected}"
            ),
        }
    }
}

/// Checks that `date` falls within a year of the worksheet's year and within a month of its
/// month (December and January are neighbours). The result is advisory: an empty `Vec` means the
/// date looks right.
pub fn validate_date(date: NaiveDate, period: Period) -> Vec<DateAnomaly> {
    let mut anomalies = Vec::new();
    if (date.year() - period.year()).abs() > 1 {
        anomalies.push(DateAnomaly::Year {
            found: date.year(),
            expected: period.year(),
        });
    }
    let month = date.month();
    if month != period.month() && month != period.previous_month() && month != period.next_month()
    {
        anomalies.push(DateAnomaly::Month {
            found: month,
            expected: period.month(),
        });
    }
    anomalies
}
